use std::sync::Once;

use pretty_assertions::assert_eq;
use shell_core::{
    update, AppState, ConfirmPrompt, Effect, FailureKind, Msg, Notification, Phase, ReleaseInfo,
    UpdateFailure, UserMessage,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(shell_logging::initialize_for_tests);
}

fn available(version: &str) -> AppState {
    let (state, effects) = update(AppState::new("1.0.0"), Msg::CheckRequested { manual: false });
    let check_id = match effects.as_slice() {
        [Effect::StartCheck { check_id }] => *check_id,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::CheckFinished {
            check_id,
            result: Ok(Some(ReleaseInfo::new(version))),
        },
    );
    state
}

fn start_download(state: AppState) -> (AppState, u64) {
    let (state, effects) = update(state, Msg::DownloadRequested);
    let attempt = match effects.first() {
        Some(Effect::StartDownload { attempt, .. }) => *attempt,
        other => panic!("expected StartDownload, got {other:?}"),
    };
    (state, attempt)
}

fn progress_notifications(effects: &[Effect]) -> Vec<f64> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Notify(Notification::DownloadProgress { percent }) => Some(*percent),
            _ => None,
        })
        .collect()
}

#[test]
fn download_reports_monotonic_progress() {
    init_logging();
    let (state, effects) = update(available("2.0.0"), Msg::DownloadRequested);
    assert_eq!(
        effects,
        vec![
            Effect::StartDownload {
                attempt: 1,
                version: "2.0.0".to_string()
            },
            Effect::Notify(Notification::DownloadProgress { percent: 0.0 }),
            Effect::SetTaskProgress(Some(0.0)),
        ]
    );
    assert_eq!(state.update_state().phase(), Phase::Downloading);
    assert_eq!(state.update_state().progress_percent(), Some(0.0));

    let mut seen = Vec::new();
    let mut state = state;
    for percent in [12.5, 40.0, 30.0, 40.0, 250.0, f64::NAN] {
        let (next, effects) = update(state, Msg::DownloadProgress { attempt: 1, percent });
        seen.extend(progress_notifications(&effects));
        state = next;
    }

    assert_eq!(seen, vec![12.5, 40.0, 100.0]);
    assert_eq!(state.update_state().progress_percent(), Some(100.0));
}

#[test]
fn progress_is_mirrored_to_the_task_indicator() {
    init_logging();
    let (state, attempt) = start_download(available("2.0.0"));

    let (state, effects) = update(state, Msg::DownloadProgress { attempt, percent: 50.0 });
    assert!(effects.contains(&Effect::SetTaskProgress(Some(0.5))));

    let (_state, effects) = update(state, Msg::DownloadFinished { attempt, result: Ok(()) });
    assert_eq!(effects.first(), Some(&Effect::SetTaskProgress(None)));
}

#[test]
fn second_download_request_is_ignored_while_downloading() {
    init_logging();
    let (state, attempt) = start_download(available("2.0.0"));
    let (state, _) = update(state, Msg::DownloadProgress { attempt, percent: 37.0 });

    let (state, effects) = update(state, Msg::DownloadRequested);
    assert!(effects.is_empty());
    assert_eq!(state.update_state().download_attempt(), attempt);
    assert_eq!(state.update_state().progress_percent(), Some(37.0));

    // A background check is ignored; a manual one is told why.
    let (state, effects) = update(state, Msg::CheckRequested { manual: false });
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::CheckRequested { manual: true });
    assert_eq!(effects, vec![Effect::ShowMessage(UserMessage::AlreadyDownloading)]);
    assert_eq!(state.update_state().phase(), Phase::Downloading);
    assert_eq!(state.update_state().progress_percent(), Some(37.0));
}

#[test]
fn download_failure_lands_in_error_and_is_always_visible() {
    init_logging();
    let (state, attempt) = start_download(available("2.0.0"));
    let (state, _) = update(state, Msg::DownloadProgress { attempt, percent: 80.0 });
    let failure = UpdateFailure::new(FailureKind::DownloadFailed, "checksum mismatch");

    let (state, effects) = update(
        state,
        Msg::DownloadFinished {
            attempt,
            result: Err(failure.clone()),
        },
    );

    assert_eq!(state.update_state().phase(), Phase::Error);
    assert_eq!(state.update_state().progress_percent(), None);
    assert_eq!(state.update_state().version(), None);
    let text = failure.user_message();
    assert_eq!(
        effects,
        vec![
            Effect::SetTaskProgress(None),
            Effect::Notify(Notification::UpdateError {
                message: text.clone()
            }),
            Effect::ShowMessage(UserMessage::Failed { text }),
        ]
    );
}

#[test]
fn new_attempt_resets_progress_and_drops_stale_events() {
    init_logging();
    let (state, first) = start_download(available("2.0.0"));
    let (state, _) = update(state, Msg::DownloadProgress { attempt: first, percent: 90.0 });
    let (state, _) = update(
        state,
        Msg::DownloadFinished {
            attempt: first,
            result: Err(UpdateFailure::new(FailureKind::NetworkDisconnected, "reset")),
        },
    );

    // Retry: check again, find the release again, download again.
    let (state, effects) = update(state, Msg::CheckRequested { manual: true });
    let check_id = match effects.as_slice() {
        [Effect::StartCheck { check_id }] => *check_id,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::CheckFinished {
            check_id,
            result: Ok(Some(ReleaseInfo::new("2.0.0"))),
        },
    );
    let (state, second) = start_download(state);
    assert_ne!(first, second);
    assert_eq!(state.update_state().progress_percent(), Some(0.0));

    let (state, effects) = update(state, Msg::DownloadProgress { attempt: first, percent: 95.0 });
    assert!(effects.is_empty());
    assert_eq!(state.update_state().progress_percent(), Some(0.0));

    let (state, effects) = update(state, Msg::DownloadFinished { attempt: first, result: Ok(()) });
    assert!(effects.is_empty());
    assert_eq!(state.update_state().phase(), Phase::Downloading);
}

#[test]
fn install_requires_confirmation_and_sets_shutdown_intent() {
    init_logging();
    let (state, attempt) = start_download(available("2.0.0"));
    let (state, effects) = update(state, Msg::DownloadFinished { attempt, result: Ok(()) });
    assert!(effects.contains(&Effect::Confirm(ConfirmPrompt::Install {
        version: "2.0.0".to_string()
    })));
    assert_eq!(state.update_state().phase(), Phase::Downloaded);
    assert!(!state.shutdown_intent().is_set());

    // Asking again from the renderer re-opens the prompt without side effects.
    let (state, effects) = update(state, Msg::InstallRequested);
    assert_eq!(
        effects,
        vec![Effect::Confirm(ConfirmPrompt::Install {
            version: "2.0.0".to_string()
        })]
    );
    assert!(!state.shutdown_intent().is_set());
    assert!(state.window().close_interception_armed());

    let (state, effects) = update(state, Msg::InstallConfirmed);
    assert_eq!(state.update_state().phase(), Phase::Installing);
    assert!(state.shutdown_intent().is_set());
    assert!(!state.window().close_interception_armed());
    assert_eq!(
        effects,
        vec![
            Effect::CloseWindow,
            Effect::QuitAndInstall {
                version: "2.0.0".to_string()
            },
        ]
    );

    // The close that follows is not intercepted.
    let (_state, effects) = update(state, Msg::WindowCloseRequested);
    assert_eq!(effects, vec![Effect::DestroyWindow]);
}

#[test]
fn install_confirmation_outside_downloaded_is_ignored() {
    init_logging();
    let state = available("2.0.0");
    let (state, effects) = update(state, Msg::InstallConfirmed);
    assert!(effects.is_empty());
    assert_eq!(state.update_state().phase(), Phase::Available);
    assert!(!state.shutdown_intent().is_set());
}

#[test]
fn deferred_install_runs_on_quit_once() {
    init_logging();
    let (state, attempt) = start_download(available("2.0.0"));
    let (state, _) = update(state, Msg::DownloadFinished { attempt, result: Ok(()) });

    let (state, effects) = update(state, Msg::InstallDeferred);
    assert!(effects.is_empty());
    assert_eq!(state.update_state().phase(), Phase::Idle);
    assert_eq!(state.update_state().pending_install(), Some("2.0.0"));
    assert!(!state.shutdown_intent().is_set());

    let (state, effects) = update(state, Msg::QuitRequested);
    assert_eq!(
        effects,
        vec![
            Effect::InstallOnExit {
                version: "2.0.0".to_string()
            },
            Effect::Quit,
        ]
    );
    assert!(state.shutdown_intent().is_set());

    let (_state, effects) = update(state, Msg::BeforeQuit);
    assert!(effects.is_empty());
}

fn deferred(version: &str) -> AppState {
    let (state, attempt) = start_download(available(version));
    let (state, _) = update(state, Msg::DownloadFinished { attempt, result: Ok(()) });
    let (state, _) = update(state, Msg::InstallDeferred);
    state
}

fn check_finds(state: AppState, version: &str) -> (AppState, Vec<Effect>) {
    let (state, effects) = update(state, Msg::CheckRequested { manual: true });
    let check_id = match effects.as_slice() {
        [Effect::StartCheck { check_id }] => *check_id,
        other => panic!("unexpected effects {other:?}"),
    };
    update(
        state,
        Msg::CheckFinished {
            check_id,
            result: Ok(Some(ReleaseInfo::new(version))),
        },
    )
}

#[test]
fn deferred_release_found_again_offers_install() {
    init_logging();
    let (state, effects) = check_finds(deferred("2.0.0"), "2.0.0");

    assert_eq!(
        effects,
        vec![
            Effect::Notify(Notification::UpdateDownloaded {
                version: "2.0.0".to_string()
            }),
            Effect::Confirm(ConfirmPrompt::Install {
                version: "2.0.0".to_string()
            }),
        ]
    );
    assert_eq!(state.update_state().phase(), Phase::Downloaded);

    let (state, effects) = update(state, Msg::DownloadRequested);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::InstallDeferred);
    assert_eq!(state.update_state().pending_install(), Some("2.0.0"));
    let (_state, effects) = update(state, Msg::QuitRequested);
    assert_eq!(
        effects,
        vec![
            Effect::InstallOnExit {
                version: "2.0.0".to_string()
            },
            Effect::Quit,
        ]
    );
}

#[test]
fn failed_newer_download_keeps_deferred_install() {
    init_logging();
    let (state, _) = check_finds(deferred("2.0.0"), "3.0.0");
    assert_eq!(state.update_state().phase(), Phase::Available);

    let (state, attempt) = start_download(state);
    let (state, _) = update(
        state,
        Msg::DownloadFinished {
            attempt,
            result: Err(UpdateFailure::new(FailureKind::DownloadFailed, "reset")),
        },
    );
    let (_state, effects) = update(state, Msg::QuitRequested);
    assert_eq!(
        effects,
        vec![
            Effect::InstallOnExit {
                version: "2.0.0".to_string()
            },
            Effect::Quit,
        ]
    );
}

#[test]
fn completed_newer_download_supersedes_deferred_install() {
    init_logging();
    let (state, _) = check_finds(deferred("2.0.0"), "3.0.0");
    let (state, attempt) = start_download(state);
    let (state, _) = update(state, Msg::DownloadFinished { attempt, result: Ok(()) });
    assert_eq!(state.update_state().pending_install(), None);

    let (_state, effects) = update(state, Msg::QuitRequested);
    assert_eq!(
        effects,
        vec![
            Effect::InstallOnExit {
                version: "3.0.0".to_string()
            },
            Effect::Quit,
        ]
    );
}

#[test]
fn end_to_end_update_flow() {
    init_logging();
    let mut notifications = Vec::new();
    let mut collect = |effects: &[Effect]| {
        for effect in effects {
            if let Effect::Notify(notification) = effect {
                notifications.push(notification.clone());
            }
        }
    };

    let (state, effects) = update(AppState::new("1.0.0"), Msg::CheckRequested { manual: false });
    collect(&effects);
    let (state, effects) = update(
        state,
        Msg::CheckFinished {
            check_id: 1,
            result: Ok(Some(ReleaseInfo::new("2.0.0"))),
        },
    );
    collect(&effects);
    let (state, effects) = update(state, Msg::DownloadRequested);
    collect(&effects);
    let mut state = state;
    for percent in [0.0, 37.0, 100.0] {
        let (next, effects) = update(state, Msg::DownloadProgress { attempt: 1, percent });
        collect(&effects);
        state = next;
    }
    let (state, effects) = update(state, Msg::DownloadFinished { attempt: 1, result: Ok(()) });
    collect(&effects);
    let (state, effects) = update(state, Msg::InstallConfirmed);
    collect(&effects);

    assert_eq!(
        notifications,
        vec![
            Notification::UpdateAvailable {
                version: "2.0.0".to_string(),
                release_notes: None,
            },
            Notification::DownloadProgress { percent: 0.0 },
            Notification::DownloadProgress { percent: 37.0 },
            Notification::DownloadProgress { percent: 100.0 },
            Notification::UpdateDownloaded {
                version: "2.0.0".to_string()
            },
        ]
    );
    assert!(state.shutdown_intent().is_set());
    let (_state, effects) = update(state, Msg::WindowCloseRequested);
    assert_eq!(effects, vec![Effect::DestroyWindow]);
}
