use shell_logging::{shell_debug, shell_info, shell_warn, UPDATE_TARGET};

use crate::{
    AppState, CheckId, ConfirmPrompt, DownloadAttempt, Effect, Msg, Notification, Phase,
    ReleaseInfo, UpdateFailure, UserMessage,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CheckRequested { manual } => check_requested(&mut state, manual),
        Msg::CheckFinished { check_id, result } => check_finished(&mut state, check_id, result),
        Msg::DownloadRequested => download_requested(&mut state),
        Msg::DownloadDeclined => {
            if state.update_state().phase() == Phase::Available {
                shell_info!(target: UPDATE_TARGET, "download declined");
                state.update_mut().reset_idle();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DownloadProgress { attempt, percent } => {
            download_progress(&mut state, attempt, percent)
        }
        Msg::DownloadFinished { attempt, result } => {
            download_finished(&mut state, attempt, result)
        }
        Msg::InstallRequested => {
            let update_state = state.update_state();
            match (update_state.phase(), update_state.version()) {
                (Phase::Downloaded, Some(version)) => vec![install_prompt(version)],
                (phase, _) => {
                    shell_debug!(
                        target: UPDATE_TARGET,
                        "install requested in {:?}; ignored",
                        phase
                    );
                    Vec::new()
                }
            }
        }
        Msg::InstallConfirmed => install_confirmed(&mut state),
        Msg::InstallDeferred => {
            if state.update_state().phase() == Phase::Downloaded {
                state.update_mut().defer_install();
                shell_info!(
                    target: UPDATE_TARGET,
                    "install deferred until exit (version {:?})",
                    state.update_state().pending_install()
                );
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ReloadRequested => vec![Effect::Confirm(ConfirmPrompt::Reload)],
        Msg::ReloadConfirmed => vec![Effect::ReloadView],
        Msg::ReloadDeclined => Vec::new(),
        Msg::WindowCloseRequested => window_close_requested(&mut state),
        Msg::WindowClosed => {
            state.window_mut().mark_closed();
            state.mark_dirty();
            Vec::new()
        }
        Msg::WindowResized { .. } => {
            if state.window().open() {
                vec![Effect::RelayoutView]
            } else {
                Vec::new()
            }
        }
        Msg::MaximizeChanged(maximized) => {
            state.window_mut().set_maximized(maximized);
            state.mark_dirty();
            vec![
                Effect::RelayoutView,
                Effect::Notify(Notification::MaximizeChanged { maximized }),
            ]
        }
        Msg::ShowWindowRequested => {
            if state.window().open() {
                state.window_mut().set_visible(true);
                state.mark_dirty();
                vec![Effect::ShowWindow]
            } else {
                Vec::new()
            }
        }
        Msg::QuitRequested => {
            state.set_quitting();
            state.mark_dirty();
            let mut effects = Vec::with_capacity(2);
            if let Some(version) = state.update_mut().take_install_on_exit() {
                effects.push(Effect::InstallOnExit { version });
            }
            effects.push(Effect::Quit);
            effects
        }
        Msg::BeforeQuit => {
            state.set_quitting();
            state.mark_dirty();
            state
                .update_mut()
                .take_install_on_exit()
                .map(|version| vec![Effect::InstallOnExit { version }])
                .unwrap_or_default()
        }
    };

    (state, effects)
}

fn check_requested(state: &mut AppState, manual: bool) -> Vec<Effect> {
    if state.shutdown_intent().is_set() {
        shell_debug!(target: UPDATE_TARGET, "check requested while quitting; ignored");
        return Vec::new();
    }
    match state.update_state().phase() {
        Phase::Idle | Phase::Error => {
            let check_id = state.update_mut().begin_check(manual);
            shell_info!(target: UPDATE_TARGET, "check #{} started (manual={})", check_id, manual);
            state.mark_dirty();
            vec![Effect::StartCheck { check_id }]
        }
        Phase::Checking => {
            if manual {
                state.update_mut().escalate_to_manual();
                state.mark_dirty();
            }
            shell_debug!(target: UPDATE_TARGET, "check already in flight (manual={})", manual);
            Vec::new()
        }
        Phase::Available if manual => state
            .update_state()
            .release()
            .cloned()
            .map(|release| vec![download_prompt(release)])
            .unwrap_or_default(),
        Phase::Downloading if manual => vec![Effect::ShowMessage(UserMessage::AlreadyDownloading)],
        Phase::Downloaded if manual => state
            .update_state()
            .version()
            .map(|version| vec![install_prompt(version)])
            .unwrap_or_default(),
        phase => {
            shell_debug!(target: UPDATE_TARGET, "automatic check skipped in {:?}", phase);
            Vec::new()
        }
    }
}

fn check_finished(
    state: &mut AppState,
    check_id: CheckId,
    result: Result<Option<ReleaseInfo>, UpdateFailure>,
) -> Vec<Effect> {
    let update_state = state.update_state();
    if update_state.phase() != Phase::Checking || update_state.in_flight_check() != Some(check_id) {
        shell_debug!(
            target: UPDATE_TARGET,
            "stale result for check #{} ignored (in flight: {:?})",
            check_id,
            update_state.in_flight_check()
        );
        return Vec::new();
    }
    let manual = update_state.triggered_manually();
    state.update_mut().finish_check();
    state.mark_dirty();

    match result {
        Ok(Some(release)) => {
            if state.update_mut().resume_deferred(&release) {
                shell_info!(
                    target: UPDATE_TARGET,
                    "{} is already downloaded; offering install again",
                    release.version
                );
                return vec![
                    Effect::Notify(Notification::UpdateDownloaded {
                        version: release.version.clone(),
                    }),
                    install_prompt(&release.version),
                ];
            }
            shell_info!(target: UPDATE_TARGET, "update available: {}", release.version);
            state.update_mut().set_available(release.clone());
            vec![
                Effect::Notify(Notification::UpdateAvailable {
                    version: release.version.clone(),
                    release_notes: release.release_notes.clone(),
                }),
                download_prompt(release),
            ]
        }
        Ok(None) => {
            shell_info!(target: UPDATE_TARGET, "already on the latest version");
            state.update_mut().reset_idle();
            if manual {
                vec![
                    Effect::Notify(Notification::UpdateNotAvailable),
                    Effect::ShowMessage(UserMessage::UpToDate {
                        current_version: state.current_version().to_string(),
                    }),
                ]
            } else {
                Vec::new()
            }
        }
        Err(failure) => {
            shell_warn!(target: UPDATE_TARGET, "check #{} failed: {}", check_id, failure);
            let text = failure.user_message();
            state.update_mut().set_error(failure);
            if manual {
                failure_effects(text)
            } else {
                Vec::new()
            }
        }
    }
}

fn download_requested(state: &mut AppState) -> Vec<Effect> {
    let version = state.update_state().version().map(ToOwned::to_owned);
    match (state.update_state().phase(), version) {
        (Phase::Available, Some(version)) => {
            let attempt = state.update_mut().begin_download();
            shell_info!(target: UPDATE_TARGET, "download #{} of {} started", attempt, version);
            state.mark_dirty();
            vec![
                Effect::StartDownload { attempt, version },
                Effect::Notify(Notification::DownloadProgress { percent: 0.0 }),
                Effect::SetTaskProgress(Some(0.0)),
            ]
        }
        (Phase::Downloading, _) => {
            shell_debug!(target: UPDATE_TARGET, "download already in flight; request ignored");
            Vec::new()
        }
        (phase, _) => {
            shell_debug!(target: UPDATE_TARGET, "download requested in {:?}; ignored", phase);
            Vec::new()
        }
    }
}

fn download_progress(state: &mut AppState, attempt: DownloadAttempt, percent: f64) -> Vec<Effect> {
    if !is_current_download(state, attempt) {
        return Vec::new();
    }
    match state.update_mut().advance_progress(percent) {
        Some(percent) => {
            state.mark_dirty();
            vec![
                Effect::Notify(Notification::DownloadProgress { percent }),
                Effect::SetTaskProgress(Some(percent / 100.0)),
            ]
        }
        None => Vec::new(),
    }
}

fn download_finished(
    state: &mut AppState,
    attempt: DownloadAttempt,
    result: Result<(), UpdateFailure>,
) -> Vec<Effect> {
    if !is_current_download(state, attempt) {
        shell_debug!(target: UPDATE_TARGET, "stale completion for download #{} ignored", attempt);
        return Vec::new();
    }
    state.mark_dirty();
    match result {
        Ok(()) => {
            let version = state.update_state().version().unwrap_or_default().to_string();
            shell_info!(target: UPDATE_TARGET, "download #{} of {} complete", attempt, version);
            state.update_mut().set_downloaded();
            vec![
                Effect::SetTaskProgress(None),
                Effect::Notify(Notification::UpdateDownloaded {
                    version: version.clone(),
                }),
                Effect::Confirm(ConfirmPrompt::Install { version }),
            ]
        }
        Err(failure) => {
            shell_warn!(target: UPDATE_TARGET, "download #{} failed: {}", attempt, failure);
            let text = failure.user_message();
            state.update_mut().set_error(failure);
            let mut effects = vec![Effect::SetTaskProgress(None)];
            effects.extend(failure_effects(text));
            effects
        }
    }
}

fn install_confirmed(state: &mut AppState) -> Vec<Effect> {
    let version = state.update_state().version().map(ToOwned::to_owned);
    let version = match (state.update_state().phase(), version) {
        (Phase::Downloaded, Some(version)) => version,
        (phase, _) => {
            shell_debug!(target: UPDATE_TARGET, "install confirmed in {:?}; ignored", phase);
            return Vec::new();
        }
    };
    // Order matters: the close below must not be turned into a hide.
    state.window_mut().disarm_close_interception();
    state.set_quitting();
    state.update_mut().set_installing();
    state.mark_dirty();
    shell_info!(target: UPDATE_TARGET, "installing {}", version);
    vec![Effect::CloseWindow, Effect::QuitAndInstall { version }]
}

fn window_close_requested(state: &mut AppState) -> Vec<Effect> {
    if !state.window().open() {
        return Vec::new();
    }
    if state.shutdown_intent().is_set() || !state.window().close_interception_armed() {
        vec![Effect::DestroyWindow]
    } else {
        state.window_mut().set_visible(false);
        state.mark_dirty();
        vec![Effect::HideWindow]
    }
}

fn is_current_download(state: &AppState, attempt: DownloadAttempt) -> bool {
    state.update_state().phase() == Phase::Downloading
        && state.update_state().download_attempt() == attempt
}

fn install_prompt(version: &str) -> Effect {
    Effect::Confirm(ConfirmPrompt::Install {
        version: version.to_string(),
    })
}

fn download_prompt(release: ReleaseInfo) -> Effect {
    Effect::Confirm(ConfirmPrompt::Download {
        version: release.version,
        release_notes: release.release_notes,
    })
}

fn failure_effects(text: String) -> Vec<Effect> {
    vec![
        Effect::Notify(Notification::UpdateError {
            message: text.clone(),
        }),
        Effect::ShowMessage(UserMessage::Failed { text }),
    ]
}
