use shell_core::{update, AppState, ConfirmPrompt, Effect, Msg, Notification, Phase};

#[test]
fn close_hides_to_tray_until_quitting() {
    let state = AppState::new("1.0.0");

    let (state, effects) = update(state, Msg::WindowCloseRequested);
    assert_eq!(effects, vec![Effect::HideWindow]);
    assert!(!state.window().visible());

    let (state, effects) = update(state, Msg::ShowWindowRequested);
    assert_eq!(effects, vec![Effect::ShowWindow]);
    assert!(state.window().visible());

    let (state, effects) = update(state, Msg::QuitRequested);
    assert_eq!(effects, vec![Effect::Quit]);

    let (state, effects) = update(state, Msg::WindowCloseRequested);
    assert_eq!(effects, vec![Effect::DestroyWindow]);

    let (state, _) = update(state, Msg::WindowClosed);
    let (_state, effects) = update(state, Msg::WindowCloseRequested);
    assert!(effects.is_empty());
}

#[test]
fn before_quit_hook_sets_shutdown_intent() {
    let (state, effects) = update(AppState::new("1.0.0"), Msg::BeforeQuit);
    assert!(effects.is_empty());
    assert!(state.shutdown_intent().is_set());

    let (state, effects) = update(state, Msg::WindowCloseRequested);
    assert_eq!(effects, vec![Effect::DestroyWindow]);
    assert!(state.view().window.quitting);
}

#[test]
fn shutdown_intent_is_never_cleared() {
    let (mut state, _) = update(AppState::new("1.0.0"), Msg::QuitRequested);
    for msg in [
        Msg::CheckRequested { manual: true },
        Msg::ShowWindowRequested,
        Msg::MaximizeChanged(true),
        Msg::ReloadDeclined,
    ] {
        let (next, _) = update(state, msg);
        assert!(next.shutdown_intent().is_set());
        state = next;
    }
}

#[test]
fn checks_are_ignored_once_quitting() {
    for quit in [Msg::QuitRequested, Msg::BeforeQuit] {
        let (state, _) = update(AppState::new("1.0.0"), quit);
        for manual in [false, true] {
            let (next, effects) = update(state.clone(), Msg::CheckRequested { manual });
            assert!(effects.is_empty());
            assert_eq!(next.update_state().phase(), Phase::Idle);
            assert_eq!(next.update_state().in_flight_check(), None);
        }
    }
}

#[test]
fn maximize_changes_are_forwarded_to_the_renderer() {
    let (state, effects) = update(AppState::new("1.0.0"), Msg::MaximizeChanged(true));
    assert_eq!(
        effects,
        vec![
            Effect::RelayoutView,
            Effect::Notify(Notification::MaximizeChanged { maximized: true }),
        ]
    );
    assert!(state.window().maximized());
    assert_eq!(
        Notification::MaximizeChanged { maximized: true }.channel(),
        "maximize-change"
    );

    let (_state, effects) = update(state, Msg::WindowResized { width: 800, height: 600 });
    assert_eq!(effects, vec![Effect::RelayoutView]);
}

#[test]
fn reload_goes_through_confirmation() {
    let (state, effects) = update(AppState::new("1.0.0"), Msg::ReloadRequested);
    assert_eq!(effects, vec![Effect::Confirm(ConfirmPrompt::Reload)]);

    let (state, effects) = update(state, Msg::ReloadDeclined);
    assert!(effects.is_empty());

    let (_state, effects) = update(state, Msg::ReloadConfirmed);
    assert_eq!(effects, vec![Effect::ReloadView]);
}
