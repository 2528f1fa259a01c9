use vault_core::{update, JobPhase, ProgressMsg, ProgressState};

#[test]
fn stats_and_label_on_idle_job_are_noops() {
    let state = ProgressState::new();

    let (next, effects) = update(state.clone(), ProgressMsg::UpdateStats { current: 1, total: 2 });
    assert_eq!(state, next);
    assert!(effects.is_empty());

    let (next, effects) = update(next, ProgressMsg::UpdateLabel("Adding a.png".into()));
    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_on_idle_job_is_noop() {
    let state = ProgressState::new();
    let (next, effects) = update(state.clone(), ProgressMsg::Tick { increment: 12.0 });

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn complete_on_idle_job_is_noop() {
    let state = ProgressState::new();
    let (next, effects) = update(state.clone(), ProgressMsg::Complete);

    assert_eq!(state, next);
    assert_eq!(next.phase(), JobPhase::Idle);
    assert!(effects.is_empty());
}

#[test]
fn complete_after_reset_stays_idle() {
    let (state, _) = update(
        ProgressState::new(),
        ProgressMsg::Start {
            label: "Preparing download".into(),
            size_hint: None,
        },
    );
    let (state, _) = update(state, ProgressMsg::Reset);
    let (state, effects) = update(state, ProgressMsg::Complete);

    assert_eq!(state.phase(), JobPhase::Idle);
    assert_eq!(state.percent, 0.0);
    assert!(effects.is_empty());
}
