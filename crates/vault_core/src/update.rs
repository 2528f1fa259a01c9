use crate::{IncrementBand, ProgressEffect, ProgressMsg, ProgressState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that need a running job (`Tick`, `UpdateLabel`, `UpdateStats`,
/// `Complete`) are ignored while the job is not active.
pub fn update(mut state: ProgressState, msg: ProgressMsg) -> (ProgressState, Vec<ProgressEffect>) {
    let effects = match msg {
        ProgressMsg::Start { label, size_hint } => {
            state.start(label);
            vec![ProgressEffect::StartTimer {
                band: IncrementBand::for_size_hint(size_hint),
            }]
        }
        ProgressMsg::Tick { increment } => {
            if state.active {
                state.advance(increment);
            }
            Vec::new()
        }
        ProgressMsg::UpdateLabel(label) => {
            if state.active {
                state.current_label = label;
            }
            Vec::new()
        }
        ProgressMsg::UpdateStats { current, total } => {
            if !state.active {
                return (state, Vec::new());
            }
            state.set_stats(current, total);
            if total > 0 && state.stats.current == total {
                state.complete();
                vec![ProgressEffect::StopTimer]
            } else {
                Vec::new()
            }
        }
        ProgressMsg::Complete => {
            // Idle, failed and already completed jobs stay as they are.
            if !state.active {
                return (state, Vec::new());
            }
            state.complete();
            vec![ProgressEffect::StopTimer]
        }
        ProgressMsg::Fail(message) => {
            state.fail(message);
            vec![ProgressEffect::StopTimer]
        }
        ProgressMsg::Reset => {
            state.reset();
            vec![ProgressEffect::StopTimer]
        }
    };

    (state, effects)
}
