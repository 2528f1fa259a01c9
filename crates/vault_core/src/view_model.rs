use crate::{JobPhase, ProgressState};

/// Render-ready projection of a [`ProgressState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub phase: JobPhase,
    pub percent: u8,
    pub label: String,
    pub counter: Option<String>,
    pub error: Option<String>,
}

impl ProgressView {
    pub fn from_state(state: &ProgressState) -> Self {
        let counter = (state.stats.total > 0)
            .then(|| format!("{}/{}", state.stats.current, state.stats.total));
        Self {
            phase: state.phase(),
            percent: state.percent.floor().clamp(0.0, 100.0) as u8,
            label: state.current_label.clone(),
            counter,
            error: state.error.clone(),
        }
    }
}

impl From<&ProgressState> for ProgressView {
    fn from(state: &ProgressState) -> Self {
        Self::from_state(state)
    }
}
