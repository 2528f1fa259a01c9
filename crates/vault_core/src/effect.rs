use crate::IncrementBand;

/// Side effects the timer owner must carry out after an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEffect {
    /// (Re)start the periodic tick, sampling increments from `band`.
    StartTimer { band: IncrementBand },
    StopTimer,
}
