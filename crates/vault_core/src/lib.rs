//! Vault core: pure progress state machine for archive export jobs.
mod effect;
mod increment;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::ProgressEffect;
pub use increment::IncrementBand;
pub use msg::ProgressMsg;
pub use state::{JobPhase, ProgressState, ProgressStats, DEFAULT_CEILING, MAX_CEILING};
pub use update::update;
pub use view_model::ProgressView;
