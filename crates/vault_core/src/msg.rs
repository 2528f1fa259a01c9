#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMsg {
    /// A job begins; `size_hint` is the best-effort total byte size of the selection.
    Start {
        label: String,
        size_hint: Option<u64>,
    },
    /// Periodic timer tick carrying an already-sampled increment.
    Tick { increment: f64 },
    /// Caller reports what it is working on.
    UpdateLabel(String),
    /// Caller reports discrete progress; `current == total > 0` completes the job.
    UpdateStats { current: usize, total: usize },
    Complete,
    Fail(String),
    Reset,
}
