/// Simulated percentage never passes this value until completion.
pub const DEFAULT_CEILING: f64 = 90.0;
/// Highest configurable ceiling; 100 is reserved for completion.
pub const MAX_CEILING: f64 = 99.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressStats {
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Observable progress of one export job.
///
/// `percent` is cosmetic and driven by a timer; `stats` is the source of truth
/// for how many items have settled.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub active: bool,
    pub percent: f64,
    pub current_label: String,
    pub stats: ProgressStats,
    pub error: Option<String>,
    pub completed: bool,
    ceiling: f64,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::with_ceiling(DEFAULT_CEILING)
    }

    /// Builds an idle state whose simulated percentage stops at `ceiling`.
    ///
    /// Values outside `[0, MAX_CEILING]` are clamped; non-finite values fall back to
    /// [`DEFAULT_CEILING`].
    pub fn with_ceiling(ceiling: f64) -> Self {
        let ceiling = if ceiling.is_finite() {
            ceiling.clamp(0.0, MAX_CEILING)
        } else {
            DEFAULT_CEILING
        };
        Self {
            active: false,
            percent: 0.0,
            current_label: String::new(),
            stats: ProgressStats::default(),
            error: None,
            completed: false,
            ceiling,
        }
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    pub fn phase(&self) -> JobPhase {
        if self.completed {
            JobPhase::Completed
        } else if self.error.is_some() {
            JobPhase::Failed
        } else if self.active {
            JobPhase::Running
        } else {
            JobPhase::Idle
        }
    }

    pub(crate) fn start(&mut self, label: String) {
        *self = Self::with_ceiling(self.ceiling);
        self.active = true;
        self.current_label = label;
    }

    pub(crate) fn advance(&mut self, increment: f64) {
        if !increment.is_finite() || increment <= 0.0 {
            return;
        }
        let next = (self.percent + increment).min(self.ceiling);
        self.percent = next.max(self.percent);
    }

    pub(crate) fn set_stats(&mut self, current: usize, total: usize) {
        self.stats = ProgressStats {
            current: current.min(total),
            total,
        };
    }

    pub(crate) fn complete(&mut self) {
        self.percent = 100.0;
        self.completed = true;
        self.active = false;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.active = false;
        self.completed = false;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::with_ceiling(self.ceiling);
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}
