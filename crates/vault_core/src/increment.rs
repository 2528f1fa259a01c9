const MIB: u64 = 1024 * 1024;

/// Range of percentage points added per tick.
///
/// Smaller selections finish sooner, so they advance in larger steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncrementBand {
    pub min: f64,
    pub max: f64,
}

impl IncrementBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn for_size_hint(size_hint: Option<u64>) -> Self {
        match size_hint {
            None => Self::new(2.0, 6.0),
            Some(bytes) if bytes < MIB => Self::new(8.0, 15.0),
            Some(bytes) if bytes < 10 * MIB => Self::new(4.0, 8.0),
            Some(bytes) if bytes < 100 * MIB => Self::new(2.0, 4.0),
            Some(bytes) if bytes < 1024 * MIB => Self::new(1.0, 2.0),
            Some(_) => Self::new(0.25, 1.0),
        }
    }

    /// Maps a uniform sample in `[0, 1)` onto the band.
    pub fn sample(&self, unit: f64) -> f64 {
        let unit = if unit.is_finite() { unit.clamp(0.0, 1.0) } else { 0.0 };
        self.min + (self.max - self.min) * unit
    }
}

impl Default for IncrementBand {
    fn default() -> Self {
        Self::for_size_hint(None)
    }
}
