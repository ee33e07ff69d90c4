//! Exponential low-pass filter - the primitive everything else builds on
//!
//! First sample passes through unchanged so the output never starts with
//! a cold-start bias toward zero.

/// Single-variable exponential low-pass filter with settable alpha
#[derive(Clone, Debug)]
pub struct LowPassFilter {
    /// Smoothing factor used when no per-call override is given
    alpha: f32,

    // State
    last: f32,
    initialized: bool,
}

impl LowPassFilter {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            last: 0.0,
            initialized: false,
        }
    }

    /// Filter a value with the default alpha
    pub fn filter(&mut self, value: f32) -> f32 {
        self.filter_with_alpha(value, self.alpha)
    }

    /// Filter a value with a per-call alpha override
    ///
    /// First call stores and returns `value` unchanged.
    pub fn filter_with_alpha(&mut self, value: f32, alpha: f32) -> f32 {
        if !self.initialized {
            self.last = value;
            self.initialized = true;
            return value;
        }

        self.last = alpha * value + (1.0 - alpha) * self.last;
        self.last
    }

    /// Last smoothed value (0.0 before the first sample)
    pub fn last(&self) -> f32 {
        self.last
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.last = 0.0;
        self.initialized = false;
    }
}
