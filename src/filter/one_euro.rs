//! One Euro filter - adaptive low-pass filter for jitter reduction
//!
//! Smooth when slow (reduces jitter), responsive when fast (tracks the
//! swing). The cutoff frequency adapts to the estimated speed of change
//! of the input.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use super::low_pass::LowPassFilter;

/// One Euro filter tuning parameters
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OneEuroConfig {
    /// Sampling frequency (Hz) assumed until timestamps say otherwise
    pub frequency: f32,
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    pub min_cutoff: f32,
    /// Speed coefficient - higher = less lag during fast motion
    pub beta: f32,
    /// Cutoff frequency (Hz) for the derivative estimate
    pub d_cutoff: f32,
}

impl Default for OneEuroConfig {
    fn default() -> Self {
        Self {
            frequency: 30.0,
            min_cutoff: 1.0,
            beta: 0.007,
            d_cutoff: 1.0,
        }
    }
}

/// Adaptive low-pass filter: smooth at rest, responsive during motion
#[derive(Clone, Debug)]
pub struct OneEuroFilter {
    config: OneEuroConfig,

    // State
    freq: f32,
    last_value: f32,
    last_timestamp: f64,
    value_filter: LowPassFilter,
    derivative_filter: LowPassFilter,
    initialized: bool,
}

impl OneEuroFilter {
    pub fn new(config: OneEuroConfig) -> Self {
        Self {
            freq: config.frequency,
            config,
            last_value: 0.0,
            last_timestamp: 0.0,
            value_filter: LowPassFilter::new(1.0),
            derivative_filter: LowPassFilter::new(1.0),
            initialized: false,
        }
    }

    /// Alpha for a given cutoff at the current sampling frequency
    fn smoothing_factor(&self, cutoff: f32) -> f32 {
        let te = 1.0 / self.freq;
        let tau = 1.0 / (2.0 * PI * cutoff);
        1.0 / (1.0 + tau / te)
    }

    /// Filter a single value
    ///
    /// - `value`: raw input
    /// - `timestamp`: seconds, expected monotonically increasing
    pub fn filter(&mut self, value: f32, timestamp: f64) -> f32 {
        if self.initialized {
            let dt = (timestamp - self.last_timestamp) as f32;
            // Timestamp glitches (repeats, jumps over 1s) keep the
            // previous frequency estimate
            if dt > 0.0 && dt < 1.0 {
                self.freq = 1.0 / dt;
            }
        }

        // 1. Estimate derivative (zero on the very first sample)
        let dx = if self.initialized {
            (value - self.last_value) * self.freq
        } else {
            0.0
        };
        let d_alpha = self.smoothing_factor(self.config.d_cutoff);
        let dx_hat = self.derivative_filter.filter_with_alpha(dx, d_alpha);

        // 2. Adaptive cutoff: more smoothing when slow, less when fast
        let cutoff = self.config.min_cutoff + self.config.beta * dx_hat.abs();
        let alpha = self.smoothing_factor(cutoff);

        // 3. Apply filter
        let filtered = self.value_filter.filter_with_alpha(value, alpha);

        self.last_value = value;
        self.last_timestamp = timestamp;
        self.initialized = true;

        filtered
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.freq = self.config.frequency;
        self.last_value = 0.0;
        self.last_timestamp = 0.0;
        self.value_filter.reset();
        self.derivative_filter.reset();
        self.initialized = false;
    }
}

impl Default for OneEuroFilter {
    fn default() -> Self {
        Self::new(OneEuroConfig::default())
    }
}
