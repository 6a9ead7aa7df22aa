//! Heart Rate and SpO2 Estimation
//!
//! ## Pipeline
//!
//! ```text
//! PpgWindow ──► IR channel ──► zero-phase LPF ──► peaks / valleys
//!     │                                              │
//!     │                                 gap = mean(peaks) − mean(valleys)
//!     │                                 500 < gap < 2000 ?
//!     │                                              │
//!     │                                 HR = 60 / mean(Δpeak / fs)
//!     │
//!     └──► red + IR (unfiltered) ──► R = (ACr/DCr) / (ACir/DCir)
//!                                    SpO2 = a·R² + b·R + c
//!                                    SpO2 >= 90 ?
//! ```
//!
//! ## Joint Rejection
//!
//! Heart rate and SpO2 are accepted or rejected together. If the pulse
//! amplitude is implausible, or the SpO2 falls below the calibration floor,
//! both are reported as [`VITALS_INVALID`]. The floor and the polynomial
//! were fitted for this board's LEDs and enclosure and should be refitted
//! for other hardware.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::buffer::PpgWindow;
use crate::constants::signal::{
    HARDWARE_SAMPLE_RATE_HZ, LOWPASS_CUTOFF_HZ, LOWPASS_ORDER, MAX_PULSE_AMPLITUDE,
    MIN_PEAK_HEIGHT, MIN_PULSE_AMPLITUDE, PEAK_SEPARATION_S, SAMPLE_AVERAGING, SPO2_CURVE,
    SPO2_FLOOR_PCT, VITALS_INVALID,
};
use crate::errors::VitalsError;

use super::filter::LowPass;
use super::peaks::{find_peaks, find_valleys};

/// Estimator tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// ADC sample rate configured on the sensor (Hz)
    pub hardware_rate_hz: f64,
    /// On-device averaging factor
    pub averaging: u32,
    /// Low-pass cutoff (Hz)
    pub cutoff_hz: f64,
    /// Butterworth order
    pub filter_order: usize,
    /// Minimum filtered IR value of a pulse peak
    pub min_peak_height: f64,
    /// Exclusive lower bound of the peak-to-valley gap
    pub min_pulse_amplitude: f64,
    /// Exclusive upper bound of the peak-to-valley gap
    pub max_pulse_amplitude: f64,
    /// SpO2 polynomial `[a, b, c]` in `a·R² + b·R + c`
    pub spo2_curve: [f64; 3],
    /// SpO2 below this rejects the estimate (calibration-specific)
    pub spo2_floor: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            hardware_rate_hz: HARDWARE_SAMPLE_RATE_HZ,
            averaging: SAMPLE_AVERAGING,
            cutoff_hz: LOWPASS_CUTOFF_HZ,
            filter_order: LOWPASS_ORDER,
            min_peak_height: MIN_PEAK_HEIGHT,
            min_pulse_amplitude: MIN_PULSE_AMPLITUDE,
            max_pulse_amplitude: MAX_PULSE_AMPLITUDE,
            spo2_curve: SPO2_CURVE,
            spo2_floor: SPO2_FLOOR_PCT,
        }
    }
}

impl EstimatorConfig {
    /// Rate at which samples arrive in the window (Hz)
    pub fn sample_rate_hz(&self) -> f64 {
        self.hardware_rate_hz / self.averaging.max(1) as f64
    }

    /// Minimum peak separation in samples
    ///
    /// At 25 Hz a third of a second is 8.33 samples, rounded up to 9.
    pub fn peak_distance(&self) -> usize {
        libm::ceil(self.sample_rate_hz() * PEAK_SEPARATION_S) as usize
    }

    /// Whether a peak-to-valley gap lies strictly inside the plausible band
    ///
    /// Both bounds are exclusive: a gap equal to either bound is rejected.
    pub fn amplitude_plausible(&self, gap: f64) -> bool {
        gap > self.min_pulse_amplitude && gap < self.max_pulse_amplitude
    }
}

/// Heart rate and SpO2 for one window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalsEstimate {
    /// Beats per minute, or -1.0
    pub heart_rate_bpm: f64,
    /// Percent saturation, or -1.0
    pub spo2_percent: f64,
}

impl VitalsEstimate {
    /// Both values rejected
    pub const INVALID: Self = Self {
        heart_rate_bpm: VITALS_INVALID,
        spo2_percent: VITALS_INVALID,
    };

    /// Check whether this is a real measurement
    pub fn is_valid(&self) -> bool {
        self.heart_rate_bpm != VITALS_INVALID && self.spo2_percent != VITALS_INVALID
    }
}

impl Default for VitalsEstimate {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Evaluate the SpO2 calibration polynomial at ratio `r`
pub fn spo2_from_ratio(r: f64, curve: &[f64; 3]) -> f64 {
    let [a, b, c] = *curve;
    a * r * r + b * r + c
}

/// Ratio of ratios `(ACred/DCred) / (ACir/DCir)` over raw channels
pub fn ratio_of_ratios(red: &[f64], ir: &[f64]) -> Result<f64, VitalsError> {
    let (red_ac, red_dc) = ac_dc(red).ok_or(VitalsError::DegenerateChannel)?;
    let (ir_ac, ir_dc) = ac_dc(ir).ok_or(VitalsError::DegenerateChannel)?;

    let ratio = (red_ac / red_dc) / (ir_ac / ir_dc);
    if ratio.is_finite() {
        Ok(ratio)
    } else {
        Err(VitalsError::DegenerateChannel)
    }
}

/// Peak-to-peak amplitude and mean of a channel
fn ac_dc(channel: &[f64]) -> Option<(f64, f64)> {
    if channel.is_empty() {
        return None;
    }
    let (min, max) = channel
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    Some((max - min, mean(channel.iter().copied())))
}

fn mean<I: ExactSizeIterator<Item = f64>>(values: I) -> f64 {
    let n = values.len();
    values.sum::<f64>() / n as f64
}

/// Heart-rate/SpO2 estimator over a PPG window
#[derive(Debug, Clone)]
pub struct VitalsEstimator {
    config: EstimatorConfig,
    filter: LowPass,
}

impl VitalsEstimator {
    /// Build an estimator and design its filter
    pub fn new(config: EstimatorConfig) -> Self {
        let filter = LowPass::butterworth(config.filter_order, config.cutoff_hz, config.sample_rate_hz());
        Self { config, filter }
    }

    /// Active tuning
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Fewest samples a window needs before an estimate is attempted
    pub fn min_window_len(&self) -> usize {
        self.filter.min_input_len()
    }

    /// Estimate vitals, reporting why a window was rejected
    pub fn evaluate(&self, window: &PpgWindow<'_>) -> Result<VitalsEstimate, VitalsError> {
        let ir = window.ir();
        let filtered = self.filter.filtfilt(&ir)?;

        let heart_rate_bpm = self.heart_rate(&filtered)?;

        let red = window.red();
        let ratio = ratio_of_ratios(&red, &ir)?;
        let spo2 = spo2_from_ratio(ratio, &self.config.spo2_curve);
        if spo2 < self.config.spo2_floor {
            return Err(VitalsError::Spo2BelowFloor { spo2 });
        }

        Ok(VitalsEstimate {
            heart_rate_bpm,
            spo2_percent: spo2,
        })
    }

    /// Estimate vitals, substituting the invalid sentinel on rejection
    pub fn estimate(&self, window: &PpgWindow<'_>) -> VitalsEstimate {
        match self.evaluate(window) {
            Ok(estimate) => estimate,
            Err(reason) => {
                log_debug!("Vitals rejected: {}", reason);
                VitalsEstimate::INVALID
            }
        }
    }

    fn heart_rate(&self, filtered: &[f64]) -> Result<f64, VitalsError> {
        let distance = self.config.peak_distance();
        let peaks = find_peaks(filtered, Some(self.config.min_peak_height), distance);
        let valleys = find_valleys(filtered, distance);

        if peaks.len() < 2 || valleys.is_empty() {
            return Err(VitalsError::NoPulse {
                peaks: peaks.len(),
                valleys: valleys.len(),
            });
        }

        let gap = mean(peaks.iter().map(|&i| filtered[i]))
            - mean(valleys.iter().map(|&i| filtered[i]));
        if !self.config.amplitude_plausible(gap) {
            return Err(VitalsError::ImplausibleAmplitude { gap });
        }

        let fs = self.config.sample_rate_hz();
        let intervals: Vec<f64> = peaks
            .windows(2)
            .map(|pair| (pair[1] - pair[0]) as f64 / fs)
            .collect();

        Ok(60.0 / mean(intervals.into_iter()))
    }
}

impl Default for VitalsEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}
