//! PPG Signal Parameters
//!
//! Sampling, filter and plausibility constants for the heart-rate/SpO2
//! estimator. The SpO2 coefficients and floor are an empirical calibration
//! for this board's LEDs and enclosure; they are not physiological constants.

/// PPG sensor ADC sample rate as configured (Hz).
pub const HARDWARE_SAMPLE_RATE_HZ: f64 = 400.0;

/// On-device sample averaging factor as configured.
pub const SAMPLE_AVERAGING: u32 = 16;

/// Rate at which averaged samples reach the FIFO (Hz).
pub const EFFECTIVE_SAMPLE_RATE_HZ: f64 = HARDWARE_SAMPLE_RATE_HZ / SAMPLE_AVERAGING as f64;

/// Low-pass cutoff applied to the IR channel (Hz).
pub const LOWPASS_CUTOFF_HZ: f64 = 3.0;

/// Butterworth filter order.
pub const LOWPASS_ORDER: usize = 4;

/// Minimum filtered IR value for a pulse peak (raw counts).
pub const MIN_PEAK_HEIGHT: f64 = 2000.0;

/// Peak separation as a fraction of one second of samples.
///
/// A third of a second caps detectable heart rate at 180 bpm.
pub const PEAK_SEPARATION_S: f64 = 1.0 / 3.0;

/// Lower bound of the accepted peak-to-valley gap (exclusive, raw counts).
///
/// Below this the finger is off the sensor or the signal is saturated.
pub const MIN_PULSE_AMPLITUDE: f64 = 500.0;

/// Upper bound of the accepted peak-to-valley gap (exclusive, raw counts).
///
/// Above this the waveform is dominated by motion.
pub const MAX_PULSE_AMPLITUDE: f64 = 2000.0;

/// SpO2 calibration curve coefficients `[a, b, c]` for `a·R² + b·R + c`.
pub const SPO2_CURVE: [f64; 3] = [-45.060, 30.354, 94.845];

/// SpO2 below which the whole estimate is rejected (%).
///
/// Calibration-specific.
pub const SPO2_FLOOR_PCT: f64 = 90.0;

/// Sentinel written for a rejected heart rate or SpO2.
pub const VITALS_INVALID: f64 = -1.0;
