//! Synthetic PPG generators

use std::f64::consts::PI;

use vitalboard_core::PpgSample;

/// Pulse-shaped channel: trough at sample 0, crest every `period` samples
/// starting at `period / 2`
pub fn pulse(dc: f64, amplitude: f64, period: f64, n: usize) -> Vec<u32> {
    (0..n)
        .map(|i| (dc - amplitude * (2.0 * PI * i as f64 / period).cos()).round() as u32)
        .collect()
}

/// Red/IR sample pairs with independent amplitudes and a shared period
pub fn ppg(red_amplitude: f64, ir_amplitude: f64, period: f64, n: usize) -> Vec<PpgSample> {
    let red = pulse(50_000.0, red_amplitude, period, n);
    let ir = pulse(50_000.0, ir_amplitude, period, n);
    red.into_iter()
        .zip(ir)
        .map(|(r, i)| PpgSample::new(r, i))
        .collect()
}

/// Encode a sample as a 6-byte FIFO slot
pub fn fifo_slot(sample: PpgSample) -> [u8; 6] {
    let red = sample.red.to_be_bytes();
    let ir = sample.ir.to_be_bytes();
    [red[1], red[2], red[3], ir[1], ir[2], ir[3]]
}
