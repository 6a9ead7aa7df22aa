//! Zero-Phase Butterworth Low-Pass
//!
//! ## Design
//!
//! The analog Butterworth prototype is mapped to the z-plane with the
//! bilinear transform, prewarped so the -3 dB point lands exactly on the
//! requested cutoff. The result is a cascade of second-order sections
//! (plus one first-order section for odd orders), each run in Direct Form
//! II Transposed:
//!
//! ```text
//! K        = tan(π · fc / fs)
//! θ_k      = π (2k + 1) / (2N)          k = 0 .. N/2
//! 1/Q_k    = 2 sin θ_k
//!
//!          K² (1 + 2z⁻¹ + z⁻²)
//! H_k(z) = ─────────────────────────────────────────────────
//!          (1 + K/Q + K²) + 2(K² − 1) z⁻¹ + (1 − K/Q + K²) z⁻²
//! ```
//!
//! ## Forward-Backward Filtering
//!
//! Running the cascade forward and then backward over the time-reversed
//! output cancels the phase response, so pulse peaks stay at their true
//! sample index. The magnitude response is applied twice.
//!
//! Edge transients are suppressed the usual way:
//!
//! 1. the signal is extended at both ends by `pad` samples of odd
//!    reflection about the end points (`2·x[0] − x[pad−i]`)
//! 2. each section starts from the steady state it would reach for a
//!    constant input equal to the first extended sample
//! 3. the padding is cut off again after the backward pass
//!
//! `pad = 3 · (2·sections + 1)`, i.e. 15 for a 4th-order filter, and the
//! input must be strictly longer than `pad`.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::errors::VitalsError;

/// One second-order section, `a0` normalised to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// Numerator `[b0, b1, b2]`
    pub b: [f64; 3],
    /// Denominator `[a1, a2]`
    pub a: [f64; 2],
}

impl Biquad {
    /// DC gain `H(1)`
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    /// DF2T state reached after a long run of unit input
    fn unit_step_state(&self) -> [f64; 2] {
        let gain = self.dc_gain();
        [gain - self.b[0], self.b[2] - self.a[1] * gain]
    }

    /// Filter `signal` in place starting from state `z`
    fn run(&self, signal: &mut [f64], mut z: [f64; 2]) {
        let [b0, b1, b2] = self.b;
        let [a1, a2] = self.a;
        for x in signal.iter_mut() {
            let input = *x;
            let y = b0 * input + z[0];
            z[0] = b1 * input - a1 * y + z[1];
            z[1] = b2 * input - a2 * y;
            *x = y;
        }
    }

    fn is_first_order(&self) -> bool {
        self.b[2] == 0.0 && self.a[1] == 0.0
    }
}

/// Butterworth low-pass as a cascade of biquads
#[derive(Debug, Clone, PartialEq)]
pub struct LowPass {
    sections: Vec<Biquad>,
}

impl LowPass {
    /// Design an `order`-th order Butterworth low-pass
    ///
    /// `cutoff_hz` must lie strictly between 0 and `sample_rate_hz / 2`;
    /// an order of 0 yields a pass-through filter.
    pub fn butterworth(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> Self {
        let k = libm::tan(PI * cutoff_hz / sample_rate_hz);
        let k2 = k * k;
        let mut sections = Vec::with_capacity(order.div_ceil(2));

        for i in 0..order / 2 {
            let theta = PI * (2 * i + 1) as f64 / (2 * order) as f64;
            let q_inv = 2.0 * libm::sin(theta);
            let norm = 1.0 / (1.0 + k * q_inv + k2);
            let b0 = k2 * norm;
            sections.push(Biquad {
                b: [b0, 2.0 * b0, b0],
                a: [2.0 * (k2 - 1.0) * norm, (1.0 - k * q_inv + k2) * norm],
            });
        }

        if order % 2 == 1 {
            let b0 = k / (1.0 + k);
            sections.push(Biquad {
                b: [b0, b0, 0.0],
                a: [(k - 1.0) / (k + 1.0), 0.0],
            });
        }

        Self { sections }
    }

    /// The designed sections, in cascade order
    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Reflection length added at each end before filtering
    pub fn pad_len(&self) -> usize {
        let trailing_zeros = self.sections.iter().filter(|s| s.is_first_order()).count();
        3 * (2 * self.sections.len() + 1 - trailing_zeros)
    }

    /// Shortest input [`filtfilt`](Self::filtfilt) accepts
    pub fn min_input_len(&self) -> usize {
        self.pad_len() + 1
    }

    /// Single causal pass, starting from the steady state for `signal[0]`
    pub fn filter_in_place(&self, signal: &mut [f64]) {
        let Some(&first) = signal.first() else {
            return;
        };

        let mut scale = first;
        for section in &self.sections {
            let unit = section.unit_step_state();
            section.run(signal, [unit[0] * scale, unit[1] * scale]);
            scale *= section.dc_gain();
        }
    }

    /// Zero-phase forward-backward filtering
    pub fn filtfilt(&self, signal: &[f64]) -> Result<Vec<f64>, VitalsError> {
        let n = signal.len();
        let pad = self.pad_len();
        if n <= pad {
            return Err(VitalsError::InsufficientSamples {
                required: pad + 1,
                available: n,
            });
        }

        let first = signal[0];
        let last = signal[n - 1];

        let mut extended = Vec::with_capacity(n + 2 * pad);
        extended.extend((0..pad).map(|i| 2.0 * first - signal[pad - i]));
        extended.extend_from_slice(signal);
        extended.extend((0..pad).map(|i| 2.0 * last - signal[n - 2 - i]));

        self.filter_in_place(&mut extended);
        extended.reverse();
        self.filter_in_place(&mut extended);
        extended.reverse();

        extended.truncate(pad + n);
        extended.drain(..pad);
        Ok(extended)
    }
}
