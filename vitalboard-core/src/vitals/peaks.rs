//! Peak Detection
//!
//! Finds local maxima of a sampled signal, optionally drops those below a
//! height threshold, then enforces a minimum index separation by keeping
//! the tallest peak in every neighbourhood:
//!
//! ```text
//!            ▲ kept            ▲ kept
//!           ╱ ╲   △ dropped   ╱ ╲
//!          ╱   ╲_╱ ╲         ╱   ╲
//!      ___╱          ╲______╱     ╲___
//!          |<- distance ->|
//! ```
//!
//! Flat-topped peaks report the middle sample of the plateau (rounded
//! down). The first and last samples are never peaks. Valleys are found by
//! running the same search over the negated signal.

use alloc::vec::Vec;

/// Indices of strict local maxima, plateaus collapsed to their midpoint
pub fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    let n = signal.len();
    if n < 3 {
        return peaks;
    }

    let mut i = 1;
    while i < n - 1 {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Keep only peaks at least `distance` samples apart, tallest first
///
/// Ties are broken in favour of the later peak.
pub fn select_by_distance(signal: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut keep = alloc::vec![true; peaks.len()];

    let mut by_height: Vec<usize> = (0..peaks.len()).collect();
    by_height.sort_by(|&a, &b| signal[peaks[a]].total_cmp(&signal[peaks[b]]).then(a.cmp(&b)));

    for &j in by_height.iter().rev() {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

/// Local maxima at least `min_height` tall and `distance` samples apart
pub fn find_peaks(signal: &[f64], min_height: Option<f64>, distance: usize) -> Vec<usize> {
    let mut peaks = local_maxima(signal);
    if let Some(height) = min_height {
        peaks.retain(|&p| signal[p] >= height);
    }
    if distance > 1 {
        peaks = select_by_distance(signal, &peaks, distance);
    }
    peaks
}

/// Local minima `distance` samples apart (no height threshold)
pub fn find_valleys(signal: &[f64], distance: usize) -> Vec<usize> {
    let negated: Vec<f64> = signal.iter().map(|x| -x).collect();
    find_peaks(&negated, None, distance)
}
