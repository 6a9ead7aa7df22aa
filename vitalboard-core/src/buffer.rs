//! Rolling PPG Window and Ring Index Arithmetic
//!
//! ## Overview
//!
//! The vitals estimator needs the last few seconds of optical samples, but
//! the PPG sensor hands them over in bursts of 0..=32 per poll cycle. The
//! [`PpgBuffer`] keeps a bounded, time-ordered window of those samples:
//!
//! - `push()` appends at the back
//! - once the window is over capacity the oldest samples are dropped from
//!   the front until exactly `capacity` remain
//! - `snapshot()` hands out a read-only view; nothing is copied or moved out
//!
//! An evicted sample is gone: the buffer owns its samples and only lends
//! them out for the duration of a borrow.
//!
//! ```text
//! capacity = 4
//!
//! push 1,2,3,4      [1 2 3 4]
//! push 5            [2 3 4 5]   1 evicted
//! push 6,7          [4 5 6 7]   2,3 evicted
//! ```
//!
//! ## Hardware FIFO Pointers
//!
//! The PPG sensor buffers samples in a 32-slot circular FIFO and exposes a
//! write pointer and a read pointer. The number of unread samples is the
//! forward distance from read to write around the ring, which
//! [`ring_distance`] computes without any branching on the wrap case.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// Number of slots in the PPG sensor's hardware FIFO
pub const PPG_FIFO_SLOTS: u8 = 32;

/// Default window length (12 s at 25 Hz effective rate)
pub const DEFAULT_WINDOW_CAPACITY: usize = 300;

/// Forward distance from `from` to `to` on a ring of `size` slots
///
/// ```rust
/// use vitalboard_core::buffer::ring_distance;
///
/// assert_eq!(ring_distance(3, 10, 32), 7);
/// assert_eq!(ring_distance(30, 2, 32), 4);   // wrapped
/// assert_eq!(ring_distance(5, 5, 32), 0);    // nothing new
/// ```
///
/// An empty ring has no distance: `size == 0` yields 0.
pub const fn ring_distance(from: u8, to: u8, size: u8) -> u8 {
    if size == 0 {
        return 0;
    }
    let size = size as u16;
    let from = from as u16 % size;
    let to = to as u16 % size;
    ((to + size - from) % size) as u8
}

/// One optical sample pair as read from the sensor FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PpgSample {
    /// Red LED intensity (18-bit ADC counts)
    pub red: u32,
    /// Infrared LED intensity (18-bit ADC counts)
    pub ir: u32,
}

impl PpgSample {
    /// Create a sample pair
    pub const fn new(red: u32, ir: u32) -> Self {
        Self { red, ir }
    }
}

/// Bounded FIFO window of PPG samples
#[derive(Debug, Clone)]
pub struct PpgBuffer {
    samples: VecDeque<PpgSample>,
    capacity: usize,
}

impl PpgBuffer {
    /// Create an empty window holding at most `capacity` samples
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + PPG_FIFO_SLOTS as usize),
            capacity,
        }
    }

    /// Append one sample, evicting the oldest ones if over capacity
    pub fn push(&mut self, sample: PpgSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Append a burst of samples in order
    ///
    /// An empty burst leaves the window untouched.
    pub fn extend<I>(&mut self, burst: I)
    where
        I: IntoIterator<Item = PpgSample>,
    {
        for sample in burst {
            self.push(sample);
        }
    }

    /// Read-only view of the current window, oldest first
    pub fn snapshot(&self) -> PpgWindow<'_> {
        PpgWindow { samples: &self.samples }
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check if the window is at capacity
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Maximum number of samples held
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every sample
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for PpgBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

/// Borrowed, time-ordered view over a [`PpgBuffer`]
#[derive(Debug, Clone, Copy)]
pub struct PpgWindow<'a> {
    samples: &'a VecDeque<PpgSample>,
}

impl<'a> PpgWindow<'a> {
    /// Number of samples in the view
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the view is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &'a PpgSample> + 'a {
        self.samples.iter()
    }

    /// Red channel as floating point, oldest first
    pub fn red(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.red as f64).collect()
    }

    /// Infrared channel as floating point, oldest first
    pub fn ir(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.ir as f64).collect()
    }
}
