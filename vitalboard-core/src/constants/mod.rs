//! Constants for VitalBoard Core
//!
//! Every register scale factor, calibration coefficient and timing value the
//! decoders and the vitals pipeline use lives here, with its unit in the
//! name and its datasheet source in the doc comment.
//!
//! ## Organization
//!
//! - **Sensors**: fixed-point scale factors and conversion offsets
//! - **Signal**: PPG sampling, filter and plausibility parameters
//! - **Time**: unit conversions and the retention horizon

/// Register scale factors and conversion offsets per sensor model.
pub mod sensors;

/// PPG sampling, filtering and vitals plausibility parameters.
pub mod signal;

/// Time unit conversions and retention defaults.
pub mod time;

pub use signal::{
    EFFECTIVE_SAMPLE_RATE_HZ, MIN_PEAK_HEIGHT, SPO2_FLOOR_PCT,
    VITALS_INVALID,
};

pub use time::{MS_PER_DAY, MS_PER_SECOND, DEFAULT_RETENTION_DAYS};
