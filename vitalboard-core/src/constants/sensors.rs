//! Sensor Scale Factors
//!
//! Conversion constants from raw register counts to physical units, taken
//! from each part's datasheet and from the full-scale ranges the drivers
//! configure.

// ===== DHT20 =====

/// Full-scale relative humidity span (%RH per 2^20 counts).
pub const DHT20_HUMIDITY_SPAN_PCT: f32 = 100.0;

/// Full-scale temperature span (°C per 2^20 counts).
pub const DHT20_TEMP_SPAN_C: f32 = 200.0;

/// Offset subtracted after scaling temperature (°C).
pub const DHT20_TEMP_OFFSET_C: f32 = 50.0;

// ===== AGS10 =====

/// TVOC counts per ppm.
///
/// The 24-bit register holds ppb.
pub const AGS10_COUNTS_PER_PPM: f32 = 1000.0;

// ===== BH1750FVI =====

/// Counts per lux in high-resolution mode.
///
/// Source: BH1750FVI datasheet, "measurement accuracy" typical 1.2.
pub const BH1750_COUNTS_PER_LUX: f32 = 1.2;

// ===== BMP581 =====

/// Binary point of the temperature register (°C = raw / 2^16).
pub const BMP581_TEMP_FRACTION_BITS: u32 = 16;

/// Binary point of the pressure register (Pa = raw / 2^6).
pub const BMP581_PRESSURE_FRACTION_BITS: u32 = 6;

// ===== MPU6500 =====

/// Accelerometer sensitivity at ±8 g full scale (LSB/g).
pub const MPU6500_ACCEL_LSB_PER_G: f32 = 4096.0;

/// Gyroscope sensitivity at ±1000 dps full scale (LSB/dps).
pub const MPU6500_GYRO_LSB_PER_DPS: f32 = 32.8;

/// Temperature sensitivity (LSB/°C).
pub const MPU6500_TEMP_LSB_PER_C: f32 = 333.87;

/// Room-temperature offset of the temperature sensor (°C).
pub const MPU6500_TEMP_OFFSET_C: f32 = 21.0;

// ===== MAX30102 =====

/// Width of one FIFO channel sample.
pub const MAX30102_SAMPLE_BITS: u32 = 18;

/// Die temperature fraction step (°C per LSB of the fraction register).
pub const MAX30102_TEMP_FRACTION_STEP_C: f32 = 0.0625;
