//! Board Orchestrator
//!
//! ## Poll Cycle
//!
//! ```text
//! poll(bus, delay, t)
//!   ├─ DHT20     ──► record.dht20         (None on fault)
//!   ├─ AGS10     ──► record.ags10
//!   ├─ BH1750    ──► record.bh1750
//!   ├─ BMP581    ──► record.bmp581
//!   ├─ MPU6500   ──► record.mpu6500
//!   └─ MAX30102  ──► window.extend(samples)
//!                    record.vitals = estimator(window)
//! ```
//!
//! Sensors are read one after another on the same bus. A fault in one
//! sensor is logged, recorded in the [`PollOutcome`] and turned into
//! "unavailable" for that sensor only; the remaining sensors are still read
//! and the record is still produced.
//!
//! The PPG window is the only state carried from one cycle to the next. If
//! the PPG read faults, the window is left exactly as it was and the
//! cycle's vitals are unavailable.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::{
    buffer::PpgBuffer,
    config::BoardConfig,
    errors::SensorFault,
    record::SensorRecord,
    sensors::{Ags10, Bh1750, Bmp581, Dht20, Max30102, Mpu6500, Sensor, SENSOR_COUNT},
    time::Timestamp,
    traits::BusTransport,
    vitals::VitalsEstimator,
};

/// Faults collected over one pass across the board
pub type FaultList = Vec<SensorFault, SENSOR_COUNT>;

/// Result of one poll cycle
#[derive(Debug, Clone)]
pub struct PollOutcome {
    /// The record to persist
    pub record: SensorRecord,
    /// Sensors that faulted this cycle
    pub faults: FaultList,
}

/// Drivers, PPG window and estimator for one board
#[derive(Debug, Clone)]
pub struct SensorBoard {
    dht20: Dht20,
    ags10: Ags10,
    bh1750: Bh1750,
    bmp581: Bmp581,
    mpu6500: Mpu6500,
    max30102: Max30102,
    window: PpgBuffer,
    estimator: VitalsEstimator,
}

impl SensorBoard {
    /// Build a board from its configuration
    pub fn new(config: &BoardConfig) -> Self {
        let addresses = &config.addresses;
        Self {
            dht20: Dht20::new(addresses.dht20),
            ags10: Ags10::new(addresses.ags10),
            bh1750: Bh1750::new(addresses.bh1750),
            bmp581: Bmp581::new(addresses.bmp581),
            mpu6500: Mpu6500::new(addresses.mpu6500),
            max30102: Max30102::new(addresses.max30102),
            window: PpgBuffer::new(config.window_capacity),
            estimator: VitalsEstimator::new(config.estimator),
        }
    }

    /// Apply every sensor's startup configuration
    ///
    /// A sensor that fails to configure is reported and skipped; it is
    /// still polled and will fault (or recover) on its own.
    pub fn configure<B, D>(&mut self, bus: &mut B, delay: &mut D) -> FaultList
    where
        B: BusTransport,
        D: DelayNs,
    {
        let mut faults = FaultList::new();
        let results = [
            self.dht20.configure(bus, delay),
            self.ags10.configure(bus, delay),
            self.bh1750.configure(bus, delay),
            self.bmp581.configure(bus, delay),
            self.mpu6500.configure(bus, delay),
            self.max30102.configure(bus, delay),
        ];

        for fault in results.into_iter().filter_map(Result::err) {
            log_warn!("Configuration failed: {}", fault);
            let _ = faults.push(fault);
        }
        faults
    }

    /// Run one poll cycle and build the record stamped `timestamp`
    pub fn poll<B, D>(&mut self, bus: &mut B, delay: &mut D, timestamp: Timestamp) -> PollOutcome
    where
        B: BusTransport,
        D: DelayNs,
    {
        let mut faults = FaultList::new();
        let mut record = SensorRecord::new(timestamp);

        record.dht20 = acquire(&mut self.dht20, bus, delay, &mut faults);
        record.ags10 = acquire(&mut self.ags10, bus, delay, &mut faults);
        record.bh1750 = acquire(&mut self.bh1750, bus, delay, &mut faults);
        record.bmp581 = acquire(&mut self.bmp581, bus, delay, &mut faults);
        record.mpu6500 = acquire(&mut self.mpu6500, bus, delay, &mut faults);

        if let Some(ppg) = acquire(&mut self.max30102, bus, delay, &mut faults) {
            self.window.extend(ppg.samples);
            record.max30102_temperature_c = Some(ppg.temperature_c);
            record.vitals = Some(self.estimator.estimate(&self.window.snapshot()));
        }

        PollOutcome { record, faults }
    }

    /// Current PPG window
    pub fn window(&self) -> &PpgBuffer {
        &self.window
    }

    /// The vitals estimator
    pub fn estimator(&self) -> &VitalsEstimator {
        &self.estimator
    }
}

impl Default for SensorBoard {
    fn default() -> Self {
        Self::new(&BoardConfig::default())
    }
}

fn acquire<S, B, D>(sensor: &mut S, bus: &mut B, delay: &mut D, faults: &mut FaultList) -> Option<S::Reading>
where
    S: Sensor,
    B: BusTransport,
    D: DelayNs,
{
    match sensor.read(bus, delay) {
        Ok(reading) => Some(reading),
        Err(fault) => {
            log_warn!("{}", fault);
            let _ = faults.push(fault);
            None
        }
    }
}
