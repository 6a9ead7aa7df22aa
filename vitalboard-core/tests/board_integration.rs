//! Board poll cycle tests
//!
//! Drive the full six-sensor board against a scripted bus and check that
//! faults stay confined to the sensor that produced them.

mod common;

use common::{fixtures, generators, MockBus, NoDelay};
use vitalboard_core::{
    sensors::{ags10, bh1750, bmp581, dht20, max30102, mpu6500},
    BusError, PpgSample, SensorBoard, SensorError, SensorId,
};

const T0: u64 = 1_700_000_000_000;

fn board() -> (SensorBoard, MockBus, NoDelay) {
    (SensorBoard::default(), MockBus::reference_board(), NoDelay::default())
}

fn fault_ids(outcome: &vitalboard_core::PollOutcome) -> Vec<SensorId> {
    outcome.faults.iter().map(|f| f.sensor).collect()
}

#[test]
fn healthy_board_fills_every_field() {
    let (mut board, mut bus, mut delay) = board();

    let outcome = board.poll(&mut bus, &mut delay, T0);
    let record = outcome.record;

    assert!(outcome.faults.is_empty());
    assert_eq!(record.timestamp, T0);
    assert_eq!(record.available_count(), 6);

    let dht = record.dht20.unwrap();
    assert_eq!(dht.humidity_pct, 50.0);
    assert_eq!(dht.temperature_c, 12.5);

    assert!((record.ags10.unwrap().tvoc_ppm - 1.234).abs() < 1e-6);
    assert!((record.bh1750.unwrap().lux - 100.0).abs() < 1e-3);

    let bmp = record.bmp581.unwrap();
    assert_eq!(bmp.temperature_c, 25.0);
    assert_eq!(bmp.pressure_pa, 101_325.0);

    let mpu = record.mpu6500.unwrap();
    assert_eq!(mpu.accel_g, [0.0, 0.0, 1.0]);
    assert_eq!(mpu.gyro_dps, [0.0, 0.0, 0.0]);
    assert!((mpu.temperature_c - 21.0).abs() < 1e-4);

    assert_eq!(record.max30102_temperature_c, Some(25.5));

    // Empty window: the PPG sensor answered but there is nothing to estimate
    let vitals = record.vitals.unwrap();
    assert!(!vitals.is_valid());
    assert_eq!(vitals.heart_rate_bpm, -1.0);
    assert_eq!(vitals.spo2_percent, -1.0);

    // DHT20 measurement wait
    assert!(delay.total_ns >= u64::from(dht20::MEASUREMENT_DELAY_MS) * 1_000_000);
}

#[test]
fn poll_triggers_dht20_and_restarts_die_temperature() {
    let (mut board, mut bus, mut delay) = board();
    board.poll(&mut bus, &mut delay, T0);

    assert!(bus
        .writes
        .contains(&(dht20::ADDRESS, vec![dht20::CMD_TRIGGER, 0x33, 0x00])));
    assert_eq!(
        bus.register_writes(max30102::ADDRESS),
        vec![(max30102::reg::TEMP_CONFIG, max30102::TEMP_START)]
    );
}

#[test]
fn unanswered_sensor_is_isolated() {
    let (mut board, mut bus, mut delay) = board();
    bus.fail(ags10::ADDRESS);

    let outcome = board.poll(&mut bus, &mut delay, T0);

    assert_eq!(fault_ids(&outcome), vec![SensorId::Ags10]);
    assert_eq!(outcome.faults[0].error, SensorError::Transport(BusError::NoAcknowledge));
    assert!(outcome.record.ags10.is_none());
    assert!(outcome.record.dht20.is_some());
    assert!(outcome.record.bh1750.is_some());
    assert!(outcome.record.bmp581.is_some());
    assert!(outcome.record.mpu6500.is_some());
    assert!(outcome.record.vitals.is_some());
    assert_eq!(outcome.record.available_count(), 5);
}

#[test]
fn sensor_recovers_on_next_cycle() {
    let (mut board, mut bus, mut delay) = board();
    bus.fail(bh1750::ADDRESS);
    assert!(board.poll(&mut bus, &mut delay, T0).record.bh1750.is_none());

    bus.recover(bh1750::ADDRESS);
    let outcome = board.poll(&mut bus, &mut delay, T0 + 500);
    assert!(outcome.faults.is_empty());
    assert!(outcome.record.bh1750.is_some());
}

#[test]
fn dht20_checksum_fault() {
    let (mut board, mut bus, mut delay) = board();
    let mut block = fixtures::DHT20_BLOCK;
    block[6] ^= 0x01;
    bus.set_raw(dht20::ADDRESS, &block);

    let outcome = board.poll(&mut bus, &mut delay, T0);

    assert_eq!(fault_ids(&outcome), vec![SensorId::Dht20]);
    assert_eq!(
        outcome.faults[0].error,
        SensorError::ChecksumMismatch { computed: 0x84, expected: 0x85 }
    );
    assert!(outcome.record.dht20.is_none());
    assert_eq!(outcome.record.available_count(), 5);
}

#[test]
fn dht20_busy_block() {
    let (mut board, mut bus, mut delay) = board();
    bus.set_raw(
        dht20::ADDRESS,
        &fixtures::dht20_block([0x9C, 0x80, 0x00, 0x05, 0x00, 0x00]),
    );

    let outcome = board.poll(&mut bus, &mut delay, T0);

    assert_eq!(fault_ids(&outcome), vec![SensorId::Dht20]);
    assert_eq!(outcome.faults[0].error, SensorError::DeviceBusy);
}

#[test]
fn dht20_uncalibrated() {
    let (mut board, mut bus, mut delay) = board();
    bus.set_raw(dht20::ADDRESS, &[0x08]);

    let outcome = board.poll(&mut bus, &mut delay, T0);

    assert_eq!(fault_ids(&outcome), vec![SensorId::Dht20]);
    assert!(matches!(outcome.faults[0].error, SensorError::NotReady { .. }));
    // No trigger is sent to an uncalibrated sensor
    assert!(bus.writes.iter().all(|(address, _)| *address != dht20::ADDRESS));
}

#[test]
fn ags10_stale_data() {
    let (mut board, mut bus, mut delay) = board();
    bus.set_register(ags10::ADDRESS, ags10::REG_DATA, &[0x01, 0x00, 0x04, 0xD2, 0x00]);

    let outcome = board.poll(&mut bus, &mut delay, T0);

    assert_eq!(fault_ids(&outcome), vec![SensorId::Ags10]);
    assert!(matches!(outcome.faults[0].error, SensorError::NotReady { .. }));
}

#[test]
fn ppg_samples_enter_the_window() {
    let (mut board, mut bus, mut delay) = board();
    let samples = generators::ppg(200.0, 400.0, 24.0, 25);
    bus.load_fifo(&samples);

    let outcome = board.poll(&mut bus, &mut delay, T0);

    assert!(outcome.faults.is_empty());
    assert_eq!(board.window().len(), 25);
    assert_eq!(bus.fifo_remaining(), 0);
    let window: Vec<PpgSample> = board.window().snapshot().iter().copied().collect();
    assert_eq!(window, samples);
}

#[test]
fn ppg_fifo_wraps_around() {
    let (mut board, mut bus, mut delay) = board();
    let samples = generators::ppg(200.0, 400.0, 24.0, 5);
    // read pointer 30, write pointer 3
    bus.load_fifo_at(30, &samples);

    board.poll(&mut bus, &mut delay, T0);

    assert_eq!(board.window().len(), 5);
}

#[test]
fn ppg_fault_leaves_window_untouched() {
    let (mut board, mut bus, mut delay) = board();
    bus.load_fifo(&generators::ppg(200.0, 400.0, 24.0, 20));
    board.poll(&mut bus, &mut delay, T0);
    assert_eq!(board.window().len(), 20);
    let before: Vec<PpgSample> = board.window().snapshot().iter().copied().collect();

    bus.fail(max30102::ADDRESS);
    let outcome = board.poll(&mut bus, &mut delay, T0 + 500);

    assert_eq!(fault_ids(&outcome), vec![SensorId::Max30102]);
    assert!(outcome.record.vitals.is_none());
    assert!(outcome.record.max30102_temperature_c.is_none());
    let after: Vec<PpgSample> = board.window().snapshot().iter().copied().collect();
    assert_eq!(before, after);
}

#[test]
fn negative_die_temperature() {
    let (mut board, mut bus, mut delay) = board();
    bus.set_register(max30102::ADDRESS, max30102::reg::TEMP_INT, &[0xFE]);
    bus.set_register(max30102::ADDRESS, max30102::reg::TEMP_FRAC, &[0x04]);

    let outcome = board.poll(&mut bus, &mut delay, T0);
    assert_eq!(outcome.record.max30102_temperature_c, Some(-1.75));
}

#[test]
fn every_sensor_failing_still_produces_a_record() {
    let (mut board, mut bus, mut delay) = board();
    for address in [
        dht20::ADDRESS,
        ags10::ADDRESS,
        bh1750::ADDRESS,
        bmp581::ADDRESS,
        mpu6500::ADDRESS,
        max30102::ADDRESS,
    ] {
        bus.fail(address);
    }

    let outcome = board.poll(&mut bus, &mut delay, T0);

    assert_eq!(fault_ids(&outcome), SensorId::ALL.to_vec());
    assert_eq!(outcome.record.timestamp, T0);
    assert_eq!(outcome.record.available_count(), 0);
    assert!(outcome.record.vitals.is_none());

    let flat = outcome.record.to_flat();
    assert_eq!(flat.timestamp, T0);
    assert!(flat.dht20_temperature.is_none());
    assert!(flat.heart_rate_bpm.is_none());
}

#[test]
fn configure_writes_startup_registers() {
    let (mut board, mut bus, mut delay) = board();

    let faults = board.configure(&mut bus, &mut delay);
    assert!(faults.is_empty());

    assert_eq!(
        bus.opcode_writes(bh1750::ADDRESS),
        vec![bh1750::OP_POWER_ON, bh1750::OP_RESET, bh1750::OP_CONTINUOUS_HIGH_RES]
    );
    assert_eq!(bus.register_writes(bmp581::ADDRESS), bmp581::CONFIG_WRITES.to_vec());

    let mpu = bus.register_writes(mpu6500::ADDRESS);
    assert_eq!(mpu[0], (mpu6500::reg::PWR_MGMT_1, 0x00));
    assert_eq!(&mpu[1..], &mpu6500::CONFIG_WRITES[..]);

    assert_eq!(bus.register_writes(max30102::ADDRESS), max30102::CONFIG_WRITES.to_vec());
    assert!(delay.total_ns >= u64::from(mpu6500::WAKE_DELAY_MS) * 1_000_000);
}

#[test]
fn bmp581_startup_fault_skips_configuration() {
    let (mut board, mut bus, mut delay) = board();
    bus.set_register(bmp581::ADDRESS, bmp581::reg::INT_STATUS, &[0x00]);

    let faults = board.configure(&mut bus, &mut delay);

    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].sensor, SensorId::Bmp581);
    assert!(matches!(faults[0].error, SensorError::NotReady { .. }));
    assert!(bus.register_writes(bmp581::ADDRESS).is_empty());
    // Other sensors were still configured
    assert!(!bus.register_writes(max30102::ADDRESS).is_empty());
}
