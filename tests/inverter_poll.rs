//! Full poll-cycle tests against the simulated inverter
//!
//! Exercises the whole chain: name resolution, range coalescing, cached
//! plans, per-range reads and result assembly, the way a polling host
//! drives the engine.

use growatt_modbus::catalog::{
    inverter, ATTR_AC_CHARGE_ENABLED, ATTR_FREQUENCY, ATTR_INPUT_1_VOLTAGE, ATTR_OUTPUT_POWER,
    ATTR_SOC_PERCENTAGE, ATTR_STATUS, ATTR_TIME_1, ATTR_TIME_1_PRIORITY,
};
use growatt_modbus::codec::{encode_schedule_end, encode_schedule_start, SchedulePriority};
use growatt_modbus::device::GrowattDevice;
use growatt_modbus::simulator::SimulatedInverter;
use growatt_modbus::RegisterValue;
use tracing_test::traced_test;

fn simulated_device() -> GrowattDevice<SimulatedInverter> {
    let sim = SimulatedInverter::new();

    // Telemetry block: status Normal, PV1 at 235.7 V, 4.2 kW output,
    // mains at 49.98 Hz.
    sim.set_input_registers(0, &[1]);
    sim.set_input_registers(3, &[2357]);
    sim.set_input_registers(35, &[0, 42000]);
    sim.set_input_registers(37, &[4998]);
    // Battery block sits far away in the register space.
    sim.set_input_registers(3171, &[87]);

    // Identity block.
    sim.set_holding_registers(9, &growatt_modbus::codec::encode_string("AK1.0", 6));
    sim.set_holding_registers(28, &[0x1234, 0x5678]);
    sim.set_holding_registers(43, &[300]);
    sim.set_holding_registers(44, &[0x0203]);
    sim.set_holding_registers(88, &[305]);
    sim.set_holding_registers(
        3001,
        &growatt_modbus::codec::encode_string("GT1234567A", 15),
    );

    // Schedule window 1: 10:45 to 14:30, battery priority, enabled.
    sim.set_holding_registers(
        3038,
        &[
            encode_schedule_start(10, 45, SchedulePriority::Battery, true),
            encode_schedule_end(14, 30),
        ],
    );

    GrowattDevice::new(sim, inverter::catalog())
}

#[tokio::test]
#[traced_test]
async fn test_telemetry_poll_cycle() {
    let device = simulated_device();

    let keys = device.keys_for_names([
        ATTR_STATUS,
        ATTR_INPUT_1_VOLTAGE,
        ATTR_OUTPUT_POWER,
        ATTR_FREQUENCY,
        ATTR_SOC_PERCENTAGE,
    ]);
    let results = device.update(&keys).await.unwrap();

    assert_eq!(
        results.get(ATTR_INPUT_1_VOLTAGE),
        Some(&RegisterValue::Float(235.7))
    );
    assert_eq!(
        results.get(ATTR_OUTPUT_POWER),
        Some(&RegisterValue::Float(4200.0))
    );
    assert_eq!(
        results.get(ATTR_FREQUENCY),
        Some(&RegisterValue::Float(49.98))
    );
    assert_eq!(
        results.get(ATTR_SOC_PERCENTAGE),
        Some(&RegisterValue::Integer(87))
    );
    assert_eq!(device.status(&results), "Normal");

    // Registers 0..=105 fit in two spans; 3171 needs its own read.
    assert_eq!(device.transport().read_count(), 3);
}

#[tokio::test]
async fn test_poll_plan_is_stable_across_cycles() {
    let device = simulated_device();
    let keys = device.keys_for_names([ATTR_INPUT_1_VOLTAGE, ATTR_FREQUENCY]);

    let first = device.update(&keys).await.unwrap();
    let reads_after_first = device.transport().read_count();
    let second = device.update(&keys).await.unwrap();

    assert_eq!(first, second);
    // same number of reads again: identical cached plan
    assert_eq!(device.transport().read_count(), reads_after_first * 2);
}

#[tokio::test]
async fn test_holding_poll_decodes_schedule_window() {
    let device = simulated_device();

    let keys = device.holding_keys_for_names([ATTR_TIME_1, ATTR_TIME_1_PRIORITY]);
    let results = device.update_holding(&keys).await.unwrap();

    match results.get(ATTR_TIME_1) {
        Some(RegisterValue::Schedule(window)) => {
            assert_eq!(window.start_time(), "10:45");
            assert_eq!(window.end_time(), "14:30");
            assert_eq!(window.priority, SchedulePriority::Battery);
            assert!(window.enabled);
        }
        other => panic!("expected schedule window, got {other:?}"),
    }
    assert_eq!(
        results.get(ATTR_TIME_1_PRIORITY),
        Some(&RegisterValue::Text("Battery".to_string()))
    );
}

#[tokio::test]
async fn test_device_info_assembly() {
    let device = simulated_device();
    let info = device.device_info().await.unwrap();

    assert_eq!(info.serial_number, "GT1234567A");
    assert_eq!(info.firmware, "AK1.0");
    assert_eq!(info.model, "A1 B2 D3 T4 P5 U6 M7 S8");
    assert_eq!(info.mppt_trackers, 2);
    assert_eq!(info.grid_phases, 3);
    assert_eq!(info.modbus_version, 3.05);
    assert_eq!(info.device_type, 300);
}

#[tokio::test]
async fn test_charge_enable_write_and_readback() {
    let device = simulated_device();

    device.write_register(3049, 1).await.unwrap();
    let keys = device.holding_keys_for_names([ATTR_AC_CHARGE_ENABLED]);
    let results = device.update_holding(&keys).await.unwrap();
    assert_eq!(
        results.get(ATTR_AC_CHARGE_ENABLED),
        Some(&RegisterValue::Integer(1))
    );
}

#[tokio::test]
async fn test_results_serialize_for_downstream_consumers() {
    let device = simulated_device();
    let keys = device.keys_for_names([ATTR_INPUT_1_VOLTAGE]);
    let results = device.update(&keys).await.unwrap();

    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json["input_1_voltage"], 235.7);
}
