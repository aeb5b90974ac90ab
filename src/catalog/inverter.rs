//! Register tables for the Growatt inverter device type
//!
//! Addresses, lengths and scales follow the Growatt Modbus register map.
//! The schedule windows live in the holding registers from 3038 upward;
//! window 1 additionally exposes sub-field descriptors over the same
//! physical registers.

use super::*;
use crate::codec::{
    decode_byte_pair, decode_model, decode_schedule_end, decode_schedule_priority,
    decode_schedule_start, decode_schedule_window,
};

// Custom bit-field decoders, catalog signature `fn(&[u16]) -> RegisterValue`.

fn model_value(words: &[u16]) -> RegisterValue {
    RegisterValue::Text(decode_model(words))
}

fn schedule_window_value(words: &[u16]) -> RegisterValue {
    RegisterValue::Schedule(decode_schedule_window(words))
}

fn schedule_start_value(words: &[u16]) -> RegisterValue {
    RegisterValue::Text(decode_schedule_start(words))
}

fn schedule_end_value(words: &[u16]) -> RegisterValue {
    RegisterValue::Text(decode_schedule_end(words))
}

fn schedule_priority_value(words: &[u16]) -> RegisterValue {
    RegisterValue::Text(decode_schedule_priority(words).as_str().to_string())
}

fn trackers_and_phases_value(words: &[u16]) -> RegisterValue {
    let (trackers, phases) = decode_byte_pair(words);
    RegisterValue::Pair(trackers, phases)
}

/// Holding registers: configuration and identity, read-write
pub const HOLDING_REGISTERS: &[RegisterDescriptor] = &[
    RegisterDescriptor::string(ATTR_FIRMWARE, 9, 6),
    RegisterDescriptor::string(ATTR_SERIAL_NUMBER, 3001, 15),
    RegisterDescriptor::custom(ATTR_INVERTER_MODEL, 28, 2, model_value),
    RegisterDescriptor::custom(ATTR_TIME_1, 3038, 2, schedule_window_value),
    RegisterDescriptor::custom(ATTR_TIME_1_START, 3038, 1, schedule_start_value),
    RegisterDescriptor::custom(ATTR_TIME_1_END, 3039, 1, schedule_end_value),
    RegisterDescriptor::custom(ATTR_TIME_1_PRIORITY, 3038, 1, schedule_priority_value),
    RegisterDescriptor::custom(ATTR_TIME_2, 3040, 2, schedule_window_value),
    RegisterDescriptor::custom(ATTR_TIME_3, 3042, 2, schedule_window_value),
    RegisterDescriptor::custom(ATTR_TIME_4, 3044, 2, schedule_window_value),
    RegisterDescriptor::int(ATTR_DEVICE_TYPE_CODE, 43),
    RegisterDescriptor::custom(
        ATTR_NUMBER_OF_TRACKERS_AND_PHASES,
        44,
        1,
        trackers_and_phases_value,
    ),
    RegisterDescriptor::float(ATTR_MODBUS_VERSION, 88).with_scale(100),
    RegisterDescriptor::int(ATTR_AC_CHARGE_ENABLED, 3049),
];

/// Input registers: live telemetry, read-only
pub const INPUT_REGISTERS: &[RegisterDescriptor] = &[
    RegisterDescriptor::int(ATTR_STATUS_CODE, 0),
    RegisterDescriptor::float(ATTR_INPUT_POWER, 1).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_1_VOLTAGE, 3),
    RegisterDescriptor::float(ATTR_INPUT_1_AMPERAGE, 4),
    RegisterDescriptor::float(ATTR_INPUT_1_POWER, 5).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_2_VOLTAGE, 7),
    RegisterDescriptor::float(ATTR_INPUT_2_AMPERAGE, 8),
    RegisterDescriptor::float(ATTR_INPUT_2_POWER, 9).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_3_VOLTAGE, 11),
    RegisterDescriptor::float(ATTR_INPUT_3_AMPERAGE, 12),
    RegisterDescriptor::float(ATTR_INPUT_3_POWER, 13).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_4_VOLTAGE, 15),
    RegisterDescriptor::float(ATTR_INPUT_4_AMPERAGE, 16),
    RegisterDescriptor::float(ATTR_INPUT_4_POWER, 17).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_5_VOLTAGE, 19),
    RegisterDescriptor::float(ATTR_INPUT_5_AMPERAGE, 20),
    RegisterDescriptor::float(ATTR_INPUT_5_POWER, 21).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_6_VOLTAGE, 23),
    RegisterDescriptor::float(ATTR_INPUT_6_AMPERAGE, 24),
    RegisterDescriptor::float(ATTR_INPUT_6_POWER, 25).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_7_VOLTAGE, 27),
    RegisterDescriptor::float(ATTR_INPUT_7_AMPERAGE, 28),
    RegisterDescriptor::float(ATTR_INPUT_7_POWER, 29).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_8_VOLTAGE, 31),
    RegisterDescriptor::float(ATTR_INPUT_8_AMPERAGE, 32),
    RegisterDescriptor::float(ATTR_INPUT_8_POWER, 33).with_length(2),
    RegisterDescriptor::float(ATTR_OUTPUT_POWER, 35).with_length(2),
    RegisterDescriptor::float(ATTR_FREQUENCY, 37).with_scale(100),
    RegisterDescriptor::float(ATTR_OUTPUT_1_VOLTAGE, 38),
    RegisterDescriptor::float(ATTR_OUTPUT_1_AMPERAGE, 39),
    RegisterDescriptor::float(ATTR_OUTPUT_1_POWER, 40).with_length(2),
    RegisterDescriptor::float(ATTR_OUTPUT_2_VOLTAGE, 42),
    RegisterDescriptor::float(ATTR_OUTPUT_2_AMPERAGE, 43),
    RegisterDescriptor::float(ATTR_OUTPUT_2_POWER, 44).with_length(2),
    RegisterDescriptor::float(ATTR_OUTPUT_3_VOLTAGE, 46),
    RegisterDescriptor::float(ATTR_OUTPUT_3_AMPERAGE, 47),
    RegisterDescriptor::float(ATTR_OUTPUT_3_POWER, 48).with_length(2),
    RegisterDescriptor::float(ATTR_OUTPUT_ENERGY_TODAY, 53).with_length(2),
    RegisterDescriptor::float(ATTR_OUTPUT_ENERGY_TOTAL, 55).with_length(2),
    RegisterDescriptor::float(ATTR_OPERATION_HOURS, 57)
        .with_length(2)
        .with_scale(7200),
    RegisterDescriptor::float(ATTR_INPUT_1_ENERGY_TODAY, 59).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_1_ENERGY_TOTAL, 61).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_2_ENERGY_TODAY, 63).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_2_ENERGY_TOTAL, 65).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_3_ENERGY_TODAY, 67).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_3_ENERGY_TOTAL, 69).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_4_ENERGY_TODAY, 71).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_4_ENERGY_TOTAL, 73).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_5_ENERGY_TODAY, 75).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_5_ENERGY_TOTAL, 77).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_6_ENERGY_TODAY, 79).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_6_ENERGY_TOTAL, 81).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_7_ENERGY_TODAY, 83).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_7_ENERGY_TOTAL, 85).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_8_ENERGY_TODAY, 87).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_8_ENERGY_TOTAL, 89).with_length(2),
    RegisterDescriptor::float(ATTR_INPUT_ENERGY_TOTAL, 91).with_length(2),
    RegisterDescriptor::float(ATTR_TEMPERATURE, 93),
    RegisterDescriptor::float(ATTR_IPM_TEMPERATURE, 94),
    RegisterDescriptor::float(ATTR_BOOST_TEMPERATURE, 95),
    RegisterDescriptor::float(ATTR_P_BUS_VOLTAGE, 98),
    RegisterDescriptor::float(ATTR_N_BUS_VOLTAGE, 99),
    RegisterDescriptor::int(ATTR_OUTPUT_PERCENTAGE, 101),
    RegisterDescriptor::int(ATTR_DERATING_MODE, 104),
    RegisterDescriptor::int(ATTR_FAULT_CODE, 105),
    RegisterDescriptor::int(ATTR_WARNING_CODE, 110).with_length(2),
    RegisterDescriptor::float(ATTR_OUTPUT_REACTIVE_POWER, 58).with_length(2),
    RegisterDescriptor::float(ATTR_OUTPUT_REACTIVE_ENERGY_TODAY, 60).with_length(2),
    RegisterDescriptor::float(ATTR_OUTPUT_REACTIVE_ENERGY_TOTAL, 62).with_length(2),
    RegisterDescriptor::int(ATTR_WARNING_VALUE, 65),
    RegisterDescriptor::int(ATTR_SOC_PERCENTAGE, 3171),
    RegisterDescriptor::float(ATTR_DISCHARGE_POWER, 3178).with_length(2),
    RegisterDescriptor::float(ATTR_CHARGE_POWER, 3180).with_length(2),
    RegisterDescriptor::float(ATTR_ENERGY_TO_USER_TODAY, 3067).with_length(2),
    RegisterDescriptor::float(ATTR_ENERGY_TO_USER_TOTAL, 3069).with_length(2),
    RegisterDescriptor::float(ATTR_ENERGY_TO_GRID_TODAY, 3071).with_length(2),
    RegisterDescriptor::float(ATTR_ENERGY_TO_GRID_TOTAL, 3073).with_length(2),
    RegisterDescriptor::float(ATTR_DISCHARGE_ENERGY_TODAY, 3125).with_length(2),
    RegisterDescriptor::float(ATTR_DISCHARGE_ENERGY_TOTAL, 3127).with_length(2),
    RegisterDescriptor::float(ATTR_CHARGE_ENERGY_TODAY, 3129).with_length(2),
    RegisterDescriptor::float(ATTR_CHARGE_ENERGY_TOTAL, 3131).with_length(2),
];

/// The inverter device-type catalog
pub const fn catalog() -> DeviceRegisters {
    DeviceRegisters::new(HOLDING_REGISTERS, INPUT_REGISTERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SchedulePriority;

    #[test]
    fn test_schedule_sub_fields_share_registers() {
        let start_word =
            crate::codec::encode_schedule_start(6, 30, SchedulePriority::Grid, true);
        let end_word = crate::codec::encode_schedule_end(8, 0);

        assert_eq!(
            schedule_window_value(&[start_word, end_word]),
            RegisterValue::Schedule(crate::codec::decode_schedule_window(&[
                start_word, end_word
            ]))
        );
        assert_eq!(
            schedule_start_value(&[start_word]),
            RegisterValue::Text("06:30".to_string())
        );
        assert_eq!(
            schedule_end_value(&[end_word]),
            RegisterValue::Text("08:00".to_string())
        );
        assert_eq!(
            schedule_priority_value(&[start_word]),
            RegisterValue::Text("Grid".to_string())
        );
    }

    #[test]
    fn test_trackers_and_phases_unpacking() {
        // two trackers, three phases packed high/low
        assert_eq!(
            trackers_and_phases_value(&[0x0203]),
            RegisterValue::Pair(2, 3)
        );
    }

    #[test]
    fn test_model_descriptor_wiring() {
        let catalog = catalog();
        let desc = catalog.holding_by_name(ATTR_INVERTER_MODEL).unwrap();
        assert_eq!(desc.address, 28);
        assert_eq!(
            desc.decode(&[0x1234, 0x5678]),
            RegisterValue::Text("A1 B2 D3 T4 P5 U6 M7 S8".to_string())
        );
    }

    #[test]
    fn test_operation_hours_scale() {
        let catalog = catalog();
        let desc = catalog.input_by_name(ATTR_OPERATION_HOURS).unwrap();
        assert_eq!(desc.scale, 7200);
        // 7200 half-second ticks per hour
        assert_eq!(desc.decode(&[0x0000, 7200]), RegisterValue::Float(1.0));
    }
}
