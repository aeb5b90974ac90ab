//! Register catalog
//!
//! Declarative mapping from attribute names to register locations and
//! decoding rules. Catalogs are immutable per-device-type tables built
//! once at startup; the engine only ever reads them.

pub mod inverter;

use crate::codec::{self, RegisterValue};
use crate::error::{GrowattError, Result};
use std::collections::HashSet;

// ============================================================================
// Attribute Names
// ============================================================================

// Holding register attributes
pub const ATTR_FIRMWARE: &str = "firmware";
pub const ATTR_SERIAL_NUMBER: &str = "serial number";
pub const ATTR_INVERTER_MODEL: &str = "Inverter model";
pub const ATTR_DEVICE_TYPE_CODE: &str = "device type code";
pub const ATTR_NUMBER_OF_TRACKERS_AND_PHASES: &str = "number of trackers and phases";
pub const ATTR_MODBUS_VERSION: &str = "modbus version";
pub const ATTR_AC_CHARGE_ENABLED: &str = "ac charge enabled";

pub const ATTR_TIME_1: &str = "time_1";
pub const ATTR_TIME_1_START: &str = "time_1_start";
pub const ATTR_TIME_1_END: &str = "time_1_end";
pub const ATTR_TIME_1_PRIORITY: &str = "time_1_priority";
pub const ATTR_TIME_2: &str = "time_2";
pub const ATTR_TIME_3: &str = "time_3";
pub const ATTR_TIME_4: &str = "time_4";

// Input register attributes
pub const ATTR_STATUS: &str = "status";
pub const ATTR_STATUS_CODE: &str = "status_code";
pub const ATTR_DERATING_MODE: &str = "derating_mode";
pub const ATTR_FAULT_CODE: &str = "fault_code";
pub const ATTR_WARNING_CODE: &str = "warning_code";
pub const ATTR_WARNING_VALUE: &str = "warning_value";

pub const ATTR_INPUT_POWER: &str = "input_power";
pub const ATTR_INPUT_ENERGY_TOTAL: &str = "input_energy_total";

pub const ATTR_INPUT_1_VOLTAGE: &str = "input_1_voltage";
pub const ATTR_INPUT_1_AMPERAGE: &str = "input_1_amperage";
pub const ATTR_INPUT_1_POWER: &str = "input_1_power";
pub const ATTR_INPUT_1_ENERGY_TODAY: &str = "input_1_energy_today";
pub const ATTR_INPUT_1_ENERGY_TOTAL: &str = "input_1_energy_total";

pub const ATTR_INPUT_2_VOLTAGE: &str = "input_2_voltage";
pub const ATTR_INPUT_2_AMPERAGE: &str = "input_2_amperage";
pub const ATTR_INPUT_2_POWER: &str = "input_2_power";
pub const ATTR_INPUT_2_ENERGY_TODAY: &str = "input_2_energy_today";
pub const ATTR_INPUT_2_ENERGY_TOTAL: &str = "input_2_energy_total";

pub const ATTR_INPUT_3_VOLTAGE: &str = "input_3_voltage";
pub const ATTR_INPUT_3_AMPERAGE: &str = "input_3_amperage";
pub const ATTR_INPUT_3_POWER: &str = "input_3_power";
pub const ATTR_INPUT_3_ENERGY_TODAY: &str = "input_3_energy_today";
pub const ATTR_INPUT_3_ENERGY_TOTAL: &str = "input_3_energy_total";

pub const ATTR_INPUT_4_VOLTAGE: &str = "input_4_voltage";
pub const ATTR_INPUT_4_AMPERAGE: &str = "input_4_amperage";
pub const ATTR_INPUT_4_POWER: &str = "input_4_power";
pub const ATTR_INPUT_4_ENERGY_TODAY: &str = "input_4_energy_today";
pub const ATTR_INPUT_4_ENERGY_TOTAL: &str = "input_4_energy_total";

pub const ATTR_INPUT_5_VOLTAGE: &str = "input_5_voltage";
pub const ATTR_INPUT_5_AMPERAGE: &str = "input_5_amperage";
pub const ATTR_INPUT_5_POWER: &str = "input_5_power";
pub const ATTR_INPUT_5_ENERGY_TODAY: &str = "input_5_energy_today";
pub const ATTR_INPUT_5_ENERGY_TOTAL: &str = "input_5_energy_total";

pub const ATTR_INPUT_6_VOLTAGE: &str = "input_6_voltage";
pub const ATTR_INPUT_6_AMPERAGE: &str = "input_6_amperage";
pub const ATTR_INPUT_6_POWER: &str = "input_6_power";
pub const ATTR_INPUT_6_ENERGY_TODAY: &str = "input_6_energy_today";
pub const ATTR_INPUT_6_ENERGY_TOTAL: &str = "input_6_energy_total";

pub const ATTR_INPUT_7_VOLTAGE: &str = "input_7_voltage";
pub const ATTR_INPUT_7_AMPERAGE: &str = "input_7_amperage";
pub const ATTR_INPUT_7_POWER: &str = "input_7_power";
pub const ATTR_INPUT_7_ENERGY_TODAY: &str = "input_7_energy_today";
pub const ATTR_INPUT_7_ENERGY_TOTAL: &str = "input_7_energy_total";

pub const ATTR_INPUT_8_VOLTAGE: &str = "input_8_voltage";
pub const ATTR_INPUT_8_AMPERAGE: &str = "input_8_amperage";
pub const ATTR_INPUT_8_POWER: &str = "input_8_power";
pub const ATTR_INPUT_8_ENERGY_TODAY: &str = "input_8_energy_today";
pub const ATTR_INPUT_8_ENERGY_TOTAL: &str = "input_8_energy_total";

pub const ATTR_OUTPUT_POWER: &str = "output_power";
pub const ATTR_OUTPUT_ENERGY_TODAY: &str = "output_energy_today";
pub const ATTR_OUTPUT_ENERGY_TOTAL: &str = "output_energy_total";

pub const ATTR_OUTPUT_REACTIVE_POWER: &str = "output_reactive_power";
pub const ATTR_OUTPUT_REACTIVE_ENERGY_TODAY: &str = "output_reactive_energy_today";
pub const ATTR_OUTPUT_REACTIVE_ENERGY_TOTAL: &str = "output_reactive_energy_total";

pub const ATTR_OUTPUT_1_VOLTAGE: &str = "output_1_voltage";
pub const ATTR_OUTPUT_1_AMPERAGE: &str = "output_1_amperage";
pub const ATTR_OUTPUT_1_POWER: &str = "output_1_power";

pub const ATTR_OUTPUT_2_VOLTAGE: &str = "output_2_voltage";
pub const ATTR_OUTPUT_2_AMPERAGE: &str = "output_2_amperage";
pub const ATTR_OUTPUT_2_POWER: &str = "output_2_power";

pub const ATTR_OUTPUT_3_VOLTAGE: &str = "output_3_voltage";
pub const ATTR_OUTPUT_3_AMPERAGE: &str = "output_3_amperage";
pub const ATTR_OUTPUT_3_POWER: &str = "output_3_power";

pub const ATTR_OPERATION_HOURS: &str = "operation_hours";
pub const ATTR_FREQUENCY: &str = "frequency";

pub const ATTR_TEMPERATURE: &str = "inverter_temperature";
pub const ATTR_IPM_TEMPERATURE: &str = "ipm_temperature";
pub const ATTR_BOOST_TEMPERATURE: &str = "boost_temperature";

pub const ATTR_P_BUS_VOLTAGE: &str = "p_bus_voltage";
pub const ATTR_N_BUS_VOLTAGE: &str = "n_bus_voltage";
pub const ATTR_OUTPUT_PERCENTAGE: &str = "output_percentage";

pub const ATTR_SOC_PERCENTAGE: &str = "soc_percentage";
pub const ATTR_DISCHARGE_POWER: &str = "discharge_power";
pub const ATTR_CHARGE_POWER: &str = "charge_power";
pub const ATTR_ENERGY_TO_USER_TODAY: &str = "energy_to_user_today";
pub const ATTR_ENERGY_TO_USER_TOTAL: &str = "energy_to_user_total";
pub const ATTR_ENERGY_TO_GRID_TODAY: &str = "energy_to_grid_today";
pub const ATTR_ENERGY_TO_GRID_TOTAL: &str = "energy_to_grid_total";
pub const ATTR_DISCHARGE_ENERGY_TODAY: &str = "discharge_energy_today";
pub const ATTR_DISCHARGE_ENERGY_TOTAL: &str = "discharge_energy_total";
pub const ATTR_CHARGE_ENERGY_TODAY: &str = "charge_energy_today";
pub const ATTR_CHARGE_ENERGY_TOTAL: &str = "charge_energy_total";

// ============================================================================
// Descriptor Types
// ============================================================================

/// How the raw words of a descriptor turn into a value
///
/// Resolved once at catalog-build time and dispatched by pattern match.
#[derive(Debug, Clone, Copy)]
pub enum Decoding {
    /// Big-endian unsigned integer (scale > 1 yields a float)
    UnsignedInt,
    /// Big-endian two's-complement integer (scale > 1 yields a float)
    SignedInt,
    /// Big-endian unsigned integer divided by the descriptor scale
    ScaledFloat,
    /// ASCII text, two bytes per register, trailing NULs stripped
    FixedString,
    /// Pure bit-field decoder over the descriptor's raw words
    Custom(fn(&[u16]) -> RegisterValue),
}

/// One catalog entry: an attribute name bound to registers and a decoding
///
/// Descriptors of one register set carry unique names, but their address
/// ranges may overlap: a full schedule window and its sub-field views
/// deliberately read the same physical registers.
#[derive(Debug, Clone, Copy)]
pub struct RegisterDescriptor {
    pub name: &'static str,
    pub address: u16,
    pub length: u16,
    pub decoding: Decoding,
    /// Base-10 divisor applied to numeric decodings
    pub scale: u32,
}

impl RegisterDescriptor {
    pub const fn new(name: &'static str, address: u16, decoding: Decoding) -> Self {
        Self {
            name,
            address,
            length: 1,
            decoding,
            scale: 1,
        }
    }

    /// Unsigned integer register
    pub const fn int(name: &'static str, address: u16) -> Self {
        Self::new(name, address, Decoding::UnsignedInt)
    }

    /// Scaled float register in the device's default 0.1 units
    pub const fn float(name: &'static str, address: u16) -> Self {
        let mut desc = Self::new(name, address, Decoding::ScaledFloat);
        desc.scale = 10;
        desc
    }

    /// ASCII string register block
    pub const fn string(name: &'static str, address: u16, length: u16) -> Self {
        let mut desc = Self::new(name, address, Decoding::FixedString);
        desc.length = length;
        desc
    }

    /// Bit-field register block decoded by `function`
    pub const fn custom(
        name: &'static str,
        address: u16,
        length: u16,
        function: fn(&[u16]) -> RegisterValue,
    ) -> Self {
        let mut desc = Self::new(name, address, Decoding::Custom(function));
        desc.length = length;
        desc
    }

    pub const fn with_length(mut self, length: u16) -> Self {
        self.length = length;
        self
    }

    pub const fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Every absolute address occupied by this descriptor
    pub fn addresses(&self) -> std::ops::Range<u16> {
        self.address..self.address + self.length
    }

    /// Decode this descriptor's raw words into a typed, scaled value
    ///
    /// `words` must hold exactly `length` words in address order; the
    /// assembler guarantees that before calling.
    pub fn decode(&self, words: &[u16]) -> RegisterValue {
        match self.decoding {
            Decoding::UnsignedInt => {
                if self.scale > 1 {
                    RegisterValue::Float(codec::decode_scaled(words, false, self.scale))
                } else {
                    RegisterValue::Integer(codec::decode_unsigned(words) as i64)
                }
            }
            Decoding::SignedInt => {
                if self.scale > 1 {
                    RegisterValue::Float(codec::decode_scaled(words, true, self.scale))
                } else {
                    RegisterValue::Integer(codec::decode_signed(words))
                }
            }
            Decoding::ScaledFloat => {
                RegisterValue::Float(codec::decode_scaled(words, false, self.scale))
            }
            Decoding::FixedString => RegisterValue::Text(codec::decode_string(words)),
            Decoding::Custom(function) => function(words),
        }
    }
}

// ============================================================================
// Device Register Sets
// ============================================================================

/// The two disjoint register catalogs of one device type
#[derive(Debug, Clone, Copy)]
pub struct DeviceRegisters {
    holding: &'static [RegisterDescriptor],
    input: &'static [RegisterDescriptor],
}

impl DeviceRegisters {
    pub const fn new(
        holding: &'static [RegisterDescriptor],
        input: &'static [RegisterDescriptor],
    ) -> Self {
        Self { holding, input }
    }

    pub fn holding(&self) -> &'static [RegisterDescriptor] {
        self.holding
    }

    pub fn input(&self) -> &'static [RegisterDescriptor] {
        self.input
    }

    pub fn input_by_name(&self, name: &str) -> Result<&'static RegisterDescriptor> {
        Self::by_name(self.input, name)
    }

    pub fn holding_by_name(&self, name: &str) -> Result<&'static RegisterDescriptor> {
        Self::by_name(self.holding, name)
    }

    fn by_name(
        descriptors: &'static [RegisterDescriptor],
        name: &str,
    ) -> Result<&'static RegisterDescriptor> {
        descriptors
            .iter()
            .find(|desc| desc.name == name)
            .ok_or_else(|| GrowattError::unknown_attribute(name))
    }

    /// All input register addresses needed to satisfy `names`
    ///
    /// Multi-word descriptors expand to every occupied address. The
    /// derived [`ATTR_STATUS`] attribute is not a register itself; asking
    /// for it pulls in the status, fault and derating code registers the
    /// assembler synthesizes it from.
    pub fn keys_for_names<'a, I>(&self, names: I) -> HashSet<u16>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut wanted: HashSet<&str> = names.into_iter().collect();
        if wanted.contains(ATTR_STATUS) {
            wanted.insert(ATTR_STATUS_CODE);
            wanted.insert(ATTR_FAULT_CODE);
            wanted.insert(ATTR_DERATING_MODE);
        }
        Self::collect_keys(self.input, &wanted)
    }

    /// All holding register addresses needed to satisfy `names`
    pub fn holding_keys_for_names<'a, I>(&self, names: I) -> HashSet<u16>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted: HashSet<&str> = names.into_iter().collect();
        Self::collect_keys(self.holding, &wanted)
    }

    fn collect_keys(
        descriptors: &'static [RegisterDescriptor],
        wanted: &HashSet<&str>,
    ) -> HashSet<u16> {
        descriptors
            .iter()
            .filter(|desc| wanted.contains(desc.name))
            .flat_map(|desc| desc.addresses())
            .collect()
    }

    /// Every attribute name the input catalog can produce, including the
    /// derived status attribute
    pub fn register_names(&self) -> HashSet<&'static str> {
        let mut names: HashSet<&'static str> =
            self.input.iter().map(|desc| desc.name).collect();
        names.insert(ATTR_STATUS);
        names
    }

    pub fn holding_register_names(&self) -> HashSet<&'static str> {
        self.holding.iter().map(|desc| desc.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_names_within_register_sets() {
        let catalog = inverter::catalog();
        for set in [catalog.holding(), catalog.input()] {
            let mut seen = HashSet::new();
            for desc in set {
                assert!(seen.insert(desc.name), "duplicate name {}", desc.name);
            }
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = inverter::catalog();
        let desc = catalog.input_by_name(ATTR_OUTPUT_POWER).unwrap();
        assert_eq!(desc.address, 35);
        assert_eq!(desc.length, 2);

        let err = catalog.input_by_name("no_such_attribute").unwrap_err();
        assert!(matches!(
            err,
            crate::error::GrowattError::UnknownAttribute(_)
        ));
    }

    #[test]
    fn test_keys_expand_multi_word_descriptors() {
        let catalog = inverter::catalog();
        // output_power occupies registers 35 and 36
        let keys = catalog.keys_for_names([ATTR_OUTPUT_POWER]);
        assert_eq!(keys, HashSet::from([35, 36]));
    }

    #[test]
    fn test_status_pulls_in_underlying_registers() {
        let catalog = inverter::catalog();
        let keys = catalog.keys_for_names([ATTR_STATUS]);
        // status_code (0), derating_mode (104), fault_code (105)
        assert_eq!(keys, HashSet::from([0, 104, 105]));
    }

    #[test]
    fn test_register_names_include_derived_status() {
        let catalog = inverter::catalog();
        let names = catalog.register_names();
        assert!(names.contains(ATTR_STATUS));
        assert!(names.contains(ATTR_FREQUENCY));
        assert!(!catalog.holding_register_names().contains(ATTR_STATUS));
    }

    #[test]
    fn test_overlapping_schedule_descriptors_are_intentional() {
        let catalog = inverter::catalog();
        let window = catalog.holding_by_name(ATTR_TIME_1).unwrap();
        let start = catalog.holding_by_name(ATTR_TIME_1_START).unwrap();
        let priority = catalog.holding_by_name(ATTR_TIME_1_PRIORITY).unwrap();
        assert_eq!(window.address, start.address);
        assert_eq!(start.address, priority.address);
        assert_eq!(window.length, 2);
        assert_eq!(start.length, 1);
    }

    #[test]
    fn test_int_descriptor_scale_yields_float() {
        let desc = RegisterDescriptor::int("modbus version", 88).with_scale(100);
        assert_eq!(desc.decode(&[305]), RegisterValue::Float(3.05));
    }
}
