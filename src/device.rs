//! High-level device access
//!
//! [`GrowattDevice`] ties the catalog, the range coalescer and the result
//! assembler together around a caller-supplied transport. A poll cycle is
//! three steps: resolve attribute names to register keys, read the cached
//! range plan one request per range, and assemble the decoded results.

use crate::assemble::{self, DecodedResultMap, RawRegisterMap};
use crate::batch::PlanCache;
use crate::catalog::{DeviceRegisters, RegisterDescriptor};
use crate::codec::RegisterValue;
use crate::constants::{
    DEVICE_TIME_BASE_REGISTER, DEVICE_TIME_LENGTH, DEVICE_TIME_YEAR_BASE, MAXIMUM_DATA_LENGTH,
};
use crate::error::{GrowattError, Result};
use crate::transport::RegisterTransport;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::catalog::{
    ATTR_DEVICE_TYPE_CODE, ATTR_FIRMWARE, ATTR_INVERTER_MODEL, ATTR_MODBUS_VERSION,
    ATTR_NUMBER_OF_TRACKERS_AND_PHASES, ATTR_SERIAL_NUMBER,
};

/// Identity block assembled from the holding registers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub serial_number: String,
    pub model: String,
    pub firmware: String,
    pub mppt_trackers: u8,
    pub grid_phases: u8,
    pub modbus_version: f64,
    pub device_type: i64,
}

/// One polled inverter behind a register transport
pub struct GrowattDevice<T: RegisterTransport> {
    transport: T,
    registers: DeviceRegisters,
    plan_cache: PlanCache,
}

impl<T: RegisterTransport> GrowattDevice<T> {
    /// Create a device over `transport` with the given register catalog
    pub fn new(transport: T, registers: DeviceRegisters) -> Self {
        Self {
            transport,
            registers,
            plan_cache: PlanCache::new(MAXIMUM_DATA_LENGTH),
        }
    }

    pub fn registers(&self) -> &DeviceRegisters {
        &self.registers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ------------------------------------------------------------------
    // Name resolution
    // ------------------------------------------------------------------

    /// Input register addresses backing the given attribute names
    pub fn keys_for_names<'a, I>(&self, names: I) -> HashSet<u16>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.registers.keys_for_names(names)
    }

    /// Holding register addresses backing the given attribute names
    pub fn holding_keys_for_names<'a, I>(&self, names: I) -> HashSet<u16>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.registers.holding_keys_for_names(names)
    }

    pub fn register_names(&self) -> HashSet<&'static str> {
        self.registers.register_names()
    }

    pub fn holding_register_names(&self) -> HashSet<&'static str> {
        self.registers.holding_register_names()
    }

    // ------------------------------------------------------------------
    // Polling
    // ------------------------------------------------------------------

    /// Poll the input registers backing `keys` and decode the results
    ///
    /// An empty key set returns an empty map without touching the
    /// transport. The range plan for a given key set is computed once
    /// and cached.
    pub async fn update(&self, keys: &HashSet<u16>) -> Result<DecodedResultMap> {
        if keys.is_empty() {
            return Ok(DecodedResultMap::new());
        }
        let raw = self.read_ranges(keys, false).await?;
        Ok(assemble::process_registers(self.registers.input(), &raw))
    }

    /// Poll the holding registers backing `keys` and decode the results
    pub async fn update_holding(&self, keys: &HashSet<u16>) -> Result<DecodedResultMap> {
        if keys.is_empty() {
            return Ok(DecodedResultMap::new());
        }
        let raw = self.read_ranges(keys, true).await?;
        Ok(assemble::process_registers(self.registers.holding(), &raw))
    }

    /// Derive the human readable device status from decoded results
    pub fn status(&self, results: &DecodedResultMap) -> String {
        assemble::inverter_status(results)
    }

    async fn read_ranges(&self, keys: &HashSet<u16>, holding: bool) -> Result<RawRegisterMap> {
        let plan = self.plan_cache.plan(keys.iter().copied());
        debug!(
            keys = keys.len(),
            ranges = plan.len(),
            holding,
            "polling register ranges"
        );

        let mut raw = RawRegisterMap::with_capacity(keys.len());
        for range in plan.iter() {
            let words = if holding {
                self.transport
                    .read_holding_registers(range.start, range.length)
                    .await?
            } else {
                self.transport
                    .read_input_registers(range.start, range.length)
                    .await?
            };
            if words.len() != usize::from(range.length) {
                return Err(GrowattError::protocol(format!(
                    "read of {} registers at {} returned {} words",
                    range.length,
                    range.start,
                    words.len()
                )));
            }
            for (offset, word) in words.into_iter().enumerate() {
                raw.insert(range.start + offset as u16, word);
            }
        }
        Ok(raw)
    }

    // ------------------------------------------------------------------
    // Identity and clock
    // ------------------------------------------------------------------

    /// Read and assemble the device identity block
    pub async fn device_info(&self) -> Result<DeviceInfo> {
        let keys: HashSet<u16> = self
            .registers
            .holding()
            .iter()
            .flat_map(RegisterDescriptor::addresses)
            .collect();
        let results = self.update_holding(&keys).await?;

        let text = |name: &'static str| -> Result<String> {
            match results.get(name) {
                Some(RegisterValue::Text(s)) => Ok(s.clone()),
                _ => Err(GrowattError::incomplete_range(name)),
            }
        };

        let (mppt_trackers, grid_phases) = match results.get(ATTR_NUMBER_OF_TRACKERS_AND_PHASES)
        {
            Some(RegisterValue::Pair(trackers, phases)) => (*trackers, *phases),
            _ => return Err(GrowattError::incomplete_range(ATTR_NUMBER_OF_TRACKERS_AND_PHASES)),
        };

        Ok(DeviceInfo {
            serial_number: text(ATTR_SERIAL_NUMBER)?,
            model: text(ATTR_INVERTER_MODEL)?,
            firmware: text(ATTR_FIRMWARE)?,
            mppt_trackers,
            grid_phases,
            modbus_version: results
                .get(ATTR_MODBUS_VERSION)
                .and_then(RegisterValue::as_f64)
                .ok_or_else(|| GrowattError::incomplete_range(ATTR_MODBUS_VERSION))?,
            device_type: results
                .get(ATTR_DEVICE_TYPE_CODE)
                .and_then(RegisterValue::as_i64)
                .ok_or_else(|| GrowattError::incomplete_range(ATTR_DEVICE_TYPE_CODE))?,
        })
    }

    /// Read the device clock registers
    pub async fn read_device_time(&self) -> Result<NaiveDateTime> {
        let words = self
            .transport
            .read_holding_registers(DEVICE_TIME_BASE_REGISTER, DEVICE_TIME_LENGTH)
            .await?;
        if words.len() != usize::from(DEVICE_TIME_LENGTH) {
            return Err(GrowattError::protocol(format!(
                "device clock read returned {} words",
                words.len()
            )));
        }
        NaiveDate::from_ymd_opt(
            DEVICE_TIME_YEAR_BASE + i32::from(words[0]),
            u32::from(words[1]),
            u32::from(words[2]),
        )
        .and_then(|date| {
            date.and_hms_opt(u32::from(words[3]), u32::from(words[4]), u32::from(words[5]))
        })
        .ok_or_else(|| GrowattError::protocol(format!("invalid device clock value {words:?}")))
    }

    /// Write the given timestamp into the device clock registers
    pub async fn write_device_time(&self, time: NaiveDateTime) -> Result<()> {
        use chrono::{Datelike, Timelike};
        let fields = [
            (time.year() - DEVICE_TIME_YEAR_BASE) as i16,
            time.month() as i16,
            time.day() as i16,
            time.hour() as i16,
            time.minute() as i16,
            time.second() as i16,
        ];
        for (offset, value) in fields.into_iter().enumerate() {
            self.transport
                .write_register(DEVICE_TIME_BASE_REGISTER + offset as u16, value)
                .await?;
        }
        Ok(())
    }

    /// Set the device clock to the local time; returns the previous drift
    pub async fn sync_time(&self) -> Result<Duration> {
        let device_time = self.read_device_time().await?;
        let now = Local::now().naive_local();
        self.write_device_time(now).await?;
        Ok(now - device_time)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Write a single holding register (e.g. toggling AC charging)
    pub async fn write_register(&self, address: u16, value: i16) -> Result<()> {
        info!(address, value, "writing holding register");
        self.transport.write_register(address, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        inverter, ATTR_AC_CHARGE_ENABLED, ATTR_FAULT_CODE, ATTR_INPUT_1_VOLTAGE, ATTR_STATUS,
        ATTR_STATUS_CODE,
    };
    use crate::simulator::SimulatedInverter;

    fn device() -> GrowattDevice<SimulatedInverter> {
        GrowattDevice::new(SimulatedInverter::new(), inverter::catalog())
    }

    #[tokio::test]
    async fn test_empty_update_makes_no_transport_calls() {
        let device = device();
        let results = device.update(&HashSet::new()).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(device.transport().read_count(), 0);
    }

    #[tokio::test]
    async fn test_update_decodes_requested_attributes() {
        let device = device();
        device.transport().set_input_registers(0, &[1, 0, 0, 2357]);

        let keys = device.keys_for_names([ATTR_STATUS_CODE, ATTR_INPUT_1_VOLTAGE]);
        let results = device.update(&keys).await.unwrap();

        assert_eq!(
            results.get(ATTR_STATUS_CODE),
            Some(&RegisterValue::Integer(1))
        );
        assert_eq!(
            results.get(ATTR_INPUT_1_VOLTAGE),
            Some(&RegisterValue::Float(235.7))
        );
        // registers 0 and 3 coalesce into one read
        assert_eq!(device.transport().read_count(), 1);
    }

    #[tokio::test]
    async fn test_distant_registers_need_two_reads() {
        let device = device();
        let keys = device.keys_for_names([ATTR_STATUS_CODE, ATTR_FAULT_CODE]);
        // status_code at 0, fault_code at 105: beyond the 100-register span
        device.update(&keys).await.unwrap();
        assert_eq!(device.transport().read_count(), 2);
    }

    #[tokio::test]
    async fn test_repeated_update_reuses_cached_plan() {
        let device = device();
        let keys = device.keys_for_names([ATTR_STATUS_CODE]);
        device.update(&keys).await.unwrap();
        device.update(&keys).await.unwrap();
        // one read per cycle, plan computed once
        assert_eq!(device.transport().read_count(), 2);
    }

    #[tokio::test]
    async fn test_status_request_includes_synthesis_inputs() {
        let device = device();
        // status_code Normal, derating off, fault 0
        device.transport().set_input_registers(0, &[1]);

        let keys = device.keys_for_names([ATTR_STATUS]);
        let results = device.update(&keys).await.unwrap();
        assert_eq!(device.status(&results), "Normal");
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_opaquely() {
        let device = device();
        device.transport().fail_reads_with("serial unplugged");
        let keys = device.keys_for_names([ATTR_STATUS_CODE]);
        let err = device.update(&keys).await.unwrap_err();
        assert_eq!(err.to_string(), "Transport error: serial unplugged");
    }

    #[tokio::test]
    async fn test_write_register_reaches_transport() {
        let device = device();
        device.write_register(3049, 1).await.unwrap();
        assert_eq!(device.transport().holding_register(3049), Some(1));

        let keys = device.holding_keys_for_names([ATTR_AC_CHARGE_ENABLED]);
        let results = device.update_holding(&keys).await.unwrap();
        assert_eq!(
            results.get(ATTR_AC_CHARGE_ENABLED),
            Some(&RegisterValue::Integer(1))
        );
    }

    #[tokio::test]
    async fn test_device_clock_round_trip() {
        let device = device();
        let time = NaiveDate::from_ymd_opt(2026, 8, 29)
            .unwrap()
            .and_hms_opt(13, 37, 42)
            .unwrap();
        device.write_device_time(time).await.unwrap();
        assert_eq!(device.read_device_time().await.unwrap(), time);
    }

    #[tokio::test]
    async fn test_invalid_device_clock_is_a_protocol_error() {
        let device = device();
        // month 13 can never form a valid date
        device
            .transport()
            .set_holding_registers(45, &[26, 13, 1, 0, 0, 0]);
        let err = device.read_device_time().await.unwrap_err();
        assert!(matches!(err, GrowattError::ProtocolError(_)));
    }
}
