//! Register mapping, batching and decoding engine for Growatt PV inverters
//!
//! This crate turns the raw register space of a Growatt inverter into
//! named, typed, scaled measurements. It owns the declarative register
//! catalogs, the bit-field codecs (model code, schedule windows), the
//! range coalescer that folds a requested address set into the fewest
//! contiguous reads, and the assembler that decodes raw words back into
//! attribute values. The actual Modbus link is a collaborator behind the
//! [`transport::RegisterTransport`] trait; the engine itself performs no
//! I/O and no retries.
//!
//! # Poll cycle
//!
//! ```text
//! attribute names ──► catalog ──► register keys ──► coalescer ──► ranges
//!                                                     (LRU-cached plan)
//! ranges ──► transport reads ──► raw words ──► assembler ──► name → value
//! ```
//!
//! # Example
//!
//! ```no_run
//! use growatt_modbus::catalog::{inverter, ATTR_OUTPUT_POWER, ATTR_STATUS};
//! use growatt_modbus::device::GrowattDevice;
//! use growatt_modbus::simulator::SimulatedInverter;
//!
//! # async fn poll() -> growatt_modbus::error::Result<()> {
//! let device = GrowattDevice::new(SimulatedInverter::new(), inverter::catalog());
//!
//! let keys = device.keys_for_names([ATTR_OUTPUT_POWER, ATTR_STATUS]);
//! let results = device.update(&keys).await?;
//! println!("status: {}", device.status(&results));
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod batch;
pub mod catalog;
pub mod codec;
pub mod constants;
pub mod device;
pub mod error;
pub mod simulator;
pub mod transport;

pub use assemble::{inverter_status, process_registers, DecodedResultMap, RawRegisterMap};
pub use batch::{key_sequences, PlanCache, RangePlan, ReadRange};
pub use catalog::{Decoding, DeviceRegisters, RegisterDescriptor};
pub use codec::{RegisterValue, SchedulePriority, ScheduleWindow};
pub use device::{DeviceInfo, GrowattDevice};
pub use error::{GrowattError, Result};
pub use transport::RegisterTransport;
