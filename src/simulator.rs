//! In-memory inverter simulator for testing
//!
//! A simple register-space double standing in for a real Modbus link.
//! Reads resolve against two sparse register maps; unpopulated addresses
//! read as zero, exactly like a device returning a contiguous block that
//! happens to include reserved registers.

use crate::error::{GrowattError, Result};
use crate::transport::RegisterTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Simulated inverter register space
#[derive(Debug, Default)]
pub struct SimulatedInverter {
    holding_registers: Mutex<HashMap<u16, u16>>,
    input_registers: Mutex<HashMap<u16, u16>>,
    read_count: AtomicUsize,
    /// When set, every read fails with a transport error
    fail_reads: Mutex<Option<String>>,
}

impl SimulatedInverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a block of input registers starting at `start`
    pub fn set_input_registers(&self, start: u16, words: &[u16]) {
        let mut registers = self.input_registers.lock();
        for (offset, &word) in words.iter().enumerate() {
            if let Some(address) = start.checked_add(offset as u16) {
                registers.insert(address, word);
            }
        }
    }

    /// Load a block of holding registers starting at `start`
    pub fn set_holding_registers(&self, start: u16, words: &[u16]) {
        let mut registers = self.holding_registers.lock();
        for (offset, &word) in words.iter().enumerate() {
            if let Some(address) = start.checked_add(offset as u16) {
                registers.insert(address, word);
            }
        }
    }

    pub fn holding_register(&self, address: u16) -> Option<u16> {
        self.holding_registers.lock().get(&address).copied()
    }

    /// Number of read requests served so far
    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::Relaxed)
    }

    /// Make subsequent reads fail with the given message
    pub fn fail_reads_with(&self, message: impl Into<String>) {
        *self.fail_reads.lock() = Some(message.into());
    }

    fn read_block(&self, registers: &Mutex<HashMap<u16, u16>>, start: u16, count: u16) -> Result<Vec<u16>> {
        if let Some(message) = self.fail_reads.lock().clone() {
            return Err(GrowattError::transport(message));
        }
        self.read_count.fetch_add(1, Ordering::Relaxed);
        debug!(start, count, "simulator read");
        let registers = registers.lock();
        // u32 arithmetic so a block ending at the top of the address
        // space does not overflow u16
        Ok((u32::from(start)..u32::from(start) + u32::from(count))
            .map(|address| {
                u16::try_from(address)
                    .ok()
                    .and_then(|address| registers.get(&address).copied())
                    .unwrap_or(0)
            })
            .collect())
    }
}

#[async_trait]
impl RegisterTransport for SimulatedInverter {
    async fn read_holding_registers(&self, start: u16, count: u16) -> Result<Vec<u16>> {
        self.read_block(&self.holding_registers, start, count)
    }

    async fn read_input_registers(&self, start: u16, count: u16) -> Result<Vec<u16>> {
        self.read_block(&self.input_registers, start, count)
    }

    async fn write_register(&self, address: u16, value: i16) -> Result<()> {
        self.holding_registers.lock().insert(address, value as u16);
        Ok(())
    }
}
