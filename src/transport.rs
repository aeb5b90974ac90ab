//! Transport collaborator boundary
//!
//! The engine never performs I/O itself. A caller supplies something
//! implementing [`RegisterTransport`]; the engine only dictates the
//! contract: a read of `count` words starting at `start` returns exactly
//! `count` words bound to consecutive addresses. Connection management
//! and retry policy live entirely on the transport side.

use crate::error::Result;
use async_trait::async_trait;

/// Register-level read/write access to one device
#[async_trait]
pub trait RegisterTransport: Send + Sync {
    /// Read `count` holding registers starting at `start`
    async fn read_holding_registers(&self, start: u16, count: u16) -> Result<Vec<u16>>;

    /// Read `count` input registers starting at `start`
    async fn read_input_registers(&self, start: u16, count: u16) -> Result<Vec<u16>>;

    /// Write a single holding register
    async fn write_register(&self, address: u16, value: i16) -> Result<()>;
}
