//! # undervolt-raw
//!
//! Hardware register definitions for Intel voltage-plane offset control.
//!
//! This crate provides type-safe abstractions over MSR (Model-Specific
//! Register) access and the bit layout of the voltage offset mailbox
//! (MSR 0x150): plane selectors, mailbox opcodes, the fixed-point offset
//! type, and the 64-bit request-word encoder.
//!
//! ## Usage
//!
//! ```ignore
//! use undervolt_raw::voltage::{msr, MsrOperation, PlaneIndex, VoltageOffset, VoltageRequest};
//! use undervolt_raw::{open_msr_device, write_msr, RegisterLayout};
//!
//! let mut dev = open_msr_device(0)?;
//! let req = VoltageRequest::new(PlaneIndex::Cpu, MsrOperation::Read, VoltageOffset::ZERO);
//! write_msr(&mut dev, 0, msr::MSR_VOLTAGE, req.to_msr_value())?;
//! ```

pub mod msr;
pub mod register;
pub mod voltage;

// Re-export for convenience
pub use msr::{open_msr_device, read_msr, write_msr, MsrError, Result};
pub use register::RegisterLayout;
pub use voltage::{MsrOperation, PlaneIndex, VoltageOffset, VoltageRequest};
