//! MSR (Model-Specific Register) device I/O
//!
//! Wire-level access to `/dev/cpu/*/msr`: an MSR read is a seek to the
//! register address followed by an 8-byte read, a write is a seek followed
//! by an 8-byte write. The functions here operate on an already opened
//! device handle; opening, caching, and locking handles is the caller's
//! concern (see `DevMsr` in undervolt-agent). The kernel serializes raw
//! MSR access, so no locking is layered on top here.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;

pub type Result<T> = std::result::Result<T, MsrError>;

/// Errors that can occur during MSR operations
#[derive(Debug, thiserror::Error)]
pub enum MsrError {
    #[error("Failed to open MSR device for CPU {cpu}: {source}")]
    OpenFailed { cpu: u32, source: std::io::Error },

    #[error("Failed to read MSR 0x{msr:X} on CPU {cpu}: {source}")]
    ReadFailed {
        cpu: u32,
        msr: u64,
        source: std::io::Error,
    },

    #[error("Failed to write MSR 0x{msr:X} on CPU {cpu}: {source}")]
    WriteFailed {
        cpu: u32,
        msr: u64,
        source: std::io::Error,
    },

    #[error("Failed to seek to MSR 0x{msr:X} on CPU {cpu}: {source}")]
    SeekFailed {
        cpu: u32,
        msr: u64,
        source: std::io::Error,
    },
}

/// Open the MSR device for a CPU
///
/// Read+write, with synchronous writes: a voltage request must have reached
/// the register before the matching readback is issued.
///
/// # Errors
///
/// Returns [`MsrError::OpenFailed`] if the device node is missing (msr
/// module not loaded) or not openable (requires root/CAP_SYS_RAWIO).
pub fn open_msr_device(cpu: u32) -> Result<File> {
    let path = format!("/dev/cpu/{cpu}/msr");
    OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open(&path)
        .map_err(|e| MsrError::OpenFailed { cpu, source: e })
}

/// Read a 64-bit value from an MSR through an open device handle
///
/// `cpu` is carried for error context only.
///
/// # Example
///
/// ```ignore
/// use undervolt_raw::msr::{open_msr_device, read_msr};
/// use undervolt_raw::voltage::msr::MSR_VOLTAGE;
///
/// let mut dev = open_msr_device(0)?;
/// let value = read_msr(&mut dev, 0, MSR_VOLTAGE)?;
/// println!("MSR 0x150 = 0x{:016X}", value);
/// ```
pub fn read_msr<D: Read + Seek>(dev: &mut D, cpu: u32, msr: u64) -> Result<u64> {
    dev.seek(SeekFrom::Start(msr))
        .map_err(|e| MsrError::SeekFailed {
            cpu,
            msr,
            source: e,
        })?;

    let mut buffer = [0u8; 8];
    dev.read_exact(&mut buffer)
        .map_err(|e| MsrError::ReadFailed {
            cpu,
            msr,
            source: e,
        })?;

    Ok(u64::from_le_bytes(buffer))
}

/// Write a 64-bit value to an MSR through an open device handle
///
/// # Safety
///
/// Writing incorrect values to MSRs can cause system instability or
/// crashes. Voltage request words must come from
/// [`VoltageRequest`](crate::voltage::VoltageRequest), never hand-built.
pub fn write_msr<D: Write + Seek>(dev: &mut D, cpu: u32, msr: u64, value: u64) -> Result<()> {
    dev.seek(SeekFrom::Start(msr))
        .map_err(|e| MsrError::SeekFailed {
            cpu,
            msr,
            source: e,
        })?;

    dev.write_all(&value.to_le_bytes())
        .map_err(|e| MsrError::WriteFailed {
            cpu,
            msr,
            source: e,
        })?;

    Ok(())
}
