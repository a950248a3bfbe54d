//! MSR access capability
//!
//! The voltage register is process-wide, externally owned hardware state,
//! so the controller takes it as an injected capability ([`MsrIo`]) rather
//! than reaching for ambient globals. [`DevMsr`] is the production
//! implementation over `/dev/cpu/*/msr` with one cached handle per CPU;
//! tests substitute a fake.
//!
//! Raw register access is serialized by the kernel. The per-handle mutex
//! here only keeps a seek + read/write pair coherent within this process.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::sync::Arc;

use undervolt_raw::msr::{open_msr_device, Result};

/// Privileged register read/write primitives
pub trait MsrIo {
    fn read(&self, cpu: u32, addr: u64) -> Result<u64>;
    fn write(&self, cpu: u32, addr: u64, value: u64) -> Result<()>;
}

struct MsrHandle {
    file: parking_lot::Mutex<File>,
    cpu_id: u32,
}

impl MsrHandle {
    fn new(cpu: u32) -> Result<Self> {
        let file = open_msr_device(cpu)?;

        tracing::info!("Opened MSR handle {} for CPU {}", file.as_raw_fd(), cpu);

        Ok(Self {
            file: parking_lot::Mutex::new(file),
            cpu_id: cpu,
        })
    }

    fn read(&self, addr: u64) -> Result<u64> {
        let mut file = self.file.lock();
        let value = undervolt_raw::msr::read_msr(&mut *file, self.cpu_id, addr)?;

        tracing::debug!(
            "MSR read: CPU {} MSR 0x{:08x} = 0x{:016x}",
            self.cpu_id,
            addr,
            value
        );
        Ok(value)
    }

    fn write(&self, addr: u64, value: u64) -> Result<()> {
        let mut file = self.file.lock();
        undervolt_raw::msr::write_msr(&mut *file, self.cpu_id, addr, value)?;

        tracing::debug!(
            "MSR write: CPU {} MSR 0x{:08x} = 0x{:016x}",
            self.cpu_id,
            addr,
            value
        );
        Ok(())
    }
}

/// `/dev/cpu/*/msr` backed capability with a process-wide handle cache
pub struct DevMsr {
    handles: RwLock<HashMap<u32, Arc<MsrHandle>>>,
}

impl DevMsr {
    fn new() -> Self {
        Self {
            handles: RwLock::new(HashMap::new()),
        }
    }

    pub fn instance() -> &'static DevMsr {
        static INSTANCE: Lazy<DevMsr> = Lazy::new(DevMsr::new);
        &INSTANCE
    }

    fn get_handle(&self, cpu: u32) -> Result<Arc<MsrHandle>> {
        {
            let handles = self.handles.read();
            if let Some(handle) = handles.get(&cpu) {
                return Ok(Arc::clone(handle));
            }
        }

        let mut handles = self.handles.write();
        if let Some(handle) = handles.get(&cpu) {
            return Ok(Arc::clone(handle));
        }

        let handle = Arc::new(MsrHandle::new(cpu)?);
        handles.insert(cpu, Arc::clone(&handle));
        Ok(handle)
    }
}

impl MsrIo for DevMsr {
    fn read(&self, cpu: u32, addr: u64) -> Result<u64> {
        let handle = self.get_handle(cpu)?;
        handle.read(addr)
    }

    fn write(&self, cpu: u32, addr: u64, value: u64) -> Result<()> {
        let handle = self.get_handle(cpu)?;
        handle.write(addr, value)
    }
}

impl<M: MsrIo + ?Sized> MsrIo for &M {
    fn read(&self, cpu: u32, addr: u64) -> Result<u64> {
        M::read(self, cpu, addr)
    }

    fn write(&self, cpu: u32, addr: u64, value: u64) -> Result<()> {
        M::write(self, cpu, addr, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devmsr_singleton() {
        let msr1 = DevMsr::instance();
        let msr2 = DevMsr::instance();
        assert!(std::ptr::eq(msr1, msr2));
    }
}
