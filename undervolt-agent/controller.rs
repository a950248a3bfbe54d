//! Voltage controller
//!
//! Orchestrates the two-phase offset read (submit a read request, then
//! fetch the mailbox), the guarded write, and the string-level
//! parse-and-guard path. The overvolt policy is enforced twice: once on
//! the parsed millivolt value and again on the encoded offset, so a
//! positive offset can never reach hardware through any path.

use crate::codec;
use crate::common::{FpSession, MsrIo};
use crate::error::{Result, UndervoltError};
use crate::parse;
use undervolt_raw::voltage::msr::MSR_VOLTAGE;
use undervolt_raw::{MsrOperation, PlaneIndex, RegisterLayout, VoltageOffset, VoltageRequest};

pub struct VoltageController<M: MsrIo> {
    msr: M,
    cpu: u32,
}

impl<M: MsrIo> VoltageController<M> {
    /// Build a controller over an injected register capability
    ///
    /// `cpu` is the core whose MSR device carries the requests; the voltage
    /// mailbox itself is package-scoped.
    pub fn new(msr: M, cpu: u32) -> Self {
        Self { msr, cpu }
    }

    /// The injected register capability
    pub fn capability(&self) -> &M {
        &self.msr
    }

    /// Read the current offset for a plane
    ///
    /// Submits a read request to the mailbox, then fetches the result from
    /// the same register; the offset is the low 32 bits of the readback.
    ///
    /// Best-effort: if either register primitive fails, the failure is
    /// logged and a zero offset is returned, so a status query never
    /// errors. Callers needing a strict contract can drive [`MsrIo`]
    /// directly.
    pub fn read_offset(&self, plane: PlaneIndex) -> VoltageOffset {
        let request =
            VoltageRequest::new(plane, MsrOperation::Read, VoltageOffset::ZERO).to_msr_value();
        if let Err(e) = self.msr.write(self.cpu, MSR_VOLTAGE, request) {
            tracing::error!("Failed to write read request to MSR: {e}");
            return VoltageOffset::ZERO;
        }

        match self.msr.read(self.cpu, MSR_VOLTAGE) {
            Ok(value) => VoltageOffset::from_bits(value as u32),
            Err(e) => {
                tracing::error!("Failed to read MSR: {e}");
                VoltageOffset::ZERO
            }
        }
    }

    /// Program a new offset for a plane
    ///
    /// A positive offset is silently ignored. Callers are expected to have
    /// rejected it already; this second layer guarantees nothing past this
    /// point can raise voltage. A failed register write is logged and
    /// abandoned: single attempt, no retry.
    pub fn write_offset(&self, plane: PlaneIndex, offset: VoltageOffset) {
        if offset.is_overvolt() {
            return;
        }

        let request = VoltageRequest::new(plane, MsrOperation::Write, offset);
        debug_assert!(request.validate().is_ok(), "unaligned voltage offset");

        tracing::info!("Writing offset 0x{:08x} to voltage MSR", offset.bits());
        let request = request.to_msr_value();
        tracing::info!("Write request 0x{:016x}", request);
        if let Err(e) = self.msr.write(self.cpu, MSR_VOLTAGE, request) {
            tracing::error!("Failed to write write request to MSR: {e}");
        }
    }

    /// Parse operator input and encode it, rejecting overvolts
    ///
    /// The string-level guard: a parsed millivolt value strictly greater
    /// than zero fails with [`UndervoltError::Overvolt`] before any offset
    /// encoding happens.
    pub fn parse_and_guard(&self, input: &[u8]) -> Result<VoltageOffset> {
        let fp = FpSession::acquire();
        let value = parse::parse(input, &fp)?;
        let mv = value.millivolts(&fp);
        if mv > 0.0 {
            tracing::error!("Attempted overvolt: {mv} mV");
            return Err(UndervoltError::Overvolt { millivolts: mv });
        }
        Ok(codec::mv_to_offset(mv, &fp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use undervolt_raw::msr::MsrError;

    #[derive(Default)]
    struct FakeMsr {
        writes: Mutex<Vec<(u32, u64, u64)>>,
        read_value: u64,
        fail_write: bool,
        fail_read: bool,
    }

    impl FakeMsr {
        fn with_read_value(value: u64) -> Self {
            Self {
                read_value: value,
                ..Default::default()
            }
        }
    }

    impl MsrIo for FakeMsr {
        fn read(&self, cpu: u32, addr: u64) -> undervolt_raw::Result<u64> {
            if self.fail_read {
                return Err(MsrError::ReadFailed {
                    cpu,
                    msr: addr,
                    source: std::io::Error::from(std::io::ErrorKind::Other),
                });
            }
            Ok(self.read_value)
        }

        fn write(&self, cpu: u32, addr: u64, value: u64) -> undervolt_raw::Result<()> {
            if self.fail_write {
                return Err(MsrError::WriteFailed {
                    cpu,
                    msr: addr,
                    source: std::io::Error::from(std::io::ErrorKind::Other),
                });
            }
            self.writes.lock().push((cpu, addr, value));
            Ok(())
        }
    }

    fn offset(bits: u32) -> VoltageOffset {
        VoltageOffset::from_bits(bits)
    }

    #[test]
    fn test_write_offset_issues_single_request() {
        let controller = VoltageController::new(FakeMsr::default(), 0);
        controller.write_offset(PlaneIndex::Cpu, offset(0xF9A0_0000));

        let writes = controller.msr.writes.lock();
        assert_eq!(writes.as_slice(), &[(0, 0x150, 0x8000_0011_F9A0_0000)]);
    }

    #[test]
    fn test_write_offset_refuses_overvolt_on_all_planes() {
        let controller = VoltageController::new(FakeMsr::default(), 0);
        for plane in PlaneIndex::ALL {
            controller.write_offset(plane, offset(0x0020_0000));
        }
        assert!(controller.msr.writes.lock().is_empty());
    }

    #[test]
    fn test_write_offset_zero_is_allowed() {
        let controller = VoltageController::new(FakeMsr::default(), 0);
        controller.write_offset(PlaneIndex::Gpu, VoltageOffset::ZERO);
        assert_eq!(controller.msr.writes.lock().len(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unaligned voltage offset")]
    fn test_write_offset_rejects_unaligned_offset_in_debug() {
        let controller = VoltageController::new(FakeMsr::default(), 0);
        // Negative, so it passes the overvolt guard, but carries low bits
        // no codec output can have.
        controller.write_offset(PlaneIndex::Cpu, offset(0xF9A0_0001));
    }

    #[test]
    fn test_read_offset_two_phase() {
        let msr = FakeMsr::with_read_value(0x8000_0010_F9A0_0000);
        let controller = VoltageController::new(msr, 0);

        let off = controller.read_offset(PlaneIndex::Cache);
        assert_eq!(off.bits(), 0xF9A0_0000);

        // Phase one submitted the read request for the cache plane.
        let writes = controller.msr.writes.lock();
        assert_eq!(writes.as_slice(), &[(0, 0x150, 0x8000_0210_0000_0000)]);
    }

    #[test]
    fn test_read_offset_degrades_to_zero_on_write_failure() {
        let msr = FakeMsr {
            fail_write: true,
            read_value: 0x8000_0010_F9A0_0000,
            ..Default::default()
        };
        let controller = VoltageController::new(msr, 0);
        assert_eq!(controller.read_offset(PlaneIndex::Cpu), VoltageOffset::ZERO);
    }

    #[test]
    fn test_read_offset_degrades_to_zero_on_read_failure() {
        let msr = FakeMsr {
            fail_read: true,
            ..Default::default()
        };
        let controller = VoltageController::new(msr, 0);
        assert_eq!(controller.read_offset(PlaneIndex::Cpu), VoltageOffset::ZERO);
    }

    #[test]
    fn test_parse_and_guard_vectors() {
        let controller = VoltageController::new(FakeMsr::default(), 0);
        let cases = [
            ("-50", 0xF9A0_0000u32),
            ("-150.4", 0xECC0_0000),
            ("-125.0", 0xF000_0000),
            ("-4", 0xFF80_0000),
        ];
        for (input, expected) in cases {
            let off = controller.parse_and_guard(input.as_bytes()).unwrap();
            assert_eq!(off.bits(), expected, "input {input:?}");
        }
    }

    #[test]
    fn test_parse_and_guard_rejects_overvolt() {
        let controller = VoltageController::new(FakeMsr::default(), 0);
        assert!(matches!(
            controller.parse_and_guard(b"1"),
            Err(UndervoltError::Overvolt { .. })
        ));
        assert!(matches!(
            controller.parse_and_guard(b"0.5"),
            Err(UndervoltError::Overvolt { .. })
        ));
    }

    #[test]
    fn test_parse_and_guard_propagates_parse_errors() {
        let controller = VoltageController::new(FakeMsr::default(), 0);
        assert!(matches!(
            controller.parse_and_guard(b"abc"),
            Err(UndervoltError::InvalidCharacter { .. })
        ));
    }
}
