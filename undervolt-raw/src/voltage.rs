//! Voltage-plane offset register definitions (MSR 0x150)
//!
//! The voltage mailbox MSR accepts a single 64-bit request word combining a
//! base constant, a voltage-plane selector, a read/write opcode, and a
//! signed fixed-point offset. Writing a read request and then reading the
//! MSR back returns the current offset in the low 32 bits.
//!
//! ## References
//!
//! - <https://github.com/mihic/linux-intel-undervolt> (offset format)
//!
//! ## Request word format
//!
//! | Bits   | Field    | Description                                  |
//! |--------|----------|----------------------------------------------|
//! | 0-31   | offset   | Signed fixed-point offset, top 11 bits valid |
//! | 32     | opcode   | 0 = read, 1 = write                          |
//! | 33-39  | constant | Part of the fixed base value                 |
//! | 40-42  | plane    | Voltage plane selector                       |
//! | 43-63  | constant | Part of the fixed base value                 |

use crate::register::RegisterLayout;

/// MSR addresses for voltage control
pub mod msr {
    /// Voltage offset mailbox MSR
    pub const MSR_VOLTAGE: u64 = 0x150;
}

/// Fixed base value every request word carries
pub const MSR_VOLTAGE_BASE_VALUE: u64 = 0x8000_0010_0000_0000;

/// Mask selecting the offset field of the request word
pub const MSR_VOLTAGE_OFFSET_MASK: u64 = (1u64 << 32) - 1;

/// Valid bits of a [`VoltageOffset`]: the top 11 of its 32
pub const OFFSET_HIGH_BITS_MASK: u32 = 0xFFE0_0000;

/// Bit alignment of the offset field: the rounded value occupies bits 21-31
pub const OFFSET_SHIFT: u32 = 21;

/// Voltage plane selector
///
/// Each plane is independently adjustable. The selector occupies bits 40-42
/// of the request word (`n << 40` for the n-th plane).
///
/// A sixth plane (digital I/O, `5 << 40`) exists in some documentation but
/// is reported non-functional and is not exposed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneIndex {
    Cpu = 0,
    Gpu = 1,
    Cache = 2,
    /// Also called uncore
    SystemAgent = 3,
    AnalogIo = 4,
}

impl PlaneIndex {
    /// All known planes, in selector order
    pub const ALL: [PlaneIndex; 5] = [
        PlaneIndex::Cpu,
        PlaneIndex::Gpu,
        PlaneIndex::Cache,
        PlaneIndex::SystemAgent,
        PlaneIndex::AnalogIo,
    ];

    /// Selector field value for the request word
    pub fn selector(self) -> u64 {
        (self as u64) << 40
    }
}

/// Mailbox opcode: read back the current offset, or program a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsrOperation {
    Read,
    Write,
}

impl MsrOperation {
    /// Opcode field value for the request word
    pub fn encoding(self) -> u64 {
        match self {
            MsrOperation::Read => 0,
            MsrOperation::Write => 1u64 << 32,
        }
    }
}

/// Signed fixed-point voltage offset in the register's native units
///
/// Only the top 11 bits carry information (`1/1.024` mV granularity after
/// the 21-bit alignment shift); the low 21 bits are always zero. Values
/// permitted to reach hardware are never positive (undervolt-only policy),
/// but the type itself carries no such restriction so readback can
/// represent whatever the hardware reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct VoltageOffset(i32);

impl VoltageOffset {
    pub const ZERO: VoltageOffset = VoltageOffset(0);

    /// Reinterpret a 32-bit register field as a signed offset
    pub fn from_bits(bits: u32) -> Self {
        VoltageOffset(bits as i32)
    }

    /// Build an offset from an already rounded integer quotient,
    /// applying the alignment shift and the valid-bits mask
    pub fn from_rounded(rounded: i32) -> Self {
        VoltageOffset(((rounded << OFFSET_SHIFT) as u32 & OFFSET_HIGH_BITS_MASK) as i32)
    }

    /// Register bit pattern of this offset
    pub fn bits(self) -> u32 {
        self.0 as u32
    }

    /// Signed value, for arithmetic
    pub fn raw(self) -> i32 {
        self.0
    }

    /// True when programming this offset would raise voltage
    pub fn is_overvolt(self) -> bool {
        self.0 > 0
    }
}

/// A complete request word for the voltage mailbox
///
/// Pure value, built fresh per call and never stored. Encoding is total:
/// plane, opcode, and offset are taken as given, validation of the offset
/// sign happens in the controller before a request is ever built.
#[derive(Debug, Clone, Copy)]
pub struct VoltageRequest {
    pub plane: PlaneIndex,
    pub op: MsrOperation,
    pub offset: VoltageOffset,
}

impl VoltageRequest {
    pub fn new(plane: PlaneIndex, op: MsrOperation, offset: VoltageOffset) -> Self {
        Self { plane, op, offset }
    }
}

impl RegisterLayout for VoltageRequest {
    fn to_msr_value(&self) -> u64 {
        // Sign-extend the offset to 64 bits, then keep the low 32.
        let extended_offset = self.offset.raw() as u64;
        MSR_VOLTAGE_BASE_VALUE
            | self.plane.selector()
            | self.op.encoding()
            | (extended_offset & MSR_VOLTAGE_OFFSET_MASK)
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.offset.bits() & !OFFSET_HIGH_BITS_MASK != 0 {
            return Err("Offset low 21 bits must be zero");
        }
        Ok(())
    }
}
