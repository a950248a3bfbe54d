//! Millivolt <-> fixed-point offset codec
//!
//! Offset calculation follows the MSR 0x150 format documented at
//! <https://github.com/mihic/linux-intel-undervolt>:
//!
//! 1. Multiply the millivolt value by 1.024
//! 2. Round to the nearest integer, half away from zero
//! 3. Shift left by 21
//! 4. Retain only the high 11 bits
//!
//! Step 4 is a deliberate, lossy quantization; re-encoding a decoded value
//! reproduces the same bit pattern, so round-trips are idempotent after the
//! first conversion.
//!
//! Every function here executes floating-point instructions and therefore
//! takes an [`FpSession`] token.

use crate::common::FpSession;
use undervolt_raw::voltage::OFFSET_SHIFT;
use undervolt_raw::VoltageOffset;

/// Register units per millivolt
const MV_SCALE: f32 = 1.024;

/// Encode a millivolt value into the register's fixed-point offset
pub fn mv_to_offset(mv: f32, _fp: &FpSession) -> VoltageOffset {
    let product = mv * MV_SCALE;
    // Truncation toward zero after the half-step gives round-half-away-from-zero.
    let rounded = (if product < 0.0 {
        product - 0.5
    } else {
        product + 0.5
    }) as i32;
    VoltageOffset::from_rounded(rounded)
}

/// Decode a fixed-point offset back into millivolts
///
/// Inverse of [`mv_to_offset`] up to the quantization of its masking step.
pub fn offset_to_mv(offset: VoltageOffset, _fp: &FpSession) -> f32 {
    // Arithmetic shift keeps the sign.
    (offset.raw() >> OFFSET_SHIFT) as f32 / MV_SCALE
}

/// Render a millivolt value with exactly two decimal places
pub fn format_mv(mv: f32, _fp: &FpSession) -> String {
    format!("{mv:.2}")
}
