//! Generic register abstractions for type-safe MSR programming

/// Trait for register layouts that encode to a raw MSR value
///
/// This tool only ever submits fully-formed request words to the voltage
/// mailbox register; readback is a masked bit pattern, not a structured
/// layout, so there is no decoding direction.
///
/// # Example
///
/// ```ignore
/// use undervolt_raw::register::RegisterLayout;
///
/// #[derive(Debug, Default)]
/// struct MyControl {
///     enable: bool,
///     threshold: u8,
/// }
///
/// impl RegisterLayout for MyControl {
///     fn to_msr_value(&self) -> u64 {
///         (if self.enable { 1 } else { 0 })
///             | ((self.threshold as u64) << 8)
///     }
/// }
/// ```
pub trait RegisterLayout: Sized {
    /// Convert this register layout to a raw MSR value
    fn to_msr_value(&self) -> u64;

    /// Validate that the register values are within acceptable ranges
    ///
    /// Returns `Ok(())` if valid, or an error message if invalid.
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}
