pub mod fpu;
pub mod msr;

pub use fpu::FpSession;
pub use msr::{DevMsr, MsrIo};
