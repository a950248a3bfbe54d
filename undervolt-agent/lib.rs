pub mod codec;
pub mod common;
pub mod config;
pub mod controller;
pub mod error;
pub mod parse;
pub mod surface;

pub use common::{DevMsr, FpSession, MsrIo};
pub use controller::VoltageController;
pub use error::{Result, UndervoltError};
pub use surface::ControlSurface;
