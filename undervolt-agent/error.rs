use thiserror::Error;

#[derive(Error, Debug)]
pub enum UndervoltError {
    #[error("Invalid character 0x{byte:02x} at position {position}")]
    InvalidCharacter { byte: u8, position: usize },

    #[error("Integer part overflows")]
    Overflow,

    #[error("Attempted overvolt: {millivolts} mV")]
    Overvolt { millivolts: f32 },

    #[error("Unknown voltage plane: {0}")]
    UnknownPlane(String),

    #[error("MSR operation failed: {0}")]
    Msr(#[from] undervolt_raw::MsrError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, UndervoltError>;
