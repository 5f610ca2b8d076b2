use thiserror::Error;

pub type Result<T> = std::result::Result<T, I2cError>;

/// Accesses the emulator refuses outright.
///
/// Everything else (unsupported slave addresses, reads before a slave was selected, EDID
/// overruns, reserved GMBUS cycles) is logged and degrades to "no EDID" for the guest instead of
/// failing the access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum I2cError {
    #[error("invalid register access: offset=0x{offset:x} len={len}")]
    InvalidAccess { offset: u32, len: usize },

    #[error("register access out of range: offset=0x{offset:x} len={len} size=0x{size:x}")]
    OutOfRange { offset: u32, len: usize, size: usize },

    #[error("guest writes to GMBUS3 are not supported")]
    Gmbus3Write,

    #[error("malformed I2C-over-AUX read: request=0x{request:x} message_size={message_size}")]
    MalformedAuxRead { request: u8, message_size: u32 },

    #[error("no port left for preallocated monitor #{index}")]
    PortsExhausted { index: usize },
}
