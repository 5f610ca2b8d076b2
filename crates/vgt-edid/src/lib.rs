//! EDID/DPCD data blocks for virtual display ports.
//!
//! This crate owns the byte-level view of the "monitor" a guest sees behind a virtual display
//! port:
//! - [`EdidBlock`]: a 128-byte base EDID block plus its validity flag.
//! - [`DpcdBlock`]: the DisplayPort capability block (fixed header, rest zeroed).
//! - The header/checksum validator ([`score_header`], [`is_valid`]).
//!
//! The protocol engines that stream these bytes to the guest (GMBUS, AUX-CH) live in `vgt-i2c`.

use thiserror::Error;

pub const EDID_BLOCK_SIZE: usize = 128;

/// The fixed 8-byte pattern every base EDID block starts with.
pub const EDID_HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

/// 7-bit I2C address of the EDID EEPROM (DDC).
pub const EDID_I2C_ADDR: u8 = 0x50;

pub const DPCD_SIZE: usize = 0x100;

/// Receiver capability prefix advertised by every virtual DisplayPort sink.
///
/// DPCD rev 1.1, 2.7 Gbps max link rate, 4 lanes with enhanced framing, downspread supported.
pub const DPCD_HEADER: [u8; 8] = [0x11, 0x0A, 0x84, 0x01, 0x01, 0x00, 0x01, 0x00];

/// Base EDID of the built-in monitor (1920x1200@60, "DELL U2412M").
const DEFAULT_EDID: [u8; EDID_BLOCK_SIZE] = [
    0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, //
    0x10, 0xac, 0x7b, 0xa0, 0x4c, 0x39, 0x56, 0x31, //
    0x03, 0x16, 0x01, 0x04, 0xa5, 0x34, 0x20, 0x78, //
    0x3a, 0xee, 0x95, 0xa3, 0x54, 0x4c, 0x99, 0x26, //
    0x0f, 0x50, 0x54, 0xa1, 0x08, 0x00, 0x81, 0x40, //
    0x81, 0x80, 0xa9, 0x40, 0xb3, 0x00, 0xd1, 0xc0, //
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x28, 0x3c, //
    0x80, 0xa0, 0x70, 0xb0, 0x23, 0x40, 0x30, 0x20, //
    0x36, 0x00, 0x06, 0x44, 0x21, 0x00, 0x00, 0x1a, //
    0x00, 0x00, 0x00, 0xff, 0x00, 0x59, 0x52, 0x34, //
    0x38, 0x56, 0x32, 0x31, 0x48, 0x31, 0x56, 0x39, //
    0x4c, 0x0a, 0x00, 0x00, 0x00, 0xfc, 0x00, 0x44, //
    0x45, 0x4c, 0x4c, 0x20, 0x55, 0x32, 0x34, 0x31, //
    0x32, 0x4d, 0x0a, 0x20, 0x00, 0x00, 0x00, 0xfd, //
    0x00, 0x32, 0x3d, 0x1e, 0x53, 0x11, 0x00, 0x0a, //
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x00, 0xbb, //
];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EdidError {
    #[error("EDID block must be {expected} bytes, got {len}")]
    BadLength { len: usize, expected: usize },

    #[error("DPCD block must be at most {max} bytes, got {len}")]
    DpcdTooLarge { len: usize, max: usize },
}

/// Returns how many of the first 8 bytes match [`EDID_HEADER`] (`0..=8`).
pub fn score_header(block: &[u8; EDID_BLOCK_SIZE]) -> usize {
    block
        .iter()
        .zip(EDID_HEADER.iter())
        .filter(|(a, b)| a == b)
        .count()
}

/// 8-bit wrapping sum of the whole block; zero for a well-formed block.
pub fn checksum(block: &[u8; EDID_BLOCK_SIZE]) -> u8 {
    block.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// True iff the header matches exactly and the block sums to zero mod 256.
///
/// A bad checksum is reported through `tracing` but is otherwise not an error: callers decide
/// whether an invalid block may still be served.
pub fn is_valid(block: &[u8; EDID_BLOCK_SIZE]) -> bool {
    let score = score_header(block);
    let sum = checksum(block);
    if sum != 0 {
        tracing::warn!(sum, "EDID checksum is invalid");
    }
    score == EDID_HEADER.len() && sum == 0
}

/// Writes the checksum byte (offset 127) so that the block sums to zero.
pub fn fix_checksum(block: &mut [u8; EDID_BLOCK_SIZE]) {
    block[EDID_BLOCK_SIZE - 1] = 0;
    let sum = checksum(block);
    block[EDID_BLOCK_SIZE - 1] = 0u8.wrapping_sub(sum);
}

/// Base EDID block of a virtual monitor.
#[derive(Clone, PartialEq, Eq)]
pub struct EdidBlock {
    bytes: [u8; EDID_BLOCK_SIZE],
    valid: bool,
}

impl EdidBlock {
    /// Wraps raw bytes. The validity flag is derived from [`is_valid`].
    pub fn new(bytes: [u8; EDID_BLOCK_SIZE]) -> Self {
        let valid = is_valid(&bytes);
        Self { bytes, valid }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, EdidError> {
        let bytes: [u8; EDID_BLOCK_SIZE] =
            bytes.try_into().map_err(|_| EdidError::BadLength {
                len: bytes.len(),
                expected: EDID_BLOCK_SIZE,
            })?;
        Ok(Self::new(bytes))
    }

    /// The built-in monitor EDID.
    pub fn default_monitor() -> Self {
        Self {
            bytes: DEFAULT_EDID,
            valid: true,
        }
    }

    pub fn as_bytes(&self) -> &[u8; EDID_BLOCK_SIZE] {
        &self.bytes
    }

    pub fn byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }
}

impl core::fmt::Debug for EdidBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EdidBlock")
            .field("valid", &self.valid)
            .field("vendor", &[self.bytes[8], self.bytes[9]])
            .field("product", &[self.bytes[10], self.bytes[11]])
            .finish()
    }
}

/// DisplayPort configuration data of a virtual sink.
#[derive(Clone, PartialEq, Eq)]
pub struct DpcdBlock {
    bytes: Box<[u8; DPCD_SIZE]>,
    valid: bool,
}

impl DpcdBlock {
    /// A zeroed block carrying [`DPCD_HEADER`].
    pub fn with_fixed_header() -> Self {
        let mut bytes = Box::new([0u8; DPCD_SIZE]);
        bytes[..DPCD_HEADER.len()].copy_from_slice(&DPCD_HEADER);
        Self { bytes, valid: true }
    }

    /// Copies `data` over the start of a zeroed block.
    pub fn from_prefix(data: &[u8]) -> Result<Self, EdidError> {
        if data.len() > DPCD_SIZE {
            return Err(EdidError::DpcdTooLarge {
                len: data.len(),
                max: DPCD_SIZE,
            });
        }
        let mut bytes = Box::new([0u8; DPCD_SIZE]);
        bytes[..data.len()].copy_from_slice(data);
        Ok(Self { bytes, valid: true })
    }

    pub fn as_bytes(&self) -> &[u8; DPCD_SIZE] {
        &self.bytes
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }
}

impl core::fmt::Debug for DpcdBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DpcdBlock")
            .field("valid", &self.valid)
            .field("revision", &self.bytes[0])
            .finish()
    }
}
