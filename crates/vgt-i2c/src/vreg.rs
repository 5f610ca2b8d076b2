//! Backing store for the guest-visible register values.

use crate::error::{I2cError, Result};

/// Byte-addressed register storage. Multi-byte values are little-endian.
pub trait RegisterFile {
    fn read_bytes(&self, offset: u32, out: &mut [u8]) -> Result<()>;
    fn write_bytes(&mut self, offset: u32, data: &[u8]) -> Result<()>;

    fn read_u32(&self, offset: u32) -> u32 {
        let mut buf = [0u8; 4];
        match self.read_bytes(offset, &mut buf) {
            Ok(()) => u32::from_le_bytes(buf),
            Err(_) => 0,
        }
    }

    fn write_u32(&mut self, offset: u32, value: u32) {
        if let Err(err) = self.write_bytes(offset, &value.to_le_bytes()) {
            tracing::error!(%err, "dropping register store");
        }
    }

    fn update_u32(&mut self, offset: u32, f: impl FnOnce(u32) -> u32)
    where
        Self: Sized,
    {
        let v = self.read_u32(offset);
        self.write_u32(offset, f(v));
    }
}

/// Flat, zero-initialized register file covering `0..size`.
#[derive(Clone)]
pub struct VirtualRegisters {
    bytes: Vec<u8>,
}

impl VirtualRegisters {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn range(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>> {
        let start = offset as usize;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(I2cError::OutOfRange {
                offset,
                len,
                size: self.bytes.len(),
            })?;
        Ok(start..end)
    }
}

impl RegisterFile for VirtualRegisters {
    fn read_bytes(&self, offset: u32, out: &mut [u8]) -> Result<()> {
        let range = self.range(offset, out.len())?;
        out.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write_bytes(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        let range = self.range(offset, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }
}

impl core::fmt::Debug for VirtualRegisters {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualRegisters")
            .field("size", &self.bytes.len())
            .finish_non_exhaustive()
    }
}
