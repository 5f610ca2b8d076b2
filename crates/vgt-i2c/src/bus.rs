use vgt_edid::EdidBlock;

use crate::error::{I2cError, Result};
use crate::port::DisplayTopology;
use crate::session::I2cSession;
use crate::vreg::RegisterFile;

pub const MAX_ACCESS_BYTES: usize = 8;

/// Rejects accesses wider than 8 bytes or not aligned to their own width.
pub fn check_access(offset: u32, len: usize) -> Result<()> {
    if len == 0 || len > MAX_ACCESS_BYTES || offset as usize & (len - 1) != 0 {
        tracing::error!(offset, len, "invalid register access");
        return Err(I2cError::InvalidAccess { offset, len });
    }
    Ok(())
}

/// Splits an aligned access into the dwords it covers.
///
/// Yields `(register offset, byte shift within the register, range within the access buffer)`.
pub(crate) fn dword_chunks(
    offset: u32,
    len: usize,
) -> impl Iterator<Item = (u32, usize, core::ops::Range<usize>)> {
    let first = offset & !3;
    let last = (offset + len as u32 - 1) & !3;
    (first..=last).step_by(4).map(move |reg| {
        let start = offset.max(reg);
        let end = (offset + len as u32).min(reg + 4);
        let buf_start = (start - offset) as usize;
        let buf_end = (end - offset) as usize;
        (reg, (start - reg) as usize, buf_start..buf_end)
    })
}

/// One register access worth of borrowed device state.
///
/// The GMBUS and AUX-CH handlers are implemented on this type so both see the same session.
pub struct I2cBus<'a, R: RegisterFile, T: DisplayTopology> {
    pub session: &'a mut I2cSession,
    pub regs: &'a mut R,
    pub topology: &'a T,
}

impl<'a, R: RegisterFile, T: DisplayTopology> I2cBus<'a, R, T> {
    pub fn new(session: &'a mut I2cSession, regs: &'a mut R, topology: &'a T) -> Self {
        Self {
            session,
            regs,
            topology,
        }
    }

    /// EDID block of the port the session is bound to.
    pub(crate) fn edid(&self) -> Option<&'a EdidBlock> {
        let topology: &'a T = self.topology;
        self.session
            .active_port
            .and_then(|port| topology.edid_block_for(port))
    }

    pub(crate) fn next_edid_byte(&mut self) -> u8 {
        let edid = self.edid();
        crate::byte_source::next_byte(self.session, edid)
    }

    /// Merges a partial write into the current register value.
    pub(crate) fn merged_u32(&self, reg: u32, shift: usize, data: &[u8]) -> u32 {
        let mut cur = self.regs.read_u32(reg).to_le_bytes();
        cur[shift..shift + data.len()].copy_from_slice(data);
        u32::from_le_bytes(cur)
    }

    pub fn reset_session(&mut self) {
        self.session.reset();
    }
}
