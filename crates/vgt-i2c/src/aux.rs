//! I2C-over-AUX emulation for DisplayPort connectors.
//!
//! The guest stages a message header in DATA1 and kicks the control register with `SEND_BUSY`.
//! Address-only messages (size 3) start, restart or stop the I2C transaction; size-4 reads pull
//! one EDID byte. The reply replaces the header in DATA1 and the control register reports DONE.

use vgt_edid::EDID_I2C_ADDR;

use crate::bus::I2cBus;
use crate::error::{I2cError, Result};
use crate::port::{DisplayTopology, Port};
use crate::regs::{aux_reply, AuxCtl, AuxMessage, AuxReg};
use crate::session::Transport;
use crate::vreg::RegisterFile;

/// Message size of an address-only (start/stop) transaction.
const ADDRESS_ONLY_SIZE: u32 = 3;
/// Message size of a one-byte read request.
const READ_REQUEST_SIZE: u32 = 4;

impl<R: RegisterFile, T: DisplayTopology> I2cBus<'_, R, T> {
    /// Handles a 32-bit write to an AUX-CH register of `port`.
    pub fn aux_write(&mut self, port: Port, reg: AuxReg, value: u32) -> Result<()> {
        let Some(ctl_offset) = port.aux_ctl_offset() else {
            return Ok(());
        };
        let data1_offset = ctl_offset + 4;

        if let AuxReg::Data(n) = reg {
            self.regs.write_u32(ctl_offset + 4 * n as u32, value);
            return Ok(());
        }

        let ctl = AuxCtl(value);
        if !ctl.send_busy() {
            // Guest acknowledging DONE/error bits.
            self.regs.write_u32(ctl_offset, value);
            return Ok(());
        }

        let size = ctl.message_size();
        let msg = AuxMessage(self.regs.read_u32(data1_offset));
        if size != ADDRESS_ONLY_SIZE && msg.is_read() && size != READ_REQUEST_SIZE {
            tracing::error!(
                ?port,
                request = msg.request(),
                size,
                "malformed I2C-over-AUX read"
            );
            return Err(I2cError::MalformedAuxRead {
                request: msg.request(),
                message_size: size,
            });
        }

        let reply_size = if msg.is_read() { 2 } else { 1 };
        self.regs.write_u32(ctl_offset, AuxCtl::done(reply_size).0);

        let data = if size == ADDRESS_ONLY_SIZE {
            self.aux_address_phase(port, msg);
            None
        } else if !msg.is_read() {
            // EDID is read-only over this path; index writes are acknowledged and dropped.
            None
        } else if self.session.edid_available && self.session.slave_selected {
            Some(self.next_edid_byte())
        } else {
            Some(0xFF)
        };

        self.regs.write_u32(data1_offset, aux_reply(data));
        Ok(())
    }

    fn aux_address_phase(&mut self, port: Port, msg: AuxMessage) {
        if !msg.mot() {
            tracing::debug!(?port, "AUX-CH: I2C stop");
            self.reset_session();
            return;
        }

        tracing::debug!(?port, "AUX-CH: I2C start or restart");
        self.session.aux.i2c_over_aux = true;
        self.session.aux.mot = true;

        match msg.address() {
            0 => {
                tracing::debug!(?port, "AUX-CH: I2C address reset");
                self.reset_session();
            }
            addr if addr == EDID_I2C_ADDR as u16 => {
                self.session.transport = Transport::AuxChActive;
                self.session.active_port = Some(port);
                self.session.slave_selected = true;
                if self.topology.has_monitor(port) && self.topology.is_displayport(port) {
                    self.session.edid_available = true;
                }
                tracing::debug!(
                    ?port,
                    available = self.session.edid_available,
                    "AUX-CH: EDID addressed"
                );
            }
            addr => {
                tracing::debug!(?port, addr, "unsupported I2C-over-AUX address");
            }
        }
    }
}
