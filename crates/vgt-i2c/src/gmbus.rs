//! GMBUS (I2C controller) emulation for non-DisplayPort connectors.
//!
//! The guest programs GMBUS0 (port), GMBUS1 (command) and polls GMBUS2 (status) while it drains
//! GMBUS3 (data, 4 bytes per read). Phase handling follows the table in [`crate::session`].

use vgt_edid::EDID_I2C_ADDR;

use crate::bus::{dword_chunks, I2cBus};
use crate::error::{I2cError, Result};
use crate::port::{DisplayTopology, Port};
use crate::regs::{mmio, Gmbus0, Gmbus1, Gmbus2};
use crate::session::{
    gmbus_data_exhausted, gmbus_transition, GmbusPhase, GmbusTransition, Transport,
};
use crate::vreg::RegisterFile;

impl<R: RegisterFile, T: DisplayTopology> I2cBus<'_, R, T> {
    /// Handles a read inside the GMBUS window. The access must already satisfy
    /// [`crate::bus::check_access`].
    pub fn gmbus_read(&mut self, offset: u32, out: &mut [u8]) -> Result<()> {
        for (reg, shift, range) in dword_chunks(offset, out.len()) {
            let value = match reg {
                mmio::GMBUS2 => self.gmbus2_read(),
                mmio::GMBUS3 => self.gmbus3_read(),
                _ => self.regs.read_u32(reg),
            };
            let bytes = value.to_le_bytes();
            out[range.clone()].copy_from_slice(&bytes[shift..shift + range.len()]);
        }
        Ok(())
    }

    /// Handles a write inside the GMBUS window.
    pub fn gmbus_write(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        if dword_chunks(offset, data.len()).any(|(reg, _, _)| reg == mmio::GMBUS3) {
            tracing::error!(offset, "guest tried to write GMBUS3");
            return Err(I2cError::Gmbus3Write);
        }
        for (reg, shift, range) in dword_chunks(offset, data.len()) {
            let value = self.merged_u32(reg, shift, &data[range]);
            match reg {
                mmio::GMBUS0 => self.gmbus0_write(value),
                mmio::GMBUS1 => self.gmbus1_write(value),
                mmio::GMBUS2 => self.gmbus2_write(value),
                _ => self.regs.write_u32(reg, value),
            }
        }
        Ok(())
    }

    fn update_status(&mut self, f: impl FnOnce(&mut Gmbus2)) {
        self.regs.update_u32(mmio::GMBUS2, |v| {
            let mut status = Gmbus2::from_bits_retain(v);
            f(&mut status);
            status.bits()
        });
    }

    fn gmbus0_write(&mut self, value: u32) {
        // Guests may read back what they wrote.
        self.regs.write_u32(mmio::GMBUS0, value);

        let pin = Gmbus0(value).pin_select();
        if pin == 0 {
            tracing::debug!("GMBUS released");
            self.reset_session();
            return;
        }
        let Some(port) = Port::from_gmbus_pin(pin) else {
            tracing::debug!(value, pin, "GMBUS0 selects a pin with no port behind it");
            return;
        };

        self.reset_session();
        self.session.transport = Transport::GmbusActive;
        self.session.gmbus.phase = GmbusPhase::Idle;

        let available = self.topology.has_monitor(port) && !self.topology.is_displayport(port);
        self.update_status(|s| {
            s.remove(Gmbus2::ACTIVE | Gmbus2::HW_WAIT_PHASE);
            s.insert(Gmbus2::HW_RDY);
            s.set(Gmbus2::SATOER, !available);
        });
        if available {
            self.session.active_port = Some(port);
            self.session.edid_available = true;
        }
        tracing::debug!(?port, available, "GMBUS port selected");
    }

    /// Controller state after a cleared interrupt: ready, NAK unless EDID was being served.
    fn reset_controller(&mut self, edid_available: bool) {
        let mut status = Gmbus2::HW_RDY;
        if !edid_available {
            status |= Gmbus2::SATOER;
        }
        self.regs.write_u32(mmio::GMBUS2, status.bits());
        self.session.gmbus.phase = GmbusPhase::Idle;
    }

    fn gmbus1_write(&mut self, value: u32) {
        let previous = Gmbus1(self.regs.read_u32(mmio::GMBUS1));
        let cmd = Gmbus1(value);

        if previous.sw_clr_int() {
            if !cmd.sw_clr_int() {
                self.regs
                    .write_u32(mmio::GMBUS1, previous.0 & !Gmbus1::SW_CLR_INT);
                let available = self.session.edid_available;
                self.reset_session();
                self.reset_controller(available);
                tracing::debug!("GMBUS interrupt cleared, bus reset");
            }
            return;
        }

        let Some(cycle) = cmd.cycle() else {
            tracing::error!(value, cycle = cmd.cycle_bits(), "reserved GMBUS cycle");
            return;
        };

        if cmd.sw_clr_int() {
            self.update_status(|s| {
                s.remove(Gmbus2::INT);
                s.insert(Gmbus2::HW_RDY);
            });
        }

        // The emulated controller is always ready.
        let cmd = cmd.with_sw_rdy_cleared();

        self.session.gmbus.total_byte_count = cmd.total_byte_count();
        match cmd.slave_addr() {
            EDID_I2C_ADDR => self.session.slave_selected = true,
            0 => {}
            addr => tracing::debug!(addr, "unsupported GMBUS slave address, ignoring"),
        }
        if cmd.indexed() {
            self.session.read_cursor = cmd.slave_index() as usize;
        }
        self.session.gmbus.cycle = cycle;

        match gmbus_transition(cycle, previous.cycle()) {
            GmbusTransition::None => {}
            GmbusTransition::Stop => {
                self.reset_session();
                self.session.gmbus.phase = GmbusPhase::Idle;
                self.update_status(|s| s.remove(Gmbus2::ACTIVE | Gmbus2::HW_WAIT_PHASE));
            }
            GmbusTransition::EnterData => {
                self.session.gmbus.phase = GmbusPhase::Data;
                self.update_status(|s| {
                    s.remove(Gmbus2::HW_WAIT_PHASE);
                    s.insert(Gmbus2::ACTIVE);
                });
            }
        }
        tracing::debug!(?cycle, phase = ?self.session.gmbus.phase, "GMBUS1 command");

        self.regs.write_u32(mmio::GMBUS1, cmd.0);
    }

    fn gmbus2_read(&mut self) -> u32 {
        let value = self.regs.read_u32(mmio::GMBUS2);
        if value & Gmbus2::INUSE.bits() == 0 {
            self.regs.write_u32(mmio::GMBUS2, value | Gmbus2::INUSE.bits());
        }
        value
    }

    fn gmbus2_write(&mut self, value: u32) {
        // Writing INUSE releases the controller; everything else is read-only.
        if value & Gmbus2::INUSE.bits() != 0 {
            self.update_status(|s| s.remove(Gmbus2::INUSE));
        }
    }

    fn gmbus3_read(&mut self) -> u32 {
        let cmd = Gmbus1(self.regs.read_u32(mmio::GMBUS1));
        let stale = self.regs.read_u32(mmio::GMBUS3);
        if !cmd.slave_read() {
            tracing::warn!("GMBUS3 read outside of a read cycle, returning last value");
            return stale;
        }

        let byte_left =
            self.session.gmbus.total_byte_count as i64 - self.session.read_cursor as i64;
        if byte_left <= 0 {
            return stale;
        }

        let count = byte_left.min(4) as u32;
        let mut word = 0u32;
        for i in 0..count {
            word |= (self.next_edid_byte() as u32) << (i * 8);
        }
        self.regs.write_u32(mmio::GMBUS3, word);

        if byte_left <= 4 {
            let cycle = self.session.gmbus.cycle;
            match gmbus_data_exhausted(cycle) {
                GmbusPhase::Idle => {
                    self.reset_session();
                    self.session.gmbus.phase = GmbusPhase::Idle;
                    self.update_status(|s| s.remove(Gmbus2::ACTIVE | Gmbus2::HW_WAIT_PHASE));
                }
                phase => {
                    self.session.gmbus.phase = phase;
                    // Drivers wait for this bit before issuing the STOP cycle.
                    self.update_status(|s| s.insert(Gmbus2::HW_WAIT_PHASE));
                }
            }
            tracing::debug!(?cycle, "GMBUS byte count drained");
        }
        word
    }
}
