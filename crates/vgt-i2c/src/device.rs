//! MMIO entry point of the virtual display identification device.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::bus::{check_access, dword_chunks, I2cBus};
use crate::config::DisplayConfig;
use crate::error::{I2cError, Result};
use crate::port::{DisplayTopology, Port, PortTable};
use crate::regs::{is_gmbus_offset, mmio, AuxReg, Gmbus2};
use crate::session::I2cSession;
use crate::vreg::{RegisterFile, VirtualRegisters};

struct Inner<T> {
    session: I2cSession,
    regs: VirtualRegisters,
    topology: T,
}

/// Per-VM display I2C state behind one lock.
///
/// Register traps may arrive from several vCPUs at once; each access runs as a single critical
/// section over the session, the register file and the topology.
pub struct VgtDisplay<T: DisplayTopology = PortTable> {
    inner: Mutex<Inner<T>>,
}

impl VgtDisplay<PortTable> {
    /// Builds a device whose topology holds `preallocated_monitors` default DisplayPort monitors.
    pub fn from_config(config: &DisplayConfig) -> Result<Self> {
        let mut ports = PortTable::new();
        ports.install_default_monitors(config.preallocated_monitors)?;
        Ok(Self::new(ports, config.mmio_size))
    }
}

impl<T: DisplayTopology> VgtDisplay<T> {
    pub fn new(topology: T, mmio_size: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                session: I2cSession::new(),
                regs: VirtualRegisters::new(mmio_size),
                topology,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_range(inner: &Inner<T>, offset: u32, len: usize) -> Result<()> {
        let size = inner.regs.size();
        if (offset as usize).saturating_add(len) > size {
            tracing::error!(offset, len, size, "register access out of range");
            return Err(I2cError::OutOfRange { offset, len, size });
        }
        Ok(())
    }

    /// Guest MMIO read of `out.len()` bytes at `offset`.
    pub fn mmio_read(&self, offset: u32, out: &mut [u8]) -> Result<()> {
        check_access(offset, out.len())?;
        let mut guard = self.lock();
        let inner = &mut *guard;
        Self::check_range(inner, offset, out.len())?;

        if is_gmbus_offset(offset) {
            let mut bus = I2cBus::new(&mut inner.session, &mut inner.regs, &inner.topology);
            return bus.gmbus_read(offset, out);
        }
        inner.regs.read_bytes(offset, out)
    }

    /// Guest MMIO write of `data` at `offset`.
    pub fn mmio_write(&self, offset: u32, data: &[u8]) -> Result<()> {
        check_access(offset, data.len())?;
        let mut guard = self.lock();
        let inner = &mut *guard;
        Self::check_range(inner, offset, data.len())?;

        let mut bus = I2cBus::new(&mut inner.session, &mut inner.regs, &inner.topology);
        if is_gmbus_offset(offset) {
            return bus.gmbus_write(offset, data);
        }
        if Port::from_aux_offset(offset & !3).is_some() {
            let mut writes: Vec<(u32, u32)> = dword_chunks(offset, data.len())
                .map(|(reg, shift, range)| (reg, bus.merged_u32(reg, shift, &data[range])))
                .collect();
            // A message header stored by the same access must land before the CTL kick.
            writes.sort_by_key(|&(reg, _)| {
                matches!(Port::from_aux_offset(reg), Some((_, AuxReg::Ctl)))
            });
            for (reg, value) in writes {
                match Port::from_aux_offset(reg) {
                    Some((port, aux_reg)) => bus.aux_write(port, aux_reg, value)?,
                    None => bus.regs.write_u32(reg, value),
                }
            }
            return Ok(());
        }
        bus.regs.write_bytes(offset, data)
    }

    pub fn read_u32(&self, offset: u32) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.mmio_read(offset, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn write_u32(&self, offset: u32, value: u32) -> Result<()> {
        self.mmio_write(offset, &value.to_le_bytes())
    }

    /// Bus reset: drops any in-flight I2C transaction.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.session.reset();
        let busy = (Gmbus2::ACTIVE | Gmbus2::HW_WAIT_PHASE).bits();
        inner.regs.update_u32(mmio::GMBUS2, |v| v & !busy);
        tracing::debug!("display I2C session reset");
    }

    /// Copy of the current session, for inspection.
    pub fn session(&self) -> I2cSession {
        self.lock().session.clone()
    }

    /// Raw backing register value, without any read side effects.
    pub fn peek_u32(&self, offset: u32) -> u32 {
        self.lock().regs.read_u32(offset)
    }

    /// Runs `f` on the topology under the device lock (hotplug, EDID updates).
    pub fn with_topology_mut<U>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        f(&mut self.lock().topology)
    }
}
