//! Display ports and the monitor topology behind them.

use vgt_edid::{DpcdBlock, EdidBlock};

use crate::error::{I2cError, Result};
use crate::regs::{mmio, AuxReg};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
}

impl Port {
    pub const ALL: [Port; 5] = [Port::A, Port::B, Port::C, Port::D, Port::E];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Decodes the GMBUS0 pin-select field. `None` for pins with no port behind them.
    pub fn from_gmbus_pin(pin: u32) -> Option<Self> {
        match pin {
            2 => Some(Port::E),
            4 => Some(Port::C),
            5 => Some(Port::B),
            6 => Some(Port::D),
            _ => None,
        }
    }

    /// Base of this port's AUX-CH register block, if it has one.
    pub fn aux_ctl_offset(self) -> Option<u32> {
        match self {
            Port::A => Some(mmio::DPA_AUX_CH_CTL),
            Port::B => Some(mmio::PCH_DPB_AUX_CH_CTL),
            Port::C => Some(mmio::PCH_DPC_AUX_CH_CTL),
            Port::D => Some(mmio::PCH_DPD_AUX_CH_CTL),
            Port::E => None,
        }
    }

    /// Maps an MMIO offset into `(port, register)` if it falls inside an AUX-CH block.
    pub fn from_aux_offset(offset: u32) -> Option<(Self, AuxReg)> {
        Self::ALL.into_iter().find_map(|port| {
            let base = port.aux_ctl_offset()?;
            let rel = offset.checked_sub(base)?;
            if rel >= mmio::AUX_CH_BLOCK_SIZE {
                return None;
            }
            AuxReg::from_block_offset(rel).map(|reg| (port, reg))
        })
    }
}

/// Read-only view of the monitors plugged into the virtual ports.
pub trait DisplayTopology {
    fn has_monitor(&self, port: Port) -> bool;
    fn is_displayport(&self, port: Port) -> bool;
    fn edid_block_for(&self, port: Port) -> Option<&EdidBlock>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    DisplayPort,
    Hdmi,
    Dvi,
    Vga,
}

#[derive(Debug, Clone)]
pub struct Monitor {
    pub connector: Connector,
    pub edid: EdidBlock,
    pub dpcd: Option<DpcdBlock>,
}

impl Monitor {
    pub fn displayport(edid: EdidBlock) -> Self {
        Self {
            connector: Connector::DisplayPort,
            edid,
            dpcd: Some(DpcdBlock::with_fixed_header()),
        }
    }

    pub fn legacy(connector: Connector, edid: EdidBlock) -> Self {
        Self {
            connector,
            edid,
            dpcd: None,
        }
    }
}

/// In-memory topology: one optional monitor per port.
#[derive(Debug, Clone, Default)]
pub struct PortTable {
    ports: [Option<Monitor>; 5],
}

impl PortTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, port: Port, monitor: Monitor) {
        tracing::debug!(?port, connector = ?monitor.connector, "monitor attached");
        self.ports[port.index()] = Some(monitor);
    }

    pub fn detach(&mut self, port: Port) -> Option<Monitor> {
        self.ports[port.index()].take()
    }

    pub fn monitor(&self, port: Port) -> Option<&Monitor> {
        self.ports[port.index()].as_ref()
    }

    /// Invalidates the EDID/DPCD data of `port` and unplugs it.
    pub fn clear_port(&mut self, port: Port) {
        if let Some(monitor) = self.ports[port.index()].as_mut() {
            monitor.edid.invalidate();
            if let Some(dpcd) = monitor.dpcd.as_mut() {
                dpcd.invalidate();
            }
        }
        self.ports[port.index()] = None;
    }

    /// Plugs `count` DisplayPort monitors with the built-in EDID on ports B, C and D.
    pub fn install_default_monitors(&mut self, count: usize) -> Result<()> {
        const FIRST: usize = 1;
        const LAST: usize = 3;
        for index in 0..count {
            let Some(port) = Port::ALL
                .get(FIRST + index)
                .copied()
                .filter(|p| p.index() <= LAST)
            else {
                tracing::error!(index, "default monitor exceeds the last DisplayPort port");
                return Err(I2cError::PortsExhausted { index });
            };
            self.attach(port, Monitor::displayport(EdidBlock::default_monitor()));
        }
        Ok(())
    }
}

impl DisplayTopology for PortTable {
    fn has_monitor(&self, port: Port) -> bool {
        self.monitor(port).is_some_and(|m| m.edid.is_valid())
    }

    fn is_displayport(&self, port: Port) -> bool {
        self.monitor(port)
            .is_some_and(|m| m.connector == Connector::DisplayPort)
    }

    fn edid_block_for(&self, port: Port) -> Option<&EdidBlock> {
        self.monitor(port).map(|m| &m.edid)
    }
}
