//! Virtual display identification for mediated GPU passthrough.
//!
//! The guest graphics driver probes monitors through two hardware paths:
//! - GMBUS, the I2C controller used for HDMI/DVI/VGA connectors ([`gmbus`]), and
//! - I2C-over-AUX on DisplayPort connectors ([`aux`]).
//!
//! Both are emulated at register granularity on top of one shared [`session::I2cSession`] and a
//! single EDID cursor ([`byte_source`]). [`VgtDisplay`] is the MMIO entry point; it routes each
//! trapped access by offset and serializes all of them behind one lock.
#![forbid(unsafe_code)]

pub mod aux;
pub mod bus;
pub mod byte_source;
pub mod config;
pub mod device;
pub mod error;
pub mod gmbus;
pub mod port;
pub mod regs;
pub mod session;
pub mod vreg;

pub use bus::{check_access, I2cBus, MAX_ACCESS_BYTES};
pub use byte_source::{next_byte, try_next_byte, ByteFault};
pub use config::{DisplayConfig, DEFAULT_MMIO_SIZE};
pub use device::VgtDisplay;
pub use error::{I2cError, Result};
pub use port::{Connector, DisplayTopology, Monitor, Port, PortTable};
pub use regs::{mmio, AuxCtl, AuxMessage, AuxReg, Gmbus0, Gmbus1, Gmbus2, GmbusCycle};
pub use session::{
    gmbus_data_exhausted, gmbus_transition, AuxState, GmbusPhase, GmbusState, GmbusTransition,
    I2cSession, Transport,
};
pub use vreg::{RegisterFile, VirtualRegisters};
