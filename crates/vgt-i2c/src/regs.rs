//! Register layout of the GMBUS controller and the DisplayPort AUX channels.
//!
//! Every field the emulators care about has a named accessor here; handlers never open-code a
//! mask/shift pair.

use bitflags::bitflags;

pub mod mmio {
    pub const GMBUS0: u32 = 0xC5100;
    pub const GMBUS1: u32 = 0xC5104;
    pub const GMBUS2: u32 = 0xC5108;
    pub const GMBUS3: u32 = 0xC510C;
    pub const GMBUS4: u32 = 0xC5110;
    pub const GMBUS5: u32 = 0xC5120;

    /// First offset past the GMBUS register window.
    pub const GMBUS_END: u32 = GMBUS5 + 4;

    pub const DPA_AUX_CH_CTL: u32 = 0x64010;
    pub const PCH_DPB_AUX_CH_CTL: u32 = 0xE4110;
    pub const PCH_DPC_AUX_CH_CTL: u32 = 0xE4210;
    pub const PCH_DPD_AUX_CH_CTL: u32 = 0xE4310;

    /// Control register plus DATA1..DATA5.
    pub const AUX_CH_BLOCK_SIZE: u32 = 0x18;
}

pub fn is_gmbus_offset(offset: u32) -> bool {
    (mmio::GMBUS0..mmio::GMBUS_END).contains(&offset)
}

/// GMBUS0: clock/port select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gmbus0(pub u32);

impl Gmbus0 {
    const PIN_SELECT_MASK: u32 = 0x7;

    pub fn pin_select(self) -> u32 {
        self.0 & Self::PIN_SELECT_MASK
    }
}

/// GMBUS1 bus-cycle encoding (bits 27:25).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GmbusCycle {
    NoCycle,
    /// Data phase then wait, no index, no stop.
    NonIndexedWrite,
    /// Index phase, data phase then wait, no stop.
    IndexedWrite,
    Stop,
    NonIndexedStop,
    IndexedStop,
}

impl GmbusCycle {
    /// Decodes the 3-bit cycle field. `None` for the reserved encodings (2 and 6).
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits & 0x7 {
            0 => Some(Self::NoCycle),
            1 => Some(Self::NonIndexedWrite),
            3 => Some(Self::IndexedWrite),
            4 => Some(Self::Stop),
            5 => Some(Self::NonIndexedStop),
            7 => Some(Self::IndexedStop),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::NoCycle => 0,
            Self::NonIndexedWrite => 1,
            Self::IndexedWrite => 3,
            Self::Stop => 4,
            Self::NonIndexedStop => 5,
            Self::IndexedStop => 7,
        }
    }

    /// Cycles that end with a bus stop once the byte count has been transferred.
    pub fn stops_after_data(self) -> bool {
        matches!(self, Self::NonIndexedStop | Self::IndexedStop)
    }
}

/// GMBUS1: command/status register written by the guest to start a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gmbus1(pub u32);

impl Gmbus1 {
    pub const SW_CLR_INT: u32 = 1 << 31;
    pub const SW_RDY: u32 = 1 << 30;
    pub const ENT: u32 = 1 << 29;
    pub const CYCLE_STOP: u32 = 1 << 27;
    pub const CYCLE_INDEX: u32 = 1 << 26;
    pub const CYCLE_WAIT: u32 = 1 << 25;
    pub const SLAVE_READ: u32 = 1 << 0;

    const CYCLE_SHIFT: u32 = 25;
    const BYTE_COUNT_SHIFT: u32 = 16;
    const BYTE_COUNT_MASK: u32 = 0x1FF;
    const SLAVE_INDEX_SHIFT: u32 = 8;
    const SLAVE_INDEX_MASK: u32 = 0xFF;
    const SLAVE_ADDR_SHIFT: u32 = 1;
    const SLAVE_ADDR_MASK: u32 = 0x7F;

    /// Builds a command word from its fields (used by tests and guest-side helpers).
    pub fn command(
        cycle: GmbusCycle,
        byte_count: u16,
        index: u8,
        slave_addr: u8,
        read: bool,
    ) -> Self {
        let mut v = (cycle.bits() << Self::CYCLE_SHIFT)
            | ((byte_count as u32 & Self::BYTE_COUNT_MASK) << Self::BYTE_COUNT_SHIFT)
            | ((index as u32) << Self::SLAVE_INDEX_SHIFT)
            | ((slave_addr as u32 & Self::SLAVE_ADDR_MASK) << Self::SLAVE_ADDR_SHIFT);
        if read {
            v |= Self::SLAVE_READ;
        }
        Self(v)
    }

    pub fn sw_clr_int(self) -> bool {
        self.0 & Self::SW_CLR_INT != 0
    }

    pub fn sw_rdy(self) -> bool {
        self.0 & Self::SW_RDY != 0
    }

    pub fn cycle_bits(self) -> u32 {
        (self.0 >> Self::CYCLE_SHIFT) & 0x7
    }

    pub fn cycle(self) -> Option<GmbusCycle> {
        GmbusCycle::from_bits(self.cycle_bits())
    }

    pub fn indexed(self) -> bool {
        self.0 & Self::CYCLE_INDEX != 0
    }

    pub fn total_byte_count(self) -> u32 {
        (self.0 >> Self::BYTE_COUNT_SHIFT) & Self::BYTE_COUNT_MASK
    }

    pub fn slave_index(self) -> u32 {
        (self.0 >> Self::SLAVE_INDEX_SHIFT) & Self::SLAVE_INDEX_MASK
    }

    pub fn slave_addr(self) -> u8 {
        ((self.0 >> Self::SLAVE_ADDR_SHIFT) & Self::SLAVE_ADDR_MASK) as u8
    }

    pub fn slave_read(self) -> bool {
        self.0 & Self::SLAVE_READ != 0
    }

    pub fn with_sw_rdy_cleared(self) -> Self {
        Self(self.0 & !Self::SW_RDY)
    }
}

bitflags! {
    /// GMBUS2 status bits.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct Gmbus2: u32 {
        const INUSE = 1 << 15;
        const HW_WAIT_PHASE = 1 << 14;
        const STALL_TIMEOUT = 1 << 13;
        const INT = 1 << 12;
        const HW_RDY = 1 << 11;
        const SATOER = 1 << 10;
        const ACTIVE = 1 << 9;
    }
}

/// Registers inside one AUX-CH block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxReg {
    Ctl,
    Data(u8),
}

impl AuxReg {
    /// Maps the offset within an AUX-CH block (`0x00..0x18`) to a register.
    pub fn from_block_offset(rel: u32) -> Option<Self> {
        match rel {
            0x00 => Some(Self::Ctl),
            0x04 | 0x08 | 0x0C | 0x10 | 0x14 => Some(Self::Data((rel / 4) as u8)),
            _ => None,
        }
    }
}

/// AUX-CH control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxCtl(pub u32);

impl AuxCtl {
    pub const SEND_BUSY: u32 = 1 << 31;
    pub const DONE: u32 = 1 << 30;

    const MESSAGE_SIZE_SHIFT: u32 = 20;
    const MESSAGE_SIZE_MASK: u32 = 0x1F << Self::MESSAGE_SIZE_SHIFT;

    pub fn send(message_size: u32) -> Self {
        Self(
            Self::SEND_BUSY
                | ((message_size << Self::MESSAGE_SIZE_SHIFT) & Self::MESSAGE_SIZE_MASK),
        )
    }

    /// Completion value: DONE with the reply size.
    pub fn done(reply_size: u32) -> Self {
        Self(Self::DONE | ((reply_size << Self::MESSAGE_SIZE_SHIFT) & Self::MESSAGE_SIZE_MASK))
    }

    pub fn send_busy(self) -> bool {
        self.0 & Self::SEND_BUSY != 0
    }

    pub fn is_done(self) -> bool {
        self.0 & Self::DONE != 0
    }

    pub fn message_size(self) -> u32 {
        (self.0 & Self::MESSAGE_SIZE_MASK) >> Self::MESSAGE_SIZE_SHIFT
    }
}

/// Request nibble bits of an I2C-over-AUX message.
pub mod aux_request {
    pub const I2C_WRITE: u8 = 0x0;
    pub const I2C_READ: u8 = 0x1;
    pub const I2C_MOT: u8 = 0x4;
}

/// Reply code for a successful I2C-over-AUX transfer (AUX ACK + I2C ACK).
pub const AUX_I2C_REPLY_ACK: u32 = 0x0;

/// The message header the guest places in DATA1 before kicking the control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxMessage(pub u32);

impl AuxMessage {
    pub fn new(request: u8, address: u16) -> Self {
        Self(((request as u32 & 0xF) << 28) | ((address as u32) << 8))
    }

    pub fn address(self) -> u16 {
        ((self.0 >> 8) & 0xFFFF) as u16
    }

    pub fn control(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn request(self) -> u8 {
        self.control() >> 4
    }

    pub fn is_read(self) -> bool {
        self.request() & aux_request::I2C_READ != 0
    }

    pub fn mot(self) -> bool {
        self.request() & aux_request::I2C_MOT != 0
    }
}

/// Reply word the emulator places back in DATA1.
pub fn aux_reply(data: Option<u8>) -> u32 {
    let mut v = (AUX_I2C_REPLY_ACK & 0xFF) << 24;
    if let Some(b) = data {
        v |= (b as u32) << 16;
    }
    v
}
