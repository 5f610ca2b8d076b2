//! Per-device I2C session shared by the GMBUS and AUX-CH emulators.
//!
//! # GMBUS transition table
//!
//! | phase  | event                         | next phase | side effects                          |
//! |--------|-------------------------------|------------|---------------------------------------|
//! | any    | GMBUS0 valid pin              | `Idle`     | session reset, clear `ACTIVE`/`WAIT`  |
//! | any    | GMBUS1 `NoCycle`              | unchanged  | none                                  |
//! | any    | GMBUS1 `Stop`, previous != 0  | `Idle`     | session reset, clear `ACTIVE`/`WAIT`  |
//! | any    | GMBUS1 `Stop`, previous == 0  | unchanged  | none                                  |
//! | any    | GMBUS1 `*Write` / `*Stop`     | `Data`     | set `ACTIVE`, clear `WAIT`            |
//! | any    | GMBUS1 reserved cycle         | unchanged  | none, register not committed          |
//! | `Data` | GMBUS3 read drains byte count | `Wait`     | set `WAIT` (`*Write` cycles)          |
//! | `Data` | GMBUS3 read drains byte count | `Idle`     | session reset, clear `ACTIVE`/`WAIT`  |
//! | any    | device reset                  | `Idle`     | session reset, clear `ACTIVE`/`WAIT`  |
//!
//! `WAIT` is `HW_WAIT_PHASE` in GMBUS2.

use crate::port::Port;
use crate::regs::GmbusCycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Unspecified,
    GmbusActive,
    AuxChActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GmbusPhase {
    #[default]
    Idle,
    Data,
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GmbusState {
    pub phase: GmbusPhase,
    pub cycle: GmbusCycle,
    pub total_byte_count: u32,
}

impl Default for GmbusState {
    fn default() -> Self {
        Self {
            phase: GmbusPhase::Idle,
            cycle: GmbusCycle::NoCycle,
            total_byte_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuxState {
    pub i2c_over_aux: bool,
    pub mot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct I2cSession {
    pub transport: Transport,
    pub active_port: Option<Port>,
    pub slave_selected: bool,
    pub edid_available: bool,
    pub read_cursor: usize,
    pub gmbus: GmbusState,
    pub aux: AuxState,
}

impl I2cSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full clear back to the construction state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What a GMBUS1 cycle field does to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GmbusTransition {
    /// Leave phase and status untouched.
    None,
    /// Reset the session, go `Idle`, clear `ACTIVE`.
    Stop,
    /// Enter the data phase, set `ACTIVE`.
    EnterData,
}

/// Transition for a GMBUS1 write carrying `cycle`, given the cycle of the value it replaces.
pub fn gmbus_transition(cycle: GmbusCycle, previous: Option<GmbusCycle>) -> GmbusTransition {
    match cycle {
        GmbusCycle::NoCycle => GmbusTransition::None,
        // A stop only reaches the bus if a cycle was in flight.
        GmbusCycle::Stop => match previous {
            Some(GmbusCycle::NoCycle) => GmbusTransition::None,
            _ => GmbusTransition::Stop,
        },
        GmbusCycle::NonIndexedWrite
        | GmbusCycle::IndexedWrite
        | GmbusCycle::NonIndexedStop
        | GmbusCycle::IndexedStop => GmbusTransition::EnterData,
    }
}

/// Phase after the last byte of the programmed count has been read through GMBUS3.
///
/// `Idle` means the session must also be reset.
pub fn gmbus_data_exhausted(cycle: GmbusCycle) -> GmbusPhase {
    if cycle.stops_after_data() {
        GmbusPhase::Idle
    } else {
        GmbusPhase::Wait
    }
}
