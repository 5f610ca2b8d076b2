//! Sequential EDID reader shared by both transports.

use vgt_edid::{EdidBlock, EDID_BLOCK_SIZE};

use crate::session::{I2cSession, Transport};

/// Why a byte could not be served. None of these fail the guest access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteFault {
    /// No transport owns the session or no slave has been addressed yet.
    SequenceViolation,
    /// The cursor is past the end of the block.
    Overrun { cursor: usize },
    /// The addressed port has no (suitable) monitor.
    NoEdid,
}

/// Serves the byte under the cursor and advances it.
pub fn try_next_byte(session: &mut I2cSession, edid: Option<&EdidBlock>) -> Result<u8, ByteFault> {
    if session.transport == Transport::Unspecified || !session.slave_selected {
        return Err(ByteFault::SequenceViolation);
    }
    if session.read_cursor >= EDID_BLOCK_SIZE {
        return Err(ByteFault::Overrun {
            cursor: session.read_cursor,
        });
    }
    if !session.edid_available {
        return Err(ByteFault::NoEdid);
    }
    let Some(byte) = edid.and_then(|e| e.byte(session.read_cursor)) else {
        return Err(ByteFault::NoEdid);
    };
    tracing::debug!(offset = session.read_cursor, value = byte, "edid byte");
    session.read_cursor += 1;
    Ok(byte)
}

/// Like [`try_next_byte`], but logs the fault and yields `0`.
pub fn next_byte(session: &mut I2cSession, edid: Option<&EdidBlock>) -> u8 {
    match try_next_byte(session, edid) {
        Ok(b) => b,
        Err(ByteFault::SequenceViolation) => {
            tracing::warn!("EDID read without a proper I2C sequence");
            0
        }
        Err(ByteFault::Overrun { cursor }) => {
            tracing::warn!(cursor, "EDID read past the end of the block");
            0
        }
        Err(ByteFault::NoEdid) => {
            tracing::warn!(port = ?session.active_port, "EDID read but no EDID is available");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::Port;

    fn ready_session() -> I2cSession {
        I2cSession {
            transport: Transport::GmbusActive,
            active_port: Some(Port::B),
            slave_selected: true,
            edid_available: true,
            ..I2cSession::default()
        }
    }

    #[test]
    fn streams_whole_block_then_overruns() {
        let edid = EdidBlock::default_monitor();
        let mut s = ready_session();
        let got: Vec<u8> = (0..EDID_BLOCK_SIZE)
            .map(|_| next_byte(&mut s, Some(&edid)))
            .collect();
        assert_eq!(got.as_slice(), edid.as_bytes().as_slice());

        for _ in 0..3 {
            assert_eq!(
                try_next_byte(&mut s, Some(&edid)),
                Err(ByteFault::Overrun { cursor: 128 })
            );
            assert_eq!(next_byte(&mut s, Some(&edid)), 0);
        }
        assert_eq!(s.read_cursor, EDID_BLOCK_SIZE);
    }

    #[test]
    fn sequence_is_checked_before_overrun() {
        let edid = EdidBlock::default_monitor();
        let mut s = ready_session();
        s.read_cursor = 500;
        s.slave_selected = false;
        assert_eq!(
            try_next_byte(&mut s, Some(&edid)),
            Err(ByteFault::SequenceViolation)
        );

        s = ready_session();
        s.transport = Transport::Unspecified;
        assert_eq!(
            try_next_byte(&mut s, Some(&edid)),
            Err(ByteFault::SequenceViolation)
        );
    }

    #[test]
    fn unavailable_edid_yields_zero_without_advancing() {
        let edid = EdidBlock::default_monitor();
        let mut s = ready_session();
        s.edid_available = false;
        assert_eq!(try_next_byte(&mut s, Some(&edid)), Err(ByteFault::NoEdid));
        assert_eq!(next_byte(&mut s, Some(&edid)), 0);
        assert_eq!(s.read_cursor, 0);

        s.edid_available = true;
        assert_eq!(try_next_byte(&mut s, None), Err(ByteFault::NoEdid));
    }

    #[test]
    fn seeked_cursor_serves_from_offset() {
        let edid = EdidBlock::default_monitor();
        let mut s = ready_session();
        s.read_cursor = 54;
        assert_eq!(next_byte(&mut s, Some(&edid)), edid.as_bytes()[54]);
        assert_eq!(s.read_cursor, 55);
    }
}
