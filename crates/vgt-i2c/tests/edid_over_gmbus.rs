use pretty_assertions::assert_eq;
use vgt_edid::EdidBlock;
use vgt_i2c::{
    mmio, Connector, Gmbus1, Gmbus2, GmbusCycle, GmbusPhase, I2cSession, Monitor, Port, PortTable,
    Transport, VgtDisplay,
};

const PIN_PORT_B: u32 = 5;

fn device_with(connector: Connector) -> VgtDisplay {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut ports = PortTable::new();
    let edid = EdidBlock::default_monitor();
    let monitor = match connector {
        Connector::DisplayPort => Monitor::displayport(edid),
        other => Monitor::legacy(other, edid),
    };
    ports.attach(Port::B, monitor);
    VgtDisplay::new(ports, vgt_i2c::DEFAULT_MMIO_SIZE)
}

fn status(dev: &VgtDisplay) -> Gmbus2 {
    Gmbus2::from_bits_retain(dev.peek_u32(mmio::GMBUS2))
}

#[test]
fn port_select_on_hdmi_monitor_acks() {
    let dev = device_with(Connector::Hdmi);
    dev.write_u32(mmio::GMBUS0, PIN_PORT_B).unwrap();

    let s = dev.session();
    assert!(s.edid_available);
    assert_eq!(s.transport, Transport::GmbusActive);
    assert_eq!(s.active_port, Some(Port::B));
    assert!(!status(&dev).contains(Gmbus2::SATOER));
    assert!(status(&dev).contains(Gmbus2::HW_RDY));
    assert_eq!(dev.peek_u32(mmio::GMBUS0), PIN_PORT_B);
}

#[test]
fn port_select_on_displayport_monitor_naks() {
    let dev = device_with(Connector::DisplayPort);
    dev.write_u32(mmio::GMBUS0, PIN_PORT_B).unwrap();

    assert!(!dev.session().edid_available);
    assert!(status(&dev).contains(Gmbus2::SATOER));
}

#[test]
fn port_select_on_empty_port_naks() {
    let dev = device_with(Connector::Hdmi);
    // Pin 6 is port D, which has nothing plugged in.
    dev.write_u32(mmio::GMBUS0, 6).unwrap();
    assert!(!dev.session().edid_available);
    assert!(status(&dev).contains(Gmbus2::SATOER));
}

#[test]
fn sixteen_byte_read_with_stop_returns_to_idle() {
    let dev = device_with(Connector::Dvi);
    let edid = EdidBlock::default_monitor();

    dev.write_u32(mmio::GMBUS0, PIN_PORT_B).unwrap();
    let cmd = Gmbus1::command(GmbusCycle::NonIndexedStop, 16, 0, 0x50, true).0 | Gmbus1::SW_RDY;
    dev.write_u32(mmio::GMBUS1, cmd).unwrap();
    assert_eq!(dev.session().gmbus.phase, GmbusPhase::Data);
    assert!(status(&dev).contains(Gmbus2::ACTIVE));

    let mut got = Vec::new();
    for i in 0..4 {
        let word = dev.read_u32(mmio::GMBUS3).unwrap();
        got.extend_from_slice(&word.to_le_bytes());
        if i < 3 {
            assert_eq!(dev.session().read_cursor, (i + 1) * 4);
        }
    }
    assert_eq!(got.as_slice(), &edid.as_bytes()[..16]);

    let s = dev.session();
    assert_eq!(s.gmbus.phase, GmbusPhase::Idle);
    assert_eq!(s, I2cSession::new());
}

#[test]
fn full_block_read_with_indexed_stop() {
    let dev = device_with(Connector::Hdmi);
    let edid = EdidBlock::default_monitor();

    dev.write_u32(mmio::GMBUS0, PIN_PORT_B).unwrap();
    dev.write_u32(
        mmio::GMBUS1,
        Gmbus1::command(GmbusCycle::IndexedStop, 128, 0, 0x50, true).0,
    )
    .unwrap();

    let mut got = Vec::new();
    while got.len() < 128 {
        // Poll status like a driver would before each data read.
        let st = Gmbus2::from_bits_retain(dev.read_u32(mmio::GMBUS2).unwrap());
        assert!(st.contains(Gmbus2::HW_RDY));
        got.extend_from_slice(&dev.read_u32(mmio::GMBUS3).unwrap().to_le_bytes());
    }
    assert_eq!(got.as_slice(), edid.as_bytes().as_slice());
    assert_eq!(dev.session(), I2cSession::new());
}

#[test]
fn byte_count_past_block_end_reads_zeros() {
    let dev = device_with(Connector::Hdmi);
    let edid = EdidBlock::default_monitor();

    dev.write_u32(mmio::GMBUS0, PIN_PORT_B).unwrap();
    dev.write_u32(
        mmio::GMBUS1,
        Gmbus1::command(GmbusCycle::IndexedWrite, 256, 124, 0x50, true).0,
    )
    .unwrap();

    let tail = dev.read_u32(mmio::GMBUS3).unwrap();
    assert_eq!(&tail.to_le_bytes()[..], &edid.as_bytes()[124..128]);
    // Cursor is pinned at the end of the block from here on.
    assert_eq!(dev.read_u32(mmio::GMBUS3).unwrap(), 0);
    assert_eq!(dev.session().read_cursor, 128);
}

#[test]
fn seek_beyond_block_is_an_overrun_not_a_fault() {
    let dev = device_with(Connector::Hdmi);
    dev.write_u32(mmio::GMBUS0, PIN_PORT_B).unwrap();
    dev.write_u32(
        mmio::GMBUS1,
        Gmbus1::command(GmbusCycle::IndexedWrite, 511, 200, 0x50, true).0,
    )
    .unwrap();
    assert_eq!(dev.read_u32(mmio::GMBUS3).unwrap(), 0);
    assert_eq!(dev.session().read_cursor, 200);
}

#[test]
fn narrow_gmbus1_write_merges_into_register() {
    let dev = device_with(Connector::Hdmi);
    dev.write_u32(mmio::GMBUS0, PIN_PORT_B).unwrap();
    // Low byte only: slave address 0x50, read direction.
    dev.mmio_write(mmio::GMBUS1, &[0xA1]).unwrap();
    assert!(dev.session().slave_selected);
    assert_eq!(dev.peek_u32(mmio::GMBUS1), 0xA1);
}

#[test]
fn stop_cycle_releases_an_active_transfer() {
    let dev = device_with(Connector::Hdmi);
    dev.write_u32(mmio::GMBUS0, PIN_PORT_B).unwrap();
    dev.write_u32(
        mmio::GMBUS1,
        Gmbus1::command(GmbusCycle::NonIndexedWrite, 128, 0, 0x50, true).0,
    )
    .unwrap();
    dev.read_u32(mmio::GMBUS3).unwrap();
    assert_eq!(dev.session().read_cursor, 4);

    dev.write_u32(mmio::GMBUS1, Gmbus1::command(GmbusCycle::Stop, 0, 0, 0, false).0)
        .unwrap();
    assert_eq!(dev.session(), I2cSession::new());
    assert!(!status(&dev).contains(Gmbus2::ACTIVE));
}

#[test]
fn drained_indexed_write_waits_for_stop() {
    let dev = device_with(Connector::Hdmi);
    dev.write_u32(mmio::GMBUS0, PIN_PORT_B).unwrap();
    dev.write_u32(
        mmio::GMBUS1,
        Gmbus1::command(GmbusCycle::IndexedWrite, 8, 0, 0x50, true).0,
    )
    .unwrap();
    dev.read_u32(mmio::GMBUS3).unwrap();
    dev.read_u32(mmio::GMBUS3).unwrap();

    assert_eq!(dev.session().gmbus.phase, GmbusPhase::Wait);
    assert!(status(&dev).contains(Gmbus2::HW_WAIT_PHASE | Gmbus2::HW_RDY));

    // Selecting the pin again starts over without the wait phase.
    dev.write_u32(mmio::GMBUS0, PIN_PORT_B).unwrap();
    assert!(!status(&dev).contains(Gmbus2::HW_WAIT_PHASE));
}
