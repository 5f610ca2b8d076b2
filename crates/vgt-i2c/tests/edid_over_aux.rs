use pretty_assertions::assert_eq;
use vgt_edid::EdidBlock;
use vgt_i2c::regs::{aux_request, AUX_I2C_REPLY_ACK};
use vgt_i2c::{
    AuxCtl, AuxMessage, I2cError, I2cSession, Monitor, Port, PortTable, Transport, VgtDisplay,
};

const READ_MOT: u8 = aux_request::I2C_READ | aux_request::I2C_MOT;

fn dp_device() -> VgtDisplay {
    let mut ports = PortTable::new();
    ports.attach(Port::D, Monitor::displayport(EdidBlock::default_monitor()));
    VgtDisplay::new(ports, vgt_i2c::DEFAULT_MMIO_SIZE)
}

/// Issues one AUX transaction the way i915 does: header into DATA1, then kick CTL.
fn aux_transfer(
    dev: &VgtDisplay,
    port: Port,
    request: u8,
    address: u16,
    size: u32,
) -> vgt_i2c::Result<u32> {
    let ctl = port.aux_ctl_offset().unwrap();
    dev.write_u32(ctl + 4, AuxMessage::new(request, address).0)?;
    dev.write_u32(ctl, AuxCtl::send(size).0)?;
    let done = AuxCtl(dev.read_u32(ctl)?);
    assert!(done.is_done());
    dev.read_u32(ctl + 4)
}

#[test]
fn address_phase_then_first_byte() {
    let dev = dp_device();
    aux_transfer(&dev, Port::D, READ_MOT, 0x50, 3).unwrap();
    assert!(dev.session().edid_available);
    assert_eq!(dev.session().transport, Transport::AuxChActive);

    let reply = aux_transfer(&dev, Port::D, READ_MOT, 0x50, 4).unwrap();
    assert_eq!((reply >> 16) & 0xFF, 0x00);
    assert_eq!((reply >> 24) & 0xFF, AUX_I2C_REPLY_ACK);

    let reply = aux_transfer(&dev, Port::D, READ_MOT, 0x50, 4).unwrap();
    assert_eq!((reply >> 16) & 0xFF, 0xFF);
}

#[test]
fn whole_block_then_stop() {
    let dev = dp_device();
    let edid = EdidBlock::default_monitor();

    aux_transfer(&dev, Port::D, READ_MOT, 0x50, 3).unwrap();
    let got: Vec<u8> = (0..128)
        .map(|_| {
            let reply = aux_transfer(&dev, Port::D, READ_MOT, 0x50, 4).unwrap();
            ((reply >> 16) & 0xFF) as u8
        })
        .collect();
    assert_eq!(got.as_slice(), edid.as_bytes().as_slice());

    // Overrun reads come back as zero, not as a failed transfer.
    let reply = aux_transfer(&dev, Port::D, READ_MOT, 0x50, 4).unwrap();
    assert_eq!((reply >> 16) & 0xFF, 0);

    aux_transfer(&dev, Port::D, aux_request::I2C_READ, 0x50, 3).unwrap();
    assert_eq!(dev.session(), I2cSession::new());
}

#[test]
fn read_without_address_phase_returns_sentinel() {
    let dev = dp_device();
    let reply = aux_transfer(&dev, Port::D, READ_MOT, 0x50, 4).unwrap();
    assert_eq!((reply >> 16) & 0xFF, 0xFF);
    assert_eq!(dev.session().read_cursor, 0);
}

#[test]
fn port_without_monitor_selects_slave_but_has_no_edid() {
    let dev = dp_device();
    aux_transfer(&dev, Port::B, READ_MOT, 0x50, 3).unwrap();
    let s = dev.session();
    assert!(s.slave_selected);
    assert!(!s.edid_available);
    assert_eq!(s.active_port, Some(Port::B));
}

#[test]
fn malformed_read_fails_the_access() {
    let dev = dp_device();
    aux_transfer(&dev, Port::D, READ_MOT, 0x50, 3).unwrap();
    let ctl = Port::D.aux_ctl_offset().unwrap();

    dev.write_u32(ctl + 4, AuxMessage::new(READ_MOT, 0x50).0).unwrap();
    let before = dev.session();
    let err = dev.write_u32(ctl, AuxCtl::send(6).0).unwrap_err();
    assert_eq!(
        err,
        I2cError::MalformedAuxRead {
            request: READ_MOT,
            message_size: 6
        }
    );
    assert_eq!(dev.session(), before);
}

#[test]
fn data_registers_are_plain_storage() {
    let dev = dp_device();
    let ctl = Port::C.aux_ctl_offset().unwrap();
    for n in 1..=5u32 {
        dev.write_u32(ctl + 4 * n, 0x1000 + n).unwrap();
    }
    for n in 1..=5u32 {
        assert_eq!(dev.read_u32(ctl + 4 * n).unwrap(), 0x1000 + n);
    }
    assert_eq!(dev.session(), I2cSession::new());
}
