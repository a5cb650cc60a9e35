use crate::identity::ProximityId;

/// Apple's Bluetooth company identifier, the manufacturer-data key an
/// iBeacon frame is advertised under.
pub const APPLE_COMPANY_ID: u16 = 0x004C;

/// Measured power at 1 m used when no calibrated value is persisted.
pub const DEFAULT_MEASURED_POWER: i8 = -59;

const FRAME_TYPE: u8 = 0x02;
const FRAME_DATA_LEN: u8 = 0x15;

/// The identity a beacon advertises: proximity identifier plus the two
/// 16-bit sub-identifiers and the calibrated power byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconRegion {
    pub id: ProximityId,
    pub major: u16,
    pub minor: u16,
    pub measured_power: i8,
}

impl BeaconRegion {
    pub fn new(id: ProximityId, major: u16, minor: u16, measured_power: i8) -> BeaconRegion {
        BeaconRegion {
            id,
            major,
            minor,
            measured_power,
        }
    }

    /// 25-byte iBeacon manufacturer-data frame: type, payload length,
    /// identifier, major, minor (big-endian), measured power.
    pub fn manufacturer_frame(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(25);
        frame.push(FRAME_TYPE);
        frame.push(FRAME_DATA_LEN);
        frame.extend_from_slice(self.id.as_bytes());
        frame.extend_from_slice(&self.major.to_be_bytes());
        frame.extend_from_slice(&self.minor.to_be_bytes());
        frame.push(self.measured_power as u8);
        frame
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::{BeaconRegion, DEFAULT_MEASURED_POWER};
    use crate::identity::ProximityId;

    fn region() -> BeaconRegion {
        let id = ProximityId::from_str("a0b1c3d2-af1c-a4b6-d0c4-000000000000").unwrap();
        BeaconRegion::new(id, 0x0102, 0x0304, DEFAULT_MEASURED_POWER)
    }

    #[test]
    fn frame_is_twenty_five_bytes_with_ibeacon_header() {
        let frame = region().manufacturer_frame();
        assert_eq!(frame.len(), 25);
        assert_eq!(&frame[..2], &[0x02, 0x15]);
    }

    #[test]
    fn frame_carries_identifier_bytes_in_order() {
        let frame = region().manufacturer_frame();
        assert_eq!(
            &frame[2..18],
            &[
                0xa0, 0xb1, 0xc3, 0xd2, 0xaf, 0x1c, 0xa4, 0xb6, 0xd0, 0xc4, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn major_and_minor_are_big_endian() {
        let frame = region().manufacturer_frame();
        assert_eq!(&frame[18..20], &[0x01, 0x02]);
        assert_eq!(&frame[20..22], &[0x03, 0x04]);
    }

    #[test]
    fn measured_power_is_twos_complement() {
        let frame = region().manufacturer_frame();
        assert_eq!(frame[24], 0xC5);
    }
}
