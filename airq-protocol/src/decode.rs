//! Field decoding
//!
//! Maps a validated frame onto physical quantities using the variant's
//! field table. Quantities a variant does not carry stay `None` rather
//! than reading as zero.

use crate::quantity::Quantity;
use crate::validate::ValidFrame;

/// One optional value per quantity
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedReading {
    values: [Option<f32>; Quantity::COUNT],
}

impl DecodedReading {
    /// Value for a quantity, if the frame carried it
    pub fn get(&self, quantity: Quantity) -> Option<f32> {
        self.values[quantity.index()]
    }

    /// Present quantities with their values, in frame order
    pub fn iter(&self) -> impl Iterator<Item = (Quantity, f32)> + '_ {
        Quantity::ALL
            .iter()
            .filter_map(move |&q| self.get(q).map(|v| (q, v)))
    }

    /// Number of quantities present
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode every field the frame's variant defines
pub fn decode(frame: &ValidFrame) -> DecodedReading {
    let bytes = frame.as_bytes();
    let mut reading = DecodedReading::default();

    for field in frame.protocol().fields {
        let raw = &bytes[field.offset..field.offset + field.encoding.width()];
        reading.values[field.quantity.index()] = Some(field.encoding.apply(raw));
    }

    reading
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::variant::{M702, N702B};

    fn close(a: Option<f32>, b: f32) -> bool {
        a.map_or(false, |a| (a - b).abs() < 0.001)
    }

    #[test]
    fn test_decode_m702() {
        let mut f = [
            0x3C, 0x02, // header
            0x01, 0x90, // eCO2 400
            0x00, 0x0A, // ozone 10
            0x00, 0x64, // TVOC 100
            0x00, 0x0C, // PM2.5 12
            0x00, 0x14, // PM10 20
            0x17, 0x2D, // 23.45 °C
            0x30, 0x05, // 48.05 %
            0x00,
        ];
        M702.checksum.write(&mut f);
        let valid = Frame::new(&f, 0).unwrap().validate(&M702).unwrap();
        let reading = decode(&valid);

        assert_eq!(reading.get(Quantity::Eco2), Some(400.0));
        assert_eq!(reading.get(Quantity::Ozone), Some(10.0));
        assert_eq!(reading.get(Quantity::Tvoc), Some(100.0));
        assert_eq!(reading.get(Quantity::Pm2_5), Some(12.0));
        assert_eq!(reading.get(Quantity::Pm10), Some(20.0));
        assert!(close(reading.get(Quantity::Temperature), 23.45));
        assert!(close(reading.get(Quantity::Humidity), 48.05));
        assert_eq!(reading.len(), 7);
    }

    #[test]
    fn test_decode_m702_below_zero() {
        let mut f = [0u8; 17];
        f[0] = 0x3C;
        f[1] = 0x02;
        f[12] = 0x80 | 3;
        f[13] = 50;
        M702.checksum.write(&mut f);
        let valid = Frame::new(&f, 0).unwrap().validate(&M702).unwrap();
        assert!(close(decode(&valid).get(Quantity::Temperature), -3.5));
    }

    #[test]
    fn test_decode_n702b_tenths() {
        let mut f = [0u8; 19];
        f[0] = 0x3C;
        f[1] = 0x04;
        f[2..4].copy_from_slice(&612u16.to_be_bytes());
        f[12..14].copy_from_slice(&235i16.to_be_bytes());
        f[14..16].copy_from_slice(&482u16.to_be_bytes());
        f[18] = 0x3E;
        N702B.checksum.write(&mut f);
        let valid = Frame::new(&f, 0).unwrap().validate(&N702B).unwrap();
        let reading = decode(&valid);

        assert_eq!(reading.get(Quantity::Eco2), Some(612.0));
        assert_eq!(reading.get(Quantity::Temperature), Some(23.5));
        assert_eq!(reading.get(Quantity::Humidity), Some(48.2));
    }

    #[test]
    fn test_empty_reading() {
        let reading = DecodedReading::default();
        assert!(reading.is_empty());
        assert_eq!(reading.iter().count(), 0);
    }
}
