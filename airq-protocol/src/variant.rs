//! Protocol variant descriptors
//!
//! Each supported module is described by a constant table: frame length,
//! marker bytes, checksum placement and the field layout. Drivers pick a
//! table at construction time.
//!
//! M702 frame (17 bytes, unsolicited, roughly once per second):
//! ```text
//!  0    1    2..4  4..6   6..8  8..10  10..12  12    13    14    15    16
//! 3C   02   eCO2  O3     TVOC  PM2.5  PM10    T.int T.dec H.int H.dec SUM
//! ```
//!
//! N702B frame (19 bytes, sent in reply to [`N702B_REQUEST`]):
//! ```text
//!  0    1    2..4  4..6   6..8  8..10  10..12  12..14  14..16  16..18  18
//! 3C   04   eCO2  O3     TVOC  PM2.5  PM10    T x10   RH x10  CRC16   3E
//! ```

use crate::checksum::{ChecksumAlgorithm, ChecksumSpec};
use crate::quantity::Quantity;

/// How a field's raw bytes map to a physical value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldEncoding {
    /// Big-endian u16 divided by `divisor`
    U16Be { divisor: f32 },
    /// Big-endian i16 divided by `divisor`
    I16Be { divisor: f32 },
    /// Integer byte with bit 7 as sign, followed by a hundredths byte
    SignedCenti,
    /// Integer byte followed by a hundredths byte
    UnsignedCenti,
}

impl FieldEncoding {
    /// Number of frame bytes occupied
    pub const fn width(&self) -> usize {
        2
    }

    /// Convert raw field bytes to a physical value
    ///
    /// `raw` must hold at least [`width`](Self::width) bytes.
    pub fn apply(&self, raw: &[u8]) -> f32 {
        match *self {
            FieldEncoding::U16Be { divisor } => {
                u16::from_be_bytes([raw[0], raw[1]]) as f32 / divisor
            }
            FieldEncoding::I16Be { divisor } => {
                i16::from_be_bytes([raw[0], raw[1]]) as f32 / divisor
            }
            FieldEncoding::SignedCenti => {
                let magnitude = (raw[0] & 0x7F) as f32 + raw[1] as f32 / 100.0;
                if raw[0] & 0x80 != 0 {
                    -magnitude
                } else {
                    magnitude
                }
            }
            FieldEncoding::UnsignedCenti => raw[0] as f32 + raw[1] as f32 / 100.0,
        }
    }
}

/// One entry of a variant's field table
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldSpec {
    pub quantity: Quantity,
    /// Byte offset from the start of the frame
    pub offset: usize,
    pub encoding: FieldEncoding,
}

/// Constant description of one module's wire format
#[derive(Debug, PartialEq)]
pub struct ProtocolVariant {
    /// Module name, used in logs
    pub name: &'static str,
    /// Fixed frame length in bytes
    pub frame_len: usize,
    /// Leading marker bytes
    pub header: &'static [u8],
    /// Optional trailing marker byte (last byte of the frame)
    pub trailer: Option<u8>,
    pub checksum: ChecksumSpec,
    pub fields: &'static [FieldSpec],
    /// Command that asks the module for a reading, if it does not stream
    pub request: Option<&'static [u8]>,
}

impl ProtocolVariant {
    /// Field entry for a quantity, if this variant carries it
    pub fn field(&self, quantity: Quantity) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.quantity == quantity)
    }

    /// Whether the module must be polled with a request command
    pub fn is_request_driven(&self) -> bool {
        self.request.is_some()
    }
}

const fn u16_field(quantity: Quantity, offset: usize) -> FieldSpec {
    FieldSpec {
        quantity,
        offset,
        encoding: FieldEncoding::U16Be { divisor: 1.0 },
    }
}

const M702_FIELDS: [FieldSpec; 7] = [
    u16_field(Quantity::Eco2, 2),
    u16_field(Quantity::Ozone, 4),
    u16_field(Quantity::Tvoc, 6),
    u16_field(Quantity::Pm2_5, 8),
    u16_field(Quantity::Pm10, 10),
    FieldSpec {
        quantity: Quantity::Temperature,
        offset: 12,
        encoding: FieldEncoding::SignedCenti,
    },
    FieldSpec {
        quantity: Quantity::Humidity,
        offset: 14,
        encoding: FieldEncoding::UnsignedCenti,
    },
];

/// M702 7-in-1 module
pub static M702: ProtocolVariant = ProtocolVariant {
    name: "M702",
    frame_len: 17,
    header: &[0x3C, 0x02],
    trailer: None,
    checksum: ChecksumSpec {
        algorithm: ChecksumAlgorithm::Sum8,
        covered: 16,
        offset: 16,
    },
    fields: &M702_FIELDS,
    request: None,
};

const N702B_FIELDS: [FieldSpec; 7] = [
    u16_field(Quantity::Eco2, 2),
    u16_field(Quantity::Ozone, 4),
    u16_field(Quantity::Tvoc, 6),
    u16_field(Quantity::Pm2_5, 8),
    u16_field(Quantity::Pm10, 10),
    FieldSpec {
        quantity: Quantity::Temperature,
        offset: 12,
        encoding: FieldEncoding::I16Be { divisor: 10.0 },
    },
    FieldSpec {
        quantity: Quantity::Humidity,
        offset: 14,
        encoding: FieldEncoding::U16Be { divisor: 10.0 },
    },
];

/// Read-all command: header, command 0x01, sum of the preceding bytes
pub const N702B_REQUEST: [u8; 4] = [0x3C, 0x04, 0x01, 0x41];

/// N702B request/response module
pub static N702B: ProtocolVariant = ProtocolVariant {
    name: "N702B",
    frame_len: 19,
    header: &[0x3C, 0x04],
    trailer: Some(0x3E),
    checksum: ChecksumSpec {
        algorithm: ChecksumAlgorithm::Crc16Modbus,
        covered: 16,
        offset: 16,
    },
    fields: &N702B_FIELDS,
    request: Some(&N702B_REQUEST),
};

/// Supported module variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// Streaming module, driven by the host loop tick
    #[default]
    M702,
    /// Polled module, default 30 s interval
    N702B,
}

impl Variant {
    /// Descriptor table for this variant
    pub fn protocol(self) -> &'static ProtocolVariant {
        match self {
            Variant::M702 => &M702,
            Variant::N702B => &N702B,
        }
    }

    /// Look up a variant by (case-insensitive) name
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("m702") || name.eq_ignore_ascii_case("m702uart") {
            Some(Variant::M702)
        } else if name.eq_ignore_ascii_case("n702b") {
            Some(Variant::N702B)
        } else {
            None
        }
    }

    /// Default poll interval in milliseconds
    pub const fn default_update_interval_ms(self) -> u32 {
        match self {
            Variant::M702 => 1_000,
            Variant::N702B => 30_000,
        }
    }
}
