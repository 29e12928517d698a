//! Physical quantities reported by the modules

/// A single physical measurement type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quantity {
    /// Equivalent CO2 (ppm)
    Eco2,
    /// Ozone (ppb)
    Ozone,
    /// Total volatile organic compounds (ppb)
    Tvoc,
    /// Particulate matter ≤ 2.5 µm (µg/m³)
    Pm2_5,
    /// Particulate matter ≤ 10 µm (µg/m³)
    Pm10,
    /// Temperature (°C)
    Temperature,
    /// Relative humidity (%RH)
    Humidity,
}

impl Quantity {
    /// Number of quantities
    pub const COUNT: usize = 7;

    /// All quantities in frame order
    pub const ALL: [Quantity; Self::COUNT] = [
        Quantity::Eco2,
        Quantity::Ozone,
        Quantity::Tvoc,
        Quantity::Pm2_5,
        Quantity::Pm10,
        Quantity::Temperature,
        Quantity::Humidity,
    ];

    /// Stable index, usable for fixed-size tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Configuration key
    pub const fn key(self) -> &'static str {
        match self {
            Quantity::Eco2 => "eco2",
            Quantity::Ozone => "ozone",
            Quantity::Tvoc => "tvoc",
            Quantity::Pm2_5 => "pm_2_5",
            Quantity::Pm10 => "pm_10",
            Quantity::Temperature => "temperature",
            Quantity::Humidity => "humidity",
        }
    }

    /// Look up a quantity by configuration key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|q| q.key() == key)
    }

    /// Unit of measurement
    pub const fn unit(self) -> &'static str {
        match self {
            Quantity::Eco2 => "ppm",
            Quantity::Ozone | Quantity::Tvoc => "ppb",
            Quantity::Pm2_5 | Quantity::Pm10 => "µg/m³",
            Quantity::Temperature => "°C",
            Quantity::Humidity => "%",
        }
    }

    /// Decimal places worth displaying
    pub const fn accuracy_decimals(self) -> u8 {
        match self {
            Quantity::Temperature | Quantity::Humidity => 2,
            _ => 0,
        }
    }

    /// Round a value to [`accuracy_decimals`](Self::accuracy_decimals), half away from zero
    pub fn round(self, value: f32) -> f32 {
        let mut scale = 1.0f32;
        for _ in 0..self.accuracy_decimals() {
            scale *= 10.0;
        }
        let scaled = value * scale;
        let rounded = (if scaled < 0.0 { scaled - 0.5 } else { scaled + 0.5 }) as i32;
        rounded as f32 / scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_table_order() {
        for (i, q) in Quantity::ALL.iter().enumerate() {
            assert_eq!(q.index(), i);
        }
    }

    #[test]
    fn test_key_lookup() {
        for q in Quantity::ALL {
            assert_eq!(Quantity::from_key(q.key()), Some(q));
        }
        assert_eq!(Quantity::from_key("co"), None);
    }

    #[test]
    fn test_round_to_accuracy() {
        assert_eq!(Quantity::Eco2.round(450.4), 450.0);
        assert_eq!(Quantity::Pm10.round(14.5), 15.0);
        assert!((Quantity::Temperature.round(21.4549) - 21.45).abs() < 1e-4);
        assert!((Quantity::Temperature.round(-3.456) + 3.46).abs() < 1e-4);
        assert!((Quantity::Humidity.round(48.2) - 48.2).abs() < 1e-4);
    }
}
