//! Configuration type definitions

use airq_protocol::{Quantity, Variant};

/// Default time without a valid frame before the module is reported offline
pub const DEFAULT_STALE_TIMEOUT_MS: u32 = 60_000;

/// Default stale-guard allowance, in frames' worth of bytes
pub const DEFAULT_NOISE_FRAMES: usize = 4;

/// Set of enabled quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuantitySet(u8);

impl QuantitySet {
    /// No quantities
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every quantity
    pub const fn all() -> Self {
        Self((1 << Quantity::COUNT) - 1)
    }

    pub fn insert(&mut self, quantity: Quantity) {
        self.0 |= 1 << quantity.index();
    }

    pub fn remove(&mut self, quantity: Quantity) {
        self.0 &= !(1 << quantity.index());
    }

    pub fn contains(&self, quantity: Quantity) -> bool {
        self.0 & (1 << quantity.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Enabled quantities in frame order
    pub fn iter(&self) -> impl Iterator<Item = Quantity> + '_ {
        Quantity::ALL.iter().copied().filter(move |&q| self.contains(q))
    }
}

impl FromIterator<Quantity> for QuantitySet {
    fn from_iter<I: IntoIterator<Item = Quantity>>(iter: I) -> Self {
        let mut set = Self::empty();
        for q in iter {
            set.insert(q);
        }
        set
    }
}

/// Sensor driver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Module variant (selects the protocol table)
    pub variant: Variant,
    /// Tick interval in milliseconds
    pub update_interval_ms: u32,
    /// Time without a valid frame before reporting "No Data"
    pub stale_timeout_ms: u32,
    /// Bytes consumed without a frame before the buffer is reset
    pub max_noise_bytes: u16,
    /// Quantities that get a sink
    pub quantities: QuantitySet,
    /// Publish the data-valid indicator
    pub data_valid: bool,
    /// Publish the status text
    pub sensor_status: bool,
}

impl SensorConfig {
    /// Defaults for a variant: every output enabled
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            update_interval_ms: variant.default_update_interval_ms(),
            stale_timeout_ms: DEFAULT_STALE_TIMEOUT_MS,
            max_noise_bytes: (variant.protocol().frame_len * DEFAULT_NOISE_FRAMES) as u16,
            quantities: QuantitySet::all(),
            data_valid: true,
            sensor_status: true,
        }
    }

    /// Consecutive ticks without a valid frame before timing out
    ///
    /// Rounded up, and never less than one tick.
    pub fn timeout_ticks(&self) -> u32 {
        let interval = self.update_interval_ms.max(1);
        self.stale_timeout_ms.div_ceil(interval).max(1)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::new(Variant::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_defaults() {
        let m702 = SensorConfig::new(Variant::M702);
        assert_eq!(m702.update_interval_ms, 1_000);
        assert_eq!(m702.max_noise_bytes, 68);
        assert_eq!(m702.timeout_ticks(), 60);

        let n702b = SensorConfig::new(Variant::N702B);
        assert_eq!(n702b.update_interval_ms, 30_000);
        assert_eq!(n702b.max_noise_bytes, 76);
        assert_eq!(n702b.timeout_ticks(), 2);
    }

    #[test]
    fn test_timeout_ticks_rounds_up() {
        let mut config = SensorConfig::new(Variant::N702B);
        config.stale_timeout_ms = 45_000;
        assert_eq!(config.timeout_ticks(), 2);

        config.stale_timeout_ms = 0;
        assert_eq!(config.timeout_ticks(), 1);

        config.update_interval_ms = 0;
        config.stale_timeout_ms = 5;
        assert_eq!(config.timeout_ticks(), 5);
    }

    #[test]
    fn test_quantity_set() {
        let mut set: QuantitySet = [Quantity::Eco2, Quantity::Temperature].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(Quantity::Eco2));
        assert!(!set.contains(Quantity::Ozone));

        set.remove(Quantity::Eco2);
        assert_eq!(set.iter().next(), Some(Quantity::Temperature));

        assert_eq!(QuantitySet::all().len(), Quantity::COUNT);
        assert!(QuantitySet::empty().is_empty());
    }
}
