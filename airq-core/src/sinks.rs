//! Output sink traits and bindings
//!
//! Sinks are owned by whoever integrates the driver (firmware statics, test
//! fixtures). The driver only borrows them, and every quantity's sink is
//! optional: an unbound quantity is skipped without error.
//!
//! All methods take `&self` so that sinks backed by interrupt-safe cells
//! (e.g. embassy `Signal`) can be shared with other tasks.

use airq_protocol::Quantity;

/// Receives numeric readings for one quantity
pub trait SensorSink {
    /// Accept a new value
    fn publish(&self, value: f32);
}

/// Receives a boolean state (data-valid indicator)
pub trait BinarySink {
    fn publish(&self, state: bool);
}

/// Receives free-text status
pub trait TextSink {
    fn publish(&self, text: &str);
}

/// Quantity → optional sink table, filled once at construction
#[derive(Clone, Copy)]
pub struct SinkBindings<'a> {
    sensors: [Option<&'a dyn SensorSink>; Quantity::COUNT],
    validity: Option<&'a dyn BinarySink>,
    status: Option<&'a dyn TextSink>,
}

impl Default for SinkBindings<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SinkBindings<'a> {
    /// Bindings with nothing attached
    pub fn new() -> Self {
        Self {
            sensors: [None; Quantity::COUNT],
            validity: None,
            status: None,
        }
    }

    /// Attach a sink for `quantity`, replacing any previous one
    pub fn with_sensor(mut self, quantity: Quantity, sink: &'a dyn SensorSink) -> Self {
        self.sensors[quantity.index()] = Some(sink);
        self
    }

    /// Attach the data-valid sink
    pub fn with_validity(mut self, sink: &'a dyn BinarySink) -> Self {
        self.validity = Some(sink);
        self
    }

    /// Attach the status text sink
    pub fn with_status(mut self, sink: &'a dyn TextSink) -> Self {
        self.status = Some(sink);
        self
    }

    pub fn sensor(&self, quantity: Quantity) -> Option<&'a dyn SensorSink> {
        self.sensors[quantity.index()]
    }

    pub fn validity(&self) -> Option<&'a dyn BinarySink> {
        self.validity
    }

    pub fn status(&self) -> Option<&'a dyn TextSink> {
        self.status
    }

    /// Quantities that have a sink attached
    pub fn bound_quantities(&self) -> impl Iterator<Item = Quantity> + '_ {
        Quantity::ALL
            .iter()
            .copied()
            .filter(move |q| self.sensors[q.index()].is_some())
    }
}

impl core::fmt::Debug for SinkBindings<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SinkBindings")
            .field("sensors", &self.bound_quantities().count())
            .field("validity", &self.validity.is_some())
            .field("status", &self.status.is_some())
            .finish()
    }
}
