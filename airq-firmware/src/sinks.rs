//! Sink implementations backed by the static signals

use airq_core::{BinarySink, SensorConfig, SensorSink, SinkBindings, TextSink};
use airq_protocol::Quantity;
use defmt::*;
use heapless::String;

use crate::channels::{DATA_VALID, READINGS, STATUS};

/// Forwards one quantity to its slot in [`READINGS`]
pub struct ReadingSink(Quantity);

impl SensorSink for ReadingSink {
    fn publish(&self, value: f32) {
        trace!("{} = {} {}", self.0.key(), self.0.round(value), self.0.unit());
        READINGS[self.0.index()].signal(value);
    }
}

/// Forwards the data-valid indicator
pub struct ValiditySink;

impl BinarySink for ValiditySink {
    fn publish(&self, state: bool) {
        DATA_VALID.signal(state);
    }
}

/// Forwards the status text
pub struct StatusSink;

impl TextSink for StatusSink {
    fn publish(&self, text: &str) {
        let mut status = String::new();
        if status.push_str(text).is_err() {
            warn!("Status text too long, truncated: {}", text);
            for c in text.chars() {
                if status.push(c).is_err() {
                    break;
                }
            }
        }
        STATUS.signal(status);
    }
}

static READING_SINKS: [ReadingSink; Quantity::COUNT] = [
    ReadingSink(Quantity::Eco2),
    ReadingSink(Quantity::Ozone),
    ReadingSink(Quantity::Tvoc),
    ReadingSink(Quantity::Pm2_5),
    ReadingSink(Quantity::Pm10),
    ReadingSink(Quantity::Temperature),
    ReadingSink(Quantity::Humidity),
];

static VALIDITY_SINK: ValiditySink = ValiditySink;
static STATUS_SINK: StatusSink = StatusSink;

/// Bind the sinks enabled in the configuration
pub fn bindings(config: &SensorConfig) -> SinkBindings<'static> {
    let mut bindings = config
        .quantities
        .iter()
        .fold(SinkBindings::new(), |b, q| {
            b.with_sensor(q, &READING_SINKS[q.index()])
        });

    if config.data_valid {
        bindings = bindings.with_validity(&VALIDITY_SINK);
    }
    if config.sensor_status {
        bindings = bindings.with_status(&STATUS_SINK);
    }

    bindings
}
