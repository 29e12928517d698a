//! Poll scheduling
//!
//! The state machine describing one poll cycle and the driver that runs it
//! on every host tick.

pub mod driver;
pub mod machine;

pub use driver::{AirQualityDriver, CycleOutcome, CycleReport};
pub use machine::{PollEvent, PollState};
