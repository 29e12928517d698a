//! Inter-task communication channels
//!
//! The sensor task publishes through these signals; any other task can
//! pick up the latest value without touching the driver.

use airq_protocol::Quantity;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::String;

/// Capacity of a status text
pub const STATUS_LEN: usize = 24;

/// Latest value per quantity, indexed by [`Quantity::index`]
pub static READINGS: [Signal<CriticalSectionRawMutex, f32>; Quantity::COUNT] =
    [const { Signal::new() }; Quantity::COUNT];

/// Whether the last cycle produced a valid frame
pub static DATA_VALID: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Human-readable module status ("Online", "No Data", ...)
pub static STATUS: Signal<CriticalSectionRawMutex, String<STATUS_LEN>> = Signal::new();
