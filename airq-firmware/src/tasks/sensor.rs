//! Sensor poll task
//!
//! Owns the UART and the driver, and runs one driver tick per update
//! interval. Everything the driver reports is logged here.

use airq_core::{AirQualityDriver, CycleOutcome, CycleReport, SensorConfig};
use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use crate::sinks;
use crate::uart::SensorUart;

/// Sensor task - polls the module at the configured interval
#[embassy_executor::task]
pub async fn sensor_task(mut uart: SensorUart, config: &'static SensorConfig) {
    let protocol = config.variant.protocol();
    info!(
        "Sensor task started: {} every {} ms, timeout after {} ticks",
        protocol.name,
        config.update_interval_ms,
        config.timeout_ticks()
    );

    let mut driver = AirQualityDriver::new(config.clone(), sinks::bindings(config));
    driver.setup();

    let mut ticker = Ticker::every(Duration::from_millis(config.update_interval_ms as u64));
    let start = Instant::now();

    loop {
        ticker.next().await;

        let now_ms = start.elapsed().as_millis() as u32;
        let report = driver.tick(&mut uart, now_ms);
        log_report(&report);
    }
}

fn log_report(report: &CycleReport) {
    if report.request_sent {
        trace!("Request sent");
    }

    match report.outcome {
        CycleOutcome::Published { sinks, .. } => {
            debug!(
                "Frame accepted ({} bytes), {} sinks updated",
                report.bytes_read, sinks
            );
        }
        CycleOutcome::Rejected(kind) => {
            warn!("Frame rejected: {}", kind);
        }
        CycleOutcome::Incomplete { buffered } => {
            trace!(
                "No complete frame yet ({} read, {} buffered)",
                report.bytes_read,
                buffered
            );
        }
        CycleOutcome::TimedOut(kind) => {
            warn!(
                "{} after {} ticks without a frame",
                kind, report.ticks_without_frame
            );
        }
    }
}
