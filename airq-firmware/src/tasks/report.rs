//! Status report task
//!
//! Logs module status changes together with the latest readings.

use airq_protocol::Quantity;
use defmt::*;
use heapless::String;

use crate::channels::{DATA_VALID, READINGS, STATUS, STATUS_LEN};

#[embassy_executor::task]
pub async fn report_task() {
    info!("Report task started");

    let mut last: String<STATUS_LEN> = String::new();

    loop {
        let status = STATUS.wait().await;
        let valid = DATA_VALID.try_take();

        if status != last {
            info!("Sensor status: {} (valid: {})", status.as_str(), valid);
            last = status;
        }

        for quantity in Quantity::ALL {
            if let Some(value) = READINGS[quantity.index()].try_take() {
                debug!(
                    "{}: {} {}",
                    quantity.key(),
                    quantity.round(value),
                    quantity.unit()
                );
            }
        }
    }
}
