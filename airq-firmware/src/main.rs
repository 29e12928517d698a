//! airq - Air Quality Module Firmware
//!
//! Firmware binary for RP2040 boards with an M702 or N702B module on UART0
//! (GPIO0 TX, GPIO1 RX). The module variant and the enabled outputs come
//! from `sensor.toml`, embedded at build time.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use airq_core::config::parse_config;
use airq_core::SensorConfig;
use airq_hal::UartConfig;

use crate::uart::{SensorUart, RX_BUF_SIZE, TX_BUF_SIZE};

/// Embedded configuration (compiled into firmware)
/// Edit sensor.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../sensor.toml");

mod channels;
mod sinks;
mod tasks;
mod uart;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; TX_BUF_SIZE]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; RX_BUF_SIZE]> = StaticCell::new();

// Configuration is borrowed by the sensor task for its whole life
static SENSOR_CONFIG: StaticCell<SensorConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("airq firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = SENSOR_CONFIG.init(load_config());
    info!(
        "Configuration: {}, {} outputs, interval {} ms",
        config.variant,
        config.quantities.len(),
        config.update_interval_ms
    );

    let line = UartConfig::air_quality_module();
    let uart_config = match uart::rp_config(&line) {
        Some(cfg) => cfg,
        None => {
            warn!("Unsupported line settings {}, using 9600 8N1", line);
            let mut cfg = embassy_rp::uart::Config::default();
            cfg.baudrate = 9600;
            cfg
        }
    };

    let tx_buf = TX_BUF.init([0u8; TX_BUF_SIZE]);
    let rx_buf = RX_BUF.init([0u8; RX_BUF_SIZE]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", line.baudrate);

    spawner.spawn(unwrap!(tasks::sensor_task(SensorUart::new(tx, rx), config)));
    spawner.spawn(unwrap!(tasks::report_task()));

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded configuration
///
/// Falls back to the M702 defaults if sensor.toml does not parse. build.rs
/// rejects most broken files, so this only happens for keys the host check
/// accepts but the parser does not.
fn load_config() -> SensorConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!(
                "Failed to parse sensor.toml line {}: {}",
                e.line, e.kind
            );
            error!("Using default configuration");
            SensorConfig::default()
        }
    }
}
