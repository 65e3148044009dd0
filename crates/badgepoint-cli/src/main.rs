//! BadgePoint attendance endpoint runtime.
//!
//! Loads an installation's TOML configuration, connects the broker link, and
//! runs the device control loop over simulated peripherals driven from the
//! console. Real reader and GPIO drivers slot in behind the same hardware
//! traits without touching the loop.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use badgepoint_core::RfidTag;
use badgepoint_device::DeviceController;
use badgepoint_hardware::mock::{
    MockButton, MockButtonHandle, MockLed, MockRfid, MockRfidHandle, MockSystemMonitor,
};
use badgepoint_mqtt::MqttLink;

mod config;

use config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "badgepoint", version, about = "RFID attendance endpoint")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let contents = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("reading {}", cli.config.display()))?;
    let config = AppConfig::from_toml(&contents)?;

    let directory = config.directory()?;
    let controller_config = config.controller_config();
    let mqtt = config.mqtt_config();
    info!(broker = %format!("{}:{}", mqtt.host, mqtt.port), "broker configured");
    let (link, publisher) = MqttLink::new(&mqtt);

    let (reader, reader_handle) = MockRfid::new();
    let (checkin_button, checkin_handle) = MockButton::new("check-in");
    let (checkout_button, checkout_handle) = MockButton::new("check-out");
    let (led, _led_handle) = MockLed::new();
    let (monitor, _monitor_handle) = MockSystemMonitor::new();

    tokio::spawn(console_input(
        reader_handle,
        checkin_handle,
        checkout_handle,
        controller_config.tick_delay_ms,
    ));

    let mut controller = DeviceController::new(
        config.identity(),
        controller_config,
        directory,
        reader,
        checkin_button,
        checkout_button,
        led,
        monitor,
        link,
        publisher,
    );

    controller.run().await?;
    info!("reboot requested, exiting for supervisor restart");
    Ok(())
}

/// Feed the simulated peripherals from stdin.
///
/// A line holding a tag UID presents that card to the reader; `in` and `out`
/// press the corresponding trigger button.
async fn console_input(
    reader: MockRfidHandle,
    checkin: MockButtonHandle,
    checkout: MockButtonHandle,
    tick_delay_ms: u64,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("console ready: type a tag UID, 'in', or 'out'");

    while let Ok(Some(line)) = lines.next_line().await {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input {
            "in" => press(&checkin, tick_delay_ms).await,
            "out" => press(&checkout, tick_delay_ms).await,
            _ => match input.parse::<RfidTag>() {
                Ok(tag) => {
                    if reader.present_card(tag).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("ignoring console input: {e}"),
            },
        }
    }
}

/// Hold a button level long enough for the control loop to sample the edge.
async fn press(button: &MockButtonHandle, tick_delay_ms: u64) {
    button.press();
    tokio::time::sleep(press_hold(tick_delay_ms)).await;
    button.release();
}

/// How long a console press keeps the button level asserted.
///
/// The control loop samples the buttons once per tick, so the hold must span
/// at least one full tick delay with margin; two ticks guarantee a sample
/// lands inside the hold wherever the press falls in the cycle.
fn press_hold(tick_delay_ms: u64) -> Duration {
    Duration::from_millis(tick_delay_ms.saturating_mul(2).max(200))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_hold_spans_two_tick_delays() {
        assert_eq!(press_hold(100), Duration::from_millis(200));
        assert_eq!(press_hold(500), Duration::from_millis(1000));
    }

    #[test]
    fn test_press_hold_has_a_floor_for_tiny_ticks() {
        assert_eq!(press_hold(0), Duration::from_millis(200));
        assert_eq!(press_hold(50), Duration::from_millis(200));
    }
}
