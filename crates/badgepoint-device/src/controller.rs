//! The device control loop.
//!
//! [`DeviceController`] ties every capability together: it polls the reader
//! and buttons, debounces and classifies scans, publishes events, services
//! the broker link, and drives the indicator LED. One [`step`] is one loop
//! iteration; [`run`] repeats steps on the real clock until a reboot command
//! arrives.
//!
//! [`step`]: DeviceController::step
//! [`run`]: DeviceController::run

use tokio::time::{Duration, Instant, sleep};
use tracing::{info, warn};

use badgepoint_core::constants::{HEARTBEAT_INTERVAL_MS, SCAN_COOLDOWN_MS, TICK_DELAY_MS};
use badgepoint_core::{
    ActionClassifier, AttendanceAction, AttendanceEvent, EmployeeDirectory, HeartbeatEvent,
    RfidTag, ScanDebouncer, Ticks,
};
use badgepoint_hardware::{RfidReader, StatusLed, SystemMonitor, TriggerButton};
use badgepoint_mqtt::{Link, LinkEvent, Publisher, PublishOutcome};

use crate::error::Result;
use crate::indicator::{IndicatorState, StatusIndicator};

/// Who and where this endpoint is, stamped into every published event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Endpoint identifier, e.g. `ESP32_PONTO_01`.
    pub device_id: String,

    /// Installation location label, e.g. `Entrada Principal`.
    pub location: String,
}

/// Controller timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Cooldown window for repeated reads of the same tag, in milliseconds.
    pub scan_cooldown_ms: u64,

    /// Interval between heartbeat publications, in milliseconds.
    pub heartbeat_interval_ms: u64,

    /// Delay between loop iterations, in milliseconds.
    pub tick_delay_ms: u64,

    /// LED hold time for success feedback, in milliseconds.
    pub success_pulse_ms: u64,

    /// LED hold time for failure feedback, in milliseconds.
    pub failure_pulse_ms: u64,

    /// LED hold time for the startup indication, in milliseconds.
    pub startup_pulse_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            scan_cooldown_ms: SCAN_COOLDOWN_MS,
            heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS,
            tick_delay_ms: TICK_DELAY_MS,
            success_pulse_ms: 2000,
            failure_pulse_ms: 1000,
            startup_pulse_ms: 2000,
        }
    }
}

/// What the loop should do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Keep looping.
    Continue,

    /// A reboot command arrived; the caller owns the actual restart.
    Reboot,
}

/// The endpoint's control loop state.
///
/// Generic over every peripheral and the broker seams so the whole loop can
/// run against mocks and fakes in tests.
pub struct DeviceController<R, B, L, M, C, P>
where
    R: RfidReader,
    B: TriggerButton,
    L: StatusLed,
    M: SystemMonitor,
    C: Link,
    P: Publisher,
{
    identity: DeviceIdentity,
    config: ControllerConfig,
    directory: EmployeeDirectory,
    debouncer: ScanDebouncer,
    classifier: ActionClassifier,
    reader: R,
    checkin_button: B,
    checkout_button: B,
    indicator: StatusIndicator<L>,
    monitor: M,
    link: C,
    publisher: P,
    /// Most recently accepted tag, reused by the manual trigger buttons.
    last_tag: Option<RfidTag>,
    checkin_was_pressed: bool,
    checkout_was_pressed: bool,
    next_heartbeat_at: Ticks,
}

impl<R, B, L, M, C, P> DeviceController<R, B, L, M, C, P>
where
    R: RfidReader,
    B: TriggerButton,
    L: StatusLed,
    M: SystemMonitor,
    C: Link,
    P: Publisher,
{
    /// Assemble a controller from its capabilities.
    ///
    /// The first heartbeat is scheduled one full interval after boot, not at
    /// boot, matching the deployed firmware.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identity: DeviceIdentity,
        config: ControllerConfig,
        directory: EmployeeDirectory,
        reader: R,
        checkin_button: B,
        checkout_button: B,
        led: L,
        monitor: M,
        link: C,
        publisher: P,
    ) -> Self {
        Self {
            identity,
            config,
            directory,
            debouncer: ScanDebouncer::with_cooldown(config.scan_cooldown_ms),
            classifier: ActionClassifier::new(),
            reader,
            checkin_button,
            checkout_button,
            indicator: StatusIndicator::new(led),
            monitor,
            link,
            publisher,
            last_tag: None,
            checkin_was_pressed: false,
            checkout_was_pressed: false,
            next_heartbeat_at: Ticks::from_millis(config.heartbeat_interval_ms),
        }
    }

    /// Currently displayed indicator state.
    #[must_use]
    pub fn indicator_state(&self) -> IndicatorState {
        self.indicator.current()
    }

    /// Most recently accepted tag, if any.
    #[must_use]
    pub fn last_tag(&self) -> Option<&RfidTag> {
        self.last_tag.as_ref()
    }

    /// Announce startup and show the initialization indication.
    pub async fn startup(&mut self, now: Ticks) -> Result<()> {
        info!(
            device_id = %self.identity.device_id,
            location = %self.identity.location,
            employees = self.directory.len(),
            version = badgepoint_core::VERSION,
            "attendance endpoint starting"
        );
        self.indicator
            .pulse(IndicatorState::Init, now, self.config.startup_pulse_ms)
            .await?;
        Ok(())
    }

    /// Run one loop iteration at device time `now`.
    ///
    /// Order within a step: link events first (a reboot command short-circuits
    /// the rest of the step), then indicator housekeeping, then the reader,
    /// then the buttons, then the heartbeat.
    ///
    /// # Errors
    ///
    /// Returns an error only for peripheral faults. Connectivity loss and
    /// publish failures are handled in-band and never abort the loop.
    pub async fn step(&mut self, now: Ticks) -> Result<StepOutcome> {
        for event in self.link.poll(now).await {
            match event {
                LinkEvent::Online => {
                    info!("broker link up");
                    self.indicator
                        .pulse(IndicatorState::Success, now, self.config.success_pulse_ms)
                        .await?;
                }
                LinkEvent::Lost(state) => {
                    warn!(%state, "broker link lost");
                    self.indicator
                        .pulse(IndicatorState::Failure, now, self.config.failure_pulse_ms)
                        .await?;
                }
                LinkEvent::Command(command) => {
                    info!(?command, "remote command accepted");
                    return Ok(StepOutcome::Reboot);
                }
            }
        }

        self.indicator.refresh(now).await?;

        if let Some(tag) = self.reader.poll_card().await? {
            self.handle_scan(tag, now).await?;
        }

        self.poll_buttons(now).await?;

        if now >= self.next_heartbeat_at {
            self.publish_heartbeat(now).await?;
            self.next_heartbeat_at =
                Ticks::from_millis(now.as_millis() + self.config.heartbeat_interval_ms);
        }

        Ok(StepOutcome::Continue)
    }

    /// Run the loop on the real clock until a reboot command arrives.
    ///
    /// Device time is measured from entry to this function.
    pub async fn run(&mut self) -> Result<()> {
        let boot = Instant::now();
        self.startup(Ticks::ZERO).await?;
        loop {
            let now = Ticks::from_millis(boot.elapsed().as_millis() as u64);
            if self.step(now).await? == StepOutcome::Reboot {
                info!("controller stopping for reboot");
                return Ok(());
            }
            sleep(Duration::from_millis(self.config.tick_delay_ms)).await;
        }
    }

    /// Process one tag read from the reader.
    async fn handle_scan(&mut self, tag: RfidTag, now: Ticks) -> Result<()> {
        if !self.debouncer.accept(&tag, now) {
            return Ok(());
        }

        // The manual buttons reuse the last accepted tag whether or not it
        // resolved, matching the deployed firmware.
        self.last_tag = Some(tag.clone());

        match self.directory.resolve(&tag) {
            Some(name) => {
                let action = self.classifier.classify(now);
                info!(tag = %tag, employee = name, %action, "tag accepted");
                self.publish_attendance(tag, action, now).await?;
            }
            None => {
                warn!(tag = %tag, "unauthorized tag");
                self.indicator
                    .pulse(IndicatorState::Failure, now, self.config.failure_pulse_ms)
                    .await?;
            }
        }
        Ok(())
    }

    /// Edge-detect both trigger buttons and fire manual registrations.
    async fn poll_buttons(&mut self, now: Ticks) -> Result<()> {
        let checkin = self.checkin_button.is_pressed().await?;
        if checkin && !self.checkin_was_pressed {
            self.manual_trigger(AttendanceAction::CheckIn, now).await?;
        }
        self.checkin_was_pressed = checkin;

        let checkout = self.checkout_button.is_pressed().await?;
        if checkout && !self.checkout_was_pressed {
            self.manual_trigger(AttendanceAction::CheckOut, now).await?;
        }
        self.checkout_was_pressed = checkout;

        Ok(())
    }

    /// Re-register the last accepted tag with a forced action.
    ///
    /// The tag is not re-validated against the directory here. This is an
    /// operator override inherited from the deployed firmware; the backend
    /// remains the authority on whether the event counts.
    async fn manual_trigger(&mut self, action: AttendanceAction, now: Ticks) -> Result<()> {
        let Some(tag) = self.last_tag.clone() else {
            warn!(%action, "manual trigger ignored, no tag scanned yet");
            return Ok(());
        };
        info!(tag = %tag, %action, "manual trigger");
        self.publish_attendance(tag, action, now).await
    }

    async fn publish_attendance(
        &mut self,
        tag: RfidTag,
        action: AttendanceAction,
        now: Ticks,
    ) -> Result<()> {
        let event = AttendanceEvent {
            tag,
            action,
            timestamp: now,
            device_id: self.identity.device_id.clone(),
            location: self.identity.location.clone(),
        };
        let outcome = self.publisher.publish_attendance(&event).await;
        self.apply_outcome(outcome, now).await
    }

    async fn publish_heartbeat(&mut self, now: Ticks) -> Result<()> {
        let free_memory = self.monitor.free_memory().await?;
        let event = HeartbeatEvent {
            device_id: self.identity.device_id.clone(),
            timestamp: now,
            free_memory,
            uptime_ms: now.as_millis(),
        };
        let outcome = self.publisher.publish_heartbeat(&event).await;
        self.apply_outcome(outcome, now).await
    }

    /// Reflect a publish outcome on the indicator.
    ///
    /// A skipped-offline publish leaves the LED alone: the link loss already
    /// produced its own failure indication, and repeating it every heartbeat
    /// would read as a new fault.
    async fn apply_outcome(&mut self, outcome: PublishOutcome, now: Ticks) -> Result<()> {
        match outcome {
            PublishOutcome::Delivered => {
                self.indicator
                    .pulse(IndicatorState::Success, now, self.config.success_pulse_ms)
                    .await
            }
            PublishOutcome::Failed => {
                self.indicator
                    .pulse(IndicatorState::Failure, now, self.config.failure_pulse_ms)
                    .await
            }
            PublishOutcome::SkippedOffline => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_firmware_timing() {
        let config = ControllerConfig::default();
        assert_eq!(config.scan_cooldown_ms, 3000);
        assert_eq!(config.heartbeat_interval_ms, 30_000);
        assert_eq!(config.tick_delay_ms, 100);
    }

    #[test]
    fn test_step_outcome_equality() {
        assert_eq!(StepOutcome::Continue, StepOutcome::Continue);
        assert_ne!(StepOutcome::Continue, StepOutcome::Reboot);
    }
}
