//! Status indication.

use crate::error::Result;
use badgepoint_core::Ticks;
use badgepoint_hardware::{LedColor, StatusLed};

/// Logical indicator states, mapped onto the tri-color LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    /// Nothing to report.
    Off,

    /// Scan accepted / event delivered / link up (green).
    Success,

    /// Unauthorized tag / delivery failed / link lost (red).
    Failure,

    /// Device initializing (blue).
    Init,
}

impl IndicatorState {
    /// LED color for this state.
    #[must_use]
    pub fn color(self) -> LedColor {
        match self {
            IndicatorState::Off => LedColor::Off,
            IndicatorState::Success => LedColor::Green,
            IndicatorState::Failure => LedColor::Red,
            IndicatorState::Init => LedColor::Blue,
        }
    }
}

/// Drives the indicator LED with pulse semantics.
///
/// The newest state always fully replaces the previous one; colors never
/// blend. A pulse is a state with an expiry: [`refresh`](Self::refresh)
/// returns the LED to off once the hold time has elapsed. The original
/// firmware achieved the same visual with blocking delays; the pulse clock
/// keeps the control loop running instead.
#[derive(Debug)]
pub struct StatusIndicator<L: StatusLed> {
    led: L,
    current: IndicatorState,
    lit_until: Option<Ticks>,
}

impl<L: StatusLed> StatusIndicator<L> {
    /// Create the indicator over an LED, initially off.
    pub fn new(led: L) -> Self {
        Self {
            led,
            current: IndicatorState::Off,
            lit_until: None,
        }
    }

    /// Currently displayed state.
    #[must_use]
    pub fn current(&self) -> IndicatorState {
        self.current
    }

    /// Display a state until the next change.
    pub async fn set(&mut self, state: IndicatorState) -> Result<()> {
        self.lit_until = None;
        self.apply(state).await
    }

    /// Display a state for `hold_ms`, then return to off on a later
    /// [`refresh`](Self::refresh).
    pub async fn pulse(&mut self, state: IndicatorState, now: Ticks, hold_ms: u64) -> Result<()> {
        self.lit_until = Some(Ticks::from_millis(now.as_millis() + hold_ms));
        self.apply(state).await
    }

    /// Clear an expired pulse. Call once per control-loop tick.
    pub async fn refresh(&mut self, now: Ticks) -> Result<()> {
        if let Some(until) = self.lit_until
            && now >= until
        {
            self.lit_until = None;
            self.apply(IndicatorState::Off).await?;
        }
        Ok(())
    }

    async fn apply(&mut self, state: IndicatorState) -> Result<()> {
        self.current = state;
        self.led.set_color(state.color()).await?;
        Ok(())
    }
}
