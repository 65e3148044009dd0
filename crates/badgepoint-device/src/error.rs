use badgepoint_hardware::HardwareError;
use thiserror::Error;

/// Errors that abort a controller step.
///
/// Connectivity and publish failures are deliberately absent: those are
/// handled in-band as link states and publish outcomes. Only a peripheral
/// failure ends up here, because a device that cannot read its reader or
/// drive its indicator has nothing useful left to do.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// A peripheral operation failed.
    #[error("Peripheral error: {0}")]
    Hardware(#[from] HardwareError),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
