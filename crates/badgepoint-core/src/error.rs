use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Tag bytes or text did not form a valid RFID UID.
    #[error("Invalid tag format: {0}")]
    InvalidTagFormat(String),

    /// Unrecognized attendance action name on the wire.
    #[error("Invalid attendance action: {0}")]
    InvalidAction(String),

    /// Configuration value rejected during load.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
