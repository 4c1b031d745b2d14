use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerialError {
    #[error("no serial ports detected")]
    NoPorts,
    #[error("enumerating serial ports: {0}")]
    Enumerate(#[source] serialport::Error),
    #[error("opening {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("asserting DTR/RTS on {port}: {source}")]
    ControlLines {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SerialError>;
