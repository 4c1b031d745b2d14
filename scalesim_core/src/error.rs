use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TxError {
    #[error("serial write failed: {0}")]
    Write(String),
    #[error("serial link lost: {0}")]
    Disconnected(String),
    #[error("transmitter thread panicked")]
    Panicked,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

/// Map a sink-boundary error to a typed `TxError`.
///
/// Attempts to downcast known transport error types first, then falls back
/// to plain io inspection and finally to the error's message.
pub fn map_sink_error_dyn(e: &(dyn std::error::Error + 'static)) -> TxError {
    // Feature-gated: try to downcast to SerialError for precise mapping
    #[cfg(feature = "serial-errors")]
    {
        if let Some(se) = e.downcast_ref::<scalesim_serial::SerialError>() {
            return match se {
                scalesim_serial::SerialError::Io(io) if is_disconnect(io.kind()) => {
                    TxError::Disconnected(io.to_string())
                }
                other => TxError::Write(other.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>()
        && is_disconnect(io.kind())
    {
        return TxError::Disconnected(io.to_string());
    }
    TxError::Write(e.to_string())
}

fn is_disconnect(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::NotConnected
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(
        e: impl std::error::Error + Send + Sync + 'static,
    ) -> Box<dyn std::error::Error + Send + Sync> {
        Box::new(e)
    }

    #[test]
    fn broken_pipe_maps_to_disconnected() {
        let e = boxed(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"));
        assert!(matches!(map_sink_error_dyn(&*e), TxError::Disconnected(_)));
    }

    #[test]
    fn other_io_maps_to_write_fault() {
        let e = boxed(std::io::Error::other("short write"));
        assert!(matches!(map_sink_error_dyn(&*e), TxError::Write(_)));
    }

    #[cfg(feature = "serial-errors")]
    #[test]
    fn serial_io_disconnect_is_downcast() {
        let inner = std::io::Error::new(std::io::ErrorKind::NotConnected, "usb pulled");
        let e = boxed(scalesim_serial::SerialError::Io(inner));
        assert!(matches!(map_sink_error_dyn(&*e), TxError::Disconnected(_)));
    }

    #[cfg(feature = "serial-errors")]
    #[test]
    fn serial_non_io_is_a_write_fault() {
        let e = boxed(scalesim_serial::SerialError::NoPorts);
        assert!(matches!(map_sink_error_dyn(&*e), TxError::Write(_)));
    }
}
