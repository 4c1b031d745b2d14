pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Line-oriented output seam for the transmitter.
///
/// Implementations append the wire line terminator (CRLF) themselves; the
/// caller passes the payload without it.
pub trait LineSink {
    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
