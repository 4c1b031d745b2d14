pub mod error;

use std::io::Write;
use std::time::Duration;

use scalesim_traits::LineSink;
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use tracing::debug;

pub use error::{Result, SerialError};

/// Per-line write timeout. Lines are short; a stall this long means the
/// device side stopped draining.
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// A detected serial device, pre-formatted for menus and listings.
#[derive(Debug, Clone)]
pub struct PortInfo {
    pub name: String,
    pub detail: String,
}

/// Enumerate serial ports, sorted by device name.
pub fn detected_ports() -> Result<Vec<PortInfo>> {
    let mut ports = serialport::available_ports().map_err(SerialError::Enumerate)?;
    ports.sort_by(|a, b| a.port_name.cmp(&b.port_name));
    Ok(ports
        .into_iter()
        .map(|p| {
            let detail = match p.port_type {
                SerialPortType::UsbPort(info) => format!(
                    "usb vid={:04x} pid={:04x} {}",
                    info.vid,
                    info.pid,
                    info.product.as_deref().unwrap_or("")
                ),
                SerialPortType::PciPort => "pci".to_string(),
                SerialPortType::BluetoothPort => "bluetooth".to_string(),
                SerialPortType::Unknown => String::new(),
            };
            PortInfo {
                name: p.port_name,
                detail,
            }
        })
        .collect())
}

/// Serial line sink: payload bytes, then CRLF, flushed per line.
///
/// Generic over the writer so framing is testable against in-memory buffers.
pub struct SerialSink<W: Write> {
    inner: W,
}

impl SerialSink<Box<dyn SerialPort>> {
    /// Open `port` at `baud` with the scale wire framing: 7 data bits, even
    /// parity, 2 stop bits, no flow control.
    ///
    /// When `assert_control_lines` is set, DTR and RTS are raised after the
    /// open; some remote displays gate their receive path on those lines.
    pub fn open(port: &str, baud: u32, assert_control_lines: bool) -> Result<Self> {
        let mut handle = serialport::new(port, baud)
            .data_bits(DataBits::Seven)
            .parity(Parity::Even)
            .stop_bits(StopBits::Two)
            .flow_control(FlowControl::None)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|e| SerialError::Open {
                port: port.to_string(),
                source: e,
            })?;
        if assert_control_lines {
            handle
                .write_data_terminal_ready(true)
                .and_then(|()| handle.write_request_to_send(true))
                .map_err(|e| SerialError::ControlLines {
                    port: port.to_string(),
                    source: e,
                })?;
        }
        debug!(port, baud, assert_control_lines, "serial port opened");
        Ok(Self { inner: handle })
    }
}

impl<W: Write> SerialSink<W> {
    /// Wrap an arbitrary writer (tests, captures).
    pub fn from_writer(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_frame(&mut self, line: &str) -> std::io::Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\r\n")?;
        self.inner.flush()
    }
}

impl<W: Write> LineSink for SerialSink<W> {
    fn write_line(
        &mut self,
        line: &str,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Boxed as SerialError so consumers can downcast to the typed form.
        self.write_frame(line)
            .map_err(|e| Box::new(SerialError::Io(e)) as _)
    }
}
