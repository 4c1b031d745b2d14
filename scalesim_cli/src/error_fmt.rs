//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use scalesim_core::TxError;
    use scalesim_serial::error::SerialError;

    // Typed matches first
    if let Some(se) = err.downcast_ref::<SerialError>() {
        return match se {
            SerialError::NoPorts => {
                "What happened: No serial ports were detected on this machine.\nLikely causes: No USB-serial adapter plugged in, or no virtual port pair running.\nHow to fix: Attach an adapter, or create a loopback pair (e.g. `socat pty,raw,echo=0 pty,raw,echo=0`) and pass one end with --port.".to_string()
            }
            SerialError::Enumerate(e) => format!(
                "What happened: Port enumeration failed ({e}).\nLikely causes: Missing udev/driver support, or the process lacks permission to scan devices.\nHow to fix: Pass the device explicitly with --port to skip enumeration."
            ),
            SerialError::Open { port, source } => format!(
                "What happened: Could not open {port} ({source}).\nLikely causes: Wrong device name, the port is held by another program, or missing permissions.\nHow to fix: Check the name with `scalesim list-ports`, close whatever holds the port, and make sure your user may access it (dialout group on Linux)."
            ),
            SerialError::ControlLines { port, .. } => format!(
                "What happened: Could not raise DTR/RTS on {port}.\nLikely causes: The driver does not implement control lines, or the adapter dropped off mid-open.\nHow to fix: Use a different adapter, or run the gross-net profile which leaves the lines alone."
            ),
            SerialError::Io(e) => format!(
                "What happened: Serial I/O failed ({e}).\nLikely causes: Device unplugged or a driver fault.\nHow to fix: Reconnect the device and start a new run."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<TxError>() {
        return match te {
            TxError::Disconnected(msg) => format!(
                "What happened: The serial link dropped mid-stream ({msg}).\nLikely causes: Cable unplugged, the receiver closed the port, or a virtual pair was torn down.\nHow to fix: Reconnect the receiver, then start a new run."
            ),
            TxError::Write(msg) => format!(
                "What happened: A serial write failed ({msg}).\nLikely causes: Driver fault, or an output buffer that never drained.\nHow to fix: Check the receiving end, then start a new run."
            ),
            TxError::Panicked => {
                "What happened: The transmit thread panicked.\nLikely causes: A bug in the emulator.\nHow to fix: Re-run with --log-level=debug and report the log output.".to_string()
            }
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("must be one of") {
        return format!(
            "What happened: {msg}.\nLikely causes: A typo, or a value this emulator does not support.\nHow to fix: Pick one of the listed values and rerun."
        );
    }

    if lower.contains("selection aborted") {
        return "What happened: The interactive picker was cancelled.\nLikely causes: Esc or Ctrl+C at the prompt, or no usable terminal.\nHow to fix: Rerun and choose an entry, or pass --port and --baud explicitly.".to_string();
    }

    if lower.contains("parsing config") {
        return format!(
            "What happened: The config file did not parse ({msg}).\nLikely causes: Broken TOML syntax or a misspelled key.\nHow to fix: Fix the file, or delete it to fall back to defaults."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable name for the fault class (used as the JSON `reason`).
pub fn fault_name(err: &eyre::Report) -> &'static str {
    use scalesim_core::TxError;
    use scalesim_serial::error::SerialError;

    if let Some(se) = err.downcast_ref::<SerialError>() {
        return match se {
            SerialError::NoPorts => "NoPorts",
            SerialError::Enumerate(_) => "Enumerate",
            SerialError::Open { .. } => "OpenPort",
            SerialError::ControlLines { .. } => "ControlLines",
            SerialError::Io(_) => "Io",
        };
    }
    if let Some(te) = err.downcast_ref::<TxError>() {
        return match te {
            TxError::Write(_) => "Write",
            TxError::Disconnected(_) => "Disconnected",
            TxError::Panicked => "Panicked",
        };
    }
    "Error"
}

/// Map fault classes to stable exit codes: serial faults 2, transmit faults 3,
/// rejected values and cancelled pickers 2, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use scalesim_core::TxError;
    use scalesim_serial::error::SerialError;

    if err.downcast_ref::<SerialError>().is_some() {
        return 2;
    }
    if err.downcast_ref::<TxError>().is_some() {
        return 3;
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.contains("must be one of") || lower.contains("selection aborted") {
        return 2;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use scalesim_serial::error::SerialError;
    use serde_json::json;

    let msg = humanize(err);
    let reason = fault_name(err);

    let detail_obj = match err.downcast_ref::<SerialError>() {
        Some(SerialError::Open { port, .. } | SerialError::ControlLines { port, .. }) => {
            Some(json!({ "port": port }))
        }
        _ => None,
    };

    let obj = if let Some(d) = detail_obj {
        json!({ "reason": reason, "details": d, "message": msg })
    } else {
        json!({ "reason": reason, "message": msg })
    };
    obj.to_string()
}
