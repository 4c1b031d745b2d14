//! Wire profiles for the emulated indicator models.
//!
//! Each profile fixes the cadence, line format, overload token, and planner
//! tuning that together mimic one vendor's RS-232 output. Rendering uses '.'
//! as the radix; the transmitter substitutes the wire comma on the complete
//! line just before it is sent.

use std::time::Duration;

use crate::planner::PlannerCfg;
use crate::weight::Weight;

/// Tare field of the gross/net line. The emulated platform reports a
/// constant tare.
pub const GROSS_NET_TARE: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleProfile {
    /// `PB: <w>kg PL: <w>kg T:<tare>kg` every 30 ms, preceded by a six-zero
    /// handshake frame when the stream opens.
    GrossNet,
    /// `<w>EL` once per second; the receiving display listens only with
    /// DTR/RTS asserted.
    SingleField,
}

impl ScaleProfile {
    /// Fixed transmission period.
    pub const fn cadence(self) -> Duration {
        match self {
            Self::GrossNet => Duration::from_millis(30),
            Self::SingleField => Duration::from_millis(1000),
        }
    }

    pub const fn damping_pct(self) -> u32 {
        match self {
            Self::GrossNet => 100,
            Self::SingleField => 80,
        }
    }

    /// Token transmitted in place of a reading while overload is latched.
    pub const fn overload_token(self) -> &'static str {
        match self {
            Self::GrossNet => "SOBRE",
            Self::SingleField => "E61EE",
        }
    }

    /// Frame sent once when the stream opens, if the model has one.
    pub const fn handshake(self) -> Option<&'static str> {
        match self {
            Self::GrossNet => Some("000000"),
            Self::SingleField => None,
        }
    }

    /// Whether the remote end expects DTR/RTS raised before it listens.
    pub const fn asserts_control_lines(self) -> bool {
        matches!(self, Self::SingleField)
    }

    pub fn planner_cfg(self) -> PlannerCfg {
        PlannerCfg {
            damping_pct: self.damping_pct(),
            ..PlannerCfg::default()
        }
    }

    /// Render one reading as this profile's line, radix still '.'.
    pub fn format_reading(self, w: Weight) -> String {
        let padded = padded_kg(w);
        match self {
            Self::GrossNet => {
                format!("PB: {padded}kg PL: {padded}kg T:{GROSS_NET_TARE}kg")
            }
            Self::SingleField => format!("{padded}EL"),
        }
    }
}

/// Zero-padded rendering: at least four whole digits, one fractional digit,
/// sign leading. Wider values grow past the padding rather than truncate.
pub fn padded_kg(w: Weight) -> String {
    let t = i64::from(w.tenths());
    let sign = if t < 0 { "-" } else { "" };
    let mag = t.unsigned_abs();
    format!("{sign}{:04}.{}", mag / 10, mag % 10)
}

/// Substitute the wire radix: the indicators print decimal commas.
pub fn radix_comma(line: &str) -> String {
    line.replace('.', ",")
}
