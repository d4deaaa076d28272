//! Common API types

use crate::core::PositionUpdate;
use crate::hardware::PositioningError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Callback invoked with every accepted position update
pub type ChangeCallback = Box<dyn FnMut(&PositionUpdate)>;

/// Callback invoked with every positioning error, unchanged
pub type ErrorCallback = Box<dyn FnMut(&PositioningError)>;

/// Output format options for rendered view frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable single line per frame
    #[default]
    Text,
    /// One JSON object per frame
    Json,
    /// Comma-separated values
    Csv,
}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Unrecognized output format name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown output format '{0}' (expected text, json or csv)")]
pub struct UnknownFormat(pub String);

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        };
        f.write_str(name)
    }
}
