//! View frame output formatting
//!
//! Frames rendered by the synchronizer can be written as human-readable
//! text, one JSON object per line, or CSV rows for logging and plotting.

use crate::api::types::OutputFormat;
use crate::processing::ViewFrame;

/// Formats view frames in the configured [`OutputFormat`]
#[derive(Debug, Clone)]
pub struct FrameFormatter {
    /// Output format
    pub format: OutputFormat,
    /// Decimal places for coordinates and angles
    pub precision: usize,
}

impl Default for FrameFormatter {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            precision: 3,
        }
    }
}

impl FrameFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Header line to print before the first frame, if the format has one
    pub fn header(&self) -> Option<String> {
        match self.format {
            OutputFormat::Csv => Some(CsvFormatter::new().header()),
            OutputFormat::Text | OutputFormat::Json => None,
        }
    }

    /// Format a single frame as one line
    pub fn format(&self, frame: &ViewFrame) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Text => Ok(TextFormatter::new().format_text(frame, self.precision)),
            OutputFormat::Json => JsonFormatter::new().format_json(frame),
            OutputFormat::Csv => Ok(CsvFormatter::new().format_csv(frame, self.precision)),
        }
    }
}

/// Human-readable text formatter
#[derive(Debug, Clone, Default)]
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_text(&self, frame: &ViewFrame, precision: usize) -> String {
        let sample = &frame.sample;
        let mut output = format!(
            "t={} q={} pos=({:.p$}, {:.p$}) heading={:.p$}",
            frame.now_ms,
            frame.query_ms,
            sample.x,
            sample.y,
            sample.heading,
            p = precision
        );

        if let (Some(center), Some(rotation)) = (frame.center, frame.rotation) {
            output.push_str(&format!(
                " center=({:.p$}, {:.p$}) rotation={:.p$}",
                center.x,
                center.y,
                rotation,
                p = precision
            ));
        }

        if let Some(style) = frame.marker_style {
            output.push_str(&format!(" marker={:?}@{:.p$}", style.icon, style.rotation, p = precision));
        }

        output
    }
}

/// JSON formatter for structured output
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Pretty print JSON
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json(&self, frame: &ViewFrame) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(frame)
        } else {
            serde_json::to_string(frame)
        }
    }
}

/// CSV formatter for data logging. Follow and marker columns are empty when
/// the frame did not touch the view or marker.
#[derive(Debug, Clone, Default)]
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn header(&self) -> String {
        "now_ms,query_ms,x,y,heading,center_x,center_y,rotation,marker_icon,marker_rotation".to_string()
    }

    pub fn format_csv(&self, frame: &ViewFrame, precision: usize) -> String {
        let fixed = |value: f64| format!("{:.p$}", value, p = precision);
        let optional = |value: Option<f64>| value.map(fixed).unwrap_or_default();

        let sample = &frame.sample;
        let (marker_icon, marker_rotation) = match frame.marker_style {
            Some(style) => (format!("{:?}", style.icon), fixed(style.rotation)),
            None => (String::new(), String::new()),
        };

        [
            frame.now_ms.to_string(),
            frame.query_ms.to_string(),
            fixed(sample.x),
            fixed(sample.y),
            fixed(sample.heading),
            optional(frame.center.map(|c| c.x)),
            optional(frame.center.map(|c| c.y)),
            optional(frame.rotation),
            marker_icon,
            marker_rotation,
        ]
        .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Coordinate, TrackedSample};
    use crate::map::MarkerStyle;

    fn frame() -> ViewFrame {
        ViewFrame::new(2000, 1250, TrackedSample::new(12.5, 0.0, 0.0, 1250))
    }

    #[test]
    fn test_text_output() {
        let formatter = FrameFormatter::new().with_precision(1);
        let line = formatter.format(&frame()).unwrap();
        assert_eq!(line, "t=2000 q=1250 pos=(12.5, 0.0) heading=0.0");

        let followed = frame()
            .with_follow(Coordinate::new(12.5, -200.0), -0.0)
            .with_marker_style(MarkerStyle::default());
        let line = formatter.format(&followed).unwrap();
        assert!(line.contains("center=(12.5, -200.0)"));
        assert!(line.ends_with("marker=Neutral@0.0"));
    }

    #[test]
    fn test_json_output() {
        let formatter = FrameFormatter::new().with_format(OutputFormat::Json);
        let line = formatter.format(&frame()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["query_ms"], 1250);
        assert_eq!(value["sample"]["x"], 12.5);
        assert!(value["center"].is_null());
        assert!(formatter.header().is_none());
    }

    #[test]
    fn test_pretty_json_spans_lines() {
        let pretty = JsonFormatter::pretty().format_json(&frame()).unwrap();
        let compact = JsonFormatter::new().format_json(&frame()).unwrap();

        assert!(pretty.lines().count() > 1);
        assert_eq!(compact.lines().count(), 1);
        let reparsed: ViewFrame = serde_json::from_str(&pretty).unwrap();
        assert_eq!(reparsed, frame());
    }

    #[test]
    fn test_csv_output() {
        let formatter = FrameFormatter::new().with_format(OutputFormat::Csv).with_precision(2);
        let header = formatter.header().unwrap();
        let row = formatter.format(&frame()).unwrap();

        assert_eq!(header.split(',').count(), row.split(',').count());
        assert_eq!(row, "2000,1250,12.50,0.00,0.00,,,,,");
    }
}
