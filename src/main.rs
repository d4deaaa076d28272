use geolocation_follow::api::{FrameFormatter, GeolocationControl, OutputFormat};
use geolocation_follow::core::PositionFix;
use geolocation_follow::hardware::{MockSourceFactory, PositioningError};
use geolocation_follow::map::{RecordingMarkerLayer, RecordingView, ViewportSize};
use geolocation_follow::processing::ViewFrame;
use geolocation_follow::utils::{ConfigurationManager, ManualClock, ViewFollowConfig};
use serde::Deserialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Recorded track replayed through a geolocation control
#[derive(Debug, Deserialize)]
struct TrackFile {
    /// Viewport of the replayed map; follow mode centers on the subject without it
    #[serde(default)]
    viewport: Option<ViewportSize>,
    /// Map units per pixel
    #[serde(default)]
    resolution: Option<f64>,
    events: Vec<TrackEvent>,
}

/// A fix, or a positioning failure when `error` is set
#[derive(Debug, Deserialize)]
struct TrackEvent {
    t_ms: i64,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    fix: PositionFix,
}

#[derive(Debug, PartialEq)]
struct ReplayArgs {
    track_path: String,
    config_path: Option<String>,
    format: OutputFormat,
}

fn parse_args(args: &[String]) -> Result<ReplayArgs, String> {
    let mut track_path = None;
    let mut config_path = None;
    let mut format = OutputFormat::default();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config needs a file path")?;
                config_path = Some(path.clone());
            }
            "--format" => {
                let name = iter.next().ok_or("--format needs text, json or csv")?;
                format = name.parse().map_err(|e| format!("{}", e))?;
            }
            _ if track_path.is_none() && !arg.starts_with("--") => track_path = Some(arg.clone()),
            _ => return Err(format!("unexpected argument '{}'", arg)),
        }
    }

    Ok(ReplayArgs {
        track_path: track_path.ok_or("missing track file")?,
        config_path,
        format,
    })
}

fn load_config(path: Option<&str>) -> Result<ViewFollowConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(ConfigurationManager::from_file(path)?.config().clone()),
        None => Ok(ViewFollowConfig::default()),
    }
}

/// Replay `track` and return every distinct frame the control rendered
fn replay(config: ViewFollowConfig, track: &TrackFile) -> Result<Vec<ViewFrame>, Box<dyn std::error::Error>> {
    let view = match (track.resolution, track.viewport) {
        (Some(resolution), Some(size)) => RecordingView::new(resolution, size),
        _ => RecordingView::unrendered(),
    };
    let view = Rc::new(RefCell::new(view));
    let layer = Rc::new(RefCell::new(RecordingMarkerLayer::new()));
    let factory = MockSourceFactory::new();
    let source = factory.source();
    let clock = ManualClock::new(track.events.first().map_or(0, |e| e.t_ms));

    let mut control = GeolocationControl::new(config, view, layer, factory)?.with_clock(Rc::new(clock.clone()));

    let errors = Rc::new(Cell::new(0u32));
    let error_count = Rc::clone(&errors);
    control.on_error(move |error| {
        error_count.set(error_count.get() + 1);
        eprintln!("positioning error: {}", error);
    });
    control.toggle(true);

    let mut frames: Vec<ViewFrame> = Vec::new();
    for event in &track.events {
        clock.set(event.t_ms);
        match &event.error {
            Some(reason) => {
                source.emit_error(PositioningError::PositionUnavailable { reason: reason.clone() });
            }
            None => {
                source.emit_fix(event.fix);
            }
        }

        if let Some(frame) = control.last_frame() {
            if frames.last() != Some(&frame) {
                frames.push(frame);
            }
        }
    }

    info!(
        events = track.events.len(),
        frames = frames.len(),
        errors = errors.get(),
        samples = control.history_len(),
        "replay finished"
    );
    control.toggle(false);
    Ok(frames)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let replay_args = match parse_args(&args) {
        Ok(replay_args) => replay_args,
        Err(message) => {
            let program = args.first().map_or("geolocation-follow", |s| s.as_str());
            eprintln!("{}", message);
            eprintln!("Usage: {} <track.json> [--config <file>] [--format text|json|csv]", program);
            return Err("Invalid arguments".into());
        }
    };

    let config = load_config(replay_args.config_path.as_deref())?;
    let json_data = std::fs::read_to_string(&replay_args.track_path)?;
    let track: TrackFile = serde_json::from_str(&json_data)?;

    let formatter = FrameFormatter::new().with_format(replay_args.format);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }
    for frame in replay(config, &track)? {
        println!("{}", formatter.format(&frame)?);
    }

    Ok(())
}
