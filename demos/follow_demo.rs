//! Follow mode demonstration
//!
//! Drives a geolocation control with a simulated drive around a corner and
//! prints how the view and marker trail the raw fixes.

use geolocation_follow::api::{FrameFormatter, GeolocationControl};
use geolocation_follow::core::PositionFix;
use geolocation_follow::hardware::MockSourceFactory;
use geolocation_follow::map::{RecordingMarkerLayer, RecordingView, View, ViewportSize};
use geolocation_follow::utils::{ManualClock, ViewFollowConfig};
use std::cell::RefCell;
use std::f64::consts::FRAC_PI_2;
use std::rc::Rc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Geolocation Follow - Follow Mode Demo ===\n");

    let view = Rc::new(RefCell::new(RecordingView::new(2.0, ViewportSize::new(400.0, 600.0))));
    let layer = Rc::new(RefCell::new(RecordingMarkerLayer::new()));
    let factory = MockSourceFactory::new();
    let source = factory.source();
    let clock = ManualClock::new(0);

    let config = ViewFollowConfig::default().with_follow(true);
    let mut control = GeolocationControl::new(config, view.clone(), layer.clone(), factory)?
        .with_clock(Rc::new(clock.clone()));

    control.on_change(|update| {
        println!(
            "fix:   ({:8.2}, {:8.2}) heading {:5.2} speed {:4.1}",
            update.position.x, update.position.y, update.heading, update.speed
        );
    });
    control.on_error(|error| println!("error: {}", error));
    control.toggle(true);

    let formatter = FrameFormatter::new().with_precision(2);

    // north along x = 0, then a right turn heading east
    let mut fixes = Vec::new();
    for i in 0..6 {
        fixes.push(PositionFix::at(0.0, i as f64 * 10.0).with_heading(0.0).with_speed(20.0));
    }
    for i in 1..6 {
        fixes.push(PositionFix::at(i as f64 * 10.0, 50.0).with_heading(FRAC_PI_2).with_speed(20.0));
    }

    for (i, fix) in fixes.into_iter().enumerate() {
        clock.set(i as i64 * 500);
        source.emit_fix(fix);
        if let Some(frame) = control.last_frame() {
            println!("frame: {}", formatter.format(&frame)?);
        }
    }

    control.toggle(false);

    let view = view.borrow();
    println!("\nFinal view center: {:?}", view.center());
    println!("Final view rotation: {:.3} rad", view.rotation());
    println!("Layer operations recorded: {}", layer.borrow().operations().len());
    println!("\nFollow mode demo completed successfully!");
    Ok(())
}
