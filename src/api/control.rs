//! Geolocation control: tracking session lifecycle
//!
//! The control owns one tracking session at a time. Switching it on builds
//! a fresh positioning source binding, attaches the marker and subscribes
//! to change and error events; switching it off cancels the subscription,
//! stops the source and drops the marker. Every change event runs
//! synchronously to completion: append to history, notify the change
//! callback, then synchronize the view and marker.

use crate::api::session::TrackingSession;
use crate::api::types::{ChangeCallback, ErrorCallback};
use crate::core::{PositionFix, PositionUpdate, TrackedSample};
use crate::hardware::{ChangeHandler, ErrorHandler, PositioningError, PositioningSource, SourceFactory, Subscription};
use crate::map::{Marker, MarkerId, MarkerLayer, View};
use crate::processing::{apply_follow, PositionHistory, ViewFrame, ViewSynchronizer};
use crate::utils::{Clock, ConfigResult, SystemClock, ViewFollowConfig};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

/// Map view shared with the enclosing widget
pub type SharedView = Rc<RefCell<dyn View>>;

/// Marker layer shared with the enclosing widget
pub type SharedMarkerLayer = Rc<RefCell<dyn MarkerLayer>>;

/// State reachable from the source event handlers
struct TrackerState {
    config: ViewFollowConfig,
    session: TrackingSession,
    history: PositionHistory,
    synchronizer: ViewSynchronizer,
    marker: Option<Marker>,
    next_marker_id: u32,
    last_frame: Option<ViewFrame>,
    view: SharedView,
    layer: SharedMarkerLayer,
    clock: Rc<dyn Clock>,
}

impl TrackerState {
    /// Create a marker if none exists. A new marker starts a new track.
    fn ensure_marker(&mut self) {
        if self.marker.is_some() {
            return;
        }

        self.next_marker_id += 1;
        let id = MarkerId::new(self.next_marker_id);
        self.marker = Some(Marker::new(id));

        self.history.clear();
        self.synchronizer.reset();
        self.session.reset_heading();
        self.last_frame = None;
        debug!(marker = %id, "marker created, position history cleared");
    }

    fn attach_marker(&mut self) {
        if let Some(marker) = self.marker.as_mut() {
            marker.attach(&mut *self.layer.borrow_mut());
            self.session.marker_visible = true;
        }
    }

    fn remove_marker(&mut self) {
        if let Some(mut marker) = self.marker.take() {
            marker.detach(&mut *self.layer.borrow_mut());
            debug!(marker = %marker.id(), "marker dropped");
        }
        self.session.marker_visible = false;
    }

    /// Filter a raw fix and append it to the history
    fn record_fix(&mut self, fix: &PositionFix) -> Option<PositionUpdate> {
        if !self.session.is_active() {
            return None;
        }

        let Some(update) = PositionUpdate::from_fix(fix) else {
            debug!(?fix, "fix without a usable position dropped");
            return None;
        };

        let now_ms = self.clock.now_ms();
        let sample = self
            .history
            .append(update.position.x, update.position.y, update.heading, now_ms);
        self.session.record_heading(sample.heading);
        Some(update)
    }

    /// Render the delayed track position to the view and marker
    fn synchronize(&mut self) -> Option<ViewFrame> {
        if !self.session.is_active() {
            return None;
        }

        let now_ms = self.clock.now_ms();
        let mut frame = self.synchronizer.tick(now_ms, &self.history)?;
        let sample = frame.sample;

        if self.config.follow {
            let (center, rotation) = apply_follow(&mut *self.view.borrow_mut(), &sample);
            frame = frame.with_follow(center, rotation);
        }

        if self.config.show_marker {
            if let Some(marker) = self.marker.as_mut() {
                let style = marker.update(&mut *self.layer.borrow_mut(), sample.coordinate(), sample.heading);
                frame = frame.with_marker_style(style);
            }
        }

        self.last_frame = Some(frame.clone());
        Some(frame)
    }
}

#[derive(Default)]
struct Callbacks {
    on_change: Option<ChangeCallback>,
    on_error: Option<ErrorCallback>,
}

impl Callbacks {
    // Callbacks are taken out while they run so they may re-register or
    // toggle the control without a double borrow.

    fn notify_change(callbacks: &RefCell<Callbacks>, update: &PositionUpdate) {
        let taken = callbacks.borrow_mut().on_change.take();
        if let Some(mut callback) = taken {
            callback(update);
            let mut slots = callbacks.borrow_mut();
            if slots.on_change.is_none() {
                slots.on_change = Some(callback);
            }
        }
    }

    fn notify_error(callbacks: &RefCell<Callbacks>, error: &PositioningError) {
        let taken = callbacks.borrow_mut().on_error.take();
        if let Some(mut callback) = taken {
            callback(error);
            let mut slots = callbacks.borrow_mut();
            if slots.on_error.is_none() {
                slots.on_error = Some(callback);
            }
        }
    }
}

/// Positioning source of the active session with its listener registration
struct SourceBinding {
    source: Box<dyn PositioningSource>,
    subscription: Subscription,
}

impl SourceBinding {
    fn release(self) {
        let SourceBinding { mut source, subscription } = self;
        subscription.unsubscribe();
        source.set_tracking(false);
    }
}

fn handle_fix(state: &Weak<RefCell<TrackerState>>, callbacks: &Weak<RefCell<Callbacks>>, fix: &PositionFix) {
    let Some(state) = state.upgrade() else {
        return;
    };

    let update = state.borrow_mut().record_fix(fix);
    let Some(update) = update else {
        return;
    };

    if let Some(callbacks) = callbacks.upgrade() {
        Callbacks::notify_change(&callbacks, &update);
    }

    // the change callback may have switched tracking off
    state.borrow_mut().synchronize();
}

fn handle_error(callbacks: &Weak<RefCell<Callbacks>>, error: &PositioningError) {
    warn!(%error, recoverable = error.is_recoverable(), "positioning source reported an error");
    if let Some(callbacks) = callbacks.upgrade() {
        Callbacks::notify_error(&callbacks, error);
    }
}

/// Location-tracking toggle with smoothed view following
pub struct GeolocationControl {
    state: Rc<RefCell<TrackerState>>,
    callbacks: Rc<RefCell<Callbacks>>,
    factory: Box<dyn SourceFactory>,
    binding: Option<SourceBinding>,
}

impl GeolocationControl {
    /// Create an inactive control. When the marker is enabled it is created
    /// here but only added to the layer once tracking starts.
    pub fn new<F>(config: ViewFollowConfig, view: SharedView, layer: SharedMarkerLayer, factory: F) -> ConfigResult<Self>
    where
        F: SourceFactory + 'static,
    {
        config.validate()?;

        let mut state = TrackerState {
            history: PositionHistory::with_capacity(config.smoothing.history_capacity),
            synchronizer: ViewSynchronizer::new(&config.smoothing),
            config,
            session: TrackingSession::default(),
            marker: None,
            next_marker_id: 0,
            last_frame: None,
            view,
            layer,
            clock: Rc::new(SystemClock),
        };
        if state.config.show_marker {
            state.ensure_marker();
        }

        info!(
            follow = state.config.follow,
            show_marker = state.config.show_marker,
            "geolocation control created"
        );

        Ok(Self {
            state: Rc::new(RefCell::new(state)),
            callbacks: Rc::new(RefCell::new(Callbacks::default())),
            factory: Box::new(factory),
            binding: None,
        })
    }

    /// Replace the time source used to stamp samples and ticks
    pub fn with_clock(self, clock: Rc<dyn Clock>) -> Self {
        self.state.borrow_mut().clock = clock;
        self
    }

    /// Register the callback receiving every accepted position update
    pub fn on_change<F>(&mut self, callback: F)
    where
        F: FnMut(&PositionUpdate) + 'static,
    {
        self.callbacks.borrow_mut().on_change = Some(Box::new(callback));
    }

    /// Register the callback receiving positioning errors
    pub fn on_error<F>(&mut self, callback: F)
    where
        F: FnMut(&PositioningError) + 'static,
    {
        self.callbacks.borrow_mut().on_error = Some(Box::new(callback));
    }

    /// Switch tracking on or off. Repeating the current state is a no-op.
    pub fn toggle(&mut self, pressed: bool) {
        if pressed == self.is_active() {
            debug!(pressed, "toggle ignored, already in requested state");
            return;
        }

        if pressed {
            self.start_tracking();
        } else {
            self.stop_tracking();
        }
    }

    fn start_tracking(&mut self) {
        let options = self.state.borrow().config.tracking_options.clone();
        let mut source = self.factory.create(&options);
        source.set_tracking(true);

        {
            let mut state = self.state.borrow_mut();
            if state.config.show_marker {
                state.ensure_marker();
                state.attach_marker();
            }
            state.session.activate();
        }

        let subscription = source.subscribe(self.change_handler(), self.error_handler());
        self.binding = Some(SourceBinding { source, subscription });

        info!(
            high_accuracy = options.enable_high_accuracy,
            timeout_ms = options.timeout_ms,
            maximum_age_ms = options.maximum_age_ms,
            "tracking started"
        );
    }

    fn stop_tracking(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.release();
        }

        let mut state = self.state.borrow_mut();
        state.session.deactivate();
        state.remove_marker();
        info!(samples = state.history.len(), "tracking stopped");
    }

    fn change_handler(&self) -> ChangeHandler {
        let state = Rc::downgrade(&self.state);
        let callbacks = Rc::downgrade(&self.callbacks);
        Box::new(move |fix: &PositionFix| handle_fix(&state, &callbacks, fix))
    }

    fn error_handler(&self) -> ErrorHandler {
        let callbacks = Rc::downgrade(&self.callbacks);
        Box::new(move |error: &PositioningError| handle_error(&callbacks, error))
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().session.is_active()
    }

    pub fn session(&self) -> TrackingSession {
        self.state.borrow().session
    }

    pub fn config(&self) -> ViewFollowConfig {
        self.state.borrow().config.clone()
    }

    /// Samples currently held for interpolation, oldest first
    pub fn history_snapshot(&self) -> Vec<TrackedSample> {
        self.state.borrow().history.to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.state.borrow().history.len()
    }

    pub fn marker(&self) -> Option<Marker> {
        self.state.borrow().marker.clone()
    }

    /// Frame rendered by the most recent successful tick
    pub fn last_frame(&self) -> Option<ViewFrame> {
        self.state.borrow().last_frame.clone()
    }

    pub fn last_query_ms(&self) -> Option<i64> {
        self.state.borrow().synchronizer.last_query_ms()
    }

    /// Stop tracking and release the marker and callbacks
    pub fn dispose(&mut self) {
        self.toggle(false);
        self.state.borrow_mut().remove_marker();
        let mut callbacks = self.callbacks.borrow_mut();
        callbacks.on_change = None;
        callbacks.on_error = None;
    }
}

impl Drop for GeolocationControl {
    fn drop(&mut self) {
        self.dispose();
    }
}
