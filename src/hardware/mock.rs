//! Mock positioning source for testing and replay

use crate::core::PositionFix;
use crate::hardware::{ChangeHandler, ErrorHandler, PositioningError, PositioningSource, SourceFactory, Subscription};
use crate::utils::TrackingOptions;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

struct Listener {
    id: u64,
    on_change: Rc<RefCell<ChangeHandler>>,
    on_error: Rc<RefCell<ErrorHandler>>,
}

#[derive(Default)]
struct MockSourceState {
    tracking: bool,
    options: Option<TrackingOptions>,
    last_fix: Option<PositionFix>,
    listeners: Vec<Listener>,
    next_listener_id: u64,
    subscribe_calls: u32,
    unsubscribe_calls: u32,
    simulate_errors: bool,
    error_probability: f32,
}

/// Positioning source driven by the test or replay harness.
///
/// Clones share state, so a handle kept by the harness observes and drives
/// the instance handed to the control.
#[derive(Clone, Default)]
pub struct MockPositioningSource {
    state: Rc<RefCell<MockSourceState>>,
}

impl MockPositioningSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the options the source was created with
    pub fn configure(&self, options: &TrackingOptions) {
        self.state.borrow_mut().options = Some(options.clone());
    }

    pub fn options(&self) -> Option<TrackingOptions> {
        self.state.borrow().options.clone()
    }

    /// Deliver a fix to every registered change handler.
    ///
    /// Fixes are ignored while tracking is off. Returns the number of
    /// handlers invoked.
    pub fn emit_fix(&self, fix: PositionFix) -> usize {
        {
            let mut state = self.state.borrow_mut();
            if !state.tracking {
                debug!("mock source not tracking, fix ignored");
                return 0;
            }
            state.last_fix = Some(fix);
        }

        if self.should_simulate_error() {
            let timeout_ms = self.options().map(|o| o.timeout_ms).unwrap_or_default();
            return self.emit_error(PositioningError::Timeout { timeout_ms });
        }

        let handlers: Vec<(u64, Rc<RefCell<ChangeHandler>>)> = self
            .state
            .borrow()
            .listeners
            .iter()
            .map(|l| (l.id, Rc::clone(&l.on_change)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in handlers {
            // an earlier handler may have cancelled this subscription
            if !self.is_listening(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    let handler = &mut *handler;
                    handler(&fix);
                    delivered += 1;
                }
                Err(_) => warn!(listener = id, "re-entrant fix dispatch skipped"),
            }
        }
        delivered
    }

    /// Deliver an error to every registered error handler
    pub fn emit_error(&self, error: PositioningError) -> usize {
        let handlers: Vec<(u64, Rc<RefCell<ErrorHandler>>)> = self
            .state
            .borrow()
            .listeners
            .iter()
            .map(|l| (l.id, Rc::clone(&l.on_error)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in handlers {
            if !self.is_listening(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    let handler = &mut *handler;
                    handler(&error);
                    delivered += 1;
                }
                Err(_) => warn!(listener = id, "re-entrant error dispatch skipped"),
            }
        }
        delivered
    }

    /// Replace fixes with timeout errors at the given probability (0.0 to 1.0)
    pub fn simulate_errors(&self, enable: bool, probability: f32) {
        let mut state = self.state.borrow_mut();
        state.simulate_errors = enable;
        state.error_probability = probability.clamp(0.0, 1.0);
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn subscribe_calls(&self) -> u32 {
        self.state.borrow().subscribe_calls
    }

    pub fn unsubscribe_calls(&self) -> u32 {
        self.state.borrow().unsubscribe_calls
    }

    fn is_listening(&self, id: u64) -> bool {
        self.state.borrow().listeners.iter().any(|l| l.id == id)
    }

    fn should_simulate_error(&self) -> bool {
        let state = self.state.borrow();
        if !state.simulate_errors {
            return false;
        }

        use rand::Rng;
        let mut rng = rand::thread_rng();
        rng.gen::<f32>() < state.error_probability
    }
}

fn remove_listener(state: &Weak<RefCell<MockSourceState>>, id: u64) {
    if let Some(state) = state.upgrade() {
        let mut state = state.borrow_mut();
        state.listeners.retain(|l| l.id != id);
        state.unsubscribe_calls += 1;
    }
}

impl PositioningSource for MockPositioningSource {
    fn set_tracking(&mut self, tracking: bool) {
        self.state.borrow_mut().tracking = tracking;
    }

    fn is_tracking(&self) -> bool {
        self.state.borrow().tracking
    }

    fn last_fix(&self) -> Option<PositionFix> {
        self.state.borrow().last_fix
    }

    fn subscribe(&mut self, on_change: ChangeHandler, on_error: ErrorHandler) -> Subscription {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_listener_id += 1;
            state.subscribe_calls += 1;
            let id = state.next_listener_id;
            state.listeners.push(Listener {
                id,
                on_change: Rc::new(RefCell::new(on_change)),
                on_error: Rc::new(RefCell::new(on_error)),
            });
            id
        };

        let state = Rc::downgrade(&self.state);
        Subscription::new(move || remove_listener(&state, id))
    }
}

/// Factory handing out handles to one shared [`MockPositioningSource`]
#[derive(Clone, Default)]
pub struct MockSourceFactory {
    source: MockPositioningSource,
    created: Rc<Cell<u32>>,
}

impl MockSourceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the source every created binding shares
    pub fn source(&self) -> MockPositioningSource {
        self.source.clone()
    }

    /// Number of bindings created so far
    pub fn created_count(&self) -> u32 {
        self.created.get()
    }
}

impl SourceFactory for MockSourceFactory {
    fn create(&mut self, options: &TrackingOptions) -> Box<dyn PositioningSource> {
        self.source.configure(options);
        self.created.set(self.created.get() + 1);
        Box::new(self.source.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_handlers(changes: &Rc<Cell<u32>>, errors: &Rc<Cell<u32>>) -> (ChangeHandler, ErrorHandler) {
        let changes = Rc::clone(changes);
        let errors = Rc::clone(errors);
        (
            Box::new(move |_fix: &PositionFix| changes.set(changes.get() + 1)),
            Box::new(move |_error: &PositioningError| errors.set(errors.get() + 1)),
        )
    }

    #[test]
    fn test_fixes_require_tracking() {
        let mut source = MockPositioningSource::new();
        let changes = Rc::new(Cell::new(0));
        let errors = Rc::new(Cell::new(0));
        let (on_change, on_error) = counting_handlers(&changes, &errors);
        let _subscription = source.subscribe(on_change, on_error);

        assert_eq!(source.emit_fix(PositionFix::at(1.0, 1.0)), 0);
        assert!(source.last_fix().is_none());

        source.set_tracking(true);
        assert_eq!(source.emit_fix(PositionFix::at(1.0, 1.0)), 1);
        assert_eq!(changes.get(), 1);
        assert_eq!(source.last_fix(), Some(PositionFix::at(1.0, 1.0)));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut source = MockPositioningSource::new();
        source.set_tracking(true);
        let changes = Rc::new(Cell::new(0));
        let errors = Rc::new(Cell::new(0));
        let (on_change, on_error) = counting_handlers(&changes, &errors);

        let subscription = source.subscribe(on_change, on_error);
        assert_eq!(source.listener_count(), 1);
        subscription.unsubscribe();

        assert_eq!(source.listener_count(), 0);
        assert_eq!(source.unsubscribe_calls(), 1);
        source.emit_fix(PositionFix::at(0.0, 0.0));
        source.emit_error(PositioningError::PermissionDenied);
        assert_eq!(changes.get(), 0);
        assert_eq!(errors.get(), 0);
    }

    #[test]
    fn test_handler_cancelled_mid_dispatch_does_not_fire() {
        let mut source = MockPositioningSource::new();
        source.set_tracking(true);

        let second_calls = Rc::new(Cell::new(0));
        let second_subscription: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot = Rc::clone(&second_subscription);
        let _first = source.subscribe(
            Box::new(move |_fix: &PositionFix| {
                if let Some(subscription) = slot.borrow_mut().take() {
                    subscription.unsubscribe();
                }
            }),
            Box::new(|_error: &PositioningError| {}),
        );

        let counter = Rc::clone(&second_calls);
        let second = source.subscribe(
            Box::new(move |_fix: &PositionFix| counter.set(counter.get() + 1)),
            Box::new(|_error: &PositioningError| {}),
        );
        *second_subscription.borrow_mut() = Some(second);

        assert_eq!(source.emit_fix(PositionFix::at(0.0, 0.0)), 1);
        assert_eq!(second_calls.get(), 0);
    }

    #[test]
    fn test_error_simulation() {
        let mut source = MockPositioningSource::new();
        source.configure(&TrackingOptions::default());
        source.set_tracking(true);
        source.simulate_errors(true, 1.0);

        let changes = Rc::new(Cell::new(0));
        let errors = Rc::new(Cell::new(0));
        let (on_change, on_error) = counting_handlers(&changes, &errors);
        let _subscription = source.subscribe(on_change, on_error);

        source.emit_fix(PositionFix::at(0.0, 0.0));
        assert_eq!(changes.get(), 0);
        assert_eq!(errors.get(), 1);
    }

    #[test]
    fn test_factory_shares_source() {
        let mut factory = MockSourceFactory::new();
        let options = TrackingOptions {
            timeout_ms: 1234,
            ..Default::default()
        };

        let mut created = factory.create(&options);
        created.set_tracking(true);

        assert_eq!(factory.created_count(), 1);
        assert!(factory.source().is_tracking());
        assert_eq!(factory.source().options().unwrap().timeout_ms, 1234);
    }
}
