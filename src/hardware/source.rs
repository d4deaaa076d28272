//! Positioning source interface and subscriptions

use crate::core::PositionFix;
use crate::hardware::PositioningError;
use crate::utils::TrackingOptions;
use std::fmt;

/// Handler invoked with each new fix
pub type ChangeHandler = Box<dyn FnMut(&PositionFix)>;

/// Handler invoked with each positioning failure
pub type ErrorHandler = Box<dyn FnMut(&PositioningError)>;

/// Device positioning source delivering change and error events
pub trait PositioningSource {
    /// Start or stop producing fixes
    fn set_tracking(&mut self, tracking: bool);

    fn is_tracking(&self) -> bool;

    /// Most recent fix delivered, if any
    fn last_fix(&self) -> Option<PositionFix>;

    /// Register a pair of handlers. They stay registered until the returned
    /// subscription is cancelled or dropped.
    fn subscribe(&mut self, on_change: ChangeHandler, on_error: ErrorHandler) -> Subscription;
}

/// Builds a fresh positioning source each time tracking is switched on
pub trait SourceFactory {
    fn create(&mut self, options: &TrackingOptions) -> Box<dyn PositioningSource>;
}

impl<F> SourceFactory for F
where
    F: FnMut(&TrackingOptions) -> Box<dyn PositioningSource>,
{
    fn create(&mut self, options: &TrackingOptions) -> Box<dyn PositioningSource> {
        self(options)
    }
}

/// Registration of handlers with a positioning source.
///
/// Cancelling is synchronous: once [`Subscription::unsubscribe`] returns (or
/// the subscription is dropped) the source never invokes the handlers again.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_unsubscribe_runs_cancel_once() {
        let cancelled = Rc::new(Cell::new(0));
        let counter = Rc::clone(&cancelled);
        let subscription = Subscription::new(move || counter.set(counter.get() + 1));

        assert!(subscription.is_active());
        subscription.unsubscribe();
        assert_eq!(cancelled.get(), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let cancelled = Rc::new(Cell::new(false));
        let flag = Rc::clone(&cancelled);
        {
            let _subscription = Subscription::new(move || flag.set(true));
        }
        assert!(cancelled.get());
    }
}
