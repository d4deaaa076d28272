//! Device positioning source abstraction
//!
//! This module models the device location provider as a subscription
//! capability: handlers are registered with [`PositioningSource::subscribe`]
//! and removed by cancelling the returned [`Subscription`].

pub mod source;
pub mod mock;
pub mod error;

pub use source::{ChangeHandler, ErrorHandler, PositioningSource, SourceFactory, Subscription};
pub use mock::{MockPositioningSource, MockSourceFactory};
pub use error::PositioningError;
