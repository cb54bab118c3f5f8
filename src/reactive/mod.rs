//! Published values and change tracking.
//!
//! Every output of the animation core is pushed into a [`Signal`]. Consumers
//! (a renderer, an inspector overlay) either poll the signal or subscribe to
//! it; they never drive computation themselves.

pub mod changes;
pub mod signal;

pub use changes::ChangeFlags;
pub use signal::{create_signal, ReadSignal, Signal, Subscription, WriteSignal};
