//! Event bus for translation version control.
//!
//! Every successful repository operation publishes a [`RepoEvent`].
//! Subscribers register a handler with an [`EventFilter`] and get back a
//! [`SubscriptionToken`] they can later use to unsubscribe. Handlers run
//! synchronously, in emission order, on the caller's thread.

pub mod bus;
pub mod event;

pub use bus::{EventBus, EventFilter, SubscriptionToken};
pub use event::{EventKind, EventPayload, RepoEvent};
