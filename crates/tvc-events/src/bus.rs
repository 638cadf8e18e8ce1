use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::event::{EventKind, RepoEvent};

/// Filter for subscribing to a subset of events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// If set, only events of these kinds are delivered.
    pub kinds: Option<Vec<EventKind>>,
}

impl EventFilter {
    /// Deliver every event.
    pub fn all() -> Self {
        Self::default()
    }

    /// Deliver only `kind`.
    pub fn kind(kind: EventKind) -> Self {
        Self::kinds([kind])
    }

    /// Deliver only the listed kinds.
    pub fn kinds(kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self {
            kinds: Some(kinds.into_iter().collect()),
        }
    }

    /// Returns `true` if the given event matches this filter.
    pub fn matches(&self, event: &RepoEvent) -> bool {
        match &self.kinds {
            Some(kinds) => kinds.contains(&event.kind),
            None => true,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

type Handler = Arc<dyn Fn(&RepoEvent) + Send + Sync>;

struct Subscriber {
    token: SubscriptionToken,
    filter: EventFilter,
    handler: Handler,
}

/// Synchronous fan-out of repository events.
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
    next_token: AtomicU64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_token: AtomicU64::new(1),
        }
    }

    /// Register `handler` for events matching `filter`.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionToken
    where
        F: Fn(&RepoEvent) + Send + Sync + 'static,
    {
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                token,
                filter,
                handler: Arc::new(handler),
            });
        token
    }

    /// Remove a subscription. Returns `false` if the token was unknown.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subs.len();
        subs.retain(|sub| sub.token != token);
        subs.len() != before
    }

    /// Deliver `event` to every matching subscriber, in subscription order.
    ///
    /// Handlers are collected first and called without the lock held, so a
    /// handler may itself subscribe or unsubscribe.
    pub fn emit(&self, event: &RepoEvent) {
        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|sub| sub.filter.matches(event))
            .map(|sub| Arc::clone(&sub.handler))
            .collect();
        trace!(kind = %event.kind, handlers = handlers.len(), "emitting event");
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventPayload;
    use std::sync::Mutex;

    fn event(kind: EventKind) -> RepoEvent {
        RepoEvent::new(kind, 0, EventPayload::Reset { dropped: 0 })
    }

    fn recorder(bus: &EventBus, filter: EventFilter) -> (SubscriptionToken, Arc<Mutex<Vec<EventKind>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let token = bus.subscribe(filter, move |e| sink.lock().unwrap().push(e.kind));
        (token, seen)
    }

    #[test]
    fn filter_matching() {
        assert!(EventFilter::all().matches(&event(EventKind::Commit)));
        let only_commits = EventFilter::kind(EventKind::Commit);
        assert!(only_commits.matches(&event(EventKind::Commit)));
        assert!(!only_commits.matches(&event(EventKind::Checkout)));
    }

    #[test]
    fn delivers_in_emission_order() {
        let bus = EventBus::new();
        let (_, seen) = recorder(&bus, EventFilter::all());
        bus.emit(&event(EventKind::StageAdd));
        bus.emit(&event(EventKind::Commit));
        assert_eq!(*seen.lock().unwrap(), vec![EventKind::StageAdd, EventKind::Commit]);
    }

    #[test]
    fn filtered_subscriber_skips_other_kinds() {
        let bus = EventBus::new();
        let (_, seen) = recorder(&bus, EventFilter::kinds([EventKind::StashSave, EventKind::StashPop]));
        bus.emit(&event(EventKind::Commit));
        bus.emit(&event(EventKind::StashPop));
        assert_eq!(*seen.lock().unwrap(), vec![EventKind::StashPop]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let (token, seen) = recorder(&bus, EventFilter::all());
        assert!(bus.unsubscribe(token));
        assert!(!bus.unsubscribe(token));
        bus.emit(&event(EventKind::Commit));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn handler_may_subscribe_during_emit() {
        let bus = Arc::new(EventBus::new());
        let inner = Arc::clone(&bus);
        bus.subscribe(EventFilter::all(), move |_| {
            inner.subscribe(EventFilter::all(), |_| {});
        });
        bus.emit(&event(EventKind::Init));
        assert_eq!(bus.subscriber_count(), 2);
    }
}
