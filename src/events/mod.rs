//! Typed, synchronous publish/subscribe
//!
//! Handlers are registered per concrete event type and run on the
//! publisher's call stack in subscription order. The handler list is copied
//! out of the lock before dispatch, so a handler may itself subscribe,
//! unsubscribe or publish without deadlocking or disturbing the current
//! delivery.
//!
//! Game state is mutated under the game's write lock; the events a mutation
//! produces are collected in an [`EventSink`] and published only after the
//! lock has been released.

pub mod domain;

pub use domain::*;

use crate::core::GameId;
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Marker for anything that can travel on the bus
pub trait Event: Any + Send + Sync + fmt::Debug {
    fn game_id(&self) -> &GameId;
}

/// Opaque handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type Handler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: FxHashMap<TypeId, Vec<(SubscriptionId, Handler)>>,
    owners: FxHashMap<SubscriptionId, TypeId>,
}

#[derive(Default)]
pub struct EventBus {
    registry: RwLock<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every future `E`
    pub fn subscribe<E, F>(&self, handler: F) -> SubscriptionId
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let erased: Handler = Arc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });

        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        let type_id = TypeId::of::<E>();
        registry.handlers.entry(type_id).or_default().push((id, erased));
        registry.owners.insert(id, type_id);
        id
    }

    /// Remove a subscription. Unknown or already-removed ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let Some(type_id) = registry.owners.remove(&id) else {
            return false;
        };
        if let Some(list) = registry.handlers.get_mut(&type_id) {
            list.retain(|(sub, _)| *sub != id);
            if list.is_empty() {
                registry.handlers.remove(&type_id);
            }
        }
        true
    }

    /// Deliver `event` to every handler subscribed for `E`
    pub fn publish<E: Event>(&self, event: &E) {
        let snapshot: Vec<Handler> = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            match registry.handlers.get(&TypeId::of::<E>()) {
                Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };

        for handler in snapshot {
            handler(event);
        }
    }

    /// Drop every subscription
    pub fn clear(&self) {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry.handlers.clear();
        registry.owners.clear();
    }

    pub fn subscription_count(&self) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .owners
            .len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

/// An event waiting to be published once the game lock is released
trait PendingEvent: Send {
    fn publish(self: Box<Self>, bus: &EventBus);
}

impl<E: Event> PendingEvent for E {
    fn publish(self: Box<Self>, bus: &EventBus) {
        bus.publish(&*self);
    }
}

/// Events produced by a mutation, in the order they happened
pub struct EventSink {
    game_id: GameId,
    pending: Vec<Box<dyn PendingEvent>>,
}

impl EventSink {
    pub fn new(game_id: GameId) -> Self {
        EventSink {
            game_id,
            pending: Vec::new(),
        }
    }

    /// Game the collected events belong to
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn push<E: Event>(&mut self, event: E) {
        self.pending.push(Box::new(event));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Publish everything collected so far, oldest first
    pub fn publish_all(self, bus: &EventBus) {
        for event in self.pending {
            event.publish(bus);
        }
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("game_id", &self.game_id)
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn game() -> GameId {
        GameId::new("g1")
    }

    fn raised(old: i32, new: i32) -> TemperatureChanged {
        TemperatureChanged {
            game_id: game(),
            old,
            new,
            changed_by: None,
        }
    }

    #[test]
    fn test_delivers_in_subscription_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |e: &TemperatureChanged| {
                seen.lock().unwrap().push((tag, e.new));
            });
        }

        bus.publish(&raised(-30, -28));
        assert_eq!(*seen.lock().unwrap(), vec![("first", -28), ("second", -28)]);
    }

    #[test]
    fn test_only_matching_type_is_delivered() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));
        let c = Arc::clone(&count);
        bus.subscribe(move |_: &OxygenChanged| *c.lock().unwrap() += 1);

        bus.publish(&raised(-30, -28));
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let bus = EventBus::new();
        let id = bus.subscribe(|_: &TemperatureChanged| {});
        assert_eq!(id.to_string(), "sub-1");
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscription_count(), 0);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_uses_snapshot() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(Mutex::new(0));
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let (b, s) = (Arc::clone(&bus), Arc::clone(&slot));
        let first = bus.subscribe(move |_: &TemperatureChanged| {
            if let Some(id) = *s.lock().unwrap() {
                b.unsubscribe(id);
            }
        });
        let c = Arc::clone(&count);
        let second = bus.subscribe(move |_: &TemperatureChanged| *c.lock().unwrap() += 1);
        *slot.lock().unwrap() = Some(second);

        // The second handler was in the snapshot, so it still runs once
        bus.publish(&raised(-30, -28));
        assert_eq!(*count.lock().unwrap(), 1);

        bus.publish(&raised(-28, -26));
        assert_eq!(*count.lock().unwrap(), 1);
        assert!(bus.unsubscribe(first));
    }

    #[test]
    fn test_sink_publishes_in_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        bus.subscribe(move |e: &TemperatureChanged| s.lock().unwrap().push(e.new));

        let mut sink = EventSink::new(game());
        sink.push(raised(-30, -28));
        sink.push(raised(-28, -26));
        assert_eq!(sink.len(), 2);
        sink.publish_all(&bus);

        assert_eq!(*seen.lock().unwrap(), vec![-28, -26]);
    }

    #[test]
    fn test_clear() {
        let bus = EventBus::new();
        bus.subscribe(|_: &TemperatureChanged| {});
        bus.subscribe(|_: &OxygenChanged| {});
        bus.clear();
        assert_eq!(bus.subscription_count(), 0);
    }
}
