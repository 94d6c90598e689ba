//! Synchronous publish/subscribe relay between charts and their callers.

use crate::data_types::{Key, Point};
use crate::error::{ChartError, HandlerFailure};
use indexmap::{IndexMap, IndexSet};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity of whatever holds subscriptions, transitions or the tooltip.
/// Every chart gets its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub u64);

impl OwnerId {
    pub fn next() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chart-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Payload of the pointer topics charts publish.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartEvent {
    pub chart: OwnerId,
    pub key: Key,
    pub value: Option<f64>,
    pub position: Option<Point>,
}

type Handler<P> = Rc<RefCell<dyn FnMut(&P) -> eyre::Result<()>>>;

struct Subscription<P> {
    id: SubscriptionId,
    owner: OwnerId,
    handler: Handler<P>,
}

struct RelayInner<P> {
    next_id: u64,
    topics: IndexMap<String, Vec<Subscription<P>>>,
    /// Topics whose delivery is under way.
    delivering: IndexSet<String>,
}

/// Clears a topic's in-flight mark when its delivery ends, even if a
/// handler panics.
struct Delivery<'a, P> {
    inner: &'a RefCell<RelayInner<P>>,
    topic: &'a str,
}

impl<P> Drop for Delivery<'_, P> {
    fn drop(&mut self) {
        self.inner.borrow_mut().delivering.shift_remove(self.topic);
    }
}

/// Cloning shares the subscription table; independent relays are created
/// with [`EventRelay::new`].
pub struct EventRelay<P = ChartEvent> {
    inner: Rc<RefCell<RelayInner<P>>>,
}

impl<P> Clone for EventRelay<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P> Default for EventRelay<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventRelay<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventRelay")
            .field("topics", &inner.topics.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<P> EventRelay<P> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RelayInner {
                next_id: 1,
                topics: IndexMap::new(),
                delivering: IndexSet::new(),
            })),
        }
    }

    /// Handlers on one topic run in subscription order.
    pub fn subscribe(
        &self,
        topic: impl Into<String>,
        owner: OwnerId,
        handler: impl FnMut(&P) -> eyre::Result<()> + 'static,
    ) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.topics.entry(topic.into()).or_default().push(Subscription {
            id,
            owner,
            handler: Rc::new(RefCell::new(handler)),
        });
        id
    }

    /// Removes one subscription. Only its owner can remove it.
    pub fn unsubscribe(&self, topic: &str, id: SubscriptionId, owner: OwnerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(subs) = inner.topics.get_mut(topic) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|s| !(s.id == id && s.owner == owner));
        before != subs.len()
    }

    /// Drops every subscription held by `owner`, on every topic.
    pub fn unsubscribe_owner(&self, owner: OwnerId) -> usize {
        let mut inner = self.inner.borrow_mut();
        let mut removed = 0;
        for subs in inner.topics.values_mut() {
            let before = subs.len();
            subs.retain(|s| s.owner != owner);
            removed += before - subs.len();
        }
        removed
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .borrow()
            .topics
            .get(topic)
            .map_or(0, Vec::len)
    }

    fn is_subscribed(&self, topic: &str, id: SubscriptionId) -> bool {
        self.inner
            .borrow()
            .topics
            .get(topic)
            .is_some_and(|subs| subs.iter().any(|s| s.id == id))
    }

    /// Delivers `payload` to every handler of `topic` before returning.
    ///
    /// A failing handler does not stop delivery to the ones after it. The
    /// failures are collected into [`ChartError::Relay`] once every handler
    /// has run. Handlers may subscribe, unsubscribe or publish to other
    /// topics; a handler removed during delivery is not called. Publishing
    /// to a topic that is still being delivered calls no handler and fails.
    pub fn publish(&self, topic: &str, payload: &P) -> Result<usize, ChartError> {
        let snapshot: Vec<(SubscriptionId, Handler<P>)> = {
            let mut inner = self.inner.borrow_mut();
            let snapshot = match inner.topics.get(topic) {
                Some(subs) if !subs.is_empty() => subs
                    .iter()
                    .map(|s| (s.id, s.handler.clone()))
                    .collect::<Vec<_>>(),
                _ => return Ok(0),
            };
            if !inner.delivering.insert(topic.to_string()) {
                warn!(topic, "topic published again during its own delivery");
                return Err(ChartError::Relay {
                    topic: topic.to_string(),
                    failures: snapshot
                        .iter()
                        .map(|(id, _)| HandlerFailure {
                            subscription: id.0,
                            message: "topic re-published during its own delivery".to_string(),
                        })
                        .collect(),
                });
            }
            snapshot
        };
        let _delivery = Delivery {
            inner: &*self.inner,
            topic,
        };

        let mut delivered = 0;
        let mut failures = Vec::new();
        for (id, handler) in snapshot {
            if !self.is_subscribed(topic, id) {
                continue;
            }
            let result = match handler.try_borrow_mut() {
                Ok(mut f) => (*f)(payload),
                Err(_) => Err(eyre::eyre!("handler re-entered while already running")),
            };
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(topic, subscription = id.0, error = %e, "event handler failed");
                    failures.push(HandlerFailure {
                        subscription: id.0,
                        message: format!("{e:#}"),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(delivered)
        } else {
            Err(ChartError::Relay {
                topic: topic.to_string(),
                failures,
            })
        }
    }
}
