//! One shared animation clock for every chart.
//!
//! The host drives the scheduler with [`TransitionScheduler::tick`] once per
//! animation frame (or [`TransitionScheduler::advance`] in tests). Each
//! attribute of each element has at most one running transition.

use super::{Easing, Tween};
use crate::data_types::Key;
use crate::events::OwnerId;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(pub u64);

/// A visual element: the chart that owns it plus its data key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementId {
    pub owner: OwnerId,
    pub key: Key,
}

impl ElementId {
    pub fn new(owner: OwnerId, key: Key) -> Self {
        Self { owner, key }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attr {
    Geometry,
    Opacity,
    Fill,
}

/// The slot a transition animates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttrKey {
    pub element: ElementId,
    pub attr: Attr,
}

impl AttrKey {
    pub fn new(element: ElementId, attr: Attr) -> Self {
        Self { element, attr }
    }
}

pub type FrameFn = Rc<dyn Fn(&Tween)>;
pub type DoneFn = Box<dyn FnOnce()>;

/// Negative and NaN become zero; anything past `Duration::MAX` saturates.
pub(crate) fn millis(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms.max(0.0) / 1000.0).unwrap_or(Duration::MAX)
}

/// A transition to be scheduled, built fluently.
pub struct Transition {
    target: AttrKey,
    from: Tween,
    to: Tween,
    duration: Duration,
    delay: Duration,
    easing: Easing,
    on_frame: Option<FrameFn>,
    on_complete: Option<DoneFn>,
    on_cancel: Option<DoneFn>,
    then: Option<Box<Transition>>,
}

impl Transition {
    pub fn new(target: AttrKey, from: impl Into<Tween>, to: impl Into<Tween>) -> Self {
        Self {
            target,
            from: from.into(),
            to: to.into(),
            duration: millis(500.0),
            delay: Duration::ZERO,
            easing: Easing::default(),
            on_frame: None,
            on_complete: None,
            on_cancel: None,
            then: None,
        }
    }

    pub fn duration_ms(mut self, ms: f64) -> Self {
        self.duration = millis(ms);
        self
    }

    pub fn delay_ms(mut self, ms: f64) -> Self {
        self.delay = millis(ms);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn on_frame(mut self, f: impl Fn(&Tween) + 'static) -> Self {
        self.on_frame = Some(Rc::new(f));
        self
    }

    /// Runs once, after the frame that reaches the end value.
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Runs instead of `on_complete` when the transition is cancelled.
    pub fn on_cancel(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    /// Starts `next` when this one completes. A follow-up on the same
    /// attribute starts from this transition's end value.
    pub fn then(mut self, next: Transition) -> Self {
        self.then = Some(Box::new(next));
        self
    }

    pub fn target(&self) -> &AttrKey {
        &self.target
    }
}

struct Active {
    id: TransitionId,
    from: Tween,
    to: Tween,
    current: Tween,
    start: Duration,
    duration: Duration,
    easing: Easing,
    on_frame: Option<FrameFn>,
    on_complete: Option<DoneFn>,
    on_cancel: Option<DoneFn>,
    then: Option<Box<Transition>>,
}

#[derive(Default)]
struct Inner {
    clock: Duration,
    last_tick: Option<Instant>,
    next_id: u64,
    active: IndexMap<AttrKey, Active>,
}

/// Cloning shares the clock and the table of running transitions.
#[derive(Clone, Default)]
pub struct TransitionScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl fmt::Debug for TransitionScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TransitionScheduler")
            .field("clock", &inner.clock)
            .field("active", &inner.active.len())
            .finish()
    }
}

impl TransitionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for scheduling a transition with both callbacks.
    #[allow(clippy::too_many_arguments)]
    pub fn animate(
        &self,
        target: AttrKey,
        from: impl Into<Tween>,
        to: impl Into<Tween>,
        duration_ms: f64,
        easing: Easing,
        on_frame: impl Fn(&Tween) + 'static,
        on_complete: impl FnOnce() + 'static,
    ) -> TransitionId {
        self.schedule(
            Transition::new(target, from, to)
                .duration_ms(duration_ms)
                .easing(easing)
                .on_frame(on_frame)
                .on_complete(on_complete),
        )
    }

    /// Starts `transition`. If its attribute is already animating, the
    /// running transition is dropped without callbacks and the new one starts
    /// from the attribute's current interpolated value.
    pub fn schedule(&self, transition: Transition) -> TransitionId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = TransitionId(inner.next_id);

        let mut from = transition.from;
        if let Some(prev) = inner.active.shift_remove(&transition.target) {
            trace!(previous = ?prev.id, next = ?id, "re-basing running transition");
            from = prev.current;
        }
        let start = inner.clock.saturating_add(transition.delay);
        inner.active.insert(
            transition.target,
            Active {
                id,
                current: from.clone(),
                from,
                to: transition.to,
                start,
                duration: transition.duration,
                easing: transition.easing,
                on_frame: transition.on_frame,
                on_complete: transition.on_complete,
                on_cancel: transition.on_cancel,
                then: transition.then,
            },
        );
        id
    }

    /// Advances the clock by the wall time since the previous tick. The
    /// first tick only records the instant.
    pub fn tick(&self, now: Instant) -> usize {
        let elapsed = {
            let mut inner = self.inner.borrow_mut();
            let elapsed = inner
                .last_tick
                .map(|last| now.saturating_duration_since(last))
                .unwrap_or_default();
            inner.last_tick = Some(now);
            elapsed
        };
        self.advance(elapsed)
    }

    /// Advances the clock by `dt` and runs one frame. Returns how many
    /// transitions are still running afterwards.
    pub fn advance(&self, dt: Duration) -> usize {
        let mut frames: Vec<(FrameFn, Tween)> = Vec::new();
        let mut completed: Vec<DoneFn> = Vec::new();
        let mut chained: Vec<(AttrKey, Tween, Transition)> = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            inner.clock = inner.clock.saturating_add(dt);
            let clock = inner.clock;
            let mut finished = Vec::new();
            for (target, a) in inner.active.iter_mut() {
                if clock < a.start {
                    continue;
                }
                let elapsed = clock - a.start;
                let t = if a.duration.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f64() / a.duration.as_secs_f64()).min(1.0)
                };
                a.current = a.from.lerp(&a.to, a.easing.apply(t));
                if let Some(f) = &a.on_frame {
                    frames.push((f.clone(), a.current.clone()));
                }
                if t >= 1.0 {
                    finished.push(target.clone());
                }
            }
            for target in finished {
                if let Some(a) = inner.active.shift_remove(&target) {
                    completed.extend(a.on_complete);
                    if let Some(next) = a.then {
                        chained.push((target, a.to, *next));
                    }
                }
            }
            trace!(
                clock = ?inner.clock,
                frames = frames.len(),
                completed = completed.len(),
                "transition frame"
            );
        }

        for (f, value) in frames {
            f(&value);
        }
        for done in completed {
            done();
        }
        for (target, end, mut next) in chained {
            if next.target == target {
                next.from = end;
            }
            self.schedule(next);
        }
        self.active_count()
    }

    /// Cancels one transition, running its cancel callback.
    pub fn cancel(&self, id: TransitionId) -> bool {
        self.cancel_where(|_, a| a.id == id) > 0
    }

    /// Cancels every transition of one element.
    pub fn cancel_element(&self, element: &ElementId) -> usize {
        self.cancel_where(|t, _| &t.element == element)
    }

    /// Cancels every transition of every element of `owner`.
    pub fn cancel_owner(&self, owner: OwnerId) -> usize {
        self.cancel_where(|t, _| t.element.owner == owner)
    }

    fn cancel_where(&self, pred: impl Fn(&AttrKey, &Active) -> bool) -> usize {
        let cancelled: Vec<Active> = {
            let mut inner = self.inner.borrow_mut();
            let targets: Vec<AttrKey> = inner
                .active
                .iter()
                .filter(|(t, a)| pred(t, a))
                .map(|(t, _)| t.clone())
                .collect();
            targets
                .iter()
                .filter_map(|t| inner.active.shift_remove(t))
                .collect()
        };
        let count = cancelled.len();
        for a in cancelled {
            if let Some(cleanup) = a.on_cancel {
                cleanup();
            }
        }
        count
    }

    /// Drops every transition of one element without running any callback,
    /// for when the caller puts the element in its final state itself.
    pub fn discard_element(&self, element: &ElementId) -> usize {
        let mut inner = self.inner.borrow_mut();
        let before = inner.active.len();
        inner.active.retain(|t, _| &t.element != element);
        before - inner.active.len()
    }

    pub fn is_active(&self, target: &AttrKey) -> bool {
        self.inner.borrow().active.contains_key(target)
    }

    pub fn is_running(&self, id: TransitionId) -> bool {
        self.inner.borrow().active.values().any(|a| a.id == id)
    }

    /// Last interpolated value of a running transition.
    pub fn current_value(&self, target: &AttrKey) -> Option<Tween> {
        self.inner
            .borrow()
            .active
            .get(target)
            .map(|a| a.current.clone())
    }

    pub fn active_count(&self) -> usize {
        self.inner.borrow().active.len()
    }

    pub fn has_active(&self) -> bool {
        self.active_count() > 0
    }

    /// Time accumulated by `tick` and `advance`.
    pub fn clock(&self) -> Duration {
        self.inner.borrow().clock
    }
}
