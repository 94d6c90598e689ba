//! Chart Model
//!
//! This module defines `Chart`, the component a caller drives. It holds the
//! bound data, the current and previous scales and the live visual tree, and
//! turns every render into a layout, a keyed reconciliation and a set of
//! scheduled transitions.
//!
//! The scheduler, tooltip and event relay are shared handles passed in by the
//! host, so several charts animate on one clock and share one tooltip.

use crate::data_types::{ChartConfig, ChartOptions, GeometryNode, Key, Label, Point, Shape};
use crate::error::ChartError;
use crate::events::{ChartEvent, EventRelay, OwnerId, SubscriptionId};
use crate::join::{reconcile, DataJoin};
use crate::plot_types::{LayoutContext, Layout, PlotRenderer};
use crate::scales::{format_number, ScaleSet};
use crate::theme::{Color, ColorScale};
use crate::tooltip::TooltipOverlay;
use crate::transition::{Attr, AttrKey, ElementId, Transition, TransitionScheduler, Tween};
use crate::visual::{ElementState, VisualElement, VisualTree};
use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace, warn};

const EPSILON: f64 = 1e-9;

/// What one render pass did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderReport {
    pub entered: Vec<Key>,
    /// Updated keys with the largest coordinate change of their pose.
    pub updated: Vec<(Key, f64)>,
    pub exited: Vec<Key>,
    /// Records skipped because an accessor failed.
    pub warnings: Vec<ChartError>,
    /// The layout had nothing to draw and the "no data" label is shown.
    pub placeholder: bool,
}

impl RenderReport {
    /// Nothing entered or exited and no pose moved.
    pub fn is_noop(&self) -> bool {
        self.entered.is_empty()
            && self.exited.is_empty()
            && self.updated.iter().all(|(_, delta)| *delta <= EPSILON)
    }
}

type SharedTree<R> = Rc<RefCell<VisualTree<R>>>;

/// Runs `f` on one element if the tree is still alive and not borrowed.
fn with_element<R>(tree: &Weak<RefCell<VisualTree<R>>>, key: &Key, f: impl FnOnce(&mut VisualElement<R>)) {
    let Some(shared) = tree.upgrade() else {
        return;
    };
    let Ok(mut tree) = shared.try_borrow_mut() else {
        trace!(%key, "visual tree busy; frame skipped");
        return;
    };
    if let Some(element) = tree.get_mut(key) {
        f(element);
    }
}

fn remove_element<R>(tree: &Weak<RefCell<VisualTree<R>>>, key: &Key) {
    if let Some(shared) = tree.upgrade() {
        if let Ok(mut tree) = shared.try_borrow_mut() {
            tree.remove(key);
        }
    }
}

pub struct Chart<R: Clone + 'static> {
    id: OwnerId,
    kind: Box<dyn PlotRenderer<R>>,
    options: ChartOptions<R>,
    data: Vec<R>,
    tree: SharedTree<R>,
    scales: ScaleSet,
    previous_scales: ScaleSet,
    baseline: Option<f64>,
    colors: ColorScale,
    placeholder: Option<Label>,
    scheduler: TransitionScheduler,
    tooltip: TooltipOverlay,
    relay: EventRelay<ChartEvent>,
    hovered: Option<Key>,
    initialized: bool,
    destroyed: bool,
}

impl<R: Clone + 'static> Chart<R> {
    pub fn new(
        kind: impl PlotRenderer<R> + 'static,
        options: ChartOptions<R>,
        scheduler: TransitionScheduler,
        tooltip: TooltipOverlay,
        relay: EventRelay<ChartEvent>,
    ) -> Self {
        let colors = ColorScale::new(options.config.theme.palette.clone());
        Self {
            id: OwnerId::next(),
            kind: Box::new(kind),
            options,
            data: Vec::new(),
            tree: Rc::new(RefCell::new(VisualTree::new())),
            scales: ScaleSet::default(),
            previous_scales: ScaleSet::default(),
            baseline: None,
            colors,
            placeholder: None,
            scheduler,
            tooltip,
            relay,
            hovered: None,
            initialized: false,
            destroyed: false,
        }
    }

    /// A chart with its own scheduler, tooltip and relay.
    pub fn standalone(kind: impl PlotRenderer<R> + 'static, options: ChartOptions<R>) -> Self {
        let tooltip = TooltipOverlay::new(options.config.theme.tooltip_offset);
        Self::new(kind, options, TransitionScheduler::new(), tooltip, EventRelay::new())
    }

    pub fn id(&self) -> OwnerId {
        self.id
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn config(&self) -> &ChartConfig {
        &self.options.config
    }

    pub fn data(&self) -> &[R] {
        &self.data
    }

    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    /// Scales of the render before the latest one.
    pub fn previous_scales(&self) -> &ScaleSet {
        &self.previous_scales
    }

    pub fn placeholder(&self) -> Option<&Label> {
        self.placeholder.as_ref()
    }

    pub fn tree(&self) -> Ref<'_, VisualTree<R>> {
        self.tree.borrow()
    }

    pub fn element(&self, key: &Key) -> Option<VisualElement<R>> {
        self.tree.borrow().get(key).cloned()
    }

    pub fn scheduler(&self) -> &TransitionScheduler {
        &self.scheduler
    }

    pub fn tooltip(&self) -> &TooltipOverlay {
        &self.tooltip
    }

    pub fn relay(&self) -> &EventRelay<ChartEvent> {
        &self.relay
    }

    pub fn hovered(&self) -> Option<&Key> {
        self.hovered.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Validates the canvas and the accessors the chart kind needs.
    pub fn init_chart(&mut self) -> Result<(), ChartError> {
        if self.destroyed {
            return Err(ChartError::configuration("chart has been destroyed"));
        }
        self.options.config.validate()?;
        self.kind.validate(&self.options.accessors)?;
        self.initialized = true;
        info!(
            chart = %self.id,
            kind = self.kind.name(),
            width = self.options.config.canvas_width,
            height = self.options.config.canvas_height,
            "chart initialised"
        );
        Ok(())
    }

    /// Replaces the bound dataset. Nothing is rendered until the next
    /// `draw` or `transition`.
    pub fn set_graph_data(&mut self, data: Vec<R>) {
        self.data = data;
    }

    /// Changes the canvas size. Scales are rebuilt on the next render.
    pub fn set_size(&mut self, width: f64, height: f64) -> Result<(), ChartError> {
        let mut config = self.options.config.clone();
        config.canvas_width = width;
        config.canvas_height = height;
        config.validate()?;
        self.options.config = config;
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), ChartError> {
        if self.destroyed {
            return Err(ChartError::configuration("chart has been destroyed"));
        }
        if !self.initialized {
            return Err(ChartError::configuration(
                "init_chart must succeed before the chart can render",
            ));
        }
        Ok(())
    }

    fn compute_layout(&mut self) -> Result<Layout<R>, ChartError> {
        let mut ctx = LayoutContext {
            config: &self.options.config,
            area: self.options.config.plot_area(),
            colors: &mut self.colors,
        };
        self.kind
            .layout(&self.data, &self.options.accessors, &mut ctx)
    }

    fn log_warnings(&self, warnings: &[ChartError]) {
        for w in warnings {
            warn!(chart = %self.id, error = %w, "record skipped");
        }
    }

    /// Full render without reconciliation or animation: every element is
    /// rebuilt at its final pose.
    pub fn draw(&mut self) -> Result<RenderReport, ChartError> {
        self.ensure_live()?;
        let layout = match self.compute_layout() {
            Ok(layout) => layout,
            Err(ChartError::DegenerateDomain(reason)) => return Ok(self.show_placeholder(&reason, false)),
            Err(e) => return Err(e),
        };
        let join = join_nodes(Vec::new(), layout.nodes)?;
        self.log_warnings(&layout.warnings);

        self.scheduler.cancel_owner(self.id);
        let mut report = RenderReport {
            warnings: layout.warnings,
            ..RenderReport::default()
        };
        {
            let mut tree = self.tree.borrow_mut();
            tree.clear();
            for entering in join.enter {
                let id = ElementId::new(self.id, entering.key.clone());
                let pose = entering.datum.shape.clone();
                let mut element = VisualElement::entering(id, entering.datum, pose);
                element.opacity = 1.0;
                element.state = ElementState::Active;
                report.entered.push(entering.key);
                tree.insert(element);
            }
        }
        self.finish_render(layout.scales, layout.baseline);
        debug!(chart = %self.id, elements = report.entered.len(), "drew chart");
        Ok(report)
    }

    /// Reconciled re-render of the bound data. New keys enter, surviving
    /// keys move to their new pose, missing keys animate out and are then
    /// removed. Transitions already running are re-based, never restarted.
    ///
    /// A duplicate key fails the pass and leaves the previous render in
    /// place.
    pub fn transition(&mut self) -> Result<RenderReport, ChartError> {
        self.ensure_live()?;
        let layout = match self.compute_layout() {
            Ok(layout) => layout,
            Err(ChartError::DegenerateDomain(reason)) => return Ok(self.show_placeholder(&reason, true)),
            Err(e) => return Err(e),
        };
        let previous: Vec<Key> = self.tree.borrow().keys().cloned().collect();
        let join = join_nodes(previous, layout.nodes)?;
        self.log_warnings(&layout.warnings);

        let order: Vec<Key> = join.keys().into_iter().cloned().collect();
        let stagger = self.options.config.stagger_ms;
        let mut report = RenderReport {
            warnings: layout.warnings,
            ..RenderReport::default()
        };

        for exiting in join.exit {
            if self.start_exit(&exiting.key, layout.baseline) {
                report.exited.push(exiting.key);
            }
        }
        for updating in join.update {
            let delay = stagger * updating.index as f64;
            let delta = self.update_element(updating.datum, delay);
            report.updated.push((updating.key, delta));
        }
        for entering in join.enter {
            let delay = stagger * entering.index as f64;
            self.enter_element(entering.datum, layout.baseline, delay);
            report.entered.push(entering.key);
        }
        self.tree.borrow_mut().reorder(&order);
        self.finish_render(layout.scales, layout.baseline);

        debug!(
            chart = %self.id,
            entered = report.entered.len(),
            updated = report.updated.len(),
            exited = report.exited.len(),
            "transitioned chart"
        );
        Ok(report)
    }

    /// `set_graph_data` followed by `transition`.
    pub fn update(&mut self, data: Vec<R>) -> Result<RenderReport, ChartError> {
        self.set_graph_data(data);
        self.transition()
    }

    fn finish_render(&mut self, scales: ScaleSet, baseline: Option<f64>) {
        self.previous_scales = std::mem::replace(&mut self.scales, scales);
        self.baseline = baseline;
        self.placeholder = None;
        self.release_stale_hover();
    }

    /// Drops the hover and its tooltip once the hovered element is gone or
    /// exiting.
    fn release_stale_hover(&mut self) {
        let Some(key) = &self.hovered else {
            return;
        };
        let alive = self.tree.borrow().get(key).is_some_and(|e| !e.is_exiting());
        if !alive {
            debug!(chart = %self.id, %key, "hovered element left; hiding tooltip");
            self.tooltip.hide_for(self.id);
            self.hovered = None;
        }
    }

    fn animates(&self) -> bool {
        self.options.config.transition_duration_ms > 0.0
    }

    fn base_transition(&self, target: AttrKey, from: Tween, to: Tween, delay: f64) -> Transition {
        Transition::new(target, from, to)
            .duration_ms(self.options.config.transition_duration_ms)
            .delay_ms(delay)
            .easing(self.options.config.easing)
    }

    /// Moves the painted pose towards `to`. Completion and cancellation both
    /// leave the element at its target.
    fn animate_geometry(&self, id: &ElementId, from: Shape, to: Shape, delay: f64) {
        let tree = Rc::downgrade(&self.tree);
        let key = id.key.clone();
        let settle = {
            let (tree, key) = (tree.clone(), key.clone());
            move || {
                with_element(&tree, &key, |e| {
                    e.shape = e.target.clone();
                    if e.state == ElementState::Entering {
                        e.state = ElementState::Active;
                    }
                })
            }
        };
        let target = AttrKey::new(id.clone(), Attr::Geometry);
        let transition = self
            .base_transition(target, from.into(), to.into(), delay)
            .on_frame(move |value| {
                if let Tween::Shape(shape) = value {
                    with_element(&tree, &key, |e| e.shape = shape.clone());
                }
            })
            .on_complete(settle.clone())
            .on_cancel(settle);
        self.scheduler.schedule(transition);
    }

    fn animate_opacity(&self, id: &ElementId, from: f64, to: f64, delay: f64) {
        let tree = Rc::downgrade(&self.tree);
        let key = id.key.clone();
        let settle = {
            let (tree, key) = (tree.clone(), key.clone());
            move || with_element(&tree, &key, |e| e.opacity = to)
        };
        let target = AttrKey::new(id.clone(), Attr::Opacity);
        let transition = self
            .base_transition(target, from.into(), to.into(), delay)
            .on_frame(move |value| {
                if let Some(v) = value.as_scalar() {
                    with_element(&tree, &key, |e| e.opacity = v);
                }
            })
            .on_complete(settle.clone())
            .on_cancel(settle);
        self.scheduler.schedule(transition);
    }

    fn animate_fill(&self, id: &ElementId, from: Color, to: Color, delay: f64) {
        let tree = Rc::downgrade(&self.tree);
        let key = id.key.clone();
        let settle = {
            let (tree, key) = (tree.clone(), key.clone());
            move || with_element(&tree, &key, |e| e.style.fill = Some(to))
        };
        let target = AttrKey::new(id.clone(), Attr::Fill);
        let transition = self
            .base_transition(target, from.into(), to.into(), delay)
            .on_frame(move |value| {
                if let Some(c) = value.as_color() {
                    with_element(&tree, &key, |e| e.style.fill = Some(c));
                }
            })
            .on_complete(settle.clone())
            .on_cancel(settle);
        self.scheduler.schedule(transition);
    }

    fn enter_element(&self, node: GeometryNode<R>, baseline: Option<f64>, delay: f64) {
        let id = ElementId::new(self.id, node.key.clone());
        let to = node.shape.clone();
        if !self.animates() {
            let mut element = VisualElement::entering(id, node, to);
            element.opacity = 1.0;
            element.state = ElementState::Active;
            self.tree.borrow_mut().insert(element);
            return;
        }
        let from = self.kind.enter_shape(&to, baseline);
        self.tree
            .borrow_mut()
            .insert(VisualElement::entering(id.clone(), node, from.clone()));
        self.animate_geometry(&id, from, to, delay);
        self.animate_opacity(&id, 0.0, 1.0, delay);
    }

    /// Retargets a surviving element and animates it from wherever it is
    /// painted now. Returns how far its target pose moved.
    fn update_element(&self, node: GeometryNode<R>, delay: f64) -> f64 {
        let id = ElementId::new(self.id, node.key.clone());
        let animate = self.animates();
        let (from, to, delta, opacity, fills) = {
            let mut tree = self.tree.borrow_mut();
            let Some(element) = tree.get_mut(&id.key) else {
                return 0.0;
            };
            let delta = element.target.distance(&node.shape);
            let from = element.shape.clone();
            let opacity = element.opacity;
            let old_fill = element.style.fill;
            element.retarget(node);
            let fills = match (old_fill, element.style.fill) {
                (Some(a), Some(b)) if a != b && animate => {
                    element.style.fill = Some(a);
                    Some((a, b))
                }
                _ => None,
            };
            (from, element.target.clone(), delta, opacity, fills)
        };

        if !animate {
            self.scheduler.discard_element(&id);
            with_element(&Rc::downgrade(&self.tree), &id.key, |e| {
                e.shape = e.target.clone();
                e.opacity = 1.0;
            });
            return delta;
        }

        let geometry = AttrKey::new(id.clone(), Attr::Geometry);
        if from.distance(&to) > EPSILON || self.scheduler.is_active(&geometry) {
            self.animate_geometry(&id, from, to, delay);
        } else if let Some(e) = self.tree.borrow_mut().get_mut(&id.key) {
            e.shape = to;
        }
        let fade = AttrKey::new(id.clone(), Attr::Opacity);
        if opacity < 1.0 || self.scheduler.is_active(&fade) {
            self.animate_opacity(&id, opacity, 1.0, delay);
        }
        if let Some((a, b)) = fills {
            self.animate_fill(&id, a, b, delay);
        }
        delta
    }

    /// Starts the exit of a live element. Returns false if it was already
    /// leaving or is unknown.
    fn start_exit(&self, key: &Key, baseline: Option<f64>) -> bool {
        let id = ElementId::new(self.id, key.clone());
        let current = {
            let mut tree = self.tree.borrow_mut();
            match tree.get_mut(key) {
                Some(e) if !e.is_exiting() => {
                    e.state = ElementState::Exiting;
                    e.shape.clone()
                }
                _ => return false,
            }
        };
        if !self.animates() {
            self.scheduler.discard_element(&id);
            self.tree.borrow_mut().remove(key);
            return true;
        }

        let to = self.kind.exit_shape(&current, baseline);
        let opacity = self.tree.borrow().get(key).map_or(1.0, |e| e.opacity);
        if let Some(e) = self.tree.borrow_mut().get_mut(key) {
            e.target = to.clone();
        }

        let tree = Rc::downgrade(&self.tree);
        let frame_key = key.clone();
        let frame_tree = tree.clone();
        let detach = {
            let (tree, key) = (tree.clone(), key.clone());
            move || remove_element(&tree, &key)
        };
        let target = AttrKey::new(id.clone(), Attr::Geometry);
        let transition = self
            .base_transition(target, current.into(), to.into(), 0.0)
            .on_frame(move |value| {
                if let Tween::Shape(shape) = value {
                    with_element(&frame_tree, &frame_key, |e| e.shape = shape.clone());
                }
            })
            .on_complete(detach.clone())
            .on_cancel(detach);
        self.scheduler.schedule(transition);

        let fade_key = key.clone();
        let fade = self
            .base_transition(AttrKey::new(id, Attr::Opacity), Tween::Scalar(opacity), Tween::Scalar(0.0), 0.0)
            .on_frame(move |value| {
                if let Some(v) = value.as_scalar() {
                    with_element(&tree, &fade_key, |e| e.opacity = v);
                }
            });
        self.scheduler.schedule(fade);
        true
    }

    /// Clears the chart down to the "no data" label.
    fn show_placeholder(&mut self, reason: &str, animate: bool) -> RenderReport {
        debug!(chart = %self.id, reason, "nothing to draw; showing placeholder");
        let live: Vec<Key> = self.tree.borrow().live().map(|e| e.key().clone()).collect();
        if animate {
            for key in &live {
                self.start_exit(key, self.baseline);
            }
        } else {
            self.scheduler.cancel_owner(self.id);
            self.tree.borrow_mut().clear();
        }
        let center = self.options.config.plot_area().center();
        self.previous_scales = std::mem::take(&mut self.scales);
        self.placeholder = Some(Label::new(center, self.options.config.no_data_text.clone()));
        self.release_stale_hover();
        RenderReport {
            exited: live,
            placeholder: true,
            ..RenderReport::default()
        }
    }

    /// Cancels this chart's transitions (running their cleanup), drops its
    /// subscriptions and its tooltip. Calling it again does nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        let cancelled = self.scheduler.cancel_owner(self.id);
        let unsubscribed = self.relay.unsubscribe_owner(self.id);
        self.tooltip.hide_for(self.id);
        self.tree.borrow_mut().clear();
        self.placeholder = None;
        self.hovered = None;
        self.destroyed = true;
        info!(chart = %self.id, cancelled, unsubscribed, "chart destroyed");
    }

    /// Subscribes to one of this chart's topics. The subscription is owned by
    /// the chart and dropped by `destroy`.
    pub fn subscribe(
        &self,
        name: &str,
        handler: impl FnMut(&ChartEvent) -> eyre::Result<()> + 'static,
    ) -> SubscriptionId {
        self.relay
            .subscribe(self.options.config.topic(name), self.id, handler)
    }

    /// Key of the top-most element under `point`.
    pub fn hit_test(&self, point: Point) -> Option<Key> {
        self.tree.borrow().hit_test(point).map(|e| e.key().clone())
    }

    fn publish(&self, name: &str, key: Key, value: Option<f64>, position: Option<Point>) -> Result<(), ChartError> {
        let event = ChartEvent {
            chart: self.id,
            key,
            value,
            position,
        };
        self.relay
            .publish(&self.options.config.topic(name), &event)
            .map(|_| ())
    }

    /// Shows the tooltip for `key` and publishes `hover`. Unknown or exiting
    /// keys are ignored.
    pub fn pointer_over(&mut self, key: &Key, position: Point) -> Result<(), ChartError> {
        self.ensure_live()?;
        let (index, datum, value) = {
            let tree = self.tree.borrow();
            match tree.get(key) {
                Some(e) if !e.is_exiting() => (e.index, e.datum.clone(), e.value),
                _ => return Ok(()),
            }
        };
        match &self.options.accessors.tooltip {
            Some(content) => self.tooltip.show_for(self.id, content, index, &datum, position),
            None => {
                let text = match value {
                    Some(v) => format!("{key}: {}", format_number(v)),
                    None => key.to_string(),
                };
                self.tooltip.show(self.id, text, position);
            }
        }
        self.hovered = Some(key.clone());
        self.publish("hover", key.clone(), value, Some(position))
    }

    pub fn pointer_move(&mut self, position: Point) {
        if self.hovered.is_some() {
            self.tooltip.move_to(position);
        }
    }

    /// Hides this chart's tooltip and publishes `leave` for the hovered key.
    pub fn pointer_out(&mut self) -> Result<(), ChartError> {
        self.tooltip.hide_for(self.id);
        let Some(key) = self.hovered.take() else {
            return Ok(());
        };
        let value = self.tree.borrow().get(&key).and_then(|e| e.value);
        self.publish("leave", key, value, None)
    }

    /// Hides the tooltip and publishes `click`.
    pub fn click(&mut self, key: &Key, position: Point) -> Result<(), ChartError> {
        self.ensure_live()?;
        let value = {
            let tree = self.tree.borrow();
            match tree.get(key) {
                Some(e) if !e.is_exiting() => e.value,
                _ => return Ok(()),
            }
        };
        self.tooltip.hide_for(self.id);
        self.publish("click", key.clone(), value, Some(position))
    }

    /// Routes a raw pointer position: hit tests, then moves, enters or
    /// leaves elements as needed. Returns the hovered key.
    pub fn hover_at(&mut self, position: Point) -> Result<Option<Key>, ChartError> {
        self.ensure_live()?;
        let hit = self.hit_test(position);
        if hit == self.hovered {
            self.pointer_move(position);
            return Ok(hit);
        }
        let left = self.pointer_out();
        let entered = match &hit {
            Some(key) => self.pointer_over(key, position),
            None => Ok(()),
        };
        left.and(entered).map(|_| hit)
    }
}

impl<R: Clone + 'static> Drop for Chart<R> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Reconciles layout nodes against the previous keys, reporting duplicate
/// keys by dataset position.
fn join_nodes<R>(previous: Vec<Key>, nodes: Vec<GeometryNode<R>>) -> Result<DataJoin<GeometryNode<R>>, ChartError> {
    let positions: Vec<usize> = nodes.iter().map(|n| n.index).collect();
    reconcile(previous.iter(), nodes, |_, n| Ok(n.key.clone())).map_err(|e| match e {
        ChartError::DuplicateKey { key, first, second } => ChartError::DuplicateKey {
            key,
            first: positions[first],
            second: positions[second],
        },
        other => other,
    })
}
