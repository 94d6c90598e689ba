//! Live visual elements of one chart, keyed by data key.

use crate::data_types::{GeometryNode, Key, Label, Point, Shape, Style};
use crate::transition::ElementId;
use indexmap::IndexMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementState {
    /// Created by the latest render, still animating in.
    Entering,
    Active,
    /// Animating out; removed when its exit transition ends or is cancelled.
    Exiting,
}

#[derive(Clone, Debug)]
pub struct VisualElement<R> {
    pub id: ElementId,
    /// Position of the record in the current dataset.
    pub index: usize,
    pub datum: R,
    /// Pose currently painted. Differs from `target` while animating.
    pub shape: Shape,
    /// Pose of the latest layout.
    pub target: Shape,
    pub style: Style,
    pub opacity: f64,
    pub label: Option<Label>,
    pub value: Option<f64>,
    pub state: ElementState,
}

impl<R> VisualElement<R> {
    /// A new element painted at `from`, heading for the node's pose.
    pub fn entering(id: ElementId, node: GeometryNode<R>, from: Shape) -> Self {
        Self {
            id,
            index: node.index,
            datum: node.datum,
            shape: from,
            target: node.shape,
            style: node.style,
            opacity: 0.0,
            label: node.label,
            value: node.value,
            state: ElementState::Entering,
        }
    }

    pub fn key(&self) -> &Key {
        &self.id.key
    }

    /// Takes the record, pose and style of a fresh layout node. The painted
    /// pose is left alone for the transition to move.
    pub fn retarget(&mut self, node: GeometryNode<R>) {
        self.index = node.index;
        self.datum = node.datum;
        self.target = node.shape;
        self.style = node.style;
        self.label = node.label;
        self.value = node.value;
        self.state = ElementState::Active;
    }

    pub fn is_exiting(&self) -> bool {
        self.state == ElementState::Exiting
    }

    /// Whether pointer events should land on this element.
    pub fn is_interactive(&self) -> bool {
        !self.is_exiting() && self.opacity > 0.0 && self.shape.is_visible()
    }
}

/// Elements in paint order: the current dataset's order, then elements
/// still animating out.
#[derive(Clone, Debug)]
pub struct VisualTree<R> {
    elements: IndexMap<Key, VisualElement<R>>,
}

impl<R> Default for VisualTree<R> {
    fn default() -> Self {
        Self {
            elements: IndexMap::new(),
        }
    }
}

impl<R> VisualTree<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&VisualElement<R>> {
        self.elements.get(key)
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut VisualElement<R>> {
        self.elements.get_mut(key)
    }

    pub fn insert(&mut self, element: VisualElement<R>) {
        self.elements.insert(element.key().clone(), element);
    }

    pub fn remove(&mut self, key: &Key) -> Option<VisualElement<R>> {
        self.elements.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.elements.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisualElement<R>> {
        self.elements.values()
    }

    /// Elements that are not on their way out.
    pub fn live(&self) -> impl Iterator<Item = &VisualElement<R>> {
        self.elements.values().filter(|e| !e.is_exiting())
    }

    /// Paint order: elements missing from `order` (the exiting ones) first,
    /// keeping their relative order, then `order`, so new elements paint on
    /// top.
    pub fn reorder(&mut self, order: &[Key]) {
        let mut sorted = std::mem::take(&mut self.elements);
        let mut placed = IndexMap::with_capacity(order.len());
        for key in order {
            if let Some(e) = sorted.shift_remove(key) {
                placed.insert(key.clone(), e);
            }
        }
        sorted.extend(placed);
        self.elements = sorted;
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Top-most interactive element under `point`.
    pub fn hit_test(&self, point: Point) -> Option<&VisualElement<R>> {
        self.elements
            .values()
            .rev()
            .find(|e| e.is_interactive() && e.shape.contains(point))
    }
}
