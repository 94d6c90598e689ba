//! The floating tooltip shared by every chart of a host.

use crate::data_types::{Accessor, Point};
use crate::events::OwnerId;
use glam::DVec2;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TooltipState {
    pub visible: bool,
    pub content: String,
    /// Top-left corner, already offset from the pointer.
    pub position: Point,
    /// Chart that showed the tooltip last.
    pub owner: Option<OwnerId>,
}

/// Handle to one tooltip. Clones share the same state, so a host creates one
/// overlay and passes it to each of its charts; the most recent `show` wins.
#[derive(Clone, Debug)]
pub struct TooltipOverlay {
    state: Arc<RwLock<TooltipState>>,
    offset: DVec2,
}

impl Default for TooltipOverlay {
    fn default() -> Self {
        Self::new((12.0, -12.0))
    }
}

impl TooltipOverlay {
    pub fn new(offset: (f64, f64)) -> Self {
        Self {
            state: Arc::new(RwLock::new(TooltipState::default())),
            offset: DVec2::new(offset.0, offset.1),
        }
    }

    /// Shows `content` near `pointer`, replacing whatever was visible.
    pub fn show(&self, owner: OwnerId, content: impl Into<String>, pointer: Point) {
        let mut state = self.state.write();
        if state.visible && state.owner != Some(owner) {
            debug!(previous = ?state.owner, next = %owner, "tooltip taken over");
        }
        *state = TooltipState {
            visible: true,
            content: content.into(),
            position: pointer + self.offset,
            owner: Some(owner),
        };
    }

    /// Shows the text produced by `content` for `record`. A failing accessor
    /// is logged and the tooltip shows empty.
    pub fn show_for<R: 'static>(
        &self,
        owner: OwnerId,
        content: &Accessor<R, String>,
        index: usize,
        record: &R,
        pointer: Point,
    ) {
        let text = match content.read("tooltip", index, record) {
            Ok(text) => text,
            Err(e) => {
                warn!(chart = %owner, error = %e, "tooltip content failed");
                String::new()
            }
        };
        self.show(owner, text, pointer);
    }

    /// Follows the pointer while visible.
    pub fn move_to(&self, pointer: Point) {
        let mut state = self.state.write();
        if state.visible {
            state.position = pointer + self.offset;
        }
    }

    pub fn hide(&self) {
        let mut state = self.state.write();
        state.visible = false;
        state.content.clear();
    }

    /// Hides the tooltip only if `owner` showed it last.
    pub fn hide_for(&self, owner: OwnerId) -> bool {
        let mut state = self.state.write();
        if state.visible && state.owner == Some(owner) {
            state.visible = false;
            state.content.clear();
            true
        } else {
            false
        }
    }

    pub fn is_visible(&self) -> bool {
        self.state.read().visible
    }

    pub fn state(&self) -> TooltipState {
        self.state.read().clone()
    }

    /// Whether two handles point at the same tooltip.
    pub fn same_as(&self, other: &TooltipOverlay) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}
