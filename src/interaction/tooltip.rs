use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::render::OwnerId;

use super::PointerEvent;

/// Distance between the pointer and the tooltip's top-left corner.
pub const TOOLTIP_OFFSET_PX: f64 = 12.0;
pub const TOOLTIP_FADE_MS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TooltipFade {
    In { duration_ms: u32 },
    Out { duration_ms: u32 },
}

/// Snapshot of the floating label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipState {
    pub visible: bool,
    pub html: String,
    pub x: f64,
    pub y: f64,
    pub aria_hidden: bool,
    pub fade: Option<TooltipFade>,
    /// Chart that issued the latest `show`.
    pub owner: Option<OwnerId>,
}

impl TooltipState {
    fn hidden() -> Self {
        Self {
            visible: false,
            html: String::new(),
            x: 0.0,
            y: 0.0,
            aria_hidden: true,
            fade: None,
            owner: None,
        }
    }
}

#[derive(Debug, Default)]
struct TooltipSlot {
    node: Option<TooltipState>,
    created: u32,
}

/// Page-wide tooltip shared by every mounted chart.
///
/// The node is created on first `show` and reused afterwards. Cloning the
/// handle shares the node; the most recent `show` owns it.
#[derive(Debug, Clone, Default)]
pub struct Tooltip {
    slot: Rc<RefCell<TooltipSlot>>,
}

impl Tooltip {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_node<R>(&self, f: impl FnOnce(&mut TooltipState) -> R) -> R {
        let mut slot = self.slot.borrow_mut();
        if slot.node.is_none() {
            slot.node = Some(TooltipState::hidden());
            slot.created += 1;
            trace!("tooltip node created");
        }
        let node = slot.node.get_or_insert_with(TooltipState::hidden);
        f(node)
    }

    pub fn show(&self, owner: Option<OwnerId>, html: impl Into<String>, pointer: PointerEvent) {
        let html = html.into();
        self.with_node(|node| {
            let was_visible = node.visible;
            node.html = html;
            node.x = pointer.x + TOOLTIP_OFFSET_PX;
            node.y = pointer.y + TOOLTIP_OFFSET_PX;
            node.visible = true;
            node.aria_hidden = false;
            node.owner = owner;
            if !was_visible {
                node.fade = Some(TooltipFade::In {
                    duration_ms: TOOLTIP_FADE_MS,
                });
            }
        });
    }

    /// Repositions a visible tooltip; content and fade are untouched.
    pub fn move_to(&self, pointer: PointerEvent) {
        let mut slot = self.slot.borrow_mut();
        if let Some(node) = slot.node.as_mut().filter(|node| node.visible) {
            node.x = pointer.x + TOOLTIP_OFFSET_PX;
            node.y = pointer.y + TOOLTIP_OFFSET_PX;
        }
    }

    /// Replaces content of a visible tooltip without fading.
    pub fn set_html(&self, html: impl Into<String>) {
        let mut slot = self.slot.borrow_mut();
        if let Some(node) = slot.node.as_mut().filter(|node| node.visible) {
            node.html = html.into();
        }
    }

    /// Fades the tooltip out; a no-op when it is absent or already hidden.
    pub fn hide(&self) {
        let mut slot = self.slot.borrow_mut();
        if let Some(node) = slot.node.as_mut().filter(|node| node.visible) {
            node.visible = false;
            node.aria_hidden = true;
            node.fade = Some(TooltipFade::Out {
                duration_ms: TOOLTIP_FADE_MS,
            });
        }
    }

    /// Hides only if `owner` issued the latest `show`.
    pub fn hide_for(&self, owner: OwnerId) -> bool {
        let owned = self
            .slot
            .borrow()
            .node
            .as_ref()
            .is_some_and(|node| node.visible && node.owner == Some(owner));
        if owned {
            self.hide();
        }
        owned
    }

    /// Destroys the node; the next `show` creates a fresh one.
    pub fn teardown(&self) {
        self.slot.borrow_mut().node = None;
    }

    #[must_use]
    pub fn state(&self) -> Option<TooltipState> {
        self.slot.borrow().node.clone()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.slot
            .borrow()
            .node
            .as_ref()
            .is_some_and(|node| node.visible)
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.slot.borrow().node.is_some()
    }

    /// How many times a node was created (lazily, once per teardown cycle).
    #[must_use]
    pub fn creation_count(&self) -> u32 {
        self.slot.borrow().created
    }
}
