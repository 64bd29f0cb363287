use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::Viewport;

use super::{RenderFrame, Shape, Transition};

/// Stable identity of one node inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Identity of the render pass that created a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

/// Stacking groups, drawn back to front in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SceneLayer {
    Background,
    Grid,
    Axis,
    Marks,
    Labels,
    Legend,
}

impl SceneLayer {
    pub const ALL: [Self; 6] = [
        Self::Background,
        Self::Grid,
        Self::Axis,
        Self::Marks,
        Self::Labels,
        Self::Legend,
    ];
}

/// What a node means to the chart that drew it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    Decoration,
    /// Hoverable data encoding; `group` is the key shared with its legend entry.
    Mark { key: String, group: String },
    Label,
    LegendEntry { key: String },
}

impl NodeRole {
    #[must_use]
    pub fn mark(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::Mark {
            group: key.clone(),
            key,
        }
    }

    #[must_use]
    pub fn mark_in_group(key: impl Into<String>, group: impl Into<String>) -> Self {
        Self::Mark {
            key: key.into(),
            group: group.into(),
        }
    }

    #[must_use]
    pub fn is_mark(&self) -> bool {
        matches!(self, Self::Mark { .. })
    }
}

/// Mutable presentation state toggled by interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub opacity: f64,
    /// Replaces the shape's own stroke width while set.
    pub stroke_width: Option<f64>,
    pub glow: bool,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            stroke_width: None,
            glow: false,
        }
    }
}

impl NodeStyle {
    #[must_use]
    pub fn with_opacity(opacity: f64) -> Self {
        Self {
            opacity,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    /// `None` for nodes placed by the host page.
    pub owner: Option<OwnerId>,
    pub layer: SceneLayer,
    pub role: NodeRole,
    pub shape: Shape,
    pub style: NodeStyle,
    pub transition: Option<Transition>,
}

#[derive(Debug)]
struct ContainerState {
    viewport: Viewport,
    attached: bool,
    nodes: Vec<SceneNode>,
    next_node: u64,
    next_owner: u64,
}

/// Mount point handed to render pipelines.
///
/// Cloning shares the same scene. Node order is paint order.
#[derive(Debug, Clone)]
pub struct Container {
    state: Rc<RefCell<ContainerState>>,
}

impl Container {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: Rc::new(RefCell::new(ContainerState {
                viewport,
                attached: true,
                nodes: Vec::new(),
                next_node: 1,
                next_owner: 1,
            })),
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.state.borrow().viewport
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.state.borrow_mut().viewport = viewport;
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    /// Simulates the host removing the surface from the page.
    pub fn detach(&self) {
        self.state.borrow_mut().attached = false;
    }

    pub fn attach(&self) {
        self.state.borrow_mut().attached = true;
    }

    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn allocate_owner(&self) -> OwnerId {
        let mut state = self.state.borrow_mut();
        let owner = OwnerId(state.next_owner);
        state.next_owner += 1;
        owner
    }

    pub(crate) fn allocate_node_id(&self) -> NodeId {
        let mut state = self.state.borrow_mut();
        let id = NodeId(state.next_node);
        state.next_node += 1;
        id
    }

    /// Removes every node, including externally owned ones.
    pub fn clear(&self) {
        self.state.borrow_mut().nodes.clear();
    }

    pub(crate) fn append(&self, node: SceneNode) {
        self.state.borrow_mut().nodes.push(node);
    }

    /// Inserts `node` after the last node of its own layer.
    pub(crate) fn insert_in_layer(&self, node: SceneNode) {
        let mut state = self.state.borrow_mut();
        let index = state
            .nodes
            .iter()
            .rposition(|existing| existing.layer <= node.layer)
            .map_or(0, |position| position + 1);
        state.nodes.insert(index, node);
    }

    /// Adds a node owned by the host page; chart cleanup leaves it in place.
    pub fn append_external(&self, layer: SceneLayer, shape: Shape) -> NodeId {
        let id = self.allocate_node_id();
        self.append(SceneNode {
            id,
            owner: None,
            layer,
            role: NodeRole::Decoration,
            shape,
            style: NodeStyle::default(),
            transition: None,
        });
        id
    }

    /// Removes every node created by `owner`; returns how many were removed.
    pub fn remove_owned(&self, owner: OwnerId) -> usize {
        let mut state = self.state.borrow_mut();
        let before = state.nodes.len();
        state.nodes.retain(|node| node.owner != Some(owner));
        let removed = before - state.nodes.len();
        trace!(owner = owner.0, removed, "remove owned nodes");
        removed
    }

    pub fn remove_node(&self, id: NodeId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.nodes.len();
        state.nodes.retain(|node| node.id != id);
        before != state.nodes.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().nodes.is_empty()
    }

    #[must_use]
    pub fn owned_count(&self, owner: OwnerId) -> usize {
        self.state
            .borrow()
            .nodes
            .iter()
            .filter(|node| node.owner == Some(owner))
            .count()
    }

    #[must_use]
    pub fn mark_count(&self) -> usize {
        self.state
            .borrow()
            .nodes
            .iter()
            .filter(|node| node.role.is_mark())
            .count()
    }

    /// Snapshot of all nodes in paint order.
    #[must_use]
    pub fn nodes(&self) -> Vec<SceneNode> {
        self.state.borrow().nodes.clone()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<SceneNode> {
        self.state
            .borrow()
            .nodes
            .iter()
            .find(|node| node.id == id)
            .cloned()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.state.borrow().nodes.iter().any(|node| node.id == id)
    }

    /// Index of `id` in paint order.
    #[must_use]
    pub fn paint_index(&self, id: NodeId) -> Option<usize> {
        self.state.borrow().nodes.iter().position(|node| node.id == id)
    }

    pub fn with_node_mut<R>(&self, id: NodeId, f: impl FnOnce(&mut SceneNode) -> R) -> Option<R> {
        let mut state = self.state.borrow_mut();
        state.nodes.iter_mut().find(|node| node.id == id).map(f)
    }

    /// Moves `id` to the top of its layer so it paints above its siblings.
    pub fn raise(&self, id: NodeId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(index) = state.nodes.iter().position(|node| node.id == id) else {
            return false;
        };
        let node = state.nodes.remove(index);
        let insert_at = state
            .nodes
            .iter()
            .rposition(|existing| existing.layer <= node.layer)
            .map_or(0, |position| position + 1);
        state.nodes.insert(insert_at, node);
        true
    }

    /// Backend-agnostic snapshot for renderers and exporters.
    #[must_use]
    pub fn frame(&self) -> RenderFrame {
        let state = self.state.borrow();
        RenderFrame {
            viewport: state.viewport,
            nodes: state.nodes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Color, LinePrimitive};

    fn line() -> Shape {
        Shape::Line(LinePrimitive::new(0.0, 0.0, 1.0, 1.0, 1.0, Color::rgb(0.0, 0.0, 0.0)))
    }

    #[test]
    fn raise_stays_within_layer() {
        let container = Container::new(Viewport::new(100, 100));
        let first = container.append_external(SceneLayer::Marks, line());
        let second = container.append_external(SceneLayer::Marks, line());
        let label = container.append_external(SceneLayer::Labels, line());

        assert!(container.raise(first));
        assert_eq!(container.paint_index(second), Some(0));
        assert_eq!(container.paint_index(first), Some(1));
        assert_eq!(container.paint_index(label), Some(2));
    }
}
