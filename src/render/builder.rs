use std::collections::BTreeMap;

use super::{
    Container, NodeId, NodeRole, NodeStyle, OwnerId, SceneLayer, SceneNode, Shape, Transition,
};

/// One node waiting to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraft {
    layer: SceneLayer,
    role: NodeRole,
    shape: Shape,
    style: NodeStyle,
    transition: Option<Transition>,
}

impl NodeDraft {
    #[must_use]
    pub fn new(layer: SceneLayer, shape: Shape) -> Self {
        Self {
            layer,
            role: NodeRole::Decoration,
            shape,
            style: NodeStyle::default(),
            transition: None,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.style.opacity = opacity;
        self
    }

    #[must_use]
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }
}

/// Collects one render pass's nodes and appends them grouped by layer.
///
/// Charts may emit nodes in any order; the committed scene is always
/// background, grid, axes, marks, labels, legend.
#[derive(Debug)]
pub struct SceneBuilder {
    container: Container,
    owner: OwnerId,
    layers: BTreeMap<SceneLayer, Vec<SceneNode>>,
}

impl SceneBuilder {
    #[must_use]
    pub fn new(container: &Container, owner: OwnerId) -> Self {
        Self {
            container: container.clone(),
            owner,
            layers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn add(&mut self, draft: NodeDraft) -> NodeId {
        let id = self.container.allocate_node_id();
        self.layers.entry(draft.layer).or_default().push(SceneNode {
            id,
            owner: Some(self.owner),
            layer: draft.layer,
            role: draft.role,
            shape: draft.shape,
            style: draft.style,
            transition: draft.transition,
        });
        id
    }

    /// Adds a text node unless its text is empty.
    ///
    /// Translators and formatters may return `""`; such labels are skipped
    /// instead of producing a node that fails validation.
    pub fn add_text(&mut self, draft: NodeDraft) -> Option<NodeId> {
        if draft.shape.is_blank_text() {
            return None;
        }
        Some(self.add(draft))
    }

    /// Shorthand for an undecorated node.
    pub fn add_shape(&mut self, layer: SceneLayer, shape: Shape) -> NodeId {
        self.add(NodeDraft::new(layer, shape))
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Appends all pending nodes to the container; returns how many were added.
    pub fn commit(self) -> usize {
        let mut count = 0;
        for (_, nodes) in self.layers {
            for node in nodes {
                self.container.append(node);
                count += 1;
            }
        }
        count
    }

    /// Like `commit`, but slots each node after existing nodes of its layer.
    ///
    /// Used by incremental updates that add marks to a scene already on screen.
    pub fn commit_into_layers(self) -> usize {
        let mut count = 0;
        for (_, nodes) in self.layers {
            for node in nodes {
                self.container.insert_in_layer(node);
                count += 1;
            }
        }
        count
    }
}
