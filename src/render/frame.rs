use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};

use super::{NodeRole, SceneLayer, SceneNode, Shape};

/// Backend-agnostic snapshot of one container, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub nodes: Vec<SceneNode>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            nodes: Vec::new(),
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for node in &self.nodes {
            node.shape.validate()?;
            if !node.style.opacity.is_finite() || !(0.0..=1.0).contains(&node.style.opacity) {
                return Err(ChartError::InvalidData(
                    "node opacity must be finite and in [0, 1]".to_owned(),
                ));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn layer_count(&self, layer: SceneLayer) -> usize {
        self.nodes.iter().filter(|node| node.layer == layer).count()
    }

    #[must_use]
    pub fn marks(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(|node| node.role.is_mark())
    }

    #[must_use]
    pub fn mark_for_key(&self, key: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| {
            matches!(&node.role, NodeRole::Mark { key: mark_key, .. } if mark_key == key)
        })
    }

    #[must_use]
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|node| match &node.shape {
            Shape::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
    }
}
