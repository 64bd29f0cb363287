use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer, Shape};

/// Headless renderer used by tests.
///
/// It still validates frame content so tests catch invalid geometry that a
/// real backend would choke on.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_node_count: usize,
    pub last_text_count: usize,
    pub last_mark_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.last_node_count = frame.nodes.len();
        self.last_text_count = frame
            .nodes
            .iter()
            .filter(|node| matches!(node.shape, Shape::Text(_)))
            .count();
        self.last_mark_count = frame.marks().count();
        Ok(())
    }
}
