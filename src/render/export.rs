use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ChartError, ChartResult};

use super::{Color, Container, RenderFrame, svg::frame_to_svg};

pub const SVG_MIME: &str = "image/svg+xml";
pub const PNG_MIME: &str = "image/png";

/// Destination of an exported file (a browser download, a file, a buffer).
pub trait ExportSink {
    fn deliver(&mut self, file_name: &str, mime: &str, bytes: Vec<u8>) -> ChartResult<()>;
}

/// One delivered export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Sink that keeps every delivery in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub files: Vec<ExportedFile>,
}

impl ExportSink for MemorySink {
    fn deliver(&mut self, file_name: &str, mime: &str, bytes: Vec<u8>) -> ChartResult<()> {
        self.files.push(ExportedFile {
            file_name: file_name.to_owned(),
            mime: mime.to_owned(),
            bytes,
        });
        Ok(())
    }
}

/// Export settings captured with each handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub background: Color,
    pub pixel_ratio: f64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            background: Color::rgb(1.0, 1.0, 1.0),
            pixel_ratio: 2.0,
        }
    }
}

/// Vector and raster export for one rendered chart.
///
/// Handles read the container at call time, so exporting right after render
/// sees the final geometry without waiting for entrance transitions.
#[derive(Debug, Clone)]
pub struct ExportHandle {
    container: Container,
    file_stem: String,
    settings: ExportSettings,
}

impl ExportHandle {
    #[must_use]
    pub fn new(
        container: &Container,
        file_stem: impl Into<String>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            container: container.clone(),
            file_stem: file_stem.into(),
            settings,
        }
    }

    #[must_use]
    pub fn file_stem(&self) -> &str {
        &self.file_stem
    }

    fn current_frame(&self) -> ChartResult<RenderFrame> {
        if !self.container.is_attached() {
            warn!(file_stem = %self.file_stem, "export requested for detached container");
            return Err(ChartError::Export("container is detached".to_owned()));
        }
        let frame = self.container.frame();
        if frame.is_empty() {
            return Err(ChartError::Export("container has no content".to_owned()));
        }
        frame.validate()?;
        Ok(frame)
    }

    /// SVG markup with a solid background rect.
    pub fn to_svg(&self) -> ChartResult<String> {
        let frame = self.current_frame()?;
        Ok(frame_to_svg(&frame, Some(self.settings.background)))
    }

    pub fn export_vector(&self, sink: &mut dyn ExportSink) -> ChartResult<()> {
        let svg = self.to_svg()?;
        let file_name = format!("{}.svg", self.file_stem);
        debug!(file_name = %file_name, bytes = svg.len(), "export vector");
        sink.deliver(&file_name, SVG_MIME, svg.into_bytes())
    }

    /// PNG bytes at `pixel_ratio` over a solid background.
    #[cfg(feature = "cairo-backend")]
    pub fn to_png(&self) -> ChartResult<Vec<u8>> {
        use super::{CairoRenderer, Renderer};

        let frame = self.current_frame()?;
        let mut renderer = CairoRenderer::new(
            frame.viewport.width,
            frame.viewport.height,
            self.settings.pixel_ratio,
        )?;
        renderer.set_clear_color(self.settings.background)?;
        renderer.render(&frame)?;
        renderer.to_png_bytes()
    }

    #[cfg(not(feature = "cairo-backend"))]
    pub fn to_png(&self) -> ChartResult<Vec<u8>> {
        self.current_frame()?;
        Err(ChartError::Export(
            "raster export requires the `cairo-backend` feature".to_owned(),
        ))
    }

    pub fn export_raster(&self, sink: &mut dyn ExportSink) -> ChartResult<()> {
        let png = self.to_png()?;
        let file_name = format!("{}.png", self.file_stem);
        debug!(file_name = %file_name, bytes = png.len(), "export raster");
        sink.deliver(&file_name, PNG_MIME, png)
    }
}
