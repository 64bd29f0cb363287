use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::charts::{
    BarChartConfig, BubbleChartConfig, DonutChartConfig, DumbbellChartConfig, LineChartConfig,
    LiveBarConfig, MultiBandChartConfig, ParallelChartConfig, RadialChartConfig,
};
use crate::error::{ChartError, ChartResult};
use crate::render::ExportSettings;

pub const GALLERY_CONFIG_JSON_SCHEMA_V1: u32 = 1;

/// Settings for every chart on a gallery page.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub bar: BarChartConfig,
    pub live_bar: LiveBarConfig,
    pub line: LineChartConfig,
    pub donut: DonutChartConfig,
    pub multi_band: MultiBandChartConfig,
    pub dumbbell: DumbbellChartConfig,
    pub bubble: BubbleChartConfig,
    pub parallel: ParallelChartConfig,
    pub radial: RadialChartConfig,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: GalleryConfig,
}

impl GalleryConfig {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        let payload = GalleryConfigJsonContractV1 {
            schema_version: GALLERY_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload)
            .map_err(|e| {
                ChartError::InvalidData(format!("failed to serialize gallery config v1: {e}"))
            })
    }

    /// Parses a versioned document; a bare config object is accepted too.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let value: serde_json::Value = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse gallery config json: {e}"))
        })?;
        if value.get("schema_version").is_none() {
            debug!("gallery config without schema version; reading bare object");
            return serde_json::from_value(value).map_err(|e| {
                ChartError::InvalidData(format!("failed to parse gallery config: {e}"))
            });
        }

        let payload: GalleryConfigJsonContractV1 = serde_json::from_value(value).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse gallery config payload: {e}"))
        })?;
        if payload.schema_version != GALLERY_CONFIG_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported gallery config schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.config)
    }
}
