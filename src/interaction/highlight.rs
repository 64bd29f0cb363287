use serde::{Deserialize, Serialize};

/// Opacity applied to marks that do not match the hovered key.
pub const DIM_OPACITY: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HighlightState {
    #[default]
    Idle,
    Hovered { key: String },
}

/// Per-chart `idle -> hovered(key) -> idle` machine.
///
/// Mark hover and legend hover both drive it through the shared key, so the
/// two stay in sync without knowing about each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightController {
    state: HighlightState,
    dim_opacity: f64,
}

impl Default for HighlightController {
    fn default() -> Self {
        Self::new(DIM_OPACITY)
    }
}

impl HighlightController {
    #[must_use]
    pub fn new(dim_opacity: f64) -> Self {
        let dim_opacity = if dim_opacity.is_finite() {
            dim_opacity.clamp(0.0, 1.0)
        } else {
            DIM_OPACITY
        };
        Self {
            state: HighlightState::Idle,
            dim_opacity,
        }
    }

    #[must_use]
    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    #[must_use]
    pub fn hovered_key(&self) -> Option<&str> {
        match &self.state {
            HighlightState::Idle => None,
            HighlightState::Hovered { key } => Some(key),
        }
    }

    /// Returns `true` when the state changed.
    pub fn enter(&mut self, key: &str) -> bool {
        if self.hovered_key() == Some(key) {
            return false;
        }
        self.state = HighlightState::Hovered {
            key: key.to_owned(),
        };
        true
    }

    /// Returns `true` when the state changed.
    pub fn leave(&mut self) -> bool {
        if self.state == HighlightState::Idle {
            return false;
        }
        self.state = HighlightState::Idle;
        true
    }

    /// Opacity a mark of `group` should show given its resting `base`.
    #[must_use]
    pub fn opacity_for(&self, group: &str, base: f64) -> f64 {
        match &self.state {
            HighlightState::Idle => base,
            HighlightState::Hovered { key } if key == group => 1.0,
            HighlightState::Hovered { .. } => self.dim_opacity.min(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hovered_key_dims_others() {
        let mut controller = HighlightController::default();
        assert!(controller.enter("BE001"));
        assert!(!controller.enter("BE001"));
        assert_eq!(controller.opacity_for("BE001", 0.7), 1.0);
        assert_eq!(controller.opacity_for("BE002", 0.7), DIM_OPACITY);
        assert!(controller.leave());
        assert_eq!(controller.opacity_for("BE002", 0.7), 0.7);
        assert!(!controller.leave());
    }
}
