use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Runtime settings for the viewer. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub model_url: String,
    pub container_id: String,
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    /// Vertical extent of the orthographic frustum in world units.
    pub frustum_size: f64,
    pub standing_height: f64,
    /// `"3D"` or `"Floorplan"`.
    pub initial_view: String,
    pub background: u32,
    pub sky_color: u32,
    pub ground_color: u32,
    pub light_position: [f64; 3],
    pub show_edges: bool,
    pub edge_threshold_deg: f64,
    pub edge_color: u32,
    pub highlight_color: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_url: "/models/house.glb".to_string(),
            container_id: "viewer-container".to_string(),
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            frustum_size: 20.0,
            standing_height: 2.0,
            initial_view: "3D".to_string(),
            background: 0xdddddd,
            sky_color: 0xffffff,
            ground_color: 0x444444,
            light_position: [0.0, 20.0, 0.0],
            show_edges: true,
            edge_threshold_deg: 0.1,
            edge_color: 0x000000,
            highlight_color: 0xffb347,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(ConfigError::Invalid {
                field: "fov_deg",
                reason: format!("must be in (0, 180), got {}", self.fov_deg),
            });
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Invalid {
                field: "near/far",
                reason: format!("need 0 < near < far, got {} and {}", self.near, self.far),
            });
        }
        if self.frustum_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "frustum_size",
                reason: format!("must be positive, got {}", self.frustum_size),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ViewerConfig;
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_yields_defaults() {
        let config = ViewerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.fov_deg, 75.0);
        assert_eq!(config.frustum_size, 20.0);
        assert_eq!(config.background, 0xdddddd);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            ViewerConfig::from_json_str(r#"{"model_url":"/m/villa.glb","initial_view":"Floorplan"}"#)
                .unwrap();
        assert_eq!(config.model_url, "/m/villa.glb");
        assert_eq!(config.initial_view, "Floorplan");
        assert_eq!(config.standing_height, 2.0);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ViewerConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let err = ViewerConfig::from_json_str(r#"{"near":10,"far":1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "near/far", .. }));
    }
}
