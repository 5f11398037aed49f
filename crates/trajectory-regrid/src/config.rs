//! Configuration for trajectory regridding.

use serde::{Deserialize, Serialize};

/// Default field used as the large-grid source when building the window.
pub const DEFAULT_REFERENCE_FIELD: &str = "atmosphere_boundary_layer_thickness";

/// Mean Earth radius in kilometres.
pub const DEFAULT_EARTH_RADIUS_KM: f64 = 6371.0;

/// Configuration for building the window and regridding onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegridConfig {
    /// Field whose grid is cut down to the window on the first frame.
    pub reference_field: String,

    /// Fields dropped by name from the regridded output.
    pub excluded_fields: Vec<String>,

    /// What to do when the circular selection keeps no points.
    pub empty_selection: EmptySelectionPolicy,

    /// Fraction of a target cell that may lack valid source data before
    /// the cell is masked (0 masks any partially covered cell).
    pub mdtol: f64,

    /// Earth radius for great-circle distances.
    pub earth_radius_km: f64,
}

impl Default for RegridConfig {
    fn default() -> Self {
        Self {
            reference_field: DEFAULT_REFERENCE_FIELD.to_string(),
            excluded_fields: vec!["longitude".to_string(), "latitude".to_string()],
            empty_selection: EmptySelectionPolicy::Fail,
            mdtol: 0.0,
            earth_radius_km: DEFAULT_EARTH_RADIUS_KM,
        }
    }
}

impl RegridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("REGRID_REFERENCE_FIELD") {
            if !val.is_empty() {
                config.reference_field = val;
            }
        }

        let half_width = std::env::var("REGRID_MIN_HALF_WIDTH")
            .ok()
            .and_then(|v| v.parse().ok());

        if let Ok(val) = std::env::var("REGRID_EMPTY_SELECTION") {
            config.empty_selection = EmptySelectionPolicy::from_str(&val, half_width);
        }

        if let Ok(val) = std::env::var("REGRID_MDTOL") {
            if let Ok(mdtol) = val.parse() {
                config.mdtol = mdtol;
            }
        }

        if let Ok(val) = std::env::var("REGRID_EARTH_RADIUS_KM") {
            if let Ok(radius) = val.parse() {
                config.earth_radius_km = radius;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.reference_field.is_empty() {
            return Err("reference_field must not be empty".to_string());
        }

        if !(0.0..=1.0).contains(&self.mdtol) {
            return Err("mdtol must be between 0 and 1".to_string());
        }

        if !(self.earth_radius_km > 0.0) {
            return Err("earth_radius_km must be > 0".to_string());
        }

        if let EmptySelectionPolicy::Clamp { min_half_width } = self.empty_selection {
            if min_half_width == 0 {
                return Err("empty_selection clamp needs min_half_width >= 1".to_string());
            }
        }

        Ok(())
    }
}

/// Handling of a circular selection that contains no grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum EmptySelectionPolicy {
    /// Abort with an empty-geometry error.
    Fail,
    /// Fall back to the grid point nearest the centre, widened by
    /// `min_half_width` points on each side and clipped to the domain.
    Clamp { min_half_width: usize },
}

impl Default for EmptySelectionPolicy {
    fn default() -> Self {
        Self::Fail
    }
}

impl EmptySelectionPolicy {
    /// Parse from string (case-insensitive); unknown values map to `Fail`.
    pub fn from_str(s: &str, half_width: Option<usize>) -> Self {
        match s.to_lowercase().as_str() {
            "clamp" => Self::Clamp {
                min_half_width: half_width.unwrap_or(1),
            },
            _ => Self::Fail,
        }
    }
}

impl std::fmt::Display for EmptySelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Clamp { min_half_width } => write!(f, "clamp({})", min_half_width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegridConfig::default();
        assert_eq!(config.reference_field, DEFAULT_REFERENCE_FIELD);
        assert_eq!(config.empty_selection, EmptySelectionPolicy::Fail);
        assert_eq!(config.excluded_fields, vec!["longitude", "latitude"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RegridConfig::default();
        config.mdtol = 1.5;
        assert!(config.validate().is_err());

        config = RegridConfig::default();
        config.earth_radius_km = 0.0;
        assert!(config.validate().is_err());

        config = RegridConfig::default();
        config.empty_selection = EmptySelectionPolicy::Clamp { min_half_width: 0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_selection_from_str() {
        assert_eq!(
            EmptySelectionPolicy::from_str("CLAMP", Some(3)),
            EmptySelectionPolicy::Clamp { min_half_width: 3 }
        );
        assert_eq!(
            EmptySelectionPolicy::from_str("clamp", None),
            EmptySelectionPolicy::Clamp { min_half_width: 1 }
        );
        assert_eq!(
            EmptySelectionPolicy::from_str("anything", None),
            EmptySelectionPolicy::Fail
        );
    }

    #[test]
    fn test_config_from_yaml_like_json() {
        let config: RegridConfig = serde_json::from_str(
            r#"{"mdtol": 0.5, "empty_selection": {"policy": "clamp", "min_half_width": 2}}"#,
        )
        .unwrap();
        assert_eq!(config.mdtol, 0.5);
        assert_eq!(
            config.empty_selection,
            EmptySelectionPolicy::Clamp { min_half_width: 2 }
        );
        assert_eq!(config.reference_field, DEFAULT_REFERENCE_FIELD);
    }
}
