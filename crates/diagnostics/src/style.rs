//! Presentation style for diagnostic plots.
//!
//! Figures compare simulations at several resolutions; each resolution tag
//! has a fixed line style, opacity and legend label so the same run looks the
//! same in every figure. The tables are plain configuration, loadable from
//! YAML, with built-in defaults for the standard resolution tags.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Line style, opacity and label tables keyed by resolution tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationStyle {
    /// Matplotlib-style line style per resolution.
    pub linestyles: BTreeMap<String, String>,
    pub alphas: BTreeMap<String, f64>,
    pub labels: BTreeMap<String, String>,
    /// strftime pattern for time axis ticks.
    pub time_format: String,
}

impl Default for PresentationStyle {
    fn default() -> Self {
        let linestyles = [
            ("km1p1", "-"),
            ("km2p2", "--"),
            ("km4p4", "-."),
            ("D100m_150m", "-"),
            ("D100m_300m", "--"),
            ("D100m_500m", "-."),
        ];
        let alphas = [
            ("km1p1", 1.0),
            ("km2p2", 1.0),
            ("km4p4", 1.0),
            ("D100m_150m", 0.5),
            ("D100m_300m", 0.5),
            ("D100m_500m", 0.5),
        ];
        // Short tags are used in diagnostic file names.
        let labels = [
            ("D100m_150m", "150 m"),
            ("D100m_300m", "300 m"),
            ("D100m_500m", "500 m"),
            ("km1p1", "1.1 km"),
            ("km2p2", "2.2 km"),
            ("km4p4", "4.4 km"),
            ("150m", "150 m"),
            ("300m", "300 m"),
            ("500m", "500 m"),
            ("1p1km", "1.1 km"),
            ("2p2km", "2.2 km"),
            ("4p4km", "4.4 km"),
        ];

        Self {
            linestyles: linestyles
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            alphas: alphas.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            time_format: "%HZ".to_string(),
        }
    }
}

impl PresentationStyle {
    /// Load a style from YAML. Tables given in the document replace the
    /// built-in ones entirely.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Line style for a resolution, solid when not listed.
    pub fn linestyle(&self, resolution: &str) -> &str {
        self.linestyles
            .get(resolution)
            .map(String::as_str)
            .unwrap_or("-")
    }

    /// Opacity for a resolution, opaque when not listed.
    pub fn alpha(&self, resolution: &str) -> f64 {
        self.alphas.get(resolution).copied().unwrap_or(1.0)
    }

    /// Legend label for a resolution, the tag itself when not listed.
    pub fn label<'a>(&'a self, resolution: &'a str) -> &'a str {
        self.labels
            .get(resolution)
            .map(String::as_str)
            .unwrap_or(resolution)
    }

    pub fn format_time(&self, time: DateTime<Utc>) -> String {
        time.format(&self.time_format).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let style = PresentationStyle::default();
        assert_eq!(style.linestyle("km2p2"), "--");
        assert_eq!(style.linestyle("D100m_500m"), "-.");
        assert_eq!(style.alpha("D100m_150m"), 0.5);
        assert_eq!(style.alpha("km4p4"), 1.0);
        assert_eq!(style.label("km1p1"), "1.1 km");
        assert_eq!(style.label("300m"), "300 m");
    }

    #[test]
    fn test_unknown_resolution_fallbacks() {
        let style = PresentationStyle::default();
        assert_eq!(style.linestyle("km8p8"), "-");
        assert_eq!(style.alpha("km8p8"), 1.0);
        assert_eq!(style.label("km8p8"), "km8p8");
    }

    #[test]
    fn test_from_yaml_overrides_tables() {
        let yaml = r#"
linestyles:
  km1p1: ":"
time_format: "%d %HZ"
"#;
        let style = PresentationStyle::from_yaml(yaml).unwrap();
        assert_eq!(style.linestyle("km1p1"), ":");
        assert_eq!(style.linestyle("km2p2"), "-");
        // Tables not given keep their defaults.
        assert_eq!(style.label("km2p2"), "2.2 km");

        let time = Utc.with_ymd_and_hms(2020, 2, 2, 6, 0, 0).unwrap();
        assert_eq!(style.format_time(time), "02 06Z");
    }

    #[test]
    fn test_default_time_format() {
        let time = Utc.with_ymd_and_hms(2020, 2, 2, 18, 0, 0).unwrap();
        assert_eq!(PresentationStyle::default().format_time(time), "18Z");
    }
}
