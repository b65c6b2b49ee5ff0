//! Deployment settings for the bundled layouts.
//!
//! Defaults are embedded in the binary via `include_str!`. A JSON file given
//! at runtime is layered on top: any field it sets replaces the default,
//! nested objects are merged key by key, and everything else falls back.

use std::fs;
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{GrammarError, Result};
use crate::grammar::RatioRange;
use crate::layouts::garden::GardenKind;
use crate::layouts::planting::PlantingKind;

const DEFAULT_GARDEN_JSON: &str = include_str!("../data/defaults/garden.json");
const DEFAULT_PLANTING_JSON: &str = include_str!("../data/defaults/planting.json");

/// One entry of a weighted kind list.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightedKind<K> {
    pub kind: K,
    /// Relative weight; must be positive.
    pub weight: f64,
}

/// A feature embedded into parcels above a minimum size.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsetFeature {
    /// Both sides of the parcel must exceed this.
    pub min_parcel_size: f64,
    /// Gap between the parcel edge and the feature.
    pub margin: f64,
}

/// Treasure hidden in large grass parcels.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreasureConfig {
    /// Chance that a large grass parcel hides a treasure.
    pub chance: f64,
    /// Both sides of the parcel must exceed this.
    pub min_parcel_size: f64,
    /// Gap between the parcel edge and the treasure.
    pub margin: f64,
}

/// Outcome weights for a parcel. Must sum to one.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParcelWeights {
    /// Pond inset, or forest when the parcel is too small.
    pub pond: f64,
    /// Forest filling the parcel.
    pub forest: f64,
    /// Flower garden filling the parcel.
    pub flower_garden: f64,
    /// Fountain inset, or grass when the parcel is too small.
    pub fountain: f64,
    /// Bench area filling the parcel.
    pub bench_area: f64,
    /// Grass, possibly hiding a treasure.
    pub grass: f64,
}

/// Settings for the garden layout.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GardenConfig {
    /// Regions with either side below this become terminal.
    pub min_dim: f64,
    /// Regions this many levels below the root become terminal.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Width of the path dividing the root. Must be below `min_dim`.
    pub path_width: f64,
    /// Share of the non-path extent given to the first zone.
    pub corridor_ratio: RatioRange,
    /// Share of a zone given to its first half.
    pub split_ratio: RatioRange,
    /// Zones keep splitting while either side exceeds this.
    pub min_zone_size: f64,
    /// Pond embedded in large parcels.
    pub pond: InsetFeature,
    /// Fountain embedded in large parcels.
    pub fountain: InsetFeature,
    pub treasure: TreasureConfig,
    /// How a parcel settles.
    pub parcel_weights: ParcelWeights,
    /// Terminal kinds that undersized regions become.
    pub safeguard: Vec<WeightedKind<GardenKind>>,
}

impl GardenConfig {
    /// The embedded defaults.
    pub fn defaults() -> Result<Self> {
        layered(DEFAULT_GARDEN_JSON, None)
    }

    /// Defaults overridden by the JSON file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let overrides = fs::read_to_string(path)?;
        debug!("Loading garden config from {}", path.display());
        layered(DEFAULT_GARDEN_JSON, Some(&overrides))
    }

    /// Defaults overridden by a JSON string.
    pub fn from_json_overrides(overrides: &str) -> Result<Self> {
        layered(DEFAULT_GARDEN_JSON, Some(overrides))
    }

    pub fn validate(&self) -> Result<()> {
        positive("min_dim", self.min_dim)?;
        positive("path_width", self.path_width)?;
        positive("min_zone_size", self.min_zone_size)?;
        // A root too small for the path is caught by the size safeguard
        // before the corridor split runs.
        if self.path_width >= self.min_dim {
            return Err(GrammarError::Config(format!(
                "path_width {} must be smaller than min_dim {}",
                self.path_width, self.min_dim
            )));
        }
        non_negative("pond.margin", self.pond.margin)?;
        non_negative("fountain.margin", self.fountain.margin)?;
        non_negative("treasure.margin", self.treasure.margin)?;
        if !(0.0..=1.0).contains(&self.treasure.chance) {
            return Err(GrammarError::Config(format!(
                "treasure.chance {} must lie in [0, 1]",
                self.treasure.chance
            )));
        }
        // An embed is only attempted when both sides exceed the parcel
        // minimum, so that minimum must leave room for the margins.
        for (name, feature) in [("pond", &self.pond), ("fountain", &self.fountain)] {
            if feature.min_parcel_size < 2.0 * feature.margin {
                return Err(GrammarError::Config(format!(
                    "{name}.min_parcel_size {} is smaller than twice its margin",
                    feature.min_parcel_size
                )));
            }
        }
        if self.treasure.min_parcel_size < 2.0 * self.treasure.margin {
            return Err(GrammarError::Config(
                "treasure.min_parcel_size is smaller than twice its margin".to_string(),
            ));
        }
        if self.safeguard.is_empty() {
            return Err(GrammarError::Config("safeguard needs at least one kind".to_string()));
        }
        Ok(())
    }
}

/// Settings for the planting layout.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantingConfig {
    /// Beds with either side below this become terminal.
    pub min_dim: f64,
    /// Beds this many levels below the root become terminal.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Share of a bed given to its first half.
    pub split_ratio: RatioRange,
    /// Beds stopped by `max_depth` keep their kind. Undersized beds are
    /// always replaced with a safeguard kind.
    #[serde(default)]
    pub keep_kinds_at_max_depth: bool,
    /// Terminal kinds that undersized beds become.
    pub safeguard: Vec<WeightedKind<PlantingKind>>,
}

impl PlantingConfig {
    pub fn defaults() -> Result<Self> {
        layered(DEFAULT_PLANTING_JSON, None)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let overrides = fs::read_to_string(path)?;
        debug!("Loading planting config from {}", path.display());
        layered(DEFAULT_PLANTING_JSON, Some(&overrides))
    }

    pub fn from_json_overrides(overrides: &str) -> Result<Self> {
        layered(DEFAULT_PLANTING_JSON, Some(overrides))
    }

    pub fn validate(&self) -> Result<()> {
        positive("min_dim", self.min_dim)?;
        if self.safeguard.is_empty() {
            return Err(GrammarError::Config("safeguard needs at least one kind".to_string()));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GrammarError::Config(format!("{name} {value} must be positive")))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GrammarError::Config(format!("{name} {value} must be non-negative")))
    }
}

/// Parse `defaults`, merge `overrides` over it, then deserialize.
fn layered<T: DeserializeOwned>(defaults: &str, overrides: Option<&str>) -> Result<T> {
    let mut base: Value = serde_json::from_str(defaults)?;
    if let Some(overrides) = overrides {
        let top: Value = serde_json::from_str(overrides)?;
        if !top.is_object() {
            return Err(GrammarError::Config(
                "config file must contain a JSON object".to_string(),
            ));
        }
        merge(&mut base, top);
    }
    Ok(serde_json::from_value(base)?)
}

/// Objects merge key by key; anything else replaces the base value.
fn merge(base: &mut Value, top: Value) {
    match (base, top) {
        (Value::Object(base), Value::Object(top)) => {
            for (key, value) in top {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, top) => *base = top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse_and_validate() {
        let garden = GardenConfig::defaults().unwrap();
        garden.validate().unwrap();
        assert_eq!(garden.min_dim, 60.0);
        assert_eq!(garden.path_width, 50.0);
        assert_eq!(garden.safeguard[0].kind, GardenKind::Grass);

        let planting = PlantingConfig::defaults().unwrap();
        planting.validate().unwrap();
        assert_eq!(planting.max_depth, Some(6));
    }

    #[test]
    fn test_overrides_merge_nested_fields() {
        let config = GardenConfig::from_json_overrides(
            r#"{ "path_width": 30.0, "pond": { "margin": 15.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.path_width, 30.0);
        assert_eq!(config.pond.margin, 15.0);
        // Untouched sibling keeps its default.
        assert_eq!(config.pond.min_parcel_size, 150.0);
        assert_eq!(config.min_dim, 60.0);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = GardenConfig::from_json_overrides(r#"{ "path_widht": 30.0 }"#).unwrap_err();
        assert!(matches!(err, GrammarError::Json(_)));
    }

    #[test]
    fn test_unknown_nested_fields_rejected() {
        for overrides in [
            r#"{ "pond": { "margn": 5.0 } }"#,
            r#"{ "treasure": { "chanse": 0.5 } }"#,
            r#"{ "parcel_weights": { "lake": 0.1 } }"#,
        ] {
            let err = GardenConfig::from_json_overrides(overrides).unwrap_err();
            assert!(matches!(err, GrammarError::Json(_)), "{overrides} accepted");
        }
        let err = PlantingConfig::from_json_overrides(r#"{ "safeguard": [{ "kind": "Grass", "wieght": 1.0 }] }"#)
            .unwrap_err();
        assert!(matches!(err, GrammarError::Json(_)));
    }

    #[test]
    fn test_path_must_be_narrower_than_min_dim() {
        let config = GardenConfig::from_json_overrides(r#"{ "min_dim": 30.0 }"#).unwrap();
        assert!(matches!(config.validate(), Err(GrammarError::Config(_))));

        let config = GardenConfig::from_json_overrides(r#"{ "min_dim": 30.0, "path_width": 20.0 }"#).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_non_object_rejected() {
        let err = PlantingConfig::from_json_overrides("[1, 2]").unwrap_err();
        assert!(matches!(err, GrammarError::Config(_)));
    }

    #[test]
    fn test_validation_catches_bad_values() {
        let config = GardenConfig::from_json_overrides(r#"{ "min_dim": 0.0 }"#).unwrap();
        assert!(config.validate().is_err());

        let config = GardenConfig::from_json_overrides(r#"{ "treasure": { "chance": 1.5 } }"#).unwrap();
        assert!(config.validate().is_err());

        let config =
            GardenConfig::from_json_overrides(r#"{ "pond": { "min_parcel_size": 30.0 } }"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = GardenConfig::load_from(Path::new("/nonexistent/garden.json")).unwrap_err();
        assert!(matches!(err, GrammarError::Io(_)));
    }
}
