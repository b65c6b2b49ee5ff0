//! Garden layout: paths, zones and parcels.
//!
//! The root is cut in two by a path. Zones keep halving across their longer
//! side until both sides fit under `min_zone_size`, then become parcels.
//! Each parcel turns into a forest, flower garden, bench area, open grass,
//! or a pond or fountain set into grass. Large grass parcels occasionally
//! hide a treasure.

use serde::Deserialize;

use crate::config::GardenConfig;
use crate::error::Result;
use crate::grammar::{AxisChoice, EngineConfig, GrammarEngine, RuleAction, RuleTable, Safeguard};
use crate::region::RegionKind;

/// Region kinds of the garden layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum GardenKind {
    /// The whole garden.
    Root,
    /// Area still being subdivided.
    Zone,
    /// Area waiting for its planting.
    Parcel,
    Grass,
    FlowerGarden,
    Forest,
    Pond,
    Path,
    Fountain,
    BenchArea,
    Treasure,
}

impl RegionKind for GardenKind {
    const ALL: &'static [Self] = &[
        GardenKind::Root,
        GardenKind::Zone,
        GardenKind::Parcel,
        GardenKind::Grass,
        GardenKind::FlowerGarden,
        GardenKind::Forest,
        GardenKind::Pond,
        GardenKind::Path,
        GardenKind::Fountain,
        GardenKind::BenchArea,
        GardenKind::Treasure,
    ];

    fn name(&self) -> &'static str {
        match self {
            GardenKind::Root => "Root",
            GardenKind::Zone => "Zone",
            GardenKind::Parcel => "Parcel",
            GardenKind::Grass => "Grass",
            GardenKind::FlowerGarden => "FlowerGarden",
            GardenKind::Forest => "Forest",
            GardenKind::Pond => "Pond",
            GardenKind::Path => "Path",
            GardenKind::Fountain => "Fountain",
            GardenKind::BenchArea => "BenchArea",
            GardenKind::Treasure => "Treasure",
        }
    }
}

/// Build the garden rule table from `config`.
pub fn rule_table(config: &GardenConfig) -> Result<RuleTable<GardenKind>> {
    RuleTable::from_fn(|kind| rule_for(kind, config))
}

/// Build a ready-to-run garden engine.
pub fn engine(config: &GardenConfig) -> Result<GrammarEngine<GardenKind>> {
    config.validate()?;
    let safeguard = Safeguard::weighted(
        config
            .safeguard
            .iter()
            .map(|entry| (entry.weight, entry.kind))
            .collect(),
    )?;
    let mut settings = EngineConfig::new(GardenKind::Root, config.min_dim, safeguard, GardenKind::Grass);
    settings.max_depth = config.max_depth;
    GrammarEngine::new(rule_table(config)?, settings)
}

fn rule_for(kind: GardenKind, config: &GardenConfig) -> RuleAction<GardenKind> {
    match kind {
        GardenKind::Root => RuleAction::SplitWithCorridor {
            axis: AxisChoice::Random,
            corridor_width: config.path_width,
            ratio: config.corridor_ratio,
            first: GardenKind::Zone,
            corridor: GardenKind::Path,
            second: GardenKind::Zone,
        },
        GardenKind::Zone => RuleAction::when_larger(
            config.min_zone_size,
            RuleAction::SplitTwo {
                axis: AxisChoice::Longer,
                ratio: config.split_ratio,
                first: GardenKind::Zone,
                second: GardenKind::Zone,
            },
            RuleAction::AddChild(GardenKind::Parcel),
        ),
        GardenKind::Parcel => parcel_rule(config),
        GardenKind::Grass
        | GardenKind::FlowerGarden
        | GardenKind::Forest
        | GardenKind::Pond
        | GardenKind::Path
        | GardenKind::Fountain
        | GardenKind::BenchArea
        | GardenKind::Treasure => RuleAction::Terminal,
    }
}

fn parcel_rule(config: &GardenConfig) -> RuleAction<GardenKind> {
    let weights = &config.parcel_weights;
    let pond = &config.pond;
    let fountain = &config.fountain;

    RuleAction::ChooseWeighted(vec![
        // Small ponds look wrong; an undersized parcel gets trees instead.
        (
            weights.pond,
            RuleAction::when_at_least(
                pond.min_parcel_size,
                pond.min_parcel_size,
                RuleAction::Embed {
                    feature: GardenKind::Pond,
                    margin: pond.margin,
                },
                RuleAction::AddChild(GardenKind::Forest),
            ),
        ),
        (weights.forest, RuleAction::AddChild(GardenKind::Forest)),
        (weights.flower_garden, RuleAction::AddChild(GardenKind::FlowerGarden)),
        (
            weights.fountain,
            RuleAction::when_at_least(
                fountain.min_parcel_size,
                fountain.min_parcel_size,
                RuleAction::Embed {
                    feature: GardenKind::Fountain,
                    margin: fountain.margin,
                },
                grass_rule(config),
            ),
        ),
        (weights.bench_area, RuleAction::AddChild(GardenKind::BenchArea)),
        (weights.grass, grass_rule(config)),
    ])
}

fn grass_rule(config: &GardenConfig) -> RuleAction<GardenKind> {
    let treasure = &config.treasure;
    RuleAction::when_at_least(
        treasure.min_parcel_size,
        treasure.min_parcel_size,
        RuleAction::ChooseWeighted(vec![
            (
                treasure.chance,
                RuleAction::Embed {
                    feature: GardenKind::Treasure,
                    margin: treasure.margin,
                },
            ),
            (1.0 - treasure.chance, RuleAction::AddChild(GardenKind::Grass)),
        ]),
        RuleAction::AddChild(GardenKind::Grass),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrammarError;
    use crate::geometry::Rect;
    use crate::grammar::Expansion;
    use crate::layouts::invariants::{assert_consistent, depth_bound};
    use crate::random::ScriptedSource;
    use crate::region::Production;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn default_engine() -> GrammarEngine<GardenKind> {
        engine(&GardenConfig::defaults().unwrap()).unwrap()
    }

    #[test]
    fn test_default_table_covers_every_kind() {
        let table = rule_table(&GardenConfig::defaults().unwrap()).unwrap();
        assert_eq!(table.len(), GardenKind::ALL.len());
        assert!(table.is_terminal(GardenKind::Path));
        assert!(!table.is_terminal(GardenKind::Parcel));
    }

    #[test]
    fn test_bad_weights_rejected() {
        let config = GardenConfig::from_json_overrides(r#"{ "parcel_weights": { "grass": 0.5 } }"#).unwrap();
        let err = rule_table(&config).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidRule { kind: "Parcel", .. }));
    }

    #[test]
    fn test_root_is_split_by_a_path() {
        let root = default_engine().generate(600.0, 600.0, 1).unwrap();
        let kinds: Vec<GardenKind> = root.children().iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![GardenKind::Zone, GardenKind::Path, GardenKind::Zone]);

        let path = root.children()[1].bounds();
        assert!(path.width == 50.0 || path.height == 50.0);
        assert!(root.children()[1].is_terminal());
    }

    #[test]
    fn test_small_parcel_pond_roll_becomes_forest() {
        let engine = default_engine();
        let parcel = engine.table().rule_for(GardenKind::Parcel).unwrap();
        let bounds = Rect::new(0.0, 0.0, 120.0, 120.0).unwrap();
        // 0.1 falls in the pond interval but 120 does not exceed 150.
        let mut src = ScriptedSource::new([0.1]);
        let expansion = parcel.resolve(&bounds, GardenKind::Grass, &mut src).unwrap();
        assert_eq!(
            expansion,
            Expansion::Partition(vec![(GardenKind::Forest, bounds)])
        );
    }

    #[test]
    fn test_all_leaves_are_final_kinds() {
        let root = default_engine().generate(900.0, 700.0, 2024).unwrap();
        for leaf in root.leaves() {
            assert!(leaf.is_terminal());
            assert!(!matches!(
                leaf.kind(),
                GardenKind::Root | GardenKind::Zone | GardenKind::Parcel
            ));
        }
    }

    #[test]
    fn test_ponds_only_in_large_parcels() {
        let engine = default_engine();
        for seed in 0..20 {
            let root = engine.generate(1200.0, 900.0, seed).unwrap();
            for region in root.walk() {
                if let Some(Production::Embed { margin }) = region.production() {
                    let feature = &region.children()[1];
                    if feature.kind() == GardenKind::Pond {
                        assert_eq!(margin, 20.0);
                        assert!(region.bounds().min_side() > 150.0);
                    }
                }
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_garden_tree_is_consistent(
            width in 20.0f64..1600.0,
            height in 20.0f64..1600.0,
            seed in any::<u64>(),
        ) {
            let engine = default_engine();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let generation = engine.run(width, height, &mut rng).unwrap();
            assert_consistent(&generation.root);
            prop_assert_eq!(generation.root.bounds().width, width);
            prop_assert_eq!(generation.root.bounds().height, height);
            prop_assert_eq!(generation.stats.iterations, generation.stats.regions - generation.stats.embeds);
            prop_assert!(generation.stats.max_depth <= depth_bound(width, height, 60.0, 0.8, GardenKind::ALL.len()));
        }

        #[test]
        fn prop_garden_is_deterministic(seed in any::<u64>()) {
            let engine = default_engine();
            let a = engine.generate(800.0, 600.0, seed).unwrap();
            let b = engine.generate(800.0, 600.0, seed).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_narrow_regions_never_expand(width in 1.0f64..60.0, seed in any::<u64>()) {
            let root = default_engine().generate(width, 800.0, seed).unwrap();
            prop_assert!(root.is_leaf());
            prop_assert_eq!(root.kind(), GardenKind::Grass);
        }
    }
}
