//! Planting layout: quartered beds mixed from flowers, trees and water.
//!
//! The root is quartered into four distinct beds. Every bed then keeps
//! splitting in two, each half drawing a new kind from its bed's palette,
//! until the depth limit or the minimum size stops it. Beds stopped by the
//! depth limit keep their kind; undersized beds turn to grass.

use serde::Deserialize;

use crate::config::PlantingConfig;
use crate::error::Result;
use crate::grammar::{
    AxisChoice, EngineConfig, GrammarEngine, RuleAction, RuleTable, Safeguard, SubsetSplit,
};
use crate::region::RegionKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum PlantingKind {
    Root,
    FlowerGarden,
    FlowerRed,
    FlowerPink,
    FlowerOrange,
    FlowerBlue,
    FlowerPurple,
    Forest,
    ForestT1,
    ForestT2,
    ForestT3,
    ForestT4,
    Pond,
    Fountain,
    Grass,
}

impl RegionKind for PlantingKind {
    const ALL: &'static [Self] = &[
        PlantingKind::Root,
        PlantingKind::FlowerGarden,
        PlantingKind::FlowerRed,
        PlantingKind::FlowerPink,
        PlantingKind::FlowerOrange,
        PlantingKind::FlowerBlue,
        PlantingKind::FlowerPurple,
        PlantingKind::Forest,
        PlantingKind::ForestT1,
        PlantingKind::ForestT2,
        PlantingKind::ForestT3,
        PlantingKind::ForestT4,
        PlantingKind::Pond,
        PlantingKind::Fountain,
        PlantingKind::Grass,
    ];

    fn name(&self) -> &'static str {
        match self {
            PlantingKind::Root => "Root",
            PlantingKind::FlowerGarden => "FlowerGarden",
            PlantingKind::FlowerRed => "FlowerRed",
            PlantingKind::FlowerPink => "FlowerPink",
            PlantingKind::FlowerOrange => "FlowerOrange",
            PlantingKind::FlowerBlue => "FlowerBlue",
            PlantingKind::FlowerPurple => "FlowerPurple",
            PlantingKind::Forest => "Forest",
            PlantingKind::ForestT1 => "ForestT1",
            PlantingKind::ForestT2 => "ForestT2",
            PlantingKind::ForestT3 => "ForestT3",
            PlantingKind::ForestT4 => "ForestT4",
            PlantingKind::Pond => "Pond",
            PlantingKind::Fountain => "Fountain",
            PlantingKind::Grass => "Grass",
        }
    }
}

const ROOT_BEDS: [PlantingKind; 4] = [
    PlantingKind::FlowerGarden,
    PlantingKind::Forest,
    PlantingKind::Fountain,
    PlantingKind::Pond,
];

const FLOWERS: [PlantingKind; 5] = [
    PlantingKind::FlowerBlue,
    PlantingKind::FlowerOrange,
    PlantingKind::FlowerPink,
    PlantingKind::FlowerPurple,
    PlantingKind::FlowerRed,
];

const WOODLAND: [PlantingKind; 6] = [
    PlantingKind::ForestT1,
    PlantingKind::ForestT2,
    PlantingKind::ForestT3,
    PlantingKind::ForestT4,
    PlantingKind::Pond,
    PlantingKind::FlowerBlue,
];

const WATERSIDE: [PlantingKind; 2] = [PlantingKind::Pond, PlantingKind::ForestT1];

pub fn rule_table(config: &PlantingConfig) -> Result<RuleTable<PlantingKind>> {
    RuleTable::from_fn(|kind| rule_for(kind, config))
}

pub fn engine(config: &PlantingConfig) -> Result<GrammarEngine<PlantingKind>> {
    config.validate()?;
    let safeguard = Safeguard::weighted(
        config
            .safeguard
            .iter()
            .map(|entry| (entry.weight, entry.kind))
            .collect(),
    )?;
    let mut settings = EngineConfig::new(
        PlantingKind::Root,
        config.min_dim,
        safeguard,
        PlantingKind::Grass,
    );
    settings.max_depth = config.max_depth;
    settings.keep_kind_at_max_depth = config.keep_kinds_at_max_depth;
    GrammarEngine::new(rule_table(config)?, settings)
}

fn rule_for(kind: PlantingKind, config: &PlantingConfig) -> RuleAction<PlantingKind> {
    let halves = |palette: &[PlantingKind]| RuleAction::ChooseSubset {
        candidates: palette.to_vec(),
        split: SubsetSplit::Two {
            axis: AxisChoice::Random,
            ratio: config.split_ratio,
        },
    };

    match kind {
        PlantingKind::Root => RuleAction::ChooseSubset {
            candidates: ROOT_BEDS.to_vec(),
            split: SubsetSplit::Four,
        },
        PlantingKind::FlowerGarden
        | PlantingKind::FlowerRed
        | PlantingKind::FlowerPink
        | PlantingKind::FlowerOrange
        | PlantingKind::FlowerBlue
        | PlantingKind::FlowerPurple => halves(&FLOWERS),
        PlantingKind::Forest
        | PlantingKind::ForestT1
        | PlantingKind::ForestT2
        | PlantingKind::ForestT3
        | PlantingKind::ForestT4 => halves(&WOODLAND),
        PlantingKind::Pond => halves(&WATERSIDE),
        PlantingKind::Fountain | PlantingKind::Grass => RuleAction::Terminal,
    }
}
