//! Probabilistic subdivision grammar
//!
//! This module contains the pieces that turn a rectangle into a tree of
//! typed, non-overlapping regions:
//!
//! - Rule catalog and validated rule tables
//! - Split geometry (two-way, quarters, corridor)
//! - Feature embedding (framed features on top of a plain ground)
//! - The queue-driven engine with its minimum-size safeguard

pub mod embed;
pub mod engine;
pub mod rules;
pub mod split;

pub use embed::{embed, EmbedPair};
pub use engine::{generate, EngineConfig, Generation, GenerationStats, GrammarEngine, Safeguard};
pub use rules::{AxisChoice, Expansion, RatioRange, RuleAction, RuleTable, RuleTableBuilder, SubsetSplit};
