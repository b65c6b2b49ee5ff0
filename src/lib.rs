//! Procedural layout generation by recursive rectangle subdivision.
//!
//! A rule table maps each region kind to a rewrite: split it, embed a
//! feature in it, or leave it as it is. The grammar engine applies those
//! rules breadth-first from a single root rectangle and returns a tree of
//! typed regions that tiles the requested area.

pub mod config;
pub mod error;
pub mod geometry;
pub mod grammar;
pub mod layouts;
pub mod outline;
pub mod random;
pub mod region;

pub use error::{GrammarError, Result};
pub use geometry::{Axis, Rect};
pub use grammar::{generate, EngineConfig, GrammarEngine, RuleAction, RuleTable, Safeguard};
pub use random::{RandomSource, ScriptedSource};
pub use region::{Region, RegionKind, RegionState};
