//! Rule catalog and rule tables.
//!
//! A rule table maps every region kind to exactly one `RuleAction`. Tables
//! are validated once when built, so a missing kind or a malformed rule is
//! reported before any generation starts.

use std::collections::{HashMap, HashSet};

use log::trace;
use serde::Deserialize;

use crate::error::{GrammarError, Result};
use crate::geometry::{Axis, Rect};
use crate::random::RandomSource;
use crate::region::RegionKind;

use super::embed::{embed, EmbedPair};
use super::split::{add_child, split_four, split_two, split_with_corridor};

/// Tolerance for weights that should sum to one.
const WEIGHT_EPSILON: f64 = 1e-6;

/// Fractional range a cut position is sampled from.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatioRange {
    /// Smallest fraction, exclusive of zero.
    pub min: f64,
    /// Largest fraction, below one.
    pub max: f64,
}

impl RatioRange {
    /// Default range for two-way splits.
    pub const SPLIT: RatioRange = RatioRange::new(0.3, 0.7);
    /// Default range for the first side of a corridor split.
    pub const CORRIDOR: RatioRange = RatioRange::new(0.2, 0.8);

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Both ends must lie strictly inside `(0, 1)` so every child is non-empty.
    pub fn is_valid(&self) -> bool {
        self.min > 0.0 && self.max < 1.0 && self.min <= self.max
    }

    pub fn sample<R: RandomSource + ?Sized>(&self, src: &mut R) -> Result<f64> {
        src.range(self.min, self.max)
    }
}

/// How a split picks its cut direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisChoice {
    Fixed(Axis),
    /// Fair coin from the random source.
    Random,
    /// Cut across the longer side: vertical when wider than tall.
    Longer,
}

impl AxisChoice {
    pub fn resolve<R: RandomSource + ?Sized>(&self, bounds: &Rect, src: &mut R) -> Result<Axis> {
        Ok(match self {
            AxisChoice::Fixed(axis) => *axis,
            AxisChoice::Random => {
                if src.chance(0.5)? {
                    Axis::Vertical
                } else {
                    Axis::Horizontal
                }
            }
            AxisChoice::Longer => {
                if bounds.width > bounds.height {
                    Axis::Vertical
                } else {
                    Axis::Horizontal
                }
            }
        })
    }
}

/// The split a `ChooseSubset` feeds its sampled kinds into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SubsetSplit {
    Two { axis: AxisChoice, ratio: RatioRange },
    Four,
}

impl SubsetSplit {
    /// How many kinds the split consumes.
    pub fn arity(&self) -> usize {
        match self {
            SubsetSplit::Two { .. } => 2,
            SubsetSplit::Four => 4,
        }
    }
}

/// What a rule does to a region of its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum RuleAction<K: RegionKind> {
    /// No further processing.
    Terminal,
    /// One child covering the full parent, tagged with the given kind.
    AddChild(K),
    /// Two children in scan order (left/right or top/bottom).
    SplitTwo {
        axis: AxisChoice,
        ratio: RatioRange,
        first: K,
        second: K,
    },
    /// Quarters at the midpoint: top-left, top-right, bottom-left, bottom-right.
    SplitFour([K; 4]),
    /// Two regions separated by a fixed-width strip.
    SplitWithCorridor {
        axis: AxisChoice,
        corridor_width: f64,
        ratio: RatioRange,
        first: K,
        corridor: K,
        second: K,
    },
    /// Pick the first branch whose cumulative interval contains a uniform draw.
    ChooseWeighted(Vec<(f64, RuleAction<K>)>),
    /// Draw distinct kinds without replacement and feed them into a split.
    ChooseSubset { candidates: Vec<K>, split: SubsetSplit },
    /// Full-area frame plus an inset feature; not a partition.
    Embed { feature: K, margin: f64 },
    /// `then` when both sides strictly exceed the minimums, else `otherwise`.
    WhenAtLeast {
        min_width: f64,
        min_height: f64,
        then: Box<RuleAction<K>>,
        otherwise: Box<RuleAction<K>>,
    },
    /// `then` when either side strictly exceeds `threshold`, else `otherwise`.
    WhenLarger {
        threshold: f64,
        then: Box<RuleAction<K>>,
        otherwise: Box<RuleAction<K>>,
    },
}

/// The concrete result of applying a rule to one region.
#[derive(Clone, Debug, PartialEq)]
pub enum Expansion<K> {
    Terminal,
    Partition(Vec<(K, Rect)>),
    Embed(EmbedPair<K>),
}

impl<K: RegionKind> RuleAction<K> {
    pub fn split_two(axis: AxisChoice, first: K, second: K) -> Self {
        RuleAction::SplitTwo {
            axis,
            ratio: RatioRange::SPLIT,
            first,
            second,
        }
    }

    pub fn when_at_least(min_width: f64, min_height: f64, then: Self, otherwise: Self) -> Self {
        RuleAction::WhenAtLeast {
            min_width,
            min_height,
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn when_larger(threshold: f64, then: Self, otherwise: Self) -> Self {
        RuleAction::WhenLarger {
            threshold,
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Apply this action to `bounds`.
    ///
    /// The result depends only on the action, the bounds and the draws taken
    /// from `src`. `frame_kind` tags the frame child of an embed.
    pub fn resolve<R: RandomSource + ?Sized>(
        &self,
        bounds: &Rect,
        frame_kind: K,
        src: &mut R,
    ) -> Result<Expansion<K>> {
        match self {
            RuleAction::Terminal => Ok(Expansion::Terminal),
            RuleAction::AddChild(kind) => Ok(Expansion::Partition(vec![(*kind, add_child(bounds))])),
            RuleAction::SplitTwo {
                axis,
                ratio,
                first,
                second,
            } => {
                let axis = axis.resolve(bounds, src)?;
                let [a, b] = split_two(bounds, axis, ratio.sample(src)?)?;
                Ok(Expansion::Partition(vec![(*first, a), (*second, b)]))
            }
            RuleAction::SplitFour(kinds) => {
                let quarters = split_four(bounds)?;
                Ok(Expansion::Partition(kinds.iter().copied().zip(quarters).collect()))
            }
            RuleAction::SplitWithCorridor {
                axis,
                corridor_width,
                ratio,
                first,
                corridor,
                second,
            } => {
                let axis = axis.resolve(bounds, src)?;
                let [a, strip, b] =
                    split_with_corridor(bounds, axis, *corridor_width, ratio.sample(src)?)?;
                Ok(Expansion::Partition(vec![
                    (*first, a),
                    (*corridor, strip),
                    (*second, b),
                ]))
            }
            RuleAction::ChooseWeighted(branches) => {
                let roll = src.next_unit()?;
                let branch = select_weighted(branches, roll).ok_or_else(|| {
                    GrammarError::Config("weighted choice has no branches".to_string())
                })?;
                trace!(roll = roll; "Weighted branch selected");
                branch.resolve(bounds, frame_kind, src)
            }
            RuleAction::ChooseSubset { candidates, split } => {
                if candidates.len() < split.arity() {
                    return Err(GrammarError::rule(
                        "ChooseSubset",
                        format!(
                            "{} candidates cannot fill a {}-way split",
                            candidates.len(),
                            split.arity()
                        ),
                    ));
                }
                let chosen = pick_unique(candidates, split.arity(), src)?;
                match split {
                    SubsetSplit::Two { axis, ratio } => {
                        let axis = axis.resolve(bounds, src)?;
                        let [a, b] = split_two(bounds, axis, ratio.sample(src)?)?;
                        Ok(Expansion::Partition(vec![(chosen[0], a), (chosen[1], b)]))
                    }
                    SubsetSplit::Four => {
                        let quarters = split_four(bounds)?;
                        Ok(Expansion::Partition(chosen.into_iter().zip(quarters).collect()))
                    }
                }
            }
            RuleAction::Embed { feature, margin } => {
                Ok(Expansion::Embed(embed(bounds, frame_kind, *feature, *margin)?))
            }
            RuleAction::WhenAtLeast {
                min_width,
                min_height,
                then,
                otherwise,
            } => {
                if bounds.width > *min_width && bounds.height > *min_height {
                    then.resolve(bounds, frame_kind, src)
                } else {
                    otherwise.resolve(bounds, frame_kind, src)
                }
            }
            RuleAction::WhenLarger {
                threshold,
                then,
                otherwise,
            } => {
                if bounds.width > *threshold || bounds.height > *threshold {
                    then.resolve(bounds, frame_kind, src)
                } else {
                    otherwise.resolve(bounds, frame_kind, src)
                }
            }
        }
    }

    /// Check the action's parameters. `owner` names the kind for error messages.
    pub fn validate(&self, owner: K) -> Result<()> {
        let fail = |reason: String| Err(GrammarError::rule(owner.name(), reason));
        match self {
            RuleAction::Terminal | RuleAction::AddChild(_) | RuleAction::SplitFour(_) => Ok(()),
            RuleAction::SplitTwo { ratio, .. } => validate_ratio(owner, ratio),
            RuleAction::SplitWithCorridor {
                corridor_width,
                ratio,
                ..
            } => {
                if !(*corridor_width > 0.0) {
                    return fail(format!("corridor width {corridor_width} must be positive"));
                }
                validate_ratio(owner, ratio)
            }
            RuleAction::ChooseWeighted(branches) => {
                if branches.is_empty() {
                    return fail("weighted choice has no branches".to_string());
                }
                let mut total = 0.0;
                for (weight, branch) in branches {
                    if !(*weight >= 0.0) {
                        return fail(format!("branch weight {weight} must be non-negative"));
                    }
                    total += weight;
                    branch.validate(owner)?;
                }
                if (total - 1.0).abs() > WEIGHT_EPSILON {
                    return fail(format!("branch weights sum to {total}, expected 1"));
                }
                Ok(())
            }
            RuleAction::ChooseSubset { candidates, split } => {
                let distinct: HashSet<K> = candidates.iter().copied().collect();
                if distinct.len() != candidates.len() {
                    return fail("subset candidates contain duplicates".to_string());
                }
                if candidates.len() < split.arity() {
                    return fail(format!(
                        "{} candidates cannot fill a {}-way split",
                        candidates.len(),
                        split.arity()
                    ));
                }
                match split {
                    SubsetSplit::Two { ratio, .. } => validate_ratio(owner, ratio),
                    SubsetSplit::Four => Ok(()),
                }
            }
            RuleAction::Embed { margin, .. } => {
                if !(*margin >= 0.0) {
                    return fail(format!("embed margin {margin} must be non-negative"));
                }
                Ok(())
            }
            RuleAction::WhenAtLeast { then, otherwise, .. }
            | RuleAction::WhenLarger { then, otherwise, .. } => {
                then.validate(owner)?;
                otherwise.validate(owner)
            }
        }
    }

    /// Kinds this action can produce at the parent's full size.
    ///
    /// Used to reject rule sets that could rewrite a region forever without
    /// shrinking it.
    pub(crate) fn full_size_kinds(&self, frame_kind: K, out: &mut Vec<K>) {
        match self {
            RuleAction::AddChild(kind) => out.push(*kind),
            RuleAction::Embed { .. } => out.push(frame_kind),
            RuleAction::ChooseWeighted(branches) => {
                for (weight, branch) in branches {
                    if *weight > 0.0 {
                        branch.full_size_kinds(frame_kind, out);
                    }
                }
            }
            RuleAction::WhenAtLeast { then, otherwise, .. }
            | RuleAction::WhenLarger { then, otherwise, .. } => {
                then.full_size_kinds(frame_kind, out);
                otherwise.full_size_kinds(frame_kind, out);
            }
            RuleAction::Terminal
            | RuleAction::SplitTwo { .. }
            | RuleAction::SplitFour(_)
            | RuleAction::SplitWithCorridor { .. }
            | RuleAction::ChooseSubset { .. } => {}
        }
    }
}

fn validate_ratio<K: RegionKind>(owner: K, ratio: &RatioRange) -> Result<()> {
    if ratio.is_valid() {
        Ok(())
    } else {
        Err(GrammarError::rule(
            owner.name(),
            format!("ratio range {}..{} must lie inside (0, 1)", ratio.min, ratio.max),
        ))
    }
}

/// First branch whose cumulative interval `[lo, lo + w)` contains `roll`.
///
/// Falls back to the last positive-weight branch if rounding leaves `roll`
/// past the final boundary.
fn select_weighted<K: RegionKind>(
    branches: &[(f64, RuleAction<K>)],
    roll: f64,
) -> Option<&RuleAction<K>> {
    let mut cumulative = 0.0;
    for (weight, branch) in branches {
        cumulative += weight;
        if roll < cumulative {
            return Some(branch);
        }
    }
    branches
        .iter()
        .rev()
        .find(|(weight, _)| *weight > 0.0)
        .or(branches.last())
        .map(|(_, branch)| branch)
}

/// Sample `count` distinct kinds without replacement, in draw order.
fn pick_unique<K: RegionKind, R: RandomSource + ?Sized>(
    candidates: &[K],
    count: usize,
    src: &mut R,
) -> Result<Vec<K>> {
    let mut pool = candidates.to_vec();
    let mut chosen = Vec::with_capacity(count);
    for _ in 0..count {
        let i = src.index(pool.len())?;
        chosen.push(pool.remove(i));
    }
    Ok(chosen)
}

/// A total mapping from region kind to rule.
#[derive(Clone, Debug)]
pub struct RuleTable<K: RegionKind> {
    rules: HashMap<K, RuleAction<K>>,
}

impl<K: RegionKind> RuleTable<K> {
    pub fn builder() -> RuleTableBuilder<K> {
        RuleTableBuilder { entries: Vec::new() }
    }

    /// Build a table from a function over every kind in `K::ALL`.
    ///
    /// A `match` inside `rule_for` makes coverage a compile-time property.
    pub fn from_fn(rule_for: impl Fn(K) -> RuleAction<K>) -> Result<Self> {
        let mut builder = Self::builder();
        for &kind in K::ALL {
            builder = builder.rule(kind, rule_for(kind));
        }
        builder.build()
    }

    /// The rule for `kind`.
    pub fn rule_for(&self, kind: K) -> Result<&RuleAction<K>> {
        self.rules
            .get(&kind)
            .ok_or(GrammarError::UnknownType { kind: kind.name() })
    }

    /// True when the kind's rule is `Terminal` unconditionally.
    pub fn is_terminal(&self, kind: K) -> bool {
        matches!(self.rules.get(&kind), Some(RuleAction::Terminal))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Reject rule sets where a kind can reach itself through full-size
    /// rewrites only (`AddChild` or an embed frame), which never terminate.
    pub(crate) fn check_shrinking(&self, frame_kind: K) -> Result<()> {
        let edges: HashMap<K, Vec<K>> = self
            .rules
            .iter()
            .map(|(&kind, action)| {
                let mut next = Vec::new();
                action.full_size_kinds(frame_kind, &mut next);
                (kind, next)
            })
            .collect();

        for &start in K::ALL {
            let mut seen = HashSet::new();
            let mut stack = edges.get(&start).cloned().unwrap_or_default();
            while let Some(kind) = stack.pop() {
                if kind == start {
                    return Err(GrammarError::rule(
                        start.name(),
                        "can rewrite itself without shrinking",
                    ));
                }
                if seen.insert(kind) {
                    if let Some(next) = edges.get(&kind) {
                        stack.extend(next.iter().copied());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Collects rules and checks them in [`RuleTableBuilder::build`].
#[derive(Clone, Debug)]
pub struct RuleTableBuilder<K: RegionKind> {
    entries: Vec<(K, RuleAction<K>)>,
}

impl<K: RegionKind> RuleTableBuilder<K> {
    pub fn rule(mut self, kind: K, action: RuleAction<K>) -> Self {
        self.entries.push((kind, action));
        self
    }

    pub fn terminal(self, kind: K) -> Self {
        self.rule(kind, RuleAction::Terminal)
    }

    /// Validate every rule and require an entry for each kind in `K::ALL`.
    pub fn build(self) -> Result<RuleTable<K>> {
        let mut rules = HashMap::with_capacity(self.entries.len());
        for (kind, action) in self.entries {
            action.validate(kind)?;
            if rules.insert(kind, action).is_some() {
                return Err(GrammarError::rule(kind.name(), "registered more than once"));
            }
        }
        if let Some(missing) = K::ALL.iter().find(|kind| !rules.contains_key(*kind)) {
            return Err(GrammarError::UnknownType {
                kind: missing.name(),
            });
        }
        Ok(RuleTable { rules })
    }
}
