//! The grammar engine: breadth-first expansion of a region tree.
//!
//! Regions are pulled from a FIFO queue. Each one is either forced terminal
//! by the size safeguard, marked terminal by its rule, or expanded into
//! children that join the back of the queue. The run ends when the queue is
//! empty, at which point every leaf is terminal.

use std::collections::VecDeque;

use log::{debug, info, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::{GrammarError, Result};
use crate::geometry::Rect;
use crate::random::RandomSource;
use crate::region::{Production, Region, RegionKind, RegionState};

use super::rules::{Expansion, RuleTable};

/// Weighted set of terminal kinds that undersized regions become.
#[derive(Clone, Debug, PartialEq)]
pub struct Safeguard<K>(Vec<(f64, K)>);

impl<K: RegionKind> Safeguard<K> {
    pub fn single(kind: K) -> Self {
        Safeguard(vec![(1.0, kind)])
    }

    /// Weighted replacement set. Weights must be positive; they are normalised.
    pub fn weighted(choices: Vec<(f64, K)>) -> Result<Self> {
        if choices.is_empty() {
            return Err(GrammarError::Config("safeguard needs at least one kind".to_string()));
        }
        if let Some((weight, kind)) = choices.iter().find(|(w, _)| !(*w > 0.0)) {
            return Err(GrammarError::Config(format!(
                "safeguard weight {weight} for `{}` must be positive",
                kind.name()
            )));
        }
        Ok(Safeguard(choices))
    }

    pub fn kinds(&self) -> impl Iterator<Item = K> + '_ {
        self.0.iter().map(|(_, kind)| *kind)
    }

    /// Draw the replacement kind.
    ///
    /// A single replacement kind is returned without drawing.
    fn draw<R: RandomSource + ?Sized>(&self, src: &mut R) -> Result<K> {
        if let [(_, only)] = self.0.as_slice() {
            return Ok(*only);
        }
        let total: f64 = self.0.iter().map(|(w, _)| w).sum();
        let roll = src.next_unit()? * total;
        let mut cumulative = 0.0;
        for (weight, choice) in &self.0 {
            cumulative += weight;
            if roll < cumulative {
                return Ok(*choice);
            }
        }
        self.0
            .last()
            .map(|(_, k)| *k)
            .ok_or_else(|| GrammarError::Config("safeguard needs at least one kind".to_string()))
    }
}

/// Settings injected at engine construction.
#[derive(Clone, Debug)]
pub struct EngineConfig<K> {
    /// Kind of the root region.
    pub root: K,
    /// Regions narrower or shorter than this are forced terminal.
    pub min_dim: f64,
    /// Kinds that forced-terminal regions are relabelled to. Every kind
    /// here must have a `Terminal` rule.
    pub safeguard: Safeguard<K>,
    /// Kind given to the full-area frame of an embed.
    pub frame_kind: K,
    /// Regions this many levels below the root are forced terminal.
    pub max_depth: Option<usize>,
    /// Regions stopped by `max_depth` alone keep their kind instead of
    /// taking one from `safeguard`. Undersized regions are always relabelled.
    pub keep_kind_at_max_depth: bool,
}

impl<K: RegionKind> EngineConfig<K> {
    pub fn new(root: K, min_dim: f64, safeguard: Safeguard<K>, frame_kind: K) -> Self {
        Self {
            root,
            min_dim,
            safeguard,
            frame_kind,
            max_depth: None,
            keep_kind_at_max_depth: false,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Leave regions stopped by the depth cap with their current kind.
    pub fn keeping_kinds_at_max_depth(mut self) -> Self {
        self.keep_kind_at_max_depth = true;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.min_dim > 0.0) || !self.min_dim.is_finite() {
            return Err(GrammarError::Config(format!(
                "min_dim {} must be positive",
                self.min_dim
            )));
        }
        Safeguard::weighted(self.safeguard.0.clone())?;
        Ok(())
    }
}

/// Counters collected over one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Regions taken off the queue.
    pub iterations: usize,
    /// Regions in the finished tree, root included.
    pub regions: usize,
    /// Regions without children.
    pub leaves: usize,
    /// Depth of the deepest region; the root is at depth zero.
    pub max_depth: usize,
    /// Regions forced terminal by the size or depth limit.
    pub safeguarded: usize,
    /// Embed productions applied.
    pub embeds: usize,
}

/// A finished run.
#[derive(Clone, Debug)]
pub struct Generation<K: RegionKind> {
    /// The finished tree.
    pub root: Region<K>,
    /// Counters for the run that built it.
    pub stats: GenerationStats,
}

/// Working node while a run is in progress. Children are indices into the
/// run's node list, turned into owned `Region`s once the queue drains.
struct Node<K> {
    kind: K,
    bounds: Rect,
    state: RegionState,
    production: Option<Production>,
    children: Vec<usize>,
    depth: usize,
}

impl<K> Node<K> {
    fn pending(kind: K, bounds: Rect, depth: usize) -> Self {
        Self {
            kind,
            bounds,
            state: RegionState::Pending,
            production: None,
            children: Vec::new(),
            depth,
        }
    }
}

/// A validated rule table paired with its engine settings.
#[derive(Clone, Debug)]
pub struct GrammarEngine<K: RegionKind> {
    table: RuleTable<K>,
    config: EngineConfig<K>,
}

impl<K: RegionKind> GrammarEngine<K> {
    /// Fails if the settings are invalid or the rules can rewrite a region
    /// forever without shrinking it.
    pub fn new(table: RuleTable<K>, config: EngineConfig<K>) -> Result<Self> {
        config.validate()?;
        if let Some(kind) = config.safeguard.kinds().find(|&kind| !table.is_terminal(kind)) {
            return Err(GrammarError::Config(format!(
                "safeguard kind `{}` must have a terminal rule",
                kind.name()
            )));
        }
        table.check_shrinking(config.frame_kind)?;
        Ok(Self { table, config })
    }

    pub fn table(&self) -> &RuleTable<K> {
        &self.table
    }

    pub fn config(&self) -> &EngineConfig<K> {
        &self.config
    }

    /// Generate a tree for a `width` x `height` area from a seed.
    pub fn generate(&self, width: f64, height: f64, seed: u64) -> Result<Region<K>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        debug!(width = width, height = height, seed = seed; "Starting generation");
        Ok(self.run(width, height, &mut rng)?.root)
    }

    /// Generate independent trees in parallel, one per seed, in seed order.
    ///
    /// Each run owns its random source and its tree.
    pub fn generate_many(&self, width: f64, height: f64, seeds: &[u64]) -> Vec<Result<Generation<K>>> {
        seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                self.run(width, height, &mut rng)
            })
            .collect()
    }

    /// Run to completion with any random source.
    ///
    /// Errors abort the run; no partial tree is returned.
    pub fn run<R: RandomSource + ?Sized>(&self, width: f64, height: f64, src: &mut R) -> Result<Generation<K>> {
        let root_bounds = Rect::new(0.0, 0.0, width, height)?;
        let mut nodes = vec![Node::pending(self.config.root, root_bounds, 0)];
        let mut queue = VecDeque::from([0usize]);
        let mut stats = GenerationStats::default();

        while let Some(id) = queue.pop_front() {
            stats.iterations += 1;
            let (kind, bounds, depth) = {
                let node = &nodes[id];
                (node.kind, node.bounds, node.depth)
            };

            let undersized = bounds.width < self.config.min_dim || bounds.height < self.config.min_dim;
            let at_depth_cap = self.config.max_depth.is_some_and(|max| depth >= max);
            if undersized || at_depth_cap {
                let keep = self.table.is_terminal(kind) || (!undersized && self.config.keep_kind_at_max_depth);
                let forced = if keep { kind } else { self.config.safeguard.draw(src)? };
                trace!(from = kind.name(), to = forced.name(), depth = depth; "Safeguard conversion");
                let node = &mut nodes[id];
                node.kind = forced;
                node.state = RegionState::Terminal;
                stats.safeguarded += 1;
                continue;
            }

            let action = self.table.rule_for(kind)?;
            match action.resolve(&bounds, self.config.frame_kind, src)? {
                Expansion::Terminal => {
                    nodes[id].state = RegionState::Terminal;
                }
                Expansion::Partition(parts) => {
                    trace!(kind = kind.name(), children = parts.len(); "Partition");
                    let mut children = Vec::with_capacity(parts.len());
                    for (child_kind, child_bounds) in parts {
                        let child = nodes.len();
                        nodes.push(Node::pending(child_kind, child_bounds, depth + 1));
                        children.push(child);
                        queue.push_back(child);
                    }
                    let node = &mut nodes[id];
                    node.children = children;
                    node.state = RegionState::Expanded;
                    node.production = Some(Production::Partition);
                }
                Expansion::Embed(pair) => {
                    trace!(kind = kind.name(), feature = pair.feature.0.name(); "Embed");
                    let frame = nodes.len();
                    nodes.push(Node::pending(pair.frame.0, pair.frame.1, depth + 1));
                    queue.push_back(frame);

                    let feature = nodes.len();
                    let mut feature_node = Node::pending(pair.feature.0, pair.feature.1, depth + 1);
                    feature_node.state = RegionState::Terminal;
                    nodes.push(feature_node);

                    let node = &mut nodes[id];
                    node.children = vec![frame, feature];
                    node.state = RegionState::Expanded;
                    node.production = Some(Production::Embed { margin: pair.margin });
                    stats.embeds += 1;
                }
            }
        }

        stats.regions = nodes.len();
        stats.leaves = nodes.iter().filter(|n| n.children.is_empty()).count();
        stats.max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        info!(
            regions = stats.regions,
            leaves = stats.leaves,
            iterations = stats.iterations,
            safeguarded = stats.safeguarded;
            "Generation complete"
        );

        Ok(Generation {
            root: assemble(&nodes, 0),
            stats,
        })
    }
}

/// Generate a tree for a `width` x `height` area with `engine`'s rules.
pub fn generate<K: RegionKind>(width: f64, height: f64, engine: &GrammarEngine<K>, seed: u64) -> Result<Region<K>> {
    engine.generate(width, height, seed)
}

fn assemble<K: RegionKind>(nodes: &[Node<K>], id: usize) -> Region<K> {
    let node = &nodes[id];
    let children = node.children.iter().map(|&child| assemble(nodes, child)).collect();
    Region::assemble(node.kind, node.bounds, node.state, node.production, children)
}
