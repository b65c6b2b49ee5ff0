//! Plain-text views of a generated tree for the command line.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::region::{Production, Region, RegionKind, RegionState};

/// Leaf count and covered area for one kind.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KindSummary {
    /// Number of leaves.
    pub count: usize,
    /// Summed leaf area.
    pub area: f64,
}

/// Indented tree, one region per line, children in stored order.
pub fn render_outline<K: RegionKind>(root: &Region<K>) -> String {
    let mut out = String::new();
    write_region(&mut out, root, 0);
    out
}

fn write_region<K: RegionKind>(out: &mut String, region: &Region<K>, depth: usize) {
    let b = region.bounds();
    let state = match region.state() {
        RegionState::Pending => "pending",
        RegionState::Expanded => "expanded",
        RegionState::Terminal => "terminal",
    };
    let _ = write!(
        out,
        "{:indent$}{} [{:.1}, {:.1} {:.1}x{:.1}] {}",
        "",
        region.kind().name(),
        b.x,
        b.y,
        b.width,
        b.height,
        state,
        indent = depth * 2
    );
    if let Some(Production::Embed { margin }) = region.production() {
        let _ = write!(out, " (embed, margin {margin})");
    }
    out.push('\n');
    for child in region.children() {
        write_region(out, child, depth + 1);
    }
}

/// Leaves grouped by kind name.
///
/// Embedded features sit on top of their frame, so areas overlap there and
/// the total can exceed the root's area.
pub fn leaf_summary<K: RegionKind>(root: &Region<K>) -> BTreeMap<&'static str, KindSummary> {
    let mut summary: BTreeMap<&'static str, KindSummary> = BTreeMap::new();
    for leaf in root.leaves() {
        let entry = summary.entry(leaf.kind().name()).or_default();
        entry.count += 1;
        entry.area += leaf.bounds().area();
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{EngineConfig, GrammarEngine, RuleAction, RuleTable, Safeguard};
    use crate::region::tests::Tile;

    fn embedded() -> Region<Tile> {
        let table = RuleTable::builder()
            .rule(Tile::Root, RuleAction::Embed { feature: Tile::Pond, margin: 10.0 })
            .terminal(Tile::Zone)
            .terminal(Tile::Path)
            .terminal(Tile::Ground)
            .terminal(Tile::Pond)
            .build()
            .unwrap();
        let config = EngineConfig::new(Tile::Root, 5.0, Safeguard::single(Tile::Ground), Tile::Ground);
        GrammarEngine::new(table, config)
            .unwrap()
            .generate(100.0, 50.0, 0)
            .unwrap()
    }

    #[test]
    fn test_outline_lists_children_indented() {
        let text = render_outline(&embedded());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Root [0.0, 0.0 100.0x50.0] expanded (embed, margin 10)");
        assert_eq!(lines[1], "  Ground [0.0, 0.0 100.0x50.0] terminal");
        assert_eq!(lines[2], "  Pond [10.0, 10.0 80.0x30.0] terminal");
    }

    #[test]
    fn test_leaf_summary() {
        let summary = leaf_summary(&embedded());
        assert_eq!(summary["Ground"], KindSummary { count: 1, area: 5000.0 });
        assert_eq!(summary["Pond"], KindSummary { count: 1, area: 2400.0 });
        assert!(!summary.contains_key("Root"));
    }
}
