//! Bundled layouts
//!
//! Each layout defines its own closed set of region kinds and builds a rule
//! table and engine settings from its config:
//!
//! - Garden: path-divided zones that settle into planted parcels
//! - Planting: quartered beds recursively mixed from flower, forest and pond kinds

pub mod garden;
pub mod planting;

pub use garden::GardenKind;
pub use planting::PlantingKind;

#[cfg(test)]
pub(crate) mod invariants {
    use float_cmp::approx_eq;

    use crate::region::{Production, Region, RegionKind, RegionState};

    const EPS: f64 = 1e-6;

    /// Upper bound on tree depth for a run whose shrinking cuts leave at most
    /// `factor` of the cut extent, with at most `kinds` full-size rewrites in
    /// a row.
    pub(crate) fn depth_bound(width: f64, height: f64, min_dim: f64, factor: f64, kinds: usize) -> usize {
        let cuts = |extent: f64| {
            if extent < min_dim {
                0
            } else {
                ((extent / min_dim).ln() / (1.0 / factor).ln()).ceil() as usize + 1
            }
        };
        (cuts(width) + cuts(height) + 1) * kinds
    }

    /// Check coverage, non-overlap, embed containment and state consistency
    /// for every region of `root`.
    pub(crate) fn assert_consistent<K: RegionKind>(root: &Region<K>) {
        for region in root.walk() {
            let bounds = region.bounds();
            assert!(bounds.width > 0.0 && bounds.height > 0.0);

            match region.production() {
                None => {
                    assert!(region.is_leaf(), "{:?} has children but no production", region.kind());
                    assert_eq!(region.state(), RegionState::Terminal, "leaf {:?} not terminal", region.kind());
                }
                Some(Production::Partition) => {
                    assert_eq!(region.state(), RegionState::Expanded);
                    let children = region.children();
                    assert!(!children.is_empty());

                    let total: f64 = children.iter().map(|c| c.bounds().area()).sum();
                    assert!(
                        approx_eq!(f64, total, bounds.area(), epsilon = EPS * bounds.area().max(1.0)),
                        "children cover {total}, parent {}",
                        bounds.area()
                    );
                    for (i, a) in children.iter().enumerate() {
                        let ab = a.bounds();
                        assert!(ab.x >= bounds.x - EPS && ab.y >= bounds.y - EPS);
                        assert!(ab.right() <= bounds.right() + EPS && ab.bottom() <= bounds.bottom() + EPS);
                        for b in &children[i + 1..] {
                            assert!(ab.intersection_area(b.bounds()) <= EPS, "siblings overlap");
                        }
                    }
                }
                Some(Production::Embed { margin }) => {
                    assert_eq!(region.state(), RegionState::Expanded);
                    let [frame, feature] = region.children() else {
                        panic!("embed must produce exactly two children");
                    };
                    assert_eq!(frame.bounds(), bounds);
                    assert!(feature.is_terminal() && feature.is_leaf());
                    let fb = feature.bounds();
                    assert!(approx_eq!(f64, fb.x - bounds.x, margin, epsilon = EPS));
                    assert!(approx_eq!(f64, fb.y - bounds.y, margin, epsilon = EPS));
                    assert!(approx_eq!(f64, bounds.right() - fb.right(), margin, epsilon = EPS));
                    assert!(approx_eq!(f64, bounds.bottom() - fb.bottom(), margin, epsilon = EPS));
                }
            }
        }
    }
}
