//! Feature embedding: a decorated region nested inside a plain frame.
//!
//! Unlike the splits this does not partition the parent. The frame covers
//! the parent's full bounds and the feature sits on top of it, inset by a
//! fixed margin, so consumers draw frame first and feature second.

use crate::error::{GrammarError, Result};
use crate::geometry::Rect;

/// Frame and feature produced by one embed, in render order.
#[derive(Clone, Debug, PartialEq)]
pub struct EmbedPair<K> {
    /// Full-area background, drawn first.
    pub frame: (K, Rect),
    /// The inset feature, drawn on top of the frame.
    pub feature: (K, Rect),
    /// Gap between the frame edge and the feature on every side.
    pub margin: f64,
}

/// Nest a `feature_kind` region inside `bounds`, inset by `margin` on all sides.
///
/// Requires `width > 2 * margin` and `height > 2 * margin`. Rule authors are
/// expected to gate embeds behind a size check; anything smaller is rejected
/// rather than clamped.
pub fn embed<K: Copy>(bounds: &Rect, frame_kind: K, feature_kind: K, margin: f64) -> Result<EmbedPair<K>> {
    if !(margin >= 0.0) || bounds.width <= 2.0 * margin || bounds.height <= 2.0 * margin {
        return Err(GrammarError::geometry(
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            format!("embed margin {margin} exceeds half a dimension"),
        ));
    }
    let inner = bounds.inset(margin)?;
    Ok(EmbedPair {
        frame: (frame_kind, *bounds),
        feature: (feature_kind, inner),
        margin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_inset_by_margin() {
        let parent = Rect::new(100.0, 50.0, 200.0, 160.0).unwrap();
        let pair = embed(&parent, "grass", "pond", 20.0).unwrap();

        assert_eq!(pair.frame, ("grass", parent));
        let (kind, inner) = pair.feature;
        assert_eq!(kind, "pond");
        assert_eq!(inner.x - parent.x, 20.0);
        assert_eq!(inner.y - parent.y, 20.0);
        assert_eq!(parent.right() - inner.right(), 20.0);
        assert_eq!(parent.bottom() - inner.bottom(), 20.0);
    }

    #[test]
    fn test_margin_too_large_is_invalid_geometry() {
        let parent = Rect::new(0.0, 0.0, 40.0, 200.0).unwrap();
        let err = embed(&parent, 0u8, 1u8, 20.0).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidGeometry { .. }));

        let err = embed(&parent, 0u8, 1u8, -1.0).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidGeometry { .. }));
    }
}
