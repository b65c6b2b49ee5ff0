//! Child rectangles for the partitioning actions.
//!
//! Every function here returns rectangles that tile the input exactly, in
//! scan order, with no overlap.

use crate::error::{GrammarError, Result};
use crate::geometry::{Axis, Rect};

/// The single full-area child of `AddChild`.
pub fn add_child(bounds: &Rect) -> Rect {
    *bounds
}

/// Cut at `ratio` of the extent along `axis`: left/right or top/bottom.
pub fn split_two(bounds: &Rect, axis: Axis, ratio: f64) -> Result<[Rect; 2]> {
    match axis {
        Axis::Vertical => {
            let w1 = bounds.width * ratio;
            Ok([
                Rect::new(bounds.x, bounds.y, w1, bounds.height)?,
                Rect::new(bounds.x + w1, bounds.y, bounds.width - w1, bounds.height)?,
            ])
        }
        Axis::Horizontal => {
            let h1 = bounds.height * ratio;
            Ok([
                Rect::new(bounds.x, bounds.y, bounds.width, h1)?,
                Rect::new(bounds.x, bounds.y + h1, bounds.width, bounds.height - h1)?,
            ])
        }
    }
}

/// Quarter at the midpoint: top-left, top-right, bottom-left, bottom-right.
pub fn split_four(bounds: &Rect) -> Result<[Rect; 4]> {
    let half_w = bounds.width / 2.0;
    let half_h = bounds.height / 2.0;
    let mid_x = bounds.x + half_w;
    let mid_y = bounds.y + half_h;
    Ok([
        Rect::new(bounds.x, bounds.y, half_w, half_h)?,
        Rect::new(mid_x, bounds.y, bounds.width - half_w, half_h)?,
        Rect::new(bounds.x, mid_y, half_w, bounds.height - half_h)?,
        Rect::new(mid_x, mid_y, bounds.width - half_w, bounds.height - half_h)?,
    ])
}

/// Three-way cut: first region, a strip `corridor_width` wide, second region.
///
/// `fraction` places the first cut within the extent left over after the
/// corridor is removed.
pub fn split_with_corridor(
    bounds: &Rect,
    axis: Axis,
    corridor_width: f64,
    fraction: f64,
) -> Result<[Rect; 3]> {
    let remaining = axis.extent(bounds) - corridor_width;
    if remaining <= 0.0 {
        return Err(GrammarError::geometry(
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            format!("corridor width {corridor_width} leaves no room on either side"),
        ));
    }
    let first = remaining * fraction;
    let second = remaining - first;

    match axis {
        Axis::Vertical => Ok([
            Rect::new(bounds.x, bounds.y, first, bounds.height)?,
            Rect::new(bounds.x + first, bounds.y, corridor_width, bounds.height)?,
            Rect::new(bounds.x + first + corridor_width, bounds.y, second, bounds.height)?,
        ]),
        Axis::Horizontal => Ok([
            Rect::new(bounds.x, bounds.y, bounds.width, first)?,
            Rect::new(bounds.x, bounds.y + first, bounds.width, corridor_width)?,
            Rect::new(bounds.x, bounds.y + first + corridor_width, bounds.width, second)?,
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn area_sum(rects: &[Rect]) -> f64 {
        rects.iter().map(Rect::area).sum()
    }

    fn no_overlap(rects: &[Rect]) -> bool {
        rects.iter().enumerate().all(|(i, a)| {
            rects[i + 1..]
                .iter()
                .all(|b| a.intersection_area(b) <= 1e-9)
        })
    }

    #[test]
    fn test_split_two_tiles_parent() {
        let parent = Rect::new(10.0, 20.0, 300.0, 120.0).unwrap();
        for axis in [Axis::Vertical, Axis::Horizontal] {
            let parts = split_two(&parent, axis, 0.37).unwrap();
            assert!(approx_eq!(f64, area_sum(&parts), parent.area(), epsilon = 1e-6));
            assert!(no_overlap(&parts));
            assert!(parts.iter().all(|p| parent.encloses(p)));
        }
        let [left, right] = split_two(&parent, Axis::Vertical, 0.5).unwrap();
        assert_eq!(left.x, 10.0);
        assert_eq!(right.x, 160.0);
    }

    #[test]
    fn test_split_four_order() {
        let parent = Rect::new(0.0, 0.0, 100.0, 50.0).unwrap();
        let [tl, tr, bl, br] = split_four(&parent).unwrap();
        assert_eq!((tl.x, tl.y), (0.0, 0.0));
        assert_eq!((tr.x, tr.y), (50.0, 0.0));
        assert_eq!((bl.x, bl.y), (0.0, 25.0));
        assert_eq!((br.x, br.y), (50.0, 25.0));
        assert!(approx_eq!(f64, area_sum(&[tl, tr, bl, br]), parent.area(), epsilon = 1e-9));
    }

    #[test]
    fn test_corridor_split_geometry() {
        let parent = Rect::new(0.0, 0.0, 600.0, 600.0).unwrap();
        let [a, path, b] = split_with_corridor(&parent, Axis::Vertical, 50.0, 0.5).unwrap();
        assert!(approx_eq!(f64, a.width + b.width, 550.0, epsilon = 1e-9));
        assert_eq!(path.width, 50.0);
        assert_eq!(path.height, 600.0);
        assert_eq!(a.x + a.width, path.x);
        assert_eq!(path.x + path.width, b.x);
        assert!(no_overlap(&[a, path, b]));
    }

    #[test]
    fn test_corridor_wider_than_region_fails() {
        let parent = Rect::new(0.0, 0.0, 40.0, 600.0).unwrap();
        let err = split_with_corridor(&parent, Axis::Vertical, 50.0, 0.5).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidGeometry { .. }));
        // The other axis has room.
        assert!(split_with_corridor(&parent, Axis::Horizontal, 50.0, 0.5).is_ok());
    }
}
