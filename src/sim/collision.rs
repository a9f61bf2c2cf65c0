//! Axis-aligned collision primitives
//!
//! Everything in the stage is a rectangle; the only subtlety is the landing
//! band that lets fast-falling entities snap onto platform tops instead of
//! tunneling through them.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle, origin at top-left (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict AABB overlap: touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(other.x >= self.x + self.width
            || other.x + other.width <= self.x
            || other.y >= self.y + self.height
            || other.y + other.height <= self.y)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Result of resolving a falling rectangle against a platform top
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// y for the entity's top edge so its feet rest on the platform
    pub snap_y: f32,
}

/// Check whether a moving rectangle lands on a platform this tick.
///
/// A landing requires horizontal overlap, downward (or zero) vertical
/// velocity, and the entity's feet inside a tolerance band extending
/// `tolerance` pixels below the platform's top surface. The band absorbs a
/// full terminal-velocity step so nothing tunnels through a 20 px platform.
pub fn platform_landing(entity: &Rect, vy: f32, platform: &Rect, tolerance: f32) -> Option<Landing> {
    if vy < 0.0 {
        return None;
    }
    let feet = entity.bottom();
    let horizontal = entity.x < platform.right() && entity.right() > platform.x;
    if horizontal && feet > platform.y && feet < platform.y + platform.height + tolerance {
        Some(Landing {
            snap_y: platform.y - entity.height,
        })
    } else {
        None
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            aw in 1.0f32..200.0, ah in 1.0f32..200.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            bw in 1.0f32..200.0, bh in 1.0f32..200.0,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn rect_overlaps_itself(
            x in -500.0f32..500.0, y in -500.0f32..500.0,
            w in 1.0f32..200.0, h in 1.0f32..200.0,
        ) {
            let r = Rect::new(x, y, w, h);
            prop_assert!(r.overlaps(&r));
        }
    }
}
