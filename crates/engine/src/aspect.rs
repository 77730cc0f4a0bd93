//! Aspect-ratio matching against the allowed-ratio table.

use crate::registry::AspectRatio;

/// True when `width/height` falls within `tolerance` (relative error) of any
/// table entry. Degenerate dimensions never match and never divide by zero.
pub fn matches(width: u32, height: u32, table: &[AspectRatio], tolerance: f64) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    let ratio = width as f64 / height as f64;
    table.iter().any(|entry| {
        if entry.w <= 0.0 || entry.h <= 0.0 {
            return false;
        }
        let expected = entry.w / entry.h;
        ((ratio - expected) / expected).abs() <= tolerance
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ASPECT_TOLERANCE;

    const LANDSCAPE_ONLY: &[AspectRatio] = &[AspectRatio { w: 1.91, h: 1.0 }];
    const TABLE: &[AspectRatio] = &[
        AspectRatio { w: 1.91, h: 1.0 },
        AspectRatio { w: 1.0, h: 1.0 },
    ];

    #[test]
    fn test_landscape_within_tolerance() {
        assert!(matches(1910, 1000, TABLE, ASPECT_TOLERANCE));
        // 4% off 1.91:1 still matches
        assert!(matches(1836, 1000, LANDSCAPE_ONLY, ASPECT_TOLERANCE));
    }

    #[test]
    fn test_square_matches_square_entry_only() {
        assert!(matches(1000, 1000, TABLE, ASPECT_TOLERANCE));
        assert!(!matches(1000, 1000, LANDSCAPE_ONLY, ASPECT_TOLERANCE));
    }

    #[test]
    fn test_outside_tolerance() {
        // 1.8:1 is ~5.8% off 1.91:1
        assert!(!matches(1800, 1000, LANDSCAPE_ONLY, ASPECT_TOLERANCE));
    }

    #[test]
    fn test_degenerate_dimensions_never_match() {
        assert!(!matches(100, 0, TABLE, ASPECT_TOLERANCE));
        assert!(!matches(0, 100, TABLE, ASPECT_TOLERANCE));
    }
}
