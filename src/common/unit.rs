//! Unit conversion utilities.
//!
//! Rich text measures lengths in twips (twentieths of a point). Every
//! conversion into twips truncates toward zero instead of rounding, which is
//! what reference renderers expect when they re-derive cell boundaries.

pub const TWIPS_PER_POINT: i32 = 20;
pub const TWIPS_PER_INCH: i32 = 1440;
pub const POINTS_PER_INCH: f32 = 72.0;
pub const MILLIMETERS_PER_INCH: f32 = 25.4;
/// CSS reference pixel density used for image sizes.
pub const PIXELS_PER_INCH: f32 = 96.0;

#[inline]
pub fn pt_to_twip(pt: f32) -> i32 {
    (pt * TWIPS_PER_POINT as f32) as i32
}

#[inline]
pub fn inch_to_twip(inch: f32) -> i32 {
    (inch * TWIPS_PER_INCH as f32) as i32
}

#[inline]
pub fn mm_to_twip(mm: f32) -> i32 {
    inch_to_twip(mm / MILLIMETERS_PER_INCH)
}

#[inline]
pub fn inch_to_pt(inch: f32) -> f32 {
    inch * POINTS_PER_INCH
}

#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    inch_to_pt(mm / MILLIMETERS_PER_INCH)
}

#[inline]
pub fn px_to_pt(px: u32) -> f32 {
    px as f32 * POINTS_PER_INCH / PIXELS_PER_INCH
}

/// Font sizes are written in half-points.
#[inline]
pub fn pt_to_half_points(pt: f32) -> i32 {
    (pt * 2.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_to_twips() {
        assert_eq!(pt_to_twip(12.0), 240);
        assert_eq!(pt_to_twip(0.0), 0);
        assert_eq!(pt_to_twip(72.0), TWIPS_PER_INCH);
    }

    #[test]
    fn test_inches_to_twips() {
        assert_eq!(inch_to_twip(1.0), 1440);
        assert_eq!(inch_to_twip(0.5), 720);
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        // 0.99pt is 19.8 twips
        assert_eq!(pt_to_twip(0.99), 19);
        assert_eq!(pt_to_half_points(10.9), 21);
    }

    #[test]
    fn test_metric_conversions() {
        assert_eq!(mm_to_twip(25.4), 1440);
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-4);
        assert!((inch_to_pt(2.0) - 144.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pixels_to_points() {
        assert!((px_to_pt(96) - 72.0).abs() < f32::EPSILON);
        assert!((px_to_pt(4) - 3.0).abs() < f32::EPSILON);
    }
}
