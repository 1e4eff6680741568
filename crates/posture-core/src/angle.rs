//! Joint-angle geometry.

use posturemaxx_pose_model::joint::Point2D;

/// Vertical offset of the reference point used for the neck angle.
pub const VERTICAL_REFERENCE_OFFSET: f64 = -100.0;

/// Angle at `b` between rays `b -> a` and `b -> c`, in degrees `[0, 180]`.
///
/// Returns `None` when either ray has zero length.
pub fn angle_between_three_points(a: Point2D, b: Point2D, c: Point2D) -> Option<f64> {
    let (bax, bay) = (a.x - b.x, a.y - b.y);
    let (bcx, bcy) = (c.x - b.x, c.y - b.y);

    let magnitude_ba = (bax * bax + bay * bay).sqrt();
    let magnitude_bc = (bcx * bcx + bcy * bcy).sqrt();
    let denominator = magnitude_ba * magnitude_bc;
    if !denominator.is_finite() || denominator == 0.0 {
        return None;
    }

    let cosine = ((bax * bcx + bay * bcy) / denominator).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Angle at the neck between the vertical reference ray and the ray toward
/// the ear.
///
/// The reference point is the neck shifted by [`VERTICAL_REFERENCE_OFFSET`]
/// on the y axis.
pub fn neck_angle(neck: Point2D, ear: Point2D) -> Option<f64> {
    let reference = neck.offset(0.0, VERTICAL_REFERENCE_OFFSET);
    angle_between_three_points(reference, neck, ear)
}

/// Tilt of the shoulder line from horizontal, in degrees `[0, 90]`.
///
/// Independent of which shoulder appears on which side of the image.
pub fn shoulder_tilt(left: Point2D, right: Point2D) -> Option<f64> {
    let dx = (right.x - left.x).abs();
    let dy = (right.y - left.y).abs();
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    Some(dy.atan2(dx).to_degrees())
}
