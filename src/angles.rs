//! Joint angle calculation using dot product
//!
//! Calculates the interior angle at a middle joint, e.g. the elbow angle
//! from shoulder→elbow (upper arm) and elbow→wrist (forearm) vectors.

/// Calculate the angle at joint `b` in degrees
///
/// Uses dot product formula: cos(θ) = (v1 · v2) / (|v1| × |v2|)
///
/// Returns angle in degrees:
/// - 90° = fully bent
/// - 180° = fully straight (limb extended)
///
/// Degenerate input (coincident points, occluded joints fed as zeros)
/// returns the 180° "fully extended" sentinel. Callers must treat that
/// value as "unknown", not as a measurement.
pub fn joint_angle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    let v1 = (a.0 - b.0, a.1 - b.1);
    let v2 = (c.0 - b.0, c.1 - b.1);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if mag1 < 1e-4 || mag2 < 1e-4 {
        return 180.0;
    }

    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_limb() {
        let angle = joint_angle((0.0, 0.0), (0.5, 0.0), (1.0, 0.0));
        assert!((angle - 180.0).abs() < 1.0);
    }

    #[test]
    fn right_angle_bend() {
        let angle = joint_angle((0.0, 0.0), (0.5, 0.0), (0.5, 0.5));
        assert!((angle - 90.0).abs() < 1.0);
    }

    #[test]
    fn degenerate_input_returns_extended_sentinel() {
        let angle = joint_angle((0.5, 0.5), (0.5, 0.5), (1.0, 1.0));
        assert_eq!(angle, 180.0);
    }
}
