//! Angle helpers for azimuthal correlations.

use std::f64::consts::{FRAC_PI_2, TAU};

/// Wrap `angle` into `[min, min + 2π)`.
pub fn constrain_angle(angle: f64, min: f64) -> f64 {
    let wrapped = (angle - min).rem_euclid(TAU);
    // rem_euclid may round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        min
    } else {
        min + wrapped
    }
}

/// Azimuthal distance of an associate from its trigger, in `[-π/2, 3π/2)`.
pub fn delta_phi(phi_associate: f64, phi_trigger: f64) -> f64 {
    constrain_angle(phi_associate - phi_trigger, -FRAC_PI_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_constrain_angle_range() {
        for &a in &[-10.0, -PI, -FRAC_PI_2, 0.0, 1.0, PI, 3.0 * FRAC_PI_2, 7.5, 100.0] {
            let c = constrain_angle(a, -FRAC_PI_2);
            assert!((-FRAC_PI_2..3.0 * FRAC_PI_2).contains(&c), "{a} -> {c}");
            let turns = (a - c) / TAU;
            assert!((turns - turns.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_delta_phi() {
        assert!((delta_phi(1.0, 0.5) - 0.5).abs() < 1e-12);
        // -1 rad is inside the window
        assert!((delta_phi(0.0, 1.0) + 1.0).abs() < 1e-12);
        // -2 rad wraps to 2π - 2
        assert!((delta_phi(0.0, 2.0) - (TAU - 2.0)).abs() < 1e-12);
        assert!((delta_phi(PI, 0.0) - PI).abs() < 1e-12);
    }
}
