use std::f64::consts::PI;

pub struct AreaHelper;

impl AreaHelper {
    /// Area of a circle of `radius_m` metres, in square kilometres.
    pub fn circle_km2(radius_m: f64) -> f64 {
        PI * radius_m * radius_m / 1_000_000.0
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_kilometre_radius_is_pi_square_kilometres() {
        assert!((AreaHelper::circle_km2(1000.0) - PI).abs() < 1e-12);
    }

    #[test]
    fn zero_radius_has_zero_area() {
        assert_eq!(AreaHelper::circle_km2(0.0), 0.0);
    }

    #[test]
    fn rounding_keeps_requested_precision() {
        assert_eq!(round_to(2.545_001, 2), 2.55);
        assert_eq!(round_to(37.123_456_789, 6), 37.123_457);
        assert_eq!(round_to(-23.000_000_4, 6), -23.0);
    }
}
