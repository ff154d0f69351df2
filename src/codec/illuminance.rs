/// Convert a raw illuminance count to lux.
///
/// The sensor reports `10000 * log10(lux) + 1`; zero means no light.
pub fn raw_to_lux(raw: u16) -> f64 {
    if raw == 0 {
        return 0.0;
    }
    10f64.powf(f64::from(raw - 1) / 10_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_dark() {
        assert_eq!(raw_to_lux(0), 0.0);
    }

    #[test]
    fn test_known_points() {
        assert_eq!(raw_to_lux(1), 1.0);
        assert!((raw_to_lux(10_001) - 10.0).abs() < 1e-9);
        assert!((raw_to_lux(30_001) - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_monotonic() {
        let mut previous = raw_to_lux(1);
        for raw in (2..=u16::MAX).step_by(97) {
            let lux = raw_to_lux(raw);
            assert!(lux >= previous, "raw {} went backwards", raw);
            previous = lux;
        }
        assert!(raw_to_lux(u16::MAX).is_finite());
    }
}
