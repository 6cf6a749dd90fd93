pub mod temperature {
    const ABSOLUTE_ZERO_C: f64 = 273.15;

    /// Converts Kelvin to Celsius, rounded to two decimal places.
    ///
    /// A reading of exactly `0.0` (or NaN) is treated the same as a missing
    /// one and yields `None`.
    pub fn k2c(temp_k: Option<f64>) -> Option<f64> {
        match temp_k {
            Some(k) if k != 0.0 && !k.is_nan() => Some(round2(k - ABSOLUTE_ZERO_C)),
            _ => None,
        }
    }

    /// Rounds to two decimals. A result that rounds to zero is `0.0`, never `-0.0`.
    fn round2(value: f64) -> f64 {
        let rounded = (value * 100.0).round() / 100.0;
        if rounded == 0.0 {
            0.0
        } else {
            rounded
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_k2c() {
            assert_eq!(k2c(Some(300.0)), Some(26.85));
            assert_eq!(k2c(Some(273.15)), Some(0.0));
            assert_eq!(k2c(Some(373.15)), Some(100.0));
            assert_eq!(k2c(Some(250.0)), Some(-23.15));
            assert_eq!(k2c(Some(1.0)), Some(-272.15));
        }

        #[test]
        fn test_k2c_rounds_to_two_places() {
            assert_eq!(k2c(Some(288.123)), Some(14.97));
            assert_eq!(k2c(Some(288.126)), Some(14.98));
        }

        #[test]
        fn test_k2c_missing() {
            assert_eq!(k2c(None), None);
            assert_eq!(k2c(Some(0.0)), None);
            assert_eq!(k2c(Some(f64::NAN)), None);
        }

        #[test]
        fn test_k2c_display_drops_trailing_zeros() {
            assert_eq!(format!("{}", k2c(Some(300.15)).unwrap()), "27");
            assert_eq!(format!("{}", k2c(Some(300.0)).unwrap()), "26.85");
        }

        #[test]
        fn test_k2c_no_negative_zero() {
            let just_below = k2c(Some(273.149)).unwrap();
            assert!(just_below.is_sign_positive());
            assert_eq!(format!("{just_below}"), "0");
        }
    }
}
