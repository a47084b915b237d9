// Ingredient fractions as entered by the user, plus their validation rule.

use std::fmt;

/// Mass fractions of the three ingredients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngredientRatios {
    pub kno3: f64,
    pub charcoal: f64,
    pub sulfur: f64,
}

/// Reasons a set of ratios cannot drive a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatioError {
    NonFinite,
    Negative,
    SumMismatch { sum: f64 },
}

impl fmt::Display for RatioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioError::NonFinite => write!(f, "ingredient ratios must be finite numbers"),
            RatioError::Negative => write!(f, "ingredient ratios cannot be negative"),
            RatioError::SumMismatch { sum } => {
                write!(f, "ingredient ratios must add up to 1.00 (currently {sum:.2})")
            }
        }
    }
}

impl Default for IngredientRatios {
    fn default() -> Self {
        // Classic 75/15/10 is the textbook mix; the sketch ships with 50/30/20.
        Self {
            kno3: 0.5,
            charcoal: 0.3,
            sulfur: 0.2,
        }
    }
}

impl IngredientRatios {
    pub fn new(kno3: f64, charcoal: f64, sulfur: f64) -> Self {
        Self {
            kno3,
            charcoal,
            sulfur,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.kno3, self.charcoal, self.sulfur]
    }

    pub fn sum(&self) -> f64 {
        self.kno3 + self.charcoal + self.sulfur
    }

    /// Checks that the fractions add up to 1 once rounded to two decimals.
    pub fn validate(&self) -> Result<(), RatioError> {
        let values = self.as_array();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(RatioError::NonFinite);
        }
        if values.iter().any(|v| *v < 0.0) {
            return Err(RatioError::Negative);
        }

        let sum = self.sum();
        if round_to(sum, 2) != 1.0 {
            return Err(RatioError::SumMismatch { sum });
        }
        Ok(())
    }
}

/// Rounds half away from zero after trimming float noise past 11 digits,
/// so 1.005 style inputs round the way a person reading them expects.
fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    let scaled = (value * scale * 1e11).round() / 1e11;
    scaled.round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_ratios_sum_to_one_then_validation_passes() {
        assert_eq!(IngredientRatios::new(0.5, 0.3, 0.2).validate(), Ok(()));
        assert_eq!(IngredientRatios::new(0.75, 0.15, 0.10).validate(), Ok(()));
        assert_eq!(IngredientRatios::new(0.7, 0.3, 0.0).validate(), Ok(()));
    }

    #[test]
    fn when_sum_rounds_to_one_at_two_decimals_then_validation_passes() {
        assert_eq!(IngredientRatios::new(0.5, 0.3, 0.204).validate(), Ok(()));
        assert_eq!(IngredientRatios::new(0.5, 0.3, 0.196).validate(), Ok(()));
    }

    #[test]
    fn when_ratios_sum_to_point_nine_nine_then_returns_sum_mismatch() {
        let result = IngredientRatios::new(0.5, 0.3, 0.19).validate();
        assert!(matches!(result, Err(RatioError::SumMismatch { .. })));
    }

    #[test]
    fn when_ratio_is_negative_then_returns_negative() {
        let result = IngredientRatios::new(1.2, -0.2, 0.0).validate();
        assert_eq!(result, Err(RatioError::Negative));
    }

    #[test]
    fn when_ratio_is_nan_then_returns_non_finite() {
        let result = IngredientRatios::new(f64::NAN, 0.5, 0.5).validate();
        assert_eq!(result, Err(RatioError::NonFinite));
    }

    #[test]
    fn when_sum_mismatches_then_message_shows_rounded_sum() {
        let err = RatioError::SumMismatch { sum: 0.99 };
        assert_eq!(
            err.to_string(),
            "ingredient ratios must add up to 1.00 (currently 0.99)"
        );
    }
}
