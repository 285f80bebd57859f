//! Risk bands and the recommendations attached to them.

use serde::{Deserialize, Serialize};

/// Probability at which a result stops being low risk.
pub const MODERATE_THRESHOLD: f64 = 0.30;

/// Probability at which a result becomes high risk.
pub const HIGH_THRESHOLD: f64 = 0.70;

/// Cardiovascular risk band shown to the clinician.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    /// p < 0.30
    Low,
    /// 0.30 <= p < 0.70
    Moderate,
    /// p >= 0.70
    High,
}

impl RiskBand {
    /// Band for a positive-class probability.
    ///
    /// Intervals are half-open with the lower bound included, so 0.3 is
    /// Moderate and 0.7 is High.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability < MODERATE_THRESHOLD {
            Self::Low
        } else if probability < HIGH_THRESHOLD {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Probability range covered by this band, as `[lower, upper)`.
    ///
    /// High is closed at 1.0: it covers `[0.7, 1.0]`.
    #[must_use]
    pub fn range(self) -> (f64, f64) {
        match self {
            Self::Low => (0.0, MODERATE_THRESHOLD),
            Self::Moderate => (MODERATE_THRESHOLD, HIGH_THRESHOLD),
            Self::High => (HIGH_THRESHOLD, 1.0),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
        }
    }

    /// Static recommendation text for this band.
    #[must_use]
    pub fn recommendations(self) -> &'static [&'static str; 3] {
        match self {
            Self::Low => &[
                "Continue maintaining healthy lifestyle habits and undergo regular check-ups.",
                "Maintain a balanced diet with adequate nutrition.",
                "Engage in moderate exercise regularly to improve fitness.",
            ],
            Self::Moderate => &[
                "Be mindful of diet and exercise, monitor health indicators regularly, and consult a physician.",
                "Schedule regular health check-ups, focus on blood pressure and lipid levels.",
                "Maintain mental well-being and manage stress appropriately.",
            ],
            Self::High => &[
                "Seek medical attention promptly for comprehensive evaluation and treatment.",
                "Adhere strictly to medical advice and medication regimens.",
                "Ensure adequate rest and avoid overexertion.",
            ],
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Raw classifier output for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Hard label: 1 = elevated CVD risk
    pub predicted_label: u8,

    /// Probability of the positive class (0.0 to 1.0)
    pub probability: f64,
}

/// Everything the presentation layer needs to render a result.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub band: RiskBand,

    pub prediction: PredictionResult,

    /// Probability formatted as a percentage with two decimals
    pub percentage: String,

    pub recommendations: &'static [&'static str; 3],

    pub assessed_at: chrono::DateTime<chrono::Utc>,
}

impl RiskAssessment {
    #[must_use]
    pub fn new(prediction: PredictionResult) -> Self {
        let band = RiskBand::from_probability(prediction.probability);
        Self {
            band,
            prediction,
            percentage: format_percentage(prediction.probability),
            recommendations: band.recommendations(),
            assessed_at: chrono::Utc::now(),
        }
    }

    /// Headline such as `Risk Level: Low Risk (12.00%)`.
    #[must_use]
    pub fn headline(&self) -> String {
        format!("Risk Level: {} ({})", self.band.name(), self.percentage)
    }
}

/// Format a probability as a percentage with two decimals (`0.1234` → `12.34%`).
#[must_use]
pub fn format_percentage(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(RiskBand::from_probability(0.0), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(0.299999), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(0.3), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.5), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.699999), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.7), RiskBand::High);
        assert_eq!(RiskBand::from_probability(1.0), RiskBand::High);
    }

    #[test]
    fn test_ranges_agree_with_banding() {
        for band in [RiskBand::Low, RiskBand::Moderate, RiskBand::High] {
            let (lower, _) = band.range();
            assert_eq!(RiskBand::from_probability(lower), band);
        }
    }

    #[test]
    fn test_high_range_includes_certainty() {
        let (lower, upper) = RiskBand::High.range();
        assert_eq!(RiskBand::from_probability(upper), RiskBand::High);
        assert_eq!(RiskBand::from_probability(lower), RiskBand::High);

        let (_, moderate_upper) = RiskBand::Moderate.range();
        assert_eq!(RiskBand::from_probability(moderate_upper), RiskBand::High);
    }

    #[test]
    fn test_each_band_has_three_distinct_recommendations() {
        let low = RiskBand::Low.recommendations();
        let moderate = RiskBand::Moderate.recommendations();
        let high = RiskBand::High.recommendations();
        assert_ne!(low, moderate);
        assert_ne!(moderate, high);
        assert!(high[0].starts_with("Seek medical attention"));
    }

    #[test]
    fn test_assessment_formatting() {
        let a = RiskAssessment::new(PredictionResult {
            predicted_label: 0,
            probability: 0.12,
        });
        assert_eq!(a.band, RiskBand::Low);
        assert_eq!(a.percentage, "12.00%");
        assert_eq!(a.headline(), "Risk Level: Low Risk (12.00%)");
        assert_eq!(a.recommendations, RiskBand::Low.recommendations());
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(format_percentage(0.7), "70.00%");
        assert_eq!(format_percentage(1.0), "100.00%");
        assert_eq!(format_percentage(0.123456), "12.35%");
    }
}
