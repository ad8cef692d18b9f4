// src/scoring.rs
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ScoringError;
use crate::features::{extract_features, FeatureVector, TradeInput};

/// Scores above this are a favorable verdict
pub const FAVORABLE_THRESHOLD: f64 = 0.5;

/// External model boundary: a full-length feature vector in, a value in [0, 1] out
pub trait ScoringModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Prediction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingAnalysis {
    pub wallet_address: String,
    pub prediction: Prediction,
    pub predicted_success_rate: f64,
    pub features: FeatureVector,
}

/// Extract features from `trades`, score them and map the score to a verdict.
/// Extraction errors propagate; a partial vector never reaches the model.
pub fn analyze_wallet(
    model: &dyn ScoringModel,
    wallet_address: &str,
    trades: &[TradeInput],
    today: NaiveDate,
) -> Result<TradingAnalysis, ScoringError> {
    let features = extract_features(trades, today)?;
    let score = model.predict(&features);
    if !(0.0..=1.0).contains(&score) {
        return Err(ScoringError::ScoreOutOfRange(score));
    }

    Ok(TradingAnalysis {
        wallet_address: wallet_address.to_string(),
        prediction: if score > FAVORABLE_THRESHOLD {
            Prediction::Buy
        } else {
            Prediction::Sell
        },
        predicted_success_rate: score,
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatureError;
    use crate::features::{Feature, FEATURE_VECTOR_LEN};

    struct Fixed(f64);

    impl ScoringModel for Fixed {
        fn predict(&self, features: &FeatureVector) -> f64 {
            assert_eq!(features.as_slice().len(), FEATURE_VECTOR_LEN);
            self.0
        }
    }

    fn trades() -> Vec<TradeInput> {
        vec![TradeInput {
            amount: Some(1.5),
            status: Some("success".to_string()),
            date: Some("2024-11-01".to_string()),
        }]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()
    }

    #[test]
    fn verdict_follows_threshold() {
        let buy = analyze_wallet(&Fixed(0.8), "W", &trades(), today()).unwrap();
        assert_eq!(buy.prediction, Prediction::Buy);
        assert_eq!(buy.predicted_success_rate, 0.8);
        assert_eq!(buy.features.get(Feature::TotalVolume), 1.5);

        let sell = analyze_wallet(&Fixed(0.5), "W", &trades(), today()).unwrap();
        assert_eq!(sell.prediction, Prediction::Sell);
    }

    #[test]
    fn extraction_errors_reach_the_caller() {
        assert_eq!(
            analyze_wallet(&Fixed(0.9), "W", &[], today()),
            Err(ScoringError::Features(FeatureError::InsufficientData))
        );
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        assert_eq!(
            analyze_wallet(&Fixed(1.7), "W", &trades(), today()),
            Err(ScoringError::ScoreOutOfRange(1.7))
        );
    }
}
