//! Candidate scoring.
//!
//! Each factor is a separate function so it can be tuned and tested on its
//! own; a candidate's score is the plain sum of the factors.

use ledgerwise_shared::MatchingConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::Confidence;

/// Score for an amount within `amount_tolerance` of the remaining amount.
pub const EXACT_AMOUNT_SCORE: u32 = 100;

/// Days within which an exact amount counts as high confidence.
pub const HIGH_CONFIDENCE_DAYS: u32 = 7;

/// Days within which a candidate counts as medium confidence.
pub const MEDIUM_CONFIDENCE_DAYS: u32 = 14;

/// Per-request overrides of the configured matching defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOverrides {
    /// Absolute tolerance for an exact amount match.
    pub amount_tolerance: Option<Decimal>,
    /// Date window in days.
    pub max_days: Option<u32>,
    /// Minimum total score.
    pub min_score: Option<u32>,
    /// Candidates per movement.
    pub max_candidates: Option<usize>,
    /// Cap on auto-match actions.
    pub max_actions: Option<usize>,
    /// Only same-currency documents.
    pub currency_strict: Option<bool>,
    /// Score exact amounts above near ones.
    pub prefer_exact_amount: Option<bool>,
    /// Weight of the text overlap factor.
    pub text_weight: Option<u32>,
}

/// Effective, clamped matching parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchParams {
    /// Absolute tolerance for an exact amount match, 0..=10.
    pub amount_tolerance: Decimal,
    /// Looser tolerance as a fraction of the remaining amount.
    pub near_amount_ratio: Decimal,
    /// Score inside the looser tolerance.
    pub near_amount_score: u32,
    /// Date window, 1..=365.
    pub max_days: u32,
    /// Minimum total score, 0..=1000.
    pub min_score: u32,
    /// Candidates per movement, 1..=10.
    pub max_candidates: usize,
    /// Auto-match action cap, 1..=500.
    pub max_actions: usize,
    /// Only same-currency documents.
    pub currency_strict: bool,
    /// Score exact amounts above near ones.
    pub prefer_exact_amount: bool,
    /// Weight of the text overlap factor, 0..=1000.
    pub text_weight: u32,
}

impl MatchParams {
    /// Merges overrides into the configured defaults and clamps every value
    /// into its allowed range.
    #[must_use]
    pub fn resolve(config: &MatchingConfig, overrides: &MatchOverrides) -> Self {
        let tolerance = overrides.amount_tolerance.unwrap_or(config.amount_tolerance);
        Self {
            amount_tolerance: tolerance.clamp(Decimal::ZERO, Decimal::TEN),
            near_amount_ratio: config.near_amount_ratio.max(Decimal::ZERO),
            near_amount_score: config.near_amount_score,
            max_days: overrides.max_days.unwrap_or(config.max_days).clamp(1, 365),
            min_score: overrides.min_score.unwrap_or(config.min_score).min(1000),
            max_candidates: overrides.max_candidates.unwrap_or(config.max_candidates).clamp(1, 10),
            max_actions: overrides.max_actions.unwrap_or(config.max_actions).clamp(1, 500),
            currency_strict: overrides.currency_strict.unwrap_or(config.currency_strict),
            prefer_exact_amount: overrides.prefer_exact_amount.unwrap_or(config.prefer_exact_amount),
            text_weight: overrides.text_weight.unwrap_or(config.text_weight).min(1000),
        }
    }

    /// Whether `candidate` equals `remaining` within the exact tolerance.
    #[must_use]
    pub fn is_exact(&self, candidate: Decimal, remaining: Decimal) -> bool {
        (candidate - remaining).abs() <= self.amount_tolerance
    }
}

impl Default for MatchParams {
    fn default() -> Self {
        Self::resolve(&MatchingConfig::default(), &MatchOverrides::default())
    }
}

/// Amount factor.
///
/// Returns the score and whether the amount is exact, or `None` when the
/// candidate is outside both tolerances and must be dropped.
#[must_use]
pub fn amount_score(params: &MatchParams, candidate: Decimal, remaining: Decimal) -> Option<(u32, bool)> {
    if params.is_exact(candidate, remaining) {
        let score = if params.prefer_exact_amount {
            EXACT_AMOUNT_SCORE
        } else {
            params.near_amount_score
        };
        return Some((score, true));
    }
    let near = remaining.abs() * params.near_amount_ratio;
    ((candidate - remaining).abs() <= near).then_some((params.near_amount_score, false))
}

/// Date factor: `max(0, max_days − min(|days|, max_days))`.
#[must_use]
pub fn date_score(max_days: u32, days_apart: i64) -> u32 {
    let days = u32::try_from(days_apart.unsigned_abs()).unwrap_or(u32::MAX);
    max_days - days.min(max_days)
}

/// Text factor: the share of the document number's tokens that appear in
/// the reference text, scaled to `weight`.
#[must_use]
pub fn text_score(weight: u32, reference: &[Option<&str>], number: &str) -> u32 {
    if weight == 0 {
        return 0;
    }
    let wanted = tokens(number);
    if wanted.is_empty() {
        return 0;
    }
    let haystack: Vec<String> = reference.iter().flatten().flat_map(|text| tokens(text)).collect();
    let hits = wanted.iter().filter(|t| haystack.contains(t)).count();
    let hits = u32::try_from(hits).unwrap_or(u32::MAX);
    let total = u32::try_from(wanted.len()).unwrap_or(u32::MAX);
    weight.saturating_mul(hits) / total
}

/// Confidence band for a candidate.
#[must_use]
pub fn confidence(exact_amount: bool, days_apart: i64, max_days: u32) -> Confidence {
    let days = days_apart.unsigned_abs();
    if exact_amount && days <= u64::from(HIGH_CONFIDENCE_DAYS.min(max_days)) {
        Confidence::High
    } else if exact_amount || days <= u64::from(MEDIUM_CONFIDENCE_DAYS.min(max_days)) {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(500), dec!(500), Some((100, true)))]
    #[case(dec!(500.01), dec!(500), Some((100, true)))]
    #[case(dec!(510), dec!(500), Some((60, false)))]
    #[case(dec!(530), dec!(500), None)]
    fn test_amount_score(#[case] candidate: Decimal, #[case] remaining: Decimal, #[case] expected: Option<(u32, bool)>) {
        assert_eq!(amount_score(&MatchParams::default(), candidate, remaining), expected);
    }

    #[test]
    fn test_amount_score_without_exact_preference() {
        let params = MatchParams::resolve(
            &MatchingConfig::default(),
            &MatchOverrides {
                prefer_exact_amount: Some(false),
                ..MatchOverrides::default()
            },
        );
        assert_eq!(amount_score(&params, dec!(100), dec!(100)), Some((60, true)));
    }

    #[rstest]
    #[case(0, 30)]
    #[case(-5, 25)]
    #[case(5, 25)]
    #[case(30, 0)]
    #[case(400, 0)]
    fn test_date_score(#[case] days: i64, #[case] expected: u32) {
        assert_eq!(date_score(30, days), expected);
    }

    #[test]
    fn test_text_score_token_overlap() {
        let reference = [Some("Payment for INV-2025-00042"), None];
        assert_eq!(text_score(30, &reference, "INV-2025-00042"), 30);
        assert_eq!(text_score(30, &reference, "INV-2025-00099"), 20);
        assert_eq!(text_score(0, &reference, "INV-2025-00042"), 0);
        assert_eq!(text_score(30, &[None], "INV-2025-00042"), 0);
    }

    #[rstest]
    #[case(true, 3, Confidence::High)]
    #[case(true, 10, Confidence::Medium)]
    #[case(false, 10, Confidence::Medium)]
    #[case(false, 20, Confidence::Low)]
    fn test_confidence(#[case] exact: bool, #[case] days: i64, #[case] expected: Confidence) {
        assert_eq!(confidence(exact, days, 30), expected);
    }

    #[test]
    fn test_confidence_respects_short_window() {
        assert_eq!(confidence(true, 6, 5), Confidence::Medium);
    }

    #[test]
    fn test_overrides_are_clamped() {
        let params = MatchParams::resolve(
            &MatchingConfig::default(),
            &MatchOverrides {
                amount_tolerance: Some(dec!(50)),
                max_days: Some(0),
                min_score: Some(5000),
                max_candidates: Some(99),
                max_actions: Some(0),
                text_weight: Some(u32::MAX),
                ..MatchOverrides::default()
            },
        );
        assert_eq!(params.amount_tolerance, dec!(10));
        assert_eq!(params.max_days, 1);
        assert_eq!(params.min_score, 1000);
        assert_eq!(params.max_candidates, 10);
        assert_eq!(params.max_actions, 1);
        assert_eq!(params.text_weight, 1000);
    }
}
