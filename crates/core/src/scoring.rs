//! Score to result-band resolution.

use thiserror::Error;

use crate::model::{QuizDefinition, ResultBand};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("score {score} is outside every result band (0..={max})")]
    OutOfRange { score: u32, max: u32 },

    #[error("quiz has no result bands")]
    NoBands,
}

/// What to do with a score that no band contains.
///
/// A validated quiz covers `0..=max_score` without gaps, so through [`resolve`]
/// this only applies to scores above the maximum (answers recorded with
/// out-of-catalog points). Over a raw band list a gap also falls through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandFallback {
    /// Map any unmatched score to the first band in the list, so a score
    /// above the top band lands in the lowest one.
    FirstBand,
    /// Clamp to the first band below the range and the last band above it.
    #[default]
    Nearest,
    /// Report `ScoringError::OutOfRange`.
    Reject,
}

/// Resolve the band for `score` using first-match over the quiz's band list.
///
/// # Errors
///
/// Returns `ScoringError::OutOfRange` when no band matches and `fallback` is
/// `Reject`, or `ScoringError::NoBands` if the band list is empty.
pub fn resolve(
    quiz: &QuizDefinition,
    score: u32,
    fallback: BandFallback,
) -> Result<&ResultBand, ScoringError> {
    resolve_bands(quiz.results(), score, fallback)
}

/// Band resolution over a raw, possibly gapped, band list.
pub(crate) fn resolve_bands(
    bands: &[ResultBand],
    score: u32,
    fallback: BandFallback,
) -> Result<&ResultBand, ScoringError> {
    if let Some(band) = bands.iter().find(|band| band.contains(score)) {
        return Ok(band);
    }

    let first = bands.first().ok_or(ScoringError::NoBands)?;
    match fallback {
        BandFallback::FirstBand => Ok(first),
        BandFallback::Nearest => {
            if score < first.min {
                Ok(first)
            } else {
                bands
                    .iter()
                    .filter(|band| band.max < score)
                    .max_by_key(|band| band.max)
                    .ok_or(ScoringError::NoBands)
            }
        }
        BandFallback::Reject => Err(ScoringError::OutOfRange {
            score,
            max: bands.iter().map(|band| band.max).max().unwrap_or(0),
        }),
    }
}

/// Sum of `points`, or `None` if the total does not fit in a `u32`.
#[must_use]
pub fn total_points(points: impl IntoIterator<Item = u32>) -> Option<u32> {
    points.into_iter().try_fold(0_u32, u32::checked_add)
}

/// `round(score / max_score * 100)`, rounding halves up.
///
/// Returns 0 when `max_score` is 0.
#[must_use]
pub fn percentage(score: u32, max_score: u32) -> u32 {
    if max_score == 0 {
        return 0;
    }
    let score = u64::from(score);
    let max = u64::from(max_score);
    let rounded = (score * 200 + max) / (2 * max);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quiz_fixtures::band;

    fn bands() -> Vec<ResultBand> {
        vec![band(0, 6, "risk"), band(7, 12, "dev"), band(13, 18, "ready")]
    }

    #[test]
    fn first_match_is_total_over_achievable_scores() {
        let bands = bands();
        for score in 0..=18 {
            let band = resolve_bands(&bands, score, BandFallback::Reject).unwrap();
            assert!(band.contains(score));
        }
    }

    #[test]
    fn boundaries_land_in_expected_bands() {
        let bands = bands();
        assert_eq!(resolve_bands(&bands, 6, BandFallback::Reject).unwrap().status, "risk");
        assert_eq!(resolve_bands(&bands, 7, BandFallback::Reject).unwrap().status, "dev");
        assert_eq!(resolve_bands(&bands, 13, BandFallback::Reject).unwrap().status, "ready");
    }

    #[test]
    fn score_above_range_under_each_policy() {
        let bands = bands();
        assert_eq!(
            resolve_bands(&bands, 19, BandFallback::FirstBand).unwrap().status,
            "risk"
        );
        assert_eq!(
            resolve_bands(&bands, 19, BandFallback::Nearest).unwrap().status,
            "ready"
        );
        assert_eq!(
            resolve_bands(&bands, 19, BandFallback::Reject).unwrap_err(),
            ScoringError::OutOfRange { score: 19, max: 18 }
        );
    }

    #[test]
    fn nearest_clamps_below_range_to_first_band() {
        let bands = vec![band(2, 4, "low"), band(5, 8, "high")];
        assert_eq!(
            resolve_bands(&bands, 0, BandFallback::Nearest).unwrap().status,
            "low"
        );
    }

    #[test]
    fn empty_band_list_is_an_error() {
        assert_eq!(
            resolve_bands(&[], 3, BandFallback::FirstBand).unwrap_err(),
            ScoringError::NoBands
        );
    }

    #[test]
    fn gap_in_raw_bands_uses_fallback() {
        let bands = vec![band(0, 2, "low"), band(5, 8, "high")];
        assert_eq!(
            resolve_bands(&bands, 3, BandFallback::Nearest).unwrap().status,
            "low"
        );
        assert!(resolve_bands(&bands, 3, BandFallback::Reject).is_err());
    }

    #[test]
    fn total_points_detects_overflow() {
        assert_eq!(total_points([3, 2, 1]), Some(6));
        assert_eq!(total_points([]), Some(0));
        assert_eq!(total_points([u32::MAX, 0]), Some(u32::MAX));
        assert_eq!(total_points([u32::MAX, 1]), None);
    }

    #[test]
    fn percentage_handles_large_scores() {
        assert_eq!(percentage(19, 18), 106);
        assert_eq!(percentage(u32::MAX, 1), u32::MAX);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(18, 18), 100);
        assert_eq!(percentage(0, 18), 0);
        assert_eq!(percentage(9, 18), 50);
        // 1/18 = 5.55..%
        assert_eq!(percentage(1, 18), 6);
        // 1/8 = 12.5%
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(3, 0), 0);
    }
}
