//! Ranking: validation, stable descending sort and top-N truncation

use crate::error::{LeaderboardError, LeaderboardResult};
use crate::types::ScoreEntry;
use std::cmp::Ordering;

/// Sort descending by score and keep the first `capacity` entries.
///
/// The sort is stable: equal scores keep their relative order, so an earlier
/// submission outranks a later one with the same score. `-0.0` and `0.0`
/// compare equal.
pub fn rank(entries: &mut Vec<ScoreEntry>, capacity: usize) {
    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    entries.truncate(capacity);
}

/// Reject empty or whitespace-only player names
pub fn validate_name(name: &str) -> LeaderboardResult<()> {
    if name.trim().is_empty() {
        return Err(LeaderboardError::InvalidInput(
            "Name and score are required.".to_string(),
        ));
    }
    Ok(())
}

/// Reject NaN and infinite scores
pub fn validate_score(score: f64) -> LeaderboardResult<()> {
    if !score.is_finite() {
        return Err(LeaderboardError::InvalidInput(
            "Score must be a finite number.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn entry(name: &str, score: f64) -> ScoreEntry {
        ScoreEntry::new(name, score, Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    fn names(entries: &[ScoreEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn is_ranked(entries: &[ScoreEntry]) -> bool {
        entries.windows(2).all(|w| w[0].score >= w[1].score)
    }

    #[test]
    fn test_rank_sorts_descending() {
        let mut board = vec![entry("a", 50.0), entry("b", 80.0), entry("c", 60.0)];
        rank(&mut board, 10);
        assert_eq!(names(&board), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let mut board = vec![
            entry("first", 10.0),
            entry("high", 20.0),
            entry("second", 10.0),
            entry("third", 10.0),
        ];
        rank(&mut board, 10);
        assert_eq!(names(&board), vec!["high", "first", "second", "third"]);
    }

    #[test]
    fn test_rank_truncates() {
        let mut board: Vec<ScoreEntry> = (0..15).map(|i| entry("p", i as f64)).collect();
        rank(&mut board, 10);
        assert_eq!(board.len(), 10);
        assert_eq!(board[0].score, 14.0);
        assert_eq!(board[9].score, 5.0);
    }

    #[test]
    fn test_rank_negative_and_fractional_scores() {
        let mut board = vec![entry("neg", -3.5), entry("zero", 0.0), entry("frac", 0.25)];
        rank(&mut board, 10);
        assert_eq!(names(&board), vec!["frac", "zero", "neg"]);
    }

    #[test]
    fn test_rank_signed_zero_is_a_tie() {
        let mut board = vec![entry("early", -0.0), entry("late", 0.0)];
        rank(&mut board, 10);
        assert_eq!(names(&board), vec!["early", "late"]);

        let mut board = vec![entry("early", 0.0), entry("late", -0.0)];
        rank(&mut board, 10);
        assert_eq!(names(&board), vec!["early", "late"]);
    }

    #[test]
    fn test_rank_random_boards() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let len = rng.gen_range(0..30usize);
            let mut board: Vec<ScoreEntry> = (0..len)
                .map(|i| entry(&format!("p{}", i), rng.gen_range(0..20i32) as f64))
                .collect();
            let best = board.iter().map(|e| e.score).fold(f64::MIN, f64::max);

            rank(&mut board, 10);

            assert!(board.len() <= 10);
            assert!(is_ranked(&board));
            if let Some(top) = board.first() {
                assert_eq!(top.score, best);
            }
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Alice").is_ok());
        assert!(matches!(
            validate_name(""),
            Err(LeaderboardError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_name("   "),
            Err(LeaderboardError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_score() {
        assert!(validate_score(0.0).is_ok());
        assert!(validate_score(-12.5).is_ok());
        assert!(validate_score(f64::NAN).is_err());
        assert!(validate_score(f64::INFINITY).is_err());
    }
}
