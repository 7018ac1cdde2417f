//! Game accuracy from per-move centipawn losses.
//!
//! The score follows an exponential decay in the average loss:
//!
//! ```text
//! accuracy = clamp(103.1668 * exp(-0.004354 * avg_loss) - 3.1669, 0, 100)
//! ```
//!
//! Each move's loss is capped at [`MAX_COUNTED_LOSS`] before averaging, so a single
//! missed mate does not flatten the whole game to zero.

/// Per-move loss cap used when averaging.
pub const MAX_COUNTED_LOSS: i32 = 1000;

const SCALE: f32 = 103.166_8;
const DECAY: f32 = 0.004_354;
const OFFSET: f32 = 3.166_9;

/// Maps a list of centipawn losses to a 0-100 accuracy score.
///
/// Returns exactly 100 for an empty list or a list of zeros.
///
/// # Example
///
/// ```
/// use kibitz_evaluator::accuracy::calculate_accuracy;
///
/// assert_eq!(calculate_accuracy(&[]), 100.0);
/// assert_eq!(calculate_accuracy(&[0, 0, 0]), 100.0);
/// assert!(calculate_accuracy(&[20, 30]) > calculate_accuracy(&[80, 120]));
/// ```
#[must_use]
pub fn calculate_accuracy(cp_losses: &[i32]) -> f32 {
    if cp_losses.iter().all(|&loss| loss <= 0) {
        return 100.0;
    }
    let total: i64 = cp_losses
        .iter()
        .map(|&loss| i64::from(loss.clamp(0, MAX_COUNTED_LOSS)))
        .sum();
    #[expect(clippy::cast_precision_loss)]
    let average = total as f32 / cp_losses.len() as f32;
    (SCALE * (-DECAY * average).exp() - OFFSET).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_games() {
        assert!((calculate_accuracy(&[]) - 100.0).abs() < f32::EPSILON);
        assert!((calculate_accuracy(&[0; 40]) - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_monotonically_decreasing() {
        let mut previous = 100.0;
        for average in (5..=750).step_by(5) {
            let accuracy = calculate_accuracy(&[average]);
            assert!(accuracy < previous, "avg {average}: {accuracy} >= {previous}");
            assert!((0.0..=100.0).contains(&accuracy));
            previous = accuracy;
        }
    }

    #[test]
    fn test_losses_are_capped() {
        assert!((calculate_accuracy(&[1000]) - calculate_accuracy(&[99_999])).abs() < f32::EPSILON);
    }

    #[test]
    fn test_typical_values() {
        let accuracy = calculate_accuracy(&[50]);
        assert!((79.0..81.0).contains(&accuracy), "{accuracy}");
    }
}
