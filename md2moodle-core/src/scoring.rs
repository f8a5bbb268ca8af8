//! Per-answer credit
//!
//! With `k` correct answers each correct answer is worth `100 / k` percent and every
//! incorrect answer is worth exactly zero. The value is kept at full `f64` precision; only
//! the XML serializer rounds it for output.

use thiserror::Error;

/// The question has no answer marked correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("question has no answer marked correct")]
pub struct NoCorrectAnswer;

/// Compute the Moodle fraction of every answer, in order.
pub fn answer_fractions(correct: &[bool]) -> Result<Vec<f64>, NoCorrectAnswer> {
    let k = correct.iter().filter(|&&c| c).count();
    if k == 0 {
        return Err(NoCorrectAnswer);
    }
    let share = 100.0 / k as f64;
    Ok(correct
        .iter()
        .map(|&c| if c { share } else { 0.0 })
        .collect())
}
