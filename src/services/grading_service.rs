use crate::models::answer::RawEvaluation;

pub struct GradingService;

impl GradingService {
    /// Converts an evaluator's native-range score onto the question's
    /// configured mark scale:
    /// - mcq: all-or-nothing at `positive_marking`
    /// - coding: evaluator returns 0-10, scaled by `(raw / 10) * marking`
    /// - audio/video: evaluator returns 0-1, scaled by `raw * marking`
    /// Without a scale the native raw score is reported unchanged apart
    /// from rounding.
    pub fn finalize(
        question_type: &str,
        evaluation: &RawEvaluation,
        positive_marking: Option<f64>,
    ) -> Option<f64> {
        let raw = evaluation.score?;

        match positive_marking {
            Some(marking) => match question_type {
                "mcq" => {
                    if evaluation.is_correct == Some(true) {
                        Some(marking)
                    } else {
                        Some(0.0)
                    }
                }
                "coding" => Some(round3(raw / 10.0 * marking)),
                _ => Some(round3(raw * marking)),
            },
            None => Some(round3(raw)),
        }
    }
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
