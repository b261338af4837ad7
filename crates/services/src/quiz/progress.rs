/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizProgress {
    /// 1-based position of the current question.
    pub current: usize,
    pub total: usize,
    pub answered: usize,
    /// Share of the quiz reached so far, counting the current question.
    pub percent: f64,
}

impl QuizProgress {
    pub(crate) fn new(index: usize, total: usize, answered: usize) -> Self {
        let current = (index + 1).min(total);
        #[allow(clippy::cast_precision_loss)]
        let percent = if total == 0 {
            0.0
        } else {
            current as f64 * 100.0 / total as f64
        };
        Self {
            current,
            total,
            answered,
            percent,
        }
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_counts_current_question() {
        let progress = QuizProgress::new(0, 4, 0);
        assert_eq!(progress.current, 1);
        assert!((progress.percent - 25.0).abs() < f64::EPSILON);
        assert!(!progress.is_last());

        let last = QuizProgress::new(3, 4, 4);
        assert!((last.percent - 100.0).abs() < f64::EPSILON);
        assert!(last.is_last());
    }
}
