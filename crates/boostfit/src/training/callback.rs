//! Early stopping callback for training.
//!
//! Monitors a validation metric, remembers the best round, and signals a stop
//! once no improvement has been seen for `patience` rounds.

/// Outcome of feeding one round's metric to [`EarlyStopping::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStopAction {
    /// The value improved on the best seen so far.
    Improved,
    /// No improvement, keep training.
    Continue,
    /// No improvement for more than `patience` rounds.
    Stop,
}

/// Early stopping configuration and state.
///
/// The best round is tracked even when stopping is disabled (`patience == 0`),
/// so the trainer can still select the best iteration.
///
/// # Example
///
/// ```
/// use boostfit::training::{EarlyStopAction, EarlyStopping};
///
/// // Lower is better (e.g. RMSE)
/// let mut early_stop = EarlyStopping::new(2, false);
/// assert_eq!(early_stop.update(1.0), EarlyStopAction::Improved);
/// assert_eq!(early_stop.update(1.5), EarlyStopAction::Continue);
/// assert_eq!(early_stop.update(1.5), EarlyStopAction::Continue);
/// assert_eq!(early_stop.update(1.5), EarlyStopAction::Stop);
/// assert_eq!(early_stop.best_round(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    /// Rounds without improvement before stopping; 0 disables stopping.
    patience: usize,
    best_value: Option<f64>,
    best_round: usize,
    current_round: usize,
    higher_is_better: bool,
}

impl EarlyStopping {
    pub fn new(patience: usize, higher_is_better: bool) -> Self {
        Self {
            patience,
            best_value: None,
            best_round: 0,
            current_round: 0,
            higher_is_better,
        }
    }

    /// Whether this callback may stop training.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.patience > 0
    }

    /// Record the metric value of the current round.
    ///
    /// Non-finite values never count as improvements.
    pub fn update(&mut self, value: f64) -> EarlyStopAction {
        let is_improvement = value.is_finite()
            && match self.best_value {
                None => true,
                Some(best) if self.higher_is_better => value > best,
                Some(best) => value < best,
            };

        let round = self.current_round;
        self.current_round += 1;

        if is_improvement {
            self.best_value = Some(value);
            self.best_round = round;
            return EarlyStopAction::Improved;
        }

        if self.is_enabled() && round - self.best_round > self.patience {
            EarlyStopAction::Stop
        } else {
            EarlyStopAction::Continue
        }
    }

    /// Best metric value observed.
    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Zero-based round at which the best value was observed.
    pub fn best_round(&self) -> usize {
        self.best_round
    }

    /// Number of rounds recorded so far.
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn reset(&mut self) {
        self.best_value = None;
        self.best_round = 0;
        self.current_round = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_stop_while_improving() {
        let mut early_stop = EarlyStopping::new(3, false);
        for v in [1.0, 0.9, 0.8, 0.7, 0.6] {
            assert_eq!(early_stop.update(v), EarlyStopAction::Improved);
        }
        assert_eq!(early_stop.best_round(), 4);
        assert_eq!(early_stop.best_value(), Some(0.6));
    }

    #[test]
    fn stops_after_patience() {
        let mut early_stop = EarlyStopping::new(3, false);
        assert_eq!(early_stop.update(0.5), EarlyStopAction::Improved);
        assert_eq!(early_stop.update(0.6), EarlyStopAction::Continue);
        assert_eq!(early_stop.update(0.7), EarlyStopAction::Continue);
        assert_eq!(early_stop.update(0.8), EarlyStopAction::Continue);
        assert_eq!(early_stop.update(0.9), EarlyStopAction::Stop);
        assert_eq!(early_stop.best_round(), 0);
    }

    #[test]
    fn higher_is_better() {
        let mut early_stop = EarlyStopping::new(1, true);
        assert_eq!(early_stop.update(0.5), EarlyStopAction::Improved);
        assert_eq!(early_stop.update(0.7), EarlyStopAction::Improved);
        assert_eq!(early_stop.update(0.6), EarlyStopAction::Continue);
        assert_eq!(early_stop.update(0.6), EarlyStopAction::Stop);
        assert_eq!(early_stop.best_round(), 1);
    }

    #[test]
    fn disabled_still_tracks_best() {
        let mut early_stop = EarlyStopping::new(0, false);
        assert!(!early_stop.is_enabled());
        early_stop.update(2.0);
        early_stop.update(1.0);
        for _ in 0..10 {
            assert_eq!(early_stop.update(3.0), EarlyStopAction::Continue);
        }
        assert_eq!(early_stop.best_round(), 1);
        assert_eq!(early_stop.current_round(), 12);

        early_stop.reset();
        assert_eq!(early_stop.best_value(), None);
    }

    #[test]
    fn nan_is_not_improvement() {
        let mut early_stop = EarlyStopping::new(5, false);
        assert_eq!(early_stop.update(f64::NAN), EarlyStopAction::Continue);
        assert_eq!(early_stop.best_value(), None);
    }
}
