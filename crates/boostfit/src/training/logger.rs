//! Training progress logger.
//!
//! Progress goes to stdout, warnings to stderr. Output is filtered by
//! [`Verbosity`].

use std::time::Instant;

use super::eval::MetricValue;

/// Verbosity level for training output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    /// No output.
    Silent,
    /// Warnings only.
    #[default]
    Warning,
    /// Training progress and metrics.
    Info,
    /// Per-tree details.
    Debug,
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "silent" => Some(Self::Silent),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

/// Prints training progress.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    /// Log metrics every `log_period` rounds; the last round is always logged.
    log_period: usize,
    n_rounds: usize,
    started: Option<Instant>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity, log_period: usize) -> Self {
        Self {
            verbosity,
            log_period: log_period.max(1),
            n_rounds: 0,
            started: None,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn start_training(&mut self, n_rounds: usize) {
        self.n_rounds = n_rounds;
        self.started = Some(Instant::now());
        if self.verbosity >= Verbosity::Info {
            println!("[boostfit] training for up to {n_rounds} rounds");
        }
    }

    /// Whether metrics for `round` (zero-based) would be printed.
    pub fn should_log_round(&self, round: usize) -> bool {
        self.verbosity >= Verbosity::Info
            && (round % self.log_period == 0 || round + 1 == self.n_rounds)
    }

    pub fn log_metrics(&self, round: usize, metrics: &[MetricValue]) {
        if !self.should_log_round(round) {
            return;
        }
        println!("{}", format_round(round, metrics));
    }

    pub fn log_tree(&self, round: usize, n_leaves: usize) {
        if self.verbosity >= Verbosity::Debug {
            println!("[{round}] tree with {n_leaves} leaves");
        }
    }

    pub fn log_early_stopping(&self, round: usize, best_round: usize, metric_name: &str) {
        if self.verbosity >= Verbosity::Info {
            println!(
                "[boostfit] early stopping at round {round}: no improvement in {metric_name} since round {best_round}"
            );
        }
    }

    pub fn log_best_iteration(&self, best_round: usize, best_value: f64) {
        if self.verbosity >= Verbosity::Info {
            println!("[boostfit] best iteration {best_round} (score {best_value:.6})");
        }
    }

    pub fn finish_training(&self) {
        if self.verbosity < Verbosity::Info {
            return;
        }
        match self.started {
            Some(start) => println!(
                "[boostfit] training finished in {:.2}s",
                start.elapsed().as_secs_f64()
            ),
            None => println!("[boostfit] training finished"),
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= Verbosity::Warning {
            eprintln!("[boostfit] warning: {message}");
        }
    }
}

fn format_round(round: usize, metrics: &[MetricValue]) -> String {
    let mut line = format!("[{round}]");
    for metric in metrics {
        line.push('\t');
        line.push_str(&metric.to_string());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_ordering() {
        assert!(Verbosity::Silent < Verbosity::Warning);
        assert!(Verbosity::Info < Verbosity::Debug);
        assert_eq!(Verbosity::from_name("info"), Some(Verbosity::Info));
        assert_eq!(Verbosity::from_name(Verbosity::Debug.as_str()), Some(Verbosity::Debug));
    }

    #[test]
    fn log_period_filters_rounds() {
        let mut logger = TrainingLogger::new(Verbosity::Info, 10);
        logger.start_training(25);
        assert!(logger.should_log_round(0));
        assert!(!logger.should_log_round(5));
        assert!(logger.should_log_round(20));
        assert!(logger.should_log_round(24));

        let silent = TrainingLogger::new(Verbosity::Warning, 1);
        assert!(!silent.should_log_round(0));
    }

    #[test]
    fn round_line_format() {
        let metrics = [
            MetricValue::new("train-rmse", 1.5, false),
            MetricValue::new("valid-rmse", 2.0, false),
        ];
        assert_eq!(
            format_round(3, &metrics),
            "[3]\ttrain-rmse: 1.500000\tvalid-rmse: 2.000000"
        );
    }
}
