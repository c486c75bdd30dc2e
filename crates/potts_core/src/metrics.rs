//! Per-step counters and logging setup.

use serde::Serialize;
use std::ops::AddAssign;

/// Outcome counts for one Monte Carlo step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepStats {
    pub trials: u64,
    /// Trials whose voxel had no candidate identity or region.
    pub noops: u64,
    pub connectivity_rejections: u64,
    pub metropolis_rejections: u64,
    pub accepted: u64,
    /// Trials rejected because ΔH was NaN or infinite.
    pub non_finite: u64,
}

impl StepStats {
    /// Accepted fraction of all trials; 0 for an empty step.
    #[must_use]
    pub fn acceptance_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.accepted as f64 / self.trials as f64
        }
    }

    pub(crate) fn record(&mut self, outcome: TrialOutcome) {
        self.trials += 1;
        match outcome {
            TrialOutcome::Noop => self.noops += 1,
            TrialOutcome::Disconnected => self.connectivity_rejections += 1,
            TrialOutcome::Rejected => self.metropolis_rejections += 1,
            TrialOutcome::NonFinite => {
                self.metropolis_rejections += 1;
                self.non_finite += 1;
            }
            TrialOutcome::Accepted => self.accepted += 1,
        }
    }
}

impl AddAssign for StepStats {
    fn add_assign(&mut self, rhs: Self) {
        self.trials += rhs.trials;
        self.noops += rhs.noops;
        self.connectivity_rejections += rhs.connectivity_rejections;
        self.metropolis_rejections += rhs.metropolis_rejections;
        self.accepted += rhs.accepted;
        self.non_finite += rhs.non_finite;
    }
}

/// Result of a single flip trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    Noop,
    Disconnected,
    Rejected,
    NonFinite,
    Accepted,
}

/// Initialize tracing subscriber for logging.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut stats = StepStats::default();
        stats.record(TrialOutcome::Noop);
        stats.record(TrialOutcome::Accepted);
        stats.record(TrialOutcome::NonFinite);
        stats.record(TrialOutcome::Disconnected);
        assert_eq!(stats.trials, 4);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.metropolis_rejections, 1);
        assert_eq!(stats.non_finite, 1);
        assert_eq!(stats.acceptance_rate(), 0.25);
    }

    #[test]
    fn test_accumulate() {
        let mut total = StepStats::default();
        let mut step = StepStats::default();
        step.record(TrialOutcome::Accepted);
        total += step;
        total += step;
        assert_eq!(total.trials, 2);
        assert_eq!(total.accepted, 2);
        assert_eq!(StepStats::default().acceptance_rate(), 0.0);
    }
}
