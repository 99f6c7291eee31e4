use serde::Serialize;

/// Why a relaxation pass stopped. Both are normal outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    /// Total displacement of an iteration fell below the convergence epsilon.
    Converged,
    /// The pass used up its iteration budget.
    MaxIterations,
}

/// Per-pass bookkeeping of total displacement against an epsilon and an iteration cap.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    epsilon: f64,
    max_iterations: usize,
    history: Vec<f64>,
}

impl ConvergenceMonitor {
    pub fn new(epsilon: f64, max_iterations: usize) -> Self {
        Self {
            epsilon,
            max_iterations,
            history: Vec::new(),
        }
    }

    /// Records one iteration's total displacement and reports whether the pass is over.
    ///
    /// Convergence wins when the last permitted iteration also drops below epsilon.
    pub fn record(&mut self, total_displacement: f64) -> Option<Termination> {
        self.history.push(total_displacement);
        if total_displacement < self.epsilon {
            Some(Termination::Converged)
        } else if self.history.len() >= self.max_iterations {
            Some(Termination::MaxIterations)
        } else {
            None
        }
    }

    pub fn iterations(&self) -> usize {
        self.history.len()
    }

    pub fn last(&self) -> Option<f64> {
        self.history.last().copied()
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_on_epsilon() {
        let mut m = ConvergenceMonitor::new(0.5, 10);
        assert_eq!(m.record(3.0), None);
        assert_eq!(m.record(0.4), Some(Termination::Converged));
        assert_eq!(m.iterations(), 2);
        assert_eq!(m.last(), Some(0.4));
    }

    #[test]
    fn stops_on_cap() {
        let mut m = ConvergenceMonitor::new(0.5, 3);
        assert_eq!(m.record(9.0), None);
        assert_eq!(m.record(8.0), None);
        assert_eq!(m.record(7.0), Some(Termination::MaxIterations));
        assert_eq!(m.history(), &[9.0, 8.0, 7.0]);
    }

    #[test]
    fn convergence_beats_cap_on_last_iteration() {
        let mut m = ConvergenceMonitor::new(0.5, 1);
        assert_eq!(m.record(0.1), Some(Termination::Converged));
    }

    #[test]
    fn zero_epsilon_never_converges() {
        let mut m = ConvergenceMonitor::new(0.0, 2);
        assert_eq!(m.record(0.0), None);
        assert_eq!(m.record(0.0), Some(Termination::MaxIterations));
    }
}
