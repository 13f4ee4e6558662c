//! Single-run evaluation and its report.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::{EvalConfig, EvalResult};
use crate::core::{CircleSet, ClassId, Dataset, Prediction};

/// Counts of (actual, predicted) class pairs
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// `cells[actual][predicted]`
    cells: Vec<Vec<u32>>,
}

impl ConfusionMatrix {
    pub fn new(num_classes: usize) -> Self {
        Self {
            cells: vec![vec![0; num_classes]; num_classes],
        }
    }

    /// Record one decided prediction; out-of-range ids are ignored
    pub fn record(&mut self, actual: ClassId, predicted: ClassId) {
        if let Some(cell) = self.cells.get_mut(actual).and_then(|row| row.get_mut(predicted)) {
            *cell += 1;
        }
    }

    pub fn get(&self, actual: ClassId, predicted: ClassId) -> u32 {
        self.cells
            .get(actual)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of the diagonal
    pub fn correct(&self) -> u32 {
        self.cells.iter().enumerate().map(|(i, row)| row[i]).sum()
    }

    /// Sum of every cell
    pub fn total(&self) -> u32 {
        self.cells.iter().flatten().sum()
    }

    pub fn num_classes(&self) -> usize {
        self.cells.len()
    }

    pub fn rows(&self) -> &[Vec<u32>] {
        &self.cells
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "{:>6}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Outcome of evaluating a model on one test set
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvalReport {
    pub confusion: ConfusionMatrix,
    /// Correct predictions / test points
    pub accuracy: f32,
    /// Test points no circle contained (handed to the fallback)
    pub unclassified: usize,
    /// Test points the fallback could not decide either
    pub undecided: usize,
    pub test_points: usize,
}

/// Classify every test point and tally the results
///
/// Containment voting with `config.voting` first, then `config.fallback`
/// for queries no circle contains. Points left without a decision count
/// as wrong.
pub fn evaluate(
    model: &CircleSet,
    train: &Dataset,
    test: &Dataset,
    config: &EvalConfig,
) -> EvalResult<EvalReport> {
    let outcomes = test
        .points()
        .par_iter()
        .map(|p| {
            model
                .classify_with_fallback(train.points(), &p.point, config.voting, config.fallback, config.k)
                .map(|(prediction, fell_back)| (p.class, prediction, fell_back))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let num_classes = model.num_classes().max(test.num_classes());
    let mut confusion = ConfusionMatrix::new(num_classes);
    let mut unclassified = 0;
    let mut undecided = 0;

    for (actual, prediction, fell_back) in outcomes {
        if fell_back {
            unclassified += 1;
        }
        match prediction {
            Prediction::Class(predicted) => confusion.record(actual, predicted),
            Prediction::NoDecision => undecided += 1,
        }
    }

    let report = EvalReport {
        accuracy: accuracy(confusion.correct() as usize, test.len()),
        confusion,
        unclassified,
        undecided,
        test_points: test.len(),
    };
    debug!(
        accuracy = report.accuracy,
        unclassified, undecided, "evaluation finished"
    );
    Ok(report)
}

pub(crate) fn accuracy(correct: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    correct as f32 / total as f32
}
