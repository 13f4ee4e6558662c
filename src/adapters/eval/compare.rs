//! Classifier sweeps against one trained model.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::report::{accuracy, evaluate};
use super::{EvalConfig, EvalResult};
use crate::core::{CircleSet, ClassId, Dataset, LabeledPoint, Prediction, Strategy, VotingMode};

/// k values swept by `compare_knn_strategies` when none are given
pub const DEFAULT_K_VALUES: [usize; 9] = [1, 3, 5, 7, 9, 13, 15, 21, 25];

/// Accuracy of one classifier setting
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrategyScore {
    pub strategy: Strategy,
    /// Neighbor count, for strategies that use one
    pub k: Option<usize>,
    pub accuracy: f32,
    /// Test points no circle contained
    pub unclassified: usize,
}

/// Evaluate every containment voting mode, same fallback for each
pub fn compare_voting_modes(
    model: &CircleSet,
    train: &Dataset,
    test: &Dataset,
    config: &EvalConfig,
) -> EvalResult<Vec<StrategyScore>> {
    VotingMode::ALL
        .iter()
        .map(|&mode| {
            let report = evaluate(model, train, test, &config.clone().with_voting(mode))?;
            debug!(%mode, accuracy = report.accuracy, "voting mode evaluated");
            Ok(StrategyScore {
                strategy: Strategy::Circles(mode),
                k: None,
                accuracy: report.accuracy,
                unclassified: report.unclassified,
            })
        })
        .collect()
}

/// Sweep the nearest-neighbor strategies over the points circles miss
///
/// Points contained by some circle keep their `config.voting` prediction;
/// only the rest are reclassified by each strategy at each `k`. Accuracy is
/// over the whole test set.
pub fn compare_knn_strategies(
    model: &CircleSet,
    train: &Dataset,
    test: &Dataset,
    config: &EvalConfig,
    k_values: &[usize],
) -> EvalResult<Vec<StrategyScore>> {
    let circles = Strategy::Circles(config.voting);

    let first_pass = test
        .points()
        .par_iter()
        .map(|p| {
            model
                .classify(train.points(), &p.point, circles, config.k)
                .map(|prediction| (p, prediction))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut covered_correct = 0;
    let mut uncovered: Vec<&LabeledPoint> = Vec::new();
    for (p, prediction) in first_pass {
        match prediction {
            Prediction::Class(c) if c == p.class => covered_correct += 1,
            Prediction::Class(_) => {}
            Prediction::NoDecision => uncovered.push(p),
        }
    }
    debug!(uncovered = uncovered.len(), "circle pass finished");

    let mut scores = Vec::with_capacity(k_values.len() * Strategy::KNN_FAMILY.len());
    for &k in k_values {
        for strategy in Strategy::KNN_FAMILY {
            let recovered = uncovered
                .par_iter()
                .map(|p| {
                    model
                        .classify(train.points(), &p.point, strategy, k)
                        .map(|prediction| hit(prediction, p.class))
                })
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .filter(|&h| h)
                .count();

            scores.push(StrategyScore {
                strategy,
                k: Some(k),
                accuracy: accuracy(covered_correct + recovered, test.len()),
                unclassified: uncovered.len(),
            });
        }
    }

    Ok(scores)
}

fn hit(prediction: Prediction, actual: ClassId) -> bool {
    prediction.class() == Some(actual)
}
