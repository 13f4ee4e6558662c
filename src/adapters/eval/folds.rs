//! Stratified k-fold cross validation.

use serde::Serialize;
use tracing::info;

use super::report::evaluate;
use super::{EvalConfig, EvalError, EvalResult};
use crate::core::{BuildConfig, CircleSet, Dataset, LabeledPoint};

/// One fold's held-out result
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FoldResult {
    pub fold: usize,
    pub accuracy: f32,
    /// Circles in the model trained on the other folds
    pub circles: usize,
    pub unclassified: usize,
}

/// Cross-validation summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrossValidation {
    pub folds: Vec<FoldResult>,
    pub mean_accuracy: f32,
    pub mean_circles: f32,
}

/// Split points into `folds` buckets with similar class proportions
///
/// Points are grouped by class (ascending id, input order within a class)
/// and dealt round-robin with one counter running across all classes, so
/// the split is deterministic and bucket sizes differ by at most one.
pub fn stratified_folds(points: &[LabeledPoint], folds: usize) -> EvalResult<Vec<Vec<LabeledPoint>>> {
    if folds < 2 || folds > points.len() {
        return Err(EvalError::InvalidFolds {
            folds,
            points: points.len(),
        });
    }

    let mut ordered: Vec<&LabeledPoint> = points.iter().collect();
    ordered.sort_by_key(|p| p.class);

    let mut buckets = vec![Vec::with_capacity(points.len() / folds + 1); folds];
    for (i, p) in ordered.into_iter().enumerate() {
        buckets[i % folds].push(p.clone());
    }
    Ok(buckets)
}

/// Train on all folds but one, test on the held-out fold, for every fold
pub fn cross_validate(
    dataset: &Dataset,
    folds: usize,
    build: &BuildConfig,
    eval: &EvalConfig,
) -> EvalResult<CrossValidation> {
    let buckets = stratified_folds(dataset.points(), folds)?;
    let num_classes = dataset.num_classes();
    let mut results = Vec::with_capacity(folds);

    for fold in 0..folds {
        let train_points: Vec<LabeledPoint> = buckets
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != fold)
            .flat_map(|(_, bucket)| bucket.iter().cloned())
            .collect();

        let train = dataset.subset(train_points)?;
        let test = dataset.subset(buckets[fold].clone())?;

        let model = CircleSet::build(train.points(), num_classes, build)?;
        let report = evaluate(&model, &train, &test, eval)?;

        info!(
            fold,
            accuracy = report.accuracy,
            circles = model.len(),
            unclassified = report.unclassified,
            "fold evaluated"
        );

        results.push(FoldResult {
            fold,
            accuracy: report.accuracy,
            circles: model.len(),
            unclassified: report.unclassified,
        });
    }

    let n = results.len() as f32;
    let mean_accuracy = results.iter().map(|r| r.accuracy).sum::<f32>() / n;
    let mean_circles = results.iter().map(|r| r.circles as f32).sum::<f32>() / n;
    info!(folds, mean_accuracy, mean_circles, "cross validation finished");

    Ok(CrossValidation {
        folds: results,
        mean_accuracy,
        mean_circles,
    })
}
