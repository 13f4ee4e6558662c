//! # Merge Engine
//!
//! Greedily grows circles by absorbing later circles of the same class,
//! never letting a foreign training point inside.
//!
//! One sequential pass over the circles in index order. For each live
//! circle `c`:
//!
//! 1. every later live same-class circle `j` gets a candidate radius
//!    `distance(c, j) + radius(j)`, the radius `c` needs to contain `j`
//! 2. candidates are walked cheapest first
//! 3. a candidate already inside `c` is absorbed for free; otherwise `c`
//!    grows to the candidate radius if the purity scan finds no foreign
//!    point inside it
//! 4. the first impure candidate ends the walk for `c`
//!
//! Absorbed circles are flagged, not removed, so indices stay stable during
//! the pass; compaction happens once at the end. The result depends on the
//! initial circle order and is not the fewest possible circles.
//!
//! Parallelism only happens inside one circle's step: candidate gathering
//! and the purity scan. Circles are never processed concurrently.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use tracing::{debug, trace};

use super::metric::Metric;
use super::{Circle, ClassId, LabeledPoint};

/// A circle that could be absorbed, and the radius needed to do it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergeCandidate {
    /// Radius the absorbing circle would need
    pub radius: f32,
    /// Index of the circle to absorb
    pub index: usize,
}

/// Merge circles in place
///
/// Returns the number of circles absorbed (removed).
pub fn merge_circles<M: Metric + ?Sized>(
    circles: &mut Vec<Circle>,
    points: &[LabeledPoint],
    metric: &M,
) -> usize {
    let n = circles.len();
    let mut absorbed = vec![false; n];

    for idx in 0..n {
        // skip circles we've already eaten
        if absorbed[idx] {
            continue;
        }

        let candidates = gather_candidates(circles, &absorbed, idx, metric);
        let mut eaten = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            if candidate.radius <= circles[idx].radius {
                eaten.push(candidate.index);
                continue;
            }

            let c = &circles[idx];
            if is_pure_within(c.center.dims(), c.class, candidate.radius, points, metric) {
                circles[idx].radius = candidate.radius;
                eaten.push(candidate.index);
            } else {
                trace!(circle = idx, radius = candidate.radius, "merge blocked by foreign point");
                break;
            }
        }

        if !eaten.is_empty() {
            debug!(
                circle = idx,
                absorbed = eaten.len(),
                radius = circles[idx].radius,
                "circle grown"
            );
        }

        for j in eaten {
            absorbed[j] = true;
        }
    }

    // single compaction pass
    let mut i = 0;
    circles.retain(|_| {
        let keep = !absorbed[i];
        i += 1;
        keep
    });

    n - circles.len()
}

/// Candidate radii for circle `idx`, cheapest first
///
/// Only later, live, same-class circles are considered. Workers collect
/// into private vectors that are appended to the shared list under a lock;
/// the final sort (radius, then index) makes the order independent of
/// scheduling.
pub fn gather_candidates<M: Metric + ?Sized>(
    circles: &[Circle],
    absorbed: &[bool],
    idx: usize,
    metric: &M,
) -> Vec<MergeCandidate> {
    let center = circles[idx].center.dims();
    let class = circles[idx].class;
    let gathered = Mutex::new(Vec::with_capacity(circles.len().saturating_sub(idx + 1)));

    ((idx + 1)..circles.len())
        .into_par_iter()
        .filter(|&j| !absorbed[j] && circles[j].class == class)
        .fold(Vec::new, |mut local, j| {
            local.push(MergeCandidate {
                radius: metric.distance(center, circles[j].center.dims()) + circles[j].radius,
                index: j,
            });
            local
        })
        .for_each(|local| {
            gathered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(local);
        });

    let mut candidates = gathered.into_inner().unwrap_or_else(PoisonError::into_inner);
    candidates.sort_by(|a, b| a.radius.total_cmp(&b.radius).then(a.index.cmp(&b.index)));
    candidates
}

/// True if no point of another class lies within `radius` of `center`
///
/// Scanned in parallel. The shared flag only ever goes from true to false;
/// once it drops, every worker returns immediately for its remaining
/// points.
pub fn is_pure_within<M: Metric + ?Sized>(
    center: &[f32],
    class: ClassId,
    radius: f32,
    points: &[LabeledPoint],
    metric: &M,
) -> bool {
    let can_merge = AtomicBool::new(true);

    points.par_iter().for_each(|p| {
        if !can_merge.load(Ordering::Relaxed) {
            return;
        }
        if p.class == class {
            return;
        }
        if metric.distance(center, p.dims()) <= radius {
            can_merge.store(false, Ordering::Relaxed);
        }
    });

    can_merge.load(Ordering::Relaxed)
}
