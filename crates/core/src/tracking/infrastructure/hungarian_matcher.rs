use crate::shared::bounding_box::{overlap, BoundingBox};
use crate::tracking::domain::track_matcher::TrackMatcher;

/// Globally optimal association: maximizes the summed overlap of all
/// assigned pairs, considering only pairs above the threshold.
///
/// Solved as a minimum-cost assignment with cost `1 - IoU` (pairs at or
/// below the threshold cost 1, the same as leaving both unmatched), then
/// below-threshold pairs are discarded. Result does not depend on
/// detection order, unlike [`super::greedy_matcher::GreedyMatcher`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HungarianMatcher;

impl TrackMatcher for HungarianMatcher {
    fn assign(
        &self,
        tracks: &[BoundingBox],
        detections: &[BoundingBox],
        threshold: f64,
    ) -> Vec<Option<usize>> {
        let mut result = vec![None; detections.len()];
        if tracks.is_empty() || detections.is_empty() {
            return result;
        }

        let scores: Vec<Vec<f64>> = detections
            .iter()
            .map(|det| {
                tracks
                    .iter()
                    .map(|t| {
                        let iou = overlap(det, t);
                        if iou > threshold {
                            iou
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect();
        let costs: Vec<Vec<f64>> = scores
            .iter()
            .map(|row| row.iter().map(|s| 1.0 - s).collect())
            .collect();

        for (di, ti) in min_cost_assignment(&costs) {
            if scores[di][ti] > 0.0 {
                result[di] = Some(ti);
            }
        }
        result
    }
}

/// Kuhn-Munkres with row/column potentials, O(n^3).
///
/// Rectangular inputs are padded to square with zero-cost dummy entries;
/// only real (row, column) pairs are returned, sorted by row.
fn min_cost_assignment(costs: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let n_rows = costs.len();
    let n_cols = costs.first().map_or(0, |r| r.len());
    if n_rows == 0 || n_cols == 0 {
        return Vec::new();
    }

    let n = n_rows.max(n_cols);
    let inf = f64::MAX / 2.0;
    let cost = |i: usize, j: usize| -> f64 {
        if i < n_rows && j < n_cols {
            costs[i][j]
        } else {
            0.0
        }
    };

    // Potentials and matching are 1-indexed; column 0 is the virtual source.
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut p = vec![0_usize; n + 1];
    let mut way = vec![0_usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0_usize;
        let mut min_val = vec![inf; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1 = 0_usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < min_val[j] {
                    min_val[j] = reduced;
                    way[j] = j0;
                }
                if min_val[j] < delta {
                    delta = min_val[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_val[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let prev = way[j0];
            p[j0] = p[prev];
            j0 = prev;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs: Vec<(usize, usize)> = (1..=n)
        .filter(|&j| p[j] != 0 && p[j] - 1 < n_rows && j - 1 < n_cols)
        .map(|j| (p[j] - 1, j - 1))
        .collect();
    pairs.sort_unstable();
    pairs
}
