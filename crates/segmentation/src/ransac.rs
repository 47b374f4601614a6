use crate::model::{PointData, ShapeModel};
use log::debug;
use pointclouds_core::PointCloud;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::seq::index;
use rayon::prelude::*;
use thiserror::Error;

/// Why a robust fit produced no model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("{model} fit needs at least {required} points, got {available}")]
    InsufficientPoints {
        model: &'static str,
        required: usize,
        available: usize,
    },

    #[error("{model} fit needs point normals")]
    MissingNormals { model: &'static str },

    #[error("no valid {model} candidate in {iterations} iterations")]
    NoConsensus {
        model: &'static str,
        iterations: usize,
    },
}

/// Best candidate found by [`ransac_fit_seeded`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RansacFit<M> {
    pub model: M,
    /// Inliers of `model` over the fitted cloud.
    pub inlier_count: usize,
    /// Candidates actually drawn (early termination may stop short of the
    /// budget).
    pub iterations: usize,
}

/// Fits `M` to the point cloud with RANSAC.
///
/// Uses a random (non-deterministic) seed. For reproducible results, use
/// [`ransac_fit_seeded`] instead.
pub fn ransac_fit<M: ShapeModel>(
    cloud: &PointCloud,
    distance_threshold: f32,
    iterations: usize,
) -> Result<RansacFit<M>, FitError> {
    let seed = rand::thread_rng().next_u64();
    ransac_fit_seeded(cloud, distance_threshold, iterations, seed)
}

/// Fits `M` to the point cloud with RANSAC, seeding the sampler with `seed`.
///
/// # Algorithm
///
/// 1. Pre-generate all minimal samples upfront for determinism.
/// 2. On large clouds, score the candidates in parallel with rayon and keep
///    the first best one.
/// 3. Otherwise score sequentially with adaptive early termination.
///
/// The score of a candidate is its number of points within
/// `distance_threshold`. Degenerate samples and invalid candidates are
/// skipped.
pub fn ransac_fit_seeded<M: ShapeModel>(
    cloud: &PointCloud,
    distance_threshold: f32,
    iterations: usize,
    seed: u64,
) -> Result<RansacFit<M>, FitError> {
    let n = cloud.len();

    if n < M::MIN_SAMPLES {
        return Err(FitError::InsufficientPoints {
            model: M::NAME,
            required: M::MIN_SAMPLES,
            available: n,
        });
    }

    if M::REQUIRES_NORMALS && cloud.normals.is_none() {
        return Err(FitError::MissingNormals { model: M::NAME });
    }

    let data = PointData::from_cloud(cloud);

    let mut rng = StdRng::seed_from_u64(seed);
    let samples: Vec<Vec<usize>> = (0..iterations)
        .map(|_| index::sample(&mut rng, n, M::MIN_SAMPLES).into_vec())
        .collect();

    let candidate = |sample: &Vec<usize>| -> Option<(M, usize)> {
        let model = M::fit_minimal(&data, sample).filter(M::is_valid)?;
        let count = count_inliers(&data.points, &model, distance_threshold);
        Some((model, count))
    };

    let use_parallel = n >= 10_000 && samples.len() >= 16;

    let (best, drawn) = if use_parallel {
        let best = samples
            .par_iter()
            .filter_map(candidate)
            .reduce_with(|a, b| if a.1 >= b.1 { a } else { b });
        (best, samples.len())
    } else {
        let mut best: Option<(M, usize)> = None;
        let mut drawn = 0;

        for (iter, sample) in samples.iter().enumerate() {
            drawn = iter + 1;
            let Some((model, count)) = candidate(sample) else {
                continue;
            };

            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((model, count));

                // Adaptive early termination
                let w = count as f64 / n as f64;
                if w > 0.5 {
                    let needed =
                        (1.0 - 0.999f64).ln() / (1.0 - w.powi(M::MIN_SAMPLES as i32)).ln();
                    if (iter as f64) > needed {
                        break;
                    }
                }
            }
        }

        (best, drawn)
    };

    let (model, inlier_count) = best.ok_or(FitError::NoConsensus {
        model: M::NAME,
        iterations,
    })?;

    debug!(
        "ransac {}: {} inliers of {} after {} iterations",
        M::NAME,
        inlier_count,
        n,
        drawn
    );

    Ok(RansacFit {
        model,
        inlier_count,
        iterations: drawn,
    })
}

#[inline]
fn count_inliers<M: ShapeModel>(points: &[[f32; 3]], model: &M, threshold: f32) -> usize {
    points
        .iter()
        .filter(|p| model.distance_to_point(p) <= threshold)
        .count()
}
