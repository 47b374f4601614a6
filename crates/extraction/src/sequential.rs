use crate::config::ExtractionConfig;
use crate::error::ExtractionError;
use crate::single::UNCLASSIFIED_COLOR;
use log::{info, warn};
use pointclouds_core::{PointCloud, Rgb};
use pointclouds_normals::with_normals;
use pointclouds_segmentation::{classify, FitError, ShapeModel};
use std::fmt;

/// One extracted primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance<M> {
    pub model: M,
    pub color: Rgb,
    /// Inliers, as ascending indices into the input cloud.
    pub indices: Vec<usize>,
}

/// Working set sizes of one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub working_before: usize,
    pub inliers: usize,
    pub working_after: usize,
}

/// Why [`extract_sequential`] stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// The instance limit was reached.
    InstanceLimit,
    /// Every point was assigned.
    Exhausted,
    /// The estimator found no model for the remaining points.
    FitFailed(FitError),
    /// The estimator returned an invalid model.
    Degenerate,
    /// The best model explained too few of the remaining points.
    TooFewInliers { found: usize, required: usize },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::InstanceLimit => write!(f, "instance limit reached"),
            StopReason::Exhausted => write!(f, "no points left"),
            StopReason::FitFailed(e) => write!(f, "{}", e),
            StopReason::Degenerate => write!(f, "degenerate model"),
            StopReason::TooFewInliers { found, required } => {
                write!(f, "best model has {} inliers, {} required", found, required)
            }
        }
    }
}

/// Result of [`extract_sequential`].
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialExtraction<M> {
    /// Input points in input order, colored by instance; unassigned points
    /// are red.
    pub cloud: PointCloud,
    pub instances: Vec<Instance<M>>,
    pub rounds: Vec<RoundSummary>,
    pub stop: StopReason,
    /// Points not assigned to any instance.
    pub unclassified: usize,
}

/// Extracts up to `config.effective_max_instances()` primitives one after
/// the other, removing each instance's inliers before the next round.
///
/// Estimator failures end the loop and leave the remaining points red; only
/// an invalid `config` is an error. Normals are estimated once on the full
/// cloud when `M` needs them and the cloud has none.
pub fn extract_sequential<M: ShapeModel>(
    cloud: &PointCloud,
    config: &ExtractionConfig,
) -> Result<SequentialExtraction<M>, ExtractionError> {
    config.validate()?;

    let limit = config.effective_max_instances();
    if config.max_instances > limit {
        warn!(
            "max_instances {} exceeds the palette, extracting at most {}",
            config.max_instances, limit
        );
    }

    let mut working = if M::REQUIRES_NORMALS {
        with_normals(cloud, config.normal_neighbors)
    } else {
        cloud.clone()
    };
    let mut original_indices: Vec<usize> = (0..cloud.len()).collect();

    let mut output = cloud.painted(UNCLASSIFIED_COLOR);
    let mut instances: Vec<Instance<M>> = Vec::new();
    let mut rounds = Vec::new();

    let stop = loop {
        if instances.len() == limit {
            break StopReason::InstanceLimit;
        }
        if working.is_empty() {
            break StopReason::Exhausted;
        }

        let round = instances.len();
        let fit = match config.fit::<M>(&working, round) {
            Ok(fit) => fit,
            Err(e) => {
                warn!("{} round {}: {}", M::NAME, round + 1, e);
                break StopReason::FitFailed(e);
            }
        };
        if let Err(stop) = check_model(&fit.model, round) {
            break stop;
        }

        let labels = classify(&working, &fit.model, config.distance_threshold);
        let found = labels.inlier_count();
        if found < config.min_inliers {
            warn!(
                "{} round {}: {} inliers, below minimum {}",
                M::NAME,
                round + 1,
                found,
                config.min_inliers
            );
            break StopReason::TooFewInliers {
                found,
                required: config.min_inliers,
            };
        }

        let color = config.palette.color(round);
        let indices: Vec<usize> = labels.inlier_indices().map(|i| original_indices[i]).collect();
        let keep: Vec<usize> = labels.outlier_indices().collect();

        if let Some(colors) = output.colors.as_mut() {
            for &orig in &indices {
                colors.set(orig, color);
            }
        }

        let working_before = working.len();
        working = working.select(&keep);
        original_indices = keep.iter().map(|&i| original_indices[i]).collect();
        debug_assert_eq!(working.len(), original_indices.len());

        rounds.push(RoundSummary {
            working_before,
            inliers: found,
            working_after: working.len(),
        });
        info!(
            "{} {}: {} ({} inliers, {} points left)",
            M::NAME,
            round + 1,
            fit.model,
            found,
            working.len()
        );
        instances.push(Instance {
            model: fit.model,
            color,
            indices,
        });
    };

    Ok(SequentialExtraction {
        cloud: output,
        instances,
        rounds,
        stop,
        unclassified: original_indices.len(),
    })
}

/// Stops the run on a model that fails [`ShapeModel::is_valid`]. The
/// estimators filter candidates the same way, so this only fires for a
/// model type whose validity check disagrees with its own fit.
fn check_model<M: ShapeModel>(model: &M, round: usize) -> Result<(), StopReason> {
    if model.is_valid() {
        return Ok(());
    }
    warn!("{} round {}: degenerate model {}", M::NAME, round + 1, model);
    Err(StopReason::Degenerate)
}
