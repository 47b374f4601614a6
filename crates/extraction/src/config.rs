use pointclouds_core::{PointCloud, Rgb};
use pointclouds_segmentation::{ransac_fit, ransac_fit_seeded, FitError, RansacFit, ShapeModel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of colors reserved for successive instances.
pub const PALETTE_SIZE: usize = 4;

/// Instance colors, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(pub [Rgb; PALETTE_SIZE]);

impl Palette {
    /// Color of the `instance`-th extracted primitive (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `instance >= PALETTE_SIZE`.
    pub fn color(&self, instance: usize) -> Rgb {
        self.0[instance]
    }

    pub fn iter(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.0.iter().copied()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self([Rgb::PURPLE, Rgb::PINK, Rgb::YELLOW, Rgb::BLUE])
    }
}

/// Tunables shared by every extraction round.
///
/// Missing fields in a JSON file fall back to [`ExtractionConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Inlier distance, in input units.
    pub distance_threshold: f32,
    /// RANSAC candidates per round.
    pub iterations: usize,
    /// Requested instance limit for sequential extraction. Clamped to
    /// [`PALETTE_SIZE`].
    pub max_instances: usize,
    /// Blind-spot radius of the range pre-filter.
    pub min_range: f64,
    /// Neighbourhood size for normal estimation.
    pub normal_neighbors: usize,
    /// A sequential round whose best model has fewer inliers ends the run.
    pub min_inliers: usize,
    /// Fixed RANSAC seed; `None` draws a fresh seed per round.
    pub seed: Option<u64>,
    pub palette: Palette,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 2.0,
            iterations: 3000,
            max_instances: PALETTE_SIZE,
            min_range: 0.3,
            normal_neighbors: 10,
            min_inliers: 1,
            seed: None,
            palette: Palette::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("distance threshold must be finite and positive, got {0}")]
    InvalidThreshold(f32),

    #[error("iterations must be at least 1")]
    ZeroIterations,

    #[error("max_instances must be at least 1")]
    ZeroInstances,

    #[error("normal estimation needs at least 3 neighbours, got {0}")]
    TooFewNeighbors(usize),

    #[error("min_range must be finite and non-negative, got {0}")]
    InvalidMinRange(f64),

    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractionConfig {
    /// Loads and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.distance_threshold.is_finite() && self.distance_threshold > 0.0) {
            return Err(ConfigError::InvalidThreshold(self.distance_threshold));
        }
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.max_instances == 0 {
            return Err(ConfigError::ZeroInstances);
        }
        if self.normal_neighbors < 3 {
            return Err(ConfigError::TooFewNeighbors(self.normal_neighbors));
        }
        if !(self.min_range.is_finite() && self.min_range >= 0.0) {
            return Err(ConfigError::InvalidMinRange(self.min_range));
        }
        Ok(())
    }

    /// `max_instances` capped by the palette size.
    pub fn effective_max_instances(&self) -> usize {
        self.max_instances.min(PALETTE_SIZE)
    }

    /// Seed for the given 0-based round: `seed + round`, wrapping.
    pub fn round_seed(&self, round: usize) -> Option<u64> {
        self.seed.map(|s| s.wrapping_add(round as u64))
    }

    /// Runs the estimator for one round with this config's threshold,
    /// budget and seed.
    pub(crate) fn fit<M: ShapeModel>(
        &self,
        cloud: &PointCloud,
        round: usize,
    ) -> Result<RansacFit<M>, FitError> {
        match self.round_seed(round) {
            Some(seed) => ransac_fit_seeded(cloud, self.distance_threshold, self.iterations, seed),
            None => ransac_fit(cloud, self.distance_threshold, self.iterations),
        }
    }
}
