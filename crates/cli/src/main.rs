//! detect_primitives - extract spheres or cylinders from an XYZ point cloud
//!
//! Reads `x y z` rows, drops points inside the sensor blind spot, runs the
//! extraction for the requested primitive and writes a colored PLY file.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;

use pointclouds_extraction::{
    extract, Extraction, ExtractionConfig, PrimitiveKind, SequentialExtraction, SphereExtraction,
};
use pointclouds_filters::range_filter;
use pointclouds_io::{read_xyz, write_ply, write_ply_binary};
use pointclouds_segmentation::CylinderModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Cylinder,
    Sphere,
}

impl From<Kind> for PrimitiveKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Cylinder => PrimitiveKind::Cylinder,
            Kind::Sphere => PrimitiveKind::Sphere,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "detect_primitives")]
#[command(about = "Extract spheres or cylinders from a point cloud with RANSAC", long_about = None)]
struct Cli {
    /// Input point cloud, one `x y z` row per point
    input: PathBuf,

    /// Output PLY file with per-point colors
    output: PathBuf,

    /// Primitive to extract
    #[arg(value_enum)]
    kind: Kind,

    /// JSON file with extraction parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Inlier distance threshold (default: 2.0)
    #[arg(long)]
    threshold: Option<f32>,

    /// RANSAC iterations per round (default: 3000)
    #[arg(long)]
    iterations: Option<usize>,

    /// Maximum number of cylinders, at most 4 (default: 4)
    #[arg(long)]
    max_instances: Option<usize>,

    /// Drop points this close to the origin or closer (default: 0.3)
    #[arg(long)]
    min_range: Option<f64>,

    /// Stop when a cylinder has fewer inliers (default: 1)
    #[arg(long)]
    min_inliers: Option<usize>,

    /// Fixed RANSAC seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write binary little-endian PLY instead of ASCII
    #[arg(long)]
    binary: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    fn extraction_config(&self) -> Result<ExtractionConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractionConfig::from_json_file(path)
                .context("Failed to load extraction parameters")?,
            None => ExtractionConfig::default(),
        };
        if let Some(threshold) = self.threshold {
            config.distance_threshold = threshold;
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(max_instances) = self.max_instances {
            config.max_instances = max_instances;
        }
        if let Some(min_range) = self.min_range {
            config.min_range = min_range;
        }
        if let Some(min_inliers) = self.min_inliers {
            config.min_inliers = min_inliers;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate().context("Invalid extraction parameters")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.extraction_config()?;

    let raw = read_xyz(&cli.input)
        .with_context(|| format!("Failed to read point cloud {:?}", cli.input))?;
    let cloud = range_filter(&raw, config.min_range);
    info!(
        "Loaded {} points from {:?}, {} beyond {}",
        raw.len(),
        cli.input,
        cloud.len(),
        config.min_range
    );

    let result = extract(cli.kind.into(), &cloud, &config)
        .with_context(|| format!("{} extraction failed", PrimitiveKind::from(cli.kind)))?;

    match &result {
        Extraction::Sphere(sphere) => report_sphere(sphere),
        Extraction::Cylinders(cylinders) => report_cylinders(cylinders),
    }

    let colored = result.into_cloud();
    let written = if cli.binary {
        write_ply_binary(&cli.output, &colored)
    } else {
        write_ply(&cli.output, &colored)
    };
    written.with_context(|| format!("Failed to write {:?}", cli.output))?;
    info!("Wrote {} points to {:?}", colored.len(), cli.output);

    Ok(())
}

fn report_sphere(sphere: &SphereExtraction) {
    println!("{}", sphere.model);
    println!(
        "inliers: {} of {} points ({} iterations)",
        sphere.inlier_count,
        sphere.input_len(),
        sphere.iterations
    );
}

fn report_cylinders(cylinders: &SequentialExtraction<CylinderModel>) {
    for (i, instance) in cylinders.instances.iter().enumerate() {
        let c = instance.color;
        println!(
            "#{} {} inliers: {} color: [{}, {}, {}]",
            i + 1,
            instance.model,
            instance.indices.len(),
            c.r,
            c.g,
            c.b
        );
    }
    println!(
        "{} cylinder(s), {} unclassified points, stopped: {}",
        cylinders.instances.len(),
        cylinders.unclassified,
        cylinders.stop
    );
}
