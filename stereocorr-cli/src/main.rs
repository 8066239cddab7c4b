use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use stereocorr::image::io::load_gray_image;
use stereocorr::{
    rasterize, BBox, ConsistencyDistance, CorrelationConfig, CostMetric, DisparityMap,
    FlatCorrelator, LaplacianOfGaussian, NullFilter, PreFilter, PyramidCorrelator,
    SubtractedMean, Vec2,
};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "StereoCorr CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum Mode {
    Flat,
    #[default]
    Pyramid,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CostConfig {
    #[default]
    AbsoluteDifference,
    SquaredDifference,
    CrossCorrelation,
}

impl From<CostConfig> for CostMetric {
    fn from(value: CostConfig) -> Self {
        match value {
            CostConfig::AbsoluteDifference => CostMetric::AbsoluteDifference,
            CostConfig::SquaredDifference => CostMetric::SquaredDifference,
            CostConfig::CrossCorrelation => CostMetric::CrossCorrelation,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DistanceConfig {
    #[default]
    PerAxis,
    Euclidean,
}

impl From<DistanceConfig> for ConsistencyDistance {
    fn from(value: DistanceConfig) -> Self {
        match value {
            DistanceConfig::PerAxis => ConsistencyDistance::PerAxis,
            DistanceConfig::Euclidean => ConsistencyDistance::Euclidean,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum PrefilterConfig {
    #[default]
    None,
    SubtractedMean {
        sigma: f32,
    },
    LaplacianOfGaussian {
        sigma: f32,
    },
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct SearchRegionJson {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl From<SearchRegionJson> for BBox {
    fn from(value: SearchRegionJson) -> Self {
        BBox::new(
            Vec2::new(value.min_x, value.min_y),
            Vec2::new(value.max_x, value.max_y),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    left_path: String,
    right_path: String,
    output_path: Option<String>,
    mode: Mode,
    search_region: Option<SearchRegionJson>,
    kernel_size: [i32; 2],
    cost: CostConfig,
    prefilter: PrefilterConfig,
    consistency_threshold: f32,
    consistency_distance: DistanceConfig,
    tile_size: [i32; 2],
    parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left_path: String::new(),
            right_path: String::new(),
            output_path: None,
            mode: Mode::default(),
            search_region: None,
            kernel_size: [7, 7],
            cost: CostConfig::default(),
            prefilter: PrefilterConfig::default(),
            consistency_threshold: -1.0,
            consistency_distance: DistanceConfig::default(),
            tile_size: [256, 256],
            parallel: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct DisparityRange {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

#[derive(Debug, Serialize)]
struct Output {
    mode: Mode,
    width: usize,
    height: usize,
    valid_pixels: usize,
    valid_fraction: f64,
    disparity_range: Option<DisparityRange>,
    elapsed_ms: f64,
}

fn summarize(mode: Mode, map: &DisparityMap, elapsed_ms: f64) -> Output {
    let valid_pixels = map.valid_count();
    let total = map.width() * map.height();
    let disparity_range = map.observed_window(map.bounding_box()).map(|window| DisparityRange {
        min_x: window.min.x,
        min_y: window.min.y,
        max_x: window.max.x - 1,
        max_y: window.max.y - 1,
    });
    Output {
        mode,
        width: map.width(),
        height: map.height(),
        valid_pixels,
        valid_fraction: if total == 0 {
            0.0
        } else {
            valid_pixels as f64 / total as f64
        },
        disparity_range,
        elapsed_ms,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("stereocorr=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.left_path.is_empty() || config.right_path.is_empty() {
        return Err("left_path and right_path must be set in the config".into());
    }
    let search_region = config
        .search_region
        .ok_or("search_region must be set in the config")?;
    if config.tile_size.iter().any(|&v| v <= 0) {
        return Err("tile_size must be positive".into());
    }

    let left = load_gray_image(&config.left_path)?;
    let right = load_gray_image(&config.right_path)?;
    tracing::info!(
        width = left.width(),
        height = left.height(),
        "loaded stereo pair"
    );

    let correlation = CorrelationConfig {
        cost: config.cost.into(),
        consistency_threshold: config.consistency_threshold,
        consistency_distance: config.consistency_distance.into(),
        parallel: config.parallel,
        ..CorrelationConfig::new(
            search_region.into(),
            Vec2::new(config.kernel_size[0], config.kernel_size[1]),
        )
    };

    let null = NullFilter;
    let subtracted;
    let laplacian;
    let prefilter: &dyn PreFilter = match config.prefilter {
        PrefilterConfig::None => &null,
        PrefilterConfig::SubtractedMean { sigma } => {
            subtracted = SubtractedMean { sigma };
            &subtracted
        }
        PrefilterConfig::LaplacianOfGaussian { sigma } => {
            laplacian = LaplacianOfGaussian { sigma };
            &laplacian
        }
    };

    let tile_size = Vec2::new(config.tile_size[0], config.tile_size[1]);
    let start = Instant::now();
    let disparity = match config.mode {
        Mode::Flat => {
            let correlator =
                FlatCorrelator::new(left.view(), right.view(), prefilter, correlation)?;
            rasterize(&correlator, tile_size, config.parallel)?
        }
        Mode::Pyramid => {
            let correlator =
                PyramidCorrelator::new(left.view(), right.view(), prefilter, correlation)?;
            rasterize(&correlator, tile_size, config.parallel)?
        }
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let output = summarize(config.mode, &disparity, elapsed_ms);
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
