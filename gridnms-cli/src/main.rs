use clap::Parser;
use gridnms::lowlevel::TINY_YOLO_FACE_ANCHORS;
use gridnms::{
    classification_report, filter_by_thresholds, Anchor, ClassScore, DecodeConfig, Detection,
    Detector, ExtentPairing, GridDecoder, GridSpec, ReportConfig, SuppressionMode, Thresholds,
    DEFAULT_CLASS_PROBABILITY_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Grid detector post-processing (JSON config driven)")]
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
    /// Enable tracing output for the decode and suppress stages.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TensorFormat {
    #[default]
    RawF32Le,
    Json,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ExtentPairingConfig {
    #[default]
    XHeight,
    YWidth,
}

impl From<ExtentPairingConfig> for ExtentPairing {
    fn from(value: ExtentPairingConfig) -> Self {
        match value {
            ExtentPairingConfig::XHeight => ExtentPairing::XHeight,
            ExtentPairingConfig::YWidth => ExtentPairing::YWidth,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SuppressionConfig {
    #[default]
    Truncating,
    OverlapOnly,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GridConfigJson {
    width: usize,
    height: usize,
    block_size: usize,
}

impl Default for GridConfigJson {
    fn default() -> Self {
        let grid = GridSpec::default();
        Self {
            width: grid.width,
            height: grid.height,
            block_size: grid.block_size,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ReportConfigJson {
    min_class_probability: f64,
}

impl Default for ReportConfigJson {
    fn default() -> Self {
        Self {
            min_class_probability: gridnms::report::DEFAULT_REPORT_MIN_CLASS_PROBABILITY,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    tensor_path: String,
    tensor_format: TensorFormat,
    output_path: Option<String>,
    labels: Vec<String>,
    anchors: Vec<f64>,
    grid: GridConfigJson,
    extent_pairing: ExtentPairingConfig,
    parallel: bool,
    confidence_threshold: Option<f64>,
    class_probability_threshold: f64,
    suppression: SuppressionConfig,
    scale_factor: f32,
    report: ReportConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tensor_path: String::new(),
            tensor_format: TensorFormat::default(),
            output_path: None,
            labels: vec!["face".to_owned()],
            anchors: TINY_YOLO_FACE_ANCHORS.to_vec(),
            grid: GridConfigJson::default(),
            extent_pairing: ExtentPairingConfig::default(),
            parallel: false,
            confidence_threshold: None,
            class_probability_threshold: DEFAULT_CLASS_PROBABILITY_THRESHOLD,
            suppression: SuppressionConfig::default(),
            scale_factor: 1.0,
            report: ReportConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ClassRecord {
    label: String,
    probability: f64,
}

impl From<&ClassScore> for ClassRecord {
    fn from(value: &ClassScore) -> Self {
        Self {
            label: value.label.to_string(),
            probability: value.probability,
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    rect: [i32; 4],
    cell: [usize; 2],
    confidence: f64,
    classes: Vec<ClassRecord>,
}

impl DetectionRecord {
    fn new(detection: &Detection, scale_factor: f32) -> Self {
        let rect = detection.rect().scaled(scale_factor);
        let cell = detection.cell();
        Self {
            rect: [rect.min_x, rect.min_y, rect.max_x, rect.max_y],
            cell: [cell.x, cell.y],
            confidence: detection.confidence(),
            classes: detection.classes().iter().map(ClassRecord::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    detections: Vec<DetectionRecord>,
    classes: Vec<ClassRecord>,
}

fn load_tensor(path: &Path, format: &TensorFormat) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    match format {
        TensorFormat::RawF32Le => {
            let bytes = fs::read(path)?;
            if bytes.len() % 4 != 0 {
                return Err(format!(
                    "{} holds {} bytes, not a whole number of f32 values",
                    path.display(),
                    bytes.len()
                )
                .into());
            }
            Ok(bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect())
        }
        TensorFormat::Json => {
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("gridnms=info".parse()?))
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
    if config.tensor_path.is_empty() {
        return Err("tensor_path must be set in the config".into());
    }
    let confidence = config
        .confidence_threshold
        .ok_or("confidence_threshold must be set in the config")?;
    if !(config.scale_factor.is_finite() && config.scale_factor > 0.0) {
        return Err("scale_factor must be finite and positive".into());
    }
    let thresholds = Thresholds::new(confidence, config.class_probability_threshold)?;

    let decoder = GridDecoder::new(DecodeConfig {
        grid: GridSpec {
            width: config.grid.width,
            height: config.grid.height,
            block_size: config.grid.block_size,
        },
        anchors: Anchor::from_flat(&config.anchors)?,
        labels: config.labels,
        pairing: config.extent_pairing.into(),
        parallel: config.parallel,
    })?;

    let tensor = load_tensor(Path::new(&config.tensor_path), &config.tensor_format)?;
    tracing::info!(
        path = %config.tensor_path,
        elements = tensor.len(),
        "loaded raw output"
    );

    let detections = match config.suppression {
        SuppressionConfig::Truncating => {
            Detector::new(decoder, SuppressionMode::Truncating(thresholds)).detect(&tensor)?
        }
        SuppressionConfig::OverlapOnly => {
            let kept = Detector::new(decoder, SuppressionMode::OverlapOnly).detect(&tensor)?;
            filter_by_thresholds(kept, &thresholds)
        }
    };

    let report = classification_report(
        &detections,
        &ReportConfig {
            min_top_probability: thresholds.confidence(),
            min_class_probability: config.report.min_class_probability,
        },
    );

    let output = Output {
        detections: detections
            .iter()
            .map(|detection| DetectionRecord::new(detection, config.scale_factor))
            .collect(),
        classes: report.iter().map(ClassRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
