//! meter-dials CLI: read five-dial meter registers from images.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use meter_dials::backend::ImageprocBackend;
use meter_dials::decoder::io::{DecodeConfig, DecodeReport, DEFAULT_STORE_PATH};
use meter_dials::decoder::{
    clear_calibration, restore_calibration, save_calibration, Calibration, DialPattern,
    EnhanceParams, JsonFileStore,
};
use meter_dials::{detect, overlay};
use nalgebra::Point2;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

/// Exit status of a run that worked but could not produce a reading.
const EXIT_NO_READING: u8 = 2;

#[derive(Parser)]
#[command(name = "meter-dials")]
#[command(about = "Read the five-dial register of an analog utility meter from an image")]
#[command(version)]
struct Cli {
    /// Key-value store file holding the manual calibration.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Emit JSON log lines (only with the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode the register reading of an image.
    Read(ReadArgs),

    /// Save a manual calibration from five dial centers, left to right.
    Calibrate {
        /// Dial center as `x,y` in image pixels; give exactly five.
        #[arg(long = "point", value_parser = parse_point, num_args = 1, required = true)]
        points: Vec<(f32, f32)>,
    },

    /// Remove the saved calibration.
    Clear,

    /// Print the saved calibration as JSON.
    ShowCalibration,
}

#[derive(Debug, Clone, Args)]
struct ReadArgs {
    /// Path to the input image (overrides the config).
    #[arg(long)]
    image: Option<PathBuf>,

    /// JSON run configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dial numbering pattern: all-cw, all-ccw or alt-cw.
    #[arg(long)]
    pattern: Option<DialPattern>,

    /// Compass angle of the zero mark, in degrees clockwise from the top.
    #[arg(long, allow_hyphen_values = true)]
    zero_offset: Option<f32>,

    /// Ignore the saved calibration and detect dials.
    #[arg(long)]
    no_calibration: bool,

    /// Skip contrast equalization and bilateral smoothing.
    #[arg(long)]
    no_enhance: bool,

    /// Write a JSON report here.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write a PNG with dial circles and pointer lines here.
    #[arg(long)]
    overlay: Option<PathBuf>,
}

fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y in `{s}`: {e}"))?;
    Ok((x, y))
}

fn init_logging(json: bool) {
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        meter_dials::core::init_tracing(json);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = json;
        let _ = meter_dials::core::init_from_env();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let store = cli.store.clone();
    let res = match cli.command {
        Commands::Read(args) => run_read(store, &args),
        Commands::Calibrate { points } => run_calibrate(store, &points),
        Commands::Clear => run_clear(store),
        Commands::ShowCalibration => run_show_calibration(store),
    };
    match res {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn open_store(path: Option<PathBuf>) -> JsonFileStore {
    JsonFileStore::new(path.unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)))
}

// read

fn build_config(args: &ReadArgs) -> CliResult<DecodeConfig> {
    let mut cfg = match (&args.config, &args.image) {
        (Some(path), _) => DecodeConfig::load_json(path)?,
        (None, Some(image)) => DecodeConfig::new(image.to_string_lossy()),
        (None, None) => return Err("either --image or --config is required".into()),
    };
    if let Some(image) = &args.image {
        cfg.image_path = image.to_string_lossy().into_owned();
    }
    if let Some(pattern) = args.pattern {
        cfg.params.pattern = pattern;
    }
    if let Some(offset) = args.zero_offset {
        cfg.params.zero_offset_deg = offset;
    }
    if args.no_calibration {
        cfg.ignore_calibration = true;
    }
    if args.no_enhance {
        cfg.params.enhance = EnhanceParams::disabled();
    }
    if let Some(report) = &args.report {
        cfg.report_path = Some(report.to_string_lossy().into_owned());
    }
    if let Some(overlay) = &args.overlay {
        cfg.overlay_path = Some(overlay.to_string_lossy().into_owned());
    }
    Ok(cfg)
}

fn run_read(store_path: Option<PathBuf>, args: &ReadArgs) -> CliResult<ExitCode> {
    let cfg = build_config(args)?;
    let store = open_store(store_path.or_else(|| cfg.store_path.as_ref().map(PathBuf::from)));
    let calibration = if cfg.ignore_calibration {
        None
    } else {
        restore_calibration(&store)?
    };

    log::info!("loading image: {}", cfg.image_path);
    let img = detect::load_image(&cfg.image_path)?;
    let gray = img.to_luma8();
    log::info!("image size: {}x{}", gray.width(), gray.height());

    let decoder = cfg.build_decoder(ImageprocBackend::default());
    let outcome = decoder.decode(&detect::gray_view(&gray), calibration.as_ref());

    let mut report = DecodeReport::new(&cfg, args.config.as_deref(), calibration.is_some());
    match &outcome {
        Ok(res) => report.set_result(res.clone()),
        Err(e) => report.set_error(e),
    }
    if cfg.report_path.is_some() {
        let path = cfg.report_path();
        report.write_json(&path)?;
        log::info!("report written to {}", path.display());
    }

    match outcome {
        Ok(res) => {
            if let Some(path) = &cfg.overlay_path {
                let canvas = overlay::render_overlay(&img.to_rgb8(), &res);
                overlay::save_overlay(&canvas, path)?;
                log::info!("overlay written to {path}");
            }
            for (i, d) in res.dials.iter().enumerate() {
                log::info!(
                    "dial {}: {:.1} deg ({}) -> {} (raw {} + {:.2})",
                    i + 1,
                    d.angle_deg,
                    if d.clockwise { "cw" } else { "ccw" },
                    d.digit,
                    d.raw.digit,
                    d.raw.frac
                );
            }
            println!("{}", res.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(ExitCode::from(EXIT_NO_READING))
        }
    }
}

// calibration

fn run_calibrate(store_path: Option<PathBuf>, points: &[(f32, f32)]) -> CliResult<ExitCode> {
    let points: Vec<Point2<f32>> = points.iter().map(|&(x, y)| Point2::new(x, y)).collect();
    let calibration = Calibration::from_points(&points)?;
    let mut store = open_store(store_path);
    save_calibration(&mut store, &calibration)?;
    println!("{}", calibration.to_json()?);
    eprintln!("calibration saved to {}", store.path().display());
    Ok(ExitCode::SUCCESS)
}

fn run_clear(store_path: Option<PathBuf>) -> CliResult<ExitCode> {
    let mut store = open_store(store_path);
    clear_calibration(&mut store)?;
    eprintln!("calibration cleared");
    Ok(ExitCode::SUCCESS)
}

fn run_show_calibration(store_path: Option<PathBuf>) -> CliResult<ExitCode> {
    let store = open_store(store_path);
    match restore_calibration(&store)? {
        Some(cal) => println!("{}", cal.to_json()?),
        None => println!("no calibration"),
    }
    Ok(ExitCode::SUCCESS)
}
