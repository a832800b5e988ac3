#![deny(missing_docs)]

//! Entry point for the egui mask labeling UI.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use std::path::PathBuf;

use eframe::egui;
use masklabel::egui_app::ui::{EguiApp, MIN_VIEWPORT_SIZE};
use masklabel::labeling::{LabelingOptions, LabelingSession};
use masklabel::logging;
use tracing::info;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

/// Command line for one labeling run.
#[derive(Debug, Default, PartialEq)]
struct Args {
    manifest: PathBuf,
    labels: Option<Vec<String>>,
    start: Option<usize>,
    config: Option<PathBuf>,
    export: Option<PathBuf>,
}

fn run() -> Result<(), String> {
    let Some(args) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init("masklabel") {
        eprintln!("Logging disabled: {err}");
    }
    let options = resolve_options(&args)?;
    if options.labels.is_empty() {
        return Err(format!("At least one label is required\n\n{}", help_text()));
    }
    let session =
        LabelingSession::from_manifest(&args.manifest, options.labels.clone(), options.start_index)
            .map_err(|err| err.to_string())?;
    info!(manifest = %args.manifest.display(), "Opening labeling window");

    let viewport = egui::ViewportBuilder::default()
        .with_title("masklabel")
        .with_min_inner_size(MIN_VIEWPORT_SIZE)
        .with_inner_size([1100.0, 800.0]);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "masklabel",
        native_options,
        Box::new(move |_cc| Ok(Box::new(EguiApp::new(session, &options)))),
    )
    .map_err(|err| format!("Failed to start UI: {err}"))
}

/// Config file values first, then command line overrides.
fn resolve_options(args: &Args) -> Result<LabelingOptions, String> {
    let mut options = match &args.config {
        Some(path) => LabelingOptions::load(path).map_err(|err| err.to_string())?,
        None => LabelingOptions::default(),
    };
    if let Some(labels) = &args.labels {
        options.labels = labels.clone();
    }
    if let Some(start) = args.start {
        options.start_index = start;
    }
    if let Some(export) = &args.export {
        options.export_path = Some(export.clone());
    }
    Ok(options)
}

fn parse_args(args: Vec<String>) -> Result<Option<Args>, String> {
    let mut parsed = Args::default();
    let mut manifest = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--manifest" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--manifest requires a value".to_string())?;
                manifest = Some(PathBuf::from(value));
            }
            "--labels" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--labels requires a value".to_string())?;
                let labels: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|label| !label.is_empty())
                    .map(str::to_string)
                    .collect();
                parsed.labels = Some(labels);
            }
            "--start" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--start requires a value".to_string())?;
                let start = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --start value: {value}"))?;
                parsed.start = Some(start);
            }
            "--config" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--export" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--export requires a value".to_string())?;
                parsed.export = Some(PathBuf::from(value));
            }
            unknown => {
                return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
            }
        }
        idx += 1;
    }

    parsed.manifest = manifest.ok_or_else(|| format!("--manifest is required\n\n{}", help_text()))?;
    Ok(Some(parsed))
}

fn help_text() -> String {
    [
        "masklabel",
        "",
        "Opens a labeling window over a raw/mask manifest.",
        "",
        "Usage:",
        "  masklabel --manifest <csv> --labels a,b,c [options]",
        "",
        "Options:",
        "  --manifest <path>  Manifest CSV to label (required).",
        "  --labels <list>    Comma separated label vocabulary.",
        "  --start <usize>    Zero-based row to start on (default: 0).",
        "  --config <path>    Labeling options TOML; command line values win.",
        "  --export <path>    Destination used by the Export button and Ctrl+S.",
        "",
        "Keys: Left/Right move, 1-9 pick a label, Ctrl+S exports.",
    ]
    .join("\n")
}
