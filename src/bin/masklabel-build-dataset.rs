//! Pair raw/mask images from configured directories and sample a training manifest.

use std::path::PathBuf;

use masklabel::dataset::{BuilderConfig, build_dataset};
use masklabel::logging;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

struct Args {
    config: PathBuf,
    sample_size: Option<usize>,
    out: Option<PathBuf>,
    seed: Option<u64>,
}

fn run() -> Result<(), String> {
    let Some(args) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init("masklabel-build-dataset") {
        eprintln!("Logging disabled: {err}");
    }
    let mut config = BuilderConfig::load(&args.config).map_err(|err| err.to_string())?;
    if let Some(sample_size) = args.sample_size {
        config.sample_size = sample_size;
    }
    if let Some(out) = args.out {
        config.output = out;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let summary = build_dataset(&config).map_err(|err| err.to_string())?;
    println!(
        "Found {} pairs across {} source(s); wrote {} to {}",
        summary.pairs_found,
        summary.sources,
        summary.sampled,
        summary.output.display()
    );
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Option<Args>, String> {
    let mut config = None;
    let mut sample_size = None;
    let mut out = None;
    let mut seed = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--config" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                config = Some(PathBuf::from(value));
            }
            "--sample-size" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--sample-size requires a value".to_string())?;
                let parsed = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --sample-size value: {value}"))?;
                sample_size = Some(parsed);
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                out = Some(PathBuf::from(value));
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                let parsed = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid --seed value: {value}"))?;
                seed = Some(parsed);
            }
            unknown => {
                return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
            }
        }
        idx += 1;
    }

    let config = config.ok_or_else(|| format!("--config is required\n\n{}", help_text()))?;
    Ok(Some(Args {
        config,
        sample_size,
        out,
        seed,
    }))
}

fn help_text() -> String {
    [
        "masklabel-build-dataset",
        "",
        "Pairs raw and mask images by sorted position and samples a training manifest.",
        "",
        "Usage:",
        "  masklabel-build-dataset --config <toml> [options]",
        "",
        "Options:",
        "  --config <path>       Builder config with base_dir, sources and sample_size (required).",
        "  --sample-size <usize> Override the number of pairs to draw.",
        "  --out <path>          Override the manifest destination (default: training_database.csv).",
        "  --seed <u64>          Seed for a reproducible draw.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_overrides() {
        let parsed = parse_args(args(&[
            "--config",
            "build.toml",
            "--sample-size",
            "12",
            "--out",
            "out.csv",
            "--seed",
            "7",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(parsed.config, PathBuf::from("build.toml"));
        assert_eq!(parsed.sample_size, Some(12));
        assert_eq!(parsed.out, Some(PathBuf::from("out.csv")));
        assert_eq!(parsed.seed, Some(7));
    }

    #[test]
    fn rejects_missing_config_and_bad_numbers() {
        assert!(parse_args(Vec::new()).is_err());
        assert!(parse_args(args(&["--config", "a.toml", "--sample-size", "many"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
    }
}
