//! shaftgen - generate a proportional stepped shaft and export it to STEP.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use geom_kernel::TruckKernel;
use shaft_app::{ShaftSession, EXIT_CONFIG};
use shaft_format::{load_design, save_design, DesignMetadata, ShaftDesign, DEFAULT_EXPORT_FILE};
use shaft_proportions::ProportionLimits;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "shaftgen")]
#[command(about = "Generate a proportional stepped shaft and export it to STEP", long_about = None)]
struct Cli {
    /// Total shaft length (mm)
    total_length: Option<f64>,
    /// Diameter of the first keyway seat, segment 3 (mm)
    d4: Option<f64>,
    /// Diameter of the second keyway seat, segment 9 (mm)
    d9: Option<f64>,

    /// Start from a saved design file; positional values override it
    #[arg(long)]
    design: Option<PathBuf>,

    /// Write the final parameters to a design file
    #[arg(long)]
    save_design: Option<PathBuf>,

    /// Pin a segment diameter, e.g. --diameter 11=26.5 (repeatable)
    #[arg(long = "diameter", value_name = "INDEX=VALUE", value_parser = parse_override)]
    diameters: Vec<(usize, f64)>,

    /// Only require positive dimensions, no admissible ranges
    #[arg(long)]
    unbounded: bool,

    /// Chamfer angle in degrees
    #[arg(long)]
    chamfer_angle: Option<f64>,

    /// Output STEP file
    #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
    output: PathBuf,
}

fn parse_override(s: &str) -> Result<(usize, f64), String> {
    let (index, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=VALUE, got '{s}'"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("bad segment index '{index}': {e}"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("bad diameter '{value}': {e}"))?;
    Ok((index, value))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn run(cli: Cli) -> Result<i32> {
    let mut design = match &cli.design {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading design {}", path.display()))?;
            load_design(&text)
                .with_context(|| format!("loading design {}", path.display()))?
                .0
        }
        None => ShaftDesign::default(),
    };

    if let Some(v) = cli.total_length {
        design.total_length = v;
    }
    if let Some(v) = cli.d4 {
        design.first_keyway_diameter = Some(v);
    }
    if let Some(v) = cli.d9 {
        design.second_keyway_diameter = Some(v);
    }
    if cli.unbounded {
        design.limits = ProportionLimits::unbounded();
    }
    if let Some(angle) = cli.chamfer_angle {
        design.settings.chamfer_angle_deg = angle;
    }

    let mut session = ShaftSession::from_design(TruckKernel::new(), &design)
        .context("invalid shaft parameters")?;
    for (index, diameter) in cli.diameters {
        session
            .set_segment_diameter(index, diameter)
            .with_context(|| format!("setting diameter of segment {index}"))?;
    }

    if let Some(path) = &cli.save_design {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "shaft".to_string());
        let json = save_design(&session.design(), &DesignMetadata::new(name));
        std::fs::write(path, json)
            .with_context(|| format!("writing design {}", path.display()))?;
    }

    Ok(session.run(&cli.output))
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            EXIT_CONFIG
        }
    };
    ExitCode::from(code as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_syntax() {
        assert_eq!(parse_override("11=26.5"), Ok((11, 26.5)));
        assert_eq!(parse_override(" 3 = 24 "), Ok((3, 24.0)));
        assert!(parse_override("11").is_err());
        assert!(parse_override("x=1").is_err());
        assert!(parse_override("1=y").is_err());
    }

    #[test]
    fn positional_arguments_parse() {
        let cli = Cli::parse_from(["shaftgen", "250", "24", "28", "--diameter", "11=26", "-o", "a.step"]);
        assert_eq!(cli.total_length, Some(250.0));
        assert_eq!(cli.d9, Some(28.0));
        assert_eq!(cli.diameters, vec![(11, 26.0)]);
        assert_eq!(cli.output, PathBuf::from("a.step"));
        assert!(!cli.unbounded);
    }

    #[test]
    fn default_output_file() {
        let cli = Cli::parse_from(["shaftgen"]);
        assert_eq!(cli.output, PathBuf::from(DEFAULT_EXPORT_FILE));
        assert!(cli.total_length.is_none());
    }
}
