//! tint - run the color-correct effect over an image file
//!
//! Drives the effect through a standalone host the same way an editing
//! application would: describe, create an instance, render, destroy, unload.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tint_core::{BitDepth, ColorCorrectParams, Rect};
use tint_ofx::keys::{clip, effect};
use tint_ofx::{HostImage, StandaloneHost};
use tracing_subscriber::EnvFilter;

mod config;
mod image_loader;

use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "tint")]
#[command(author, version, about = "Apply gain, gamma and saturation to an image")]
#[command(long_about = "
Runs the ColorCorrection effect on an image through a standalone host.

Examples:
  tint in.png out.png --gamma 2.2
  tint in.png out.tif -d 16 --saturation 0 --rgb-gain 1,0.9,0.8
  tint in.exr out.exr --grade look.json --window 0,0,512,512
  tint --dump-descriptor
")]
struct Cli {
    /// Input image
    #[arg(required_unless_present = "dump_descriptor")]
    input: Option<PathBuf>,

    /// Output image
    #[arg(required_unless_present = "dump_descriptor")]
    output: Option<PathBuf>,

    /// Working depth in bits per component (8, 16 or 32)
    #[arg(short, long, value_parser = config::parse_depth)]
    depth: Option<BitDepth>,

    /// JSON file with a full grade; individual flags override it
    #[arg(long)]
    grade: Option<PathBuf>,

    /// Scalar gain
    #[arg(long)]
    gain: Option<f64>,

    /// Gamma exponent
    #[arg(long)]
    gamma: Option<f64>,

    /// Saturation, 0 is grayscale
    #[arg(long)]
    saturation: Option<f64>,

    /// Per-channel gain as R,G,B
    #[arg(long, value_delimiter = ',', num_args = 1)]
    rgb_gain: Option<Vec<f64>>,

    /// Render window as x1,y1,x2,y2 (default: whole image)
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    window: Option<Vec<i32>>,

    /// Render time
    #[arg(short, long, default_value = "0")]
    time: f64,

    /// Print the effect descriptor as JSON and exit
    #[arg(long)]
    dump_descriptor: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Grade from `--grade` with the individual flags applied on top.
    fn grade(&self) -> Result<ColorCorrectParams> {
        let mut params = match &self.grade {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse grade {}", path.display()))?
            }
            None => ColorCorrectParams::default(),
        };

        if let Some(gain) = self.gain {
            params.gain = gain;
        }
        if let Some(gamma) = self.gamma {
            params.gamma = gamma;
        }
        if let Some(saturation) = self.saturation {
            params.saturation = saturation;
        }
        if let Some(rgb) = &self.rgb_gain {
            let [r, g, b] = rgb.as_slice() else {
                bail!("--rgb-gain takes three values, got {}", rgb.len());
            };
            params.rgb_gain = [*r, *g, *b];
        }
        Ok(params)
    }

    fn window(&self, bounds: Rect) -> Result<Rect> {
        match self.window.as_deref() {
            None => Ok(bounds),
            Some(&[x1, y1, x2, y2]) => Ok(Rect::new(x1, y1, x2, y2)),
            Some(other) => bail!("--window takes four values, got {}", other.len()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::default();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&config.log_filter)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.dump_descriptor {
        let host = StandaloneHost::describe(effect::CONTEXT_FILTER)?;
        let json = serde_json::to_string_pretty(host.descriptor())?;
        host.unload()?;
        println!("{json}");
        return Ok(());
    }

    let (Some(input), Some(output)) = (&cli.input, &cli.output) else {
        bail!("input and output paths are required");
    };
    run(&cli, &config, input, output)
}

fn run(cli: &Cli, config: &AppConfig, input: &Path, output: &Path) -> Result<()> {
    let params = cli.grade()?;
    let source = image_loader::load_image(input, cli.depth.or(config.depth))
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let bounds = source.bounds();
    let depth = source.bit_depth();
    let window = cli.window(bounds)?;

    tracing::info!(
        "{}: {}x{} {depth}, window {:?}",
        input.display(),
        bounds.width(),
        bounds.height(),
        window.to_array()
    );
    if params.is_identity() {
        tracing::info!("grade is neutral, output will match input");
    }

    let mut host = StandaloneHost::describe(effect::CONTEXT_FILTER)?;
    host.set_grade(&params)?;
    host.attach_image(clip::SOURCE, source)?;
    host.attach_image(clip::OUTPUT, HostImage::new(bounds, depth)?)?;
    host.create_instance()?;

    let rendered = host.render(cli.time, window);
    host.destroy_instance()?;
    host.unload()?;
    rendered.context("Render failed")?;

    let result = host
        .take_image(clip::OUTPUT)
        .context("Output clip lost its image")?;
    let img = image_loader::from_host_image(&result)?;
    image_loader::save_image(img, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!("wrote {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tint").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&["a.png", "b.png", "--gamma", "2.2", "--rgb-gain", "1,0.5,0.25"]);
        let grade = cli.grade().unwrap();
        assert!((grade.gamma - 2.2).abs() < EPSILON);
        assert!((grade.gain - 1.0).abs() < EPSILON);
        assert_eq!(grade.rgb_gain, [1.0, 0.5, 0.25]);
    }

    #[test]
    fn test_rgb_gain_needs_three_values() {
        let cli = parse(&["a.png", "b.png", "--rgb-gain", "1,2"]);
        assert!(cli.grade().is_err());
    }

    #[test]
    fn test_window_defaults_to_bounds() {
        let bounds = Rect::new(0, 0, 640, 480);
        assert_eq!(parse(&["a.png", "b.png"]).window(bounds).unwrap(), bounds);

        let cli = parse(&["a.png", "b.png", "--window", "-2,0,10,10"]);
        assert_eq!(cli.window(bounds).unwrap(), Rect::new(-2, 0, 10, 10));
        assert!(parse(&["a.png", "b.png", "-w", "1,2,3"]).window(bounds).is_err());
    }

    #[test]
    fn test_depth_flag() {
        let cli = parse(&["a.png", "b.png", "-d", "16"]);
        assert_eq!(cli.depth, Some(BitDepth::U16));
        assert!(Cli::try_parse_from(["tint", "a.png", "b.png", "-d", "10"]).is_err());
    }

    #[test]
    fn test_paths_required_without_dump() {
        assert!(Cli::try_parse_from(["tint"]).is_err());
        assert!(parse(&["--dump-descriptor"]).dump_descriptor);
    }

    #[test]
    fn test_end_to_end_through_files() {
        let dir = std::env::temp_dir().join(format!("tint-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("in.png");
        let output = dir.join("out.png");

        let src = image::RgbaImage::from_pixel(3, 2, image::Rgba([128, 64, 192, 200]));
        src.save(&input).unwrap();

        let cli = parse(&[
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--gamma",
            "2",
        ]);
        let config = AppConfig {
            depth: None,
            log_filter: "off".into(),
        };
        run(&cli, &config, &input, &output).unwrap();

        let out = image::open(&output).unwrap().to_rgba8();
        let px = out.get_pixel(2, 1).0;
        for (c, expected) in [64u8, 16, 145].into_iter().enumerate() {
            assert!(px[c].abs_diff(expected) <= 1, "channel {c}: {}", px[c]);
        }
        assert_eq!(px[3], 200);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
