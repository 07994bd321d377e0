//! lensfx - lens effect filters from the command line
//!
//! One subcommand per filter, plus color analysis and the `demo` driver
//! that runs a recipe of filter steps.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod recipe;

#[derive(Parser)]
#[command(name = "lensfx")]
#[command(author, version, about = "Lens effect filters: prism, anti-fisheye, bokeh, color lookup")]
#[command(long_about = "
Applies lens effect filters to images.

Examples:
  lensfx prism in.png -o out.png --distortion 0.1 --iterations 5
  lensfx fisheye in.png -o out.png --factor 1.5
  lensfx lens-blur in.png --mask depth.png -o out.png --radius 10
  lensfx lookup in.png --table lookup.png -o out.png
  lensfx average in.png --rect 0,0,64,64
  lensfx cct in.png
  lensfx demo recipe.yaml --out-dir renders
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Chromatic aberration
    Prism(PrismArgs),

    /// Barrel distortion correction
    #[command(visible_alias = "anti-fisheye")]
    Fisheye(FisheyeArgs),

    /// Hexagonal bokeh blur driven by a mask
    LensBlur(LensBlurArgs),

    /// Color grade through a lookup image or .cube file
    Lookup(LookupArgs),

    /// Gaussian or box blur
    Blur(BlurArgs),

    /// Lift shadows and pull down highlights
    HighlightShadow(HighlightShadowArgs),

    /// Rotational motion blur around the center
    SpinBlur(SpinBlurArgs),

    /// Boost muted colors
    Vibrance(VibranceArgs),

    /// Resize image
    #[command(visible_alias = "r")]
    Resize(ResizeArgs),

    /// Print the average color of an image or region
    Average(AverageArgs),

    /// Print color temperature, tint and white points
    Cct(CctArgs),

    /// Run a recipe of filter steps (built-in default when none is given)
    Demo(DemoArgs),
}

#[derive(Args)]
struct PrismArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Radial distortion strength
    #[arg(long, default_value = "0.0")]
    distortion: f32,

    /// Number of spectral samples (rounded, 1-256)
    #[arg(long, default_value = "5")]
    iterations: f32,

    /// Blend between the spectral sum and the original
    #[arg(long, default_value = "0.5")]
    strength: f32,

    /// Spread of the spectral samples
    #[arg(long, default_value = "0.5")]
    separation: f32,
}

#[derive(Args)]
struct FisheyeArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Correction strength (0 = identity)
    #[arg(short, long, default_value = "1.0")]
    factor: f32,
}

#[derive(Args)]
struct LensBlurArgs {
    /// Input image
    input: PathBuf,

    /// Focus mask, white sharp and black blurred (resized to the input when sizes differ)
    #[arg(short, long)]
    mask: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Bokeh radius in pixels
    #[arg(short, long, default_value = "10.0")]
    radius: f32,

    /// Highlight bloom (0-1)
    #[arg(short, long, default_value = "0.5")]
    brightness: f32,

    /// Hexagon rotation in radians
    #[arg(short, long, default_value = "0.0")]
    angle: f32,
}

#[derive(Args)]
struct LookupArgs {
    /// Input image
    input: PathBuf,

    /// Lookup image or .cube file
    #[arg(short, long)]
    table: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Mix between original (0) and graded (1)
    #[arg(short = 'I', long, default_value = "1.0")]
    intensity: f32,

    /// Interpolation for .cube tables: nearest, linear, tetrahedral
    #[arg(long, default_value = "linear")]
    interpolation: String,
}

#[derive(Args)]
struct BlurArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Blur radius (sigma for gaussian, pixels for box)
    #[arg(short, long, default_value = "2.0")]
    radius: f32,

    /// Blur type: gaussian, box
    #[arg(short = 't', long = "type", default_value = "gaussian")]
    blur_type: String,
}

#[derive(Args)]
struct HighlightShadowArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Highlight amount (1 = unchanged, 0 = darkest)
    #[arg(long, default_value = "1.0")]
    highlight: f32,

    /// Shadow amount (0 = unchanged, 1 = brightest)
    #[arg(long, default_value = "0.0")]
    shadow: f32,

    /// Blur radius of the luminance mask
    #[arg(short, long, default_value = "0.0")]
    radius: f32,
}

#[derive(Args)]
struct SpinBlurArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Number of rotations averaged
    #[arg(short, long, default_value_t = lensfx_ops::spin_blur::DEFAULT_STEPS)]
    steps: u32,

    /// Rotation per step in radians
    #[arg(short, long, default_value_t = lensfx_ops::spin_blur::DEFAULT_DELTA)]
    delta: f32,

    /// Gaussian pre-blur kernel size (0 = off)
    #[arg(long, default_value_t = lensfx_ops::spin_blur::DEFAULT_SMOOTH)]
    smooth: usize,
}

#[derive(Args)]
struct VibranceArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Vibrance strength
    #[arg(short, long, default_value_t = lensfx_ops::vibrance::DEFAULT_VIBRANCE)]
    amount: f32,
}

#[derive(Args)]
struct ResizeArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Target width
    #[arg(short, long)]
    width: Option<u32>,

    /// Target height
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Scale factor (alternative to width/height)
    #[arg(short, long)]
    scale: Option<f32>,

    /// Filter: nearest, bilinear, bicubic, lanczos
    #[arg(short, long, default_value = "bilinear")]
    filter: String,
}

#[derive(Args)]
struct AverageArgs {
    /// Input image
    input: PathBuf,

    /// Region as x,y,width,height (whole image when omitted)
    #[arg(short, long)]
    rect: Option<String>,
}

#[derive(Args)]
struct CctArgs {
    /// Input image
    input: PathBuf,
}

#[derive(Args)]
struct DemoArgs {
    /// YAML recipe; image names in it resolve next to the recipe file
    recipe: Option<PathBuf>,

    /// Directory for outputs (defaults to the recipe's directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Print the built-in recipe as YAML and exit
    #[arg(long)]
    print_default: bool,
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // A second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Prism(args) => commands::prism::run(args, cli.verbose),
        Commands::Fisheye(args) => commands::fisheye::run(args, cli.verbose),
        Commands::LensBlur(args) => commands::lens_blur::run(args, cli.verbose),
        Commands::Lookup(args) => commands::lookup::run(args, cli.verbose),
        Commands::Blur(args) => commands::blur::run(args, cli.verbose),
        Commands::HighlightShadow(args) => commands::adjust::run_highlight_shadow(args, cli.verbose),
        Commands::SpinBlur(args) => commands::adjust::run_spin_blur(args, cli.verbose),
        Commands::Vibrance(args) => commands::adjust::run_vibrance(args, cli.verbose),
        Commands::Resize(args) => commands::resize::run(args, cli.verbose),
        Commands::Average(args) => commands::analyze::run_average(args, cli.verbose),
        Commands::Cct(args) => commands::analyze::run_cct(args, cli.verbose),
        Commands::Demo(args) => commands::demo::run(args, cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lensfx", "fisheye", "a.png", "-o", "b.png", "-v", "-j", "2"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.threads, 2);
        match cli.command {
            Commands::Fisheye(args) => assert_eq!(args.factor, 1.0),
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn lens_blur_requires_mask() {
        assert!(Cli::try_parse_from(["lensfx", "lens-blur", "a.png", "-o", "b.png"]).is_err());
    }
}
