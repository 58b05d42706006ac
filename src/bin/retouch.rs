use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "retouch", version)]
struct Cli {
    /// Log stage recomputation to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON render recipe and export a PNG.
    Render(RenderArgs),
    /// Crop an image file, optionally rotated.
    Crop(CropArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input recipe JSON. Relative paths inside resolve against its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Skip overlays (the flattened base sent to remote edits).
    #[arg(long)]
    mask_pass: bool,

    /// Print the SHA-256 of the written PNG.
    #[arg(long)]
    digest: bool,

    /// Run per-pixel stages in parallel. Without it `RETOUCH_PARALLEL` decides.
    #[arg(long)]
    parallel: bool,
}

#[derive(Parser, Debug)]
struct CropArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Left edge in source pixels.
    #[arg(long)]
    x: f64,

    /// Top edge in source pixels.
    #[arg(long)]
    y: f64,

    /// Width in pixels.
    #[arg(long)]
    width: f64,

    /// Height in pixels.
    #[arg(long)]
    height: f64,

    /// Clockwise rotation in degrees about the rectangle center.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotation: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Crop(args) => cmd_crop(args),
    }
}

fn write_png(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("open recipe '{}'", args.in_path.display()))?;
    let recipe = retouch::RenderRecipe::from_json(&json)?;
    let opts = engine_opts(retouch::EngineOpts::from_env(), args.parallel);

    let base_dir = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let session = recipe.build(base_dir, opts)?;
    let raster = session.export_with(retouch::ExportOptions {
        mask_pass: args.mask_pass,
    })?;
    let png = retouch::assets::codec::encode_png(&raster)?;
    write_png(&args.out, &png)?;

    if args.digest {
        println!("{}", sha256_hex(&png));
    }
    Ok(())
}

fn cmd_crop(args: CropArgs) -> anyhow::Result<()> {
    let opts = retouch::EngineOpts::from_env();
    let src = retouch::assets::codec::load_image(&args.in_path, &opts)?;
    let rect = retouch::CropRect {
        x: args.x,
        y: args.y,
        width: args.width,
        height: args.height,
        rotation: args.rotation,
    };
    let out = retouch::export::crop::crop(&src, &rect, &opts)?;
    write_png(&args.out, &retouch::assets::codec::encode_png(&out)?)
}

/// `--parallel` can only turn parallelism on; the environment default stands otherwise.
fn engine_opts(env: retouch::EngineOpts, parallel_flag: bool) -> retouch::EngineOpts {
    if parallel_flag {
        env.with_parallel(true)
    } else {
        env
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
