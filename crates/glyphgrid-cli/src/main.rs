use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use glyphgrid::{
    BitmapFace, BlendMode, Config, Device, DrawOptions, FilterMode, GlyphAtlas, GlyphFace,
    GlyphGrid, GlyphRenderer, Palette, RendererOptions, ResourceManager, Rgba8, SoftwareDevice,
    REFERENCE_GLYPH,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::console::grid_to_ansi;
use crate::fill::fill_random;
mod console;
mod fill;

#[derive(Parser)]
#[command(name = "glyphgrid", about = "Glyph grid renderer CLI")]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(flatten)]
    face: FaceArgs,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Args)]
struct FaceArgs {
    /// TTF/OTF file under <assets>/assets/fonts; the built-in VGA face otherwise
    #[arg(long, global = true)]
    font: Option<String>,
    /// Font size in pixels; requires a TrueType face
    #[arg(long, global = true)]
    size: Option<f32>,
    /// Directory holding `assets/`; searched upwards from the cwd if omitted
    #[arg(long, global = true)]
    assets: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Render random frames on the software device and save the last as PNG
    Render {
        #[arg(long)]
        cols: Option<u32>,
        #[arg(long)]
        rows: Option<u32>,
        /// TOML config (logical size, scale, clear color, font)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "0")]
        seed: u64,
        #[arg(long, default_value = "1")]
        frames: u32,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Print a random grid as 24-bit ANSI
    Ansi {
        #[arg(long, default_value = "40")]
        cols: u32,
        #[arg(long, default_value = "12")]
        rows: u32,
        #[arg(long, default_value = "0")]
        seed: u64,
    },
    /// Save the glyph atlas as PNG
    Atlas {
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Print palette, cell metrics and atlas size
    Inspect {
        #[arg(long, default_value = "80")]
        cols: u32,
        #[arg(long, default_value = "25")]
        rows: u32,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Pick the face: `--font`, then the config's font, then the VGA face.
fn load_face(args: &FaceArgs, config: Option<&Config>) -> Result<Box<dyn GlyphFace>> {
    let (name, size) = match (&args.font, config.and_then(|c| c.font.as_ref())) {
        (Some(name), _) => (name, args.size.unwrap_or(16.0)),
        (None, Some(name)) => (
            name,
            args.size
                .unwrap_or_else(|| config.map_or(16.0, |c| c.font_size)),
        ),
        (None, None) => {
            if let Some(size) = args.size {
                bail!("--size {size} needs --font or a config font; the built-in VGA face is 8x16");
            }
            return Ok(Box::new(BitmapFace::vga()));
        }
    };
    let resources = match &args.assets {
        Some(root) => ResourceManager::new(root),
        None => ResourceManager::discover()?,
    };
    let face = resources
        .load_face(name, size)
        .with_context(|| format!("loading font {name:?}"))?;
    info!(font = %name, size, "using font face");
    Ok(Box::new(face))
}

fn cell_size(face: &dyn GlyphFace) -> (u32, u32) {
    let (w, h) = face.measure(REFERENCE_GLYPH);
    (w as u32, h as u32)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Cmd::Render {
            cols,
            rows,
            config,
            seed,
            frames,
            out,
        } => {
            let config = config
                .map(|path| {
                    Config::load(&path).with_context(|| format!("reading {}", path.display()))
                })
                .transpose()?;
            let face = load_face(&cli.face, config.as_ref())?;
            let (cell_w, cell_h) = cell_size(face.as_ref());
            let (cols, rows) = match &config {
                Some(cfg) => {
                    let (c, r) = cfg.grid_size(cell_w, cell_h);
                    (cols.unwrap_or(c), rows.unwrap_or(r))
                }
                None => (cols.unwrap_or(80), rows.unwrap_or(25)),
            };
            if cols == 0 || rows == 0 {
                bail!("a {cols}x{rows} grid has no pixels to render");
            }

            let palette = Arc::new(Palette::base());
            let mut device = SoftwareDevice::new();
            let mut renderer = GlyphRenderer::new(
                &mut device,
                cols,
                rows,
                Arc::clone(&palette),
                face.as_ref(),
                RendererOptions::default(),
            )?;
            let mut grid = GlyphGrid::new(cols, rows, palette);
            let mut rng = StdRng::seed_from_u64(seed);

            let (width, height) = renderer.pixel_size();
            let target = device.create_texture("target", width, height)?;
            let clear = config
                .as_ref()
                .map_or(Rgba8::OPAQUE_BLACK, Config::clear_color_rgba);
            for frame in 0..frames.max(1) {
                fill_random(&mut grid, &mut rng);
                let stats = renderer.update(&mut device, &grid)?;
                device.clear(&target, clear)?;
                renderer.draw(&mut device, &target)?;
                debug!(frame, ?stats, "frame done");
            }

            let scale = config.as_ref().map_or(1, |c| c.scale.max(1));
            let output = device.create_texture("output", width * scale, height * scale)?;
            device.draw_scaled(
                &target,
                &output,
                &DrawOptions::scaled(scale, scale, FilterMode::Nearest, BlendMode::Replace),
            )?;
            device
                .image(&output)
                .save(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            println!(
                "{cols}x{rows} cells -> {}x{} px -> {}",
                width * scale,
                height * scale,
                out.display()
            );
        }
        Cmd::Ansi { cols, rows, seed } => {
            let mut grid = GlyphGrid::new(cols, rows, Arc::new(Palette::base()));
            fill_random(&mut grid, &mut StdRng::seed_from_u64(seed));
            println!("{}", grid_to_ansi(&grid)?);
        }
        Cmd::Atlas { out } => {
            let face = load_face(&cli.face, None)?;
            let atlas = GlyphAtlas::build(face.as_ref())?;
            atlas
                .to_image()
                .save(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("atlas {}x{} -> {}", atlas.width(), atlas.height(), out.display());
        }
        Cmd::Inspect { cols, rows } => {
            let face = load_face(&cli.face, None)?;
            let atlas = GlyphAtlas::build(face.as_ref())?;
            let palette = Palette::base();
            println!("palette: {} colors", palette.len());
            for (index, name, color) in palette.iter() {
                println!("  {index:>3} {name:<10} {}", color.hex());
            }
            println!("cell {}x{}", atlas.cell_width(), atlas.cell_height());
            println!("atlas {}x{}", atlas.width(), atlas.height());
            println!(
                "grid {cols}x{rows} -> {}x{} px",
                cols * atlas.cell_width(),
                rows * atlas.cell_height()
            );
        }
    }
    Ok(())
}
