use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glam::Vec2;
use holo_field::driver::Surface;
use holo_field::theme::{find_preset, make_presets, Theme, ThemeDocument};
use holo_field::visual::{FrameProgram, Uniforms};

const DEFAULT_OUTPUT: &str = "wallpaper.ppm";
const DEFAULT_TIME_MS: f32 = 5000.0;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "export_wallpaper",
    version,
    about = "Render one still frame of a theme to a binary PPM"
)]
pub(crate) struct Cli {
    #[arg(long, value_name = "PPM", default_value = DEFAULT_OUTPUT)]
    pub(crate) out: PathBuf,

    #[arg(long, default_value_t = 1920)]
    pub(crate) width: usize,

    #[arg(long, default_value_t = 1080)]
    pub(crate) height: usize,

    /// Elapsed animation time of the still.
    #[arg(long, default_value_t = DEFAULT_TIME_MS)]
    pub(crate) time_ms: f32,

    #[arg(long, value_name = "INDEX_OR_SUBSTRING")]
    pub(crate) theme: Option<String>,

    #[arg(long, value_name = "JSON")]
    pub(crate) theme_file: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub(crate) serial: bool,
}

pub(crate) fn validate_args(args: &Cli) -> Result<()> {
    if args.width == 0 {
        bail!("--width must be >= 1");
    }
    if args.height == 0 {
        bail!("--height must be >= 1");
    }
    if !args.time_ms.is_finite() || args.time_ms < 0.0 {
        bail!("--time-ms must be a finite value >= 0");
    }
    if args.theme.is_some() && args.theme_file.is_some() {
        bail!("--theme and --theme-file are mutually exclusive");
    }
    Ok(())
}

pub(crate) fn resolve_theme(args: &Cli) -> Result<Theme> {
    if let Some(path) = &args.theme_file {
        let doc = ThemeDocument::load(path)
            .with_context(|| format!("load theme {}", path.display()))?;
        return Ok(doc.theme());
    }
    match &args.theme {
        Some(query) => {
            let presets = make_presets();
            let idx = find_preset(query, &presets)
                .with_context(|| format!("unknown theme '{query}'"))?;
            Ok(presets[idx].theme.clone())
        }
        None => Ok(Theme::default()),
    }
}

pub(crate) fn render_still(theme: &Theme, width: usize, height: usize, time_ms: f32, parallel: bool) -> Result<Surface> {
    let mut surface = Surface::new(width, height)?;
    let uniforms = Uniforms {
        resolution: Vec2::new(width as f32, height as f32),
        time_ms,
        ..Uniforms::default()
    };
    surface.shade(&FrameProgram::new(theme, uniforms), parallel);
    Ok(surface)
}

pub(crate) fn encode_ppm(surface: &Surface) -> Vec<u8> {
    let mut bytes = format!("P6\n{} {}\n255\n", surface.width(), surface.height()).into_bytes();
    bytes.extend_from_slice(&surface.to_rgb());
    bytes
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let args = Cli::parse();
    run(args)
}

fn run(args: Cli) -> Result<()> {
    validate_args(&args)?;
    let theme = resolve_theme(&args)?;

    let started = std::time::Instant::now();
    let surface = render_still(&theme, args.width, args.height, args.time_ms, !args.serial)?;
    log::info!(
        "rendered {}x{} at t={}ms in {:.1}ms",
        args.width,
        args.height,
        args.time_ms,
        started.elapsed().as_secs_f64() * 1000.0
    );

    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }
    }
    let mut file = fs::File::create(&args.out)
        .with_context(|| format!("create {}", args.out.display()))?;
    file.write_all(&encode_ppm(&surface))
        .with_context(|| format!("write {}", args.out.display()))?;
    log::info!("wrote {}", args.out.display());
    Ok(())
}
