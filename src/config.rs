use crate::theme::{find_preset, load_preset_dir, make_presets, Theme, ThemeDocument, ThemePreset, PALETTES};
use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "holo_field", version, about = "Procedural 4D holographic wallpaper for the terminal")]
pub struct Config {
    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Built-in theme by name or index.
    #[arg(long)]
    pub theme: Option<String>,

    /// Theme document (JSON) to load; wins over `--theme`.
    #[arg(long)]
    pub theme_file: Option<PathBuf>,

    /// Hue pair to apply on top of the theme.
    #[arg(long)]
    pub palette: Option<String>,

    /// Randomize the theme's look at startup.
    #[arg(long, default_value_t = false)]
    pub random: bool,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Drive the audio-reactive terms from a WAV file played in real time.
    #[arg(long)]
    pub audio_wav: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Write the resolved theme document to this path and exit.
    #[arg(long)]
    pub export_theme: Option<PathBuf>,

    /// Render on one thread instead of the rayon pool.
    #[arg(long, default_value_t = false)]
    pub serial: bool,

    #[arg(long, default_value_t = false)]
    pub list_themes: bool,

    /// Directory of saved presets, listed after the built-in themes.
    #[arg(long)]
    pub preset_dir: Option<PathBuf>,

    /// Save the resolved theme as a named preset in `--preset-dir` and exit.
    #[arg(long, requires = "preset_dir")]
    pub save_preset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
}

impl Config {
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    /// Built-in themes followed by any saved in `--preset-dir`.
    pub fn presets(&self) -> anyhow::Result<Vec<ThemePreset>> {
        let mut presets = make_presets();
        if let Some(dir) = &self.preset_dir {
            let saved = load_preset_dir(dir)
                .with_context(|| format!("read presets from {}", dir.display()))?;
            log::debug!("{} saved presets in {}", saved.len(), dir.display());
            presets.extend(saved);
        }
        Ok(presets)
    }

    /// Starting theme and its display name, from file, preset name or defaults,
    /// then palette and randomization on top.
    pub fn resolve_theme(&self, presets: &[ThemePreset]) -> anyhow::Result<(String, Theme)> {
        let (mut name, mut theme) = if let Some(path) = &self.theme_file {
            let doc = ThemeDocument::load(path)
                .with_context(|| format!("load theme {}", path.display()))?;
            let theme = doc.theme();
            (doc.name, theme)
        } else if let Some(query) = &self.theme {
            let Some(idx) = find_preset(query, presets) else {
                let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
                bail!("unknown theme '{query}' (available: {})", names.join(", "));
            };
            let p = &presets[idx];
            (p.name.clone(), p.theme.clone())
        } else {
            ("Default".to_string(), Theme::default())
        };

        if let Some(query) = &self.palette {
            let q = query.trim().to_lowercase();
            let Some(palette) = PALETTES.iter().find(|p| p.name.to_lowercase() == q) else {
                bail!("unknown palette '{query}'");
            };
            theme.apply_palette(palette);
            name = format!("{name} / {}", palette.name);
        }

        if self.random {
            theme.randomize(&mut self.rng());
            name = "Random".to_string();
        }

        if self.audio_wav.is_some() && !theme.interaction.audio_reactive {
            log::info!("enabling audio reactivity for --audio-wav");
            theme.interaction.audio_reactive = true;
        }

        Ok((name, theme))
    }
}
