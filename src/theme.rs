use crate::visual::Geometry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const THEME_DOCUMENT_TYPE: &str = "holographic-theme";
pub const THEME_DOCUMENT_VERSION: &str = "1.0";

/// Smallest density the renderer will sample with.
pub const MIN_DENSITY: f32 = 1e-4;
/// Upper bound on fractal rounds / swarm size, keeps a frame's cost bounded.
pub const MAX_COMPLEXITY: u32 = 32;

/// Full render configuration: one value per control on the editor panel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub geometry: GeometryParams,
    pub colors: ColorParams,
    pub animation: AnimationParams,
    pub interaction: InteractionParams,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeometryParams {
    #[serde(with = "selector")]
    pub primary: Geometry,
    /// `-1` on the wire.
    #[serde(with = "optional_selector")]
    pub secondary: Option<Geometry>,
    /// Percentage, 0..=100.
    pub blend_amount: f32,
    pub density: f32,
    #[serde(deserialize_with = "lenient_count")]
    pub complexity: u32,
    pub morph: f32,
    pub chaos: f32,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            primary: Geometry::Wave,
            secondary: None,
            blend_amount: 0.0,
            density: 1.4,
            complexity: 3,
            morph: 0.4,
            chaos: 0.25,
        }
    }
}

impl GeometryParams {
    pub fn blend_fraction(&self) -> f32 {
        (self.blend_amount / 100.0).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorParams {
    pub mode: String,
    pub primary_hue: f32,
    pub secondary_hue: f32,
    pub saturation: f32,
    pub brightness: f32,
    pub glow: f32,
    pub color_speed: f32,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            mode: "hsl".to_string(),
            primary_hue: 200.0,
            secondary_hue: 260.0,
            saturation: 0.8,
            brightness: 0.7,
            glow: 0.5,
            color_speed: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationParams {
    pub easing: String,
    pub base_speed: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub rotation_z: f32,
    pub pulse: f32,
    pub wave_amplitude: f32,
    pub auto_rotate: bool,
    pub breathing_effect: bool,
    pub particle_mode: bool,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            easing: "easeInOutQuad".to_string(),
            base_speed: 0.7,
            rotation_x: 0.5,
            rotation_y: 0.3,
            rotation_z: 0.2,
            pulse: 0.5,
            wave_amplitude: 0.3,
            auto_rotate: true,
            breathing_effect: false,
            particle_mode: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionParams {
    pub mouse_reactivity: f32,
    pub touch_sensitivity: f32,
    pub scroll_parallax: f32,
    pub audio_reactive: bool,
    pub gyro_enabled: bool,
    pub click_ripples: bool,
    pub magnetic_mouse: bool,
    pub bass_response: f32,
    pub mid_response: f32,
    pub high_response: f32,
}

impl Default for InteractionParams {
    fn default() -> Self {
        Self {
            mouse_reactivity: 0.8,
            touch_sensitivity: 1.0,
            scroll_parallax: 0.5,
            audio_reactive: false,
            gyro_enabled: false,
            click_ripples: true,
            magnetic_mouse: false,
            bass_response: 1.0,
            mid_response: 1.0,
            high_response: 1.0,
        }
    }
}

impl Theme {
    /// Copy with every value forced into its legal range. Never fails.
    pub fn sanitized(&self) -> Self {
        let mut t = self.clone();
        let d = GeometryParams::default();
        let g = &mut t.geometry;
        g.blend_amount = finite_or(g.blend_amount, d.blend_amount).clamp(0.0, 100.0);
        g.density = if g.density > 0.0 && g.density.is_finite() {
            g.density
        } else {
            MIN_DENSITY
        };
        g.complexity = g.complexity.clamp(1, MAX_COMPLEXITY);
        g.morph = finite_or(g.morph, d.morph);
        g.chaos = finite_or(g.chaos, d.chaos).max(0.0);

        let d = ColorParams::default();
        let c = &mut t.colors;
        c.primary_hue = finite_or(c.primary_hue, d.primary_hue).rem_euclid(360.0);
        c.secondary_hue = finite_or(c.secondary_hue, d.secondary_hue).rem_euclid(360.0);
        c.saturation = finite_or(c.saturation, d.saturation).clamp(0.0, 1.0);
        c.brightness = finite_or(c.brightness, d.brightness).clamp(0.0, 1.0);
        c.glow = finite_or(c.glow, d.glow);
        c.color_speed = finite_or(c.color_speed, d.color_speed);

        let d = AnimationParams::default();
        let a = &mut t.animation;
        a.base_speed = finite_or(a.base_speed, d.base_speed);
        a.rotation_x = finite_or(a.rotation_x, d.rotation_x);
        a.rotation_y = finite_or(a.rotation_y, d.rotation_y);
        a.rotation_z = finite_or(a.rotation_z, d.rotation_z);
        a.pulse = finite_or(a.pulse, d.pulse);
        a.wave_amplitude = finite_or(a.wave_amplitude, d.wave_amplitude);

        let d = InteractionParams::default();
        let i = &mut t.interaction;
        i.mouse_reactivity = finite_or(i.mouse_reactivity, d.mouse_reactivity);
        i.touch_sensitivity = finite_or(i.touch_sensitivity, d.touch_sensitivity);
        i.scroll_parallax = finite_or(i.scroll_parallax, d.scroll_parallax);
        i.bass_response = finite_or(i.bass_response, d.bass_response);
        i.mid_response = finite_or(i.mid_response, d.mid_response);
        i.high_response = finite_or(i.high_response, d.high_response);
        t
    }

    pub fn apply_palette(&mut self, palette: &ColorPalette) {
        self.colors.primary_hue = palette.hues[0];
        self.colors.secondary_hue = palette.hues[1];
    }

    /// Re-roll the look: geometry, colors and motion. Interaction settings are kept.
    pub fn randomize(&mut self, rng: &mut fastrand::Rng) {
        let g = &mut self.geometry;
        g.primary = Geometry::from_index(rng.i64(0..8));
        g.density = 0.5 + rng.f32() * 2.0;
        g.complexity = 1 + rng.u32(0..6);
        g.morph = rng.f32();
        g.chaos = rng.f32();

        let c = &mut self.colors;
        c.primary_hue = rng.u32(0..360) as f32;
        c.secondary_hue = rng.u32(0..360) as f32;
        c.saturation = 0.5 + rng.f32() * 0.5;
        c.brightness = 0.5 + rng.f32() * 0.5;
        c.glow = rng.f32();

        let a = &mut self.animation;
        a.base_speed = 0.2 + rng.f32() * 1.5;
        a.rotation_x = -1.0 + rng.f32() * 2.0;
        a.rotation_y = -1.0 + rng.f32() * 2.0;
        a.rotation_z = -1.0 + rng.f32() * 2.0;
        a.pulse = rng.f32();
        a.wave_amplitude = rng.f32();
    }
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

mod selector {
    use crate::visual::Geometry;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(g: &Geometry, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u32(g.index())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Geometry, D::Error> {
        let raw = f64::deserialize(d)?;
        Ok(Geometry::from_index(raw as i64))
    }
}

mod optional_selector {
    use crate::visual::Geometry;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(g: &Option<Geometry>, s: S) -> Result<S::Ok, S::Error> {
        match g {
            Some(g) => s.serialize_i64(g.index() as i64),
            None => s.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Geometry>, D::Error> {
        let raw = Option::<f64>::deserialize(d)?;
        Ok(match raw {
            Some(v) if v >= 0.0 => Some(Geometry::from_index(v as i64)),
            _ => None,
        })
    }
}

fn lenient_count<'de, D: serde::Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let raw = f64::deserialize(d)?;
    if raw.is_finite() && raw >= 1.0 {
        Ok(raw.min(u32::MAX as f64) as u32)
    } else {
        Ok(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeError {
    Io(String),
    Json(String),
    WrongType(String),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Json(msg) => write!(f, "invalid theme JSON: {msg}"),
            Self::WrongType(kind) => {
                write!(f, "not a theme document (type '{kind}', expected '{THEME_DOCUMENT_TYPE}')")
            }
        }
    }
}

impl std::error::Error for ThemeError {}

/// Export envelope around a [`Theme`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeDocument {
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: Theme,
    #[serde(default)]
    pub timestamp: u64,
}

impl ThemeDocument {
    pub fn new(name: &str, theme: &Theme) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            version: THEME_DOCUMENT_VERSION.to_string(),
            kind: THEME_DOCUMENT_TYPE.to_string(),
            name: name.to_string(),
            config: theme.clone(),
            timestamp,
        }
    }

    pub fn to_json(&self) -> Result<String, ThemeError> {
        serde_json::to_string_pretty(self).map_err(|e| ThemeError::Json(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, ThemeError> {
        let doc: Self = serde_json::from_str(text).map_err(|e| ThemeError::Json(e.to_string()))?;
        if doc.kind != THEME_DOCUMENT_TYPE {
            return Err(ThemeError::WrongType(doc.kind));
        }
        Ok(doc)
    }

    /// The carried theme with out-of-range values clamped.
    pub fn theme(&self) -> Theme {
        self.config.sanitized()
    }

    pub fn load(path: &Path) -> Result<Self, ThemeError> {
        let text = std::fs::read_to_string(path).map_err(|e| ThemeError::Io(e.to_string()))?;
        let doc = Self::from_json(&text)?;
        log::debug!("loaded theme '{}' from {}", doc.name, path.display());
        Ok(doc)
    }

    pub fn save(&self, path: &Path) -> Result<(), ThemeError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ThemeError::Io(e.to_string()))?;
            }
        }
        let body = self.to_json()?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, body).map_err(|e| ThemeError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| ThemeError::Io(e.to_string()))
    }
}

pub fn export_theme(name: &str, theme: &Theme) -> Result<String, ThemeError> {
    ThemeDocument::new(name, theme).to_json()
}

pub fn import_theme(text: &str) -> Result<Theme, ThemeError> {
    ThemeDocument::from_json(text).map(|doc| doc.theme())
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThemePreset {
    pub name: String,
    pub theme: Theme,
}

impl ThemePreset {
    pub fn new(name: impl Into<String>, theme: Theme) -> Self {
        Self {
            name: name.into(),
            theme,
        }
    }
}

pub fn make_presets() -> Vec<ThemePreset> {
    let mut v = Vec::new();

    let mut t = Theme::default();
    set_geometry(&mut t, Geometry::Hypercube, 2.0, 4, 0.6, 0.4);
    set_colors(&mut t, 300.0, 180.0, 0.9, 0.8, 0.7);
    t.animation.base_speed = 1.2;
    t.animation.rotation_x = 0.8;
    t.animation.rotation_y = 0.6;
    t.animation.pulse = 0.7;
    v.push(ThemePreset::new("Cyberpunk", t));

    let mut t = Theme::default();
    set_geometry(&mut t, Geometry::Wave, 1.2, 3, 0.8, 0.3);
    set_colors(&mut t, 200.0, 240.0, 0.8, 0.7, 0.5);
    t.animation.base_speed = 0.8;
    t.animation.wave_amplitude = 0.6;
    t.animation.pulse = 0.4;
    v.push(ThemePreset::new("Ocean Wave", t));

    let mut t = Theme::default();
    set_geometry(&mut t, Geometry::Crystal, 1.8, 5, 0.2, 0.1);
    set_colors(&mut t, 30.0, 60.0, 0.9, 0.9, 0.8);
    t.animation.base_speed = 0.5;
    t.animation.rotation_x = 0.3;
    t.animation.rotation_y = 0.3;
    t.animation.rotation_z = 0.3;
    v.push(ThemePreset::new("Crystal Matrix", t));

    let mut t = Theme::default();
    set_geometry(&mut t, Geometry::Fractal, 2.5, 6, 0.9, 0.8);
    set_colors(&mut t, 320.0, 260.0, 1.0, 0.8, 0.9);
    t.animation.base_speed = 1.5;
    t.animation.pulse = 0.8;
    t.animation.breathing_effect = true;
    v.push(ThemePreset::new("Plasma Storm", t));

    let mut t = Theme::default();
    t.geometry.primary = Geometry::Hypercube;
    t.geometry.secondary = Some(Geometry::Tetrahedron);
    t.geometry.blend_amount = 30.0;
    t.geometry.density = 1.5;
    t.geometry.complexity = 4;
    set_colors(&mut t, 160.0, 200.0, 0.9, 0.8, 0.6);
    t.animation.base_speed = 1.0;
    t.animation.rotation_y = 0.5;
    v.push(ThemePreset::new("Neon Grid", t));

    let mut t = Theme::default();
    set_geometry(&mut t, Geometry::Sphere, 0.8, 2, 0.3, 0.1);
    set_colors(&mut t, 180.0, 200.0, 0.3, 0.9, 0.4);
    t.animation.base_speed = 0.3;
    t.animation.pulse = 0.2;
    t.animation.breathing_effect = true;
    v.push(ThemePreset::new("Ethereal", t));

    v
}

fn set_geometry(t: &mut Theme, primary: Geometry, density: f32, complexity: u32, morph: f32, chaos: f32) {
    t.geometry.primary = primary;
    t.geometry.density = density;
    t.geometry.complexity = complexity;
    t.geometry.morph = morph;
    t.geometry.chaos = chaos;
}

fn set_colors(t: &mut Theme, primary_hue: f32, secondary_hue: f32, saturation: f32, brightness: f32, glow: f32) {
    t.colors.primary_hue = primary_hue;
    t.colors.secondary_hue = secondary_hue;
    t.colors.saturation = saturation;
    t.colors.brightness = brightness;
    t.colors.glow = glow;
}

/// Index by number, else first case-insensitive name match.
pub fn find_preset(query: &str, presets: &[ThemePreset]) -> Option<usize> {
    let q = query.trim();
    if let Ok(idx) = q.parse::<usize>() {
        return (idx < presets.len()).then_some(idx);
    }
    let q = q.to_lowercase();
    presets.iter().position(|p| p.name.to_lowercase().contains(&q))
}

/// Append `theme` as a user preset and return its index. A blank name becomes
/// the first free "Custom N".
pub fn add_custom_preset(presets: &mut Vec<ThemePreset>, name: &str, theme: &Theme) -> usize {
    let name = match name.trim() {
        "" => {
            let mut n = 1;
            while presets.iter().any(|p| p.name == format!("Custom {n}")) {
                n += 1;
            }
            format!("Custom {n}")
        }
        given => given.to_string(),
    };
    presets.push(ThemePreset::new(name, theme.sanitized()));
    presets.len() - 1
}

/// `"Neon Grid 2"` -> `"neon-grid-2.json"`.
pub fn preset_file_name(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "preset.json".to_string()
    } else {
        format!("{slug}.json")
    }
}

/// Write `theme` as a theme document into the preset directory.
pub fn save_preset(dir: &Path, name: &str, theme: &Theme) -> Result<PathBuf, ThemeError> {
    let path = dir.join(preset_file_name(name));
    ThemeDocument::new(name, theme).save(&path)?;
    log::debug!("saved preset '{}' to {}", name, path.display());
    Ok(path)
}

/// Every `*.json` theme document in `dir`, ordered by file name. A missing
/// directory yields no presets; unreadable documents are skipped.
pub fn load_preset_dir(dir: &Path) -> Result<Vec<ThemePreset>, ThemeError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| ThemeError::Io(e.to_string()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut presets = Vec::with_capacity(paths.len());
    for path in paths {
        match ThemeDocument::load(&path) {
            Ok(doc) => {
                let name = if doc.name.trim().is_empty() {
                    path.file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default()
                } else {
                    doc.name.clone()
                };
                presets.push(ThemePreset::new(name, doc.theme()));
            }
            Err(e) => log::warn!("skipping preset {}: {e}", path.display()),
        }
    }
    Ok(presets)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorPalette {
    pub name: &'static str,
    pub hues: [f32; 2],
}

pub const PALETTES: [ColorPalette; 8] = [
    ColorPalette { name: "Cyberpunk", hues: [300.0, 180.0] },
    ColorPalette { name: "Sunset", hues: [20.0, 50.0] },
    ColorPalette { name: "Ocean", hues: [200.0, 240.0] },
    ColorPalette { name: "Forest", hues: [120.0, 80.0] },
    ColorPalette { name: "Purple Dream", hues: [280.0, 320.0] },
    ColorPalette { name: "Fire", hues: [0.0, 30.0] },
    ColorPalette { name: "Ice", hues: [180.0, 220.0] },
    ColorPalette { name: "Gold", hues: [45.0, 60.0] },
];
