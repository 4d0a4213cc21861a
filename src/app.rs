use crate::audio::WavFeed;
use crate::config::{Config, RendererMode};
use crate::driver::FrameDriver;
use crate::input::{input_channel, InputEvent, InputSender};
use crate::render::{AsciiRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::terminal::TerminalGuard;
use crate::theme::{
    add_custom_preset, find_preset, save_preset, Theme, ThemeDocument, ThemePreset, PALETTES,
};
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use glam::Vec2;
use std::io::BufWriter;
use std::time::{Duration, Instant};

/// Wheel travel per notch, in pixels.
const WHEEL_STEP_PX: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    NextTheme,
    PrevTheme,
    Randomize,
    NextPalette,
    NextGeometry,
    ToggleParticles,
    ToggleBreathing,
    ToggleAudio,
    ToggleHud,
    ToggleHelp,
    SavePreset,
}

/// Last mouse position in pixels, for movement intensity.
struct PointerTracker {
    last: Option<Vec2>,
}

impl PointerTracker {
    fn event(&mut self, m: &MouseEvent, cell: (usize, usize), surface: Vec2) -> Option<InputEvent> {
        let px = Vec2::new(
            (m.column as f32 + 0.5) * cell.0 as f32,
            (m.row as f32 + 0.5) * cell.1 as f32,
        );
        match m.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let movement = self.last.map_or(Vec2::ZERO, |last| px - last);
                self.last = Some(px);
                Some(InputEvent::pointer_from_pixels(px.x, px.y, surface, movement))
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.last = Some(px);
                Some(InputEvent::click_from_pixels(px.x, px.y, surface))
            }
            MouseEventKind::ScrollUp => Some(InputEvent::wheel(-WHEEL_STEP_PX)),
            MouseEventKind::ScrollDown => Some(InputEvent::wheel(WHEEL_STEP_PX)),
            _ => None,
        }
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let mut presets = cfg.presets()?;
    if cfg.list_themes {
        for (i, p) in presets.iter().enumerate() {
            println!("{i}: {}", p.name);
        }
        return Ok(());
    }

    let (mut theme_name, mut theme) = cfg.resolve_theme(&presets)?;

    if let (Some(name), Some(dir)) = (&cfg.save_preset, &cfg.preset_dir) {
        let path = save_preset(dir, name, &theme)
            .with_context(|| format!("save preset '{name}'"))?;
        log::info!("saved preset '{}' to {}", name, path.display());
        return Ok(());
    }

    if let Some(path) = &cfg.export_theme {
        ThemeDocument::new(&theme_name, &theme)
            .save(path)
            .with_context(|| format!("write theme {}", path.display()))?;
        log::info!("wrote theme '{}' to {}", theme_name, path.display());
        return Ok(());
    }

    let mut preset_cursor = find_preset(&theme_name, &presets).unwrap_or(0);
    let mut palette_cursor = 0usize;
    let mut rng = cfg.rng();

    let feed = match &cfg.audio_wav {
        Some(path) => Some(WavFeed::start(path)?),
        None => None,
    };

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
    };
    let cell = renderer.cell_pixels();

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.1 < 2 || last_size.0 < 4 {
        anyhow::bail!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        );
    }

    log::info!(
        "starting '{}' with {} renderer at {} fps",
        theme_name,
        renderer.name(),
        cfg.fps
    );

    let (input_tx, input_queue) = input_channel();
    let mut show_hud = true;
    let mut show_help = false;
    let mut hud_rows = hud_rows_for_size(last_size, show_hud);
    let (w, h) = surface_size(last_size, cell, hud_rows);
    let mut driver = FrameDriver::new(w, h)?
        .with_input(input_queue)
        .with_parallel(!cfg.serial);
    if let Some(feed) = &feed {
        driver = driver.with_audio(feed.snapshot());
    }

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());
    let mut pointer = PointerTracker { last: None };
    let start = Instant::now();
    let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    match handle_key(k.code, k.modifiers) {
                        Action::None => {}
                        Action::Quit => return Ok(()),
                        Action::NextTheme => {
                            preset_cursor = (preset_cursor + 1) % presets.len();
                            (theme_name, theme) = preset_at(&presets, preset_cursor);
                        }
                        Action::PrevTheme => {
                            preset_cursor = (preset_cursor + presets.len() - 1) % presets.len();
                            (theme_name, theme) = preset_at(&presets, preset_cursor);
                        }
                        Action::Randomize => {
                            theme.randomize(&mut rng);
                            theme_name = "Random".to_string();
                        }
                        Action::NextPalette => {
                            let palette = &PALETTES[palette_cursor % PALETTES.len()];
                            theme.apply_palette(palette);
                            palette_cursor += 1;
                        }
                        Action::NextGeometry => {
                            theme.geometry.primary = theme.geometry.primary.next();
                        }
                        Action::ToggleParticles => {
                            theme.animation.particle_mode = !theme.animation.particle_mode;
                        }
                        Action::ToggleBreathing => {
                            theme.animation.breathing_effect = !theme.animation.breathing_effect;
                        }
                        Action::ToggleAudio => {
                            theme.interaction.audio_reactive = !theme.interaction.audio_reactive;
                        }
                        Action::ToggleHud => {
                            show_hud = !show_hud;
                            hud_rows = hud_rows_for_size(last_size, show_hud);
                            let (w, h) = surface_size(last_size, cell, hud_rows);
                            driver.resize(w, h)?;
                        }
                        Action::ToggleHelp => show_help = !show_help,
                        Action::SavePreset => {
                            preset_cursor = add_custom_preset(&mut presets, "", &theme);
                            theme_name = presets[preset_cursor].name.clone();
                            if let Some(dir) = &cfg.preset_dir {
                                if save_preset(dir, &theme_name, &theme).is_err() {
                                    theme_name.push_str(" (unsaved)");
                                }
                            }
                        }
                    }
                }
                Event::Mouse(m) => {
                    forward_mouse(&mut pointer, &input_tx, &m, cell, driver.surface().size());
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    hud_rows = hud_rows_for_size(last_size, show_hud);
                    let (w, h) = surface_size(last_size, cell, hud_rows);
                    driver.resize(w, h)?;
                }
                _ => {}
            }
        }

        let hud = if show_hud && hud_rows > 0 {
            build_hud(&theme_name, &theme, renderer.name(), driver.fps(), feed.is_some())
        } else {
            String::new()
        };

        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        let (term_cols, term_rows) = last_size;
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let surface = driver.frame(now_ms, &theme);

        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: surface.width(),
            pixel_height: surface.height(),
            pixels_rgba: surface.rgba(),
            hud: &hud,
            hud_rows,
            overlay: show_help.then_some(help_text()),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn forward_mouse(
    pointer: &mut PointerTracker,
    tx: &InputSender,
    m: &MouseEvent,
    cell: (usize, usize),
    surface: Vec2,
) {
    if let Some(ev) = pointer.event(m, cell, surface) {
        tx.send(ev);
    }
}

fn preset_at(presets: &[ThemePreset], idx: usize) -> (String, Theme) {
    let p = &presets[idx];
    (p.name.clone(), p.theme.clone())
}

fn surface_size(size: (u16, u16), cell: (usize, usize), hud_rows: u16) -> (usize, usize) {
    let (cols, rows) = size;
    let visual_rows = rows.saturating_sub(hud_rows).max(1);
    (
        (cols as usize).max(1) * cell.0,
        visual_rows as usize * cell.1,
    )
}

fn hud_rows_for_size(size: (u16, u16), show_hud: bool) -> u16 {
    if !show_hud || size.1 < 4 {
        return 0;
    }
    1
}

fn handle_key(code: KeyCode, mods: KeyModifiers) -> Action {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return Action::Quit;
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Right | KeyCode::Char(' ') => Action::NextTheme,
        KeyCode::Left => Action::PrevTheme,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Randomize,
        KeyCode::Char('c') | KeyCode::Char('C') => Action::NextPalette,
        KeyCode::Char('g') | KeyCode::Char('G') => Action::NextGeometry,
        KeyCode::Char('p') | KeyCode::Char('P') => Action::ToggleParticles,
        KeyCode::Char('b') | KeyCode::Char('B') => Action::ToggleBreathing,
        KeyCode::Char('a') | KeyCode::Char('A') => Action::ToggleAudio,
        KeyCode::Char('i') | KeyCode::Char('I') => Action::ToggleHud,
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::F(1) => Action::ToggleHelp,
        KeyCode::Char('s') | KeyCode::Char('S') => Action::SavePreset,
        _ => Action::None,
    }
}

fn build_hud(name: &str, theme: &Theme, renderer: &str, fps: Option<f32>, has_audio: bool) -> String {
    let audio = match (has_audio, theme.interaction.audio_reactive) {
        (true, true) => "on",
        (false, true) => "no feed",
        _ => "off",
    };
    let fps = fps.map_or_else(|| "--".to_string(), |f| format!("{f:>4.1}"));
    format!(
        "{} | {} | {} | audio {} | FPS {} | ? help",
        name,
        if theme.animation.particle_mode {
            "Particle (mode)"
        } else {
            theme.geometry.primary.label()
        },
        renderer,
        audio,
        fps
    )
}

fn help_text() -> &'static str {
    "Hotkeys\n\
left/right or space  previous/next built-in theme\n\
r  randomize colors, geometry and motion\n\
c  next color palette\n\
g  next geometry\n\
p  toggle particle mode\n\
b  toggle breathing\n\
a  toggle audio reactivity\n\
mouse  move to steer, click for a ripple, wheel to scroll\n\
s  save the current look as a custom preset\n\
i  show/hide HUD\n\
? or h or F1  toggle this help\n\
q or esc  quit"
}
