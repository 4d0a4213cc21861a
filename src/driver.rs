//! Frame orchestration: one state update per tick, then a read-only parallel
//! pixel pass into an RGBA8 surface.

use crate::audio::{AtomicAudioSnapshot, AudioSnapshot};
use crate::input::InputQueue;
use crate::state::FrameState;
use crate::theme::Theme;
use crate::visual::FrameProgram;
use glam::{Vec2, Vec3};
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

/// Frames per FPS estimate.
pub const FPS_WINDOW: u32 = 60;
const ROWS_PER_BAND: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverPhase {
    Idle,
    Running,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverError {
    SurfaceUnavailable { width: usize, height: usize },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceUnavailable { width, height } => {
                write!(f, "surface unavailable ({width}x{height})")
            }
        }
    }
}

impl std::error::Error for DriverError {}

/// Row-major RGBA8 pixels, alpha always 255.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Result<Self, DriverError> {
        if width == 0 || height == 0 {
            return Err(DriverError::SurfaceUnavailable { width, height });
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(DriverError::SurfaceUnavailable { width, height })?;
        Ok(Self {
            width,
            height,
            rgba: vec![0; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    /// Overwrite every pixel from `program`.
    pub fn shade(&mut self, program: &FrameProgram, parallel: bool) {
        render_rgba(program, self.width, self.height, &mut self.rgba, parallel);
    }

    /// Packed RGB without alpha, e.g. for PPM output.
    pub fn to_rgb(&self) -> Vec<u8> {
        self.rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }
}

/// Immutable per-frame input to the pixel pass.
#[derive(Clone, Debug)]
pub struct FrameSnapshot {
    pub program: FrameProgram,
    pub frame_index: u64,
    pub delta_ms: f64,
}

#[derive(Clone, Copy, Debug, Default)]
struct FpsCounter {
    frames: u32,
    window_ms: f64,
    fps: Option<f32>,
}

impl FpsCounter {
    fn tick(&mut self, delta_ms: f64) {
        self.frames += 1;
        self.window_ms += delta_ms;
        if self.frames >= FPS_WINDOW {
            if self.window_ms > 0.0 {
                self.fps = Some((self.frames as f64 * 1000.0 / self.window_ms) as f32);
            }
            self.frames = 0;
            self.window_ms = 0.0;
        }
    }
}

pub struct FrameDriver {
    phase: DriverPhase,
    state: FrameState,
    surface: Surface,
    input: Option<InputQueue>,
    audio: Option<Arc<AtomicAudioSnapshot>>,
    start_ms: f64,
    last_ms: f64,
    frame_index: u64,
    fps: FpsCounter,
    parallel: bool,
}

impl FrameDriver {
    pub fn new(width: usize, height: usize) -> Result<Self, DriverError> {
        Ok(Self {
            phase: DriverPhase::Idle,
            state: FrameState::default(),
            surface: Surface::new(width, height)?,
            input: None,
            audio: None,
            start_ms: 0.0,
            last_ms: 0.0,
            frame_index: 0,
            fps: FpsCounter::default(),
            parallel: true,
        })
    }

    pub fn with_input(mut self, queue: InputQueue) -> Self {
        self.input = Some(queue);
        self
    }

    pub fn with_audio(mut self, snapshot: Arc<AtomicAudioSnapshot>) -> Self {
        self.audio = Some(snapshot);
        self
    }

    /// Single-threaded pixel pass; output is identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Latest estimate, available after the first full window.
    pub fn fps(&self) -> Option<f32> {
        self.fps.fps
    }

    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), DriverError> {
        if width != self.surface.width || height != self.surface.height {
            self.surface = Surface::new(width, height)?;
            log::debug!("surface resized to {width}x{height}");
        }
        Ok(())
    }

    /// Advance interaction state to `now_ms` and freeze the frame's inputs.
    pub fn tick(&mut self, now_ms: f64, theme: &Theme) -> FrameSnapshot {
        if self.phase == DriverPhase::Idle {
            self.phase = DriverPhase::Running;
            self.start_ms = now_ms;
            self.last_ms = now_ms;
            log::debug!(
                "frame driver running at {}x{}",
                self.surface.width,
                self.surface.height
            );
        }
        let delta_ms = (now_ms - self.last_ms).max(0.0);
        self.last_ms = now_ms;
        self.state.elapsed_ms = (now_ms - self.start_ms).max(0.0);

        if let Some(queue) = &self.input {
            let pending = queue.drain();
            self.state.apply(&pending, &theme.interaction);
        }
        self.state.decay_click();
        self.state.decay();

        let audio = match (&self.audio, theme.interaction.audio_reactive) {
            (Some(cell), true) => cell.load().scaled(&theme.interaction),
            _ => AudioSnapshot::default(),
        };

        let program = FrameProgram::new(theme, self.state.uniforms(self.surface.size(), audio));
        self.fps.tick(delta_ms);
        let snapshot = FrameSnapshot {
            program,
            frame_index: self.frame_index,
            delta_ms,
        };
        self.frame_index += 1;
        snapshot
    }

    pub fn render(&mut self, snapshot: &FrameSnapshot) -> &Surface {
        self.surface.shade(&snapshot.program, self.parallel);
        &self.surface
    }

    /// `tick` followed by `render`.
    pub fn frame(&mut self, now_ms: f64, theme: &Theme) -> &Surface {
        let snapshot = self.tick(now_ms, theme);
        self.render(&snapshot)
    }
}

/// Normalized coordinate of a pixel center, origin bottom-left.
pub fn pixel_uv(x: usize, y: usize, width: usize, height: usize) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / width as f32,
        1.0 - (y as f32 + 0.5) / height as f32,
    )
}

pub fn tone_map(c: Vec3) -> [u8; 4] {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    [q(c.x), q(c.y), q(c.z), 255]
}

/// Shade every pixel of a `width x height` RGBA8 buffer.
pub fn render_rgba(program: &FrameProgram, width: usize, height: usize, out: &mut [u8], parallel: bool) {
    let row_bytes = width * 4;
    if row_bytes == 0 || out.len() < row_bytes * height {
        return;
    }
    let out = &mut out[..row_bytes * height];
    let band_bytes = row_bytes * ROWS_PER_BAND;

    let shade_band = |(band, chunk): (usize, &mut [u8])| {
        let y0 = band * ROWS_PER_BAND;
        for (dy, row) in chunk.chunks_exact_mut(row_bytes).enumerate() {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let color = program.shade(pixel_uv(x, y0 + dy, width, height));
                px.copy_from_slice(&tone_map(color));
            }
        }
    };

    if parallel {
        out.par_chunks_mut(band_bytes).enumerate().for_each(shade_band);
    } else {
        out.chunks_mut(band_bytes).enumerate().for_each(shade_band);
    }
}

/// Unclamped colors at arbitrary normalized points, in input order.
pub fn sample_points(program: &FrameProgram, points: &[Vec2]) -> Vec<Vec3> {
    points.par_iter().map(|&uv| program.shade(uv)).collect()
}
