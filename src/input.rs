//! Interaction events and the per-frame coalescing queue.
//!
//! Event sources (terminal, tests, embedders) push from any thread; the frame
//! driver drains once per tick. Only the latest pointer, click and gyro
//! reading survive a drain, scroll deltas accumulate.

use glam::{Vec2, Vec3};
use std::sync::mpsc;

/// Pointer speed (pixels per event) that saturates movement intensity.
const MOVE_SATURATION_PX: f32 = 50.0;
/// Wheel pixels to scroll offset units.
const SCROLL_SCALE: f32 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Normalized position (origin bottom-left) with movement intensity in [0, 1].
    PointerMove { position: Vec2, intensity: f32 },
    /// Same as `PointerMove`, scaled by touch sensitivity when applied.
    TouchMove { position: Vec2, intensity: f32 },
    Click { position: Vec2 },
    Scroll { delta: f32 },
    Gyro { tilt: Vec3 },
}

impl InputEvent {
    /// Pointer event from pixel coordinates (origin top-left) and the
    /// movement since the previous event.
    pub fn pointer_from_pixels(x: f32, y: f32, size: Vec2, movement: Vec2) -> Self {
        Self::PointerMove {
            position: normalize_pixels(x, y, size),
            intensity: movement_intensity(movement),
        }
    }

    pub fn touch_from_pixels(x: f32, y: f32, size: Vec2, movement: Vec2) -> Self {
        Self::TouchMove {
            position: normalize_pixels(x, y, size),
            intensity: movement_intensity(movement),
        }
    }

    pub fn click_from_pixels(x: f32, y: f32, size: Vec2) -> Self {
        Self::Click {
            position: normalize_pixels(x, y, size),
        }
    }

    pub fn wheel(delta_px: f32) -> Self {
        Self::Scroll {
            delta: delta_px * SCROLL_SCALE,
        }
    }

    /// Device orientation in degrees: beta (front-back), gamma (left-right),
    /// alpha (compass).
    pub fn orientation(beta: f32, gamma: f32, alpha: f32) -> Self {
        Self::Gyro {
            tilt: Vec3::new(beta / 180.0, gamma / 180.0, alpha / 360.0),
        }
    }
}

fn normalize_pixels(x: f32, y: f32, size: Vec2) -> Vec2 {
    let w = size.x.max(1.0);
    let h = size.y.max(1.0);
    Vec2::new((x / w).clamp(0.0, 1.0), (1.0 - y / h).clamp(0.0, 1.0))
}

fn movement_intensity(movement: Vec2) -> f32 {
    (movement.length() / MOVE_SATURATION_PX).min(1.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    pub intensity: f32,
    pub touch: bool,
}

/// Everything that arrived since the previous drain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PendingInput {
    pub pointer: Option<PointerSample>,
    pub click: Option<Vec2>,
    pub scroll: f32,
    pub gyro: Option<Vec3>,
}

impl PendingInput {
    pub fn is_empty(&self) -> bool {
        self.pointer.is_none() && self.click.is_none() && self.scroll == 0.0 && self.gyro.is_none()
    }

    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove {
                position,
                intensity,
            } => {
                self.pointer = Some(PointerSample {
                    position,
                    intensity,
                    touch: false,
                })
            }
            InputEvent::TouchMove {
                position,
                intensity,
            } => {
                self.pointer = Some(PointerSample {
                    position,
                    intensity,
                    touch: true,
                })
            }
            InputEvent::Click { position } => self.click = Some(position),
            InputEvent::Scroll { delta } => self.scroll += delta,
            InputEvent::Gyro { tilt } => self.gyro = Some(tilt),
        }
    }
}

#[derive(Clone, Debug)]
pub struct InputSender {
    tx: mpsc::Sender<InputEvent>,
}

impl InputSender {
    /// Returns false once the queue has been dropped.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[derive(Debug)]
pub struct InputQueue {
    rx: mpsc::Receiver<InputEvent>,
}

impl InputQueue {
    pub fn drain(&self) -> PendingInput {
        let mut pending = PendingInput::default();
        for event in self.rx.try_iter() {
            pending.push(event);
        }
        pending
    }
}

pub fn input_channel() -> (InputSender, InputQueue) {
    let (tx, rx) = mpsc::channel();
    (InputSender { tx }, InputQueue { rx })
}
