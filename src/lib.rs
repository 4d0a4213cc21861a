pub mod app;
pub mod audio;
pub mod config;
pub mod driver;
pub mod input;
pub mod render;
pub mod state;
pub mod terminal;
pub mod theme;
pub mod visual;

pub use audio::{AtomicAudioSnapshot, AudioSnapshot};
pub use driver::{DriverError, DriverPhase, FrameDriver, FrameSnapshot, Surface};
pub use input::{input_channel, InputEvent, InputQueue, InputSender};
pub use state::FrameState;
pub use theme::{Theme, ThemeDocument, ThemeError};
pub use visual::{FrameProgram, Geometry, Uniforms};
