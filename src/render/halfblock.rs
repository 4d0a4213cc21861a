use crate::render::{text_frame_begin, text_frame_end, write_bg_rgb, write_fg_rgb, Frame, Renderer};
use std::io::Write;

const UPPER_HALF: &str = "\u{2580}";

/// Two vertically stacked pixels per cell: top as foreground, bottom as background.
#[derive(Default)]
pub struct HalfBlockRenderer {
    last_fg: Option<[u8; 3]>,
    last_bg: Option<[u8; 3]>,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn rgb_at(rgba: &[u8], i: usize) -> [u8; 3] {
    [rgba[i], rgba[i + 1], rgba[i + 2]]
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "half-block"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (1, 2)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, visual_rows, w, _h)) = text_frame_begin(frame, 1, 2, out)? else {
            return Ok(());
        };
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..visual_rows {
            let top = row * 2 * w;
            let bottom = top + w;
            for x in 0..cols {
                let fg = rgb_at(frame.pixels_rgba, (top + x) * 4);
                let bg = rgb_at(frame.pixels_rgba, (bottom + x) * 4);
                if self.last_fg != Some(fg) {
                    write_fg_rgb(out, fg[0], fg[1], fg[2])?;
                    self.last_fg = Some(fg);
                }
                if self.last_bg != Some(bg) {
                    write_bg_rgb(out, bg[0], bg[1], bg[2])?;
                    self.last_bg = Some(bg);
                }
                out.write_all(UPPER_HALF.as_bytes())?;
            }
            out.write_all(b"\r\n")?;
        }

        text_frame_end(frame, cols, visual_rows, out)
    }
}
