//! Terminal presenters for an RGBA8 surface.

mod ascii;
mod halfblock;

pub use ascii::AsciiRenderer;
pub use halfblock::HalfBlockRenderer;

use std::io::Write;

/// One presentable frame: a pixel surface sized for the presenter's cell
/// geometry plus HUD text for the rows below it.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    /// Rows used by the visual; the HUD occupies the rest.
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    /// Pixels per cell horizontally and vertically.
    fn cell_pixels(&self) -> (usize, usize);
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

/// Rec. 601 luma.
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

pub fn write_fg_rgb(out: &mut dyn Write, r: u8, g: u8, b: u8) -> anyhow::Result<()> {
    write!(out, "\x1b[38;2;{r};{g};{b}m")?;
    Ok(())
}

pub fn write_bg_rgb(out: &mut dyn Write, r: u8, g: u8, b: u8) -> anyhow::Result<()> {
    write!(out, "\x1b[48;2;{r};{g};{b}m")?;
    Ok(())
}

/// Validate the frame against the presenter's cell geometry and emit the
/// frame preamble. Returns `(cols, visual_rows, pixel_width, pixel_height)`,
/// or `None` when there is nothing safe to draw.
pub fn text_frame_begin(
    frame: &Frame<'_>,
    cell_w: usize,
    cell_h: usize,
    out: &mut dyn Write,
) -> anyhow::Result<Option<(usize, usize, usize, usize)>> {
    let cols = frame.term_cols as usize;
    let visual_rows = frame.visual_rows as usize;
    let w = frame.pixel_width;
    let h = frame.pixel_height;

    if cols == 0 || visual_rows == 0 || w == 0 || h == 0 {
        return Ok(None);
    }
    if w != cols * cell_w || h != visual_rows * cell_h {
        return Ok(None);
    }
    if frame.pixels_rgba.len() < w * h * 4 {
        return Ok(None);
    }

    if frame.sync_updates {
        out.write_all(b"\x1b[?2026h")?;
    }
    // Home, reset, autowrap off while painting full-width rows.
    out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
    Ok(Some((cols, visual_rows, w, h)))
}

/// HUD rows, optional overlay, then restore autowrap and flush.
pub fn text_frame_end(
    frame: &Frame<'_>,
    cols: usize,
    visual_rows: usize,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut hud_lines = frame.hud.lines();
    for i in 0..(frame.hud_rows as usize) {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", visual_rows + i + 1)?;
        if let Some(line) = hud_lines.next() {
            let clipped: String = line.chars().take(cols).collect();
            out.write_all(clipped.as_bytes())?;
        }
    }

    if let Some(text) = frame.overlay {
        draw_overlay(out, frame.term_cols, frame.term_rows, text)?;
    }

    out.write_all(b"\x1b[0m\x1b[?7h")?;
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()?;
    Ok(())
}

/// Centered boxed text over the visual. First line is drawn bold as a title.
pub fn draw_overlay(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if text.trim().is_empty() || cols < 8 || rows < 4 {
        return Ok(());
    }

    let inner_max = cols - 4;
    let lines: Vec<String> = text
        .lines()
        .take(rows - 2)
        .map(|l| l.chars().take(inner_max).collect())
        .collect();
    let inner_w = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
    let box_w = inner_w + 4;
    let box_h = lines.len() + 2;
    let left = (cols - box_w) / 2 + 1;
    let top = (rows.saturating_sub(box_h)) / 2 + 1;
    let rule = "-".repeat(box_w - 2);

    out.write_all(b"\x1b[0m\x1b[38;2;236;242;255m\x1b[48;2;8;10;20m")?;
    write!(out, "\x1b[{top};{left}H+{rule}+")?;
    for (i, line) in lines.iter().enumerate() {
        let pad = inner_w - line.chars().count();
        write!(out, "\x1b[{};{left}H| ", top + 1 + i)?;
        if i == 0 {
            write!(out, "\x1b[1m{line}\x1b[22m")?;
        } else {
            out.write_all(line.as_bytes())?;
        }
        write!(out, "{} |", " ".repeat(pad))?;
    }
    write!(out, "\x1b[{};{left}H+{rule}+", top + box_h - 1)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}
