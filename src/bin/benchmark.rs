use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use holo_field::audio::{AtomicAudioSnapshot, BandSmoother};
use holo_field::driver::FrameDriver;
use holo_field::theme::make_presets;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Serial,
    Parallel,
    Both,
}

struct Args {
    mode: Mode,
    frames: usize,
    w: usize,
    h: usize,
    audio: bool,
    ci_smoke: bool,
    max_ms: f64,
}

fn parse_args() -> Args {
    let mut args = Args {
        mode: Mode::Both,
        frames: 120,
        w: 160,
        h: 88,
        audio: true,
        ci_smoke: false,
        max_ms: 40.0,
    };

    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < argv.len() {
        let k = argv[i].as_str();
        let v = argv.get(i + 1).map(|s| s.as_str());
        match (k, v) {
            ("--mode", Some("serial")) => {
                args.mode = Mode::Serial;
                i += 2;
            }
            ("--mode", Some("parallel")) => {
                args.mode = Mode::Parallel;
                i += 2;
            }
            ("--mode", Some("both")) => {
                args.mode = Mode::Both;
                i += 2;
            }
            ("--frames", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.frames = n.max(1);
                }
                i += 2;
            }
            ("--size", Some(x)) => {
                if let Some((w, h)) = x.split_once('x') {
                    if let (Ok(w), Ok(h)) = (w.parse::<usize>(), h.parse::<usize>()) {
                        args.w = w.max(1);
                        args.h = h.max(1);
                    }
                }
                i += 2;
            }
            ("--audio", Some(x)) => {
                if let Some(b) = parse_bool(x) {
                    args.audio = b;
                }
                i += 2;
            }
            ("--max-ms", Some(x)) => {
                if let Ok(ms) = x.parse::<f64>() {
                    args.max_ms = ms.max(0.1);
                }
                i += 2;
            }
            ("--ci-smoke", _) => {
                args.ci_smoke = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    args
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Deterministic band levels standing in for a live feed.
fn synth_bands(t: f32) -> [f32; 3] {
    [
        (t * 1.9).sin() * 0.5 + 0.5,
        (t * 2.8 + 0.7).sin() * 0.5 + 0.5,
        (t * 5.2 + 1.3).sin() * 0.5 + 0.5,
    ]
}

fn bench(args: &Args, parallel: bool) -> Result<Duration> {
    let label = if parallel { "parallel" } else { "serial" };
    let mut total = Duration::ZERO;
    let mut total_frames = 0usize;
    let mut slow = Vec::<(String, f64)>::new();

    println!(
        "{label} benchmark: themes={} frames/theme={} size={}x{} audio={}",
        make_presets().len(),
        args.frames,
        args.w,
        args.h,
        args.audio
    );

    for (idx, preset) in make_presets().into_iter().enumerate() {
        let mut theme = preset.theme;
        theme.interaction.audio_reactive = args.audio;

        let cell = Arc::new(AtomicAudioSnapshot::new());
        let mut smoother = BandSmoother::new();
        let mut driver = FrameDriver::new(args.w, args.h)?
            .with_parallel(parallel)
            .with_audio(Arc::clone(&cell));

        let mut lit = 0usize;
        let start = Instant::now();
        for f in 0..args.frames {
            let now_ms = f as f64 * 1000.0 / 60.0;
            let [bass, mid, high] = synth_bands(now_ms as f32 * 0.001);
            cell.store(smoother.push(bass, mid, high));
            let surface = driver.frame(now_ms, &theme);
            if surface.rgba().chunks_exact(4).any(|px| px[0] | px[1] | px[2] != 0) {
                lit += 1;
            }
        }
        let elapsed = start.elapsed();
        total += elapsed;
        total_frames += args.frames;

        let ms = elapsed.as_secs_f64() * 1000.0 / args.frames as f64;
        println!("{:>2}. {:<16} {:>8.3} ms/frame  lit={:>3}/{}", idx, preset.name, ms, lit, args.frames);
        if args.ci_smoke && ms > args.max_ms {
            slow.push((preset.name.to_string(), ms));
        }
    }

    let avg_ms = total.as_secs_f64() * 1000.0 / total_frames.max(1) as f64;
    let fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };
    println!("{label} summary: {:>8.3} ms/frame avg  {:>7.2} FPS", avg_ms, fps);

    if args.ci_smoke {
        if !slow.is_empty() {
            eprintln!("CI smoke: FAIL");
            for (name, ms) in slow {
                eprintln!("  slow theme: {} ({:.3} ms/frame > {:.3})", name, ms, args.max_ms);
            }
            anyhow::bail!("ci smoke failed");
        }
        println!("CI smoke: PASS (max_ms={:.3})", args.max_ms);
    }
    Ok(total)
}

fn main() -> Result<()> {
    let args = parse_args();
    match args.mode {
        Mode::Serial => bench(&args, false).map(|_| ()),
        Mode::Parallel => bench(&args, true).map(|_| ()),
        Mode::Both => {
            let serial = bench(&args, false)?;
            let parallel = bench(&args, true)?;
            let speedup = serial.as_secs_f64() / parallel.as_secs_f64().max(1e-9);
            println!("speedup: {speedup:.2}x on {} threads", rayon::current_num_threads());
            Ok(())
        }
    }
}
