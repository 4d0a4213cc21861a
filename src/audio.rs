use crate::theme::InteractionParams;
use anyhow::{bail, Context};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Analyzer FFT size; yields 128 magnitude bins.
pub const FFT_SIZE: usize = 256;
/// Weight kept from the previous smoothed value on every update.
pub const BAND_SMOOTHING: f32 = 0.7;

const BASS_SPLIT: f32 = 0.1;
const MID_SPLIT: f32 = 0.4;
// Decibel window mapped onto [0, 1], as a browser analyser's byte data does.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;
const FEED_INTERVAL: Duration = Duration::from_millis(16);

/// Latest smoothed band energies, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioSnapshot {
    pub energy: f32,
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
}

impl AudioSnapshot {
    /// Bands as the compositor consumes them: energy rides the bass response.
    pub fn scaled(&self, interaction: &InteractionParams) -> Self {
        Self {
            energy: self.energy * interaction.bass_response,
            bass: self.bass * interaction.bass_response,
            mid: self.mid * interaction.mid_response,
            high: self.high * interaction.high_response,
        }
    }
}

/// Exponential smoothing of raw band levels into snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct BandSmoother {
    state: AudioSnapshot,
}

impl BandSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bass: f32, mid: f32, high: f32) -> AudioSnapshot {
        let s = &mut self.state;
        s.bass = s.bass * BAND_SMOOTHING + bass.clamp(0.0, 1.0) * (1.0 - BAND_SMOOTHING);
        s.mid = s.mid * BAND_SMOOTHING + mid.clamp(0.0, 1.0) * (1.0 - BAND_SMOOTHING);
        s.high = s.high * BAND_SMOOTHING + high.clamp(0.0, 1.0) * (1.0 - BAND_SMOOTHING);
        s.energy = (s.bass + s.mid + s.high) / 3.0;
        *s
    }

    pub fn current(&self) -> AudioSnapshot {
        self.state
    }
}

/// Seqlock cell: one producer thread stores, any number of readers load.
pub struct AtomicAudioSnapshot {
    seq: AtomicU64,
    energy: AtomicU32,
    bass: AtomicU32,
    mid: AtomicU32,
    high: AtomicU32,
}

impl Default for AtomicAudioSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicAudioSnapshot {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            energy: AtomicU32::new(0),
            bass: AtomicU32::new(0),
            mid: AtomicU32::new(0),
            high: AtomicU32::new(0),
        }
    }

    pub fn store(&self, s: AudioSnapshot) {
        self.seq.fetch_add(1, Ordering::Release); // odd => write in progress
        self.energy.store(s.energy.to_bits(), Ordering::Relaxed);
        self.bass.store(s.bass.to_bits(), Ordering::Relaxed);
        self.mid.store(s.mid.to_bits(), Ordering::Relaxed);
        self.high.store(s.high.to_bits(), Ordering::Relaxed);
        self.seq.fetch_add(1, Ordering::Release); // even => stable
    }

    pub fn load(&self) -> AudioSnapshot {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                std::hint::spin_loop();
                continue;
            }
            let snapshot = AudioSnapshot {
                energy: f32::from_bits(self.energy.load(Ordering::Relaxed)),
                bass: f32::from_bits(self.bass.load(Ordering::Relaxed)),
                mid: f32::from_bits(self.mid.load(Ordering::Relaxed)),
                high: f32::from_bits(self.high.load(Ordering::Relaxed)),
            };
            if self.seq.load(Ordering::Acquire) == v1 {
                return snapshot;
            }
        }
    }

    /// Number of completed stores.
    pub fn updates(&self) -> u64 {
        self.seq.load(Ordering::Acquire) / 2
    }
}

/// Splits a PCM window into bass/mid/high levels and smooths them.
pub struct BandAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    hann: Vec<f32>,
    buf: Vec<Complex<f32>>,
    smoother: BandSmoother,
}

impl Default for BandAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BandAnalyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let hann = (0..FFT_SIZE)
            .map(|i| 0.5 - 0.5 * ((2.0 * std::f32::consts::PI * i as f32) / FFT_SIZE as f32).cos())
            .collect();
        Self {
            fft,
            hann,
            buf: vec![Complex { re: 0.0, im: 0.0 }; FFT_SIZE],
            smoother: BandSmoother::new(),
        }
    }

    /// Raw (unsmoothed) band levels for the most recent `FFT_SIZE` samples.
    /// Shorter windows are zero-padded at the front.
    pub fn band_levels(&mut self, window: &[f32]) -> [f32; 3] {
        let start = window.len().saturating_sub(FFT_SIZE);
        let window = &window[start..];
        let pad = FFT_SIZE - window.len();
        for (i, c) in self.buf.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { window[i - pad] };
            *c = Complex { re: s * self.hann[i], im: 0.0 };
        }
        self.fft.process(&mut self.buf);

        let bins = FFT_SIZE / 2;
        let bass_end = ((bins as f32 * BASS_SPLIT).floor() as usize).max(1);
        let mid_end = ((bins as f32 * MID_SPLIT).floor() as usize).max(bass_end + 1);

        let level = |c: &Complex<f32>| {
            let mag = c.norm() / FFT_SIZE as f32;
            let db = 20.0 * mag.max(1e-12).log10();
            ((db - MIN_DB) / (MAX_DB - MIN_DB)).clamp(0.0, 1.0)
        };
        let mean = |range: std::ops::Range<usize>| {
            let n = range.len().max(1) as f32;
            self.buf[range].iter().map(level).sum::<f32>() / n
        };

        [mean(0..bass_end), mean(bass_end..mid_end), mean(mid_end..bins)]
    }

    pub fn analyze(&mut self, window: &[f32]) -> AudioSnapshot {
        let [bass, mid, high] = self.band_levels(window);
        self.smoother.push(bass, mid, high)
    }
}

/// Plays a decoded WAV through the analyzer in real time, looping, and
/// publishes snapshots. Stands in for a live capture device.
pub struct WavFeed {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    snapshot: Arc<AtomicAudioSnapshot>,
}

impl WavFeed {
    pub fn start(path: &Path) -> anyhow::Result<Self> {
        let (sample_rate_hz, samples) =
            read_wav_mono_f32(path).with_context(|| format!("read wav {}", path.display()))?;
        if samples.is_empty() {
            bail!("wav had no samples");
        }
        Ok(Self::from_samples(sample_rate_hz, samples))
    }

    pub fn from_samples(sample_rate_hz: u32, samples: Vec<f32>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let snapshot = Arc::new(AtomicAudioSnapshot::new());
        let stop_for_thread = Arc::clone(&stop);
        let snapshot_for_thread = Arc::clone(&snapshot);

        log::info!(
            "audio feed: {} samples at {} Hz ({:.1}s)",
            samples.len(),
            sample_rate_hz,
            samples.len() as f32 / sample_rate_hz.max(1) as f32
        );

        let handle = thread::spawn(move || {
            feed_loop(&samples, sample_rate_hz, &stop_for_thread, &snapshot_for_thread)
        });

        Self {
            stop,
            handle: Some(handle),
            snapshot,
        }
    }

    pub fn snapshot(&self) -> Arc<AtomicAudioSnapshot> {
        Arc::clone(&self.snapshot)
    }
}

impl Drop for WavFeed {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
        log::debug!("audio feed stopped");
    }
}

fn feed_loop(samples: &[f32], sample_rate_hz: u32, stop: &AtomicBool, out: &AtomicAudioSnapshot) {
    let mut analyzer = BandAnalyzer::new();
    let start = Instant::now();
    let sr = sample_rate_hz.max(1) as f64;
    while !stop.load(Ordering::Relaxed) {
        let played = (start.elapsed().as_secs_f64() * sr) as usize;
        let end = played % samples.len() + 1;
        let begin = end.saturating_sub(FFT_SIZE);
        out.store(analyzer.analyze(&samples[begin..end]));
        thread::sleep(FEED_INTERVAL);
    }
}

/// Decode a PCM16 or Float32 RIFF/WAVE file, downmixed to mono.
pub fn read_wav_mono_f32(path: &Path) -> anyhow::Result<(u32, Vec<f32>)> {
    let bytes = std::fs::read(path)?;
    parse_wav_mono_f32(&bytes)
}

pub fn parse_wav_mono_f32(bytes: &[u8]) -> anyhow::Result<(u32, Vec<f32>)> {
    if bytes.len() < 44 {
        bail!("wav too small");
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        bail!("not a RIFF/WAVE file");
    }

    let le16 = |o: usize| u16::from_le_bytes([bytes[o], bytes[o + 1]]);
    let le32 = |o: usize| u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);

    let mut format = 0u16;
    let mut channels = 0u16;
    let mut sample_rate = 0u32;
    let mut bits = 0u16;
    let mut data: Option<&[u8]> = None;

    let mut pos = 12usize;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = le32(pos + 4) as usize;
        let start = pos + 8;
        let end = start.saturating_add(size);
        if end > bytes.len() {
            break;
        }
        if id == b"fmt " {
            if size < 16 {
                bail!("invalid fmt chunk");
            }
            format = le16(start);
            channels = le16(start + 2);
            sample_rate = le32(start + 4);
            bits = le16(start + 14);
        } else if id == b"data" {
            data = Some(&bytes[start..end]);
        }
        pos = end + (size % 2);
    }

    let data = data.context("missing data chunk")?;
    if channels == 0 {
        bail!("invalid channel count");
    }
    let ch = channels as usize;

    let out = match (format, bits) {
        (1, 16) => data
            .chunks_exact(2 * ch)
            .map(|frame| {
                let acc: f32 = frame
                    .chunks_exact(2)
                    .map(|s| i16::from_le_bytes([s[0], s[1]]) as f32 / 32768.0)
                    .sum();
                (acc / ch as f32).clamp(-1.0, 1.0)
            })
            .collect(),
        (3, 32) => data
            .chunks_exact(4 * ch)
            .map(|frame| {
                let acc: f32 = frame
                    .chunks_exact(4)
                    .map(|s| f32::from_le_bytes([s[0], s[1], s[2], s[3]]))
                    .sum();
                (acc / ch as f32).clamp(-1.0, 1.0)
            })
            .collect(),
        _ => bail!(
            "unsupported wav format: audio_format={} bits={} (supported: PCM16, Float32)",
            format,
            bits
        ),
    };
    Ok((sample_rate, out))
}
