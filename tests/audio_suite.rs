use holo_field::audio::{
    parse_wav_mono_f32, AtomicAudioSnapshot, AudioSnapshot, BandAnalyzer, BandSmoother, WavFeed,
    FFT_SIZE,
};
use holo_field::theme::InteractionParams;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn sine_at_bin(bin: usize, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / FFT_SIZE as f32).sin())
        .collect()
}

fn wav_bytes(format: u16, channels: u16, bits: u16, sample_rate: u32, data: &[u8]) -> Vec<u8> {
    let block_align = channels * bits / 8;
    let mut v = Vec::new();
    v.extend_from_slice(b"RIFF");
    v.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    v.extend_from_slice(b"WAVE");
    v.extend_from_slice(b"fmt ");
    v.extend_from_slice(&16u32.to_le_bytes());
    v.extend_from_slice(&format.to_le_bytes());
    v.extend_from_slice(&channels.to_le_bytes());
    v.extend_from_slice(&sample_rate.to_le_bytes());
    v.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    v.extend_from_slice(&block_align.to_le_bytes());
    v.extend_from_slice(&bits.to_le_bytes());
    v.extend_from_slice(b"data");
    v.extend_from_slice(&(data.len() as u32).to_le_bytes());
    v.extend_from_slice(data);
    v
}

#[test]
fn smoother_keeps_seventy_percent() {
    let mut s = BandSmoother::new();
    let first = s.push(1.0, 0.0, 0.0);
    assert!((first.bass - 0.3).abs() < 1e-6);
    assert!((first.energy - 0.1).abs() < 1e-6);
    let second = s.push(1.0, 0.0, 0.0);
    assert!((second.bass - 0.51).abs() < 1e-6);

    for _ in 0..100 {
        s.push(5.0, 1.0, 1.0);
    }
    let c = s.current();
    assert!((c.bass - 1.0).abs() < 1e-4, "inputs clamp to 1");
    assert!((c.energy - (c.bass + c.mid + c.high) / 3.0).abs() < 1e-6);
}

#[test]
fn response_multipliers_scale_bands() {
    let snap = AudioSnapshot { energy: 0.5, bass: 0.5, mid: 0.5, high: 0.5 };
    let i = InteractionParams {
        bass_response: 2.0,
        mid_response: 0.0,
        high_response: 0.5,
        ..InteractionParams::default()
    };
    let s = snap.scaled(&i);
    assert_eq!(s, AudioSnapshot { energy: 1.0, bass: 1.0, mid: 0.0, high: 0.25 });
}

#[test]
fn seqlock_round_trips_and_counts() {
    let cell = AtomicAudioSnapshot::new();
    assert_eq!(cell.load(), AudioSnapshot::default());
    assert_eq!(cell.updates(), 0);
    let s = AudioSnapshot { energy: 0.1, bass: 0.2, mid: 0.3, high: 0.4 };
    cell.store(s);
    cell.store(s);
    assert_eq!(cell.load(), s);
    assert_eq!(cell.updates(), 2);
}

#[test]
fn readers_never_see_torn_snapshots() {
    let cell = Arc::new(AtomicAudioSnapshot::new());
    let writer = {
        let cell = Arc::clone(&cell);
        std::thread::spawn(move || {
            for k in 0..20_000u32 {
                let v = k as f32;
                cell.store(AudioSnapshot { energy: v, bass: v, mid: v, high: v });
            }
        })
    };
    let readers: Vec<_> = (0..3)
        .map(|_| {
            let cell = Arc::clone(&cell);
            std::thread::spawn(move || {
                for _ in 0..20_000 {
                    let s = cell.load();
                    assert!(s.energy == s.bass && s.bass == s.mid && s.mid == s.high, "torn read {s:?}");
                }
            })
        })
        .collect();
    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
}

#[test]
fn analyzer_separates_low_and_high_tones() {
    let mut a = BandAnalyzer::new();
    assert_eq!(a.band_levels(&vec![0.0; FFT_SIZE]), [0.0, 0.0, 0.0]);

    let [bass, mid, high] = a.band_levels(&sine_at_bin(3, FFT_SIZE));
    assert!(bass > 0.1, "bass {bass}");
    assert!(bass > mid && bass > high);

    let [bass, _, high] = a.band_levels(&sine_at_bin(100, FFT_SIZE));
    assert!(high > bass, "high {high} bass {bass}");

    // Short windows are padded, long ones use the tail.
    let short = a.band_levels(&sine_at_bin(3, 40));
    assert!(short.iter().all(|v| (0.0..=1.0).contains(v)));
    let long = a.band_levels(&sine_at_bin(3, FFT_SIZE * 3));
    assert!(long[0] > long[2]);
}

#[test]
fn analyze_smooths_successive_windows() {
    let mut a = BandAnalyzer::new();
    let window = sine_at_bin(3, FFT_SIZE);
    let first = a.analyze(&window);
    let second = a.analyze(&window);
    assert!(second.bass > first.bass);
    assert!(second.bass <= 1.0);
}

#[test]
fn wav_pcm16_stereo_downmixes() {
    let frames: [[i16; 2]; 3] = [[16384, 16384], [-32768, 0], [0, 32767]];
    let data: Vec<u8> = frames
        .iter()
        .flat_map(|f| f.iter().flat_map(|s| s.to_le_bytes()))
        .collect();
    let (sr, samples) = parse_wav_mono_f32(&wav_bytes(1, 2, 16, 22_050, &data)).unwrap();
    assert_eq!(sr, 22_050);
    assert_eq!(samples.len(), 3);
    assert!((samples[0] - 0.5).abs() < 1e-6);
    assert!((samples[1] + 0.5).abs() < 1e-6);
    assert!((samples[2] - 0.5).abs() < 1e-4);
}

#[test]
fn wav_float32_mono_and_rejections() {
    let data: Vec<u8> = [0.25f32, -0.75].iter().flat_map(|s| s.to_le_bytes()).collect();
    let (sr, samples) = parse_wav_mono_f32(&wav_bytes(3, 1, 32, 48_000, &data)).unwrap();
    assert_eq!(sr, 48_000);
    assert_eq!(samples, vec![0.25, -0.75]);

    assert!(parse_wav_mono_f32(b"too short").is_err());
    let mut not_riff = wav_bytes(1, 1, 16, 8000, &[0, 0]);
    not_riff[0..4].copy_from_slice(b"RIFX");
    assert!(parse_wav_mono_f32(&not_riff).is_err());
    let err = parse_wav_mono_f32(&wav_bytes(1, 1, 8, 8000, &[0, 0])).unwrap_err();
    assert!(err.to_string().contains("unsupported"));
}

#[test]
fn wav_feed_publishes_until_dropped() {
    let samples = sine_at_bin(3, FFT_SIZE * 8);
    let feed = WavFeed::from_samples(44_100, samples);
    let cell = feed.snapshot();
    let deadline = Instant::now() + Duration::from_secs(2);
    while cell.updates() == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(cell.updates() > 0, "feed never published");
    drop(feed);
    let after = cell.updates();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(cell.updates(), after, "feed kept running after drop");
}
