use glam::{Vec2, Vec3};
use holo_field::audio::AudioSnapshot;
use holo_field::theme::{Theme, MIN_DENSITY};
use holo_field::visual::fields::{particle, wave};
use holo_field::visual::{hsl_to_rgb, transform, FrameProgram, Geometry, Uniforms};

fn uniforms(time_ms: f32) -> Uniforms {
    Uniforms {
        resolution: Vec2::new(160.0, 90.0),
        time_ms,
        ..Uniforms::default()
    }
}

fn grid() -> Vec<Vec2> {
    let mut v = Vec::new();
    for y in 0..9 {
        for x in 0..9 {
            v.push(Vec2::new(x as f32 / 8.0, y as f32 / 8.0));
        }
    }
    v
}

fn approx3(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a - b).abs().max_element() <= eps
}

#[test]
fn zero_blend_ignores_any_secondary() {
    let base = Theme::default();
    let plain = FrameProgram::new(&base, uniforms(2500.0));
    for secondary in Geometry::all() {
        let mut t = base.clone();
        t.geometry.secondary = Some(secondary);
        t.geometry.blend_amount = 0.0;
        let blended = FrameProgram::new(&t, uniforms(2500.0));
        for uv in grid() {
            assert_eq!(plain.sample(uv), blended.sample(uv), "{secondary:?} at {uv:?}");
        }
    }
}

#[test]
fn positive_blend_mixes_in_the_secondary() {
    let mut t = Theme::default();
    t.geometry.primary = Geometry::Sphere;
    t.geometry.secondary = Some(Geometry::Hypercube);
    t.geometry.blend_amount = 100.0;
    let full = FrameProgram::new(&t, uniforms(1000.0));

    let mut only_secondary = t.clone();
    only_secondary.geometry.secondary = None;
    only_secondary.geometry.primary = Geometry::Hypercube;
    only_secondary.geometry.density *= 0.8;
    let reference = FrameProgram::new(&only_secondary, uniforms(1000.0));

    for uv in grid() {
        let p = transform(&full.transform_inputs(full.screen_position(uv)));
        let a = full.geometry_field(p);
        let b = reference.geometry_field(p);
        assert!((a - b).abs() < 1e-6, "blend 100 should be the secondary at 0.8x density");
    }
}

#[test]
fn blend_without_secondary_is_plain_primary() {
    let mut t = Theme::default();
    t.geometry.blend_amount = 60.0;
    let a = FrameProgram::new(&t, uniforms(800.0));
    let b = FrameProgram::new(&Theme::default(), uniforms(800.0));
    for uv in grid() {
        assert_eq!(a.field_at(uv), b.field_at(uv));
    }
}

#[test]
fn calm_wave_theme_is_just_the_wave_formula() {
    let mut t = Theme::default();
    t.geometry.primary = Geometry::Wave;
    t.geometry.secondary = None;
    t.geometry.blend_amount = 0.0;
    t.geometry.density = 1.4;
    t.geometry.complexity = 3;
    t.geometry.chaos = 0.0;
    t.animation.pulse = 0.0;
    let time_ms = 4321.0;
    let prog = FrameProgram::new(&t, uniforms(time_ms));

    for uv in grid() {
        let p = transform(&prog.transform_inputs(prog.screen_position(uv)));
        let expected = wave(p, 1.4, time_ms, t.animation.base_speed, t.animation.wave_amplitude);
        assert_eq!(prog.field_at(uv), expected);
    }
}

#[test]
fn pulse_scales_the_field() {
    let mut t = Theme::default();
    t.geometry.chaos = 0.0;
    t.animation.pulse = 1.0;
    let prog = FrameProgram::new(&t, uniforms(3000.0));
    let k = (prog.time() * 5.0).sin() * 0.2 + 1.0;
    for uv in grid() {
        let p = transform(&prog.transform_inputs(prog.screen_position(uv)));
        let raw = prog.geometry_field(p);
        assert!((prog.field_at(uv) - raw * k).abs() < 1e-6);
    }
}

#[test]
fn zero_field_keeps_only_glow_ripple_and_audio() {
    let t = Theme::default();
    let prog = FrameProgram::new(&t, uniforms(0.0));
    let screen = Vec2::new(0.3, -0.2);
    let s = prog.colorize(0.0, screen);

    let expected_color1 = hsl_to_rgb(200.0 / 360.0, 0.8, 0.7);
    let expected_color2 = hsl_to_rgb(260.0 / 360.0, 0.8 * 0.8, 0.7 * 0.9);
    assert!(approx3(s.color1, expected_color1, 1e-6));
    assert!(approx3(s.color2, expected_color2, 1e-6));

    let glow = (-screen.length() * 2.0).exp() * 0.5 * 0.5;
    assert!(approx3(s.color, expected_color1 * glow, 1e-6), "{:?}", s.color);

    let mut dark = t.clone();
    dark.colors.glow = 0.0;
    let prog = FrameProgram::new(&dark, uniforms(0.0));
    assert_eq!(prog.colorize(0.0, screen).color, Vec3::ZERO);
}

#[test]
fn audio_tints_channels() {
    let mut t = Theme::default();
    t.colors.glow = 0.0;
    let u = Uniforms {
        audio: AudioSnapshot {
            energy: 0.5,
            bass: 0.5,
            mid: 0.25,
            high: 1.0,
        },
        ..uniforms(0.0)
    };
    let prog = FrameProgram::new(&t, u);
    let c = prog.colorize(0.0, Vec2::ZERO).color;
    assert!(approx3(c, Vec3::new(0.2, 0.05, 0.1), 1e-6), "{c:?}");
}

#[test]
fn click_ripple_needs_an_active_click() {
    let prog = FrameProgram::new(&Theme::default(), uniforms(500.0));
    assert_eq!(prog.click_ripple(Vec2::new(0.1, 0.1)), 0.0);

    let u = Uniforms {
        click_position: Vec2::new(0.5, 0.5),
        click_intensity: 1.0,
        ..uniforms(500.0)
    };
    let prog = FrameProgram::new(&Theme::default(), u);
    let far = prog.click_ripple(Vec2::new(3.5, 0.5)).abs();
    assert!(far <= (-6.0f32).exp() + 1e-6);
}

#[test]
fn click_ripple_is_centered_on_the_raw_click_position() {
    let u = Uniforms {
        click_position: Vec2::new(0.75, 0.5),
        click_intensity: 0.8,
        ..uniforms(120.0)
    };
    let prog = FrameProgram::new(&Theme::default(), u);

    let screen = Vec2::new(0.3, 0.1);
    let r = (screen - Vec2::new(0.75, 0.5)).length();
    let expected = (r * 10.0 - 1.2).sin() * 0.8 * (-r * 2.0).exp();
    let got = prog.click_ripple(screen);
    assert!((got - expected).abs() < 1e-5, "got {got}, expected {expected}");

    // At the click itself only the time phase remains.
    let center = prog.click_ripple(Vec2::new(0.75, 0.5));
    assert!((center - (-1.2f32).sin() * 0.8).abs() < 1e-5, "{center}");

    let t0 = FrameProgram::new(&Theme::default(), Uniforms { time_ms: 0.0, ..u });
    assert!((t0.click_ripple(Vec2::new(0.3, 0.1)) - (-0.0778 * 0.8)).abs() < 1e-3);
}

#[test]
fn pointer_offset_follows_reactivity_and_intensity() {
    let u = Uniforms {
        pointer: Vec2::new(1.0, 0.0),
        pointer_intensity: 0.5,
        ..uniforms(0.0)
    };
    let prog = FrameProgram::new(&Theme::default(), u);
    assert!(prog.pointer_offset().abs_diff_eq(Vec2::new(0.2, -0.2), 1e-6));

    let centered = FrameProgram::new(&Theme::default(), uniforms(0.0));
    assert_eq!(centered.pointer_offset(), Vec2::ZERO);
}

#[test]
fn auto_rotate_off_freezes_rotation_rates() {
    let mut t = Theme::default();
    t.animation.auto_rotate = false;
    let prog = FrameProgram::new(&t, uniforms(9000.0));
    assert_eq!(prog.transform_inputs(Vec2::ZERO).rotation, Vec3::ZERO);
}

#[test]
fn particle_mode_overrides_primary() {
    let mut t = Theme::default();
    t.animation.particle_mode = true;
    let prog = FrameProgram::new(&t, uniforms(1500.0));
    let p = Vec3::new(0.2, -0.4, 0.1);
    assert_eq!(prog.geometry_field(p), particle(p, 1.4, 1500.0, 3));
}

#[test]
fn malformed_theme_is_clamped_not_rejected() {
    let mut t = Theme::default();
    t.geometry.density = -3.0;
    t.geometry.complexity = 0;
    t.colors.saturation = 4.0;
    t.colors.primary_hue = -40.0;
    let prog = FrameProgram::new(&t, uniforms(100.0));
    let g = &prog.theme().geometry;
    assert_eq!(g.density, MIN_DENSITY);
    assert_eq!(g.complexity, 1);
    assert_eq!(prog.theme().colors.saturation, 1.0);
    assert_eq!(prog.theme().colors.primary_hue, 320.0);
    for uv in grid() {
        assert!(prog.shade(uv).is_finite());
    }
}

#[test]
fn hsl_primaries() {
    assert!(approx3(hsl_to_rgb(0.0, 1.0, 0.5), Vec3::X, 1e-6));
    assert!(approx3(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), Vec3::Y, 1e-5));
    assert!(approx3(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), Vec3::Z, 1e-5));
    assert!(approx3(hsl_to_rgb(0.37, 0.0, 0.42), Vec3::splat(0.42), 1e-6));
    // Hue wraps in turns.
    assert!(approx3(hsl_to_rgb(1.25, 0.8, 0.6), hsl_to_rgb(0.25, 0.8, 0.6), 1e-5));
}

#[test]
fn sampling_is_pure() {
    let prog = FrameProgram::new(&Theme::default(), uniforms(7777.0));
    for uv in grid() {
        assert_eq!(prog.sample(uv), prog.sample(uv));
        assert_eq!(prog.sample(uv).color, prog.shade(uv));
        assert_eq!(prog.sample(uv).field, prog.field_at(uv));
    }
}
