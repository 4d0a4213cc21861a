use clap::Parser;
use glam::Vec2;
use holo_field::config::Config;
use holo_field::theme::{
    add_custom_preset, export_theme, find_preset, import_theme, load_preset_dir, make_presets,
    preset_file_name, save_preset, Theme, ThemeDocument, ThemeError, MIN_DENSITY, PALETTES,
    THEME_DOCUMENT_TYPE,
};
use holo_field::visual::{FrameProgram, Geometry, Uniforms};

fn uniforms(time_ms: f32) -> Uniforms {
    Uniforms {
        resolution: Vec2::new(64.0, 36.0),
        time_ms,
        pointer: Vec2::new(0.7, 0.3),
        pointer_intensity: 0.6,
        click_position: Vec2::new(0.4, 0.6),
        click_intensity: 0.5,
        scroll_offset: 0.2,
        ..Uniforms::default()
    }
}

fn assert_same_pixels(a: &Theme, b: &Theme) {
    for time_ms in [0.0, 1500.0, 33_333.0] {
        let pa = FrameProgram::new(a, uniforms(time_ms));
        let pb = FrameProgram::new(b, uniforms(time_ms));
        for y in 0..7 {
            for x in 0..7 {
                let uv = Vec2::new(x as f32 / 6.0, y as f32 / 6.0);
                let (ca, cb) = (pa.shade(uv), pb.shade(uv));
                assert_eq!(ca.to_array().map(f32::to_bits), cb.to_array().map(f32::to_bits));
            }
        }
    }
}

#[test]
fn export_import_reproduces_pixels_bit_for_bit() {
    let mut themes: Vec<(String, Theme)> = make_presets()
        .into_iter()
        .map(|p| (p.name.to_string(), p.theme))
        .collect();
    let mut rng = fastrand::Rng::with_seed(2024);
    for i in 0..8 {
        let mut t = Theme::default();
        t.randomize(&mut rng);
        t.geometry.secondary = Some(Geometry::from_index(i));
        t.geometry.blend_amount = rng.f32() * 100.0;
        themes.push((format!("random {i}"), t));
    }

    for (name, theme) in themes {
        let text = export_theme(&name, &theme).unwrap();
        let back = import_theme(&text).unwrap();
        assert_eq!(back, theme.sanitized(), "{name}");
        assert_same_pixels(&theme, &back);
    }
}

#[test]
fn document_envelope_uses_the_wire_names() {
    let mut theme = Theme::default();
    theme.geometry.blend_amount = 25.0;
    let text = export_theme("Mine", &theme).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["type"], THEME_DOCUMENT_TYPE);
    assert_eq!(v["version"], "1.0");
    assert_eq!(v["name"], "Mine");
    assert!(v["timestamp"].as_u64().is_some());
    let g = &v["config"]["geometry"];
    assert_eq!(g["primary"], 6);
    assert_eq!(g["secondary"], -1);
    assert_eq!(g["blendAmount"], 25.0);
    assert_eq!(v["config"]["colors"]["primaryHue"], 200.0);
    assert_eq!(v["config"]["colors"]["mode"], "hsl");
    assert_eq!(v["config"]["animation"]["easing"], "easeInOutQuad");
    assert_eq!(v["config"]["animation"]["autoRotate"], true);
    assert_eq!(v["config"]["interaction"]["clickRipples"], true);
}

#[test]
fn import_rejects_foreign_documents() {
    let text = export_theme("x", &Theme::default())
        .unwrap()
        .replace(THEME_DOCUMENT_TYPE, "particle-preset");
    assert_eq!(
        import_theme(&text),
        Err(ThemeError::WrongType("particle-preset".to_string()))
    );
    assert!(matches!(import_theme("{ not json"), Err(ThemeError::Json(_))));
    assert!(matches!(import_theme(r#"{"config": {}}"#), Err(ThemeError::WrongType(_))));
}

#[test]
fn missing_fields_take_defaults() {
    let text = r#"{"type": "holographic-theme", "config": {"geometry": {"density": 2.0}}}"#;
    let theme = import_theme(text).unwrap();
    let mut expected = Theme::default();
    expected.geometry.density = 2.0;
    assert_eq!(theme, expected);
}

#[test]
fn out_of_range_values_are_clamped() {
    let text = r#"{
        "type": "holographic-theme",
        "config": {
            "geometry": {"primary": 12, "secondary": 3, "blendAmount": 250, "density": -1, "complexity": 0, "chaos": -2},
            "colors": {"primaryHue": 725, "secondaryHue": -90, "saturation": 3, "brightness": -0.5}
        }
    }"#;
    let t = import_theme(text).unwrap();
    assert_eq!(t.geometry.primary, Geometry::Particle);
    assert_eq!(t.geometry.secondary, Some(Geometry::Torus));
    assert_eq!(t.geometry.blend_amount, 100.0);
    assert_eq!(t.geometry.density, MIN_DENSITY);
    assert_eq!(t.geometry.complexity, 1);
    assert_eq!(t.geometry.chaos, 0.0);
    assert_eq!(t.colors.primary_hue, 5.0);
    assert_eq!(t.colors.secondary_hue, 270.0);
    assert_eq!(t.colors.saturation, 1.0);
    assert_eq!(t.colors.brightness, 0.0);
}

#[test]
fn fractional_complexity_truncates() {
    let text = r#"{"type": "holographic-theme", "config": {"geometry": {"complexity": 4.7}}}"#;
    assert_eq!(import_theme(text).unwrap().geometry.complexity, 4);
}

#[test]
fn save_and_load_round_trip() {
    let dir = std::env::temp_dir().join(format!("holo_field_theme_{}", std::process::id()));
    let path = dir.join("nested").join("ocean.json");
    let presets = make_presets();
    let doc = ThemeDocument::new("Ocean Wave", &presets[1].theme);
    doc.save(&path).unwrap();
    let loaded = ThemeDocument::load(&path).unwrap();
    assert_eq!(loaded, doc);
    assert!(!path.with_extension("tmp").exists());
    let _ = std::fs::remove_dir_all(&dir);

    assert!(matches!(
        ThemeDocument::load(&dir.join("missing.json")),
        Err(ThemeError::Io(_))
    ));
}

#[test]
fn builtin_themes_resolve_by_name_or_index() {
    let presets = make_presets();
    let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        ["Cyberpunk", "Ocean Wave", "Crystal Matrix", "Plasma Storm", "Neon Grid", "Ethereal"]
    );
    assert_eq!(find_preset("ocean", &presets), Some(1));
    assert_eq!(find_preset("  NEON ", &presets), Some(4));
    assert_eq!(find_preset("3", &presets), Some(3));
    assert_eq!(find_preset("99", &presets), None);
    assert_eq!(find_preset("mandelbrot", &presets), None);

    let neon = &presets[4].theme;
    assert_eq!(neon.geometry.secondary, Some(Geometry::Tetrahedron));
    assert_eq!(neon.geometry.blend_amount, 30.0);
    for p in &presets {
        assert_eq!(p.theme, p.theme.sanitized(), "{} should already be in range", p.name);
    }
}

#[test]
fn custom_presets_get_unique_names() {
    let mut presets = make_presets();
    let builtin = presets.len();
    let mut wild = Theme::default();
    wild.geometry.density = 0.0;

    assert_eq!(add_custom_preset(&mut presets, "", &wild), builtin);
    assert_eq!(add_custom_preset(&mut presets, "  ", &Theme::default()), builtin + 1);
    assert_eq!(add_custom_preset(&mut presets, " Night Drive ", &Theme::default()), builtin + 2);

    assert_eq!(presets[builtin].name, "Custom 1");
    assert_eq!(presets[builtin + 1].name, "Custom 2");
    assert_eq!(presets[builtin + 2].name, "Night Drive");
    assert_eq!(presets[builtin].theme.geometry.density, MIN_DENSITY);
    assert_eq!(find_preset("custom 2", &presets), Some(builtin + 1));
    assert_eq!(find_preset("night", &presets), Some(builtin + 2));
}

#[test]
fn preset_file_names_are_slugs() {
    assert_eq!(preset_file_name("Neon Grid 2"), "neon-grid-2.json");
    assert_eq!(preset_file_name("  Plasma / Storm!! "), "plasma-storm.json");
    assert_eq!(preset_file_name("***"), "preset.json");
}

#[test]
fn preset_dir_round_trip_skips_broken_files() {
    let dir = std::env::temp_dir().join(format!("holo_field_presets_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    assert!(load_preset_dir(&dir).unwrap().is_empty());

    let presets = make_presets();
    let zeta = save_preset(&dir, "Zeta Night", &presets[2].theme).unwrap();
    let aurora = save_preset(&dir, "Aurora", &presets[5].theme).unwrap();
    assert_eq!(zeta.file_name().unwrap(), "zeta-night.json");
    assert_eq!(aurora.file_name().unwrap(), "aurora.json");
    std::fs::write(dir.join("broken.json"), "{ not json").unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let loaded = load_preset_dir(&dir).unwrap();
    let names: Vec<&str> = loaded.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Aurora", "Zeta Night"]);
    assert_eq!(loaded[0].theme, presets[5].theme);
    assert_eq!(loaded[1].theme, presets[2].theme);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn saved_presets_join_the_theme_list() {
    assert!(Config::try_parse_from(["holo_field", "--save-preset", "Mine"]).is_err());

    let dir = std::env::temp_dir().join(format!("holo_field_cli_presets_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let mut mine = Theme::default();
    mine.colors.primary_hue = 42.0;
    save_preset(&dir, "Mine", &mine).unwrap();

    let dir_arg = dir.to_string_lossy().into_owned();
    let cfg = Config::try_parse_from(["holo_field", "--preset-dir", &dir_arg, "--theme", "mine"]).unwrap();
    let presets = cfg.presets().unwrap();
    assert_eq!(presets.len(), make_presets().len() + 1);
    let (name, theme) = cfg.resolve_theme(&presets).unwrap();
    assert_eq!(name, "Mine");
    assert_eq!(theme, mine);

    let cfg = Config::try_parse_from(["holo_field", "--preset-dir", &dir_arg, "--save-preset", "Next"]).unwrap();
    assert_eq!(cfg.save_preset.as_deref(), Some("Next"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn palettes_set_only_the_hue_pair() {
    assert_eq!(PALETTES.len(), 8);
    let mut t = Theme::default();
    let before = t.clone();
    let sunset = PALETTES.iter().find(|p| p.name == "Sunset").unwrap();
    t.apply_palette(sunset);
    assert_eq!(t.colors.primary_hue, 20.0);
    assert_eq!(t.colors.secondary_hue, 50.0);
    t.colors.primary_hue = before.colors.primary_hue;
    t.colors.secondary_hue = before.colors.secondary_hue;
    assert_eq!(t, before);
}

#[test]
fn randomize_is_seeded_and_in_range() {
    let mut a = Theme::default();
    let mut b = Theme::default();
    a.randomize(&mut fastrand::Rng::with_seed(11));
    b.randomize(&mut fastrand::Rng::with_seed(11));
    assert_eq!(a, b);

    let mut rng = fastrand::Rng::with_seed(12);
    for _ in 0..200 {
        let mut t = Theme::default();
        t.interaction.gyro_enabled = true;
        t.randomize(&mut rng);
        assert!(t.geometry.primary.index() < 8);
        assert!((0.5..=2.5).contains(&t.geometry.density));
        assert!((1..=6).contains(&t.geometry.complexity));
        assert!((0.0..360.0).contains(&t.colors.primary_hue));
        assert!((0.5..=1.0).contains(&t.colors.saturation));
        assert!((0.2..=1.7).contains(&t.animation.base_speed));
        assert!((-1.0..=1.0).contains(&t.animation.rotation_z));
        assert!(t.interaction.gyro_enabled, "interaction settings survive a re-roll");
        assert_eq!(t, t.sanitized());
    }
}
