//! End-to-end runs of the built-in nodes through the registry.

use std::collections::HashMap;

use comfy_nodekit::{Config, Error, NodeRegistry, Value};
use ndarray::Array4;

fn registry() -> NodeRegistry {
    NodeRegistry::with_builtin_nodes().unwrap()
}

fn inputs<const N: usize>(pairs: [(&str, Value); N]) -> HashMap<String, Value> {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn scratch_config(dir: &tempfile::TempDir) -> Config {
    Config::with_dirs(dir.path().join("output"), dir.path().join("temp"))
}

#[test]
fn builtin_nodes_are_registered() {
    let registry = registry();
    let names: Vec<_> = registry.iter().map(|d| d.name).collect();
    assert_eq!(
        names,
        [
            "ImageDimensions",
            "PresetResolution",
            "SamplerSchedulerCombo",
            "SaveImageBatch",
            "ScaleDimensions",
            "SeedGenerator",
            "XyzGridInfo",
        ]
    );

    let schema = registry.schema().unwrap();
    assert_eq!(schema["ScaleDimensions"]["inputs"][0]["max"], 8.0);
    assert_eq!(schema["SaveImageBatch"]["output_node"], true);
    assert_eq!(schema["SeedGenerator"]["inputs"][0]["max"], u64::MAX);
}

#[test]
fn scale_from_latent() {
    let latent = Array4::<f32>::zeros((1, 4, 1216 / 8, 832 / 8));
    let outputs = registry()
        .execute(
            "ScaleDimensions",
            inputs([("latent", Value::Latent(latent))]),
            &Config::default(),
        )
        .unwrap();

    assert_eq!(outputs, vec![Value::Int(1248), Value::Int(1824)]);
}

#[test]
fn scale_requires_a_source() {
    let result = registry().execute(
        "ScaleDimensions",
        inputs([("scale_factor", Value::Float(2.0))]),
        &Config::default(),
    );
    assert!(matches!(result, Err(Error::InvalidParameter { .. })));
}

#[test]
fn scale_rejects_out_of_range_factor() {
    let image = Array4::<f32>::zeros((1, 64, 64, 3));
    let result = registry().execute(
        "ScaleDimensions",
        inputs([
            ("image", Value::Image(image)),
            ("scale_factor", Value::Float(0.0)),
        ]),
        &Config::default(),
    );
    assert!(matches!(result, Err(Error::InvalidParameter { .. })));
}

#[test]
fn image_dimensions_reports_batch() {
    let image = Array4::<f32>::zeros((3, 96, 160, 3));
    let outputs = registry()
        .execute(
            "ImageDimensions",
            inputs([("image", Value::Image(image))]),
            &Config::default(),
        )
        .unwrap();
    assert_eq!(outputs, vec![Value::Int(160), Value::Int(96), Value::Int(3)]);
}

#[test]
fn preset_resolution_resolves_and_falls_back() {
    let registry = registry();
    let config = Config::default();

    let outputs = registry
        .execute(
            "PresetResolution",
            inputs([
                ("preset", Value::from("1024×1024 — 1:1 — 1.0MP — SDXL")),
                ("custom_width", Value::Int(800)),
                ("custom_height", Value::Int(600)),
            ]),
            &config,
        )
        .unwrap();
    assert_eq!(outputs[0], Value::Int(1024));
    assert_eq!(outputs[1], Value::Int(1024));
    assert_eq!(outputs[2], Value::from("1024×1024 — 1:1 — 1.0MP — SDXL"));

    let outputs = registry
        .execute(
            "PresetResolution",
            inputs([
                ("preset", Value::from("not-a-real-preset")),
                ("custom_width", Value::Int(800)),
                ("custom_height", Value::Int(600)),
                ("swap", Value::Boolean(true)),
            ]),
            &config,
        )
        .unwrap();
    assert_eq!(outputs[0], Value::Int(600));
    assert_eq!(outputs[1], Value::Int(800));
    assert_eq!(outputs[2], Value::from("Custom"));
}

#[test]
fn preset_resolution_ignores_unused_custom_sizes() {
    let registry = registry();
    let config = Config::default();

    let outputs = registry
        .execute(
            "PresetResolution",
            inputs([
                ("preset", Value::from("832×1216 — 2:3 — 1.0MP — SDXL")),
                ("custom_width", Value::Int(0)),
                ("custom_height", Value::Int(-5)),
            ]),
            &config,
        )
        .unwrap();
    assert_eq!(outputs[0], Value::Int(832));
    assert_eq!(outputs[1], Value::Int(1216));

    let outputs = registry
        .execute(
            "PresetResolution",
            inputs([
                ("preset", Value::from("Custom")),
                ("custom_width", Value::Int(10)),
                ("custom_height", Value::Int(100_000)),
            ]),
            &config,
        )
        .unwrap();
    assert_eq!(outputs[0], Value::Int(64));
    assert_eq!(outputs[1], Value::Int(8192));
}

#[test]
fn seed_generator_sanitizes() {
    let registry = registry();
    let config = Config::default();

    let outputs = registry
        .execute("SeedGenerator", inputs([("seed", Value::Int(-1))]), &config)
        .unwrap();
    assert_eq!(outputs, vec![Value::Int(0), Value::Int(0)]);

    let outputs = registry
        .execute(
            "SeedGenerator",
            inputs([
                ("seed", Value::Int(12345)),
                ("control_after_generate", Value::from("increment")),
            ]),
            &config,
        )
        .unwrap();
    assert_eq!(outputs, vec![Value::Int(12345), Value::Int(12346)]);
}

#[test]
fn sampler_combo_substitutes_defaults() {
    let outputs = registry()
        .execute(
            "SamplerSchedulerCombo",
            inputs([
                ("sampler", Value::from("invalid_sampler")),
                ("scheduler", Value::from("normal")),
                ("steps", Value::Int(20)),
                ("cfg", Value::Float(7.0)),
            ]),
            &Config::default(),
        )
        .unwrap();

    assert_eq!(
        outputs,
        vec![
            Value::from("euler"),
            Value::from("normal"),
            Value::Int(20),
            Value::Float(7.0),
        ]
    );
}

#[test]
fn sampler_combo_clamps_steps() {
    let outputs = registry()
        .execute(
            "SamplerSchedulerCombo",
            inputs([("steps", Value::Int(i128::from(u64::MAX)))]),
            &Config::default(),
        )
        .unwrap();
    assert_eq!(outputs[2], Value::Int(10_000));
}

#[test]
fn save_image_batch_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = scratch_config(&dir);
    let images = Array4::<f32>::from_elem((2, 40, 48, 3), 0.75);

    let outputs = registry()
        .execute(
            "SaveImageBatch",
            inputs([
                ("images", Value::Image(images)),
                ("filename_prefix", Value::from("grid/cell")),
                ("format", Value::from("jpeg")),
                ("quality", Value::Int(90)),
            ]),
            &config,
        )
        .unwrap();

    assert_eq!(outputs[1], Value::Int(2));
    assert_eq!(outputs[2], Value::Int(0));

    let Value::String(paths) = &outputs[0] else {
        panic!("paths output is not a string");
    };
    for path in paths.lines() {
        assert!(path.ends_with(".jpg"));
        let decoded = image::open(path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (48, 40));
    }
    assert!(dir.path().join("output").join("grid").is_dir());
}

#[test]
fn save_image_batch_rejects_bad_quality() {
    let dir = tempfile::tempdir().unwrap();
    let images = Array4::<f32>::zeros((1, 8, 8, 3));

    let result = registry().execute(
        "SaveImageBatch",
        inputs([
            ("images", Value::Image(images)),
            ("quality", Value::Int(0)),
        ]),
        &scratch_config(&dir),
    );
    assert!(matches!(result, Err(Error::InvalidParameter { .. })));
}

#[test]
fn save_image_batch_requires_images() {
    let dir = tempfile::tempdir().unwrap();
    let result = registry().execute("SaveImageBatch", HashMap::new(), &scratch_config(&dir));
    assert!(matches!(result, Err(Error::MissingInput { .. })));
}

#[test]
fn xyz_grid_picks_combination() {
    let outputs = registry()
        .execute(
            "XyzGridInfo",
            inputs([
                ("x_parameter", Value::from("steps")),
                ("x_values", Value::from("10-30 (+10)")),
                ("y_parameter", Value::from("sampler")),
                ("y_values", Value::from("euler, dpmpp_2m")),
                ("index", Value::Int(4)),
            ]),
            &Config::default(),
        )
        .unwrap();

    assert_eq!(outputs[0], Value::Int(6));
    assert_eq!(outputs[2], Value::from("20"));
    assert_eq!(outputs[3], Value::from("dpmpp_2m"));
    assert_eq!(outputs[4], Value::from(""));

    let Value::String(combination) = &outputs[1] else {
        panic!("combination output is not a string");
    };
    let parsed: serde_json::Value = serde_json::from_str(combination).unwrap();
    assert_eq!(parsed["steps"], 20);
    assert_eq!(parsed["sampler"], "dpmpp_2m");
}

#[test]
fn xyz_grid_rejects_index_past_end() {
    let result = registry().execute(
        "XyzGridInfo",
        inputs([
            ("x_parameter", Value::from("cfg")),
            ("x_values", Value::from("5, 7")),
            ("index", Value::Int(2)),
        ]),
        &Config::default(),
    );
    assert!(matches!(result, Err(Error::InvalidParameter { .. })));
}
