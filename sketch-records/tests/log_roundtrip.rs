use serde_json::json;
use sketch_records::{load_log, save_log, GenerationLog, GenerationResultRecord, PromptHistoryRecord};

#[test]
fn log_roundtrip() {
    let mut log = GenerationLog::new();

    let sketch = PromptHistoryRecord::new("stone tower on a cliff, oil painting")
        .with_negative_prompt("blurry")
        .with_size(768, 512)
        .with_seed(1234)
        .with_init_image("data:image/png;base64,iVBORw0KGgo=", 0.75);
    let prompt_id = log.push_prompt(sketch).unwrap();
    log.push_prompt(PromptHistoryRecord::new("same tower, at night"))
        .unwrap();

    log.attach_result(GenerationResultRecord::new(
        prompt_id,
        vec!["iVBORw0KGgo=".into()],
        json!({"prompt": "stone tower on a cliff, oil painting", "steps": 20}),
        r#"{"seed": 1234}"#,
    ))
    .unwrap();

    let path = std::path::Path::new("target/test_log.sketchlog.json");
    save_log(path, &log).unwrap();
    let loaded = load_log(path).unwrap();

    assert_eq!(loaded, log);
    let entry = loaded.find(prompt_id).unwrap();
    assert_eq!(entry.prompt.denoising_strength, Some(0.75));
    assert_eq!(entry.result.as_ref().unwrap().parameters["steps"], 20);
}

#[test]
fn load_missing_log_reports_path() {
    let err = load_log("target/no-such-dir/missing.sketchlog.json").unwrap_err();
    assert!(format!("{err:#}").contains("missing.sketchlog.json"));
}
