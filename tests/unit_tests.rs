use serde_json::{json, Value};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tao_frame_labels::{process_dataset, Args, LabelsError};

struct Fixture {
    _temp_dir: tempfile::TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new(annotations: Value) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().to_path_buf();
        fs::write(
            root.join("annotations.json"),
            serde_json::to_vec(&annotations).unwrap(),
        )
        .unwrap();
        fs::create_dir_all(root.join("images")).unwrap();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    fn add_frames(&self, video: &str, names: &[&str]) {
        let dir = self.root.join("images").join(video);
        fs::create_dir_all(&dir).unwrap();
        for name in names {
            File::create(dir.join(name)).unwrap();
        }
    }

    fn args(&self) -> Args {
        Args {
            annotations: self.root.join("annotations.json"),
            output_dir: self.root.join("out"),
            images_dir: self.root.join("images"),
            split: "train".to_string(),
            video_name: Vec::new(),
        }
    }

    fn output_path(&self) -> PathBuf {
        self.root.join("out").join("train_annotations.json")
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_end_to_end_single_video() {
    let fixture = Fixture::new(json!({
        "images": [{"id": 1, "file_name": "trainset/vid1/000001.jpg"}],
        "annotations": [{"image_id": 1, "category_id": 5}],
        "categories": [{"id": 5, "name": "baby"}]
    }));
    fixture.add_frames("vid1", &["000001.jpg", "000002.jpg"]);

    let report = process_dataset(&fixture.args()).unwrap();

    assert_eq!(report.output_path, fixture.output_path());
    assert_eq!(
        read_json(&fixture.output_path()),
        json!({"vid1": {"000001": ["person"], "000002": []}})
    );
    assert_eq!(report.stats.videos_processed, 1);
    assert_eq!(report.stats.frames_written, 2);
    assert_eq!(report.stats.labelled_frames, 1);
}

#[test]
fn test_labels_keep_annotation_order_and_duplicates() {
    let fixture = Fixture::new(json!({
        "images": [{"id": 10, "file_name": "train/v/0001.jpg"}],
        "annotations": [
            {"id": 1, "image_id": 10, "category_id": 1},
            {"id": 2, "image_id": 10, "category_id": 2},
            {"id": 3, "image_id": 10, "category_id": 2}
        ],
        "categories": [{"id": 1, "name": "baby"}, {"id": 2, "name": "dog"}]
    }));
    fixture.add_frames("v", &["0001.jpg"]);

    process_dataset(&fixture.args()).unwrap();

    assert_eq!(
        read_json(&fixture.output_path()),
        json!({"v": {"0001": ["person", "dog", "dog"]}})
    );
}

#[test]
fn test_only_image_files_on_disk_become_frames() {
    let fixture = Fixture::new(json!({
        "images": [
            {"id": 1, "file_name": "train/v/1.jpg"},
            {"id": 2, "file_name": "train/v/99.jpg"}
        ],
        "annotations": [
            {"image_id": 1, "category_id": 1},
            {"image_id": 2, "category_id": 1}
        ],
        "categories": [{"id": 1, "name": "car"}]
    }));
    fixture.add_frames("v", &["1.jpg", "2.PNG", "notes.txt", "meta.json"]);
    fs::create_dir_all(fixture.root.join("images/v/nested.jpg")).unwrap();

    let report = process_dataset(&fixture.args()).unwrap();

    assert_eq!(
        read_json(&fixture.output_path()),
        json!({"v": {"1": ["car"], "2": []}})
    );
    assert_eq!(report.stats.annotated_frames_missing_on_disk, 1);
}

#[test]
fn test_frames_follow_natural_order() {
    let fixture = Fixture::new(json!({
        "images": [{"id": 1, "file_name": "train/v/frame1.jpg"}],
        "annotations": [],
        "categories": []
    }));
    fixture.add_frames("v", &["frame10.jpg", "frame2.jpg", "frame1.jpg"]);

    process_dataset(&fixture.args()).unwrap();

    let content = fs::read_to_string(fixture.output_path()).unwrap();
    let first = content.find("\"frame1\"").unwrap();
    let second = content.find("\"frame2\"").unwrap();
    let tenth = content.find("\"frame10\"").unwrap();
    assert!(first < second && second < tenth);
}

#[test]
fn test_frame_matches_annotation_by_stem() {
    let fixture = Fixture::new(json!({
        "images": [{"id": 1, "file_name": "train/v/000001.jpg"}],
        "annotations": [{"image_id": 1, "category_id": 3}],
        "categories": [{"id": 3, "name": "cat"}]
    }));
    fixture.add_frames("v", &["000001.png"]);

    process_dataset(&fixture.args()).unwrap();

    assert_eq!(
        read_json(&fixture.output_path()),
        json!({"v": {"000001": ["cat"]}})
    );
}

#[test]
fn test_video_field_groups_frames() {
    let fixture = Fixture::new(json!({
        "images": [
            {"id": 1, "file_name": "train/ArgoVerse/abc/0001.jpg", "video": "train/ArgoVerse/abc.mp4"}
        ],
        "annotations": [{"image_id": 1, "category_id": 1}],
        "categories": [{"id": 1, "name": "bicycle"}]
    }));
    fixture.add_frames("train/ArgoVerse/abc", &["0001.jpg"]);

    process_dataset(&fixture.args()).unwrap();

    assert_eq!(
        read_json(&fixture.output_path()),
        json!({"train/ArgoVerse/abc": {"0001": ["bicycle"]}})
    );
}

#[test]
fn test_missing_frame_directory_is_skipped() {
    let fixture = Fixture::new(json!({
        "images": [
            {"id": 1, "file_name": "train/present/1.jpg"},
            {"id": 2, "file_name": "train/absent/1.jpg"}
        ],
        "annotations": [{"image_id": 2, "category_id": 1}],
        "categories": [{"id": 1, "name": "person"}]
    }));
    fixture.add_frames("present", &["1.jpg"]);

    let report = process_dataset(&fixture.args()).unwrap();

    assert_eq!(
        read_json(&fixture.output_path()),
        json!({"present": {"1": []}})
    );
    assert_eq!(report.stats.videos_processed, 1);
    assert_eq!(report.stats.videos_skipped, 1);
}

#[test]
fn test_video_name_filter() {
    let fixture = Fixture::new(json!({
        "images": [
            {"id": 1, "file_name": "train/a/1.jpg"},
            {"id": 2, "file_name": "train/b/1.jpg"}
        ],
        "annotations": [],
        "categories": []
    }));
    fixture.add_frames("a", &["1.jpg"]);
    fixture.add_frames("b", &["1.jpg"]);

    let mut args = fixture.args();
    args.video_name = vec!["b".to_string()];
    process_dataset(&args).unwrap();

    assert_eq!(read_json(&fixture.output_path()), json!({"b": {"1": []}}));
}

#[test]
fn test_unknown_category_aborts_without_output() {
    let fixture = Fixture::new(json!({
        "images": [{"id": 1, "file_name": "train/v/1.jpg"}],
        "annotations": [{"image_id": 1, "category_id": 42}],
        "categories": [{"id": 1, "name": "person"}]
    }));
    fixture.add_frames("v", &["1.jpg"]);

    let result = process_dataset(&fixture.args());

    assert!(matches!(
        result,
        Err(LabelsError::UnknownCategory {
            image_id: 1,
            category_id: 42
        })
    ));
    assert!(!fixture.output_path().exists());
}

#[test]
fn test_file_name_without_directory_aborts() {
    let fixture = Fixture::new(json!({
        "images": [{"id": 7, "file_name": "1.jpg"}],
        "annotations": [],
        "categories": []
    }));

    let result = process_dataset(&fixture.args());

    assert!(matches!(
        result,
        Err(LabelsError::MalformedFileName { image_id: 7, .. })
    ));
}

#[test]
fn test_missing_annotation_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let args = Args {
        annotations: temp_dir.path().join("missing.json"),
        output_dir: temp_dir.path().join("out"),
        images_dir: temp_dir.path().join("images"),
        split: "val".to_string(),
        video_name: Vec::new(),
    };

    let result = process_dataset(&args);

    assert!(matches!(result, Err(LabelsError::ReadAnnotations { .. })));
}

#[test]
fn test_malformed_annotation_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let annotations = temp_dir.path().join("annotations.json");
    fs::write(&annotations, r#"{"images": [{"id": 1, "file_name": "#).unwrap();
    let args = Args {
        annotations: annotations.clone(),
        output_dir: temp_dir.path().join("out"),
        images_dir: temp_dir.path().join("images"),
        split: "val".to_string(),
        video_name: Vec::new(),
    };

    let result = process_dataset(&args);

    match result {
        Err(LabelsError::ParseAnnotations { path, .. }) => assert_eq!(path, annotations),
        other => panic!("expected ParseAnnotations, got {:?}", other.map(|r| r.output_path)),
    }
    assert!(!temp_dir.path().join("out/val_annotations.json").exists());
}

#[cfg(unix)]
#[test]
fn test_new_output_file_follows_umask() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = Fixture::new(json!({"images": [], "annotations": [], "categories": []}));
    fs::create_dir_all(fixture.root.join("out")).unwrap();
    let plain = fixture.root.join("out").join("plain.txt");
    fs::write(&plain, "x").unwrap();

    process_dataset(&fixture.args()).unwrap();

    let output_mode = fs::metadata(fixture.output_path()).unwrap().permissions().mode() & 0o777;
    let plain_mode = fs::metadata(&plain).unwrap().permissions().mode() & 0o777;
    assert_eq!(output_mode, plain_mode);
}

#[cfg(unix)]
#[test]
fn test_existing_output_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = Fixture::new(json!({"images": [], "annotations": [], "categories": []}));
    fs::create_dir_all(fixture.root.join("out")).unwrap();
    fs::write(fixture.output_path(), "stale").unwrap();
    fs::set_permissions(fixture.output_path(), fs::Permissions::from_mode(0o640)).unwrap();

    process_dataset(&fixture.args()).unwrap();

    let mode = fs::metadata(fixture.output_path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
    assert_eq!(read_json(&fixture.output_path()), json!({}));
}

#[test]
fn test_output_is_idempotent_and_overwritten() {
    let fixture = Fixture::new(json!({
        "images": [
            {"id": 1, "file_name": "train/b/1.jpg"},
            {"id": 2, "file_name": "train/a/1.jpg"},
            {"id": 3, "file_name": "train/a/2.jpg"}
        ],
        "annotations": [
            {"image_id": 1, "category_id": 1},
            {"image_id": 3, "category_id": 2}
        ],
        "categories": [{"id": 1, "name": "person"}, {"id": 2, "name": "baby"}]
    }));
    fixture.add_frames("a", &["1.jpg", "2.jpg"]);
    fixture.add_frames("b", &["1.jpg"]);
    fs::create_dir_all(fixture.root.join("out")).unwrap();
    fs::write(fixture.output_path(), "stale").unwrap();

    process_dataset(&fixture.args()).unwrap();
    let first = fs::read(fixture.output_path()).unwrap();
    process_dataset(&fixture.args()).unwrap();
    let second = fs::read(fixture.output_path()).unwrap();

    assert_eq!(first, second);
    let content = String::from_utf8(first).unwrap();
    assert!(content.starts_with("{\n    \"b\": {\n        \"1\": ["));
    assert!(content.find("\"b\"").unwrap() < content.find("\"a\"").unwrap());
}

#[test]
fn test_split_name_is_sanitized() {
    let fixture = Fixture::new(json!({"images": [], "annotations": [], "categories": []}));
    let mut args = fixture.args();
    args.split = "val/../x".to_string();

    let report = process_dataset(&args).unwrap();

    assert_eq!(report.output_path.parent(), Some(fixture.root.join("out").as_path()));
    assert_eq!(read_json(&report.output_path), json!({}));
}
