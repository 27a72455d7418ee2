mod common;

use std::fs;

use common::{FakeVideoService, Remote, orchestrator};
use reelsmith_application::GenerateOptions;
use reelsmith_core::session::VideoStatus;
use reelsmith_core::settings::{AspectRatio, GenerationSettings, ModelVersion};
use tempfile::TempDir;

const LEGACY_SESSIONS: &str = r#"{
  "5d2b7c1e": {
    "id": "5d2b7c1e",
    "created_at": "2025-04-18T08:30:00.000000",
    "name": "Session 2025-04-18 08:30",
    "generations": [
      {
        "timestamp": "2025-04-18T08:41:12.000000",
        "prompt": "a hummingbird in slow motion",
        "settings": {
          "aspect_ratio": "4:5 (Portrait)",
          "model_version": "Veo 3 Quality",
          "num_variations": 2,
          "image_gcs_uri": ""
        },
        "videos": [
          {
            "id": "a91f03bc",
            "prompt": "a hummingbird in slow motion",
            "aspect_ratio": "4:5",
            "model_version": "veo-3.0-generate-preview",
            "created_at": "2025-04-18T08:39:02.000000",
            "local_path": "generated_videos/veo3_a91f03bc_20250418_083902.mp4",
            "status": "completed"
          },
          {
            "id": "0c44e2d9",
            "prompt": "a hummingbird in slow motion",
            "aspect_ratio": "4:5",
            "model_version": "veo-3.0-generate-preview",
            "created_at": "2025-04-18T08:41:12.000000",
            "local_path": null,
            "status": "timeout"
          }
        ]
      }
    ]
  }
}"#;

fn settings(n: u32) -> GenerationSettings {
    GenerationSettings::new(AspectRatio::Square, ModelVersion::Veo3Fast, n)
}

#[tokio::test(start_paused = true)]
async fn deleting_demo_removes_exactly_its_one_artifact() {
    let dir = TempDir::new().unwrap();
    let service = FakeVideoService::new([Remote::DoneAfter(2), Remote::NeverDone]);
    let state = orchestrator(dir.path(), Some(service));
    let demo = state.new_session(Some("demo")).await.unwrap();
    let other = state.new_session(Some("other")).await.unwrap();

    let generation = state
        .generate(&demo, "tidal bore", settings(2), GenerateOptions::default())
        .await
        .unwrap();
    assert_eq!(generation.videos[0].status, VideoStatus::Completed);
    assert_eq!(generation.videos[1].status, VideoStatus::Timeout);
    let artifact = generation.videos[0].local_path.clone().unwrap();
    assert!(artifact.exists());

    assert_eq!(state.delete_session(&demo).await.unwrap(), 1);
    assert!(!artifact.exists());
    let names: Vec<_> = state
        .sessions()
        .list_sessions()
        .await
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["other"]);

    // Second delete is a no-op.
    assert_eq!(state.delete_session(&demo).await.unwrap(), 0);

    let restarted = orchestrator(dir.path(), None);
    restarted.restore().await.unwrap();
    assert!(restarted.sessions().get_session(&demo).await.is_none());
    assert!(restarted.sessions().get_session(&other).await.is_some());
}

#[tokio::test]
async fn cascade_delete_tolerates_missing_artifacts() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("veo3_sessions.json"), LEGACY_SESSIONS).unwrap();
    let state = orchestrator(dir.path(), None);
    state.restore().await.unwrap();

    // The legacy artifact was never copied here, so nothing is removed.
    assert_eq!(state.delete_session("5d2b7c1e").await.unwrap(), 0);
    assert!(state.sessions().list_sessions().await.is_empty());
}

#[tokio::test]
async fn legacy_file_is_migrated_once_into_canonical_document() {
    let dir = TempDir::new().unwrap();
    let legacy = dir.path().join("veo3_sessions.json");
    let canonical = dir.path().join("generated_videos").join("sessions.json");
    fs::write(&legacy, LEGACY_SESSIONS).unwrap();

    let state = orchestrator(dir.path(), None);
    assert_eq!(state.restore().await.unwrap(), 1);
    assert!(canonical.exists());

    let session = state.sessions().get_session("5d2b7c1e").await.unwrap();
    let generation = &session.generations[0];
    assert_eq!(generation.settings.aspect_ratio, AspectRatio::TallPortrait);
    assert_eq!(generation.settings.model_version, ModelVersion::Veo3Quality);
    assert!(generation.settings.image.is_none());
    assert_eq!(generation.videos[0].status, VideoStatus::Completed);
    assert_eq!(generation.videos[1].local_path, None);

    // Same content, now versioned.
    let migrated: serde_json::Value = serde_json::from_str(&fs::read_to_string(&canonical).unwrap()).unwrap();
    let record = &migrated["5d2b7c1e"];
    assert_eq!(record["schema_version"], "1.0.0");
    assert_eq!(record["name"], "Session 2025-04-18 08:30");
    assert_eq!(record["generations"][0]["prompt"], "a hummingbird in slow motion");
    assert_eq!(record["generations"][0]["videos"][1]["status"], "timeout");

    // Later loads never touch the legacy file.
    fs::write(&legacy, "garbage").unwrap();
    let restarted = orchestrator(dir.path(), None);
    assert_eq!(restarted.restore().await.unwrap(), 1);
    assert_eq!(
        restarted.sessions().get_session("5d2b7c1e").await.unwrap(),
        session
    );
}

#[tokio::test]
async fn malformed_document_falls_back_to_empty_state() {
    let dir = TempDir::new().unwrap();
    let canonical = dir.path().join("generated_videos").join("sessions.json");
    fs::create_dir_all(canonical.parent().unwrap()).unwrap();
    fs::write(&canonical, "{\"broken\": ").unwrap();

    let state = orchestrator(dir.path(), None);
    let err = state.restore().await.unwrap_err();

    assert!(err.is_deserialization());
    assert!(state.sessions().list_sessions().await.is_empty());
}

#[tokio::test]
async fn rename_persists() {
    let dir = TempDir::new().unwrap();
    let state = orchestrator(dir.path(), None);
    let id = state.new_session(Some("draft")).await.unwrap();
    state.rename_session(&id, "final cut").await.unwrap();

    let restarted = orchestrator(dir.path(), None);
    restarted.restore().await.unwrap();
    assert_eq!(
        restarted.sessions().get_session(&id).await.unwrap().name,
        "final cut"
    );
}
