use ebook_narrator::client::{ApiClient, parse_event};
use ebook_narrator::config::{AppConfig, VoiceEntry};
use ebook_narrator::server::{AppState, router};
use futures_util::StreamExt;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message as WsMessage;

const FAKE_PIPER: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --output_file) out="$2"; shift 2 ;;
    --input_file) in="$2"; shift 2 ;;
    *) shift ;;
  esac
done
cp "$in" "$out"
"#;

struct Harness {
    _root: TempDir,
    base: String,
    api: ApiClient,
}

fn config_in(root: &Path) -> AppConfig {
    let ebooks = root.join("ebooks");
    fs::create_dir_all(&ebooks).unwrap();
    fs::write(ebooks.join("moby dick.txt"), "Call me Ishmael.\n\nSome years ago.\n\n\n").unwrap();
    fs::write(ebooks.join("Alice.EPUB"), b"not really an epub").unwrap();
    fs::write(ebooks.join("notes.docx"), b"ignored").unwrap();
    fs::write(ebooks.join(".hidden.txt"), b"ignored").unwrap();
    fs::create_dir_all(ebooks.join("folder.epub")).unwrap();

    let voice_dir = root.join("voices").join("demo");
    fs::create_dir_all(&voice_dir).unwrap();
    fs::write(voice_dir.join("demo.onnx"), b"model").unwrap();
    fs::write(voice_dir.join("demo.onnx.json"), b"{}").unwrap();
    fs::write(voice_dir.join("demo.json"), b"{}").unwrap();

    let path = |p: &Path| p.to_string_lossy().into_owned();
    AppConfig {
        ebooks_dir: path(&ebooks),
        audio_dir: path(&root.join("audio")),
        temp_dir: path(&root.join("temp")),
        tts_voices_dir: path(&root.join("voices")),
        tts_command: vec![
            "sh".into(),
            "-c".into(),
            FAKE_PIPER.into(),
            "piper".into(),
        ],
        voices: vec![VoiceEntry {
            id: "demo".into(),
            name: "Demo voice".into(),
            language: "en-US".into(),
        }],
        ..AppConfig::default()
    }
}

async fn start() -> Harness {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    fs::create_dir_all(config.audio_dir()).unwrap();
    let (events, _) = broadcast::channel(16);
    let app = router(AppState::new(config, events));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = format!("http://{addr}");
    let api = ApiClient::new(&base, Duration::from_secs(10), Duration::from_secs(10)).unwrap();
    Harness {
        _root: root,
        base,
        api,
    }
}

async fn post_tts(base: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}/api/text-to-speech"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn lists_supported_ebooks_in_order() {
    let h = start().await;
    let ebooks = h.api.list_ebooks().await.unwrap();
    let names: Vec<_> = ebooks.iter().map(|e| e.filename.as_str()).collect();
    assert_eq!(names, vec!["Alice.EPUB", "moby dick.txt"]);
    assert_eq!(ebooks[1].title, "moby dick");
}

#[tokio::test]
async fn lists_configured_voices() {
    let h = start().await;
    let voices = h.api.list_voices().await.unwrap();
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0].id, "demo");
}

#[tokio::test]
async fn extracts_sections_from_plain_text() {
    let h = start().await;
    let text = h.api.extract_text("moby dick.txt").await.unwrap();
    assert_eq!(text.title, "moby dick");
    assert_eq!(text.sections, vec!["Call me Ishmael.", "Some years ago."]);
}

#[tokio::test]
async fn missing_ebook_is_not_found() {
    let h = start().await;
    let err = h.api.extract_text("absent.epub").await.unwrap_err();
    assert!(format!("{err:#}").contains("404"), "{err:#}");

    let status = reqwest::get(format!("{}/api/extract-text/..", h.base))
        .await
        .unwrap()
        .status()
        .as_u16();
    assert!(status == 400 || status == 404, "status {status}");
}

#[tokio::test]
async fn synthesis_rejects_bad_requests() {
    let h = start().await;

    let (status, body) = post_tts(&h.base, serde_json::json!({ "text": "hi" })).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("Missing parameters"));

    let (status, _) = post_tts(
        &h.base,
        serde_json::json!({ "text": "hi", "voiceId": "demo", "outputFileName": "../escape" }),
    )
    .await;
    assert_eq!(status, 400);

    let (status, body) = post_tts(
        &h.base,
        serde_json::json!({ "text": "hi", "voiceId": "nobody", "outputFileName": "clip" }),
    )
    .await;
    assert_eq!(status, 404);
    assert!(body["error"].as_str().unwrap().contains("nobody"));

    let response = reqwest::Client::new()
        .post(format!("{}/api/text-to-speech", h.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[cfg(unix)]
#[tokio::test]
async fn synthesizes_and_serves_the_clip() {
    let h = start().await;
    let (status, body) = post_tts(
        &h.base,
        serde_json::json!({ "text": "Call me Ishmael.", "voiceId": "demo", "outputFileName": "moby_section_0_demo" }),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["audioUrl"], "/audio/moby_section_0_demo.wav");

    let clip = h
        .api
        .synthesize("Call me Ishmael.", "demo", "moby_section_0_demo")
        .await
        .unwrap();
    assert_eq!(clip.url, "/audio/moby_section_0_demo.wav");
    assert_eq!(&clip.bytes[..], b"Call me Ishmael.");

    let sidecar = reqwest::get(format!("{}/audio/moby_section_0_demo.wav.sha256", h.base))
        .await
        .unwrap()
        .status()
        .as_u16();
    assert_eq!(sidecar, 404);

    let err = h.api.fetch_audio("/audio/missing.wav").await.unwrap_err();
    assert!(format!("{err:#}").contains("404"), "{err:#}");
}

#[tokio::test]
async fn live_socket_announces_existing_ebooks() {
    let h = start().await;
    let url = h.api.ws_url().unwrap();
    let (mut socket, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();

    let mut paths = Vec::new();
    while paths.len() < 2 {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let WsMessage::Text(text) = frame {
            match parse_event(&text) {
                Some(ebook_narrator::app::Message::EbookDiscovered { path }) => paths.push(path),
                other => panic!("unexpected event {other:?}"),
            }
        }
    }
    assert!(paths[0].ends_with("Alice.EPUB"));
    assert!(paths[1].ends_with("moby dick.txt"));
}

#[tokio::test]
async fn health_reports_ok() {
    let h = start().await;
    let body: Value = reqwest::get(format!("{}/health", h.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}
