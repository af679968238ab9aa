//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `BailoApi` over real
//! HTTP through the ureq transport. Covers every response class: JSON
//! success, archive download, 401 with and without JSON, JSON and non-JSON
//! error bodies, connection refusal and the fixed request timeout.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bailo_core::{ApiError, ApiResponse, Authentication, BailoApi, Config, REQUEST_TIMEOUT};
use mock_server::VALID_TOKEN;
use serde_json::json;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn api(addr: SocketAddr, token: &str) -> BailoApi {
    let config = Config::new(&format!("http://{addr}/api/v1")).unwrap();
    BailoApi::new(config, Authentication::bearer(token).unwrap()).unwrap()
}

fn json_of(outcome: ApiResponse) -> serde_json::Value {
    outcome.into_json().expect("expected a JSON payload")
}

#[test]
fn model_lifecycle_with_download() {
    let addr = start_server();
    let client = api(addr, VALID_TOKEN);

    // Step 1: no models yet.
    let models = json_of(client.get("models", None, None).unwrap());
    assert_eq!(models, json!([]));

    // Step 2: create a model.
    let created = json_of(
        client
            .post("/model", &json!({"name": "resnet", "description": "v1"}), None, None)
            .unwrap(),
    );
    assert_eq!(created["name"], "resnet");
    let uuid = created["uuid"].as_str().unwrap().to_string();

    // Step 3: update it.
    let updated = json_of(
        client
            .put(&format!("model/{uuid}"), &json!({"description": "v2"}), None, None)
            .unwrap(),
    );
    assert_eq!(updated["description"], "v2");
    assert_eq!(updated["name"], "resnet");

    // Step 4: download its files.
    let dir = tempfile::tempdir().unwrap();
    let outcome = client
        .get_files(&format!("/model/{uuid}/files"), None, None, dir.path())
        .unwrap();
    assert_eq!(outcome, ApiResponse::FilesExtracted(200));
    let manifest = std::fs::read_to_string(dir.path().join("model.json")).unwrap();
    assert!(manifest.contains("resnet"));
    assert!(dir.path().join("code/model.py").is_file());
    assert!(!dir.path().join("__MACOSX").exists());

    // Step 5: unknown model comes back as a JSON diagnostic.
    let missing = json_of(
        client
            .get("model/00000000-0000-0000-0000-000000000000", None, None)
            .unwrap(),
    );
    assert_eq!(missing["message"], "model not found");
}

#[test]
fn request_shape_reaches_the_server() {
    let addr = start_server();
    let client = api(addr, VALID_TOKEN);

    let echoed = json_of(
        client
            .post(
                "echo",
                &json!({"a": 1}),
                Some(vec![("page".to_string(), "2".to_string())]),
                Some(vec![(
                    "Authorization".to_string(),
                    "Bearer forged".to_string(),
                )]),
            )
            .unwrap(),
    );
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["query"]["page"], "2");
    assert_eq!(echoed["authorization"], format!("Bearer {VALID_TOKEN}"));
    assert_eq!(echoed["content_type"], "application/json");
    assert_eq!(echoed["body"]["a"], 1);

    let echoed = json_of(client.put("/echo", &json!({"b": 2}), None, None).unwrap());
    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["body"]["b"], 2);
}

#[test]
fn wrong_token_is_unauthorized_with_payload() {
    let addr = start_server();
    let client = api(addr, "stale-token");

    match client.get("me", None, None).unwrap_err() {
        ApiError::Unauthorized { payload } => assert_eq!(payload, json!({"message": "denied"})),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[test]
fn unauthorized_without_json_is_a_status_error() {
    let addr = start_server();
    let err = api(addr, VALID_TOKEN).get("locked", None, None).unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));
}

#[test]
fn server_error_without_json_is_a_status_error() {
    let addr = start_server();
    let err = api(addr, VALID_TOKEN).get("broken", None, None).unwrap_err();
    assert!(err.to_string().contains("500"));
    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[test]
fn client_error_with_json_is_returned() {
    let addr = start_server();
    let outcome = api(addr, VALID_TOKEN).get("invalid", None, None).unwrap();
    assert_eq!(outcome, ApiResponse::Json(json!({"message": "invalid request"})));
}

#[test]
fn success_without_json_is_a_deserialization_error() {
    let addr = start_server();
    let err = api(addr, VALID_TOKEN).get("plain", None, None).unwrap_err();
    assert!(matches!(err, ApiError::Deserialization(_)));
}

#[test]
fn non_archive_download_is_an_archive_error() {
    let addr = start_server();
    let dir = tempfile::tempdir().unwrap();
    let err = api(addr, VALID_TOKEN)
        .get_files("plain", None, None, dir.path())
        .unwrap_err();
    assert!(matches!(err, ApiError::Archive(_)));
}

#[test]
fn connection_refused_is_a_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let err = api(addr, VALID_TOKEN).get("models", None, None).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn silent_server_times_out_as_transport_error() {
    // Accept connections but never write a response.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });

    let started = Instant::now();
    let err = api(addr, VALID_TOKEN).get("models", None, None).unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert!(elapsed >= REQUEST_TIMEOUT, "returned after {elapsed:?}");
    assert!(elapsed < REQUEST_TIMEOUT + Duration::from_secs(10), "took {elapsed:?}");
}
