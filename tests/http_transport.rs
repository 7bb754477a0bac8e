mod common;

use std::time::Duration;

use httpmock::{
    Method::{GET, POST},
    MockServer,
};
use rgenmedia::{
    normalize_with_models, Credential, GenError, GenerationKind, GenerationRequest,
    HttpTransport, JobExecutor, PollPolicy, ReferenceImage, TransportErrorKind,
};
use serde_json::json;

use common::{should_skip_httpmock, TEST_KEY, VIDEO_OPERATION};

fn executor(server: &MockServer) -> JobExecutor<HttpTransport> {
    let transport = HttpTransport::new(server.url("/v1beta")).expect("transport");
    JobExecutor::with_policy(
        transport,
        PollPolicy::default().with_interval(Duration::from_millis(10)),
    )
}

#[tokio::test]
async fn image_request_hits_generate_content() -> rgenmedia::Result<()> {
    if should_skip_httpmock() {
        return Ok(());
    }

    let server = MockServer::start_async().await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-test:generateContent")
                .header("x-goog-api-key", TEST_KEY)
                .body_includes(r#""aspectRatio":"4:3""#)
                .body_includes(r#""inlineData":{"mimeType":"image/jpeg","data":"AQID"}"#)
                .body_includes(r#""threshold":"BLOCK_NONE""#);
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    json!({
                        "candidates": [{
                            "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "iVBORw=="}}]},
                            "finishReason": "STOP"
                        }]
                    })
                    .to_string(),
                );
        })
        .await;

    let request = GenerationRequest::image("paper boats")
        .with_aspect_ratio("4:3".parse().expect("ratio"))
        .with_reference_image(ReferenceImage::new(vec![1, 2, 3], "image/jpeg"));
    let transport_request = normalize_with_models(&request, "gemini-test", "veo-test");

    let artifact = executor(&server)
        .execute(&transport_request, &Credential::new(TEST_KEY))
        .await?;

    generate.assert_async().await;
    assert_eq!(artifact.kind, GenerationKind::Image);
    assert_eq!(artifact.data, vec![0x89, 0x50, 0x4e, 0x47]);
    Ok(())
}

#[tokio::test]
async fn video_polls_once_and_fetches_with_key() -> rgenmedia::Result<()> {
    if should_skip_httpmock() {
        return Ok(());
    }

    let server = MockServer::start_async().await;
    let video_uri = server.url("/files/vid-1:download?alt=media");

    let submit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/veo-test:predictLongRunning")
                .header("x-goog-api-key", TEST_KEY)
                .body_includes(r#""aspectRatio":"9:16""#)
                .body_includes(r#""numberOfVideos":1"#)
                .body_includes(r#""resolution":"720p""#);
            then.status(200)
                .header("content-type", "application/json")
                .body(json!({"name": VIDEO_OPERATION}).to_string());
        })
        .await;

    let poll = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/v1beta/{}", VIDEO_OPERATION))
                .header("x-goog-api-key", TEST_KEY);
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    json!({
                        "name": VIDEO_OPERATION,
                        "done": true,
                        "response": {
                            "generateVideoResponse": {
                                "generatedSamples": [{"video": {"uri": video_uri}}]
                            }
                        }
                    })
                    .to_string(),
                );
        })
        .await;

    let download = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/files/vid-1:download")
                .query_param("alt", "media")
                .query_param("key", TEST_KEY);
            then.status(200)
                .header("content-type", "video/mp4")
                .body(b"fake-mp4-bytes".to_vec());
        })
        .await;

    let request = GenerationRequest::video("tide pools")
        .with_aspect_ratio("1:1".parse().expect("ratio"));
    let transport_request = normalize_with_models(&request, "gemini-test", "veo-test");

    let artifact = executor(&server)
        .execute(&transport_request, &Credential::new(TEST_KEY))
        .await?;

    submit.assert_async().await;
    poll.assert_calls_async(1).await;
    download.assert_async().await;
    assert_eq!(artifact.kind, GenerationKind::Video);
    assert_eq!(artifact.mime_type, "video/mp4");
    assert_eq!(artifact.data, b"fake-mp4-bytes".to_vec());
    Ok(())
}

#[tokio::test]
async fn forbidden_download_is_fetch_failed() -> rgenmedia::Result<()> {
    if should_skip_httpmock() {
        return Ok(());
    }

    let server = MockServer::start_async().await;
    let video_uri = server.url("/files/vid-2:download?alt=media");

    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/veo-test:predictLongRunning");
            then.status(200).body(
                json!({
                    "name": VIDEO_OPERATION,
                    "done": true,
                    "response": {"generatedVideos": [{"video": {"uri": video_uri}}]}
                })
                .to_string(),
            );
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/files/vid-2:download");
            then.status(403).body("forbidden");
        })
        .await;

    let request = GenerationRequest::video("tide pools");
    let transport_request = normalize_with_models(&request, "gemini-test", "veo-test");

    let err = executor(&server)
        .execute(&transport_request, &Credential::new(TEST_KEY))
        .await
        .expect_err("download must fail");
    assert!(matches!(err, GenError::FetchFailed { status: 403 }));
    Ok(())
}

#[tokio::test]
async fn submit_rejection_keeps_upstream_message() -> rgenmedia::Result<()> {
    if should_skip_httpmock() {
        return Ok(());
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/veo-test:predictLongRunning");
            then.status(404)
                .header("content-type", "application/json")
                .body(
                    json!({
                        "error": {
                            "code": 404,
                            "message": "models/veo-test is not found for API version v1beta",
                            "status": "NOT_FOUND"
                        }
                    })
                    .to_string(),
                );
        })
        .await;

    let request = GenerationRequest::video("tide pools");
    let transport_request = normalize_with_models(&request, "gemini-test", "veo-test");

    let err = executor(&server)
        .execute(&transport_request, &Credential::new(TEST_KEY))
        .await
        .expect_err("submit must fail");

    match &err {
        GenError::Transport {
            kind,
            status,
            message,
        } => {
            assert_eq!(*kind, TransportErrorKind::NotFound);
            assert_eq!(*status, Some(404));
            assert!(message.contains("not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.advice(), rgenmedia::UserAdvice::Reauthenticate);
    Ok(())
}

#[tokio::test]
async fn poll_error_is_not_retried() -> rgenmedia::Result<()> {
    if should_skip_httpmock() {
        return Ok(());
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/veo-test:predictLongRunning");
            then.status(200)
                .body(json!({"name": VIDEO_OPERATION, "done": false}).to_string());
        })
        .await;
    let poll = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/v1beta/{}", VIDEO_OPERATION));
            then.status(503).body("backend unavailable");
        })
        .await;

    let request = GenerationRequest::video("tide pools");
    let transport_request = normalize_with_models(&request, "gemini-test", "veo-test");

    let err = executor(&server)
        .execute(&transport_request, &Credential::new(TEST_KEY))
        .await
        .expect_err("poll must fail");

    poll.assert_calls_async(1).await;
    assert!(matches!(
        err,
        GenError::Transport {
            kind: TransportErrorKind::Server,
            status: Some(503),
            ..
        }
    ));
    assert_eq!(err.upstream_message(), Some("backend unavailable"));
    Ok(())
}
