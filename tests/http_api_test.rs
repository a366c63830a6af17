mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{test_config, test_llm_service, PlainTextExtractor, Script, ScriptedClient};
use resume_ranker::server::build_router;
use resume_ranker::services::{FileTextExtractor, TextExtractor};
use resume_ranker::{AppContext, Config};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const BOUNDARY: &str = "resume-ranker-test-boundary";

/// multipart 表单的一个字段：(字段名, 文件名, 内容)
type Part<'a> = (&'a str, Option<&'a str>, &'a str);

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

struct TestServer {
    ctx: AppContext,
    shutdown: CancellationToken,
}

impl TestServer {
    fn start(config: Config, client: ScriptedClient, extractor: Arc<dyn TextExtractor>) -> Self {
        let llm = test_llm_service(&config);
        let shutdown = CancellationToken::new();
        let (ctx, _background) =
            AppContext::start(config, Arc::new(client), llm, extractor, shutdown.clone());
        Self { ctx, shutdown }
    }

    fn plain(client: ScriptedClient) -> Self {
        Self::start(test_config(), client, Arc::new(PlainTextExtractor))
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = build_router(self.ctx.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::plain(ScriptedClient::new());
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_stats_reports_single_worker() {
    let server = TestServer::plain(ScriptedClient::new());
    let request = Request::builder().uri("/stats").body(Body::empty()).unwrap();

    let (status, _, body) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["worker_count"], 1);
    assert_eq!(json["queue_depth"], 0);
    assert_eq!(json["stored_outcomes"], 0);
}

#[tokio::test]
async fn test_score_resumes_returns_csv_attachment() {
    let client = ScriptedClient::new()
        .with("alice", Script::Scores(vec![("Python", 4.0), ("AWS", 3.0)]))
        .with("bob", Script::Scores(vec![("Python", 5.0), ("AWS", 2.0)]));
    let server = TestServer::plain(client);

    let request = multipart_request(
        "/score-resumes",
        &[
            ("criteria", None, r#"["Python", "AWS"]"#),
            ("files", Some("alice.pdf"), "python"),
            ("files", Some("bob.docx"), "aws"),
        ],
    );

    let (status, headers, body) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=resumes_scores.csv"
    );
    assert_eq!(
        body,
        "Candidate Name,Python,AWS,Total Score\nalice,4,3,7\nbob,5,2,7\n"
    );
}

#[tokio::test]
async fn test_malformed_criteria_rejected_before_enqueue() {
    let server = TestServer::plain(ScriptedClient::new());

    for raw in [r#""Python""#, "not json", r#"{"a": 1}"#, "[1, 2]"] {
        let request = multipart_request(
            "/score-resumes",
            &[
                ("criteria", None, raw),
                ("files", Some("alice.pdf"), "python"),
            ],
        );

        let (status, _, body) = server.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "criteria {:?}", raw);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["detail"].as_str().unwrap().contains("Invalid criteria format"));
    }

    assert!(server.ctx.store().is_empty());
    assert_eq!(server.ctx.queue().depth(), 0);
}

#[tokio::test]
async fn test_missing_criteria_field_rejected() {
    let server = TestServer::plain(ScriptedClient::new());
    let request = multipart_request("/score-resumes", &[("files", Some("a.pdf"), "x")]);

    let (status, _, _) = server.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(server.ctx.store().is_empty());
}

#[tokio::test]
async fn test_unsupported_file_rejected() {
    let server = TestServer::start(
        test_config(),
        ScriptedClient::new(),
        Arc::new(FileTextExtractor::new()),
    );

    let request = multipart_request(
        "/score-resumes",
        &[
            ("criteria", None, r#"["Python"]"#),
            ("files", Some("notes.txt"), "plain text"),
        ],
    );

    let (status, _, body) = server.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("notes.txt"));
    assert!(server.ctx.store().is_empty());
}

#[tokio::test]
async fn test_batch_timeout_maps_to_gateway_timeout() {
    let config = Config {
        batch_deadline_secs: 1,
        ..test_config()
    };
    let server = TestServer::start(
        config,
        ScriptedClient::new().with("slow", Script::Hang),
        Arc::new(PlainTextExtractor),
    );

    let request = multipart_request(
        "/score-resumes",
        &[
            ("criteria", None, r#"["Go"]"#),
            ("files", Some("slow.pdf"), "z"),
        ],
    );

    let (status, _, body) = server.send(request).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["detail"].is_string());
}

#[tokio::test]
async fn test_extract_criteria_rejects_unsupported_file() {
    let server = TestServer::start(
        test_config(),
        ScriptedClient::new(),
        Arc::new(FileTextExtractor::new()),
    );

    let request = multipart_request(
        "/extract-criteria",
        &[("file", Some("job.txt"), "we need rust")],
    );

    let (status, _, _) = server.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_extract_criteria_requires_file() {
    let server = TestServer::plain(ScriptedClient::new());
    let request = multipart_request("/extract-criteria", &[("other", None, "x")]);

    let (status, _, _) = server.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
