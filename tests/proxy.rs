//! Outbound proxy and upload passthrough.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;

use common::{
    closed_addr, post_json, router, send, start_programmable_upstream, state, MockResponse, Site, EDGE_HOST,
    EDGE_ORIGIN,
};
use spa_edge::http::PipelineSettings;

fn proxy_body(url: &str) -> String {
    json!({ "url": url, "method": "POST", "headers": { "X-Trace": "t1" }, "body": "ping" }).to_string()
}

#[tokio::test]
async fn unlisted_host_is_always_forbidden() {
    let site = Site::new();
    let upstream = start_programmable_upstream(|_| async { MockResponse::new(200, "reached") }).await;
    let router = router(
        state(&site, &["api.imgbb.com"], "https://api.imgbb.com/1/upload"),
        PipelineSettings::default(),
    );
    let target = format!("http://{}/anything", upstream.authority());

    let variants = [
        json!({ "url": target }),
        json!({ "url": target, "method": "DELETE" }),
        json!({ "url": target, "method": "PUT", "body": "payload" }),
        json!({ "url": target, "headers": { "Host": "api.imgbb.com" } }),
        json!({ "url": format!("http://api.imgbb.com@{}/x", upstream.authority()) }),
    ];
    for body in variants {
        let sent = send(&router, post_json("/api/proxy", body.to_string())).await;
        assert_eq!(sent.status, StatusCode::FORBIDDEN, "{body}");
        assert_eq!(sent.text(), "Forbidden: Host not in whitelist");
    }
    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn origin_is_checked_first() {
    let site = Site::new();
    let upstream = start_programmable_upstream(|_| async { MockResponse::new(200, "reached") }).await;
    let router = router(
        state(&site, &[upstream.authority().as_str()], "https://api.imgbb.com/1/upload"),
        PipelineSettings::default(),
    );
    let body = proxy_body(&format!("http://{}/", upstream.authority()));

    let no_origin = Request::builder()
        .method("POST")
        .uri("/api/proxy")
        .header(header::HOST, EDGE_HOST)
        .body(Body::from(body.clone()))
        .unwrap();
    let sent = send(&router, no_origin).await;
    assert_eq!(sent.status, StatusCode::FORBIDDEN);
    assert_eq!(sent.text(), "Forbidden: Invalid origin");

    let foreign = Request::builder()
        .method("POST")
        .uri("/api/proxy")
        .header(header::HOST, EDGE_HOST)
        .header(header::ORIGIN, "https://attacker.example")
        .body(Body::from(body.clone()))
        .unwrap();
    let sent = send(&router, foreign).await;
    assert_eq!(sent.status, StatusCode::FORBIDDEN);

    let via_referer = Request::builder()
        .method("POST")
        .uri("/api/proxy")
        .header(header::HOST, EDGE_HOST)
        .header(header::REFERER, format!("{EDGE_ORIGIN}/settings"))
        .body(Body::from(body))
        .unwrap();
    let sent = send(&router, via_referer).await;
    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(upstream.received().len(), 1);
}

#[tokio::test]
async fn malformed_requests_are_400() {
    let site = Site::new();
    let router = router(
        state(&site, &["api.imgur.com"], "https://api.imgbb.com/1/upload"),
        PipelineSettings::default(),
    );

    let sent = send(&router, post_json("/api/proxy", "{not json")).await;
    assert_eq!(sent.status, StatusCode::BAD_REQUEST);
    assert_eq!(sent.text(), "Invalid JSON");

    let sent = send(&router, post_json("/api/proxy", json!({ "url": "::nope" }).to_string())).await;
    assert_eq!(sent.status, StatusCode::BAD_REQUEST);
    assert_eq!(sent.text(), "Invalid URL");

    let sent = send(
        &router,
        post_json(
            "/api/proxy",
            json!({ "url": "https://api.imgur.com/3/image", "method": "NOT A METHOD" }).to_string(),
        ),
    )
    .await;
    assert_eq!(sent.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn forwards_and_relays_upstream_response() {
    let site = Site::new();
    let upstream = start_programmable_upstream(|_| async {
        MockResponse::new(201, r#"{"id":"abc"}"#)
            .header("Content-Type", "application/json")
            .header("X-Upstream", "mock")
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Credentials", "true")
    })
    .await;
    let router = router(
        state(&site, &[upstream.authority().as_str()], "https://api.imgbb.com/1/upload"),
        PipelineSettings::default(),
    );

    let sent = send(
        &router,
        post_json("/api/proxy", proxy_body(&format!("http://{}/items?q=1", upstream.authority()))),
    )
    .await;

    assert_eq!(sent.status, StatusCode::CREATED);
    assert_eq!(sent.text(), r#"{"id":"abc"}"#);
    assert_eq!(sent.header("x-upstream"), Some("mock"));
    // upstream CORS grants are replaced by the edge's own reflection
    assert_eq!(sent.header("access-control-allow-origin"), Some(EDGE_ORIGIN));
    assert_eq!(sent.header("cache-control"), Some("no-cache, no-store, must-revalidate"));

    let received = upstream.received();
    assert_eq!(received.len(), 1);
    let raw = received[0].to_ascii_lowercase();
    assert!(raw.starts_with("post /items?q=1 http/1.1"), "{raw}");
    assert!(raw.contains("x-trace: t1"));
    assert!(raw.ends_with("ping"));
}

#[tokio::test]
async fn upstream_errors_and_redirects_are_relayed() {
    let site = Site::new();
    let upstream = start_programmable_upstream(|raw| async move {
        if raw.starts_with("GET /moved") {
            MockResponse::new(302, "").header("Location", "http://169.254.169.254/")
        } else {
            MockResponse::new(503, "maintenance")
        }
    })
    .await;
    let router = router(
        state(&site, &[upstream.authority().as_str()], "https://api.imgbb.com/1/upload"),
        PipelineSettings::default(),
    );

    let sent = send(
        &router,
        post_json("/api/proxy", json!({ "url": format!("http://{}/down", upstream.authority()) }).to_string()),
    )
    .await;
    assert_eq!(sent.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(sent.text(), "maintenance");

    let sent = send(
        &router,
        post_json("/api/proxy", json!({ "url": format!("http://{}/moved", upstream.authority()) }).to_string()),
    )
    .await;
    assert_eq!(sent.status, StatusCode::FOUND);
    assert_eq!(sent.header("location"), Some("http://169.254.169.254/"));
    assert_eq!(upstream.received().len(), 2);
}

#[tokio::test]
async fn transport_failure_is_502() {
    let site = Site::new();
    let addr = closed_addr().await;
    let router = router(
        state(&site, &[addr.to_string().as_str()], "https://api.imgbb.com/1/upload"),
        PipelineSettings::default(),
    );

    let sent = send(
        &router,
        post_json("/api/proxy", json!({ "url": format!("http://{addr}/") }).to_string()),
    )
    .await;
    assert_eq!(sent.status, StatusCode::BAD_GATEWAY);
    assert!(sent.text().starts_with("Proxy request failed: "), "{}", sent.text());
}

#[tokio::test]
async fn get_on_proxy_is_405() {
    let site = Site::new();
    let router = router(
        state(&site, &[], "https://api.imgbb.com/1/upload"),
        PipelineSettings::default(),
    );

    for path in ["/api/proxy", "/api/imgbb"] {
        let request = Request::builder()
            .uri(path)
            .header(header::HOST, EDGE_HOST)
            .body(Body::empty())
            .unwrap();
        let sent = send(&router, request).await;
        assert_eq!(sent.status, StatusCode::METHOD_NOT_ALLOWED, "{path}");
        assert_eq!(sent.text(), "Method not allowed");
    }
}

#[tokio::test]
async fn upload_posts_multipart_with_key() {
    let site = Site::new();
    let upstream = start_programmable_upstream(|_| async {
        MockResponse::new(200, r#"{"data":{"url":"https://i.example/abc.png"},"success":true}"#)
            .header("Content-Type", "text/html")
    })
    .await;
    let endpoint = format!("http://{}/1/upload", upstream.authority());
    let router = router(
        state(&site, &[upstream.authority().as_str()], &endpoint),
        PipelineSettings::default(),
    );

    let body = json!({ "image": "aGVsbG8=", "apiKey": "secret-key", "expiration": 600 }).to_string();
    let sent = send(&router, post_json("/api/imgbb", body)).await;

    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(sent.header("content-type"), Some("application/json"));
    assert!(sent.text().contains("\"success\":true"));

    let received = upstream.received();
    assert_eq!(received.len(), 1);
    let raw = &received[0];
    assert!(raw.starts_with("POST /1/upload?key=secret-key&expiration=600 HTTP/1.1"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("content-type: multipart/form-data; boundary="));
    assert!(raw.contains("name=\"image\""));
    assert!(raw.contains("aGVsbG8="));
}

#[tokio::test]
async fn upload_requires_listed_host_and_key() {
    let site = Site::new();
    let upstream = start_programmable_upstream(|_| async { MockResponse::new(200, "{}") }).await;
    let endpoint = format!("http://{}/1/upload", upstream.authority());

    let unlisted = router(state(&site, &["api.imgbb.com"], &endpoint), PipelineSettings::default());
    let body = json!({ "image": "x", "apiKey": "k" }).to_string();
    let sent = send(&unlisted, post_json("/api/imgbb", body)).await;
    assert_eq!(sent.status, StatusCode::FORBIDDEN);
    assert_eq!(sent.text(), "Forbidden: ImgBB not in whitelist");

    let listed = router(state(&site, &[upstream.authority().as_str()], &endpoint), PipelineSettings::default());
    let sent = send(&listed, post_json("/api/imgbb", json!({ "image": "x" }).to_string())).await;
    assert_eq!(sent.status, StatusCode::BAD_REQUEST);
    assert_eq!(sent.text(), "API key required");

    let sent = send(&listed, post_json("/api/imgbb", "nope")).await;
    assert_eq!(sent.status, StatusCode::BAD_REQUEST);
    assert_eq!(sent.text(), "Invalid JSON");

    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn upload_transport_failure_is_502_without_key() {
    let site = Site::new();
    let addr = closed_addr().await;
    let endpoint = format!("http://{addr}/1/upload");
    let router = router(
        state(&site, &[addr.to_string().as_str()], &endpoint),
        PipelineSettings::default(),
    );

    let body = json!({ "image": "aGVsbG8=", "apiKey": "do-not-leak-7f3a" }).to_string();
    let sent = send(&router, post_json("/api/imgbb", body)).await;

    assert_eq!(sent.status, StatusCode::BAD_GATEWAY);
    assert!(sent.text().starts_with("ImgBB request failed: "), "{}", sent.text());
    assert!(!sent.text().contains("do-not-leak-7f3a"), "{}", sent.text());
}

#[tokio::test]
async fn null_origin_defers_to_same_host_referer() {
    let site = Site::new();
    let upstream = start_programmable_upstream(|_| async { MockResponse::new(200, "reached") }).await;
    let router = router(
        state(&site, &[upstream.authority().as_str()], "https://api.imgbb.com/1/upload"),
        PipelineSettings::default(),
    );
    let body = proxy_body(&format!("http://{}/", upstream.authority()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/proxy")
        .header(header::HOST, EDGE_HOST)
        .header(header::ORIGIN, "null")
        .header(header::REFERER, format!("{EDGE_ORIGIN}/settings"))
        .body(Body::from(body.clone()))
        .unwrap();
    let sent = send(&router, request).await;
    assert_eq!(sent.status, StatusCode::OK);

    let request = Request::builder()
        .method("POST")
        .uri("/api/proxy")
        .header(header::HOST, EDGE_HOST)
        .header(header::ORIGIN, "null")
        .body(Body::from(body))
        .unwrap();
    let sent = send(&router, request).await;
    assert_eq!(sent.status, StatusCode::FORBIDDEN);
    assert_eq!(upstream.received().len(), 1);
}
