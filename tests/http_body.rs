use requests::{RequestBuilder, RequestsError};
use serde::Serialize;
use std::collections::HashMap;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Responds with whatever body was sent
struct EchoBody;

impl Respond for EchoBody {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_bytes(request.body.clone())
    }
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_post_text_body_sent() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/body"))
        .and(body_string("payload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = RequestBuilder::new();
    let resp = req
        .set_url(&format!("{}/body", server.uri()))
        .post_payload("payload")
        .await;
    assert_eq!(resp.status().map(|s| s.as_u16()), Some(200));

    let received = server.received_requests().await.expect("requests");
    assert!(received[0].headers.get("content-type").is_none());
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_form_round_trip_through_echo() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .respond_with(EchoBody)
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = HashMap::new();
    fields.insert("name".to_string(), "Tom & Jerry".to_string());
    fields.insert("age".to_string(), "99".to_string());
    fields.insert("note".to_string(), "a=b;c".to_string());

    let mut req = RequestBuilder::new();
    let mut resp = req
        .set_url(&format!("{}/echo", server.uri()))
        .post_payload(fields.clone())
        .await;

    let echoed = resp.bytes().await.expect("echoed body");
    let decoded: HashMap<String, String> =
        serde_urlencoded::from_bytes(echoed).expect("form decodes");
    assert_eq!(decoded, fields);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_post_json_sets_content_type() {
    if !can_bind_localhost() {
        return;
    }

    #[derive(Serialize)]
    struct Login {
        user: String,
        remember: bool,
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"user": "tom", "remember": true})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = RequestBuilder::new();
    let resp = req
        .set_url(&format!("{}/login", server.uri()))
        .post_json(&Login {
            user: "tom".to_string(),
            remember: true,
        })
        .await;
    assert_eq!(resp.status().map(|s| s.as_u16()), Some(201));
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_explicit_content_type_wins() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(header("content-type", "application/vnd.custom+json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = RequestBuilder::new();
    let resp = req
        .set_url(&server.uri())
        .set_header("Content-Type", "application/vnd.custom+json")
        .put_payload(serde_json::json!({"id": 1}))
        .await;
    assert_eq!(resp.status().map(|s| s.as_u16()), Some(204));
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_post_drops_query_string() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/write"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut req = RequestBuilder::new();
    let resp = req
        .set_url(&format!("{}/write", server.uri()))
        .set_query([("ignored", "yes")])
        .post_payload("data")
        .await;
    assert!(resp.error().is_none());

    let received = server.received_requests().await.expect("requests");
    assert_eq!(received[0].url.query(), None);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_body_is_sent_once() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(EchoBody)
        .mount(&server)
        .await;

    let mut req = RequestBuilder::new();
    req.set_url(&server.uri()).set_payload("only once");

    let mut first = req.post().await;
    let mut second = req.post().await;
    assert_eq!(first.bytes().await, Some(&b"only once"[..]));
    assert_eq!(second.bytes().await, Some(&b""[..]));
}

#[tokio::test]
async fn test_unencodable_json_never_reaches_network() {
    let mut weird = HashMap::new();
    weird.insert((1, 2), "tuple keys");

    let mut req = RequestBuilder::new();
    let resp = req
        .set_url("http://127.0.0.1:9/unreachable")
        .post_json(&weird)
        .await;
    assert!(matches!(
        resp.error(),
        Some(RequestsError::Config(requests::ConfigError::PayloadEncoding(_)))
    ));
}
