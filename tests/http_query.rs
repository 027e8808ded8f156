use requests::RequestBuilder;
use std::collections::HashMap;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Echoes the `name` and `age` query parameters
struct EchoUser;

impl Respond for EchoUser {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let params: HashMap<String, String> = request.url.query_pairs().into_owned().collect();
        let name = params.get("name").cloned().unwrap_or_default();
        let age = params.get("age").cloned().unwrap_or_default();
        ResponseTemplate::new(200).set_body_string(format!("name={};age={}", name, age))
    }
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_query_params_reach_server() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(EchoUser)
        .expect(1)
        .mount(&server)
        .await;

    let mut params = HashMap::new();
    params.insert("name", "Tom");
    params.insert("age", "99");

    let mut req = RequestBuilder::new();
    let mut resp = req
        .set_url(&format!("{}/user", server.uri()))
        .set_query(params)
        .get()
        .await;
    assert!(resp.error().is_none());
    assert_eq!(resp.text().await.as_deref(), Some("name=Tom;age=99"));
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_query_appends_to_url_params() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = RequestBuilder::new();
    let resp = req
        .set_url(&format!("{}/search?q=rust", server.uri()))
        .set_query([("page", "2")])
        .get()
        .await;
    assert_eq!(resp.status().map(|s| s.as_u16()), Some(200));
}
