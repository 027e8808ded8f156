use requests::RequestBuilder;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_cookies_sent_as_single_header() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cookies"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut req = RequestBuilder::new();
    req.set_url(&format!("{}/cookies", server.uri()))
        .add_cookie("a", "1")
        .add_cookie("b", "2")
        .add_cookie("c", "3")
        .remove_cookie("b");
    let resp = req.get().await;
    assert!(resp.error().is_none());

    let received = server.received_requests().await.expect("requests");
    let cookie_lines: Vec<_> = received[0]
        .headers
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    assert_eq!(cookie_lines, vec!["a=1; c=3"]);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_set_cookie_propagates_to_next_request() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).append_header("Set-Cookie", "SessionId=abc; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("cookie", "SessionId=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = RequestBuilder::new();
    let login = req
        .set_url(&format!("{}/login", server.uri()))
        .post_form([("user", "tom")])
        .await;
    assert_eq!(
        login
            .cookies()
            .and_then(|c| c.get("SessionId").cloned())
            .as_deref(),
        Some("abc")
    );
    login.store_cookies_into(&mut req);

    let mut profile = req
        .set_url(&format!("{}/profile", server.uri()))
        .get()
        .await;
    assert_eq!(profile.text().await.as_deref(), Some("welcome"));
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_cookies_are_not_stored_automatically() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).append_header("Set-Cookie", "auto=1"))
        .mount(&server)
        .await;

    let mut req = RequestBuilder::new();
    req.set_url(&server.uri());
    let _ = req.get().await;
    let _ = req.get().await;

    let received = server.received_requests().await.expect("requests");
    assert_eq!(received.len(), 2);
    assert!(received[1].headers.get("cookie").is_none());
}
