use std::path::Path;
use std::time::Duration;

use poster_engine::{
    GraphPublisher, GraphSettings, ImageSource, PollPolicy, PublishError, Publisher, Step,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT: &str = "17841400";
const TOKEN: &str = "token-abc";

fn settings(server: &MockServer) -> GraphSettings {
    let mut settings = GraphSettings::new(ACCOUNT, TOKEN);
    settings.base_url = format!("{}/v19.0", server.uri());
    settings.poll = PollPolicy {
        max_attempts: 3,
        interval: Duration::from_millis(10),
    };
    settings
}

fn remote(url: &str) -> ImageSource {
    ImageSource::Remote(Url::parse(url).unwrap())
}

async fn mount_create(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(format!("/v19.0/{ACCOUNT}/media")))
        .and(query_param("access_token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v19.0/c-1"))
        .and(query_param("fields", "status_code,status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_wait_publish_returns_media_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v19.0/{ACCOUNT}/media")))
        .and(query_param("image_url", "https://cdn.example.com/a.jpg"))
        .and(query_param("caption", "Hello & welcome"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v19.0/c-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status_code": "IN_PROGRESS"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_status(&server, json!({"status_code": "FINISHED"})).await;
    Mock::given(method("POST"))
        .and(path(format!("/v19.0/{ACCOUNT}/media_publish")))
        .and(query_param("creation_id", "c-1"))
        .and(query_param("access_token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m-99"})))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = GraphPublisher::new(&settings(&server)).unwrap();
    let media_id = publisher
        .publish(&remote("https://cdn.example.com/a.jpg"), "Hello & welcome")
        .await
        .expect("publish ok");
    assert_eq!(media_id, "m-99");
}

#[tokio::test]
async fn create_without_id_is_missing_id() {
    let server = MockServer::start().await;
    mount_create(&server, json!({"ok": true})).await;

    let publisher = GraphPublisher::new(&settings(&server)).unwrap();
    let err = publisher
        .publish(&remote("https://cdn.example.com/a.jpg"), "c")
        .await
        .unwrap_err();
    assert!(
        matches!(err, PublishError::MissingId { step: Step::CreateContainer, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn container_error_status_fails_without_publishing() {
    let server = MockServer::start().await;
    mount_create(&server, json!({"id": "c-1"})).await;
    mount_status(
        &server,
        json!({"status_code": "ERROR", "status": "Error: unsupported image"}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(format!("/v19.0/{ACCOUNT}/media_publish")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m-1"})))
        .expect(0)
        .mount(&server)
        .await;

    let publisher = GraphPublisher::new(&settings(&server)).unwrap();
    let err = publisher
        .publish(&remote("https://cdn.example.com/a.jpg"), "c")
        .await
        .unwrap_err();
    match err {
        PublishError::ContainerFailed {
            container_id,
            message,
        } => {
            assert_eq!(container_id, "c-1");
            assert_eq!(message, "Error: unsupported image");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn container_that_never_finishes_times_out() {
    let server = MockServer::start().await;
    mount_create(&server, json!({"id": "c-1"})).await;
    Mock::given(method("GET"))
        .and(path("/v19.0/c-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status_code": "IN_PROGRESS"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let publisher = GraphPublisher::new(&settings(&server)).unwrap();
    let err = publisher
        .publish(&remote("https://cdn.example.com/a.jpg"), "c")
        .await
        .unwrap_err();
    assert!(
        matches!(err, PublishError::PollTimeout { attempts: 3, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn http_error_keeps_the_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v19.0/{ACCOUNT}/media")))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"error":{"message":"Invalid OAuth access token"}}"#),
        )
        .mount(&server)
        .await;

    let publisher = GraphPublisher::new(&settings(&server)).unwrap();
    let err = publisher
        .publish(&remote("https://cdn.example.com/a.jpg"), "c")
        .await
        .unwrap_err();
    match &err {
        PublishError::Http { step, status, body } => {
            assert_eq!(*step, Step::CreateContainer);
            assert_eq!(*status, 400);
            assert!(body.contains("Invalid OAuth access token"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("Invalid OAuth access token"));
}

#[tokio::test]
async fn local_files_need_a_public_base_url() {
    let server = MockServer::start().await;
    let publisher = GraphPublisher::new(&settings(&server)).unwrap();
    let local = ImageSource::resolve("cat.png", Path::new("images")).unwrap();

    let err = publisher.publish(&local, "c").await.unwrap_err();
    assert!(
        matches!(err, PublishError::LocalSourceUnsupported(ref name) if name == "cat.png"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn local_files_are_served_from_the_public_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v19.0/{ACCOUNT}/media")))
        .and(query_param("image_url", "https://static.example.com/queue/sub/cat.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c-1"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_status(&server, json!({"status_code": "FINISHED"})).await;
    Mock::given(method("POST"))
        .and(path(format!("/v19.0/{ACCOUNT}/media_publish")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4242})))
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.public_base_url = Some(Url::parse("https://static.example.com/queue/").unwrap());
    let publisher = GraphPublisher::new(&settings).unwrap();
    let local = ImageSource::resolve("sub/cat.png", Path::new("images")).unwrap();

    let media_id = publisher.publish(&local, "c").await.unwrap();
    assert_eq!(media_id, "4242");
}
