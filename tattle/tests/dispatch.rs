use redis::AsyncCommands;
use tattle::{Config, FailureRecord, Target};
use tattle_notifiers::notifiers::{
    governator::{GovernatorConfig, NotifyError},
    redis_queue::{QueueConfig, QueueError},
};
use wiremock::{
    matchers::{body_string, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn config(redis_uri: &str, governator_uri: String) -> Config {
    Config {
        exit_code: 137,
        index_prefix: String::from("metric:tattle"),
        elapsed_time: 0,
        target: Target::Service {
            application_name: String::from("my-app"),
            service_name: String::from("worker-1"),
        },
        queue: QueueConfig {
            uri: redis_uri.to_string(),
            queue: String::from("tattles"),
        },
        governator: GovernatorConfig {
            uri: governator_uri,
        },
    }
}

#[tokio::test]
async fn unreachable_queue_does_not_stop_the_notification() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cancellations"))
        .and(body_string(
            "applicationName=my-app&exitCode=137&serviceName=worker-1",
        ))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(
        "redis://127.0.0.1:1",
        format!("{}/cancellations", server.uri()),
    );

    let err = tattle::tattle(&config).await.unwrap_err();

    assert!(matches!(err.queue, Some(QueueError::Connection(_))), "{err:?}");
    assert!(err.notification.is_none(), "{err:?}");
    assert!(err.to_string().starts_with("queue error: unable to connect to redis"));
}

#[tokio::test]
async fn both_failures_are_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = config("not a redis uri", server.uri());

    let err = tattle::tattle(&config).await.unwrap_err();

    assert!(matches!(err.queue, Some(QueueError::Connection(_))), "{err:?}");
    assert!(
        matches!(err.notification, Some(NotifyError::Rejected { status: 200 })),
        "{err:?}"
    );

    let message = err.to_string();
    let lines: Vec<_> = message.lines().collect();
    assert_eq!(lines.len(), 2, "{message}");
    assert!(lines[0].starts_with("queue error: "));
    assert_eq!(lines[1], "notification error: cancellation failed with code '200'");
}

/// Needs a live redis, e.g. `TATTLE_TEST_REDIS_URI=redis://127.0.0.1:6379`.
#[tokio::test]
#[ignore]
async fn delivers_to_a_live_redis() {
    let redis_uri = std::env::var("TATTLE_TEST_REDIS_URI")
        .unwrap_or_else(|_| String::from("redis://127.0.0.1:6379"));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let queue = format!("tattle-test-{}", std::process::id());
    let mut config = config(&redis_uri, server.uri());
    config.queue.queue = queue.clone();

    tattle::tattle(&config).await.unwrap();

    let client = redis::Client::open(redis_uri.as_str()).unwrap();
    let mut conn = client.get_async_connection().await.unwrap();
    let pushed: String = conn.rpop(&queue, None).await.unwrap();

    let record: FailureRecord = serde_json::from_str(&pushed).unwrap();
    assert!(record.index.starts_with("metric:tattle-"));
    assert_eq!(record.body.request.metadata.job_type, "my-app");
    assert_eq!(record.body.request.metadata.worker_name, "worker-1");
    assert_eq!(record.body.response.metadata.code, 137);
}
