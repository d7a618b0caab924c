use std::sync::Arc;
use std::time::Duration;

use fittrack_cli::api::{find_api_error, ApiClient, ApiError, ResponseCache, RetryConfig};
use fittrack_cli::calendar::{month_grid_range, MonthRef};
use fittrack_cli::config::Config;
use fittrack_cli::models::{NewCalendarTask, TaskType};
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        initial_delay_ms: 1,
        max_delay_ms: 5,
        backoff_factor: 2.0,
    }
}

fn client_for(server: &Server) -> ApiClient {
    let mut config = Config::default();
    config.api.base_url = server.url();
    let cache = Arc::new(ResponseCache::new(Duration::from_secs(60)));
    ApiClient::with_parts(&config, fast_retry(), cache).unwrap()
}

const SCORE_BODY: &str =
    r#"{"success":true,"data":{"totalPoints":420,"level":3,"pointsToNextLevel":80}}"#;

#[tokio::test]
async fn test_envelope_is_unwrapped_and_token_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/user/score")
        .match_header("authorization", "Bearer secret-token")
        .with_header("content-type", "application/json")
        .with_body(SCORE_BODY)
        .create_async()
        .await;

    let client = client_for(&server);
    client.set_token(Some("secret-token".to_string())).await;

    let score = client.score().await.unwrap();
    assert_eq!(score.total_points, 420);
    assert_eq!(score.level, 3);
    assert_eq!(score.level_progress_percentage(), 84);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cached_reads_hit_the_server_once() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/user/score")
        .with_body(SCORE_BODY)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    client.score().await.unwrap();
    client.score().await.unwrap();

    assert_eq!(client.cache().stats().hits, 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_calendar_month_is_requested_by_range() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/calendar/tasks")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("from".into(), "2024-03-01".into()),
            Matcher::UrlEncoded("to".into(), "2024-03-31".into()),
        ]))
        .with_body(
            r#"{"success":true,"data":[
                {"id":"t1","title":"Intervals","taskType":"workout","date":"2024-03-05","completed":true},
                {"id":"t2","title":"Stretch","taskType":"goal_reminder","date":"2024-03-05"}
            ]}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let tasks = client
        .calendar_tasks(MonthRef::new(2024, 3).unwrap())
        .await
        .unwrap();

    assert_eq!(tasks.len(), 2);
    assert!(tasks[0].completed);
    assert!(!tasks[1].completed);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_grid_range_fetches_each_month_it_touches() {
    let mut server = Server::new_async().await;
    let mut mocks = Vec::new();
    for (from, to, body) in [
        (
            "2024-02-01",
            "2024-02-29",
            r#"[{"id":"feb-10","title":"Old","taskType":"workout","date":"2024-02-10"},
                {"id":"feb-26","title":"Lead","taskType":"workout","date":"2024-02-26"}]"#,
        ),
        (
            "2024-03-01",
            "2024-03-31",
            r#"[{"id":"mar-15","title":"Mid","taskType":"workout","date":"2024-03-15"}]"#,
        ),
        (
            "2024-04-01",
            "2024-04-30",
            r#"[{"id":"apr-07","title":"Tail","taskType":"workout","date":"2024-04-07"},
                {"id":"apr-08","title":"Past grid","taskType":"workout","date":"2024-04-08"}]"#,
        ),
    ] {
        let mock = server
            .mock("GET", "/api/calendar/tasks")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("from".into(), from.into()),
                Matcher::UrlEncoded("to".into(), to.into()),
            ]))
            .with_body(format!(r#"{{"success":true,"data":{}}}"#, body))
            .expect(1)
            .create_async()
            .await;
        mocks.push(mock);
    }

    let client = client_for(&server);
    let (first, last) = month_grid_range(MonthRef::new(2024, 3).unwrap());
    let tasks = client.calendar_tasks_between(first, last).await.unwrap();

    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["feb-26", "mar-15", "apr-07"]);
    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_creating_a_task_refreshes_the_month() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/api/calendar/tasks")
        .match_query(Matcher::Any)
        .with_body(r#"{"success":true,"data":[]}"#)
        .expect(2)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/calendar/tasks")
        .match_body(Matcher::PartialJsonString(
            r#"{"title":"Rest","taskType":"rest_day","date":"2024-03-10"}"#.to_string(),
        ))
        .with_status(201)
        .with_body(
            r#"{"success":true,"data":{"id":"t9","title":"Rest","taskType":"rest_day","date":"2024-03-10"}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let month = MonthRef::new(2024, 3).unwrap();
    client.calendar_tasks(month).await.unwrap();
    client.calendar_tasks(month).await.unwrap();

    let task = client
        .create_calendar_task(&NewCalendarTask {
            title: "Rest".to_string(),
            task_type: TaskType::RestDay,
            date: "2024-03-10".to_string(),
            time: None,
            workout_id: None,
            goal_id: None,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(task.id, "t9");

    // The cached month was dropped, so this goes back to the server
    client.calendar_tasks(month).await.unwrap();

    create.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/user/score")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.score().await.unwrap_err();

    assert!(matches!(
        find_api_error(&err),
        Some(ApiError::Server { status: 503, .. })
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/workouts/missing")
        .with_status(404)
        .with_body(r#"{"success":false,"message":"Workout not found"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.workout("missing").await.unwrap_err();

    match find_api_error(&err) {
        Some(ApiError::NotFound(msg)) => assert_eq!(msg, "Workout not found"),
        other => panic!("unexpected {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unsuccessful_envelope_on_ok_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/challenges/c1/join")
        .with_body(r#"{"success":false,"message":"Challenge is full"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.join_challenge("c1").await.unwrap_err();

    assert!(matches!(find_api_error(&err), Some(ApiError::Rejected(m)) if m == "Challenge is full"));
}

#[tokio::test]
async fn test_validation_errors_map_to_fields() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/register")
        .with_status(422)
        .with_body(
            r#"{"success":false,"message":"Invalid input","errors":{"email":["Email is already registered"]}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let request = fittrack_cli::api::RegisterRequest {
        username: "runner42".to_string(),
        email: "runner@example.com".to_string(),
        password: "Secret123".to_string(),
        first_name: None,
        last_name: None,
    };
    let err = client.register(&request).await.unwrap_err();

    match find_api_error(&err) {
        Some(ApiError::Validation { errors, .. }) => {
            assert_eq!(
                errors.field("email").to_vec(),
                vec!["Email is already registered".to_string()]
            );
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let mut config = Config::default();
    // Nothing listens on the discard port
    config.api.base_url = "http://127.0.0.1:9".to_string();
    let cache = Arc::new(ResponseCache::new(Duration::from_secs(60)));
    let client = ApiClient::with_parts(&config, RetryConfig::none(), cache).unwrap();

    let err = client.score().await.unwrap_err();
    assert!(find_api_error(&err).map_or(false, ApiError::is_network));
}
