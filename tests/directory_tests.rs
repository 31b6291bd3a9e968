//! HTTP-level tests for the REST task directory against a mock server.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskhub::directory::{
    CategoryChoice, CompletionFilter, Priority, TaskDirectory, TaskDraft, TaskFilter, TaskPatch,
    TaskStats,
};
use taskhub::{ApiClient, ApiError, RestDirectory};

fn task_json(id: u64, title: &str, category: &str, completed: bool) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "completed": completed,
        "category": category,
        "priority": "medium",
        "due_date": null,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
    })
}

fn directory(server: &MockServer) -> RestDirectory {
    let api = ApiClient::new(server.uri()).expect("client builds");
    RestDirectory::new(api)
}

#[tokio::test]
async fn list_returns_tasks_in_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json(2, "newer", "work", false),
            task_json(1, "older", "home", true),
        ])))
        .mount(&server)
        .await;

    let tasks = directory(&server)
        .list(&TaskFilter::default())
        .await
        .expect("list succeeds");

    let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn category_filter_becomes_a_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(query_param("category", "work"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([task_json(1, "write report", "work", false)])),
        )
        .mount(&server)
        .await;

    let filter = TaskFilter {
        category: Some("work".to_string()),
        ..TaskFilter::default()
    };
    let tasks = directory(&server).list(&filter).await.expect("list succeeds");

    let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn completion_filter_becomes_a_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(query_param("completed", "true"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([task_json(2, "water plants", "home", true)])),
        )
        .mount(&server)
        .await;

    let filter = TaskFilter {
        completion: CompletionFilter::Completed,
        ..TaskFilter::default()
    };
    let tasks = directory(&server).list(&filter).await.expect("list succeeds");

    let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn search_filter_becomes_a_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(query_param("search", "wor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([task_json(1, "work on report", "work", false)])),
        )
        .mount(&server)
        .await;

    let filter = TaskFilter {
        search: Some("wor".to_string()),
        ..TaskFilter::default()
    };
    let tasks = directory(&server).list(&filter).await.expect("list succeeds");

    let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn get_of_unknown_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/42/"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})),
        )
        .mount(&server)
        .await;

    let err = directory(&server).get(42).await.expect_err("must fail");

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn create_then_get_round_trips_draft_fields() {
    let server = MockServer::start().await;
    let stored = json!({
        "id": 7,
        "title": "Write report",
        "description": "quarterly numbers",
        "completed": false,
        "category": "work",
        "priority": "high",
        "due_date": "2024-06-01",
        "created_at": "2024-05-20T09:30:00Z",
        "updated_at": "2024-05-20T09:30:00Z",
    });
    Mock::given(method("POST"))
        .and(path("/tasks/"))
        .and(body_json(json!({
            "title": "Write report",
            "description": "quarterly numbers",
            "category": "work",
            "priority": "high",
            "due_date": "2024-06-01",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(stored.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored))
        .mount(&server)
        .await;

    let dir = directory(&server);
    let draft = TaskDraft {
        title: "Write report".to_string(),
        description: "quarterly numbers".to_string(),
        category: CategoryChoice::New("work".to_string()),
        priority: Priority::High,
        due_date: NaiveDate::from_ymd_opt(2024, 6, 1),
    };

    let created = dir.create(draft).await.expect("create succeeds");
    assert_eq!(created.id, 7);
    assert!(!created.completed);
    assert_eq!(created.priority, Priority::High);

    let fetched = dir.get(7).await.expect("get succeeds");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_with_missing_fields_is_a_validation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "title": ["This field is required."],
        })))
        .mount(&server)
        .await;

    let draft = TaskDraft {
        title: String::new(),
        description: String::new(),
        category: CategoryChoice::Existing("work".to_string()),
        priority: Priority::Low,
        due_date: None,
    };
    let err = directory(&server).create(draft).await.expect_err("must fail");

    match err {
        ApiError::Validation(errors) => {
            assert_eq!(
                errors.fields.get("title"),
                Some(&vec!["This field is required.".to_string()])
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn update_sends_only_present_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/3/"))
        .and(body_json(json!({"title": "New title", "category": "home"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(task_json(3, "New title", "home", false)),
        )
        .mount(&server)
        .await;

    let patch = TaskPatch {
        title: Some("New title".to_string()),
        category: Some(CategoryChoice::Existing("home".to_string())),
        ..TaskPatch::default()
    };
    let updated = directory(&server).update(3, patch).await.expect("update succeeds");

    assert_eq!(updated.title, "New title");
    assert_eq!(updated.category, "home");
}

#[tokio::test]
async fn set_completed_sends_a_patch() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/tasks/3/"))
        .and(body_json(json!({"completed": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(3, "c", "work", true)))
        .mount(&server)
        .await;

    let updated = directory(&server)
        .set_completed(3, true)
        .await
        .expect("toggle succeeds");

    assert!(updated.completed);
}

#[tokio::test]
async fn second_remove_of_the_same_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/5/"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/5/"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})),
        )
        .mount(&server)
        .await;

    let dir = directory(&server);
    dir.remove(5).await.expect("first remove succeeds");
    let err = dir.remove(5).await.expect_err("second remove must fail");

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn categories_and_statistics_deserialize() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["work", "home"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/stats/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 5,
            "completed": 2,
            "pending": 3,
            "high_priority": 1,
            "due_soon": 0,
        })))
        .mount(&server)
        .await;

    let dir = directory(&server);
    let categories = dir.categories().await.expect("categories load");
    assert_eq!(categories, ["work", "home"]);

    let stats = dir.statistics().await.expect("stats load");
    assert_eq!(
        stats,
        TaskStats {
            total: 5,
            completed: 2,
            pending: 3,
            high_priority: 1,
            due_soon: 0,
        }
    );
}

#[tokio::test]
async fn installed_credential_is_attached_as_bearer_header() {
    let server = MockServer::start().await;
    // The only mounted mock requires the header; an unauthorized request
    // falls through to wiremock's default 404.
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(header("authorization", "Bearer sekrit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri()).expect("client builds");
    api.set_credential(Some("sekrit".to_string()));
    let dir = RestDirectory::new(api.clone());

    dir.list(&TaskFilter::default())
        .await
        .expect("authorized request matches");

    api.set_credential(None);
    let err = dir
        .list(&TaskFilter::default())
        .await
        .expect_err("header no longer sent");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn transport_failure_is_a_network_error() {
    // Nothing listens on port 1.
    let api = ApiClient::new("http://127.0.0.1:1").expect("client builds");
    let err = RestDirectory::new(api)
        .list(&TaskFilter::default())
        .await
        .expect_err("must fail");

    assert!(matches!(err, ApiError::Network(_)));
}
