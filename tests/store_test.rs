//! Integration tests for the resource stores
//!
//! Exercises the cache-consistency rules against a mock HTTP server:
//! confirmed-before-mutate discipline, in-place updates, shared
//! loading/error flags under out-of-order completion, and teardown
//! cancellation.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use mockito::Server;
use omnia_client::models::{Agent, AgentCreate, AgentType, Task, TaskStatus};
use omnia_client::session::SessionStore;
use omnia_client::{ClientConfig, HttpClient, ResourceStore};
use serial_test::serial;
use tempfile::TempDir;

fn http_for(server: &Server, dir: &TempDir) -> Arc<HttpClient> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let session = Arc::new(SessionStore::new(dir.path()));
    let config = ClientConfig {
        base_url: server.url(),
        api_prefix: "/api".to_string(),
        request_timeout_secs: 5,
        data_dir: dir.path().to_path_buf(),
    };
    Arc::new(HttpClient::new(&config, session).unwrap())
}

fn task_json(id: &str, status: &str) -> String {
    format!(
        r#"{{"id": "{id}", "title": "Task {id}", "description": "d", "agent_id": "a1",
            "status": "{status}", "priority": 1, "created_at": "2025-01-15T10:00:00Z"}}"#
    )
}

fn task_list() -> String {
    format!(
        "[{},{},{}]",
        task_json("t1", "pending"),
        task_json("t2", "running"),
        task_json("t3", "pending")
    )
}

#[tokio::test]
#[serial]
async fn test_cancel_replaces_task_in_place() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store: ResourceStore<Task> = ResourceStore::new(http_for(&server, &dir));

    let list_mock = server
        .mock("GET", "/api/tasks")
        .with_status(200)
        .with_body(task_list())
        .create_async()
        .await;
    let cancel_mock = server
        .mock("DELETE", "/api/tasks/t2")
        .with_status(200)
        .with_body(task_json("t2", "cancelled"))
        .create_async()
        .await;

    store.fetch_all().await.unwrap();
    assert_eq!(store.items().len(), 3);

    let updated = store.cancel("t2").await.unwrap();
    list_mock.assert_async().await;
    cancel_mock.assert_async().await;
    assert_eq!(updated.status, TaskStatus::Cancelled);

    // Only the matching entry changed; length and order are untouched
    let items = store.items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].id, "t1");
    assert_eq!(items[0].status, TaskStatus::Pending);
    assert_eq!(items[1].id, "t2");
    assert_eq!(items[1].status, TaskStatus::Cancelled);
    assert_eq!(items[2].id, "t3");
    assert_eq!(items[2].status, TaskStatus::Pending);
}

#[tokio::test]
#[serial]
async fn test_create_appends_exactly_one_unique_entity() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store: ResourceStore<Agent> = ResourceStore::new(http_for(&server, &dir));

    let list_mock = server
        .mock("GET", "/api/agents")
        .with_status(200)
        .with_body(r#"[{"id": "a1", "name": "Alpha", "type": "cloud", "owner_id": "u1"}]"#)
        .create_async()
        .await;
    let create_mock = server
        .mock("POST", "/api/agents")
        .with_status(200)
        .with_body(r#"{"id": "a2", "name": "Beta", "type": "local", "owner_id": "u1"}"#)
        .create_async()
        .await;

    store.fetch_all().await.unwrap();
    let before = store.items().len();

    let input = AgentCreate {
        name: "Beta".to_string(),
        description: None,
        agent_type: AgentType::Local,
        capabilities: vec![],
        owner_id: "u1".to_string(),
    };
    let created = store.create(&input).await.unwrap();
    list_mock.assert_async().await;
    create_mock.assert_async().await;

    let items = store.items();
    assert_eq!(items.len(), before + 1);
    assert_eq!(items.last().unwrap().id, created.id);
    let unique = items
        .iter()
        .filter(|agent| agent.id == created.id)
        .count();
    assert_eq!(unique, 1);
}

#[tokio::test]
#[serial]
async fn test_create_failure_leaves_cache_and_reports_both_channels() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store: ResourceStore<Agent> = ResourceStore::new(http_for(&server, &dir));

    let mock = server
        .mock("POST", "/api/agents")
        .with_status(400)
        .with_body(r#"{"detail": "limit reached"}"#)
        .create_async()
        .await;

    let input = AgentCreate {
        name: "Over Limit".to_string(),
        description: None,
        agent_type: AgentType::Cloud,
        capabilities: vec![],
        owner_id: "u1".to_string(),
    };
    let err = store.create(&input).await.unwrap_err();
    mock.assert_async().await;

    assert!(store.items().is_empty());
    assert_eq!(err.message, "limit reached");
    assert_eq!(store.error().as_deref(), Some("limit reached"));
    assert!(!store.loading());
}

#[tokio::test]
#[serial]
async fn test_delete_removes_only_after_confirmation() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store: ResourceStore<Agent> = ResourceStore::new(http_for(&server, &dir));

    let list_mock = server
        .mock("GET", "/api/agents")
        .with_status(200)
        .with_body(
            r#"[{"id": "a1", "name": "Alpha", "type": "cloud", "owner_id": "u1"},
                {"id": "a2", "name": "Beta", "type": "local", "owner_id": "u1"}]"#,
        )
        .create_async()
        .await;
    let delete_mock = server
        .mock("DELETE", "/api/agents/a1")
        .with_status(200)
        .with_body(r#"{"id": "a1", "name": "Alpha", "type": "cloud", "owner_id": "u1"}"#)
        .create_async()
        .await;

    store.fetch_all().await.unwrap();
    store.delete("a1").await.unwrap();
    list_mock.assert_async().await;
    delete_mock.assert_async().await;

    let items = store.items();
    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|agent| agent.id != "a1"));
}

#[tokio::test]
#[serial]
async fn test_delete_of_unknown_id_fails() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store: ResourceStore<Agent> = ResourceStore::new(http_for(&server, &dir));

    let mock = server
        .mock("DELETE", "/api/agents/ghost")
        .with_status(404)
        .with_body(r#"{"detail": "Agent not found"}"#)
        .create_async()
        .await;

    let err = store.delete("ghost").await.unwrap_err();
    mock.assert_async().await;
    assert_eq!(err.message, "Agent not found");
    assert_eq!(store.error().as_deref(), Some("Agent not found"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_out_of_order_completion_last_finisher_wins() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store: ResourceStore<Task> = ResourceStore::new(http_for(&server, &dir));

    // fetch_one starts first but its response is held back, so the
    // concurrent fetch_all succeeds before it fails.
    let slow_mock = server
        .mock("GET", "/api/tasks/missing")
        .with_status(404)
        .with_chunked_body(|writer| {
            std::thread::sleep(Duration::from_millis(400));
            writer.write_all(br#"{"detail": "Task not found"}"#)
        })
        .create_async()
        .await;
    let fast_mock = server
        .mock("GET", "/api/tasks")
        .with_status(200)
        .with_body(task_list())
        .create_async()
        .await;

    let (slow, fast) = tokio::join!(store.fetch_one("missing"), store.fetch_all());
    slow_mock.assert_async().await;
    fast_mock.assert_async().await;

    assert!(slow.is_err());
    assert!(fast.is_ok());

    // The fetch_all result landed in the cache, but the store-wide error
    // flag reflects the operation that finished last.
    assert_eq!(store.items().len(), 3);
    assert_eq!(store.error().as_deref(), Some("Task not found"));
    assert!(!store.loading());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_teardown_cancels_in_flight_fetch() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store: Arc<ResourceStore<Task>> = Arc::new(ResourceStore::new(http_for(&server, &dir)));

    let _slow_mock = server
        .mock("GET", "/api/tasks")
        .with_status(200)
        .with_chunked_body(|writer| {
            std::thread::sleep(Duration::from_millis(500));
            writer.write_all(b"[]")
        })
        .create_async()
        .await;

    let fetching = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.fetch_all().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    store.close();

    let result = fetching.await.unwrap();
    let err = result.unwrap_err();
    assert!(err.source.is_cancelled());

    // Teardown applies no state: cache untouched, no error, loading reset
    assert!(store.items().is_empty());
    assert!(store.error().is_none());
    assert!(!store.loading());
}
