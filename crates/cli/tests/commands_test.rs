//! Command handlers driven against a mock manager API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use strato_cli::cli::{GroupsCommand, SchedulerCommand, SessionStatus};
use strato_cli::commands::{groups, manager, resources, sessions};
use strato_client::{ApiConfig, ApiSession};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn test_session(endpoint: &str, endpoint_type: &str) -> ApiSession {
    ApiSession::connect(&ApiConfig {
        endpoint: endpoint.to_string(),
        endpoint_type: endpoint_type.to_string(),
        access_key: None,
    })
}

#[tokio::test]
async fn group_show_reports_missing_group() {
    let app = Router::new().route(
        "/admin/groups/:gid",
        get(|Path(_gid): Path<String>| async {
            (StatusCode::NOT_FOUND, Json(json!({"error": "no such group"})))
        }),
    );
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    let err = groups::show(&session, "nonexistent-id", false)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "There is no such group.");
}

#[tokio::test]
async fn group_show_tolerates_partial_schema() {
    let app = Router::new().route(
        "/admin/groups/:gid",
        get(|Path(gid): Path<String>| async move {
            // Only a subset of the requested fields is returned.
            Json(json!({"id": gid, "name": "myteam"}))
        }),
    );
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    groups::show(&session, "g-1", false).await.unwrap();
}

#[tokio::test]
async fn groups_list_requires_domain_name() {
    // The validation fires before any request is built.
    let session = test_session("http://127.0.0.1:1", "api");
    let err = groups::list(&session, None, false).await.unwrap_err();
    assert!(err.to_string().contains("-d"));
}

#[tokio::test]
async fn groups_add_sends_active_flag_and_succeeds() {
    let received = Arc::new(Mutex::new(None::<Value>));
    let app = Router::new().route(
        "/admin/groups",
        post({
            let received = received.clone();
            move |Json(body): Json<Value>| {
                let received = received.clone();
                async move {
                    *received.lock().unwrap() = Some(body);
                    Json(json!({
                        "ok": true,
                        "group": {"name": "myteam", "domain_name": "mydomain"},
                    }))
                }
            }
        }),
    );
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    let cmd = GroupsCommand::Add {
        domain_name: "mydomain".to_string(),
        name: "myteam".to_string(),
        description: "desc".to_string(),
        inactive: false,
    };
    groups::run(&session, cmd, false).await.unwrap();

    let body = received.lock().unwrap().take().unwrap();
    assert_eq!(body["domain_name"], "mydomain");
    assert_eq!(body["name"], "myteam");
    assert_eq!(body["description"], "desc");
    assert_eq!(body["is_active"], true);
}

#[tokio::test]
async fn groups_add_failure_carries_server_msg() {
    let app = Router::new().route(
        "/admin/groups",
        post(|| async { Json(json!({"ok": false, "msg": "duplicate group name"})) }),
    );
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    let cmd = GroupsCommand::Add {
        domain_name: "mydomain".to_string(),
        name: "myteam".to_string(),
        description: String::new(),
        inactive: false,
    };
    let err = groups::run(&session, cmd, false).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Group creation has failed: duplicate group name"
    );
}

#[tokio::test]
async fn group_update_omits_unset_fields() {
    let received = Arc::new(Mutex::new(None::<Value>));
    let app = Router::new().route(
        "/admin/groups/:gid",
        post({
            let received = received.clone();
            move |Path(_gid): Path<String>, Json(body): Json<Value>| {
                let received = received.clone();
                async move {
                    *received.lock().unwrap() = Some(body);
                    Json(json!({"ok": true}))
                }
            }
        }),
    );
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    let cmd = GroupsCommand::Update {
        gid: "g-1".to_string(),
        name: Some("renamed".to_string()),
        description: None,
        is_active: None,
    };
    groups::run(&session, cmd, false).await.unwrap();

    let body = received.lock().unwrap().take().unwrap();
    assert_eq!(body["name"], "renamed");
    assert!(body.get("description").is_none());
    assert!(body.get("is_active").is_none());
}

#[tokio::test]
async fn freeze_with_both_flags_makes_no_network_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new().fallback({
        let calls = calls.clone();
        move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Json(json!({}))
            }
        }
    });
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    manager::freeze(&session, true, true, Duration::from_millis(1))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn freeze_wait_polls_until_no_active_sessions() {
    let status_calls = Arc::new(AtomicUsize::new(0));
    let counts = Arc::new(Mutex::new(vec![2u64, 1, 0]));
    let freeze_body = Arc::new(Mutex::new(None::<Value>));

    let app = Router::new()
        .route(
            "/manager/status",
            get({
                let status_calls = status_calls.clone();
                let counts = counts.clone();
                move || {
                    let status_calls = status_calls.clone();
                    let counts = counts.clone();
                    async move {
                        let n = {
                            let mut counts = counts.lock().unwrap();
                            if counts.len() > 1 {
                                counts.remove(0)
                            } else {
                                counts[0]
                            }
                        };
                        status_calls.fetch_add(1, Ordering::SeqCst);
                        Json(json!({"status": "running", "active_sessions": n}))
                    }
                }
            }),
        )
        .route(
            "/manager/freeze",
            post({
                let freeze_body = freeze_body.clone();
                move |Json(body): Json<Value>| {
                    let freeze_body = freeze_body.clone();
                    async move {
                        *freeze_body.lock().unwrap() = Some(body);
                        Json(json!({}))
                    }
                }
            }),
        );
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    manager::freeze(&session, true, false, Duration::from_millis(10))
        .await
        .unwrap();

    assert_eq!(status_calls.load(Ordering::SeqCst), 3);
    let body = freeze_body.lock().unwrap().take().unwrap();
    assert_eq!(body["force_kill"], false);
}

#[tokio::test]
async fn sessions_list_sends_null_filter_for_all() {
    let recorded = Arc::new(Mutex::new(Vec::<Value>::new()));
    let app = Router::new().route(
        "/admin/graphql",
        post({
            let recorded = recorded.clone();
            move |Json(body): Json<Value>| {
                let recorded = recorded.clone();
                async move {
                    recorded.lock().unwrap().push(body);
                    Json(json!({"compute_sessions": []}))
                }
            }
        }),
    );
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    sessions::list(&session, SessionStatus::All, None, false)
        .await
        .unwrap();
    sessions::list(&session, SessionStatus::Running, Some("AKIAEXAMPLE"), false)
        .await
        .unwrap();

    let recorded = recorded.lock().unwrap();
    assert!(recorded[0]["variables"]["status"].is_null());
    assert!(!recorded[0]["query"]
        .as_str()
        .unwrap()
        .contains("access_key"));

    assert_eq!(recorded[1]["variables"]["status"], "RUNNING");
    assert_eq!(recorded[1]["variables"]["ak"], "AKIAEXAMPLE");
    assert!(recorded[1]["query"].as_str().unwrap().contains("access_key:$ak"));
}

#[tokio::test]
async fn session_show_handles_absent_session() {
    let app = Router::new().route(
        "/admin/graphql",
        post(|| async { Json(json!({"compute_session": {"sess_id": null}})) }),
    );
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    // Absence is informational for session detail, not an error.
    sessions::show(&session, "no-such-session", false)
        .await
        .unwrap();
}

#[tokio::test]
async fn get_resources_rejects_non_session_endpoint() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new().fallback({
        let calls = calls.clone();
        move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Json(json!({}))
            }
        }
    });
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    let err = resources::run(&session, "default", "default", false, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("endpoint type must be \"session\""));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn get_resources_prints_report_on_session_endpoint() {
    let app = Router::new().route(
        "/resource/available",
        get(|| async {
            Json(json!({
                "scaling_group_remaining": {"cpu": "12", "mem": "64g"},
                "scaling_groups": {
                    "default": {
                        "using": {"cpu": "4", "mem": "16g"},
                        "remaining": {"cpu": "12", "mem": "64g"},
                    },
                },
                "group_limits": {"cpu": "16", "mem": "80g"},
                "group_using": {"cpu": "4", "mem": "16g"},
                "group_remaining": {"cpu": "12", "mem": "64g"},
            }))
        }),
    );
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "session");

    resources::run(&session, "default", "default", true, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn scheduler_ops_forward_agent_ids() {
    let received = Arc::new(Mutex::new(Vec::<(String, Value)>::new()));
    let app = Router::new().route(
        "/manager/scheduler/:op",
        post({
            let received = received.clone();
            move |Path(op): Path<String>, Json(body): Json<Value>| {
                let received = received.clone();
                async move {
                    received.lock().unwrap().push((op, body));
                    Json(json!({}))
                }
            }
        }),
    );
    let endpoint = serve(app).await;
    let session = test_session(&endpoint, "api");

    let cmd = strato_cli::cli::ManagerCommand::Scheduler(SchedulerCommand::IncludeAgents {
        agent_ids: vec!["agent-1".to_string(), "agent-2".to_string()],
    });
    manager::run(&session, cmd, false).await.unwrap();

    let cmd = strato_cli::cli::ManagerCommand::Scheduler(SchedulerCommand::ExcludeAgents {
        agent_ids: vec!["agent-3".to_string()],
    });
    manager::run(&session, cmd, false).await.unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received[0].0, "include-agents");
    assert_eq!(received[0].1["agent_ids"], json!(["agent-1", "agent-2"]));
    assert_eq!(received[1].0, "exclude-agents");
    assert_eq!(received[1].1["agent_ids"], json!(["agent-3"]));
}

#[tokio::test]
async fn transport_failure_surfaces_as_error() {
    // Nothing is listening on this port.
    let session = test_session("http://127.0.0.1:9", "api");
    let err = groups::show(&session, "g-1", false).await.unwrap_err();
    assert!(!err.to_string().is_empty());
}
