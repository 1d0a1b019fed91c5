//! End-to-end tests driving `worker::dispatch` against a real headless
//! Chrome instance, the same way `remix-worker` drives it once requests
//! arrive over the bridge WebSocket. No host process or socket is involved
//! here — these exercise the browser-facing half of the stack directly.

use remix_browser_bridge::bridge::{BridgeMessage, Method};
use remix_browser_bridge::browser::session::BrowserSession;
use remix_browser_bridge::worker::{self, WorkerRuntimeState};
use serde_json::json;
use std::path::PathBuf;

async fn launch_test_session() -> BrowserSession {
    BrowserSession::launch(true)
        .await
        .expect("failed to launch headless Chrome for test")
}

fn fixture_url(name: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = PathBuf::from(manifest_dir).join("tests").join("fixtures").join(name);
    format!("file://{}", path.display())
}

async fn send(
    session: &BrowserSession,
    state: &mut WorkerRuntimeState,
    method: Method,
    payload: serde_json::Value,
) -> serde_json::Value {
    let request = BridgeMessage::request(method, payload, 0);
    let response = worker::dispatch(&request, session, state).await;
    assert_eq!(response.id, request.id, "response id does not correlate to request");
    response.payload
}

/// Extracts the first `@eN` ref token that appears on a snapshot line
/// containing `needle`, e.g. a line like `[@e3 button "Bold"] (unpressed)`.
fn ref_on_line_containing<'a>(snapshot_text: &'a str, needle: &str) -> &'a str {
    let line = snapshot_text
        .lines()
        .find(|l| l.contains(needle))
        .unwrap_or_else(|| panic!("no snapshot line contains {needle:?}:\n{snapshot_text}"));
    line.split_whitespace()
        .find(|tok| tok.starts_with("@e"))
        .unwrap_or_else(|| panic!("line {line:?} has no @eN ref"))
}

#[tokio::test]
async fn navigate_reports_url_and_title() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    let result = send(
        &session,
        &mut state,
        Method::Navigate,
        json!({ "url": fixture_url("basic.html") }),
    )
    .await;

    assert_eq!(result["title"], "Basic Test Page");
    assert!(result["url"].as_str().unwrap().contains("basic.html"));
    assert!(result["tabId"].as_str().is_some());

    session.close().await.unwrap();
}

#[tokio::test]
async fn snapshot_assigns_refs_to_interactive_elements() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("basic.html") })).await;
    let snap = send(&session, &mut state, Method::Snapshot, json!({})).await;

    let text = snap["text"].as_str().unwrap();
    assert!(snap["snapshotId"].as_str().is_some());
    let _ = ref_on_line_containing(text, "A link");

    session.close().await.unwrap();
}

// S1 — click toggles state.
#[tokio::test]
async fn click_toggles_aria_pressed_state() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("toggle.html") })).await;
    let snap = send(&session, &mut state, Method::Snapshot, json!({})).await;
    let snapshot_id = snap["snapshotId"].as_str().unwrap().to_string();
    let text = snap["text"].as_str().unwrap();
    assert!(text.contains("(unpressed)"));
    let ref_ = ref_on_line_containing(text, "Bold").to_string();

    let click_result = send(
        &session,
        &mut state,
        Method::Click,
        json!({ "ref": ref_, "snapshotId": snapshot_id }),
    )
    .await;
    assert_eq!(click_result["success"], true);

    let snap2 = send(&session, &mut state, Method::Snapshot, json!({})).await;
    assert!(snap2["text"].as_str().unwrap().contains("(pressed)"));

    session.close().await.unwrap();
}

// S2 — type into masked input: an `input` listener uppercases the value.
#[tokio::test]
async fn type_text_into_uppercasing_input_leaves_uppercased_value() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("form.html") })).await;
    let snap = send(&session, &mut state, Method::Snapshot, json!({})).await;
    let snapshot_id = snap["snapshotId"].as_str().unwrap().to_string();
    let ref_ = ref_on_line_containing(snap["text"].as_str().unwrap(), "Name").to_string();

    let result = send(
        &session,
        &mut state,
        Method::TypeText,
        json!({ "ref": ref_, "snapshotId": snapshot_id, "text": "hello world" }),
    )
    .await;
    assert_eq!(result["success"], true);

    let page = session.active_page().await.unwrap();
    let value: String = page
        .evaluate("document.getElementById('name').value")
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(value, "HELLO WORLD");

    session.close().await.unwrap();
}

// S3 — disabled optgroup rejects selectOption; underlying value is untouched.
#[tokio::test]
async fn select_option_in_disabled_optgroup_is_rejected() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("form.html") })).await;
    let snap = send(&session, &mut state, Method::Snapshot, json!({})).await;
    let snapshot_id = snap["snapshotId"].as_str().unwrap().to_string();
    let ref_ = ref_on_line_containing(snap["text"].as_str().unwrap(), "Fruit").to_string();

    let result = send(
        &session,
        &mut state,
        Method::SelectOption,
        json!({ "ref": ref_, "snapshotId": snapshot_id, "value": "Cherry" }),
    )
    .await;
    assert_eq!(result["success"], false);
    assert!(result["error"].as_str().unwrap().to_lowercase().contains("disabled"));

    let page = session.active_page().await.unwrap();
    let value: String = page
        .evaluate("document.getElementById('fruit').value")
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(value, "apple", "select value must be unchanged by a rejected option");

    session.close().await.unwrap();
}

// S4 — stale ref after an SPA-style innerHTML swap: the act fails with
// a "not found" style error instead of silently operating on nothing.
#[tokio::test]
async fn click_on_stale_ref_after_dom_swap_fails() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("spa.html") })).await;
    let snap = send(&session, &mut state, Method::Snapshot, json!({})).await;
    let snapshot_id = snap["snapshotId"].as_str().unwrap().to_string();
    let ref_ = ref_on_line_containing(snap["text"].as_str().unwrap(), "Click me").to_string();

    let page = session.active_page().await.unwrap();
    let _: serde_json::Value = page
        .evaluate("document.getElementById('container').innerHTML = '<button id=\"target\">Replaced</button>'")
        .await
        .unwrap()
        .into_value()
        .unwrap_or_default();

    let result = send(
        &session,
        &mut state,
        Method::Click,
        json!({ "ref": ref_, "snapshotId": snapshot_id }),
    )
    .await;
    assert_eq!(result["success"], false);

    session.close().await.unwrap();
}

#[tokio::test]
async fn stale_snapshot_id_is_rejected_without_a_browser_round_trip() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("toggle.html") })).await;
    send(&session, &mut state, Method::Snapshot, json!({})).await;

    let request = BridgeMessage::request(
        Method::Click,
        json!({ "ref": "@e1", "snapshotId": "not-the-current-snapshot" }),
        0,
    );
    let response = worker::dispatch(&request, &session, &mut state).await;
    let err = response.as_bridge_error().expect("expected an error envelope");
    assert_eq!(err.code.to_string(), "STALE_SNAPSHOT");

    session.close().await.unwrap();
}

#[tokio::test]
async fn new_tab_and_list_tabs_round_trip() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    let created = send(&session, &mut state, Method::NewTab, json!({ "url": fixture_url("basic.html") })).await;
    let tab_id = created["tabId"].as_str().unwrap().to_string();

    let listed = send(&session, &mut state, Method::ListTabs, json!({})).await;
    let tabs = listed["tabs"].as_array().unwrap();
    assert!(tabs.iter().any(|t| t["tabId"].as_str() == Some(tab_id.as_str())));

    let closed = send(&session, &mut state, Method::CloseTab, json!({ "tabId": tab_id })).await;
    assert_eq!(closed["closed"], true);

    session.close().await.unwrap();
}

#[tokio::test]
async fn navigation_history_back_and_forward() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("basic.html") })).await;
    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("form.html") })).await;

    let back = send(&session, &mut state, Method::GoBack, json!({})).await;
    assert_eq!(back["title"], "Basic Test Page");

    let forward = send(&session, &mut state, Method::GoForward, json!({})).await;
    assert_eq!(forward["title"], "Form Test Page");

    session.close().await.unwrap();
}

#[tokio::test]
async fn aria_checkbox_reads_checked_state_from_aria_attribute() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("aria_widgets.html") })).await;
    let snap = send(&session, &mut state, Method::Snapshot, json!({})).await;
    let text = snap["text"].as_str().unwrap();

    let line = text
        .lines()
        .find(|l| l.contains("Subscribe"))
        .expect("no snapshot line for the custom checkbox");
    assert!(line.contains("(checked)"), "expected (checked), got: {line}");

    session.close().await.unwrap();
}

#[tokio::test]
async fn nested_interactive_elements_get_refs_in_document_order() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("aria_widgets.html") })).await;
    let snap = send(&session, &mut state, Method::Snapshot, json!({})).await;
    let text = snap["text"].as_str().unwrap();

    let link_ref = ref_on_line_containing(text, "Outer Link");
    let button_ref = ref_on_line_containing(text, "Nested");
    let link_n: u32 = link_ref.trim_start_matches("@e").parse().unwrap();
    let button_n: u32 = button_ref.trim_start_matches("@e").parse().unwrap();
    assert!(
        link_n < button_n,
        "ancestor <a> ({link_ref}) must get a lower ref than its nested <button> ({button_ref})"
    );

    session.close().await.unwrap();
}

#[tokio::test]
async fn heading_text_survives_in_the_compact_snapshot() {
    let session = launch_test_session().await;
    let mut state = WorkerRuntimeState::new();

    send(&session, &mut state, Method::Navigate, json!({ "url": fixture_url("aria_widgets.html") })).await;
    let snap = send(&session, &mut state, Method::Snapshot, json!({})).await;
    let text = snap["text"].as_str().unwrap();

    assert!(
        text.lines().any(|l| l.contains("heading") && l.contains("Page Heading")),
        "expected a heading line for <h1>Page Heading</h1>, got:\n{text}"
    );

    session.close().await.unwrap();
}
