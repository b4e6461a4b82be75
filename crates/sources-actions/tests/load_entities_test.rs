//! List loading: lifecycle ordering, count side effect, failures and
//! out-of-order responses.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::broadcast::Receiver;

use sources_actions::{OrchestratorConfig, SourcesOrchestrator};
use sources_core::mock::{MockOperation, MockSourcesApi};
use sources_core::{defaults, ApiError, EventEnvelope, LoadOptions, SortDirection, Source};

fn source(id: &str, name: &str) -> Source {
    Source {
        id: id.to_string(),
        name: name.to_string(),
        ..Default::default()
    }
}

fn drain(rx: &mut Receiver<EventEnvelope>) -> Vec<String> {
    let mut types = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        types.push(envelope.event_type);
    }
    types
}

fn orchestrator(api: &MockSourcesApi, config: OrchestratorConfig) -> SourcesOrchestrator {
    SourcesOrchestrator::new(Arc::new(api.clone()), config).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_single_pending_before_resolution() {
    let api = MockSourcesApi::new()
        .with_sources(vec![source("1", "alpha")])
        .with_latency_ms(MockOperation::LoadEntities, 100)
        .with_latency_ms(MockOperation::LoadCount, 100);
    let orchestrator = orchestrator(&api, OrchestratorConfig::default());
    let mut rx = orchestrator.store().subscribe();

    let load = orchestrator.load_entities(LoadOptions::default(), LoadOptions::default());
    let observe = async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        (drain(&mut rx), orchestrator.state())
    };
    let (result, (early_events, early_state)) = tokio::join!(load, observe);

    result.unwrap();
    assert_eq!(early_events, ["LOAD_ENTITIES_PENDING"]);
    assert!(!early_state.loaded);
    assert!(early_state.entities.is_empty());

    let state = orchestrator.state();
    assert!(state.loaded);
    assert_eq!(state.entities.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_count_lands_before_page() {
    let api = MockSourcesApi::new()
        .with_sources(vec![source("1", "alpha"), source("2", "beta")])
        .with_latency_ms(MockOperation::LoadEntities, 100)
        .with_latency_ms(MockOperation::LoadCount, 10);
    let orchestrator = orchestrator(&api, OrchestratorConfig::default());
    let mut rx = orchestrator.store().subscribe();

    let load = orchestrator.load_entities(LoadOptions::default(), LoadOptions::default());
    let observe = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        orchestrator.state()
    };
    let (result, midway) = tokio::join!(load, observe);
    result.unwrap();

    assert_eq!(midway.count, 2);
    assert!(midway.entities.is_empty());
    assert!(!midway.loaded);

    assert_eq!(
        drain(&mut rx),
        ["LOAD_ENTITIES_PENDING", "SET_COUNT", "LOAD_ENTITIES_FULFILLED"]
    );
}

#[tokio::test]
async fn test_pending_options_keep_list_loaded() {
    let api = MockSourcesApi::new();
    let orchestrator = orchestrator(&api, OrchestratorConfig::default());
    let mut rx = orchestrator.store().subscribe();

    orchestrator
        .load_entities(LoadOptions::default(), LoadOptions::loaded())
        .await
        .unwrap();

    let pending = rx.try_recv().unwrap();
    assert_eq!(pending.event_type, "LOAD_ENTITIES_PENDING");
    let payload = serde_json::to_value(&pending.payload).unwrap();
    assert_eq!(payload["options"]["loaded"], true);
}

#[tokio::test]
async fn test_rejection_falls_back_to_data() {
    let api = MockSourcesApi::new().with_failure(
        MockOperation::LoadEntities,
        ApiError::with_data(json!("Gateway timeout")),
    );
    let orchestrator = orchestrator(&api, OrchestratorConfig::default());
    let mut rx = orchestrator.store().subscribe();

    let err = orchestrator
        .load_entities(LoadOptions::default(), LoadOptions::default())
        .await
        .unwrap_err();
    assert!(err.api_error().is_some());

    let state = orchestrator.state();
    let fetching_error = state.fetching_error.unwrap();
    assert_eq!(fetching_error.detail.as_deref(), Some("Gateway timeout"));
    assert_eq!(fetching_error.title, defaults::LOAD_ENTITIES_ERROR_TITLE);
    assert!(state.loaded);
    assert!(state.notifications.is_empty());

    let events = drain(&mut rx);
    assert_eq!(events.first().map(String::as_str), Some("LOAD_ENTITIES_PENDING"));
    assert_eq!(events.last().map(String::as_str), Some("LOAD_ENTITIES_REJECTED"));
    assert!(!events.iter().any(|t| t == "ADD_NOTIFICATION"));
}

#[tokio::test]
async fn test_count_failure_rejects_whole_load() {
    let api = MockSourcesApi::new()
        .with_sources(vec![source("1", "alpha")])
        .with_failure(MockOperation::LoadCount, ApiError::with_detail("count unavailable"));
    let config = OrchestratorConfig {
        load_error_title: "Could not load sources".to_string(),
        ..Default::default()
    };
    let orchestrator = orchestrator(&api, config);

    assert!(orchestrator
        .load_entities(LoadOptions::default(), LoadOptions::default())
        .await
        .is_err());

    let state = orchestrator.state();
    assert!(state.entities.is_empty());
    let fetching_error = state.fetching_error.unwrap();
    assert_eq!(fetching_error.detail.as_deref(), Some("count unavailable"));
    assert_eq!(fetching_error.title, "Could not load sources");
}

#[tokio::test]
async fn test_retry_after_failure_clears_error() {
    let api = MockSourcesApi::new()
        .with_sources(vec![source("1", "alpha")])
        .with_failure(MockOperation::LoadEntities, ApiError::with_detail("down"));
    let orchestrator = orchestrator(&api, OrchestratorConfig::default());

    let _ = orchestrator
        .load_entities(LoadOptions::default(), LoadOptions::default())
        .await;
    assert!(orchestrator.state().fetching_error.is_some());

    api.recover(MockOperation::LoadEntities);
    orchestrator
        .load_entities(LoadOptions::default(), LoadOptions::default())
        .await
        .unwrap();

    let state = orchestrator.state();
    assert!(state.fetching_error.is_none());
    assert_eq!(state.entities.len(), 1);
}

#[tokio::test]
async fn test_sort_and_page_reload_with_new_parameters() {
    let api = MockSourcesApi::new().with_sources(vec![
        source("1", "charlie"),
        source("2", "alpha"),
        source("3", "bravo"),
    ]);
    let orchestrator = orchestrator(&api, OrchestratorConfig::default());

    orchestrator
        .sort_entities("name", SortDirection::Asc)
        .await
        .unwrap();
    let calls = api.get_calls();
    let list_call = calls
        .iter()
        .rev()
        .find(|call| call.operation == MockOperation::LoadEntities)
        .unwrap();
    assert_eq!(list_call.argument, "10:1:name:asc:");
    let names: Vec<_> = orchestrator
        .state()
        .entities
        .iter()
        .map(|s| s.name.clone())
        .collect();
    assert_eq!(names, ["alpha", "bravo", "charlie"]);

    orchestrator.page_and_size(2, 2).await.unwrap();
    let calls = api.get_calls();
    let list_call = calls
        .iter()
        .rev()
        .find(|call| call.operation == MockOperation::LoadEntities)
        .unwrap();
    assert_eq!(list_call.argument, "2:2:name:asc:");

    let state = orchestrator.state();
    assert_eq!(state.entities.len(), 1);
    assert_eq!(state.entities[0].name, "charlie");
    assert_eq!(state.count, 3);
    assert_eq!(api.call_count(MockOperation::LoadEntities), 2);
}

#[tokio::test]
async fn test_filter_applies_on_next_load() {
    let api = MockSourcesApi::new().with_sources(vec![source("1", "aws-prod"), source("2", "azure")]);
    let orchestrator = orchestrator(&api, OrchestratorConfig::default());

    orchestrator.filter_providers("aws");
    assert_eq!(api.call_count(MockOperation::LoadEntities), 0);

    orchestrator
        .load_entities(LoadOptions::default(), LoadOptions::default())
        .await
        .unwrap();

    let state = orchestrator.state();
    assert_eq!(state.count, 1);
    assert_eq!(state.entities[0].id, "1");
    assert_eq!(api.get_calls().last().unwrap().argument, "aws");
}

fn racing_api() -> MockSourcesApi {
    MockSourcesApi::new()
        .with_sources(vec![
            source("1", "slow-a"),
            source("2", "slow-b"),
            source("3", "fast-a"),
        ])
        .with_filter_latency_ms("slow", 100)
        .with_filter_latency_ms("fast", 10)
}

async fn race(orchestrator: &SourcesOrchestrator) {
    orchestrator.filter_providers("slow");
    let first = orchestrator.load_entities(LoadOptions::default(), LoadOptions::default());
    let second = async {
        tokio::task::yield_now().await;
        orchestrator.filter_providers("fast");
        orchestrator
            .load_entities(LoadOptions::default(), LoadOptions::default())
            .await
    };
    let (first, second) = tokio::join!(first, second);
    first.unwrap();
    second.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_dropped() {
    let api = racing_api();
    let orchestrator = orchestrator(&api, OrchestratorConfig::default());
    let mut rx = orchestrator.store().subscribe();

    race(&orchestrator).await;

    let state = orchestrator.state();
    assert_eq!(state.latest_request_seq, 2);
    assert_eq!(state.filter_value, "fast");
    assert_eq!(state.entities.len(), 1);
    assert_eq!(state.entities[0].name, "fast-a");
    assert_eq!(state.count, 1);

    let fulfilled = drain(&mut rx)
        .into_iter()
        .filter(|t| t == "LOAD_ENTITIES_FULFILLED")
        .count();
    assert_eq!(fulfilled, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unguarded_stale_response_overwrites() {
    let api = racing_api();
    let config = OrchestratorConfig {
        guard_stale_responses: false,
        ..Default::default()
    };
    let orchestrator = orchestrator(&api, config);

    race(&orchestrator).await;

    let state = orchestrator.state();
    assert_eq!(state.filter_value, "fast");
    assert_eq!(state.entities.len(), 2);
    assert_eq!(state.count, 2);
}
