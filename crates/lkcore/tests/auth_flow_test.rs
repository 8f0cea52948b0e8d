//! Integration tests for the authorization sequence
//!
//! Run with: cargo test --test auth_flow_test

mod common;

use async_trait::async_trait;
use common::{ManualClock, ReadyFlag, RecordingView};
use lkcore::storage::{MemoryStore, ProfileCache, ProfileSnapshot, Restaurant};
use lkcore::telegram::{AuthConfig, AuthOrchestrator, AuthOutcome, AuthService, TelegramUser, WebhookClient};
use lkcore::{AppError, AppResult};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Script {
    Answer(Value),
    Fail,
    Panic,
}

struct ScriptedService {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedService {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthService for ScriptedService {
    async fn authorize(&self, _user: &TelegramUser) -> AppResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Answer(value) => Ok(value.clone()),
            Script::Fail => Err(AppError::Validation("connection reset".into())),
            Script::Panic => panic!("webhook exploded"),
        }
    }

    async fn send_qr_data(&self, _qr_data: &str, _user: &TelegramUser) -> AppResult<()> {
        Ok(())
    }
}

const NOW: i64 = 1_700_000_000_000;

struct Harness {
    view: Arc<RecordingView>,
    cache: ProfileCache,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new() -> Self {
        let clock = ManualClock::at(NOW);
        Self {
            view: RecordingView::new(),
            cache: ProfileCache::with_clock(Arc::new(MemoryStore::new()), clock.clone()),
            clock,
        }
    }

    fn orchestrator(&self, service: Option<Arc<dyn AuthService>>, config: AuthConfig) -> AuthOrchestrator {
        AuthOrchestrator::new(service, self.cache.clone(), self.view.binding(), config)
    }
}

fn record_for(id: Value) -> Value {
    json!([{
        "id": id,
        "name": "Анна",
        "last_name": "Иванова",
        "phone": 79991234567_i64,
        "restaurants": "[{\"id\":1,\"name\":\"Cafe A\"},{\"id\":0,\"name\":\"Broken\"}]"
    }])
}

#[tokio::test]
async fn test_missing_user_id_skips_without_loading() {
    let harness = Harness::new();
    let service = ScriptedService::new(Script::Fail);
    let orchestrator = harness.orchestrator(Some(service.clone()), AuthConfig::immediate());
    let ready = ReadyFlag::default();

    let outcome = orchestrator.authorize(&TelegramUser::default(), || ready.fire()).await;

    assert_eq!(outcome, AuthOutcome::Skipped);
    assert_eq!(ready.calls(), 1);
    assert_eq!(harness.view.count("loading:"), 0);
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_zero_user_id_is_treated_as_missing() {
    let harness = Harness::new();
    let service = ScriptedService::new(Script::Answer(record_for(json!(0))));
    let orchestrator = harness.orchestrator(Some(service.clone()), AuthConfig::immediate());
    let ready = ReadyFlag::default();

    let outcome = orchestrator.authorize(&TelegramUser::with_id(0), || ready.fire()).await;

    assert_eq!(outcome, AuthOutcome::Skipped);
    assert_eq!(ready.calls(), 1);
    assert_eq!(harness.view.count("loading:"), 0);
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_cache_hit_skips_network() {
    let harness = Harness::new();
    harness.cache.save(&ProfileSnapshot::new(
        "Анна Иванова",
        Some("79991234567".into()),
        vec![Restaurant {
            id: "1".into(),
            name: "Cafe A".into(),
        }],
    ));
    let service = ScriptedService::new(Script::Fail);
    let orchestrator = harness.orchestrator(Some(service.clone()), AuthConfig::immediate());
    let ready = ReadyFlag::default();

    let outcome = orchestrator.authorize(&TelegramUser::with_id(42), || ready.fire()).await;

    assert_eq!(outcome, AuthOutcome::CacheHit);
    assert_eq!(service.calls(), 0);
    assert_eq!(ready.calls(), 1);
    assert_eq!(harness.view.last("full_name:").as_deref(), Some("full_name:Анна Иванова"));
    assert_eq!(harness.view.last("greeting:").as_deref(), Some("greeting:Анна"));
    assert_eq!(harness.view.last("phone:").as_deref(), Some("phone:+7 (999)-123-45-67"));
    assert_eq!(harness.view.last("restaurants:").as_deref(), Some("restaurants:Cafe A"));
}

#[tokio::test(start_paused = true)]
async fn test_cache_hit_has_no_pacing_delay() {
    let harness = Harness::new();
    harness.cache.save(&ProfileSnapshot::new("Анна", None, vec![]));
    let orchestrator = harness.orchestrator(None, AuthConfig::default());

    let started = tokio::time::Instant::now();
    let outcome = orchestrator.authorize(&TelegramUser::with_id(42), || {}).await;

    assert_eq!(outcome, AuthOutcome::CacheHit);
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn test_stale_cache_goes_to_network_and_resolves() {
    let harness = Harness::new();
    harness.cache.save(&ProfileSnapshot::new("Старое Имя", None, vec![]));
    harness.clock.advance(lkcore::config::cache::TTL_MS + 1);

    let service = ScriptedService::new(Script::Answer(record_for(json!("42"))));
    let orchestrator = harness.orchestrator(Some(service.clone()), AuthConfig::immediate());
    let ready = ReadyFlag::default();

    let outcome = orchestrator.authorize(&TelegramUser::with_id(42), || ready.fire()).await;

    assert_eq!(outcome, AuthOutcome::Resolved);
    assert_eq!(service.calls(), 1);
    assert_eq!(ready.calls(), 1);

    let cached = harness.cache.load().expect("profile should be cached");
    assert_eq!(cached.full_name, "Анна Иванова");
    assert_eq!(cached.phone.as_deref(), Some("79991234567"));
    assert_eq!(cached.timestamp, NOW + lkcore::config::cache::TTL_MS + 1);
    assert_eq!(
        cached.restaurants,
        vec![Restaurant {
            id: "1".into(),
            name: "Cafe A".into()
        }]
    );
    assert_eq!(harness.view.last("share_contact:").as_deref(), Some("share_contact:false"));
}

#[tokio::test]
async fn test_numeric_id_matches_as_string() {
    let harness = Harness::new();
    let service = ScriptedService::new(Script::Answer(record_for(json!(42))));
    let orchestrator = harness.orchestrator(Some(service), AuthConfig::immediate());

    let outcome = orchestrator.authorize(&TelegramUser::with_id(42), || {}).await;

    assert_eq!(outcome, AuthOutcome::Resolved);
}

#[tokio::test]
async fn test_unmatched_record_is_not_cached() {
    let harness = Harness::new();
    let service = ScriptedService::new(Script::Answer(record_for(json!("7"))));
    let orchestrator = harness.orchestrator(Some(service), AuthConfig::immediate());
    let ready = ReadyFlag::default();

    let outcome = orchestrator.authorize(&TelegramUser::with_id(42), || ready.fire()).await;

    assert_eq!(outcome, AuthOutcome::NotFound);
    assert_eq!(ready.calls(), 1);
    assert!(harness.cache.load().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_network_error_still_completes_after_pacing() {
    let harness = Harness::new();
    let service = ScriptedService::new(Script::Fail);
    let orchestrator = harness.orchestrator(Some(service), AuthConfig::default());
    let ready = ReadyFlag::default();

    let started = tokio::time::Instant::now();
    let outcome = orchestrator.authorize(&TelegramUser::with_id(42), || ready.fire()).await;

    assert_eq!(outcome, AuthOutcome::Failed);
    assert_eq!(ready.calls(), 1);
    assert!(started.elapsed() >= Duration::from_millis(2000));
    assert_eq!(harness.view.count("loading:show"), 1);
    assert_eq!(harness.view.count("loading:hide"), 1);
}

#[tokio::test]
async fn test_panic_is_contained() {
    let harness = Harness::new();
    let service = ScriptedService::new(Script::Panic);
    let orchestrator = harness.orchestrator(Some(service), AuthConfig::immediate());
    let ready = ReadyFlag::default();

    let outcome = orchestrator.authorize(&TelegramUser::with_id(42), || ready.fire()).await;

    assert_eq!(outcome, AuthOutcome::Failed);
    assert_eq!(ready.calls(), 1);
    assert_eq!(harness.view.count("loading:hide"), 1);
}

#[tokio::test]
async fn test_missing_service_completes() {
    let harness = Harness::new();
    let orchestrator = harness.orchestrator(None, AuthConfig::immediate());
    let ready = ReadyFlag::default();

    let outcome = orchestrator.authorize(&TelegramUser::with_id(42), || ready.fire()).await;

    assert_eq!(outcome, AuthOutcome::ServiceUnavailable);
    assert_eq!(ready.calls(), 1);
}

#[tokio::test]
async fn test_loading_hidden_before_ready_callback() {
    let harness = Harness::new();
    let service = ScriptedService::new(Script::Fail);
    let orchestrator = harness.orchestrator(Some(service), AuthConfig::immediate());
    let recorder = harness.view.recorder.clone();

    orchestrator
        .authorize(&TelegramUser::with_id(42), || recorder.push("ready"))
        .await;

    let events = harness.view.recorder.events();
    assert_eq!(events.first().map(String::as_str), Some("loading:show"));
    assert_eq!(&events[events.len() - 2..], &["loading:hide".to_string(), "ready".to_string()]);
}

#[tokio::test]
async fn test_end_to_end_with_webhook() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    let encoded = serde_json::to_string(&record_for(json!("42"))).unwrap();
    Mock::given(method("POST"))
        .and(path("/webhook/lk-ps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "json": encoded })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WebhookClient::new(format!("{}/webhook/lk-ps", server.uri())).unwrap();
    let harness = Harness::new();
    let orchestrator = harness.orchestrator(Some(Arc::new(client)), AuthConfig::immediate());

    let outcome = orchestrator.authorize(&TelegramUser::with_id(42), || {}).await;

    assert_eq!(outcome, AuthOutcome::Resolved);
    assert_eq!(harness.cache.load().map(|p| p.full_name).as_deref(), Some("Анна Иванова"));
}

#[tokio::test]
async fn test_end_to_end_server_error_is_failure() {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = WebhookClient::new(server.uri()).unwrap();
    let harness = Harness::new();
    let orchestrator = harness.orchestrator(Some(Arc::new(client)), AuthConfig::immediate());
    let ready = ReadyFlag::default();

    let outcome = orchestrator.authorize(&TelegramUser::with_id(42), || ready.fire()).await;

    assert_eq!(outcome, AuthOutcome::Failed);
    assert_eq!(ready.calls(), 1);
}
