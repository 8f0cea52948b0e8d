//! Common test utilities
//!
//! Recording implementations of the view, host and camera traits, shared
//! across all integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use lkcore::requests::{FilterField, RequestRow, SortColumn, SortDirection, TableView};
use lkcore::storage::{Clock, Restaurant};
use lkcore::telegram::{
    Camera, CameraError, CameraStream, ContactResponse, HostBridge, LoadingIndicator, Notifier, PermissionState,
    PopupKind, ProfileView, TelegramUser, ViewBinding,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Every call made into the view, in order
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|event| event.starts_with(prefix)).count()
    }

    pub fn last(&self, prefix: &str) -> Option<String> {
        self.events().into_iter().rev().find(|event| event.starts_with(prefix))
    }
}

pub struct RecordingView {
    pub recorder: Arc<Recorder>,
    pub rendered: Mutex<Vec<Vec<i64>>>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            recorder: Arc::new(Recorder::default()),
            rendered: Mutex::new(Vec::new()),
        })
    }

    pub fn binding(self: &Arc<Self>) -> ViewBinding {
        ViewBinding::new(self.clone(), self.clone(), self.clone(), self.clone())
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.recorder.count(prefix)
    }

    pub fn last(&self, prefix: &str) -> Option<String> {
        self.recorder.last(prefix)
    }

    pub fn last_render(&self) -> Option<Vec<i64>> {
        self.rendered.lock().unwrap().last().cloned()
    }
}

impl ProfileView for RecordingView {
    fn set_full_name(&self, full_name: &str) {
        self.recorder.push(format!("full_name:{}", full_name));
    }

    fn set_greeting_name(&self, name: &str) {
        self.recorder.push(format!("greeting:{}", name));
    }

    fn set_phone(&self, phone: &str) {
        self.recorder.push(format!("phone:{}", phone));
    }

    fn set_share_contact_visible(&self, visible: bool) {
        self.recorder.push(format!("share_contact:{}", visible));
    }

    fn set_restaurants(&self, restaurants: &[Restaurant]) {
        let names: Vec<_> = restaurants.iter().map(|r| r.name.as_str()).collect();
        self.recorder.push(format!("restaurants:{}", names.join(",")));
    }
}

impl LoadingIndicator for RecordingView {
    fn show(&self) {
        self.recorder.push("loading:show");
    }

    fn hide(&self) {
        self.recorder.push("loading:hide");
    }
}

impl Notifier for RecordingView {
    fn notify(&self, kind: PopupKind, message: &str) {
        self.recorder.push(format!("popup:{}:{}", kind.title(), message));
    }
}

impl TableView for RecordingView {
    fn render_rows(&self, rows: &[RequestRow]) {
        self.rendered.lock().unwrap().push(rows.iter().map(|row| row.number).collect());
        self.recorder.push("table:render");
    }

    fn set_sort_indicator(&self, column: SortColumn, direction: Option<SortDirection>) {
        if let Some(direction) = direction {
            self.recorder.push(format!("sort:{}:{}", column, direction));
        }
    }

    fn set_filter_input(&self, field: FilterField, value: &str) {
        self.recorder.push(format!("filter:{}={}", field, value));
    }

    fn play_entrance(&self) {
        self.recorder.push("table:entrance");
    }
}

/// Host whose user and answers are scripted per test
pub struct FakeHost {
    pub users: Mutex<VecDeque<Option<TelegramUser>>>,
    pub fallback_user: Mutex<Option<TelegramUser>>,
    pub contact_supported: bool,
    pub contact_response: Mutex<Option<ContactResponse>>,
    pub qr_popup: bool,
    pub qr_result: Mutex<Option<String>>,
    pub user_reads: AtomicUsize,
}

impl FakeHost {
    pub fn new(user: Option<TelegramUser>) -> Self {
        Self {
            users: Mutex::new(VecDeque::new()),
            fallback_user: Mutex::new(user),
            contact_supported: true,
            contact_response: Mutex::new(None),
            qr_popup: false,
            qr_result: Mutex::new(None),
            user_reads: AtomicUsize::new(0),
        }
    }

    /// Users returned by the next reads, before falling back
    pub fn queue_users(self, users: Vec<Option<TelegramUser>>) -> Self {
        *self.users.lock().unwrap() = users.into();
        self
    }

    pub fn with_contact_response(self, response: ContactResponse) -> Self {
        *self.contact_response.lock().unwrap() = Some(response);
        self
    }

    pub fn with_qr_popup(mut self, result: Option<&str>) -> Self {
        self.qr_popup = true;
        *self.qr_result.lock().unwrap() = result.map(str::to_string);
        self
    }
}

#[async_trait]
impl HostBridge for FakeHost {
    fn user(&self) -> Option<TelegramUser> {
        self.user_reads.fetch_add(1, Ordering::SeqCst);
        if let Some(user) = self.users.lock().unwrap().pop_front() {
            return user;
        }
        self.fallback_user.lock().unwrap().clone()
    }

    fn supports_contact_request(&self) -> bool {
        self.contact_supported
    }

    async fn request_contact(&self) -> ContactResponse {
        self.contact_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or(ContactResponse::Declined)
    }

    fn supports_qr_popup(&self) -> bool {
        self.qr_popup
    }

    async fn scan_qr(&self) -> Option<String> {
        self.qr_result.lock().unwrap().take()
    }

    fn ready(&self) {}
}

/// Camera that yields the scripted codes and counts stopped streams
pub struct FakeCamera {
    pub supported: bool,
    pub permission: Option<PermissionState>,
    pub confirm: bool,
    pub open_error: Option<CameraError>,
    pub code: Option<String>,
    /// Stream never yields; only `close` can end the scan
    pub hang: bool,
    pub opened: AtomicUsize,
    pub stopped: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn with_code(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            ..Self::default()
        }
    }
}

impl Default for FakeCamera {
    fn default() -> Self {
        Self {
            supported: true,
            permission: Some(PermissionState::Granted),
            confirm: true,
            open_error: None,
            code: None,
            hang: false,
            opened: AtomicUsize::new(0),
            stopped: Arc::new(AtomicUsize::new(0)),
        }
    }
}

struct FakeStream {
    code: Option<String>,
    hang: bool,
    stopped: Arc<AtomicUsize>,
}

#[async_trait]
impl CameraStream for FakeStream {
    async fn next_code(&mut self) -> Option<String> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.code.take()
    }

    fn stop_tracks(&mut self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Camera for FakeCamera {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn permission(&self) -> Option<PermissionState> {
        self.permission
    }

    async fn confirm_access(&self) -> bool {
        self.confirm
    }

    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        if let Some(error) = self.open_error.clone() {
            return Err(error);
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            code: self.code.clone(),
            hang: self.hang,
            stopped: self.stopped.clone(),
        }))
    }
}

/// Clock that only moves when told to
#[derive(Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn at(now: i64) -> Arc<Self> {
        Arc::new(Self { now: AtomicI64::new(now) })
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Counts completion callback calls
#[derive(Default)]
pub struct ReadyFlag {
    calls: AtomicUsize,
}

impl ReadyFlag {
    pub fn fire(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
