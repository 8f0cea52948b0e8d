//! Terminal implementations of the view, host and camera seams

use async_trait::async_trait;
use lkcore::requests::{FilterField, RequestRow, SortColumn, SortDirection, TableView};
use lkcore::storage::Restaurant;
use lkcore::telegram::{
    Camera, CameraError, CameraStream, ContactResponse, HostBridge, LoadingIndicator, Notifier, PermissionState,
    PopupKind, ProfileView, TelegramUser,
};
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Prints everything the core renders
#[derive(Default)]
pub struct TerminalView;

impl ProfileView for TerminalView {
    fn set_full_name(&self, full_name: &str) {
        println!("👤 {}", full_name);
    }

    fn set_greeting_name(&self, name: &str) {
        println!("👋 {}, {}!", lkcore::profile::greeting_now(), name);
    }

    fn set_phone(&self, phone: &str) {
        println!("📞 {}", phone);
    }

    fn set_share_contact_visible(&self, visible: bool) {
        if visible {
            println!("   (номер не указан: lkps contact, чтобы поделиться контактом)");
        }
    }

    fn set_restaurants(&self, restaurants: &[Restaurant]) {
        if restaurants.is_empty() {
            println!("🏠 Заведений пока нет");
            return;
        }
        println!("🏠 Заведения:");
        for restaurant in restaurants {
            println!("   {} ({})", restaurant.name, restaurant.id);
        }
    }
}

impl LoadingIndicator for TerminalView {
    fn show(&self) {
        eprintln!("⏳ Загрузка...");
    }

    fn hide(&self) {
        log::debug!("Loading indicator hidden");
    }
}

impl Notifier for TerminalView {
    fn notify(&self, kind: PopupKind, message: &str) {
        println!("[{}] {}", kind.title(), message);
    }
}

impl TableView for TerminalView {
    fn render_rows(&self, rows: &[RequestRow]) {
        log::debug!("Rendering {} rows", rows.len());
    }

    fn set_sort_indicator(&self, column: SortColumn, direction: Option<SortDirection>) {
        if let Some(direction) = direction {
            log::debug!("Sorted by {} {}", column, direction);
        }
    }

    fn set_filter_input(&self, field: FilterField, value: &str) {
        log::debug!("Filter {} set to {:?}", field, value);
    }

    fn play_entrance(&self) {}
}

/// Prints the visible rows as a plain table
pub fn print_rows(rows: &[RequestRow]) {
    println!("{:>6}  {:<12}  {:<12}  {}", "№", "Создана", "Выполнена", "Заведение");
    for row in rows {
        println!(
            "{:>6}  {:<12}  {:<12}  {}",
            row.number, row.date_created_display, row.date_completed_display, row.establishment
        );
    }
    println!("Всего: {}", rows.len());
}

/// Host bridge scripted by command-line flags
pub struct TerminalHost {
    user: Option<TelegramUser>,
    contact: Mutex<Option<ContactResponse>>,
    qr_code: Option<String>,
}

impl TerminalHost {
    pub fn new(user: Option<TelegramUser>) -> Self {
        Self {
            user,
            contact: Mutex::new(None),
            qr_code: None,
        }
    }

    #[must_use]
    pub fn with_contact(self, response: ContactResponse) -> Self {
        Self {
            contact: Mutex::new(Some(response)),
            ..self
        }
    }

    #[must_use]
    pub fn with_qr_code(self, code: Option<String>) -> Self {
        Self { qr_code: code, ..self }
    }
}

#[async_trait]
impl HostBridge for TerminalHost {
    fn user(&self) -> Option<TelegramUser> {
        self.user.clone()
    }

    fn supports_contact_request(&self) -> bool {
        self.contact.lock().map(|contact| contact.is_some()).unwrap_or(false)
    }

    async fn request_contact(&self) -> ContactResponse {
        self.contact
            .lock()
            .ok()
            .and_then(|mut contact| contact.take())
            .unwrap_or(ContactResponse::Declined)
    }

    fn supports_qr_popup(&self) -> bool {
        self.qr_code.is_some()
    }

    async fn scan_qr(&self) -> Option<String> {
        self.qr_code.clone()
    }

    fn ready(&self) {
        log::debug!("Host ready");
    }
}

/// "Camera" that decodes one code per stdin line
#[derive(Default)]
pub struct StdinCamera;

#[async_trait]
impl Camera for StdinCamera {
    fn is_supported(&self) -> bool {
        true
    }

    async fn permission(&self) -> Option<PermissionState> {
        Some(PermissionState::Granted)
    }

    async fn confirm_access(&self) -> bool {
        true
    }

    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        println!("📷 Введите содержимое QR-кода (Ctrl+C, чтобы закрыть):");
        Ok(Box::new(StdinStream {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }))
    }
}

struct StdinStream {
    lines: Lines<BufReader<Stdin>>,
}

#[async_trait]
impl CameraStream for StdinStream {
    async fn next_code(&mut self) -> Option<String> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => return Some(line.trim().to_string()),
                Ok(None) => return None,
                Err(e) => {
                    log::error!("❌ Failed to read stdin: {}", e);
                    return None;
                }
            }
        }
    }

    fn stop_tracks(&mut self) {
        log::debug!("Stdin camera closed");
    }
}
