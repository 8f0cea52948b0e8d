//! QR scanning for adding an establishment
//!
//! The native Telegram scanner is preferred. Without it the device camera
//! is opened and frames are decoded until a code shows up or the user
//! closes the scanner. The camera stream is held by a [`CameraSession`],
//! which stops every track when it goes away, whichever way the scan ends.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use super::api::AuthService;
use super::host::HostBridge;
use super::view::ViewBinding;

/// Why the camera could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("Камера не поддерживается этим браузером или протоколом (нужен https)")]
    Unsupported,

    #[error("Доступ к камере запрещен пользователем")]
    DeclinedByUser,

    #[error("Доступ к камере запрещен. Пожалуйста, разрешите доступ в настройках браузера.")]
    NotAllowed,

    #[error("Камера не найдена или недоступна.")]
    NotFound,

    #[error("Камера занята другим приложением.")]
    NotReadable,

    #[error("Операция была прервана.")]
    Aborted,

    #[error("{0}")]
    Other(String),
}

impl CameraError {
    /// Classifies a media-device error by its DOM exception name
    pub fn from_dom_exception(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" => CameraError::NotAllowed,
            "NotFoundError" | "OverconstrainedError" => CameraError::NotFound,
            "NotReadableError" => CameraError::NotReadable,
            "AbortError" => CameraError::Aborted,
            _ if message.is_empty() => CameraError::Other("Произошла неизвестная ошибка.".to_string()),
            _ => CameraError::Other(message.to_string()),
        }
    }

    pub fn user_message(&self) -> String {
        format!("Не удалось открыть камеру. {}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

/// Device camera
#[async_trait]
pub trait Camera: Send + Sync {
    fn is_supported(&self) -> bool;

    /// `None` when the permission cannot be queried
    async fn permission(&self) -> Option<PermissionState>;

    /// Asks the user to allow access after a denied permission
    async fn confirm_access(&self) -> bool;

    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// Open rear-camera stream with a QR decoder attached
#[async_trait]
pub trait CameraStream: Send {
    /// Next decoded code; `None` when the stream ended
    async fn next_code(&mut self) -> Option<String>;

    fn stop_tracks(&mut self);
}

/// Scoped camera stream: tracks are stopped exactly once, at the latest on drop
pub struct CameraSession {
    stream: Box<dyn CameraStream>,
    stopped: bool,
}

impl CameraSession {
    pub fn new(stream: Box<dyn CameraStream>) -> Self {
        Self { stream, stopped: false }
    }

    pub async fn next_code(&mut self) -> Option<String> {
        if self.stopped {
            return None;
        }
        self.stream.next_code().await
    }

    pub fn close(&mut self) {
        if !self.stopped {
            self.stream.stop_tracks();
            self.stopped = true;
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrOutcome {
    /// Decoded and submitted to the webhook
    Sent(String),
    /// Decoded, but not submitted (no client or the call failed)
    Recognized(String),
    /// Scanner closed without a code
    Cancelled,
    CameraFailed(CameraError),
}

pub struct QrFlow {
    host: Arc<dyn HostBridge>,
    camera: Arc<dyn Camera>,
    service: Option<Arc<dyn AuthService>>,
    view: ViewBinding,
}

impl QrFlow {
    pub fn new(
        host: Arc<dyn HostBridge>,
        camera: Arc<dyn Camera>,
        service: Option<Arc<dyn AuthService>>,
        view: ViewBinding,
    ) -> Self {
        Self {
            host,
            camera,
            service,
            view,
        }
    }

    /// Scans one code; `close` resolves when the user closes the camera view
    pub async fn scan<C>(&self, close: C) -> QrOutcome
    where
        C: Future<Output = ()> + Send,
    {
        if self.host.supports_qr_popup() {
            return match self.host.scan_qr().await.filter(|text| !text.is_empty()) {
                Some(text) => self.handle_result(text).await,
                None => {
                    log::info!("[QR] Telegram scanner closed without a result");
                    QrOutcome::Cancelled
                }
            };
        }

        match self.scan_with_camera(close).await {
            Ok(Some(text)) => self.handle_result(text).await,
            Ok(None) => QrOutcome::Cancelled,
            Err(e) => {
                self.view.error(&e.user_message());
                QrOutcome::CameraFailed(e)
            }
        }
    }

    async fn scan_with_camera<C>(&self, close: C) -> Result<Option<String>, CameraError>
    where
        C: Future<Output = ()> + Send,
    {
        if !self.camera.is_supported() {
            return Err(CameraError::Unsupported);
        }

        let allowed = !matches!(self.camera.permission().await, Some(PermissionState::Denied));
        if !allowed && !self.camera.confirm_access().await {
            return Err(CameraError::DeclinedByUser);
        }

        let mut session = CameraSession::new(self.camera.open().await?);
        log::info!("📷 [QR] Camera opened");

        let code = tokio::select! {
            code = session.next_code() => code,
            () = close => {
                log::info!("[QR] Camera closed by user");
                None
            }
        };

        session.close();
        Ok(code)
    }

    async fn handle_result(&self, text: String) -> QrOutcome {
        log::info!("✅ [QR] Code recognized: {}", text);

        let Some(service) = self.service.as_ref() else {
            self.view.info(&format!("QR-код распознан: {}", text));
            return QrOutcome::Recognized(text);
        };

        let user = self.host.user().unwrap_or_default();
        match service.send_qr_data(&text, &user).await {
            Ok(()) => {
                self.view.info(&format!("QR-код распознан и отправлен: {}", text));
                QrOutcome::Sent(text)
            }
            Err(e) => {
                log::error!("❌ [QR] Failed to send code: {}", e);
                self.view.info(&format!("QR-код распознан: {}", text));
                QrOutcome::Recognized(text)
            }
        }
    }
}
