use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeOptions {
    pub auto_close: bool,
    pub timeout_ms: u64,
}

impl NoticeOptions {
    pub fn auto_close(timeout_ms: u64) -> Self {
        Self {
            auto_close: true,
            timeout_ms,
        }
    }
}

/// Notification surface exposed by the UI layer.
///
/// The offline banner communicates lost connectivity; the sync banner takes
/// priority over it while a pass is running. Emission failures are logged by
/// callers, never propagated; users are never shown raw errors.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        message: &str,
        kind: NoticeKind,
        options: NoticeOptions,
    ) -> Result<(), String>;
    fn show_offline_banner(&self, on_capture_page: bool) -> Result<(), String>;
    fn hide_offline_banner(&self) -> Result<(), String>;
    fn show_sync_banner(&self) -> Result<(), String>;
    fn hide_sync_banner(&self) -> Result<(), String>;
}
