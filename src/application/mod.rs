pub mod download_controller;
pub mod notifications;
pub mod state;

pub use download_controller::{BusyCheck, DownloadController, Effect};
pub use notifications::{Notification, NotificationId, NotificationKind};
pub use state::{FileStatus, StatusTone, UiState};
