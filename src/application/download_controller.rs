use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::{
    api::CancelResponse,
    application::{
        notifications::{Notification, NotificationId, NotificationKind, NotificationStack},
        state::{FileStatus, StatusLine, StatusTone, UiState},
    },
    domain::{AppError, DownloadFormat, DownloadRequest, DownloadStatus, JobState, QualityOption},
    utils::{is_valid_youtube_url, meaningful},
};

pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(10);
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

const RESET_AFTER_COMPLETED: Duration = Duration::from_secs(5);
const RESET_AFTER_ERROR: Duration = Duration::from_secs(3);
const RESET_AFTER_CANCELLED: Duration = Duration::from_secs(2);
const RESET_AFTER_IDLE: Duration = Duration::from_secs(2);

const SERVER_BUSY: &str = "Server is busy, wait until the current download finishes";

/// Why a busy check was issued
#[derive(Debug, Clone, PartialEq)]
pub enum BusyCheck {
    Startup,
    Reconcile,
    BeforeStart(DownloadRequest),
}

/// Side effects the shell has to carry out on the controller's behalf
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CheckCookies,
    CheckBusy(BusyCheck),
    SubmitDownload(DownloadRequest),
    FetchStatus { generation: u64 },
    RequestCancel,
    ReadClipboard,
    ConfirmCancel,
    ScheduleReset { session: u64, after: Duration },
    ScheduleDismiss { id: NotificationId, after: Duration },
    CancelDismiss(NotificationId),
}

#[derive(Debug)]
struct PollTimer {
    generation: u64,
    in_flight: bool,
}

/// Mediates between user input, the remote download API and the rendered
/// window. Performs no I/O; every operation returns the effects to run.
#[derive(Debug, Default)]
pub struct DownloadController {
    state: UiState,
    notifications: NotificationStack,
    poll: Option<PollTimer>,
    last_generation: u64,
    // Bumped on every entry into the downloading state. Delayed resets carry
    // the session they were scheduled in.
    session: u64,
}

impl DownloadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Generation of the active poll timer, if one is running.
    pub fn poll_generation(&self) -> Option<u64> {
        self.poll.as_ref().map(|p| p.generation)
    }

    /// Page-load checks: stored cookies and an already running server job.
    pub fn boot(&mut self) -> Vec<Effect> {
        vec![Effect::CheckCookies, Effect::CheckBusy(BusyCheck::Startup)]
    }

    pub fn set_url(&mut self, url: String) {
        self.state.url_input = url;
    }

    pub fn select_format(&mut self, format: DownloadFormat) {
        self.state.format = format;
        if !format.qualities().contains(&self.state.quality) {
            self.state.quality = format.default_quality();
        }
    }

    pub fn select_quality(&mut self, quality: QualityOption) {
        if self.state.format.qualities().contains(&quality) {
            self.state.quality = quality;
        }
    }

    pub fn paste_from_clipboard(&mut self) -> Vec<Effect> {
        vec![Effect::ReadClipboard]
    }

    pub fn clipboard_read(&mut self, contents: Option<String>) -> Vec<Effect> {
        match contents.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => {
                self.state.url_input = text.to_string();
                self.show_notification("URL pasted!", NotificationKind::Success)
            }
            None => {
                warn!("Clipboard was empty or unreadable");
                self.show_notification(AppError::Clipboard.to_string(), NotificationKind::Error)
            }
        }
    }

    pub fn cookies_checked(&mut self, result: Result<bool, String>) -> Vec<Effect> {
        match result {
            Ok(true) => {
                debug!("Server has browser cookies");
                Vec::new()
            }
            Ok(false) => self.show_notification(
                "Browser cookies not found. Age-restricted videos may fail.",
                NotificationKind::Warning,
            ),
            Err(e) => {
                error!("Error checking cookies: {}", e);
                Vec::new()
            }
        }
    }

    pub fn validate_url(url: &str) -> bool {
        is_valid_youtube_url(url)
    }

    /// First gate of a download: the URL. The busy check runs next, and the
    /// remaining gates run once its answer arrives in [`Self::busy_checked`].
    pub fn start_download(&mut self) -> Vec<Effect> {
        let url = self.state.url_input.trim();
        if !Self::validate_url(url) {
            let message = AppError::InvalidInput.to_string();
            return self.show_notification(message, NotificationKind::Error);
        }

        let request = DownloadRequest::new(url, self.state.format, self.state.quality.value);
        vec![Effect::CheckBusy(BusyCheck::BeforeStart(request))]
    }

    pub fn busy_checked(&mut self, check: BusyCheck, result: Result<bool, String>) -> Vec<Effect> {
        match check {
            BusyCheck::BeforeStart(request) => self.submit_if_idle(request, result),
            BusyCheck::Startup => match result {
                Ok(true) if !self.state.is_downloading => {
                    let effects = self.show_notification(SERVER_BUSY, NotificationKind::Warning);
                    self.track_remote_job();
                    effects
                }
                Ok(_) => Vec::new(),
                Err(e) => {
                    error!("Error checking server status: {}", e);
                    Vec::new()
                }
            },
            BusyCheck::Reconcile => match result {
                Ok(true) if !self.state.is_downloading => {
                    info!("Server reports a job this window is not tracking");
                    let effects = self.show_notification(
                        "Server is processing a download...",
                        NotificationKind::Info,
                    );
                    self.track_remote_job();
                    effects
                }
                Ok(_) => Vec::new(),
                Err(e) => {
                    error!("Error checking server status: {}", e);
                    Vec::new()
                }
            },
        }
    }

    fn submit_if_idle(
        &mut self,
        request: DownloadRequest,
        busy: Result<bool, String>,
    ) -> Vec<Effect> {
        match busy {
            Err(e) => {
                error!("Error checking server busy: {}", e);
                self.show_notification("Could not reach the server", NotificationKind::Error)
            }
            Ok(true) => self.show_notification(SERVER_BUSY, NotificationKind::Warning),
            Ok(false) if self.state.is_downloading => self.show_notification(
                "A download is already running, wait or cancel it first",
                NotificationKind::Warning,
            ),
            Ok(false) => {
                info!("Submitting download for {}", request.url);
                self.enter_downloading();
                self.state.status_line = StatusLine::new("Preparing download...", StatusTone::Info);
                self.state.file_status = FileStatus::Starting;
                // Emptied before the request resolves so a double click cannot
                // resubmit the same URL.
                self.state.url_input.clear();
                vec![Effect::SubmitDownload(request)]
            }
        }
    }

    pub fn download_submitted(&mut self, result: Result<(), String>) -> Vec<Effect> {
        match result {
            Ok(()) => {
                // Cancelled before the server's acceptance arrived.
                if !self.state.is_downloading {
                    debug!("Download accepted after cancel, not polling");
                    return Vec::new();
                }
                let effects =
                    self.show_notification("Download started!", NotificationKind::Success);
                self.start_polling();
                effects
            }
            Err(message) => {
                warn!("Download request rejected: {}", message);
                let message = if message.is_empty() {
                    "Something went wrong".to_string()
                } else {
                    message
                };
                let effects = self.show_notification(message, NotificationKind::Error);
                self.reset_ui();
                effects
            }
        }
    }

    pub fn health_tick(&mut self) -> Vec<Effect> {
        if self.state.is_downloading {
            return Vec::new();
        }
        vec![Effect::CheckBusy(BusyCheck::Reconcile)]
    }

    pub fn poll_tick(&mut self, generation: u64) -> Vec<Effect> {
        let is_downloading = self.state.is_downloading;
        let Some(poll) = self.poll.as_mut().filter(|p| p.generation == generation) else {
            return Vec::new();
        };

        if !is_downloading {
            self.stop_polling();
            return Vec::new();
        }

        if poll.in_flight {
            debug!("Status request still pending, skipping tick");
            return Vec::new();
        }

        poll.in_flight = true;
        vec![Effect::FetchStatus { generation }]
    }

    pub fn status_received(
        &mut self,
        generation: u64,
        result: Result<DownloadStatus, String>,
    ) -> Vec<Effect> {
        match self.poll.as_mut() {
            Some(poll) if poll.generation == generation => poll.in_flight = false,
            _ => {
                debug!("Dropping status for stopped poll {}", generation);
                return Vec::new();
            }
        }

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                warn!("Error fetching status: {}", e);
                return Vec::new();
            }
        };

        self.render_status(&status);

        match status.status {
            JobState::Completed => self.finish(
                "Download complete!",
                NotificationKind::Success,
                Some(FileStatus::Done),
                RESET_AFTER_COMPLETED,
            ),
            JobState::Error => {
                let reason = status
                    .error_message
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(status.message.as_str());
                self.finish(
                    format!("Download failed: {}", reason),
                    NotificationKind::Error,
                    Some(FileStatus::Failed),
                    RESET_AFTER_ERROR,
                )
            }
            JobState::Cancelled => self.finish(
                "Download cancelled",
                NotificationKind::Warning,
                Some(FileStatus::Cancelled),
                RESET_AFTER_CANCELLED,
            ),
            JobState::Idle => self.finish(
                "Download finished",
                NotificationKind::Info,
                None,
                RESET_AFTER_IDLE,
            ),
            JobState::Starting | JobState::Downloading | JobState::Unknown => Vec::new(),
        }
    }

    /// Copy a server snapshot into the window, keeping last-known values
    /// where the server only has placeholders.
    pub fn render_status(&mut self, status: &DownloadStatus) {
        let state = &mut self.state;
        state.progress = status.progress.clamp(0.0, 100.0);
        state.progress_text = format!("{:.1}%", state.progress);
        state.progress_message = if status.message.is_empty() {
            "Processing...".to_string()
        } else {
            status.message.clone()
        };

        if let Some(speed) = meaningful(status.speed.as_deref()) {
            state.speed = speed.to_string();
        }
        if let Some(eta) = meaningful(status.eta.as_deref()) {
            state.eta = eta.to_string();
        }
        if let Some(size) = meaningful(status.filesize.as_deref()) {
            state.size = size.to_string();
        }
        if let Some(downloaded) = meaningful(status.downloaded.as_deref()) {
            state.downloaded = downloaded.to_string();
        }

        state.status_line = StatusLine::new(status.message.clone(), status.status.into());

        if let Some(name) = status.filename.as_deref().filter(|n| !n.is_empty()) {
            state.file_name = name.to_string();
        }
        if let Some(file_status) = FileStatus::for_job(status.status) {
            state.file_status = file_status;
        }
    }

    pub fn cancel_download(&mut self) -> Vec<Effect> {
        if !self.state.is_downloading {
            return Vec::new();
        }
        vec![Effect::ConfirmCancel]
    }

    pub fn cancel_confirmed(&mut self, confirmed: bool) -> Vec<Effect> {
        if !confirmed || !self.state.is_downloading {
            return Vec::new();
        }
        vec![Effect::RequestCancel]
    }

    pub fn cancel_finished(&mut self, result: Result<CancelResponse, String>) -> Vec<Effect> {
        match result {
            Ok(response) if response.success => {
                info!("Download cancelled");
                self.stop_polling();
                self.state.is_downloading = false;
                let mut effects =
                    self.show_notification("Download cancelled", NotificationKind::Warning);
                self.state.status_line =
                    StatusLine::new("Download cancelled by user", StatusTone::Cancelled);
                self.state.file_status = FileStatus::Cancelled;
                effects.push(self.schedule_reset(RESET_AFTER_CANCELLED));
                effects
            }
            Ok(response) => self.show_notification(
                response
                    .message
                    .unwrap_or_else(|| "Failed to cancel".to_string()),
                NotificationKind::Error,
            ),
            Err(e) => {
                self.show_notification(format!("Failed to cancel: {}", e), NotificationKind::Error)
            }
        }
    }

    /// A delayed reset fired. Ignored when a newer job started meanwhile.
    pub fn reset_due(&mut self, session: u64) {
        if session == self.session {
            self.reset_ui();
        } else {
            debug!("Skipping reset from session {}, now at {}", session, self.session);
        }
    }

    pub fn reset_ui(&mut self) {
        self.stop_polling();
        self.state.reset();
    }

    /// User clicked the close button.
    pub fn dismiss_notification(&mut self, id: NotificationId) -> Vec<Effect> {
        if self.notifications.remove(id) {
            vec![Effect::CancelDismiss(id)]
        } else {
            Vec::new()
        }
    }

    pub fn notification_expired(&mut self, id: NotificationId) {
        self.notifications.remove(id);
    }

    /// Push a notification and schedule its auto-dismiss. Evicting the oldest
    /// one also cancels its timer.
    pub fn show_notification(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Vec<Effect> {
        let (id, evicted) = self.notifications.push(message, kind);
        let mut effects = Vec::with_capacity(2);
        if let Some(evicted) = evicted {
            effects.push(Effect::CancelDismiss(evicted));
        }
        effects.push(Effect::ScheduleDismiss {
            id,
            after: NOTIFICATION_TTL,
        });
        effects
    }

    fn finish(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        file_status: Option<FileStatus>,
        reset_after: Duration,
    ) -> Vec<Effect> {
        self.stop_polling();
        if let Some(file_status) = file_status {
            self.state.file_status = file_status;
        }
        let mut effects = self.show_notification(message, kind);
        effects.push(self.schedule_reset(reset_after));
        effects
    }

    fn schedule_reset(&self, after: Duration) -> Effect {
        Effect::ScheduleReset {
            session: self.session,
            after,
        }
    }

    fn enter_downloading(&mut self) {
        self.session += 1;
        self.state.show_downloading();
    }

    /// Follow a job this window did not submit.
    fn track_remote_job(&mut self) {
        if self.state.is_downloading {
            return;
        }
        self.enter_downloading();
        self.start_polling();
    }

    /// Replaces any running poll timer with a fresh one.
    fn start_polling(&mut self) {
        self.last_generation += 1;
        if let Some(old) = self.poll.replace(PollTimer {
            generation: self.last_generation,
            in_flight: false,
        }) {
            debug!("Replacing poll timer {}", old.generation);
        }
        info!("Polling status (timer {})", self.last_generation);
    }

    fn stop_polling(&mut self) {
        if let Some(poll) = self.poll.take() {
            debug!("Stopped poll timer {}", poll.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::state::Indicator;

    const URL: &str = "https://youtu.be/abc123";

    fn messages(controller: &DownloadController) -> Vec<String> {
        controller.notifications().map(|n| n.message.clone()).collect()
    }

    fn last_notification(controller: &DownloadController) -> Notification {
        controller.notifications().last().cloned().unwrap()
    }

    fn status(state: JobState) -> DownloadStatus {
        DownloadStatus {
            status: state,
            ..Default::default()
        }
    }

    fn resets(effects: &[Effect]) -> Vec<Duration> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::ScheduleReset { after, .. } => Some(*after),
                _ => None,
            })
            .collect()
    }

    /// Walks a controller through a successful submission and returns the
    /// generation of its poll timer.
    fn downloading(controller: &mut DownloadController) -> u64 {
        controller.set_url(URL.to_string());
        let effects = controller.start_download();
        let Effect::CheckBusy(check) = effects[0].clone() else {
            panic!("expected busy check, got {:?}", effects);
        };
        controller.busy_checked(check, Ok(false));
        controller.download_submitted(Ok(()));
        controller.poll_generation().unwrap()
    }

    #[test]
    fn test_invalid_urls_never_reach_the_server() {
        for input in ["", "   ", "https://vimeo.com/1", "youtube.com/", "not a url", "https://youtube.co/x"] {
            let mut controller = DownloadController::new();
            controller.set_url(input.to_string());
            let effects = controller.start_download();

            assert!(
                effects
                    .iter()
                    .all(|e| !matches!(e, Effect::CheckBusy(_) | Effect::SubmitDownload(_))),
                "{:?} produced {:?}",
                input,
                effects
            );
            assert!(!controller.state().is_downloading);
            assert_eq!(last_notification(&controller).kind, NotificationKind::Error);
        }
    }

    #[test]
    fn test_start_submits_expected_request_and_clears_url() {
        let mut controller = DownloadController::new();
        controller.set_url(URL.to_string());

        let effects = controller.start_download();
        let expected = DownloadRequest {
            url: URL.to_string(),
            format: DownloadFormat::Video,
            quality: "best".to_string(),
            concurrent_fragments: 5,
        };
        assert_eq!(
            effects,
            vec![Effect::CheckBusy(BusyCheck::BeforeStart(expected.clone()))]
        );
        // Nothing changes until the server answers the busy check.
        assert_eq!(controller.state().url_input, URL);

        let effects = controller.busy_checked(BusyCheck::BeforeStart(expected.clone()), Ok(false));
        assert_eq!(effects, vec![Effect::SubmitDownload(expected)]);

        let state = controller.state();
        assert!(state.is_downloading);
        assert!(!state.start_enabled);
        assert!(state.cancel_enabled);
        assert!(state.progress_visible);
        assert!(state.url_input.is_empty());
        assert_eq!(state.indicator, Indicator::Downloading);
        assert_eq!(state.file_status, FileStatus::Starting);
        // Polling only begins once the server accepts.
        assert_eq!(controller.poll_generation(), None);
    }

    #[test]
    fn test_busy_server_blocks_start() {
        let mut controller = DownloadController::new();
        controller.set_url(URL.to_string());
        let request = DownloadRequest::new(URL, DownloadFormat::Video, "best");

        let effects = controller.busy_checked(BusyCheck::BeforeStart(request), Ok(true));

        assert!(!effects.iter().any(|e| matches!(e, Effect::SubmitDownload(_))));
        assert_eq!(last_notification(&controller).kind, NotificationKind::Warning);
        assert!(!controller.state().is_downloading);
        assert_eq!(controller.state().url_input, URL);
    }

    #[test]
    fn test_unreachable_server_blocks_start() {
        let mut controller = DownloadController::new();
        let request = DownloadRequest::new(URL, DownloadFormat::Video, "best");

        let effects =
            controller.busy_checked(BusyCheck::BeforeStart(request), Err("connection refused".into()));

        assert!(!effects.iter().any(|e| matches!(e, Effect::SubmitDownload(_))));
        assert_eq!(last_notification(&controller).kind, NotificationKind::Error);
    }

    #[test]
    fn test_local_download_blocks_second_start() {
        let mut controller = DownloadController::new();
        downloading(&mut controller);

        let request = DownloadRequest::new(URL, DownloadFormat::Video, "best");
        let effects = controller.busy_checked(BusyCheck::BeforeStart(request), Ok(false));

        assert!(!effects.iter().any(|e| matches!(e, Effect::SubmitDownload(_))));
        let note = last_notification(&controller);
        assert_eq!(note.kind, NotificationKind::Warning);
        assert!(note.message.contains("already running"));
    }

    #[test]
    fn test_rejected_submission_resets_everything() {
        let mut controller = DownloadController::new();
        controller.set_url(URL.to_string());
        let request = DownloadRequest::new(URL, DownloadFormat::Video, "best");
        controller.busy_checked(BusyCheck::BeforeStart(request), Ok(false));

        controller.download_submitted(Err("Invalid YouTube URL".to_string()));

        assert_eq!(controller.state(), &UiState::default());
        assert_eq!(controller.poll_generation(), None);
        let note = last_notification(&controller);
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, "Invalid YouTube URL");
    }

    #[test]
    fn test_busy_server_at_startup_is_tracked_without_submitting() {
        let mut controller = DownloadController::new();
        assert_eq!(
            controller.boot(),
            vec![Effect::CheckCookies, Effect::CheckBusy(BusyCheck::Startup)]
        );

        let effects = controller.busy_checked(BusyCheck::Startup, Ok(true));

        assert!(!effects.iter().any(|e| matches!(e, Effect::SubmitDownload(_))));
        assert!(controller.state().is_downloading);
        assert!(controller.state().cancel_enabled);
        let generation = controller.poll_generation().unwrap();
        assert_eq!(
            controller.poll_tick(generation),
            vec![Effect::FetchStatus { generation }]
        );
    }

    #[test]
    fn test_new_poll_replaces_old_one() {
        let mut controller = DownloadController::new();
        controller.start_polling();
        let first = controller.poll_generation().unwrap();
        controller.start_polling();
        let second = controller.poll_generation().unwrap();

        assert_ne!(first, second);
        controller.state.is_downloading = true;
        assert!(controller.poll_tick(first).is_empty());
        assert_eq!(
            controller.poll_tick(second),
            vec![Effect::FetchStatus { generation: second }]
        );
        // A late answer for the replaced timer is dropped.
        assert!(controller
            .status_received(first, Ok(status(JobState::Completed)))
            .is_empty());
        assert_eq!(controller.poll_generation(), Some(second));
    }

    #[test]
    fn test_tick_skipped_while_fetch_in_flight() {
        let mut controller = DownloadController::new();
        let generation = downloading(&mut controller);

        assert_eq!(controller.poll_tick(generation).len(), 1);
        assert!(controller.poll_tick(generation).is_empty());

        controller.status_received(generation, Ok(status(JobState::Downloading)));
        assert_eq!(controller.poll_tick(generation).len(), 1);
    }

    #[test]
    fn test_completed_stops_polling_and_schedules_one_reset() {
        let mut controller = DownloadController::new();
        let generation = downloading(&mut controller);
        let mut all_effects = Vec::new();

        for state in [JobState::Starting, JobState::Downloading, JobState::Completed] {
            controller.poll_tick(generation);
            all_effects.extend(controller.status_received(generation, Ok(status(state))));
        }

        assert_eq!(controller.poll_generation(), None);
        assert!(controller.poll_tick(generation).is_empty());
        assert_eq!(resets(&all_effects), vec![RESET_AFTER_COMPLETED]);
        assert_eq!(controller.state().file_status, FileStatus::Done);
        assert_eq!(last_notification(&controller).kind, NotificationKind::Success);
    }

    #[test]
    fn test_error_status_reports_reason_and_resets_later() {
        let mut controller = DownloadController::new();
        let generation = downloading(&mut controller);
        controller.poll_tick(generation);

        let effects = controller.status_received(
            generation,
            Ok(DownloadStatus {
                status: JobState::Error,
                error_message: Some("network timeout".to_string()),
                ..Default::default()
            }),
        );

        let note = last_notification(&controller);
        assert_eq!(note.kind, NotificationKind::Error);
        assert!(note.message.contains("network timeout"));
        assert_eq!(controller.state().file_status, FileStatus::Failed);
        assert_eq!(resets(&effects), vec![Duration::from_secs(3)]);
        // Not reset yet.
        assert!(controller.state().is_downloading);

        let session = match effects.iter().find(|e| matches!(e, Effect::ScheduleReset { .. })) {
            Some(Effect::ScheduleReset { session, .. }) => *session,
            _ => unreachable!(),
        };
        controller.reset_due(session);
        assert!(!controller.state().is_downloading);
        assert_eq!(controller.state().file_status, FileStatus::Waiting);
    }

    #[test]
    fn test_error_status_falls_back_to_message() {
        let mut controller = DownloadController::new();
        let generation = downloading(&mut controller);
        controller.status_received(
            generation,
            Ok(DownloadStatus {
                status: JobState::Error,
                message: "Exit code: 1".to_string(),
                error_message: Some(String::new()),
                ..Default::default()
            }),
        );
        assert!(last_notification(&controller).message.contains("Exit code: 1"));
    }

    #[test]
    fn test_cancelled_and_idle_statuses() {
        let mut controller = DownloadController::new();
        let generation = downloading(&mut controller);
        let effects = controller.status_received(generation, Ok(status(JobState::Cancelled)));
        assert_eq!(resets(&effects), vec![RESET_AFTER_CANCELLED]);
        assert_eq!(controller.state().file_status, FileStatus::Cancelled);
        assert_eq!(last_notification(&controller).kind, NotificationKind::Warning);

        let mut controller = DownloadController::new();
        let generation = downloading(&mut controller);
        let effects = controller.status_received(generation, Ok(status(JobState::Idle)));
        assert_eq!(resets(&effects), vec![RESET_AFTER_IDLE]);
        assert_eq!(last_notification(&controller).kind, NotificationKind::Info);
        assert_eq!(controller.poll_generation(), None);
    }

    #[test]
    fn test_poll_failure_keeps_polling() {
        let mut controller = DownloadController::new();
        let generation = downloading(&mut controller);
        controller.poll_tick(generation);

        let effects = controller.status_received(generation, Err("connection reset".to_string()));

        assert!(effects.is_empty());
        assert_eq!(controller.poll_generation(), Some(generation));
        assert!(controller.state().is_downloading);
        assert_eq!(
            controller.poll_tick(generation),
            vec![Effect::FetchStatus { generation }]
        );
    }

    #[test]
    fn test_stalled_fetch_that_times_out_resumes_polling() {
        let mut controller = DownloadController::new();
        let generation = downloading(&mut controller);

        assert_eq!(
            controller.poll_tick(generation),
            vec![Effect::FetchStatus { generation }]
        );
        // The request hangs: every tick until it gives up is skipped.
        for _ in 0..5 {
            assert!(controller.poll_tick(generation).is_empty());
        }

        controller.status_received(generation, Err("operation timed out".to_string()));
        assert_eq!(
            controller.poll_tick(generation),
            vec![Effect::FetchStatus { generation }]
        );
    }

    #[test]
    fn test_render_keeps_last_known_values_over_placeholders() {
        let mut controller = DownloadController::new();
        controller.render_status(&DownloadStatus {
            status: JobState::Downloading,
            progress: 42.37,
            message: "Downloading...".to_string(),
            speed: Some("2.1MiB/s".to_string()),
            eta: Some("00:31".to_string()),
            filesize: Some("120.5MiB".to_string()),
            downloaded: Some("51.0MiB".to_string()),
            filename: Some("clip.mp4".to_string()),
            error_message: None,
        });
        controller.render_status(&DownloadStatus {
            status: JobState::Downloading,
            progress: 43.0,
            message: String::new(),
            speed: Some("0 KB/s".to_string()),
            eta: Some("--:--".to_string()),
            filesize: Some("0 MB".to_string()),
            downloaded: None,
            filename: Some(String::new()),
            error_message: None,
        });

        let state = controller.state();
        assert_eq!(state.progress_text, "43.0%");
        assert_eq!(state.progress_message, "Processing...");
        assert_eq!(state.speed, "2.1MiB/s");
        assert_eq!(state.eta, "00:31");
        assert_eq!(state.size, "120.5MiB");
        assert_eq!(state.downloaded, "51.0MiB");
        assert_eq!(state.file_name, "clip.mp4");
        assert_eq!(state.file_status, FileStatus::Downloading);
        assert_eq!(state.status_line.tone, StatusTone::Downloading);
    }

    #[test]
    fn test_progress_text_has_one_decimal() {
        let mut controller = DownloadController::new();
        controller.render_status(&DownloadStatus {
            status: JobState::Downloading,
            progress: 42.37,
            ..Default::default()
        });
        assert_eq!(controller.state().progress_text, "42.4%");
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut controller = DownloadController::new();
        downloading(&mut controller);

        controller.reset_ui();
        let once = controller.state().clone();
        controller.reset_ui();

        assert_eq!(controller.state(), &once);
        assert_eq!(controller.poll_generation(), None);
        assert!(controller.state().start_enabled);
    }

    #[test]
    fn test_notification_stack_is_capped() {
        let mut controller = DownloadController::new();
        let mut effects = Vec::new();
        for i in 0..4 {
            effects.extend(controller.show_notification(format!("note {}", i), NotificationKind::Info));
        }

        assert_eq!(messages(&controller), vec!["note 1", "note 2", "note 3"]);
        assert!(effects.contains(&Effect::CancelDismiss(0)));
    }

    #[test]
    fn test_manual_dismiss_cancels_timer_once() {
        let mut controller = DownloadController::new();
        let effects = controller.show_notification("hello", NotificationKind::Success);
        assert_eq!(
            effects,
            vec![Effect::ScheduleDismiss {
                id: 0,
                after: NOTIFICATION_TTL
            }]
        );

        assert_eq!(controller.dismiss_notification(0), vec![Effect::CancelDismiss(0)]);
        assert!(controller.dismiss_notification(0).is_empty());
        controller.notification_expired(0);
        assert!(messages(&controller).is_empty());
    }

    #[test]
    fn test_cancel_flow() {
        let mut controller = DownloadController::new();
        assert!(controller.cancel_download().is_empty());

        let generation = downloading(&mut controller);
        assert_eq!(controller.cancel_download(), vec![Effect::ConfirmCancel]);
        assert!(controller.cancel_confirmed(false).is_empty());
        assert_eq!(controller.cancel_confirmed(true), vec![Effect::RequestCancel]);

        let effects = controller.cancel_finished(Ok(CancelResponse {
            success: true,
            message: Some("Cancelled".to_string()),
        }));

        assert!(!controller.state().is_downloading);
        assert_eq!(controller.poll_generation(), None);
        assert!(controller.poll_tick(generation).is_empty());
        assert_eq!(controller.state().file_status, FileStatus::Cancelled);
        assert_eq!(controller.state().status_line.tone, StatusTone::Cancelled);
        assert_eq!(resets(&effects), vec![Duration::from_secs(2)]);
    }

    #[test]
    fn test_acceptance_after_cancel_does_not_restart() {
        let mut controller = DownloadController::new();
        controller.set_url(URL.to_string());
        let effects = controller.start_download();
        let Effect::CheckBusy(check) = effects[0].clone() else {
            panic!("expected busy check, got {:?}", effects);
        };
        controller.busy_checked(check, Ok(false));
        controller.cancel_finished(Ok(CancelResponse {
            success: true,
            message: None,
        }));

        let effects = controller.download_submitted(Ok(()));

        assert!(effects.is_empty());
        assert_eq!(controller.poll_generation(), None);
        assert!(!controller.state().is_downloading);
        assert!(!messages(&controller).contains(&"Download started!".to_string()));
    }

    #[test]
    fn test_failed_cancel_leaves_state_alone() {
        let mut controller = DownloadController::new();
        let generation = downloading(&mut controller);
        let before = controller.state().clone();

        controller.cancel_finished(Ok(CancelResponse {
            success: false,
            message: Some("No active download".to_string()),
        }));
        assert_eq!(last_notification(&controller).message, "No active download");

        controller.cancel_finished(Err("timed out".to_string()));
        assert_eq!(last_notification(&controller).message, "Failed to cancel: timed out");

        assert_eq!(controller.state(), &before);
        assert_eq!(controller.poll_generation(), Some(generation));
    }

    #[test]
    fn test_health_check_reconciles_with_server() {
        let mut controller = DownloadController::new();
        assert_eq!(
            controller.health_tick(),
            vec![Effect::CheckBusy(BusyCheck::Reconcile)]
        );

        controller.busy_checked(BusyCheck::Reconcile, Ok(true));
        assert!(controller.state().is_downloading);
        assert!(controller.poll_generation().is_some());
        assert_eq!(last_notification(&controller).kind, NotificationKind::Info);

        assert!(controller.health_tick().is_empty());
    }

    #[test]
    fn test_reset_from_previous_session_is_ignored() {
        let mut controller = DownloadController::new();
        downloading(&mut controller);
        let effects = controller.cancel_finished(Ok(CancelResponse {
            success: true,
            message: None,
        }));
        let Some(Effect::ScheduleReset { session, .. }) = effects.last().cloned() else {
            panic!("expected reset, got {:?}", effects);
        };

        // Server picked up another job before the reset fired.
        controller.busy_checked(BusyCheck::Reconcile, Ok(true));
        controller.reset_due(session);

        assert!(controller.state().is_downloading);
        assert!(controller.poll_generation().is_some());
    }

    #[test]
    fn test_clipboard_paste() {
        let mut controller = DownloadController::new();
        assert_eq!(controller.paste_from_clipboard(), vec![Effect::ReadClipboard]);

        controller.clipboard_read(Some(format!("  {}\n", URL)));
        assert_eq!(controller.state().url_input, URL);
        assert_eq!(last_notification(&controller).kind, NotificationKind::Success);

        controller.clipboard_read(None);
        assert_eq!(controller.state().url_input, URL);
        assert_eq!(last_notification(&controller).kind, NotificationKind::Error);
    }

    #[test]
    fn test_missing_cookies_warns_only() {
        let mut controller = DownloadController::new();
        controller.cookies_checked(Ok(true));
        controller.cookies_checked(Err("offline".to_string()));
        assert!(messages(&controller).is_empty());

        controller.cookies_checked(Ok(false));
        assert_eq!(last_notification(&controller).kind, NotificationKind::Warning);
        assert!(controller.state().start_enabled);
    }

    #[test]
    fn test_audio_format_narrows_quality() {
        let mut controller = DownloadController::new();
        let hd = DownloadFormat::Video.qualities()[1];
        controller.select_quality(hd);
        assert_eq!(controller.state().quality.value, "720p");

        controller.select_format(DownloadFormat::Audio);
        assert_eq!(controller.state().quality.value, "best");

        controller.select_quality(hd);
        assert_eq!(controller.state().quality.value, "best");

        controller.set_url(URL.to_string());
        let effects = controller.start_download();
        let Effect::CheckBusy(BusyCheck::BeforeStart(request)) = &effects[0] else {
            panic!("expected busy check");
        };
        assert_eq!(request.format, DownloadFormat::Audio);
    }
}
