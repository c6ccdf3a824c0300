use std::collections::HashMap;

use iced::{task, time, Subscription, Task};
use tracing::debug;

use crate::api::{ApiClient, ApiConfig, CancelResponse};
use crate::application::download_controller::{HEALTH_CHECK_INTERVAL, POLL_INTERVAL};
use crate::application::{BusyCheck, DownloadController, Effect, NotificationId};
use crate::domain::DownloadStatus;
use crate::ui::{self, DownloadMessage};

pub struct DownloadApp {
    controller: DownloadController,
    api_client: ApiClient,
    dismiss_timers: DismissTimers<task::Handle>,
}

/// Something that can stop a running task.
pub trait Abort {
    fn abort(&self);
}

impl Abort for task::Handle {
    fn abort(&self) {
        task::Handle::abort(self);
    }
}

/// Auto-dismiss timers, aborted when a notification leaves early.
#[derive(Debug)]
pub struct DismissTimers<H> {
    handles: HashMap<NotificationId, H>,
}

impl<H> Default for DismissTimers<H> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }
}

impl<H: Abort> DismissTimers<H> {
    pub fn track(&mut self, id: NotificationId, handle: H) {
        if let Some(previous) = self.handles.insert(id, handle) {
            previous.abort();
        }
    }

    /// Aborts the timer for `id`. Returns false if none was running.
    pub fn cancel(&mut self, id: NotificationId) -> bool {
        match self.handles.remove(&id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// The timer for `id` fired on its own.
    pub fn expired(&mut self, id: NotificationId) {
        self.handles.remove(&id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.handles.len()
    }
}

impl DownloadApp {
    pub fn new() -> (Self, Task<Message>) {
        let config = ApiConfig::from_env();
        debug!("Using download server at {}", config.base_url);

        let mut app = Self {
            controller: DownloadController::new(),
            api_client: ApiClient::new(config),
            dismiss_timers: DismissTimers::default(),
        };

        let effects = app.controller.boot();
        let task = app.run(effects);
        (app, task)
    }

    fn run(&mut self, effects: Vec<Effect>) -> Task<Message> {
        Task::batch(effects.into_iter().map(|effect| self.perform(effect)))
    }

    fn perform(&mut self, effect: Effect) -> Task<Message> {
        let client = self.api_client.clone();
        match effect {
            Effect::CheckCookies => Task::perform(
                async move { client.check_cookies().await.map_err(|e| e.to_string()) },
                Message::CookiesChecked,
            ),
            Effect::CheckBusy(check) => Task::perform(
                async move {
                    let result = client.is_busy().await.map_err(|e| e.to_string());
                    (check, result)
                },
                |(check, result)| Message::BusyChecked(check, result),
            ),
            Effect::SubmitDownload(request) => Task::perform(
                async move {
                    client
                        .start_download(&request)
                        .await
                        .map_err(|e| e.to_string())
                },
                Message::DownloadSubmitted,
            ),
            Effect::FetchStatus { generation } => Task::perform(
                async move {
                    let result = client.status().await.map_err(|e| e.to_string());
                    (generation, result)
                },
                |(generation, result)| Message::StatusReceived(generation, result),
            ),
            Effect::RequestCancel => Task::perform(
                async move { client.cancel().await.map_err(|e| e.to_string()) },
                Message::CancelFinished,
            ),
            Effect::ReadClipboard => iced::clipboard::read().map(Message::ClipboardRead),
            Effect::ConfirmCancel => Task::perform(
                async {
                    rfd::AsyncMessageDialog::new()
                        .set_level(rfd::MessageLevel::Warning)
                        .set_title("Cancel download")
                        .set_description("Are you sure you want to cancel the download?")
                        .set_buttons(rfd::MessageButtons::YesNo)
                        .show()
                        .await
                        == rfd::MessageDialogResult::Yes
                },
                Message::CancelConfirmed,
            ),
            Effect::ScheduleReset { session, after } => {
                Task::perform(tokio::time::sleep(after), move |_| Message::ResetDue(session))
            }
            Effect::ScheduleDismiss { id, after } => {
                let (task, handle) = Task::perform(tokio::time::sleep(after), move |_| {
                    Message::NotificationExpired(id)
                })
                .abortable();
                self.dismiss_timers.track(id, handle);
                task
            }
            Effect::CancelDismiss(id) => {
                if !self.dismiss_timers.cancel(id) {
                    debug!("No dismiss timer for notification {}", id);
                }
                Task::none()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    ClipboardRead(Option<String>),
    CookiesChecked(Result<bool, String>),
    BusyChecked(BusyCheck, Result<bool, String>),
    DownloadSubmitted(Result<(), String>),
    /// Poll timer tick, tagged with the timer's generation
    PollTick(u64),
    StatusReceived(u64, Result<DownloadStatus, String>),
    HealthTick,
    CancelConfirmed(bool),
    CancelFinished(Result<CancelResponse, String>),
    /// Delayed reset, tagged with the session it was scheduled in
    ResetDue(u64),
    NotificationExpired(NotificationId),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    let controller = &mut app.controller;
    let effects = match message {
        Message::UiMessage(ui_msg) => match ui_msg {
            DownloadMessage::UrlChanged(url) => {
                controller.set_url(url);
                Vec::new()
            }
            DownloadMessage::PastePressed => controller.paste_from_clipboard(),
            DownloadMessage::FormatSelected(format) => {
                controller.select_format(format);
                Vec::new()
            }
            DownloadMessage::QualitySelected(quality) => {
                controller.select_quality(quality);
                Vec::new()
            }
            DownloadMessage::DownloadPressed => controller.start_download(),
            DownloadMessage::CancelPressed => controller.cancel_download(),
            DownloadMessage::NotificationClosed(id) => controller.dismiss_notification(id),
        },
        Message::ClipboardRead(contents) => controller.clipboard_read(contents),
        Message::CookiesChecked(result) => controller.cookies_checked(result),
        Message::BusyChecked(check, result) => controller.busy_checked(check, result),
        Message::DownloadSubmitted(result) => controller.download_submitted(result),
        Message::PollTick(generation) => controller.poll_tick(generation),
        Message::StatusReceived(generation, result) => {
            controller.status_received(generation, result)
        }
        Message::HealthTick => controller.health_tick(),
        Message::CancelConfirmed(confirmed) => controller.cancel_confirmed(confirmed),
        Message::CancelFinished(result) => controller.cancel_finished(result),
        Message::ResetDue(session) => {
            controller.reset_due(session);
            Vec::new()
        }
        Message::NotificationExpired(id) => {
            app.dismiss_timers.expired(id);
            controller.notification_expired(id);
            Vec::new()
        }
    };
    app.run(effects)
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    ui::view(app.controller.state(), app.controller.notifications()).map(Message::UiMessage)
}

/// The health check runs for the whole session; the poll timer only while a
/// download is tracked. Its identity includes the generation, so replacing
/// the poll drops the previous timer.
pub fn subscription(app: &DownloadApp) -> Subscription<Message> {
    let health = time::every(HEALTH_CHECK_INTERVAL).map(|_| Message::HealthTick);

    let poll = match app.controller.poll_generation() {
        Some(generation) => time::every(POLL_INTERVAL)
            .with(generation)
            .map(|(generation, _)| Message::PollTick(generation)),
        None => Subscription::none(),
    };

    Subscription::batch([health, poll])
}
