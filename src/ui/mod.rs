mod style;

use iced::{
    widget::{button, column, container, pick_list, progress_bar, row, text, text_input, Column, Space},
    Alignment, Element, Length,
};

use crate::application::{Notification, NotificationId, StatusTone, UiState};
use crate::domain::{DownloadFormat, QualityOption};

/// Where the server writes finished files
const DOWNLOAD_FOLDER: &str = "~/Downloads/YouTube_Downloads";

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    PastePressed,
    FormatSelected(DownloadFormat),
    QualitySelected(QualityOption),
    DownloadPressed,
    CancelPressed,
    NotificationClosed(NotificationId),
}

pub fn view<'a>(
    state: &'a UiState,
    notifications: impl Iterator<Item = &'a Notification>,
) -> Element<'a, DownloadMessage> {
    let header = row![
        text("YouTube Downloader").size(32),
        Space::new().width(Length::Fill),
        text(state.indicator.label())
            .size(14)
            .color(style::tone_color(if state.is_downloading {
                StatusTone::Downloading
            } else {
                StatusTone::Idle
            })),
    ]
    .align_y(Alignment::Center);

    let url_row = row![
        text_input("https://www.youtube.com/watch?v=...", &state.url_input)
            .on_input(DownloadMessage::UrlChanged)
            .on_submit(DownloadMessage::DownloadPressed)
            .padding(10),
        button("Paste")
            .on_press(DownloadMessage::PastePressed)
            .padding(10),
    ]
    .spacing(10);

    let options_row = row![
        pick_list(
            DownloadFormat::ALL,
            Some(state.format),
            DownloadMessage::FormatSelected
        ),
        pick_list(
            state.format.qualities(),
            Some(state.quality),
            DownloadMessage::QualitySelected
        ),
    ]
    .spacing(10);

    let controls = row![
        button("Download")
            .on_press_maybe(state.start_enabled.then_some(DownloadMessage::DownloadPressed))
            .padding([10, 20]),
        button("Cancel")
            .on_press_maybe(state.cancel_enabled.then_some(DownloadMessage::CancelPressed))
            .padding([10, 20]),
    ]
    .spacing(10);

    let mut content = column![
        header,
        Space::new().height(Length::Fixed(20.0)),
        text("YouTube URL:").size(16),
        url_row,
        options_row,
        controls,
    ]
    .padding(20)
    .spacing(10);

    if state.progress_visible {
        content = content.push(progress_view(state));
    }

    content = content
        .push(status_line_view(state))
        .push(file_info_view(state))
        .push(notifications_view(notifications));

    content.into()
}

fn progress_view(state: &UiState) -> Element<'_, DownloadMessage> {
    let stats = row![
        labeled("Speed", &state.speed),
        labeled("ETA", &state.eta),
        labeled("Size", &state.size),
        labeled("Downloaded", &state.downloaded),
    ]
    .spacing(20);

    column![
        row![
            progress_bar(0.0..=100.0, state.progress as f32),
            text(&state.progress_text).size(14),
        ]
        .spacing(10)
        .align_y(Alignment::Center),
        text(&state.progress_message).size(14),
        stats,
    ]
    .spacing(8)
    .into()
}

fn status_line_view(state: &UiState) -> Element<'_, DownloadMessage> {
    let line = &state.status_line;
    row![
        text(style::tone_icon(line.tone)).color(style::tone_color(line.tone)),
        text(&line.message).size(14),
    ]
    .spacing(8)
    .into()
}

fn file_info_view(state: &UiState) -> Element<'_, DownloadMessage> {
    column![
        labeled("File", &state.file_name),
        labeled("Location", DOWNLOAD_FOLDER),
        row![
            text("Status:").size(14),
            text(state.file_status.label())
                .size(14)
                .color(style::file_status_color(state.file_status)),
        ]
        .spacing(6),
    ]
    .spacing(4)
    .into()
}

fn notifications_view<'a>(
    notifications: impl Iterator<Item = &'a Notification>,
) -> Element<'a, DownloadMessage> {
    let cards = notifications.map(|n| -> Element<'a, DownloadMessage> {
        container(
            row![
                text(style::notification_icon(n.kind)).color(style::notification_color(n.kind)),
                text(&n.message).width(Length::Fill),
                button("×")
                    .on_press(DownloadMessage::NotificationClosed(n.id))
                    .padding([2, 8]),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        )
        .padding(12)
        .style(container::rounded_box)
        .into()
    });

    Column::with_children(cards).spacing(10).into()
}

fn labeled<'a>(label: &'a str, value: &'a str) -> Element<'a, DownloadMessage> {
    row![text(format!("{}:", label)).size(14), text(value).size(14)]
        .spacing(6)
        .into()
}
