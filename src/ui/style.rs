use iced::Color;

use crate::application::{FileStatus, NotificationKind, StatusTone};

const BLUE: Color = Color { r: 0.192, g: 0.51, b: 0.808, a: 1.0 };
const RED: Color = Color { r: 0.898, g: 0.243, b: 0.243, a: 1.0 };
const GREEN: Color = Color { r: 0.22, g: 0.631, b: 0.412, a: 1.0 };
const ORANGE: Color = Color { r: 0.929, g: 0.537, b: 0.212, a: 1.0 };
const GRAY: Color = Color { r: 0.443, g: 0.502, b: 0.588, a: 1.0 };
const YOUTUBE_RED: Color = Color { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };

pub fn tone_color(tone: StatusTone) -> Color {
    match tone {
        StatusTone::Info | StatusTone::Starting => BLUE,
        StatusTone::Downloading => YOUTUBE_RED,
        StatusTone::Completed => GREEN,
        StatusTone::Error => RED,
        StatusTone::Cancelled => ORANGE,
        StatusTone::Idle => GRAY,
    }
}

pub fn tone_icon(tone: StatusTone) -> &'static str {
    match tone {
        StatusTone::Info => "ℹ",
        StatusTone::Downloading => "⟳",
        StatusTone::Completed | StatusTone::Idle => "✔",
        StatusTone::Error => "!",
        StatusTone::Cancelled => "⊘",
        StatusTone::Starting => "▶",
    }
}

pub fn notification_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Success => GREEN,
        NotificationKind::Error => RED,
        NotificationKind::Warning => ORANGE,
        NotificationKind::Info => BLUE,
    }
}

pub fn notification_icon(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "✔",
        NotificationKind::Error => "!",
        NotificationKind::Warning => "⚠",
        NotificationKind::Info => "ℹ",
    }
}

pub fn file_status_color(status: FileStatus) -> Color {
    match status {
        FileStatus::Starting | FileStatus::Downloading => YOUTUBE_RED,
        FileStatus::Done | FileStatus::Waiting | FileStatus::Ready => GREEN,
        FileStatus::Failed => RED,
        FileStatus::Cancelled => ORANGE,
    }
}
