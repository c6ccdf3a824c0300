use crate::domain::{DownloadFormat, JobState, QualityOption};

const READY_PROMPT: &str = "Enter a YouTube URL to start downloading";

/// Drives the icon and color of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Starting,
    Downloading,
    Completed,
    Error,
    Cancelled,
    Idle,
}

impl From<JobState> for StatusTone {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Idle => StatusTone::Idle,
            JobState::Starting => StatusTone::Starting,
            JobState::Downloading => StatusTone::Downloading,
            JobState::Completed => StatusTone::Completed,
            JobState::Error => StatusTone::Error,
            JobState::Cancelled => StatusTone::Cancelled,
            JobState::Unknown => StatusTone::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub tone: StatusTone,
}

impl StatusLine {
    pub fn new(message: impl Into<String>, tone: StatusTone) -> Self {
        Self {
            message: message.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Waiting,
    Starting,
    Downloading,
    Done,
    Failed,
    Cancelled,
    Ready,
}

impl FileStatus {
    pub fn label(self) -> &'static str {
        match self {
            FileStatus::Waiting => "Waiting",
            FileStatus::Starting => "Starting...",
            FileStatus::Downloading => "Downloading...",
            FileStatus::Done => "Done",
            FileStatus::Failed => "Failed",
            FileStatus::Cancelled => "Cancelled",
            FileStatus::Ready => "Ready",
        }
    }

    /// Label to show for a server-reported job state, if it has one.
    pub fn for_job(state: JobState) -> Option<Self> {
        match state {
            JobState::Downloading => Some(FileStatus::Downloading),
            JobState::Starting => Some(FileStatus::Starting),
            JobState::Error => Some(FileStatus::Failed),
            JobState::Cancelled => Some(FileStatus::Cancelled),
            JobState::Completed => Some(FileStatus::Done),
            JobState::Idle => Some(FileStatus::Ready),
            JobState::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Idle,
    Downloading,
}

impl Indicator {
    pub fn label(self) -> &'static str {
        match self {
            Indicator::Idle => "Ready",
            Indicator::Downloading => "Downloading",
        }
    }
}

/// Everything the window shows, owned by the controller
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub is_downloading: bool,
    pub url_input: String,
    pub format: DownloadFormat,
    pub quality: QualityOption,
    pub start_enabled: bool,
    pub cancel_enabled: bool,
    pub progress_visible: bool,
    pub progress: f64,
    pub progress_text: String,
    pub progress_message: String,
    pub speed: String,
    pub eta: String,
    pub size: String,
    pub downloaded: String,
    pub file_name: String,
    pub file_status: FileStatus,
    pub indicator: Indicator,
    pub status_line: StatusLine,
}

impl Default for UiState {
    fn default() -> Self {
        let format = DownloadFormat::default();
        Self {
            is_downloading: false,
            url_input: String::new(),
            format,
            quality: format.default_quality(),
            start_enabled: true,
            cancel_enabled: false,
            progress_visible: false,
            progress: 0.0,
            progress_text: "0%".to_string(),
            progress_message: String::new(),
            speed: "Waiting...".to_string(),
            eta: "--:--".to_string(),
            size: "0 MB".to_string(),
            downloaded: "0 MB".to_string(),
            file_name: "-".to_string(),
            file_status: FileStatus::Waiting,
            indicator: Indicator::Idle,
            status_line: StatusLine::new(READY_PROMPT, StatusTone::Info),
        }
    }
}

impl UiState {
    /// Back to the ready state. Format and quality choices survive.
    pub fn reset(&mut self) {
        *self = Self {
            format: self.format,
            quality: self.quality,
            ..Self::default()
        };
    }

    /// Switch controls into the "job in flight" layout.
    pub fn show_downloading(&mut self) {
        self.is_downloading = true;
        self.start_enabled = false;
        self.cancel_enabled = true;
        self.progress_visible = true;
        self.indicator = Indicator::Downloading;
    }
}
