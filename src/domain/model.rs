use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of parallel fragments the server is asked to fetch per download.
pub const CONCURRENT_FRAGMENTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    #[default]
    Video,
    Audio,
}

impl DownloadFormat {
    pub const ALL: &'static [DownloadFormat] = &[DownloadFormat::Video, DownloadFormat::Audio];

    /// Quality choices the server accepts for this format. The first entry is
    /// the default.
    pub fn qualities(self) -> &'static [QualityOption] {
        match self {
            DownloadFormat::Video => &VIDEO_QUALITIES,
            DownloadFormat::Audio => &AUDIO_QUALITIES,
        }
    }

    pub fn default_quality(self) -> QualityOption {
        self.qualities()[0]
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadFormat::Video => write!(f, "Video (MP4)"),
            DownloadFormat::Audio => write!(f, "Audio (MP3)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl fmt::Display for QualityOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

const VIDEO_QUALITIES: [QualityOption; 4] = [
    QualityOption {
        value: "best",
        label: "Best (1080p or higher)",
    },
    QualityOption {
        value: "720p",
        label: "HD 720p",
    },
    QualityOption {
        value: "480p",
        label: "SD 480p",
    },
    QualityOption {
        value: "360p",
        label: "360p",
    },
];

const AUDIO_QUALITIES: [QualityOption; 1] = [QualityOption {
    value: "best",
    label: "Best quality (320kbps)",
}];

/// Body of `POST /api/download`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    pub url: String,
    pub format: DownloadFormat,
    pub quality: String,
    pub concurrent_fragments: u32,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, format: DownloadFormat, quality: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format,
            quality: quality.into(),
            concurrent_fragments: CONCURRENT_FRAGMENTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Idle,
    Starting,
    Downloading,
    Completed,
    Error,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// Snapshot returned by `GET /api/status`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DownloadStatus {
    pub status: JobState,
    pub progress: f64,
    pub message: String,
    pub speed: Option<String>,
    pub eta: Option<String>,
    pub filesize: Option<String>,
    pub downloaded: Option<String>,
    pub filename: Option<String>,
    pub error_message: Option<String>,
}
