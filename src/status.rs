//! Job status values and their presentation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::locale::Locale;

/// Status string reported by the generation backend
///
/// Unknown strings are kept verbatim in `Other` rather than rejected; the
/// server is free to add stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Transcribing,
    Planning,
    GeneratingCommentary,
    SynthesizingVoiceover,
    SelectingMusic,
    GeneratingImages,
    GeneratingSubtitles,
    BuildingManifest,
    Rendering,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    /// Every documented status, in pipeline order
    pub const KNOWN: [JobStatus; 12] = [
        JobStatus::Pending,
        JobStatus::Transcribing,
        JobStatus::Planning,
        JobStatus::GeneratingCommentary,
        JobStatus::SynthesizingVoiceover,
        JobStatus::SelectingMusic,
        JobStatus::GeneratingImages,
        JobStatus::GeneratingSubtitles,
        JobStatus::BuildingManifest,
        JobStatus::Rendering,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Transcribing => "transcribing",
            JobStatus::Planning => "planning",
            JobStatus::GeneratingCommentary => "generating_commentary",
            JobStatus::SynthesizingVoiceover => "synthesizing_voiceover",
            JobStatus::SelectingMusic => "selecting_music",
            JobStatus::GeneratingImages => "generating_images",
            JobStatus::GeneratingSubtitles => "generating_subtitles",
            JobStatus::BuildingManifest => "building_manifest",
            JobStatus::Rendering => "rendering",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(raw) => raw,
        }
    }

    /// `completed` and `failed` end polling
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "pending" => JobStatus::Pending,
            "transcribing" => JobStatus::Transcribing,
            "planning" => JobStatus::Planning,
            "generating_commentary" => JobStatus::GeneratingCommentary,
            "synthesizing_voiceover" => JobStatus::SynthesizingVoiceover,
            "selecting_music" => JobStatus::SelectingMusic,
            "generating_images" => JobStatus::GeneratingImages,
            "generating_subtitles" => JobStatus::GeneratingSubtitles,
            "building_manifest" => JobStatus::BuildingManifest,
            "rendering" => JobStatus::Rendering,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        JobStatus::from(raw.as_str())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(JobStatus::from(s))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user sees for a status: heading, detail line and progress bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusPresentation {
    pub title: String,
    pub message: String,
    pub progress: u8,
}

struct StatusEntry {
    title: &'static str,
    message: &'static str,
    progress: u8,
}

const fn entry(title: &'static str, message: &'static str, progress: u8) -> StatusEntry {
    StatusEntry { title, message, progress }
}

// Rows follow JobStatus::KNOWN; the last row is the fallback.
static TABLE_EN: [StatusEntry; 13] = [
    entry("⏳ Queued", "Your request is in the queue...", 5),
    entry("🎤 Analyzing", "Reading your website content...", 10),
    entry("🧠 Planning", "Detecting business category...", 20),
    entry("✍️ Writing", "Creating promotional script...", 30),
    entry("🗣️ Voice", "Generating voiceover...", 45),
    entry("🎵 Music", "Selecting background music...", 55),
    entry("🎨 Visuals", "Creating images...", 70),
    entry("📝 Subtitles", "Adding captions...", 80),
    entry("📦 Building", "Preparing video...", 85),
    entry("🎬 Rendering", "Rendering final video...", 95),
    entry("✅ Complete", "Your reel is ready!", 100),
    entry("❌ Failed", "Something went wrong.", 0),
    entry("⏳ Processing", "Working on your reel...", 50),
];

static TABLE_DE: [StatusEntry; 13] = [
    entry("⏳ In Warteschlange", "Deine Anfrage ist in der Warteschlange...", 5),
    entry("🎤 Analyse", "Website-Inhalte werden gelesen...", 10),
    entry("🧠 Planung", "Geschäftskategorie wird erkannt...", 20),
    entry("✍️ Texten", "Werbeskript wird erstellt...", 30),
    entry("🗣️ Stimme", "Voiceover wird generiert...", 45),
    entry("🎵 Musik", "Hintergrundmusik wird ausgewählt...", 55),
    entry("🎨 Visuals", "Bilder werden erstellt...", 70),
    entry("📝 Untertitel", "Untertitel werden hinzugefügt...", 80),
    entry("📦 Aufbau", "Video wird vorbereitet...", 85),
    entry("🎬 Rendering", "Finales Video wird gerendert...", 95),
    entry("✅ Fertig", "Dein Reel ist fertig!", 100),
    entry("❌ Fehlgeschlagen", "Etwas ist schiefgelaufen.", 0),
    entry("⏳ Verarbeitung", "Dein Reel wird erstellt...", 50),
];

const FALLBACK_ROW: usize = 12;

fn row(status: &JobStatus) -> usize {
    match status {
        JobStatus::Pending => 0,
        JobStatus::Transcribing => 1,
        JobStatus::Planning => 2,
        JobStatus::GeneratingCommentary => 3,
        JobStatus::SynthesizingVoiceover => 4,
        JobStatus::SelectingMusic => 5,
        JobStatus::GeneratingImages => 6,
        JobStatus::GeneratingSubtitles => 7,
        JobStatus::BuildingManifest => 8,
        JobStatus::Rendering => 9,
        JobStatus::Completed => 10,
        JobStatus::Failed => 11,
        JobStatus::Other(_) => FALLBACK_ROW,
    }
}

/// Project a status onto its presentation.
///
/// A non-empty `server_message` replaces the table message; title and
/// progress always come from the table.
pub fn present(status: &JobStatus, server_message: Option<&str>, locale: Locale) -> StatusPresentation {
    let table = match locale {
        Locale::En => &TABLE_EN,
        Locale::De => &TABLE_DE,
    };
    let entry = &table[row(status)];
    let message = server_message
        .filter(|m| !m.is_empty())
        .unwrap_or(entry.message);

    StatusPresentation {
        title: entry.title.to_string(),
        message: message.to_string(),
        progress: entry.progress,
    }
}

/// The failed presentation carrying an error message
pub fn present_failure(message: &str, locale: Locale) -> StatusPresentation {
    present(&JobStatus::Failed, Some(message), locale)
}
