//! User-facing strings for the supported interface languages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Interface language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
}

/// Fixed prompts and fallbacks for one locale
#[derive(Debug)]
pub struct LocaleStrings {
    pub consent_required: &'static str,
    pub url_required: &'static str,
    pub start_failed: &'static str,
    pub job_failed: &'static str,
    pub cancelled: &'static str,
    pub no_video_url: &'static str,
    too_many_images: &'static str,
    timed_out_minutes: &'static str,
    timed_out_seconds: &'static str,
}

static EN: LocaleStrings = LocaleStrings {
    consent_required: "Please confirm you have permission to create content from this website.",
    url_required: "Please enter the website URL.",
    start_failed: "Failed to start job",
    job_failed: "Job failed",
    cancelled: "Polling was cancelled.",
    no_video_url: "The job completed without a video URL.",
    too_many_images: "You can upload at most {max} images.",
    timed_out_minutes: "Job timed out after {n} minutes",
    timed_out_seconds: "Job timed out after {n} seconds",
};

static DE: LocaleStrings = LocaleStrings {
    consent_required: "Bitte bestätige, dass du Inhalte von dieser Website verwenden darfst.",
    url_required: "Bitte gib die Website-URL ein.",
    start_failed: "Auftrag konnte nicht gestartet werden",
    job_failed: "Auftrag fehlgeschlagen",
    cancelled: "Die Abfrage wurde abgebrochen.",
    no_video_url: "Der Auftrag wurde ohne Video-URL abgeschlossen.",
    too_many_images: "Du kannst maximal {max} Bilder hochladen.",
    timed_out_minutes: "Zeitüberschreitung nach {n} Minuten",
    timed_out_seconds: "Zeitüberschreitung nach {n} Sekunden",
};

impl Locale {
    pub fn strings(self) -> &'static LocaleStrings {
        match self {
            Locale::En => &EN,
            Locale::De => &DE,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }
}

impl LocaleStrings {
    /// Notice raised when an intake goes past the image cap
    pub fn too_many_images(&self, max: usize) -> String {
        self.too_many_images.replace("{max}", &max.to_string())
    }

    /// Timeout text, in whole minutes once the ceiling reaches one minute
    pub fn timed_out(&self, ceiling: Duration) -> String {
        let secs = ceiling.as_secs();
        if secs >= 60 {
            self.timed_out_minutes.replace("{n}", &(secs / 60).to_string())
        } else {
            self.timed_out_seconds.replace("{n}", &secs.to_string())
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "de" | "german" | "deutsch" => Ok(Locale::De),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}
