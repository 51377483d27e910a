//! Presentation seam between the controller and whatever shows the form

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::media::UploadedImage;
use crate::status::{JobStatus, StatusPresentation};

/// Receives every status the poller projects
pub trait StatusSink: Send + Sync {
    fn on_status(&self, status: &JobStatus, presentation: &StatusPresentation);
}

/// Everything the form controller shows to the user
pub trait FormView: StatusSink {
    /// Blocking prompt, e.g. missing consent
    fn alert(&self, message: &str);

    /// Non-blocking notice, e.g. too many images
    fn notice(&self, message: &str);

    /// Disable or re-enable the submit control
    fn set_submitting(&self, submitting: bool);

    /// Full re-render of the image previews
    fn render_previews(&self, images: &[UploadedImage]);

    fn show_video(&self, url: &str);
}

/// `[#########-----------]  45%`
pub fn progress_bar(progress: u8, width: usize) -> String {
    let progress = progress.min(100) as usize;
    let filled = progress * width / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        progress
    )
}

/// Terminal rendering of the form
pub struct ConsoleView {
    submitting: AtomicBool,
    last_status: Mutex<Option<StatusPresentation>>,
    bar_width: usize,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self {
            submitting: AtomicBool::new(false),
            last_status: Mutex::new(None),
            bar_width: 30,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    fn print(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", line);
    }
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for ConsoleView {
    fn on_status(&self, _status: &JobStatus, presentation: &StatusPresentation) {
        let mut last = match self.last_status.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Repeated polls of the same stage only print once
        if last.as_ref() == Some(presentation) {
            return;
        }
        self.print(&format!(
            "{} {}  {}",
            progress_bar(presentation.progress, self.bar_width),
            presentation.title,
            presentation.message
        ));
        *last = Some(presentation.clone());
    }
}

impl FormView for ConsoleView {
    fn alert(&self, message: &str) {
        eprintln!("⚠️  {}", message);
    }

    fn notice(&self, message: &str) {
        eprintln!("ℹ️  {}", message);
    }

    fn set_submitting(&self, submitting: bool) {
        self.submitting.store(submitting, Ordering::SeqCst);
        if submitting {
            self.print("⏳ Submitting...");
        }
    }

    fn render_previews(&self, images: &[UploadedImage]) {
        if images.is_empty() {
            self.print("🖼️  No images selected");
            return;
        }
        self.print(&format!("🖼️  {} image(s) selected:", images.len()));
        for (index, image) in images.iter().enumerate() {
            self.print(&format!(
                "   [{}] {} ({} bytes encoded)",
                index,
                image.original_name,
                image.inline_data.len()
            ));
        }
    }

    fn show_video(&self, url: &str) {
        self.print(&format!("🎬 {}", url));
    }
}
