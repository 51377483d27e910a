/// ReelBerlin client
///
/// Submits a website to the ReelBerlin video generation service, with optional
/// business metadata, images and a logo, then follows the job until the reel
/// is ready.

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod locale;
pub mod logging;
pub mod media;
pub mod poller;
pub mod status;
pub mod view;

// Re-export main types for easy access
pub use crate::api::{CreateJobRequest, HttpReelApi, JobStatusResponse, ReelApi};
pub use crate::config::{ApiProfile, Config, ConfigBuilder};
pub use crate::error::{ReelError, Result};
pub use crate::form::{FormController, FormInput};
pub use crate::locale::Locale;
pub use crate::media::{ImageList, IntakeReport, LogoImage, LogoPosition, MediaFile, UploadedImage};
pub use crate::poller::{JobPoller, PollOutcome, PollSettings, PollTask};
pub use crate::status::{present, JobStatus, StatusPresentation};
pub use crate::view::{ConsoleView, FormView, StatusSink};
