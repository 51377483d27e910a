//! Form/upload controller: input validation, image and logo intake, payload
//! assembly and the submit flow.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use url::Url;

use crate::api::{CreateJobRequest, ReelApi};
use crate::config::Config;
use crate::error::{ReelError, Result};
use crate::media::{ImageList, IntakeReport, LogoImage, LogoPosition, MediaFile, UploadedImage};
use crate::poller::{JobPoller, PollOutcome, PollSettings};
use crate::status::{present_failure, JobStatus};
use crate::view::FormView;

/// What the user typed into the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub website: String,
    pub business_name: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub consent: bool,
}

impl FormInput {
    pub fn new(website: impl Into<String>) -> Self {
        Self {
            website: website.into(),
            ..Default::default()
        }
    }

    pub fn with_business_name(mut self, name: impl Into<String>) -> Self {
        self.business_name = Some(name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_consent(mut self, consent: bool) -> Self {
        self.consent = consent;
        self
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Keeps the submit control disabled while alive
struct SubmitGuard<'a, V: FormView> {
    view: &'a V,
}

impl<'a, V: FormView> SubmitGuard<'a, V> {
    fn engage(view: &'a V) -> Self {
        view.set_submitting(true);
        Self { view }
    }
}

impl<V: FormView> Drop for SubmitGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_submitting(false);
    }
}

/// Owns the form state for one page session
pub struct FormController<V: FormView> {
    api: Arc<dyn ReelApi>,
    view: Arc<V>,
    config: Config,
    images: ImageList,
    logo: Option<LogoImage>,
}

impl<V: FormView> FormController<V> {
    pub fn new(api: Arc<dyn ReelApi>, view: Arc<V>, config: Config) -> Self {
        let images = ImageList::with_limit(config.media.max_images);
        Self {
            api,
            view,
            config,
            images,
            logo: None,
        }
    }

    pub fn images(&self) -> &[UploadedImage] {
        self.images.images()
    }

    pub fn logo(&self) -> Option<&LogoImage> {
        self.logo.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Add selected or dropped files to the preview list
    pub async fn add_images(&mut self, files: Vec<MediaFile>) -> Result<IntakeReport> {
        if !self.config.features.file_upload {
            return Err(ReelError::FeatureDisabled("file upload"));
        }

        let report = self.images.intake(files).await?;

        if report.hit_limit() {
            let strings = self.config.ui.locale.strings();
            self.view.notice(&strings.too_many_images(self.images.limit()));
        }
        if report.accepted > 0 {
            self.view.render_previews(self.images.images());
        }

        Ok(report)
    }

    /// Drop the preview at `index`
    pub fn remove_image(&mut self, index: usize) -> Option<UploadedImage> {
        let removed = self.images.remove(index);
        match &removed {
            Some(image) => {
                info!("Removed image {} ({})", index, image.original_name);
                self.view.render_previews(self.images.images());
            }
            None => warn!("No image at index {} to remove", index),
        }
        removed
    }

    /// Replace the logo; returns false when the file was not an image
    pub async fn set_logo(&mut self, file: MediaFile, position: LogoPosition) -> Result<bool> {
        if !self.config.features.logo_upload {
            return Err(ReelError::FeatureDisabled("logo upload"));
        }

        match LogoImage::from_file(file, position).await? {
            Some(logo) => {
                info!("Logo set to {} at {}", logo.original_name, logo.position);
                self.logo = Some(logo);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear_logo(&mut self) {
        self.logo = None;
    }

    /// Assemble the create-job body from the input and the held media
    pub fn build_request(&self, input: &FormInput) -> CreateJobRequest {
        let language = non_empty(&input.language).or_else(|| non_empty(&self.config.ui.default_language));

        let media = if self.config.features.file_upload && !self.images.is_empty() {
            Some(self.images.inline_data())
        } else {
            None
        };

        let (logo_url, logo_position) = match (&self.logo, self.config.features.logo_upload) {
            (Some(logo), true) => (
                Some(logo.inline_data.clone()),
                Some(logo.position.as_str().to_string()),
            ),
            _ => (None, None),
        };

        CreateJobRequest {
            website: input.website.trim().to_string(),
            business_name: non_empty(&input.business_name),
            category: non_empty(&input.category),
            consent: true,
            language,
            media,
            logo_url,
            logo_position,
        }
    }

    fn validate(&self, input: &FormInput) -> Result<()> {
        let strings = self.config.ui.locale.strings();
        let website = input.website.trim();

        if website.is_empty() {
            self.view.alert(strings.url_required);
            return Err(ReelError::Validation("website URL is required".to_string()));
        }
        if let Err(e) = Url::parse(website) {
            self.view.alert(strings.url_required);
            return Err(ReelError::Validation(format!("invalid website URL {}: {}", website, e)));
        }
        if !input.consent {
            self.view.alert(strings.consent_required);
            return Err(ReelError::Validation("consent not given".to_string()));
        }
        Ok(())
    }

    /// Submit the form and follow the job to the end
    pub async fn submit(&self, input: &FormInput) -> Result<PollOutcome> {
        self.submit_with_cancel(input, &CancellationToken::new()).await
    }

    /// Submit, letting `cancel` stop the poll loop.
    ///
    /// Every failure after validation is shown as the failed status; the
    /// submit control is re-enabled on every exit path.
    pub async fn submit_with_cancel(
        &self,
        input: &FormInput,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome> {
        self.validate(input)?;

        let _guard = SubmitGuard::engage(self.view.as_ref());
        let request = self.build_request(input);
        let locale = self.config.ui.locale;

        let result = self.create_and_poll(&request, cancel).await;

        match result {
            Ok(outcome) => {
                match &outcome.video_url {
                    Some(url) => self.view.show_video(url),
                    None => {
                        warn!("Job {} completed without a video URL", outcome.job_id);
                        self.view.notice(locale.strings().no_video_url);
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                error!("Submission failed: {}", e);
                let presentation = present_failure(&e.user_message(locale), locale);
                self.view.on_status(&JobStatus::Failed, &presentation);
                Err(e)
            }
        }
    }

    async fn create_and_poll(
        &self,
        request: &CreateJobRequest,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome> {
        info!(
            "Submitting {} with {} image(s){}",
            request.website,
            request.media.as_ref().map_or(0, Vec::len),
            if request.logo_url.is_some() { " and a logo" } else { "" }
        );

        let job_id = self.api.create_job(request).await?;

        let poller = JobPoller::new(
            Arc::clone(&self.api),
            PollSettings::from(&self.config.polling),
            self.config.ui.locale,
        );
        poller.run(&job_id, self.view.as_ref(), cancel).await
    }
}
