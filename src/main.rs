use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use reel_client::logging;
use reel_client::media::collect_image_paths;
use reel_client::{
    ApiProfile, Config, ConsoleView, FormController, FormInput, FormView, HttpReelApi, JobPoller,
    Locale, LogoPosition, MediaFile, PollSettings, ReelApi,
};

fn cli() -> Command {
    Command::new("ReelBerlin Client")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Turn a website into a promotional reel with the ReelBerlin API")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
                .global(true)
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Override the API base URL")
                .global(true)
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_name("PROFILE")
                .help("Endpoint layout: website or legacy")
                .global(true)
        )
        .arg(
            Arg::new("locale")
                .long("locale")
                .value_name("LANG")
                .help("Interface language: en or de")
                .global(true)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
                .global(true)
        )
        .subcommand(
            Command::new("submit")
                .about("Submit a website and wait for the reel")
                .arg(
                    Arg::new("url")
                        .short('u')
                        .long("url")
                        .value_name("URL")
                        .help("Website to turn into a reel")
                        .conflicts_with("demo")
                )
                .arg(
                    Arg::new("demo")
                        .long("demo")
                        .value_name("PATH")
                        .help("Use a demo site path on the configured demo origin")
                )
                .arg(Arg::new("business-name").long("business-name").value_name("NAME"))
                .arg(Arg::new("category").long("category").value_name("CATEGORY"))
                .arg(Arg::new("language").long("language").value_name("LANG"))
                .arg(
                    Arg::new("consent")
                        .long("consent")
                        .help("Confirm you have permission to use content from this website")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("image")
                        .short('i')
                        .long("image")
                        .value_name("FILE")
                        .help("Image to include (repeatable, at most 5)")
                        .action(ArgAction::Append)
                )
                .arg(
                    Arg::new("image-dir")
                        .long("image-dir")
                        .value_name("DIR")
                        .help("Include the images found in a directory")
                )
                .arg(Arg::new("logo").long("logo").value_name("FILE"))
                .arg(
                    Arg::new("logo-position")
                        .long("logo-position")
                        .value_name("POSITION")
                        .help("top-left, top-right, bottom-left or bottom-right")
                        .default_value("bottom-right")
                )
        )
        .subcommand(
            Command::new("status")
                .about("Follow an existing job")
                .arg(Arg::new("job-id").value_name("JOB_ID").required(true))
        )
        .subcommand(Command::new("health").about("Check that the API is reachable"))
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(Path::new(path))?,
        None => Config::load()?,
    };

    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.api.base_url = base_url.clone();
    }
    if let Some(profile) = matches.get_one::<String>("profile") {
        config.api.profile = profile.parse::<ApiProfile>().map_err(|e: String| anyhow!(e))?;
    }
    if let Some(locale) = matches.get_one::<String>("locale") {
        config.ui.locale = locale.parse::<Locale>().map_err(|e: String| anyhow!(e))?;
    }

    config.validate()?;
    Ok(config)
}

/// Cancel polling on Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping");
            trigger.cancel();
        }
    });
    token
}

async fn run_submit(config: Config, api: Arc<dyn ReelApi>, matches: &ArgMatches) -> Result<()> {
    let website = match (matches.get_one::<String>("url"), matches.get_one::<String>("demo")) {
        (Some(url), _) => url.clone(),
        (None, Some(path)) => config.demo_url(path)?,
        (None, None) => String::new(),
    };

    let input = FormInput {
        website,
        business_name: matches.get_one::<String>("business-name").cloned(),
        category: matches.get_one::<String>("category").cloned(),
        language: matches.get_one::<String>("language").cloned(),
        consent: matches.get_flag("consent"),
    };

    let mut image_paths: Vec<PathBuf> = matches
        .get_many::<String>("image")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default();
    if let Some(dir) = matches.get_one::<String>("image-dir") {
        let dir = PathBuf::from(dir);
        if !dir.is_dir() {
            return Err(anyhow!("Image directory not found: {}", dir.display()));
        }
        image_paths.extend(collect_image_paths(&dir));
    }

    let view = Arc::new(ConsoleView::new());
    let mut controller = FormController::new(Arc::clone(&api), Arc::clone(&view), config);

    if !image_paths.is_empty() {
        let mut files = Vec::with_capacity(image_paths.len());
        for path in &image_paths {
            files.push(MediaFile::from_path(path).await?);
        }
        let report = controller.add_images(files).await?;
        debug!(
            "Image intake: {} accepted, {} skipped, {} rejected",
            report.accepted,
            report.skipped.len(),
            report.rejected.len()
        );
    }

    if let Some(logo_path) = matches.get_one::<String>("logo") {
        let position: LogoPosition = matches
            .get_one::<String>("logo-position")
            .map(|p| p.parse::<LogoPosition>())
            .transpose()
            .map_err(|e: String| anyhow!(e))?
            .unwrap_or_default();
        let file = MediaFile::from_path(Path::new(logo_path)).await?;
        if !controller.set_logo(file, position).await? {
            view.notice(&format!("{} is not an image, logo ignored", logo_path));
        }
    }

    let cancel = cancel_on_ctrl_c();
    let outcome = controller.submit_with_cancel(&input, &cancel).await?;
    info!("Job {} finished after {} polls", outcome.job_id, outcome.attempts);
    Ok(())
}

async fn run_status(config: Config, api: Arc<dyn ReelApi>, job_id: &str) -> Result<()> {
    let view = ConsoleView::new();
    let poller = JobPoller::new(api, PollSettings::from(&config.polling), config.ui.locale);

    let cancel = cancel_on_ctrl_c();
    match poller.run(job_id, &view, &cancel).await {
        Ok(outcome) => {
            match outcome.video_url {
                Some(url) => view.show_video(&url),
                None => view.notice(config.ui.locale.strings().no_video_url),
            }
            Ok(())
        }
        Err(e) => {
            view.alert(&e.user_message(config.ui.locale));
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let verbose = matches.get_flag("verbose");

    // Before the config, so problems reading it are reported
    let log_control = logging::init(verbose);
    let config = load_config(&matches)?;
    log_control.apply_config(&config);

    info!("🚀 ReelBerlin client starting...");
    debug!("{}", config.summary());

    let api: Arc<dyn ReelApi> = Arc::new(HttpReelApi::new(&config.api)?);

    match matches.subcommand() {
        Some(("submit", sub)) => {
            // Best effort, a failed probe does not stop the submission
            api.is_available().await;
            run_submit(config, api, sub).await
        }
        Some(("status", sub)) => {
            let job_id = sub
                .get_one::<String>("job-id")
                .ok_or_else(|| anyhow!("job id is required"))?;
            run_status(config, api, job_id).await
        }
        Some(("health", _)) => {
            if api.is_available().await {
                println!("✅ API reachable at {}", config.api.base_url);
                Ok(())
            } else {
                Err(anyhow!("API not reachable at {}", config.api.base_url))
            }
        }
        _ => Err(anyhow!("unknown command")),
    }
}
