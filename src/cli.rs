//! Command-line surface over the command layer.
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use crate::commands::{self, ConfigResponse};
use crate::core::error::HelperResult;
use crate::core::state::AppState;
use crate::core::update::{format_file_size, UpdateCheckResult};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "ideconfig", bin_name = "ideconfig")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding remembered settings
    #[arg(long, global = true, env = "IDECONFIG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inject the agent flags into every .vmoptions file of an IDE
    Apply {
        /// IDE installation directory or its bin directory
        ide_path: Option<String>,
        /// Directory containing ja-netfilter.jar
        config_dir: Option<String>,
    },
    /// Remove the agent flags from every .vmoptions file of an IDE
    Clear { ide_path: Option<String> },
    /// Report whether a path exists
    Exists { path: String },
    /// Show application information
    About,
    /// Look up the latest published release
    CheckUpdate {
        /// Version to compare against instead of this build's
        #[arg(long)]
        current: Option<String>,
    },
    /// Print the first reachable download host
    Mirror,
    /// Rewrite a github.com URL onto the first reachable mirror
    ConvertUrl { url: String },
}

impl Command {
    pub async fn run(self, state: &mut AppState, json: bool) -> HelperResult<()> {
        match self {
            Self::Apply {
                ide_path,
                config_dir,
            } => {
                let ide = commands::remembered_or(ide_path, state.settings.last_ide_path.as_ref());
                let config =
                    commands::remembered_or(config_dir, state.settings.last_config_path.as_ref());
                let response = commands::apply_config(state, &ide, &config)?;
                emit(json, &response, render_config)
            }
            Self::Clear { ide_path } => {
                let ide = commands::remembered_or(ide_path, state.settings.last_ide_path.as_ref());
                let response = commands::clear_config(state, &ide)?;
                emit(json, &response, render_config)
            }
            Self::Exists { path } => {
                let response = commands::path_exists(&path)?;
                emit(json, &response, |r| {
                    let verdict = if r.exists { "exists" } else { "does not exist" };
                    format!("{} {}", r.path, verdict)
                })
            }
            Self::About => emit(json, &commands::get_about_info(), |about| {
                let mut out = format!(
                    "{} {}\nPlatform: {}\nRepository: {}",
                    about.app_name, about.version, about.platform, about.repo_url
                );
                for dev in &about.developers {
                    out.push_str(&format!("\nDeveloper: {} <{}>", dev.name, dev.url));
                }
                out
            }),
            Self::CheckUpdate { current } => {
                let result = commands::check_for_updates(state, current.as_deref()).await?;
                emit(json, &result, render_update)
            }
            Self::Mirror => {
                let response = commands::get_accessible_mirror(state).await;
                emit(json, &response, |r| r.url.clone())
            }
            Self::ConvertUrl { url } => {
                let response = commands::convert_to_accessible_url(state, &url).await;
                emit(json, &response, |r| r.url.clone())
            }
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> HelperResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn render_config(response: &ConfigResponse) -> String {
    let mut out = String::new();
    for file in &response.files {
        out.push_str(&format!(
            "  {} (removed {}, added {})\n",
            file.file, file.report.removed, file.report.appended
        ));
    }
    out.push_str(&response.message);
    out
}

fn render_update(result: &UpdateCheckResult) -> String {
    let Some(release) = &result.release else {
        return format!("No published release found (current {}).", result.current_version);
    };

    if !result.has_update {
        return format!("Up to date ({}).", result.current_version);
    }

    let mut out = format!(
        "Update available: {} -> {} (published {})\n{}",
        result.current_version,
        release.version,
        release.published_date(),
        release.html_url
    );
    for asset in &release.assets {
        out.push_str(&format!(
            "\n  {} [{}] {}",
            asset.name,
            format_file_size(asset.size),
            asset.download_url
        ));
    }
    if !release.body.trim().is_empty() {
        out.push_str("\n\n");
        out.push_str(release.body.trim());
    }
    out
}
