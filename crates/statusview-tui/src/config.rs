use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "statusview", about = "Project status viewer")]
pub struct ViewerConfig {
    /// JSON file holding the `projectsData` property (or the full property bag)
    #[arg(long, env = "STATUSVIEW_DATA")]
    pub data: PathBuf,

    /// Instance base URL prepended to relative links before opening them
    #[arg(long, env = "STATUSVIEW_INSTANCE_URL", default_value = "")]
    pub instance_url: String,

    /// Command used to open links, e.g. `xdg-open`.
    /// Without one, links are shown in the status bar instead.
    #[arg(long, env = "STATUSVIEW_OPENER")]
    pub opener: Option<String>,

    /// Write logs here. The terminal belongs to the UI, so there is no
    /// logging without it.
    #[arg(long, env = "STATUSVIEW_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Joins an instance-relative link (`/nav_to.do?...`) onto `base`.
/// Absolute links and an empty base are passed through.
pub fn absolute_url(base: &str, link: &str) -> String {
    if base.is_empty() || !link.starts_with('/') {
        return link.to_string();
    }
    format!("{}{link}", base.trim_end_matches('/'))
}
