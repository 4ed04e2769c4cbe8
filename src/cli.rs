//! CLI argument parsing for the security toggler.
//!
//! The CLI only collects flags; validation and defaults that depend on the
//! environment live in [`crate::config`].
use crate::api::DEFAULT_BASE_URL;
use crate::config::Provider;
use clap::{ArgAction, Parser};

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "codacy-security-toggler",
    version,
    about = "Toggle Security-category patterns across Codacy coding standards",
    long_about = "Toggles Security-category code patterns across all tools of one or more coding\nstandards in a Codacy organisation, then optionally promotes the updated draft to\nan effective coding standard. Repositories that follow no coding standard are\nupdated directly afterwards.",
    after_help = "Examples:\n  # Enable security patterns on all coding standards and promote each draft\n  codacy-security-toggler --provider gh --organization my-org --enable true\n\n  # Disable security patterns on one coding standard (dry run first)\n  codacy-security-toggler --organization my-org --coding-standard-id 42 --enable false --dry-run\n\n  # Enable without promoting (leave drafts for review)\n  codacy-security-toggler --organization my-org --promote false"
)]
pub struct RootArgs {
    /// Codacy API token
    #[arg(long, value_name = "TOKEN", env = "CODACY_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Git provider hosting the organisation
    #[arg(long, value_enum, default_value_t = Provider::Gh)]
    pub provider: Provider,

    /// Organisation name on the Git provider
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,

    /// Coding standard to process (0 = all standards)
    #[arg(long, value_name = "ID", default_value_t = 0)]
    pub coding_standard_id: i64,

    /// true enables security patterns, false disables them
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub enable: bool,

    /// Promote each draft after updating its patterns
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub promote: bool,

    /// Skip coding standards that are not drafts instead of copying them
    #[arg(long)]
    pub skip_live: bool,

    /// Print what would happen without making any changes
    #[arg(long)]
    pub dry_run: bool,

    /// Print per-tool detail and debug logs
    #[arg(long)]
    pub verbose: bool,

    /// Codacy API base URL
    #[arg(
        long,
        value_name = "URL",
        env = "CODACY_API_BASE_URL",
        default_value = DEFAULT_BASE_URL
    )]
    pub api_base_url: String,
}
