//! Validated run configuration built from CLI arguments.
use crate::cli::RootArgs;
use clap::ValueEnum;
use thiserror::Error;

/// Git provider hosting the organisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// GitHub
    Gh,
    /// GitLab
    Gl,
    /// Bitbucket
    Bb,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gh => "gh",
            Self::Gl => "gl",
            Self::Bb => "bb",
        }
    }
}

/// Knobs that steer the workflow once the client is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RunOptions {
    /// Enable (true) or disable (false) Security patterns.
    pub(crate) enable: bool,
    pub(crate) promote: bool,
    pub(crate) skip_live: bool,
    pub(crate) dry_run: bool,
    pub(crate) verbose: bool,
}

impl RunOptions {
    pub(crate) fn action(&self) -> &'static str {
        if self.enable {
            "enable"
        } else {
            "disable"
        }
    }

    pub(crate) fn action_verb(&self) -> &'static str {
        if self.enable {
            "Enabling"
        } else {
            "Disabling"
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("API token is required; use --api-token or set CODACY_API_TOKEN")]
    MissingToken,
    #[error("--organization is required")]
    MissingOrganization,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) api_token: String,
    pub(crate) api_base_url: String,
    pub(crate) provider: Provider,
    pub(crate) organization: String,
    /// `None` processes every standard of the organisation.
    pub(crate) coding_standard_id: Option<i64>,
    pub(crate) options: RunOptions,
}

impl Config {
    pub(crate) fn from_args(args: RootArgs) -> Result<Self, ConfigError> {
        let api_token = non_blank(args.api_token).ok_or(ConfigError::MissingToken)?;
        let organization = non_blank(args.organization).ok_or(ConfigError::MissingOrganization)?;
        Ok(Self {
            api_token,
            api_base_url: args.api_base_url,
            provider: args.provider,
            organization,
            coding_standard_id: (args.coding_standard_id != 0).then_some(args.coding_standard_id),
            options: RunOptions {
                enable: args.enable,
                promote: args.promote,
                skip_live: args.skip_live,
                dry_run: args.dry_run,
                verbose: args.verbose,
            },
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
