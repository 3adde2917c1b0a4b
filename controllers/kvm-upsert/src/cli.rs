//! CLI argument parsing.

use crate::error::UpsertError;
use crate::reconciler::UpsertTarget;
use apigee_client::DEFAULT_MGMT_URL;
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use gcp_auth::{
    CommandCredentialHelper, DEFAULT_HELPER_COMMAND, DEFAULT_METADATA_TOKEN_URL, DEFAULT_TOKENINFO_URL,
    TokenEndpoints,
};
use std::time::Duration;

/// Insert or update one entry of an Apigee environment key-value map.
///
/// The entry is left untouched when it already holds the desired value.
/// Otherwise it is deleted (if present) and inserted again.
#[derive(Debug, Clone, Parser)]
#[command(name = "kvm-upsert")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Apigee organization.
    #[arg(short, long, env = "APIGEE_ORG", value_parser = NonEmptyStringValueParser::new())]
    pub org: String,

    /// Apigee environment.
    #[arg(short, long, env = "APIGEE_ENV", value_parser = NonEmptyStringValueParser::new())]
    pub env: String,

    /// Key-value map name.
    #[arg(short, long, env = "APIGEE_KVM", value_parser = NonEmptyStringValueParser::new())]
    pub kvm: String,

    /// Entry name.
    #[arg(short = 'n', long = "entryname", value_parser = NonEmptyStringValueParser::new())]
    pub entry_name: String,

    /// Entry value.
    #[arg(short = 'v', long = "entryvalue", value_parser = NonEmptyStringValueParser::new())]
    pub entry_value: String,

    /// Take the token from the instance metadata server instead of the local credential helper.
    #[arg(short, long)]
    pub metadata: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub verbose: bool,

    /// Management API base URL.
    #[arg(long, env = "APIGEE_MGMT_URL", default_value = DEFAULT_MGMT_URL)]
    pub mgmt_url: String,

    /// Token introspection endpoint used to validate locally minted tokens.
    #[arg(long, default_value = DEFAULT_TOKENINFO_URL)]
    pub tokeninfo_url: String,

    /// Metadata server token endpoint.
    #[arg(long, default_value = DEFAULT_METADATA_TOKEN_URL)]
    pub metadata_token_url: String,

    /// Command that prints an access token on stdout.
    #[arg(long, env = "KVM_CREDENTIAL_HELPER", default_value = DEFAULT_HELPER_COMMAND)]
    pub credential_helper: String,

    /// Timeout for each HTTP request, in seconds.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout_secs: u64,

    /// Deadline for the whole run, in seconds.
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    pub deadline_secs: u64,
}

impl Cli {
    pub fn target(&self) -> Result<UpsertTarget, UpsertError> {
        UpsertTarget::new(
            self.org.as_str(),
            self.env.as_str(),
            self.kvm.as_str(),
            self.entry_name.as_str(),
            self.entry_value.as_str(),
        )
    }

    pub fn endpoints(&self) -> TokenEndpoints {
        TokenEndpoints {
            tokeninfo_url: self.tokeninfo_url.clone(),
            metadata_token_url: self.metadata_token_url.clone(),
        }
    }

    pub fn credential_helper(&self) -> Result<CommandCredentialHelper, UpsertError> {
        Ok(CommandCredentialHelper::from_command_line(&self.credential_helper)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}
