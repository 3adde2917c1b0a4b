//! KVM Upsert
//!
//! Resolves a Google Cloud access token, then makes one Apigee environment
//! key-value map entry hold the desired value:
//! - Entry already holds the value: nothing is changed
//! - Entry absent: it is inserted
//! - Entry holds another value: it is deleted and inserted again

pub mod cli;
pub mod error;
pub mod reconciler;

pub use cli::Cli;
pub use error::{Step, UpsertError};
pub use reconciler::{KvmReconciler, UpsertOutcome, UpsertTarget};

use apigee_client::ApigeeClient;
use gcp_auth::TokenProvider;
use tracing::{debug, info};

/// Authenticate and upsert the entry described by `cli`.
pub async fn run(cli: &Cli) -> Result<UpsertOutcome, UpsertError> {
    let target = cli.target()?;

    let provider = TokenProvider::new(
        cli.endpoints(),
        Box::new(cli.credential_helper()?),
        cli.request_timeout(),
    )?;
    let token = provider.resolve(cli.metadata).await?;
    debug!("Resolved access token: {:?}", token);

    let client = ApigeeClient::new(cli.mgmt_url.clone(), token.access_token, cli.request_timeout())
        .map_err(|e| UpsertError::InvalidConfig(format!("cannot build HTTP client: {e}")))?;
    info!("Using management API at {}", client.base_url());

    KvmReconciler::new(Box::new(client)).upsert(&target).await
}

/// [`run`] bounded by the process-wide deadline.
pub async fn run_with_deadline(cli: &Cli) -> Result<UpsertOutcome, UpsertError> {
    tokio::time::timeout(cli.deadline(), run(cli))
        .await
        .map_err(|_elapsed| UpsertError::DeadlineExceeded(cli.deadline_secs))?
}
