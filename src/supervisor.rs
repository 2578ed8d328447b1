use crate::errors::Error;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs the long-lived tasks until `stop` resolves or one of them exits on its own.
///
/// Either way every task is cancelled and given `grace` to finish before being
/// aborted. A task exiting before `stop` is reported as an error.
pub async fn supervise<S>(
    mut tasks: JoinSet<()>,
    shutdown: CancellationToken,
    grace: Duration,
    stop: S,
) -> Result<(), Error>
where
    S: Future<Output = ()>,
{
    let outcome = tokio::select! {
        _ = stop => {
            info!("shutdown requested");
            Ok(())
        }
        Some(joined) = tasks.join_next() => {
            warn!(?joined, "a background task exited early");
            Err(Error::BackgroundTaskStopped)
        }
    };
    shutdown.cancel();
    drain(tasks, grace).await;
    outcome
}

async fn drain(mut tasks: JoinSet<()>, grace: Duration) {
    let drained = tokio::time::timeout(grace, async {
        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "background task ended abnormally");
            }
        }
    })
    .await;
    if drained.is_err() {
        warn!(?grace, "background tasks did not stop in time, aborting them");
        tasks.abort_all();
    }
}
