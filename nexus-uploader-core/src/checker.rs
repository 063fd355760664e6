//! Remote Existence Checker.
//!
//! An inconclusive probe is never read as "safe to upload" nor as "safe to
//! skip": anything other than a 2xx or a 404 fails the file.

use tracing::{debug, info, warn};

use crate::contract::{
    ArtifactFile, FailureReason, Presence, RemoteTarget, Transport, TransportError, UploadOutcome,
};
use crate::retry::RetryPolicy;

/// What to do with a file after its presence probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckDecision {
    Upload,
    Done(UploadOutcome),
}

/// Maps a probe response status onto presence.
pub fn classify_probe_status(status: u16) -> Result<Presence, TransportError> {
    match status {
        200..=299 => Ok(Presence::Exists),
        404 => Ok(Presence::Missing),
        401 | 403 => Err(TransportError::Unauthorized { status }),
        other => Err(TransportError::Rejected { status: other }),
    }
}

pub async fn check_presence<T>(
    transport: &T,
    target: &RemoteTarget,
    file: &ArtifactFile,
    retry: &RetryPolicy,
) -> CheckDecision
where
    T: Transport + ?Sized,
{
    let url = target.artifact_url(file);
    debug!(url = %url, "Checking for artifact");
    let probe_url = url.as_str();
    match retry
        .run("probe", probe_url, move || transport.probe(probe_url))
        .await
    {
        Ok(Presence::Exists) => {
            info!(path = %file.remote_path(), "Will *NOT* upload, artifact already exists");
            CheckDecision::Done(UploadOutcome::SkippedExisting)
        }
        Ok(Presence::Missing) => CheckDecision::Upload,
        Err(e) => {
            warn!(path = %file.remote_path(), error = %e, "Error checking status of artifact");
            CheckDecision::Done(UploadOutcome::Failed(FailureReason::Check(e)))
        }
    }
}
