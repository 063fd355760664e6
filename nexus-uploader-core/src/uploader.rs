//! Upload Executor: PUTs one artifact file to its canonical location.

use bytes::Bytes;
use tracing::{error, info};

use crate::contract::{ArtifactFile, FailureReason, RemoteTarget, Transport, TransportError, UploadOutcome};
use crate::retry::RetryPolicy;

/// Maps an upload response status onto success or a typed rejection.
pub fn classify_upload_status(status: u16) -> Result<(), TransportError> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(TransportError::Unauthorized { status }),
        other => Err(TransportError::Rejected { status: other }),
    }
}

/// Reads `file` from disk and stores it on the server.
///
/// Never returns an error: every failure becomes [`UploadOutcome::Failed`] so
/// sibling files are unaffected.
pub async fn upload_file<T>(
    transport: &T,
    target: &RemoteTarget,
    file: &ArtifactFile,
    retry: &RetryPolicy,
) -> UploadOutcome
where
    T: Transport + ?Sized,
{
    let body = match tokio::fs::read(&file.absolute_path).await {
        Ok(body) => Bytes::from(body),
        Err(e) => {
            error!(path = %file.absolute_path.display(), error = %e, "Failed to read artifact from disk");
            return UploadOutcome::Failed(FailureReason::LocalRead(e.to_string()));
        }
    };

    let url = target.artifact_url(file);
    let put_url = url.as_str();
    let size = body.len();
    match retry
        .run("upload", put_url, move || transport.upload(put_url, body.clone()))
        .await
    {
        Ok(()) => {
            info!(path = %file.remote_path(), bytes = size, "Successfully uploaded");
            UploadOutcome::Uploaded
        }
        Err(e) => {
            error!(url = %url, error = %e, "Error uploading artifact to Nexus");
            UploadOutcome::Failed(FailureReason::Upload(e))
        }
    }
}
