use std::path::Path;

/// Make sure the node binary has its executable bits set.
///
/// Best-effort: failures are logged at debug level and ignored; the spawn
/// that follows reports the real problem if there is one.
#[cfg(unix)]
pub(super) async fn ensure_executable(binary: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let result = async {
        let mut permissions = tokio::fs::metadata(binary).await?.permissions();
        let mode = permissions.mode() | 0o755;
        if mode != permissions.mode() {
            permissions.set_mode(mode);
            tokio::fs::set_permissions(binary, permissions).await?;
        }
        Ok::<_, std::io::Error>(())
    }
    .await;

    if let Err(e) = result {
        tracing::debug!(binary = %binary.display(), error = %e, "Could not make node binary executable");
    }
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
pub(super) async fn ensure_executable(_binary: &Path) {}
