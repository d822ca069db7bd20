//! Local stream transport: a domain socket on Unix, a named pipe on Windows.

use std::io;
use std::path::Path;

#[cfg(unix)]
pub async fn connect(address: &Path) -> io::Result<tokio::net::UnixStream> {
    tokio::net::UnixStream::connect(address).await
}

#[cfg(windows)]
#[allow(clippy::unused_async)]
pub async fn connect(
    address: &Path,
) -> io::Result<tokio::net::windows::named_pipe::NamedPipeClient> {
    tokio::net::windows::named_pipe::ClientOptions::new().open(address)
}
