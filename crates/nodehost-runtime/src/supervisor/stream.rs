//! Output pumps: child stdout/stderr into the log sink.
//!
//! Reads raw chunks rather than lines. The node can emit non-UTF8 bytes and
//! the tail must reflect exactly the latest chunk.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::logsink::LogSink;

const CHUNK_SIZE: usize = 8 * 1024;

pub(super) fn spawn_output_pump<R>(
    mut stream: R,
    pid: u32,
    stream_type: &'static str,
    sink: LogSink,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut write_failed = false;

        loop {
            match stream.read(&mut buf).await {
                Ok(0) => break, // EOF
                Ok(n) => {
                    let chunk = &buf[..n];
                    if let Err(e) = sink.write_chunk(chunk).await
                        && !write_failed
                    {
                        warn!(pid, %stream_type, error = %e, path = %sink.path().display(), "Failed to write node log");
                        write_failed = true;
                    }
                    debug!(
                        target: "nodehost::service",
                        pid,
                        %stream_type,
                        "{}",
                        String::from_utf8_lossy(chunk).trim_end()
                    );
                }
                Err(e) => {
                    debug!(pid, %stream_type, error = %e, "output pump exiting due to read error");
                    break;
                }
            }
        }

        debug!(pid, %stream_type, "output pump task exiting");
    })
}
