//! Chunked file copy with progress reporting.

use std::path::Path;

use tgfetch_core::ports::ProgressCallback;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const CHUNK_SIZE: usize = 64 * 1024;

/// Copy `source` to `destination`, calling `progress` after every chunk.
///
/// Returns the number of bytes written. A partially written destination is
/// left in place on error.
pub async fn copy_with_progress(
    source: &Path,
    destination: &Path,
    progress: Option<&ProgressCallback>,
) -> std::io::Result<u64> {
    let mut reader = File::open(source).await?;
    let total = reader.metadata().await?.len();
    let mut writer = File::create(destination).await?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut done = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        done += n as u64;
        if let Some(progress) = progress {
            progress(done, total);
        }
    }
    writer.flush().await?;

    Ok(done)
}
