use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use imm_core::{AudioSettings, Document, ImmError, ImmResult};

use crate::container;

/// Destination for a finished document.
///
/// Export is a single blocking call: either the whole document reaches the
/// destination or an error is returned.
pub trait ExportSink {
    /// Write `document` to `path`, returning the number of bytes written.
    fn export(&mut self, document: &Document, path: &Path, audio: AudioSettings) -> ImmResult<u64>;
}

/// Writes `.imm` container files.
///
/// The container is written to a sibling `.partial` file first and renamed
/// into place, so a failed export never leaves a truncated file at `path`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmFileSink;

impl ImmFileSink {
    pub fn new() -> Self {
        Self
    }

    fn partial_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".partial");
        path.with_file_name(name)
    }
}

impl ExportSink for ImmFileSink {
    fn export(&mut self, document: &Document, path: &Path, audio: AudioSettings) -> ImmResult<u64> {
        if path.as_os_str().is_empty() {
            return Err(ImmError::export("empty output path", path));
        }
        if path.file_name().is_none() {
            return Err(ImmError::export("output path has no file name", path));
        }

        let bytes = container::encode(document, audio)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let partial = Self::partial_path(path);
        let written = File::create(&partial)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                writer.write_all(&bytes)?;
                writer.flush()
            })
            .and_then(|_| std::fs::rename(&partial, path));

        if let Err(e) = written {
            let _ = std::fs::remove_file(&partial);
            return Err(ImmError::export(format!("failed to write container: {}", e), path));
        }

        tracing::info!(
            "Encoded document {} to {} ({} bytes, {} layers, audio {:?} @ {}bps)",
            document.id,
            path.display(),
            bytes.len(),
            document.layer_count(),
            audio.codec,
            audio.bitrate,
        );

        Ok(bytes.len() as u64)
    }
}
