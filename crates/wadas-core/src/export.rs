// ── Export flow ──
//
// Exports every row matching the filters currently applied to a list
// (never just the visible page) and hands the resulting file to an
// injected sink. Export state is tracked separately from the list view
// and never touches it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::list::ListController;
use crate::sources::ListSource;
use crate::stream::StateStream;

/// Inline message shown when an export fails for any reason other than
/// a lost session.
pub const EXPORT_ERROR: &str = "Problem exporting data";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportState {
    pub loading: bool,
    pub error: Option<String>,
}

/// A named file ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

impl Artifact {
    pub fn csv(file_name: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: "text/csv",
            bytes,
        }
    }
}

/// Delivers an exported file to wherever the host environment keeps
/// downloads.
pub trait ArtifactSink: Send + Sync {
    /// Deliver `artifact`, returning where it ended up.
    fn deliver(&self, artifact: &Artifact) -> Result<PathBuf, CoreError>;
}

/// Writes artifacts to disk.
#[derive(Debug, Clone)]
pub enum FileSink {
    /// Into a directory, under the artifact's own file name.
    Directory(PathBuf),
    /// To an exact path, ignoring the artifact's file name.
    File(PathBuf),
}

impl FileSink {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self::Directory(dir.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    fn target(&self, artifact: &Artifact) -> PathBuf {
        match self {
            Self::Directory(dir) => dir.join(&artifact.file_name),
            Self::File(path) => path.clone(),
        }
    }
}

impl ArtifactSink for FileSink {
    fn deliver(&self, artifact: &Artifact) -> Result<PathBuf, CoreError> {
        let path = self.target(artifact);
        write_file(&path, &artifact.bytes)?;
        Ok(path)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    fs::write(path, bytes).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Controller integration ───────────────────────────────────────────

impl<S: ListSource> ListController<S> {
    pub fn export_state(&self) -> ExportState {
        self.inner.export.borrow().clone()
    }

    pub fn subscribe_export(&self) -> StateStream<ExportState> {
        StateStream::new(self.inner.export.subscribe())
    }

    /// Export every row matching the active filters and deliver it to
    /// `sink`.
    ///
    /// Runs independently of any in-flight page load. Only the newest
    /// export updates the export state.
    pub async fn export_current(&self, sink: &dyn ArtifactSink) -> Result<PathBuf, CoreError> {
        let inner = &self.inner;
        let seq = inner.export_seq.fetch_add(1, Ordering::SeqCst) + 1;
        inner.export.send_replace(ExportState {
            loading: true,
            error: None,
        });

        let filters = self.filters();
        let result = match self.session().call(|| self.source().export(&filters)).await {
            Ok(bytes) => {
                let artifact = Artifact::csv(self.source().export_file_name(), bytes);
                sink.deliver(&artifact)
            }
            Err(e) => Err(e),
        };

        if self.is_detached() {
            return result;
        }
        if inner.export_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "newer export in flight, leaving state alone");
            if matches!(&result, Err(e) if e.is_unauthorized()) {
                self.session().redirect_to_login();
            }
            return result;
        }

        match &result {
            Ok(path) => {
                info!(path = %path.display(), "export delivered");
                inner.export.send_replace(ExportState::default());
            }
            Err(e) if e.is_unauthorized() => {
                inner.export.send_replace(ExportState::default());
                self.session().redirect_to_login();
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                inner.export.send_replace(ExportState {
                    loading: false,
                    error: Some(EXPORT_ERROR.to_owned()),
                });
            }
        }
        result
    }
}
