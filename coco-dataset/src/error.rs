use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions of a dataset load.
///
/// These travel inside [anyhow::Error] and can be recovered with
/// `downcast_ref::<LoadError>()`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read annotation file '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse annotation source '{name}'")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("annotation ids in '{name}' are not unique")]
    DuplicateAnnotationIds { name: String },
}
