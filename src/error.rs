// error.rs — 引擎错误类型

use std::path::PathBuf;

/// Errors raised while configuring a sphere or loading its inputs.
///
/// Layout math itself never fails: every error here is detected up front,
/// before any position is generated.
#[derive(Debug, thiserror::Error)]
pub enum SphereError {
    #[error("container size must be a positive finite number, got {0}")]
    InvalidContainerSize(f32),

    #[error("sphere radius must be a positive finite number, got {0}")]
    InvalidRadius(f32),

    #[error("invalid value for `{name}`: {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate image id `{0}`")]
    DuplicateImageId(String),
}

pub type Result<T, E = SphereError> = std::result::Result<T, E>;
