//! error taxonomy shared by every stage of loading, resolving and writing
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("File '{}' not found or unreadable", .0.display())]
    ConfigFileNotFound(PathBuf),

    #[error("Loader file '{}' not found or unreadable", .0.display())]
    LoaderFileNotFound(PathBuf),

    #[error("Loader file '{}' miss a '{key}' key", .path.display())]
    LoaderKeyNotFound { path: PathBuf, key: String },

    #[error("{0}")]
    InvalidKey(String),

    #[error("Failed to parse file '{}': {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid document '{}': must be a mapping", .0.display())]
    Structural(PathBuf),

    #[error("Path '{}' is not writable", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Missing or bad argument: {0}")]
    Argument(String),

    #[error("glob [{0}] yield no files")]
    NoMatches(String),

    #[error("Cyclic reference to '{}'", .0.display())]
    CyclicReference(PathBuf),

    #[error("Config is missing a valid (writable) 'configfile' entry")]
    MissingConfigFile,

    #[error("IO error on '{}'", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid glob pattern")]
    Glob(#[from] glob::PatternError),

    #[error("Unable to serialize document: {0}")]
    Serialize(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            return Error::PermissionDenied(path);
        }

        Error::Io { path, source }
    }

    pub(crate) fn invalid_key(message: impl Into<String>) -> Self {
        Error::InvalidKey(message.into())
    }
}
