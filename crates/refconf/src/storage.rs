//! storage collaborator
//!
//! Everything that touches the file system goes through [Storage] so documents can be loaded and written against
//! something else than the local disk (tests wrap [FsStorage] to observe writes).
use crate::error::{Error, Result};
use crate::util;
use std::path::{Path, PathBuf};

pub trait Storage: std::fmt::Debug {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace the contents of `path`, creating missing parent directories
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Files matching `pattern`, in enumeration order
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;

    fn is_readable(&self, path: &Path) -> bool;

    /// Test if `path` can be written, or could be created
    fn is_writable_or_creatable(&self, path: &Path) -> bool;
}

/// Local file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| Error::io(path, e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let directory = util::parent_dir(path);
        std::fs::create_dir_all(&directory).map_err(|e| Error::io(&directory, e))?;

        tracing::debug!(path=%path.display(), bytes = contents.len(), "writing file");
        std::fs::write(path, contents).map_err(|e| Error::io(path, e))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let mut files = vec![];
        for entry in glob::glob(pattern)? {
            let path = entry.map_err(|e| Error::io(e.path().to_path_buf(), e.into_error()))?;
            if path.is_file() {
                files.push(path);
            }
        }

        Ok(files)
    }

    fn is_readable(&self, path: &Path) -> bool {
        path.is_file() && std::fs::File::open(path).is_ok()
    }

    fn is_writable_or_creatable(&self, path: &Path) -> bool {
        if path.exists() {
            return writable(path);
        }

        // nearest existing ancestor decides
        path.ancestors()
            .skip(1)
            .map(|ancestor| {
                if ancestor.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    ancestor
                }
            })
            .find(|ancestor| ancestor.exists())
            .is_some_and(|ancestor| ancestor.is_dir() && writable(ancestor))
    }
}

/// Files are opened for writing (nothing is truncated or created), which honours ownership and ACLs.
/// Directories only get their write bits checked: [std::fs::Permissions::readonly] ignores ownership, so a
/// directory owned by someone else may be reported writable and the later write fails with
/// [Error::PermissionDenied].
fn writable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if metadata.permissions().readonly() {
        return false;
    }

    !metadata.is_file()
        || std::fs::OpenOptions::new()
            .write(true)
            .open(path)
            .is_ok()
}
