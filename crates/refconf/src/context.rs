//! everything loading and building needs besides the document itself
use crate::document::Document;
use crate::format::Format;
use crate::storage::{FsStorage, Storage};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Observer of resolution passes
///
/// Both methods are invoked synchronously, once per document, around the reference resolution pass.
pub trait ResolveHooks {
    fn before_resolve(&self, _document: &Document) {}
    fn after_resolve(&self, _document: &Document) {}
}

/// Settings shared by a root document and every document loaded on its behalf
///
/// Cloning is cheap: storage and hooks are reference counted.
#[derive(Clone)]
pub struct Context {
    base_path: PathBuf,
    default_glob: Option<String>,
    format: Format,
    storage: Rc<dyn Storage>,
    hooks: Option<Rc<dyn ResolveHooks>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("."),
            default_glob: None,
            format: Format::default(),
            storage: Rc::new(FsStorage),
            hooks: None,
        }
    }

    /// Directory used to resolve references of documents without a `path` entry
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Glob for `builder:` references without one, defaults to [Format::default_glob]
    pub fn with_default_glob(mut self, glob: impl Into<String>) -> Self {
        self.default_glob = Some(glob.into());
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Rc::new(storage);
        self
    }

    pub fn with_hooks(mut self, hooks: impl ResolveHooks + 'static) -> Self {
        self.hooks = Some(Rc::new(hooks));
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn default_glob(&self) -> &str {
        self.default_glob
            .as_deref()
            .unwrap_or_else(|| self.format.default_glob())
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub(crate) fn hooks(&self) -> Option<&dyn ResolveHooks> {
        self.hooks.as_deref()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("base_path", &self.base_path)
            .field("default_glob", &self.default_glob())
            .field("format", &self.format)
            .field("storage", &self.storage)
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}
