//! documents: a settings mapping plus where it came from
//!
//! A [Document] is loaded from storage (or built in memory), has its references resolved right away, and can be
//! written back to where it came from. See [crate::resolver] for what happens to `file:` and `builder:` values.
use crate::context::Context;
use crate::error::{Error, Result};
use crate::path;
use crate::resolver::{BuilderEntry, LoadStack, LoaderEntry, Registry};
use crate::util;
use crate::value::{Map, Value};
use std::path::{Path, PathBuf};

/// Reserved key: directory of the document's source
pub const PATH_KEY: &str = "path";

/// Reserved key: the document's source file
pub const CONFIGFILE_KEY: &str = "configfile";

#[derive(Debug)]
pub struct Document {
    pub(crate) settings: Map,
    pub(crate) context: Context,
    pub(crate) registry: Registry,
}

impl Document {
    /// A document without settings and without a source
    pub fn empty(context: &Context) -> Self {
        Self {
            settings: Map::new(),
            context: context.clone(),
            registry: Registry::default(),
        }
    }

    /// Build a document from in-memory settings and resolve its references
    ///
    /// References are resolved against the `path` entry of `settings` or, if there is none, against
    /// [Context::base_path].
    pub fn new(settings: Map, context: &Context) -> Result<Self> {
        Self::from_settings(settings, context, &mut LoadStack::default())
    }

    /// Like [Document::new], with `settings` deep merged on top of `defaults`
    pub fn with_defaults(defaults: Map, settings: Map, context: &Context) -> Result<Self> {
        Self::new(Value::deep_merge(defaults, settings), context)
    }

    /// Load the document stored at `path`
    ///
    /// A missing or unreadable file is an error only if `must_exist` is set. Otherwise an empty document is
    /// returned that will be written to `path`, provided that location is writable.
    pub fn load(path: impl AsRef<Path>, must_exist: bool, context: &Context) -> Result<Self> {
        Self::load_with(path.as_ref(), must_exist, context, &mut LoadStack::default())
    }

    pub(crate) fn load_with(
        path: &Path,
        must_exist: bool,
        context: &Context,
        stack: &mut LoadStack,
    ) -> Result<Self> {
        let storage = context.storage();

        if !storage.is_readable(path) {
            if must_exist {
                return Err(Error::ConfigFileNotFound(path.to_path_buf()));
            }

            return Self::create(path, context);
        }

        tracing::info!(path=%path.display(), "loading file");
        let contents = storage.read(path)?;
        let mut settings = context.format().parse_document(path, &contents)?;

        settings
            .entry(PATH_KEY.to_string())
            .or_insert_with(|| util::to_document_string(&util::parent_dir(path)).into());
        settings
            .entry(CONFIGFILE_KEY.to_string())
            .or_insert_with(|| util::to_document_string(path).into());

        stack.enter(path)?;
        let document = Self::from_settings(settings, context, stack);
        stack.leave();

        document
    }

    /// Empty document for a file that does not exist yet
    fn create(path: &Path, context: &Context) -> Result<Self> {
        let directory = util::parent_dir(path);
        if !context.storage().is_writable_or_creatable(path) {
            return Err(Error::PermissionDenied(directory));
        }

        tracing::debug!(path=%path.display(), "file does not exist, starting empty");
        let mut settings = Map::new();
        settings.insert(
            PATH_KEY.to_string(),
            util::to_document_string(&directory).into(),
        );
        settings.insert(
            CONFIGFILE_KEY.to_string(),
            util::to_document_string(path).into(),
        );

        Ok(Self {
            settings,
            context: context.clone(),
            registry: Registry::default(),
        })
    }

    fn from_settings(settings: Map, context: &Context, stack: &mut LoadStack) -> Result<Self> {
        let mut document = Self {
            settings,
            context: context.clone(),
            registry: Registry::default(),
        };

        if let Some(hooks) = context.hooks() {
            hooks.before_resolve(&document);
        }

        document.resolve_references(stack)?;

        if let Some(hooks) = context.hooks() {
            hooks.after_resolve(&document);
        }

        Ok(document)
    }

    pub fn get(&self, key: &str) -> Result<Option<&Value>> {
        path::get(&self.settings, key)
    }

    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Result<Value> {
        path::get_or(&self.settings, key, default)
    }

    pub fn exists(&self, key: &str) -> bool {
        path::exists(&self.settings, key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        path::set(&mut self.settings, key, value)
    }

    /// Persist the document to its `configfile`
    ///
    /// Values spliced in from other documents are pushed back into those documents, which are written first.
    /// The stored document keeps its `file:`/`builder:` references, the in-memory settings are left untouched.
    pub fn write(&mut self) -> Result<()> {
        self.write_with_banner(None)
    }

    /// [Document::write], with `banner` stored ahead of the settings
    pub(crate) fn write_with_banner(&mut self, banner: Option<&str>) -> Result<()> {
        let configfile = self.configfile().ok_or(Error::MissingConfigFile)?;
        if !self.context.storage().is_writable_or_creatable(&configfile) {
            return Err(Error::PermissionDenied(configfile));
        }

        let output = self.write_back()?;
        let mut contents = banner.unwrap_or_default().to_string();
        contents.push_str(&self.context.format().serialize(&output)?);

        tracing::info!(path=%configfile.display(), "writing document");
        self.context
            .storage()
            .write(&configfile, contents.as_bytes())
    }

    pub fn configfile(&self) -> Option<PathBuf> {
        self.settings
            .get(CONFIGFILE_KEY)
            .and_then(Value::as_str)
            .map(PathBuf::from)
    }

    /// Directory references are resolved against
    pub fn directory(&self) -> PathBuf {
        self.settings
            .get(PATH_KEY)
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.context.base_path().to_path_buf())
    }

    pub fn settings(&self) -> &Map {
        &self.settings
    }

    pub fn into_settings(self) -> Map {
        self.settings
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// References resolved into this document, by the dotted path they were found at
    pub fn loaders(&self) -> impl Iterator<Item = (&str, &LoaderEntry)> {
        self.registry
            .loaders
            .iter()
            .map(|(full_path, entry)| (full_path.as_str(), entry))
    }

    /// `builder:` references resolved into this document, by the dotted path they were found at
    pub fn builders(&self) -> impl Iterator<Item = (&str, &BuilderEntry)> {
        self.registry
            .builders
            .iter()
            .map(|(full_path, entry)| (full_path.as_str(), entry))
    }

    /// The document backing the reference found at `full_path`
    pub fn loader(&self, full_path: &str) -> Option<&Document> {
        let entry = self.registry.loaders.get(full_path)?;
        self.registry.documents.get(entry.source())
    }
}

/// Utility macro to create a [Map] from YAML
///
/// ```
/// # use refconf::mapping;
/// let map = mapping!("foo: {bar: baz}");
/// assert_eq!(map.len(), 1);
/// ```
///
/// # Panic
/// Panics on invalid input or if the root is not a mapping
///
/// ```should_panic
/// # use refconf::mapping;
/// mapping!("- not a mapping");
/// ```
#[macro_export]
macro_rules! mapping {
    { $yaml:expr } => {
        $crate::format::Format::Yaml
            .parse_document(::std::path::Path::new("<inline>"), $yaml.as_bytes())
            .expect("mapping must parse")
    };
}
