//! `file:` and `builder:` references
//!
//! ### Resolving
//!
//! Right after a [Document] is created its settings are scanned for string values of the form
//!
//! ```text
//! file:<relative-path>
//! builder:<relative-path>[:<glob>]
//! ```
//!
//! Only values held directly by a mapping are candidates: the scan descends into nested mappings but not into
//! arrays. Every candidate is replaced ("spliced") with the value of the same key in the referenced document:
//!
//! ```yaml
//! # main.yml                             # loader_one.yml
//! level_1:                               loader_1:
//!   loader_1: file:loader_one.yml          foo: x
//! ```
//!
//! Loading `main.yml` yields `level_1.loader_1.foo == "x"`. Referenced documents are loaded as regular documents,
//! so their own references are resolved as well. Each file is loaded once per document, a reference back into a
//! file that is still being loaded fails with [Error::CyclicReference].
//!
//! A `builder:` reference first regenerates its file from the glob (see [crate::builder]) and is then resolved
//! like a `file:` reference.
//!
//! ### Writing back
//!
//! Before a document is written the current value at each resolved path is pushed back into the document it
//! came from, every such document is written (once), and the stored copy of the host gets its reference strings
//! back.
use crate::builder::{self, AggregateBuilder};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::path;
use crate::util;
use crate::value::{Map, Value};
use crate::visit::VisitEntries;
use std::path::{Path, PathBuf};

pub const FILE_PREFIX: &str = "file:";
pub const BUILDER_PREFIX: &str = "builder:";

/// A parsed reference value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    File(PathBuf),
    Builder { file: PathBuf, glob: Option<String> },
}

impl Reference {
    /// Recognize a reference, `None` for any other string
    pub fn parse(value: &str) -> Option<Reference> {
        if let Some(rest) = value.strip_prefix(BUILDER_PREFIX) {
            let (file, glob) = match rest.split_once(':') {
                Some((file, glob)) if !glob.is_empty() => (file, Some(glob.to_string())),
                Some((file, _)) => (file, None),
                None => (rest, None),
            };

            return Some(Reference::Builder {
                file: file.into(),
                glob,
            });
        }

        value
            .strip_prefix(FILE_PREFIX)
            .map(|file| Reference::File(file.into()))
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::File(file) => write!(f, "{FILE_PREFIX}{}", file.display()),
            Reference::Builder {
                file,
                glob: Some(glob),
            } => write!(f, "{BUILDER_PREFIX}{}:{glob}", file.display()),
            Reference::Builder { file, glob: None } => {
                write!(f, "{BUILDER_PREFIX}{}", file.display())
            }
        }
    }
}

/// Where the value at a resolved path came from
#[derive(Debug, Clone, derive_new::new)]
pub struct LoaderEntry {
    source: PathBuf,
    key: String,
    reference: PathBuf,
}

impl LoaderEntry {
    /// File as written in the reference, relative to the document holding it
    pub fn reference(&self) -> &Path {
        &self.reference
    }

    /// File the value was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Top level key inside [LoaderEntry::source]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// How the file behind a `builder:` reference is generated
#[derive(Debug, Clone, derive_new::new)]
pub struct BuilderEntry {
    filename: PathBuf,
    glob: String,
}

impl BuilderEntry {
    /// Target file, as written in the reference
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }
}

/// Loaded documents and resolved references of one document
#[derive(Debug, Default)]
pub(crate) struct Registry {
    /// by normalized source path, shared by all references into the same file
    pub(crate) documents: indexmap::IndexMap<PathBuf, Document>,
    /// by dotted path, first registration wins
    pub(crate) loaders: indexmap::IndexMap<String, LoaderEntry>,
    pub(crate) builders: indexmap::IndexMap<String, BuilderEntry>,
}

/// Files currently being loaded
#[derive(Debug, Default)]
pub(crate) struct LoadStack(Vec<PathBuf>);

impl LoadStack {
    pub(crate) fn enter(&mut self, path: &Path) -> Result<()> {
        let normalized = util::normalize(path);
        if self.0.contains(&normalized) {
            tracing::debug!(path=%path.display(), stack=?self.0, "loop detected");
            return Err(Error::CyclicReference(path.to_path_buf()));
        }

        self.0.push(normalized);
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.0.pop();
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

impl Document {
    /// Replace every reference in the settings with the value it points to
    pub(crate) fn resolve_references(&mut self, stack: &mut LoadStack) -> Result<()> {
        let mut pending = vec![];
        self.settings
            .visit_entries(&mut |prefix: &str, key: &str, value: &Value| {
                if let Some(reference) = value.as_str().and_then(Reference::parse) {
                    pending.push((join_key(prefix, key), key.to_string(), reference));
                }
            });

        for (full_path, key, reference) in pending {
            match reference {
                Reference::File(file) => self.resolve_file(&full_path, &key, &file, stack)?,
                Reference::Builder { file, glob } => {
                    let glob = glob.unwrap_or_else(|| self.context.default_glob().to_string());
                    self.resolve_builder(&full_path, &key, &file, &glob, stack)?
                }
            }
        }

        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self, stack))]
    fn resolve_file(
        &mut self,
        full_path: &str,
        key: &str,
        file: &Path,
        stack: &mut LoadStack,
    ) -> Result<()> {
        let source = util::normalize(&self.directory().join(file));
        if !self.context.storage().is_readable(&source) {
            return Err(Error::LoaderFileNotFound(source));
        }

        if self.registry.documents.contains_key(&source) {
            tracing::debug!(source=%source.display(), "reusing loaded document");
        } else {
            let loader = Document::load_with(&source, true, &self.context, stack)?;
            self.registry.documents.insert(source.clone(), loader);
        }

        let value = self
            .registry
            .documents
            .get(&source)
            .and_then(|loader| loader.settings.get(key))
            .cloned()
            .ok_or_else(|| Error::LoaderKeyNotFound {
                path: source.clone(),
                key: key.to_string(),
            })?;

        path::set(&mut self.settings, full_path, value)?;
        tracing::debug!(full_path, source=%source.display(), "spliced");

        self.registry
            .loaders
            .entry(full_path.to_string())
            .or_insert_with(|| LoaderEntry::new(source, key.to_string(), file.to_path_buf()));

        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self, stack))]
    fn resolve_builder(
        &mut self,
        full_path: &str,
        key: &str,
        file: &Path,
        glob: &str,
        stack: &mut LoadStack,
    ) -> Result<()> {
        let target = util::normalize(&self.directory().join(file));
        AggregateBuilder::new(&self.context).build(key, &target, glob)?;

        // a copy loaded earlier in this pass is stale now
        self.registry.documents.shift_remove(&target);
        self.resolve_file(full_path, key, file, stack)?;

        self.registry
            .builders
            .entry(full_path.to_string())
            .or_insert_with(|| BuilderEntry::new(file.to_path_buf(), glob.to_string()));

        Ok(())
    }

    /// Push spliced values back into their documents, write those, and return the settings to store for `self`
    pub(crate) fn write_back(&mut self) -> Result<Map> {
        let mut touched = indexmap::IndexSet::new();

        for (full_path, entry) in &self.registry.loaders {
            if !path::exists(&self.settings, full_path) {
                continue;
            }
            let value = path::get(&self.settings, full_path)?
                .cloned()
                .unwrap_or_default();

            let Some(loader) = self.registry.documents.get_mut(entry.source()) else {
                continue;
            };

            tracing::debug!(full_path, source=%entry.source().display(), "write back");
            loader.settings.insert(entry.key().to_string(), value);
            touched.insert(entry.source().to_path_buf());
        }

        for source in &touched {
            let banner = self.banner_for(source);
            if let Some(loader) = self.registry.documents.get_mut(source) {
                loader.write_with_banner(banner.as_deref())?;
            }
        }

        let mut output = self.settings.clone();
        for (full_path, entry) in &self.registry.loaders {
            let reference = match self.registry.builders.get(full_path) {
                Some(builder) => Reference::Builder {
                    file: builder.filename().to_path_buf(),
                    glob: Some(builder.glob().to_string()),
                },
                None => Reference::File(entry.reference().to_path_buf()),
            };

            path::set(&mut output, full_path, reference.to_string())?;
        }

        Ok(output)
    }

    /// Header of `source` if it is generated by one of the `builder:` references
    fn banner_for(&self, source: &Path) -> Option<String> {
        self.registry
            .builders
            .iter()
            .find(|(full_path, _)| {
                self.registry
                    .loaders
                    .get(*full_path)
                    .is_some_and(|entry| entry.source() == source)
            })
            .and_then(|(_, builder)| {
                let pattern = builder::member_pattern(source, builder.glob());
                self.context.format().banner(&pattern, source)
            })
    }
}
