//! # refconf - hierarchical configuration with cross-file references
//!
//! ## Introduction for developers
//!
//! Read this to understand how `refconf` works internally.
//!
//! ### Documents
//!
//! A [Document] is a mapping of settings ([value::Map]) plus the [Context] it was loaded with. Documents are
//! loaded from a file ([Document::load]) or built in memory ([Document::new], [Document::with_defaults]).
//!
//! A loaded document always knows where it came from. Two reserved keys are added unless the file already has
//! them:
//!
//! - `path`: directory of the file, relative references are resolved against it
//! - `configfile`: the file itself, [Document::write] stores the document there
//!
//! A file that does not exist yet is not an error (unless asked for): the document starts out with just these two
//! keys and the file is created on the first write.
//!
//! ### Addressing values
//!
//! Values are addressed with dotted paths: `server.listen.0.port`. Segments select keys of mappings; an
//! all-digit segment selects an element of an array. See [path] for the exact rules, including which paths
//! [path::set] refuses to create.
//!
//! ### References
//!
//! String values starting with `file:` or `builder:` are references to other documents:
//!
//! ```yaml
//! database: file:database.yml
//! sites: builder:sites.yml:sites/*.yml
//! ```
//!
//! The value is replaced with the entry of the same key in the referenced document. `builder:` regenerates the
//! referenced file from all files matching the glob first (see [builder]). On write the values are pushed back to
//! the documents they came from. Details in [resolver].
//!
//! ### Collaborators
//!
//! All file system access goes through [Storage] and the on-disk representation is picked by [Format]. Both are
//! part of the [Context], together with optional [ResolveHooks] that observe every resolution pass.
//!
//! ### Output
//!
//! [value::Value] implements [serde::Serialize], a document's settings can be written in any serde format.
//!
pub mod builder;
pub mod context;
pub mod document;
pub mod error;
pub mod format;
pub mod path;
pub mod resolver;
pub mod storage;
mod util;
pub mod value;
mod visit;

pub use builder::AggregateBuilder;
pub use context::{Context, ResolveHooks};
pub use document::Document;
pub use error::{Error, Result};
pub use format::Format;
pub use resolver::Reference;
pub use storage::{FsStorage, Storage};
pub use value::{Map, Value};
