//! aggregate documents
//!
//! An aggregate collects every document matching a glob into a single array and stores it, under a single key,
//! as a generated document:
//!
//! ```yaml
//! # Don't modify this file, it will be automatically recreated
//! # from '/cfg/items/*.yml'
//! # (excluding '/cfg/items.yml')
//! items:
//! - name: item1
//!   price: 100.0
//! - name: item2
//!   price: 200.0
//! path: /cfg
//! configfile: /cfg/items.yml
//! ```
//!
//! Members are parsed only, references inside them are not resolved.
use crate::context::Context;
use crate::document::{CONFIGFILE_KEY, PATH_KEY};
use crate::error::{Error, Result};
use crate::util;
use crate::value::{Map, Value};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]+$").expect("name pattern must compile"));

/// Glob of the members of `target`, rooted at its directory
pub(crate) fn member_pattern(target: &Path, glob: &str) -> String {
    util::to_document_string(&util::parent_dir(target).join(glob))
}

#[derive(Debug, derive_new::new)]
pub struct AggregateBuilder<'c> {
    context: &'c Context,
}

impl AggregateBuilder<'_> {
    /// Generate `target` from the files matching `glob`, relative to the directory of `target`
    ///
    /// Returns the settings that were written.
    pub fn build(&self, name: &str, target: &Path, glob: &str) -> Result<Map> {
        self.check_args(name, target, glob)?;

        let storage = self.context.storage();
        let format = self.context.format();
        let directory = util::parent_dir(target);

        if !storage.is_writable_or_creatable(target) {
            return Err(Error::PermissionDenied(directory));
        }

        let pattern = member_pattern(target, glob);
        let excluded = util::normalize(target);
        let files: Vec<PathBuf> = storage
            .glob(&pattern)?
            .into_iter()
            .filter(|file| util::normalize(file) != excluded)
            .collect();

        if files.is_empty() {
            return Err(Error::NoMatches(pattern));
        }

        let mut members = Vec::with_capacity(files.len());
        for file in &files {
            tracing::trace!(file=%file.display(), "aggregate member");
            let contents = storage.read(file)?;
            let member = format.parse(&contents).map_err(|message| Error::Parse {
                path: file.clone(),
                message,
            })?;
            members.push(member);
        }

        let mut settings = Map::new();
        settings.insert(name.to_string(), Value::Array(members));
        settings.insert(
            PATH_KEY.to_string(),
            util::to_document_string(&directory).into(),
        );
        settings.insert(
            CONFIGFILE_KEY.to_string(),
            util::to_document_string(target).into(),
        );

        let mut contents = format.banner(&pattern, target).unwrap_or_default();
        contents.push_str(&format.serialize(&settings)?);
        storage.write(target, contents.as_bytes())?;

        tracing::info!(target=%target.display(), %pattern, members = files.len(), "aggregate written");
        Ok(settings)
    }

    fn check_args(&self, name: &str, target: &Path, glob: &str) -> Result<()> {
        let format = self.context.format();

        if !NAME.is_match(name) {
            return Err(Error::Argument(format!("name '{name}'")));
        }

        if !format.matches_extension(&target.to_string_lossy()) {
            return Err(Error::Argument(format!("filename '{}'", target.display())));
        }

        let has_wildcard = glob.contains('*') || glob.contains('?');
        if !has_wildcard || !format.matches_extension(glob) {
            return Err(Error::Argument(format!("glob '{glob}'")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::format::Format;
    use pretty_assertions::assert_eq;

    fn items(dir: &Path, count: usize) {
        std::fs::create_dir_all(dir.join("items")).unwrap();
        for x in 1..=count {
            std::fs::write(
                dir.join(format!("items/item{x}.yml")),
                format!("---\nname: item_{x}\nprice: {}.00\n", 20 * x),
            )
            .unwrap();
        }
    }

    #[test]
    fn invalid_arguments() {
        let context = Context::default();
        let builder = AggregateBuilder::new(&context);

        for (name, filename, glob) in [
            ("", "demo.yml", "*.yml"),
            ("x.y.z", "demo.yml", "*.yml"),
            ("Demo", "demo.yml", "*.yml"),
            ("demo", "", "*.yml"),
            ("demo", "demo.ini", "*.yml"),
            ("demo", "demo.yml", ""),
            ("demo", "demo.yml", "*.ini"),
            ("demo", "demo.yml", "items.yml"),
        ] {
            let result = builder.build(name, Path::new(filename), glob);
            assert!(
                matches!(result, Err(Error::Argument(_))),
                "{name:?} {filename:?} {glob:?}"
            );
        }

        assert!(!Path::new("demo.yml").exists());
    }

    #[test]
    fn collects_all_members_in_order() {
        let dir = tempfile::tempdir().unwrap();
        items(dir.path(), 10);
        let target = dir.path().join("items.yml");

        let settings = AggregateBuilder::new(&Context::default())
            .build("items", &target, "**/*.yml")
            .unwrap();

        let members = settings["items"].as_array().unwrap();
        assert_eq!(members.len(), 10);
        assert!(members.iter().all(|member| member.as_object().is_some()));
        assert_eq!(
            members[0].as_object().unwrap()["name"],
            Value::from("item_1")
        );
        assert_eq!(
            members[1].as_object().unwrap()["name"],
            Value::from("item_10")
        );
        assert_eq!(
            members[0].as_object().unwrap()["price"],
            Value::Decimal(20.0)
        );

        let stored = std::fs::read(&target).unwrap();
        let stored = Format::Yaml.parse_document(&target, &stored).unwrap();
        assert_eq!(stored, settings);
    }

    #[test]
    fn target_is_excluded() {
        let dir = tempfile::tempdir().unwrap();
        items(dir.path(), 2);
        let target = dir.path().join("items/all.yml");
        let context = Context::default();
        let builder = AggregateBuilder::new(&context);

        builder.build("all", &target, "*.yml").unwrap();
        // second run sees the generated file but must not aggregate it
        let settings = builder.build("all", &target, "*.yml").unwrap();

        assert_eq!(settings["all"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn generated_file_has_banner() {
        let dir = tempfile::tempdir().unwrap();
        items(dir.path(), 1);
        let target = dir.path().join("items.yml");

        AggregateBuilder::new(&Context::default())
            .build("items", &target, "items/*.yml")
            .unwrap();

        let stored = std::fs::read_to_string(&target).unwrap();
        let lines: Vec<_> = stored.lines().take(3).collect();
        assert_eq!(
            lines,
            vec![
                "# Don't modify this file, it will be automatically recreated".to_string(),
                format!("# from '{}'", dir.path().join("items/*.yml").display()),
                format!("# (excluding '{}')", target.display()),
            ]
        );
    }

    #[test]
    fn no_matches_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("items.yml");
        std::fs::write(&target, "stale: true\n").unwrap();

        let error = AggregateBuilder::new(&Context::default())
            .build("items", &target, "*.yml")
            .unwrap_err();

        assert!(matches!(error, Error::NoMatches(_)));
    }

    #[test]
    fn broken_member() {
        let dir = tempfile::tempdir().unwrap();
        items(dir.path(), 1);
        std::fs::write(dir.path().join("items/broken.yml"), "a: [b: c: d]\n").unwrap();

        let error = AggregateBuilder::new(&Context::default())
            .build("items", &dir.path().join("items.yml"), "items/*.yml")
            .unwrap_err();

        assert!(matches!(error, Error::Parse { .. }));
    }
}
