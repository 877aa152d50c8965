//! File-backed attribute staging
//!
//! Some attributes (a signing key, a partition layout, a template body) are
//! file content rather than plain values. Before submission they are
//! materialized to a local temp file and either uploaded to the remote host
//! (CLI, which references them by remote path) or inlined into the payload
//! (API/UI). The local temp path must never appear in the submitted
//! attributes.

use std::collections::BTreeMap;
use std::path::Path;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use tracing::debug;

use ferrite_schema::{Attr, EntitySchema};
use ferrite_transport::{FileTransfer, TransportError};

use crate::error::{FactoryError, Result};

/// Resolve a file-backed attribute to its content. A string naming an
/// existing local file is read; any other string is taken as the content
/// itself; an unset attribute gets random content.
pub(crate) fn resolve_content(
    schema: &'static EntitySchema,
    field: &'static str,
    attr: Option<&Attr>,
) -> Result<String> {
    match attr {
        None | Some(Attr::Value(Value::Null)) => Ok(random_content()),
        Some(Attr::Value(Value::String(text))) => {
            let path = Path::new(text);
            if path.is_file() {
                Ok(std::fs::read_to_string(path).map_err(TransportError::Io)?)
            } else {
                Ok(text.clone())
            }
        }
        Some(_) => Err(FactoryError::BadFileValue {
            entity: schema.name,
            field,
        }),
    }
}

/// Stage content on the remote host: write it to a local temp file, upload
/// it to a random remote path, and return that remote path.
pub(crate) fn stage_remote(
    content: &str,
    field: &str,
    transfer: &dyn FileTransfer,
) -> Result<String> {
    let dir = tempfile::tempdir().map_err(TransportError::Io)?;
    let local = dir.path().join(format!("{field}.txt"));
    std::fs::write(&local, content).map_err(TransportError::Io)?;

    let remote = format!("/tmp/ferrite-{}-{}.txt", field, random_suffix());
    debug!(%field, %remote, "staging file-backed attribute");
    transfer.upload(&local, &remote)?;
    Ok(remote)
}

/// Rewrite every file-backed field of `schema` to a remote path.
pub(crate) fn upload_file_fields(
    schema: &'static EntitySchema,
    attrs: &mut BTreeMap<String, Attr>,
    transfer: &dyn FileTransfer,
) -> Result<()> {
    for field in &schema.file_fields {
        let content = resolve_content(schema, field, attrs.get(*field))?;
        let remote = stage_remote(&content, field, transfer)?;
        attrs.insert((*field).to_string(), Attr::Value(Value::String(remote)));
    }
    Ok(())
}

/// Rewrite every file-backed field of `schema` to its literal content.
pub(crate) fn inline_file_fields(
    schema: &'static EntitySchema,
    attrs: &mut BTreeMap<String, Attr>,
) -> Result<()> {
    for field in &schema.file_fields {
        let content = resolve_content(schema, field, attrs.get(*field))?;
        attrs.insert((*field).to_string(), Attr::Value(Value::String(content)));
    }
    Ok(())
}

fn random_content() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_schema::Registry;
    use std::cell::RefCell;
    use std::io::Write;
    use std::path::PathBuf;

    struct RecordingTransfer {
        uploads: RefCell<Vec<(PathBuf, String)>>,
    }

    impl RecordingTransfer {
        fn new() -> Self {
            Self {
                uploads: RefCell::new(Vec::new()),
            }
        }
    }

    impl FileTransfer for RecordingTransfer {
        fn upload(&self, local: &Path, remote: &str) -> ferrite_transport::Result<()> {
            self.uploads
                .borrow_mut()
                .push((local.to_path_buf(), remote.to_string()));
            Ok(())
        }
    }

    fn gpg_schema() -> &'static EntitySchema {
        Registry::builtin().get("GpgKey").unwrap()
    }

    #[test]
    fn test_unset_field_gets_random_content() {
        let content = resolve_content(gpg_schema(), "key", None).unwrap();
        assert!(!content.is_empty());
    }

    #[test]
    fn test_plain_string_is_taken_as_content() {
        let attr = Attr::Value(Value::from("-----BEGIN KEY-----"));
        let content = resolve_content(gpg_schema(), "key", Some(&attr)).unwrap();
        assert_eq!(content, "-----BEGIN KEY-----");
    }

    #[test]
    fn test_existing_local_path_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "key material").unwrap();
        let attr = Attr::Value(Value::from(file.path().to_string_lossy().into_owned()));
        let content = resolve_content(gpg_schema(), "key", Some(&attr)).unwrap();
        assert_eq!(content, "key material");
    }

    #[test]
    fn test_non_string_value_is_rejected() {
        let attr = Attr::Value(Value::from(7));
        let err = resolve_content(gpg_schema(), "key", Some(&attr)).unwrap_err();
        assert!(matches!(err, FactoryError::BadFileValue { field: "key", .. }));
    }

    #[test]
    fn test_upload_rewrites_attr_to_remote_path_only() {
        let schema = gpg_schema();
        let transfer = RecordingTransfer::new();
        let mut attrs = BTreeMap::new();
        attrs.insert("key".to_string(), Attr::Value(Value::from("material")));

        upload_file_fields(schema, &mut attrs, &transfer).unwrap();

        let uploads = transfer.uploads.borrow();
        assert_eq!(uploads.len(), 1);
        let (local, remote) = &uploads[0];
        match attrs.get("key") {
            Some(Attr::Value(Value::String(value))) => {
                assert_eq!(value, remote);
                assert!(value.starts_with("/tmp/ferrite-key-"));
                // The local temp path must not leak into the attributes.
                assert_ne!(value, &local.to_string_lossy());
            }
            other => panic!("expected string attr, got {other:?}"),
        }
    }

    #[test]
    fn test_inline_replaces_local_path_with_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "layout body").unwrap();
        let schema = Registry::builtin().get("PartitionTable").unwrap();
        let mut attrs = BTreeMap::new();
        attrs.insert(
            "layout".to_string(),
            Attr::Value(Value::from(file.path().to_string_lossy().into_owned())),
        );

        inline_file_fields(schema, &mut attrs).unwrap();

        assert_eq!(
            attrs.get("layout"),
            Some(&Attr::Value(Value::from("layout body")))
        );
    }
}
