//! Reading and writing document files.
//!
//! Reads are plain. Writes are atomic: the document is written to a
//! temporary file next to the destination, restricted to owner read/write
//! (`0600` on Unix), flushed, and then renamed over the destination. A
//! failed export never leaves a partial file behind.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::TagfigError;
use crate::format::{self, Format};
use crate::reflect::Reflect;
use crate::tag::TagSchema;

pub fn read_document(path: &Path) -> Result<Vec<u8>, TagfigError> {
    std::fs::read(path).map_err(|source| TagfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_document(path: &Path, bytes: &[u8]) -> Result<(), TagfigError> {
    let io = |source: std::io::Error| TagfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(io)?;
    temp.write_all(bytes).map_err(io)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(io)?;
    }
    temp.as_file().sync_all().map_err(io)?;
    temp.persist(path).map_err(|e| io(e.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote document");
    Ok(())
}

/// Decode the file at `path` onto `target`. Defaults are not applied.
pub fn import_file<T: Reflect>(
    path: &Path,
    target: &mut T,
    format: Format,
    schema: &TagSchema,
    strict: bool,
) -> Result<(), TagfigError> {
    let bytes = read_document(path)?;
    format::decode(format, &bytes, target, schema, strict)
}

/// Encode `source` and write it to `path`, replacing any existing file.
pub fn export_file<T: Reflect>(
    path: &Path,
    source: &T,
    format: Format,
    schema: &TagSchema,
) -> Result<(), TagfigError> {
    let bytes = format::encode(format, source, schema)?;
    write_document(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::Redis;
    use tempfile::TempDir;

    fn sample() -> Redis {
        Redis {
            host: "cache.local".into(),
            port: 6380,
            db: 2,
            enable: true,
        }
    }

    #[test]
    fn export_then_import() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("redis.yaml");
        let schema = TagSchema::default();

        export_file(&path, &sample(), Format::Yaml, &schema).unwrap();
        let mut loaded = Redis::zero();
        import_file(&path, &mut loaded, Format::Yaml, &schema, true).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn export_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("redis.json");
        std::fs::write(&path, "stale contents that are much longer than the new ones").unwrap();

        let schema = TagSchema::default().with_ident_key("json");
        export_file(&path, &sample(), Format::Json, &schema).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"cache.local\""));
        assert!(!text.contains("stale"));
    }

    #[cfg(unix)]
    #[test]
    fn export_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("redis.toml");
        let schema = TagSchema::default().with_ident_key("toml");
        export_file(&path, &sample(), Format::Toml, &schema).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn failed_encode_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.toml");
        let result = export_file(&path, &5u8, Format::Toml, &TagSchema::default());
        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");
        let mut redis = Redis::zero();
        let err = import_file(&path, &mut redis, Format::Yaml, &TagSchema::default(), false)
            .unwrap_err();
        match err {
            TagfigError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
