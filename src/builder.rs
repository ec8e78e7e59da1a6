use std::path::{Path, PathBuf};

use tracing::debug;

use crate::descriptor::{self, FieldInfo};
use crate::driver;
use crate::error::TagfigError;
use crate::file;
use crate::format::{self, Format};
use crate::ops::{self, ConfigResult};
use crate::reflect::Reflect;
use crate::tag::TagSchema;

/// Entry point for building a tagfig engine.
pub struct Tagfig;

impl Tagfig {
    pub fn builder() -> TagfigBuilder {
        TagfigBuilder::new()
    }
}

/// Builder for the tag schema, document format and decoding policy.
///
/// The format decides both the document grammar and, unless
/// [`ident_key()`](Self::ident_key) overrides it, the tag key fields are
/// identified by:
///
/// ```ignore
/// let tagfig = Tagfig::builder().format(Format::Json).strict(true);
/// let conf: AppConf = tagfig.load(br#"{"port": 8080}"#)?;
/// ```
///
/// Every operation borrows the builder, so one builder can serve any number
/// of record types and calls.
#[derive(Debug, Clone)]
pub struct TagfigBuilder {
    format: Format,
    ident_key: Option<String>,
    schema: TagSchema,
    strict: bool,
}

impl TagfigBuilder {
    fn new() -> Self {
        Self {
            format: Format::default(),
            ident_key: None,
            schema: TagSchema::default(),
            strict: false,
        }
    }

    /// Set the document format (default: [`Format::Yaml`]).
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Override the tag key holding field identifiers (default: the
    /// format's own key, e.g. `json` for [`Format::Json`]).
    pub fn ident_key(mut self, key: &str) -> Self {
        self.ident_key = Some(key.to_string());
        self
    }

    /// Override the tag key holding default values (default: `default`).
    pub fn default_key(mut self, key: &str) -> Self {
        self.schema.default_key = key.to_string();
        self
    }

    pub fn option_key(mut self, key: &str) -> Self {
        self.schema.option_key = key.to_string();
        self
    }

    pub fn describe_key(mut self, key: &str) -> Self {
        self.schema.describe_key = key.to_string();
        self
    }

    pub fn valid_key(mut self, key: &str) -> Self {
        self.schema.valid_key = key.to_string();
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, document keys matching no field produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The effective tag schema.
    pub fn schema(&self) -> TagSchema {
        let ident_key = self
            .ident_key
            .as_deref()
            .unwrap_or(self.format.ident_key());
        self.schema.with_ident_key(ident_key)
    }

    /// Fill zero-valued fields of `target` from their default tags.
    pub fn populate<T: Reflect>(&self, target: &mut T) -> Result<(), TagfigError> {
        driver::populate_defaults(target, &self.schema())
    }

    /// A new `T` with every default applied.
    pub fn materialize<T: Reflect>(&self) -> Result<T, TagfigError> {
        driver::materialize(&self.schema())
    }

    /// Decode a document onto `target`. Absent fields keep their values and
    /// defaults are not applied.
    pub fn decode<T: Reflect>(&self, bytes: &[u8], target: &mut T) -> Result<(), TagfigError> {
        format::decode(self.format, bytes, target, &self.schema(), self.strict)
    }

    pub fn encode<T: Reflect>(&self, source: &T) -> Result<Vec<u8>, TagfigError> {
        format::encode(self.format, source, &self.schema())
    }

    /// Decode a document into a fresh `T`, then fill in defaults for
    /// whatever the document left unset.
    pub fn load<T: Reflect>(&self, bytes: &[u8]) -> Result<T, TagfigError> {
        let mut target = T::zero();
        self.decode(bytes, &mut target)?;
        self.populate(&mut target)?;
        Ok(target)
    }

    pub fn import_file<T: Reflect>(&self, path: &Path, target: &mut T) -> Result<(), TagfigError> {
        file::import_file(path, target, self.format, &self.schema(), self.strict)
    }

    pub fn export_file<T: Reflect>(&self, path: &Path, source: &T) -> Result<(), TagfigError> {
        file::export_file(path, source, self.format, &self.schema())
    }

    /// [`load`](Self::load) from a file.
    pub fn load_file<T: Reflect>(&self, path: &Path) -> Result<T, TagfigError> {
        let bytes = file::read_document(path)?;
        debug!(path = %path.display(), format = %self.format, "loading config file");
        self.load(&bytes)
    }

    /// Loading from environment variables is not supported.
    pub fn load_env<T: Reflect>(&self) -> Result<T, TagfigError> {
        Err(TagfigError::NotImplemented("environment variables"))
    }

    /// Loading from command-line arguments is not supported.
    pub fn load_args<T: Reflect>(&self, _args: &[String]) -> Result<T, TagfigError> {
        Err(TagfigError::NotImplemented("command-line arguments"))
    }

    /// Generate a fully defaulted document for `T`. With `output`, the
    /// template is written there instead of returned.
    pub fn template<T: Reflect>(&self, output: Option<&Path>) -> Result<ConfigResult, TagfigError> {
        let template = ops::generate_template::<T>(self.format, &self.schema())?;
        match output {
            Some(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent).map_err(|source| TagfigError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                file::write_document(path, template.as_bytes())?;
                Ok(ConfigResult::TemplateWritten {
                    path: PathBuf::from(path),
                })
            }
            None => Ok(ConfigResult::Template(template)),
        }
    }

    /// The field tree of `T` under the effective schema.
    pub fn describe<T: Reflect>(&self) -> Result<Vec<FieldInfo>, TagfigError> {
        descriptor::describe::<T>(&self.schema())
    }

    pub fn get<T: Reflect>(&self, config: &T, key: &str) -> Result<ConfigResult, TagfigError> {
        ops::get_value(config, key, &self.schema())
    }

    pub fn list<T: Reflect>(&self, config: &T) -> Result<ConfigResult, TagfigError> {
        ops::list_values(config, &self.schema())
    }
}

impl Default for TagfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
