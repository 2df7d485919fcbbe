//! Generation settings from `kernelgen.toml`.
//!
//! ```toml
//! [target]
//! language = "opencl"
//! architecture = "x86"
//!
//! [output]
//! indent = 4
//!
//! [catalog]
//! files = ["tables/avx512-extra.json"]
//! ```
//!
//! Catalog paths are relative to the directory holding the file.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::context::RenderContext;
use crate::error::{CodegenError, Result};
use crate::intrinsics::Catalog;
use crate::target::{Architecture, Language};

pub const CONFIG_FILE: &str = "kernelgen.toml";

#[derive(Clone, Debug, PartialEq)]
pub struct GenConfig {
    pub language: Language,
    pub architecture: Architecture,
    /// Spaces per nesting level.
    pub indent: usize,
    /// Extra intrinsic tables, already resolved against the config directory.
    pub catalog_files: Vec<PathBuf>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            language: Language::C,
            architecture: Architecture::Generic,
            indent: 2,
            catalog_files: Vec::new(),
        }
    }
}

impl GenConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CodegenError::Config {
            path: path.to_path_buf(),
            message: format!("cannot read: {}", e),
        })?;
        Self::parse_toml(&content, path)
    }

    /// Look for `kernelgen.toml` in `start` and its ancestors.
    pub fn find(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// The nearest config above `start`, or the defaults.
    pub fn discover(start: &Path) -> Result<Self> {
        match Self::find(start) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let err = |message: String| CodegenError::Config {
            path: path.to_path_buf(),
            message,
        };
        let base = path.parent().unwrap_or(Path::new(""));
        let mut config = Self::default();
        let mut section = String::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                section = trimmed[1..trimmed.len() - 1].trim().to_string();
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(err(format!("expected `key = value`, found `{}`", trimmed)));
            };
            let key = key.trim();
            let value = value.trim();
            let unquoted = value.trim_matches('"');

            match (section.as_str(), key) {
                ("target", "language") => {
                    config.language = Language::from_name(unquoted)
                        .ok_or_else(|| err(format!("unknown language: {}", unquoted)))?;
                }
                ("target", "architecture") => {
                    config.architecture = Architecture::from_name(unquoted)
                        .ok_or_else(|| err(format!("unknown architecture: {}", unquoted)))?;
                }
                ("output", "indent") => {
                    config.indent = value
                        .parse()
                        .map_err(|_| err(format!("invalid output.indent: {}", value)))?;
                }
                ("catalog", "files") => {
                    config.catalog_files = parse_string_array(value)
                        .into_iter()
                        .map(|file| base.join(file))
                        .collect();
                }
                _ => debug!(section = %section, key, "ignoring unknown config key"),
            }
        }
        Ok(config)
    }

    /// Built-in tables merged with every configured table file.
    pub fn catalog(&self) -> Result<Catalog> {
        let mut catalog = Catalog::standard();
        for file in &self.catalog_files {
            catalog.extend_from_json(file)?;
            debug!(file = %file.display(), "merged intrinsic table");
        }
        Ok(catalog)
    }

    /// Context for the configured target over `catalog`.
    pub fn context<'a>(&self, catalog: &'a Catalog) -> RenderContext<'a> {
        RenderContext::new(self.language, self.architecture).with_catalog(catalog)
    }
}

/// Parse a minimal TOML string array: `["a", "b"]`.
fn parse_string_array(s: &str) -> Vec<String> {
    let s = s.trim();
    if !s.starts_with('[') || !s.ends_with(']') {
        return Vec::new();
    }
    s[1..s.len() - 1]
        .split(',')
        .map(|part| part.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intrinsics::IntrinsicOp;
    use crate::types::NumericType;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            CONFIG_FILE,
            "# generation settings\n\
             [target]\n\
             language = \"opencl\"\n\
             architecture = \"arm\"\n\
             \n\
             [output]\n\
             indent = 4\n\
             \n\
             [catalog]\n\
             files = [\"tables/extra.json\", \"more.json\"]\n",
        );
        let config = GenConfig::load(&path).unwrap();
        assert_eq!(config.language, Language::OpenCl);
        assert_eq!(config.architecture, Architecture::Arm);
        assert_eq!(config.indent, 4);
        assert_eq!(
            config.catalog_files,
            vec![dir.path().join("tables/extra.json"), dir.path().join("more.json")]
        );
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), CONFIG_FILE, "[target]\narchitecture = \"x86\"\n");
        let config = GenConfig::load(&path).unwrap();
        assert_eq!(config.language, Language::C);
        assert_eq!(config.architecture, Architecture::X86);
        assert_eq!(config.indent, 2);
        assert!(config.catalog_files.is_empty());
    }

    #[test]
    fn test_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        for content in [
            "[target]\nlanguage = \"cobol\"\n",
            "[target]\narchitecture = \"sparc\"\n",
            "[output]\nindent = wide\n",
            "[target]\nlanguage\n",
        ] {
            let path = write(dir.path(), CONFIG_FILE, content);
            let err = GenConfig::load(&path).unwrap_err();
            assert!(matches!(err, CodegenError::Config { .. }), "{}", content);
        }
        let missing = GenConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, CodegenError::Config { .. }));
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), CONFIG_FILE, "[target]\nlanguage = \"fortran\"\n");
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(GenConfig::find(&nested), Some(dir.path().join(CONFIG_FILE)));
        assert_eq!(GenConfig::discover(&nested).unwrap().language, Language::Fortran);

        let empty = tempfile::tempdir().unwrap();
        if GenConfig::find(empty.path()).is_none() {
            assert_eq!(GenConfig::discover(empty.path()).unwrap(), GenConfig::default());
        }
    }

    #[test]
    fn test_catalog_merges_table_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "mppa.json",
            r#"{ "architecture": "mppa",
                 "intrinsics": [{ "op": "add", "type": "f32x4", "name": "__builtin_k1_faddwq" }] }"#,
        );
        let path = write(
            dir.path(),
            CONFIG_FILE,
            "[target]\narchitecture = \"mppa\"\n[catalog]\nfiles = [\"mppa.json\"]\n",
        );
        let config = GenConfig::load(&path).unwrap();
        let catalog = config.catalog().unwrap();
        let f32x4: NumericType = "f32x4".parse().unwrap();
        assert_eq!(
            catalog.lookup(IntrinsicOp::Add, Architecture::Mppa, &f32x4),
            Some("__builtin_k1_faddwq")
        );
        // Built-in tables are still there.
        assert_eq!(
            catalog.lookup(IntrinsicOp::Add, Architecture::X86, &f32x4),
            Some("_mm_add_ps")
        );
        let cx = config.context(&catalog);
        assert_eq!(cx.architecture, Architecture::Mppa);
    }

    #[test]
    fn test_catalog_reports_bad_tables() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.json", "{ \"architecture\": 7 }");
        let path = write(dir.path(), CONFIG_FILE, "[catalog]\nfiles = [\"bad.json\"]\n");
        let err = GenConfig::load(&path).unwrap().catalog().unwrap_err();
        assert!(matches!(err, CodegenError::CatalogFormat(_)));

        let path = write(dir.path(), CONFIG_FILE, "[catalog]\nfiles = [\"gone.json\"]\n");
        let err = GenConfig::load(&path).unwrap().catalog().unwrap_err();
        assert!(matches!(err, CodegenError::Io(_)));
    }
}
