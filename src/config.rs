//! Pipeline configuration: explicit settings passed to each component,
//! plus the optional file config merged under CLI flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use url::Url;

/// Default mirror root. Trailing slash is significant: URLs are built by
/// appending `{directory}/{filename}` directly.
pub const DEFAULT_MIRROR_URL: &str =
    "http://www.mirrorservice.org/sites/ftp.ibiblio.org/pub/docs/books/gutenberg/";

/// Language assumed for catalog entries that carry no language attribute.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Default connect timeout for mirror requests, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default whole-request timeout for mirror requests, in seconds.
/// Generous because index files and some archives are large.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

/// Resolved settings for a pipeline run.
///
/// Every component takes what it needs from here at construction; nothing
/// reads configuration from globals or the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Mirror root URL, with trailing slash.
    pub mirror_url: String,
    /// Target language filter for fetch and normalize.
    pub language: String,
    /// Where the raw index files and the persisted manifest live.
    pub indexes_dir: PathBuf,
    /// Where fetched ebook archives land.
    pub zipped_dir: PathBuf,
    /// Where archives are extracted to.
    pub unzipped_dir: PathBuf,
    /// Where normalized per-book artifacts are written.
    pub output_dir: PathBuf,
    /// Filename variant suffixes, tried in order when a fetch 404s.
    pub variant_suffixes: Vec<String>,
    /// Paragraphs starting with any of these are dropped during normalization.
    pub boilerplate_prefixes: Vec<String>,
    /// Normalize books whose catalog language is unknown.
    pub accept_unknown_language: bool,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP whole-request timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Settings {
    /// Creates settings rooted at `root`, with the standard directory layout
    /// and default mirror/language/variant/boilerplate values.
    #[must_use]
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            mirror_url: DEFAULT_MIRROR_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            indexes_dir: root.join("indexes"),
            zipped_dir: root.join("ebooks-zipped"),
            unzipped_dir: root.join("ebooks-unzipped"),
            output_dir: root.join("ebooks"),
            variant_suffixes: vec![String::new(), "-0".to_string(), "-8".to_string()],
            boilerplate_prefixes: vec![
                "Produced by".to_string(),
                "End of the Project Gutenberg".to_string(),
                "End of Project Gutenberg".to_string(),
            ],
            accept_unknown_language: false,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }

    /// Sets the mirror root, ensuring the trailing slash URL building
    /// relies on.
    pub fn set_mirror_url(&mut self, mirror_url: impl Into<String>) {
        let mut mirror_url = mirror_url.into();
        if !mirror_url.ends_with('/') {
            mirror_url.push('/');
        }
        self.mirror_url = mirror_url;
    }

    /// Applies file-config values on top of the current settings.
    /// `root_dir` is not applied here; the caller resolves the root before
    /// constructing settings so the directory layout is built once.
    pub fn apply_file_config(&mut self, config: &FileConfig) {
        if let Some(mirror_url) = &config.mirror_url {
            self.set_mirror_url(mirror_url.clone());
        }
        if let Some(language) = &config.language {
            self.language = language.clone();
        }
        if let Some(accept) = config.accept_unknown_language {
            self.accept_unknown_language = accept;
        }
        if let Some(secs) = config.connect_timeout_secs {
            self.connect_timeout_secs = secs;
        }
        if let Some(secs) = config.read_timeout_secs {
            self.read_timeout_secs = secs;
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_root(".")
    }
}

/// File configuration for pipeline defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Default mirror root URL.
    pub mirror_url: Option<String>,
    /// Default target language.
    pub language: Option<String>,
    /// Default base directory for the four data directories.
    pub root_dir: Option<PathBuf>,
    /// Normalize books with unknown catalog language.
    pub accept_unknown_language: Option<bool>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP whole-request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(mirror_url) = &self.mirror_url {
            validate_mirror_url(mirror_url)?;
        }
        if let Some(language) = &self.language
            && language.trim().is_empty()
        {
            bail!("Invalid config value for `language`: must not be empty");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

/// Checks that a mirror root is a well-formed http(s) URL.
pub fn validate_mirror_url(mirror_url: &str) -> Result<()> {
    match Url::parse(mirror_url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => bail!("Invalid mirror URL: {mirror_url}. Expected an http(s) URL"),
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if one is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/gutenmill/config.toml`
/// 2. `$HOME/.config/gutenmill/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("gutenmill")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("gutenmill")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads configuration from an explicit path, or from the default path when
/// present. An explicit path that cannot be read is an error; a missing
/// default path is not.
pub fn load_config(explicit_path: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit_path {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
            loaded_from_file: true,
        });
    }

    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
        loaded_from_file: true,
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "mirror_url" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `mirror_url` value on line {}", line_index + 1)
                })?;
                cfg.mirror_url = Some(parsed);
            }
            "language" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `language` value on line {}", line_index + 1)
                })?;
                cfg.language = Some(parsed);
            }
            "root_dir" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `root_dir` value on line {}", line_index + 1)
                })?;
                cfg.root_dir = Some(PathBuf::from(parsed));
            }
            "accept_unknown_language" => {
                let parsed = parse_boolean(value).with_context(|| {
                    format!(
                        "Invalid `accept_unknown_language` value on line {}",
                        line_index + 1
                    )
                })?;
                cfg.accept_unknown_language = Some(parsed);
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!(
                        "Invalid `connect_timeout_secs` value on line {}",
                        line_index + 1
                    )
                })?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "read_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!(
                        "Invalid `read_timeout_secs` value on line {}",
                        line_index + 1
                    )
                })?;
                cfg.read_timeout_secs = Some(parsed);
            }
            unknown => {
                bail!(
                    "Unknown configuration key: '{}' on line {}",
                    unknown,
                    line_index + 1
                );
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}
