//! Configuration loader for the wysiwyg editor.
//!
//! Settings are resolved with the precedence
//! override flag → working directory → git root → built-in defaults,
//! merged field by field. Parsed values are validated into typed settings so
//! the CLI never touches raw TOML.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use wysiwyg_core::{
    validate_key, Command, EditorOptions, PreviewMode, Toolbar, DEFAULT_LINK_PREFIX,
    DEFAULT_SAVE_INTERVAL, DEFAULT_STORAGE_KEY,
};

const CONFIG_FILE_NAME: &str = ".wysiwyg.toml";
const DEFAULT_STORE_DIR: &str = ".wysiwyg";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub toolbar: ToolbarSettings,
    pub autosave: AutosaveSettings,
    pub storage: StorageSettings,
    pub preview: PreviewSettings,
    pub link: LinkSettings,
    pub sources: ConfigSources,
}

#[derive(Clone, Debug)]
pub struct ToolbarSettings {
    pub buttons: Vec<Command>,
}

#[derive(Clone, Debug)]
pub struct AutosaveSettings {
    pub enabled: bool,
    pub interval: Duration,
}

#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub key: String,
    pub dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct PreviewSettings {
    pub mode: PreviewMode,
}

#[derive(Clone, Debug)]
pub struct LinkSettings {
    pub default: String,
}

impl Config {
    /// Editor options derived from the resolved settings.
    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            toolbar: Toolbar::new(self.toolbar.buttons.clone()),
            storage_key: self.storage.key.clone(),
            preview_mode: self.preview.mode,
            autosave: self.autosave.enabled,
            save_interval: self.autosave.interval,
            link_default: self.link.default.clone(),
        }
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    /// Human-readable origin, used in validation messages.
    pub fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

/// A single validation failure, tagged with the layer that introduced it.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub context: Option<String>,
    pub message: String,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            context: None,
            message,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{context}: ")?;
        }
        f.write_str(&self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, error) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {error}")?;
        }
        Ok(())
    }
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let layers = discover_layers(&working_dir, options.override_path.as_deref())?;

        let mut merged = PartialConfig::default();
        for source in &layers {
            let partial = match &source.path {
                Some(path) => load_layer(path, source.clone())?,
                None => defaults_layer(source.clone()),
            };
            merged.merge(partial);
        }

        let resolved = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            toolbar: resolved.toolbar,
            autosave: resolved.autosave,
            storage: resolved.storage,
            preview: resolved.preview,
            link: resolved.link,
            sources: ConfigSources {
                working_directory: working_dir,
                layers,
            },
        })
    }
}

/// Sources that apply to `working_dir`, lowest precedence first. A file is
/// layered at most once, under its highest-precedence role.
fn discover_layers(
    working_dir: &Path,
    override_path: Option<&Path>,
) -> Result<Vec<ConfigSource>, ConfigError> {
    let override_path = override_path.map(|path| working_dir.join(path));
    if let Some(path) = &override_path {
        if !path.is_file() {
            return Err(ConfigError::OverrideNotFound { path: path.clone() });
        }
    }

    let local = working_dir.join(CONFIG_FILE_NAME);
    let git = find_git_root(working_dir)
        .map(|root| root.join(CONFIG_FILE_NAME))
        .filter(|path| *path != local);

    let mut layers = vec![ConfigSource::default(working_dir.to_path_buf())];
    let discovered = git
        .map(|path| (ConfigSourceKind::GitRoot, path))
        .into_iter()
        .chain([(ConfigSourceKind::Local, local)]);
    for (kind, path) in discovered {
        if path.is_file() && override_path.as_ref() != Some(&path) {
            layers.push(ConfigSource::for_file(kind, path));
        }
    }
    if let Some(path) = override_path {
        layers.push(ConfigSource::for_file(ConfigSourceKind::Override, path));
    }
    Ok(layers)
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::Io {
        path: path.into(),
        source: err,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.into(),
        source: err,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    PartialConfig {
        buttons: Some(Located::new(
            Command::ALL.iter().map(|c| c.as_str().to_string()).collect(),
            source.clone(),
        )),
        autosave_enabled: Some(Located::new(true, source.clone())),
        autosave_interval_ms: Some(Located::new(
            DEFAULT_SAVE_INTERVAL.as_millis() as u64,
            source.clone(),
        )),
        storage_key: Some(Located::new(DEFAULT_STORAGE_KEY.to_string(), source.clone())),
        storage_dir: Some(Located::new(PathBuf::from(DEFAULT_STORE_DIR), source.clone())),
        preview_mode: Some(Located::new("raw".to_string(), source.clone())),
        link_default: Some(Located::new(DEFAULT_LINK_PREFIX.to_string(), source.clone())),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    toolbar: RawToolbar,
    #[serde(default)]
    autosave: RawAutosave,
    #[serde(default)]
    storage: RawStorage,
    #[serde(default)]
    preview: RawPreview,
    #[serde(default)]
    link: RawLink,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawToolbar {
    buttons: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAutosave {
    enabled: Option<bool>,
    interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStorage {
    key: Option<String>,
    dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPreview {
    mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLink {
    default: Option<String>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        PartialConfig {
            buttons: self.toolbar.buttons.map(|v| Located::new(v, source.clone())),
            autosave_enabled: self
                .autosave
                .enabled
                .map(|v| Located::new(v, source.clone())),
            autosave_interval_ms: self
                .autosave
                .interval_ms
                .map(|v| Located::new(v, source.clone())),
            storage_key: self.storage.key.map(|v| Located::new(v, source.clone())),
            storage_dir: self.storage.dir.map(|v| Located::new(v, source.clone())),
            preview_mode: self.preview.mode.map(|v| Located::new(v, source.clone())),
            link_default: self.link.default.map(|v| Located::new(v, source.clone())),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    buttons: Option<Located<Vec<String>>>,
    autosave_enabled: Option<Located<bool>>,
    autosave_interval_ms: Option<Located<u64>>,
    storage_key: Option<Located<String>>,
    storage_dir: Option<Located<PathBuf>>,
    preview_mode: Option<Located<String>>,
    link_default: Option<Located<String>>,
}

struct ResolvedConfig {
    toolbar: ToolbarSettings,
    autosave: AutosaveSettings,
    storage: StorageSettings,
    preview: PreviewSettings,
    link: LinkSettings,
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        if other.buttons.is_some() {
            self.buttons = other.buttons;
        }
        if other.autosave_enabled.is_some() {
            self.autosave_enabled = other.autosave_enabled;
        }
        if other.autosave_interval_ms.is_some() {
            self.autosave_interval_ms = other.autosave_interval_ms;
        }
        if other.storage_key.is_some() {
            self.storage_key = other.storage_key;
        }
        if other.storage_dir.is_some() {
            self.storage_dir = other.storage_dir;
        }
        if other.preview_mode.is_some() {
            self.preview_mode = other.preview_mode;
        }
        if other.link_default.is_some() {
            self.link_default = other.link_default;
        }
    }

    fn finalize(self) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();
        let fallback = || ConfigSource::default(PathBuf::from("."));

        let buttons = self
            .buttons
            .map(|located| parse_buttons(located, &mut errors))
            .unwrap_or_else(|| Command::ALL.to_vec());

        let enabled = self.autosave_enabled.map(|l| l.value).unwrap_or(true);

        let interval_loc = self.autosave_interval_ms.unwrap_or_else(|| {
            Located::new(DEFAULT_SAVE_INTERVAL.as_millis() as u64, fallback())
        });
        if interval_loc.value == 0 {
            errors.push(
                ConfigValidationError::new(
                    Some(interval_loc.source.clone()),
                    "interval must be greater than 0".into(),
                )
                .with_context("autosave.interval_ms"),
            );
        }

        let key_loc = self
            .storage_key
            .unwrap_or_else(|| Located::new(DEFAULT_STORAGE_KEY.to_string(), fallback()));
        if let Err(reason) = validate_key(&key_loc.value) {
            errors.push(
                ConfigValidationError::new(Some(key_loc.source.clone()), reason)
                    .with_context("storage.key"),
            );
        }

        let dir_loc = self
            .storage_dir
            .unwrap_or_else(|| Located::new(PathBuf::from(DEFAULT_STORE_DIR), fallback()));
        let dir = resolve_path(&dir_loc);

        let mode = match self.preview_mode {
            Some(located) => match located.value.parse::<PreviewMode>() {
                Ok(mode) => mode,
                Err(()) => {
                    errors.push(
                        ConfigValidationError::new(
                            Some(located.source.clone()),
                            format!(
                                "unknown preview mode '{}' (expected 'raw' or 'escaped')",
                                located.value
                            ),
                        )
                        .with_context("preview.mode"),
                    );
                    PreviewMode::Raw
                }
            },
            None => PreviewMode::Raw,
        };

        let link_default = self
            .link_default
            .map(|l| l.value)
            .unwrap_or_else(|| DEFAULT_LINK_PREFIX.to_string());

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(ResolvedConfig {
            toolbar: ToolbarSettings { buttons },
            autosave: AutosaveSettings {
                enabled,
                interval: Duration::from_millis(interval_loc.value),
            },
            storage: StorageSettings {
                key: key_loc.value,
                dir,
            },
            preview: PreviewSettings { mode },
            link: LinkSettings {
                default: link_default,
            },
        })
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    let path = &located.value;
    if path.is_absolute() {
        path.clone()
    } else {
        located.source.base_dir.join(path)
    }
}

fn parse_buttons(
    located: Located<Vec<String>>,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<Command> {
    let mut buttons = Vec::new();
    for name in &located.value {
        match name.parse::<Command>() {
            Ok(command) if buttons.contains(&command) => errors.push(
                ConfigValidationError::new(
                    Some(located.source.clone()),
                    format!("duplicate button '{command}'"),
                )
                .with_context("toolbar.buttons"),
            ),
            Ok(command) => buttons.push(command),
            Err(_) => errors.push(
                ConfigValidationError::new(
                    Some(located.source.clone()),
                    format!("unknown button '{name}'"),
                )
                .with_context("toolbar.buttons"),
            ),
        }
    }
    buttons
}
