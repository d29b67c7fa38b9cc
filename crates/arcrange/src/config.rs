use crate::events::HostEvent;
use async_channel::Sender;
use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rangekit::{Point, RawConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct WidgetId(String);

rangekit::impl_string_newtype!(WidgetId);

/// One hosted widget: where it sits and how its range is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetConfig {
    pub id: WidgetId,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(flatten)]
    pub range: RawConfig,
}

impl WidgetConfig {
    pub fn bounds(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
}

impl Config {
    pub fn widget(&self, id: &WidgetId) -> Option<&WidgetConfig> {
        // later definitions shadow earlier ones
        self.widgets.iter().rev().find(|w| &w.id == id)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "arcrange", "arcrange").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("ARCRANGE"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// The user's config, or the bundled widget set when there is none or it
/// cannot be read.
pub fn load_or_default() -> Config {
    if let Ok(path) = get_config_path()
        && path.exists()
    {
        match load_config() {
            Ok(c) => return c,
            Err(e) => log::error!("Failed to load {}: {}", path.display(), e),
        }
    }

    parse_config(DEFAULT_CONFIG).unwrap_or_else(|e| {
        log::error!("Bundled config is invalid: {}", e);
        Config::default()
    })
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Quiet period after a file event before the config is compared again.
/// Editors tend to write a file in several steps.
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(150);

type WatchEvents = async_channel::Receiver<notify::Result<notify::Event>>;

fn watch_config_dir(config_dir: &Path) -> Result<(RecommendedWatcher, WatchEvents), ConfigError> {
    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(config_dir, RecursiveMode::NonRecursive)?;
    Ok((watcher, bridge_rx))
}

fn touches_config(event: &notify::Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Remembers the last config text seen so that saves which leave the file
/// unchanged do not reload every widget.
#[derive(Debug, Default)]
struct ConfigSnapshot {
    contents: Option<String>,
}

impl ConfigSnapshot {
    fn read(path: &Path) -> Self {
        Self {
            contents: fs_err::read_to_string(path).ok(),
        }
    }

    /// Records `contents` and reports whether it differs from the last one.
    fn update(&mut self, contents: Option<String>) -> bool {
        if self.contents == contents {
            return false;
        }
        self.contents = contents;
        true
    }
}

pub async fn run_async_watcher(tx: Sender<HostEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(Path::to_path_buf) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    // the watcher stops when dropped, so it lives as long as this loop
    let (_watcher, events) = match watch_config_dir(&config_dir) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to watch {}: {}", config_dir.display(), e);
            return;
        }
    };
    log::debug!("Watching {}", config_path.display());

    let mut snapshot = ConfigSnapshot::read(&config_path);
    while let Ok(res) = events.recv().await {
        match res {
            Ok(event) if touches_config(&event, &config_path) => {
                // swallow the rest of a burst of writes
                while let Ok(Ok(_)) = tokio::time::timeout(RELOAD_DEBOUNCE, events.recv()).await {}

                let contents = fs_err::read_to_string(&config_path).ok();
                if !snapshot.update(contents) {
                    log::debug!("Config file touched without changes");
                    continue;
                }
                if tx.send(HostEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error: {}", ConfigError::from(e)),
        }
    }
}
