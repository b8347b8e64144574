use std::path::{Path, PathBuf};

/// The application data directory. It holds the configuration file, the log
/// file and the session cache.
#[derive(Clone, Debug, PartialEq)]
pub struct AppDirectory(PathBuf);

impl AppDirectory {
    pub fn new(p: PathBuf) -> Self {
        AppDirectory(p)
    }

    pub fn new_default() -> Result<Self, Box<dyn std::error::Error>> {
        default_datadir().map(AppDirectory::new)
    }

    pub fn exists(&self) -> bool {
        self.0.as_path().exists()
    }

    pub fn init(&self) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(self.0.as_path())
    }

    pub fn path(&self) -> &Path {
        self.0.as_path()
    }
}

/// Get the absolute path to the turnstile data folder.
///
/// This is a "Turnstile" directory in the XDG standard configuration directory for all OSes but
/// Linux-based ones, for which it's `~/.turnstile`.
/// Rationale: we want the log file and the session cache in the same folder as the configuration
/// file but for Linux the XDG specify a data directory (`~/.local/share/`) different from the
/// configuration one (`~/.config/`).
fn default_datadir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    #[cfg(target_os = "linux")]
    let configs_dir = dirs::home_dir();

    #[cfg(not(target_os = "linux"))]
    let configs_dir = dirs::config_dir();

    if let Some(mut path) = configs_dir {
        #[cfg(target_os = "linux")]
        path.push(".turnstile");

        #[cfg(not(target_os = "linux"))]
        path.push("Turnstile");

        return Ok(path);
    }

    Err("Failed to get default data directory".into())
}
