use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable home of the refresh token. Survives a restart so the session can be re-established silently.
pub trait TokenStorage: Send + Sync {
    /// Returns the stored refresh token, if any.
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&self, refresh_token: &str) -> io::Result<()>;
    /// Removes the stored token. Clearing an empty storage is not an error.
    fn clear(&self) -> io::Result<()>;
}

/// Keeps the refresh token in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    token: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage that already holds `refresh_token`.
    pub fn with_token(refresh_token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(refresh_token.into())),
        }
    }

    fn slot(&self) -> io::Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "token storage lock poisoned"))
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, refresh_token: &str) -> io::Result<()> {
        *self.slot()? = Some(refresh_token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Keeps the refresh token in a single file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage under the user's config directory: `<config dir>/gigz/refresh_token`.
    pub fn default_location() -> io::Result<Self> {
        let dir = dirs::config_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no config directory for this user")
        })?;
        Ok(Self::new(dir.join("gigz").join("refresh_token")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileStorage {
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, refresh_token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, refresh_token)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
