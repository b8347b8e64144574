use std::io::SeekFrom;

use async_fd_lock::LockWrite;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::dir::AppDirectory;

pub const SESSION_CACHE_FILENAME: &str = "session.json";

/// The session context: the bearer token issued by the service, persisted in
/// the data directory so it survives a restart. Requests requiring identity
/// context read it from here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Session {
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: i64,
}

impl Session {
    pub fn new(token: String) -> Self {
        Session { token }
    }

    pub fn from_cache(datadir: &AppDirectory) -> Result<Option<Self>, SessionError> {
        let mut path = datadir.path().to_path_buf();
        path.push(SESSION_CACHE_FILENAME);

        match std::fs::read(&path) {
            Ok(content) => serde_json::from_slice(&content)
                .map(Some)
                .map_err(|e| SessionError::Corrupted(format!("Parsing session file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::ReadingFile(format!(
                "Reading session file: {}",
                e
            ))),
        }
    }

    pub async fn store(&self, datadir: &AppDirectory) -> Result<(), SessionError> {
        let mut path = datadir.path().to_path_buf();
        path.push(SESSION_CACHE_FILENAME);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await
            .map_err(|e| SessionError::WritingFile(format!("Opening file: {}", e)))?
            .lock_write()
            .await
            .map_err(|e| SessionError::WritingFile(format!("Locking file: {:?}", e)))?;

        let content = serde_json::to_vec_pretty(&self).map_err(|e| {
            SessionError::WritingFile(format!("Failed to serialize session: {}", e))
        })?;

        file.seek(SeekFrom::Start(0)).await.map_err(|e| {
            SessionError::WritingFile(format!("Failed to seek to start of file: {}", e))
        })?;

        file.write_all(&content).await.map_err(|e| {
            tracing::warn!("failed to write to file: {:?}", e);
            SessionError::WritingFile(e.to_string())
        })?;

        file.inner_mut()
            .set_len(content.len() as u64)
            .await
            .map_err(|e| SessionError::WritingFile(format!("Failed to truncate file: {}", e)))?;

        Ok(())
    }

    /// Remove the cached session. A missing cache file is not an error.
    pub fn clear(datadir: &AppDirectory) -> Result<(), SessionError> {
        let mut path = datadir.path().to_path_buf();
        path.push(SESSION_CACHE_FILENAME);

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::WritingFile(format!(
                "Removing session file: {}",
                e
            ))),
        }
    }

    /// Whether the token's expiry claim is in the past.
    ///
    /// The signature is not checked here, the server remains the authority on
    /// token validity. A token without a readable expiry claim is treated as
    /// expired.
    pub fn is_expired(&self, now: i64) -> bool {
        match token_expiry(&self.token) {
            Some(exp) => exp < now,
            None => true,
        }
    }
}

fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.exp)
}

#[derive(Debug, Clone)]
pub enum SessionError {
    ReadingFile(String),
    WritingFile(String),
    Corrupted(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::ReadingFile(e) => write!(f, "Error while reading file: {}", e),
            Self::WritingFile(e) => write!(f, "Error while writing file: {}", e),
            Self::Corrupted(e) => write!(f, "Session file is corrupted: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_with_expiry(exp: i64) -> String {
        #[derive(Serialize)]
        struct TestClaims {
            exp: i64,
        }
        encode(
            &Header::default(),
            &TestClaims { exp },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn session_store_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let datadir = AppDirectory::new(dir.path().to_path_buf());

        assert!(Session::from_cache(&datadir).unwrap().is_none());

        let session = Session::new("sometoken".to_string());
        session.store(&datadir).await.unwrap();

        let read = Session::from_cache(&datadir).unwrap().unwrap();
        assert_eq!(read.token, "sometoken");

        // Storing again overwrites, including with shorter content.
        let session = Session::new("t".to_string());
        session.store(&datadir).await.unwrap();
        let read = Session::from_cache(&datadir).unwrap().unwrap();
        assert_eq!(read.token, "t");

        Session::clear(&datadir).unwrap();
        assert!(Session::from_cache(&datadir).unwrap().is_none());
        // Clearing twice is fine.
        Session::clear(&datadir).unwrap();
    }

    #[test]
    fn session_corrupted_cache() {
        let dir = tempfile::tempdir().unwrap();
        let datadir = AppDirectory::new(dir.path().to_path_buf());
        std::fs::write(dir.path().join(SESSION_CACHE_FILENAME), b"not json").unwrap();
        assert!(matches!(
            Session::from_cache(&datadir),
            Err(SessionError::Corrupted(_))
        ));
    }

    #[test]
    fn session_expiry() {
        let now = 1_700_000_000;

        let session = Session::new(token_with_expiry(now + 600));
        assert!(!session.is_expired(now));

        let session = Session::new(token_with_expiry(now - 600));
        assert!(session.is_expired(now));

        // Not a JWT at all: considered expired.
        let session = Session::new("opaque".to_string());
        assert!(session.is_expired(now));
    }
}
