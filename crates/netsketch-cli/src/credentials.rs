//! Terminal key selection

use netsketch_core::{ApiKey, CredentialError, CredentialProvider};
use parking_lot::RwLock;
use std::io::{BufRead, Write};

/// Key seeded from an environment variable, with a stdin prompt fallback
#[derive(Debug)]
pub struct InteractiveCredentials {
    var: String,
    key: RwLock<Option<ApiKey>>,
}

impl InteractiveCredentials {
    /// Seed from `var`; absent or blank means no key yet
    #[must_use]
    pub fn from_env(var: &str) -> Self {
        Self::with_key(var, std::env::var(var).ok().and_then(ApiKey::new))
    }

    /// Seed with an explicit key
    #[must_use]
    pub fn with_key(var: &str, key: Option<ApiKey>) -> Self {
        Self {
            var: var.to_string(),
            key: RwLock::new(key),
        }
    }

    /// Install a key read from a line of input
    ///
    /// # Errors
    /// `CredentialError::Dismissed` for a blank line.
    pub fn accept(&self, line: &str) -> Result<(), CredentialError> {
        let key = ApiKey::new(line).ok_or(CredentialError::Dismissed)?;
        *self.key.write() = Some(key);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CredentialProvider for InteractiveCredentials {
    async fn has_active_credential(&self) -> bool {
        self.key.read().is_some()
    }

    async fn prompt_for_credential(&self) -> Result<(), CredentialError> {
        let var = self.var.clone();
        let line = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
            let mut stderr = std::io::stderr();
            write!(stderr, "No API key found in {var}. Paste a key (blank to cancel): ")?;
            stderr.flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| CredentialError::Unavailable(e.to_string()))?
        .map_err(|e| CredentialError::Unavailable(e.to_string()))?;

        self.accept(&line)?;
        tracing::info!("API key selected");
        Ok(())
    }

    fn api_key(&self) -> Option<ApiKey> {
        self.key.read().clone()
    }
}
