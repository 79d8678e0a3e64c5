//! Wallet roster entries

use std::fmt;
use std::sync::Arc;

use crate::traits::WalletAdapter;

type AdapterFactory = dyn Fn() -> Arc<dyn WalletAdapter> + Send + Sync;

/// Static roster entry: a wallet's name, install URL and adapter factory
#[derive(Clone)]
pub struct WalletDescriptor {
    name: String,
    url: String,
    factory: Arc<AdapterFactory>,
}

impl fmt::Debug for WalletDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletDescriptor")
            .field("name", &self.name)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl PartialEq for WalletDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.url == other.url
    }
}

impl WalletDescriptor {
    pub fn new<F>(name: impl Into<String>, url: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn WalletAdapter> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            url: url.into(),
            factory: Arc::new(factory),
        }
    }

    /// Describe an already constructed adapter, reusing its name and URL
    pub fn from_adapter(adapter: Arc<dyn WalletAdapter>) -> Self {
        let name = adapter.name().to_string();
        let url = adapter.url().to_string();
        Self::new(name, url, move || adapter.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Produce the adapter handle for this wallet
    pub fn create_adapter(&self) -> Arc<dyn WalletAdapter> {
        (self.factory)()
    }
}
