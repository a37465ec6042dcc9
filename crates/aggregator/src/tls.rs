//! Shared TLS client configuration.

use once_cell::sync::OnceCell;
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;

static TLS_CONFIG: OnceCell<Arc<ClientConfig>> = OnceCell::new();

/// Get the process-wide TLS client configuration, building it on first use.
///
/// The ring provider is passed explicitly so building the config does not depend on a
/// process default having been installed.
pub fn get_shared_tls_config() -> Result<Arc<ClientConfig>, rustls::Error> {
    TLS_CONFIG
        .get_or_try_init(|| {
            let mut root_cert_store = RootCertStore::empty();
            root_cert_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

            let config = ClientConfig::builder_with_provider(Arc::new(
                rustls::crypto::ring::default_provider(),
            ))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(root_cert_store)
            .with_no_client_auth();

            Ok(Arc::new(config))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_tls_config() {
        let config1 = get_shared_tls_config().unwrap();
        let config2 = get_shared_tls_config().unwrap();

        // Should return the same Arc instance
        assert!(Arc::ptr_eq(&config1, &config2));
    }
}
