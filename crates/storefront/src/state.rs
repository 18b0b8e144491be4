//! Application state shared across pages.

use std::sync::Arc;

use crate::cart::{CartStore, FileStorage};
use crate::config::StorefrontConfig;
use crate::firebase::{CatalogClient, DocumentClient, IdentityClient};
use crate::models::SessionHolder;
use crate::services::{AuthService, ContactService, ReviewService};

/// Application state shared across all pages.
///
/// This struct is cheaply cloneable via `Arc` and owns the long-lived
/// Firebase clients and the session. The cart is opened separately with
/// [`AppState::open_cart`] because it is owned by a single consumer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    documents: DocumentClient,
    identity: IdentityClient,
    session: SessionHolder,
}

impl AppState {
    /// Create the application state from configuration.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let catalog = CatalogClient::new(&config.firebase, config.catalog_cache_ttl);
        let documents = DocumentClient::new(&config.firebase);
        let identity = IdentityClient::new(&config.firebase);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                documents,
                identity,
                session: SessionHolder::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the Firestore document client.
    #[must_use]
    pub fn documents(&self) -> &DocumentClient {
        &self.inner.documents
    }

    /// Get a reference to the session holder.
    #[must_use]
    pub fn session(&self) -> &SessionHolder {
        &self.inner.session
    }

    /// Authentication service bound to this state's session.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.identity, &self.inner.session)
    }

    #[must_use]
    pub fn reviews(&self) -> ReviewService<'_> {
        ReviewService::new(&self.inner.documents)
    }

    #[must_use]
    pub fn contact(&self) -> ContactService<'_> {
        ContactService::new(&self.inner.documents)
    }

    /// Open the cart persisted under the configured storage directory.
    #[must_use]
    pub fn open_cart(&self) -> CartStore {
        let cart = &self.inner.config.cart;
        let storage = Arc::new(FileStorage::new(cart.storage_dir.clone()));
        CartStore::open(storage, cart.settings.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use miss_gypsy_core::{Email, LineItemId, UserUid, Variant};
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use url::Url;

    use super::*;
    use crate::cart::{CartSettings, NewLineItem};
    use crate::config::{CartConfig, FirebaseConfig};
    use crate::models::CurrentUser;

    fn config(dir: &std::path::Path) -> StorefrontConfig {
        StorefrontConfig {
            firebase: FirebaseConfig {
                api_key: SecretString::from("key"),
                project_id: "jewellery".to_string(),
                database_url: Url::parse("https://jewellery-default-rtdb.firebaseio.com/")
                    .unwrap(),
            },
            cart: CartConfig {
                storage_dir: dir.to_path_buf(),
                settings: CartSettings::default(),
            },
            catalog_cache_ttl: Duration::from_secs(60),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[tokio::test]
    async fn test_clones_share_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(config(dir.path()));
        let page_state = state.clone();

        state.session().set_user(CurrentUser {
            uid: UserUid::new("uid-1"),
            email: Email::parse("asha@example.com").unwrap(),
        });

        assert!(page_state.session().is_authenticated());
        page_state.auth().logout();
        assert!(!state.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_open_cart_uses_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(config(dir.path()));

        let mut cart = state.open_cart();
        cart.add_item(NewLineItem {
            id: LineItemId::new("anklet-s-gold"),
            name: "Anklet".to_string(),
            price: Decimal::from(799),
            image: String::new(),
            variant: Variant::default(),
            stock: None,
        })
        .unwrap();
        cart.close();

        assert!(dir.path().join("cart.json").exists());
        assert_eq!(state.open_cart().len(), 1);
    }
}
