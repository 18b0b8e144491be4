//! Signed-in user and the session holder.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use miss_gypsy_core::{Email, UserUid};

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Firebase account ID.
    pub uid: UserUid,
    /// Account email address.
    pub email: Email,
}

/// Holds the current user, if any, and lets consumers watch for changes.
///
/// Clones share the same state. Only the auth flows call [`set_user`]; pages
/// read [`current_user`] or [`subscribe`].
///
/// [`set_user`]: SessionHolder::set_user
/// [`current_user`]: SessionHolder::current_user
/// [`subscribe`]: SessionHolder::subscribe
#[derive(Debug, Clone)]
pub struct SessionHolder {
    tx: std::sync::Arc<watch::Sender<Option<CurrentUser>>>,
}

impl SessionHolder {
    /// Create a signed-out session.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.tx.borrow().clone()
    }

    /// Whether someone is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Record a successful sign-in or sign-up.
    pub fn set_user(&self, user: CurrentUser) {
        tracing::info!(uid = %user.uid, "User signed in");
        self.tx.send_replace(Some(user));
    }

    /// Forget the current user.
    pub fn logout(&self) {
        if let Some(user) = self.tx.send_replace(None) {
            tracing::info!(uid = %user.uid, "User signed out");
        }
    }

    /// Watch for sign-in and sign-out.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.tx.subscribe()
    }
}

impl Default for SessionHolder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            uid: UserUid::new("uid-1"),
            email: Email::parse("asha@example.com").unwrap(),
        }
    }

    #[test]
    fn test_starts_signed_out() {
        let session = SessionHolder::new();
        assert!(!session.is_authenticated());
        assert_eq!(session.current_user(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionHolder::new();
        let header_view = session.clone();

        session.set_user(user());
        assert_eq!(header_view.current_user(), Some(user()));

        header_view.logout();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let session = SessionHolder::new();
        let mut rx = session.subscribe();

        session.set_user(user());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().clone(), Some(user()));

        session.logout();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }
}
