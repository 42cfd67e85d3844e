use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{IdentityProvider, MIN_PASSWORD_LEN, SessionState, UserId, hash_password, verify_password};
use crate::{
    errors::IdentityError,
    id::{generate_document_id, generate_session_token},
    records::{self, Record},
    store::{DocumentId, DocumentStore},
    validators::is_valid_email,
};

#[derive(Record, Debug, Clone, Serialize, Deserialize)]
#[record(collection = "credentials")]
#[serde(rename_all = "camelCase")]
struct Credential {
    /// Lowercased email.
    #[record(id)]
    #[serde(default)]
    email: String,
    user_id: String,
    password_hash: String,
}

#[derive(Record, Debug, Clone, Serialize, Deserialize)]
#[record(collection = "sessions")]
#[serde(rename_all = "camelCase")]
struct Session {
    #[record(id)]
    #[serde(default)]
    token: String,
    user_id: String,
    created_at: i64,
}

/// Identity provider that keeps credentials and sessions in a [`DocumentStore`].
///
/// The active session is held in process; sessions are also stored so a token can be resumed by
/// a later process.
pub struct StoreIdentity<S> {
    store: S,
    state: RwLock<SessionState>,
}

impl<S: DocumentStore> StoreIdentity<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState::NoSession),
        }
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = next;
    }

    async fn credential(&self, email: &str) -> Result<Option<Credential>, IdentityError> {
        match self.store.get(Credential::COLLECTION, email).await? {
            Some(document) => Ok(Some(records::from_document(document)?)),
            None => Ok(None),
        }
    }

    async fn open_session(&self, email: &str, password: &str) -> Result<SessionState, IdentityError> {
        let email = normalize_email(email);
        let credential = self
            .credential(&email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;
        if !verify_password(password, &credential.password_hash) {
            return Err(IdentityError::InvalidCredentials);
        }

        let session = Session {
            token: generate_session_token(),
            user_id: credential.user_id,
            created_at: Utc::now().timestamp_millis(),
        };
        self.store
            .put(
                Session::COLLECTION,
                DocumentId::key(session.token.clone()),
                records::to_fields(&session)?,
            )
            .await?;
        Ok(SessionState::Active {
            user_id: session.user_id,
            token: session.token,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl<S: DocumentStore> IdentityProvider for StoreIdentity<S> {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId, IdentityError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(IdentityError::InvalidEmail { email });
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::WeakPassword);
        }
        if self.credential(&email).await?.is_some() {
            return Err(IdentityError::EmailInUse);
        }

        let credential = Credential {
            email: email.clone(),
            user_id: generate_document_id(),
            password_hash: hash_password(password)?,
        };
        self.store
            .put(
                Credential::COLLECTION,
                DocumentId::key(email),
                records::to_fields(&credential)?,
            )
            .await?;
        debug!("registered identity {}", credential.user_id);
        Ok(credential.user_id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        self.set_state(SessionState::Authenticating);
        match self.open_session(email, password).await {
            Ok(active) => {
                info!("session opened for {}", active.user_id().unwrap_or_default());
                self.set_state(active);
                Ok(())
            }
            Err(err) => {
                self.set_state(SessionState::NoSession);
                Err(err)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let previous = self.session();
        self.set_state(SessionState::NoSession);
        if let Some(token) = previous.token() {
            self.store.delete(Session::COLLECTION, token).await?;
            info!("session closed for {}", previous.user_id().unwrap_or_default());
        }
        Ok(())
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.session().user_id().map(str::to_string)
    }

    fn session(&self) -> SessionState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn resume(&self, token: &str) -> Result<UserId, IdentityError> {
        let session: Session = match self.store.get(Session::COLLECTION, token).await? {
            Some(document) => records::from_document(document)?,
            None => {
                self.set_state(SessionState::NoSession);
                return Err(IdentityError::SessionExpired);
            }
        };
        self.set_state(SessionState::Active {
            user_id: session.user_id.clone(),
            token: session.token,
        });
        debug!("session resumed for {}", session.user_id);
        Ok(session.user_id)
    }

    async fn delete_identity(&self, user_id: &str) -> Result<(), IdentityError> {
        let credentials = self
            .store
            .query_equals(Credential::COLLECTION, "userId", user_id.into())
            .await?;
        for credential in credentials {
            self.store.delete(Credential::COLLECTION, &credential.id).await?;
        }
        let sessions = self
            .store
            .query_equals(Session::COLLECTION, "userId", user_id.into())
            .await?;
        for session in sessions {
            self.store.delete(Session::COLLECTION, &session.id).await?;
        }
        if self.current_user_id().as_deref() == Some(user_id) {
            self.set_state(SessionState::NoSession);
        }
        info!("deleted identity {user_id}");
        Ok(())
    }
}
