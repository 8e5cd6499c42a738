//! Session authority: one live session per account.
//!
//! Login mints a fresh session token and writes it to the account registry,
//! preempting whatever token was authoritative before. Validity checks
//! re-read the registry immediately before comparing, so a session learns it
//! was preempted at its next check, never sooner. Logout is local-only: it
//! destroys the current-session record without touching the registry token.

use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::db::{Collection, RecordStore, CURRENT_SESSION_KEY};
use crate::errors::AppError;
use crate::models::{
    Account, Session, SessionStatus, SessionUser, SignupRequest, UpdateProfileRequest, UserRole,
};

/// Fixed staff accounts seeded into an empty registry, mirroring the
/// management portal's built-in credentials.
const OFFICIAL_ACCOUNTS: &[(&str, &str, &str, UserRole)] = &[
    ("admin@pmc", "admin123", "Senior Administrator", UserRole::Admin),
    ("editor@pmc", "editor123", "Regional Editor", UserRole::Editor),
    ("viewer@pmc", "viewer123", "Public Auditor", UserRole::Viewer),
];

/// Owns the session lifecycle rules against the account registry and the
/// singleton current-session record.
#[derive(Clone)]
pub struct SessionAuthority {
    store: RecordStore,
}

impl SessionAuthority {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Authenticate against the registry and establish a new session.
    ///
    /// The freshly minted token overwrites the account's authoritative
    /// token; any other browser holding the previous one is now stale and
    /// will learn so at its next check.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let email = normalize_email(email);
        let account: Account = self
            .store
            .get(Collection::Accounts, &email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !credential_matches(&account.password, password) {
            return Err(AppError::InvalidCredentials);
        }

        self.establish(account).await
    }

    /// Register a citizen account (or re-register an existing email,
    /// preserving unknown registry fields) and establish its first session.
    ///
    /// Email verification dispatch is a presentation concern; this is the
    /// registry half of the signup flow.
    pub async fn signup(&self, request: SignupRequest) -> Result<Session, AppError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation("A valid email is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(AppError::Validation("A password is required".to_string()));
        }

        let fallback_name = || email.split('@').next().unwrap_or_default().to_string();
        let name = request
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(fallback_name);

        let existing: Option<Account> = self.store.get(Collection::Accounts, &email).await?;
        let account = match existing {
            Some(mut account) => {
                account.name = name;
                account.password = request.password;
                account.verified = Some(true);
                account
            }
            None => Account {
                id: Some(Uuid::new_v4().to_string()),
                email: email.clone(),
                name,
                password: request.password,
                role: UserRole::Public,
                active_session_id: None,
                avatar: None,
                verified: Some(true),
                created_at: Some(chrono::Utc::now().to_rfc3339()),
                extra: serde_json::Map::new(),
            },
        };

        self.establish(account).await
    }

    /// Re-read the registry and judge the presented session. Never mutates.
    pub async fn check(&self, session: &Session) -> Result<SessionStatus, AppError> {
        self.check_token(&session.user.email, &session.user.session_id)
            .await
    }

    /// Judge a bare email/token pair, e.g. a session copy a browser held
    /// onto. The registry read happens immediately before the comparison.
    pub async fn check_token(
        &self,
        email: &str,
        session_id: &str,
    ) -> Result<SessionStatus, AppError> {
        let email = normalize_email(email);
        let account: Option<Account> = self.store.get(Collection::Accounts, &email).await?;

        Ok(match account {
            None => SessionStatus::NotFound,
            Some(account) => {
                if account.active_session_id.as_deref() == Some(session_id) {
                    SessionStatus::Valid
                } else {
                    SessionStatus::Preempted
                }
            }
        })
    }

    /// Destroy the local current-session record. The registry token is left
    /// as-is: logout on this browser says nothing about sessions elsewhere.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.store.delete(Collection::Session, CURRENT_SESSION_KEY).await?;
        Ok(())
    }

    /// Read back the persisted current-session record, if any. Callers must
    /// `check` the result before trusting it.
    pub async fn restore(&self) -> Result<Option<Session>, AppError> {
        self.store.get(Collection::Session, CURRENT_SESSION_KEY).await
    }

    /// Restore and validate the current session in one step, tearing the
    /// local record down on a stale verdict. This is what protected routes
    /// run on every request.
    pub async fn current(&self) -> Result<Session, AppError> {
        let session = self
            .restore()
            .await?
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        match self.check(&session).await? {
            SessionStatus::Valid => Ok(session),
            SessionStatus::Preempted => {
                self.logout().await?;
                Err(AppError::SessionPreempted)
            }
            SessionStatus::NotFound => {
                self.logout().await?;
                Err(AppError::SessionNotFound)
            }
        }
    }

    /// Refresh the session's user snapshot and merge the change into the
    /// registry entry. Requires a currently valid session.
    pub async fn update_profile(
        &self,
        request: UpdateProfileRequest,
    ) -> Result<Session, AppError> {
        let mut session = self.current().await?;

        if let Some(name) = request.name.filter(|n| !n.trim().is_empty()) {
            session.user.name = name;
        }
        if let Some(avatar) = request.avatar {
            session.user.avatar = Some(avatar);
        }

        let email = normalize_email(&session.user.email);
        if let Some(mut account) = self
            .store
            .get::<Account>(Collection::Accounts, &email)
            .await?
        {
            account.name = session.user.name.clone();
            account.avatar = session.user.avatar.clone();
            self.store.put(Collection::Accounts, &email, &account).await?;
        }

        self.store
            .put(Collection::Session, CURRENT_SESSION_KEY, &session)
            .await?;
        Ok(session)
    }

    /// Mint a token, write it as the account's authoritative session id,
    /// persist the denormalized session snapshot, and return it.
    async fn establish(&self, mut account: Account) -> Result<Session, AppError> {
        let token = Uuid::new_v4().to_string();
        account.active_session_id = Some(token.clone());
        self.store
            .put(Collection::Accounts, &account.email, &account)
            .await?;

        let session = Session {
            user: SessionUser {
                id: account.id.clone().unwrap_or_else(|| account.email.clone()),
                name: account.name.clone(),
                email: account.email.clone(),
                role: account.role,
                avatar: account.avatar.clone(),
                session_id: token,
            },
        };

        self.store
            .put(Collection::Session, CURRENT_SESSION_KEY, &session)
            .await?;

        tracing::info!(email = %account.email, "Session established");
        Ok(session)
    }
}

/// Seed the fixed management accounts into an empty registry.
pub async fn seed_official_accounts(store: &RecordStore) -> Result<(), AppError> {
    for (email, password, name, role) in OFFICIAL_ACCOUNTS {
        let existing: Option<Account> = store.get(Collection::Accounts, email).await?;
        if existing.is_some() {
            continue;
        }

        let account = Account {
            id: Some(format!("official-{}-01", format!("{:?}", role).to_lowercase())),
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
            role: *role,
            active_session_id: None,
            avatar: None,
            verified: Some(true),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            extra: serde_json::Map::new(),
        };
        store.put(Collection::Accounts, email, &account).await?;
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Plaintext equality over the stored credential, compared in constant
/// time. Hashing is a known gap of the system this backend replaces.
fn credential_matches(stored: &str, provided: &str) -> bool {
    stored.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::SignupRequest;
    use tempfile::TempDir;

    async fn authority() -> (SessionAuthority, RecordStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        let store = RecordStore::new(pool);
        (SessionAuthority::new(store.clone()), store, temp_dir)
    }

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            name: Some("Kumar Swamy".to_string()),
            email: email.to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_single_session_invariant() {
        let (authority, _store, _dir) = authority().await;

        let first = authority.signup(signup_request("a@gmail.com")).await.unwrap();
        let second = authority.login("a@gmail.com", "secret").await.unwrap();
        let third = authority.login("a@gmail.com", "secret").await.unwrap();

        // Only the latest login's token is authoritative
        assert_eq!(
            authority.check(&first).await.unwrap(),
            SessionStatus::Preempted
        );
        assert_eq!(
            authority.check(&second).await.unwrap(),
            SessionStatus::Preempted
        );
        assert_eq!(authority.check(&third).await.unwrap(), SessionStatus::Valid);
    }

    #[tokio::test]
    async fn test_login_failures_leave_no_state() {
        let (authority, _store, _dir) = authority().await;

        let err = authority.login("ghost@gmail.com", "x").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        authority.signup(signup_request("b@gmail.com")).await.unwrap();
        let err = authority.login("b@gmail.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_case_insensitive_lookup() {
        let (authority, store, _dir) = authority().await;

        authority
            .signup(signup_request("User@Gmail.com"))
            .await
            .unwrap();

        // Registry entry lands at the lowercase key
        let account: Option<Account> = store
            .get(Collection::Accounts, "user@gmail.com")
            .await
            .unwrap();
        assert!(account.is_some());

        let session = authority.login("USER@gmail.com", "secret").await.unwrap();
        assert_eq!(session.user.email, "user@gmail.com");
        assert_eq!(
            authority.check(&session).await.unwrap(),
            SessionStatus::Valid
        );
    }

    #[tokio::test]
    async fn test_logout_is_local_only() {
        let (authority, store, _dir) = authority().await;

        let session = authority.signup(signup_request("c@gmail.com")).await.unwrap();
        authority.logout().await.unwrap();

        // Local record gone
        assert!(authority.restore().await.unwrap().is_none());

        // Registry token untouched: the session value still checks Valid
        let account: Account = store
            .get(Collection::Accounts, "c@gmail.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            account.active_session_id.as_deref(),
            Some(session.user.session_id.as_str())
        );
        assert_eq!(
            authority.check(&session).await.unwrap(),
            SessionStatus::Valid
        );
    }

    #[tokio::test]
    async fn test_check_reports_vanished_account() {
        let (authority, store, _dir) = authority().await;

        let session = authority.signup(signup_request("d@gmail.com")).await.unwrap();
        store.delete(Collection::Accounts, "d@gmail.com").await.unwrap();

        assert_eq!(
            authority.check(&session).await.unwrap(),
            SessionStatus::NotFound
        );
    }

    #[tokio::test]
    async fn test_current_tears_down_stale_session() {
        let (authority, store, _dir) = authority().await;

        authority.signup(signup_request("e@gmail.com")).await.unwrap();
        // A login from "another browser" preempts the earlier token. The
        // singleton now holds the newest session, so plant a stale copy to
        // simulate the preempted browser's local state.
        let newest = authority.login("e@gmail.com", "secret").await.unwrap();
        let stale = Session {
            user: SessionUser {
                session_id: "stale-token".to_string(),
                ..newest.user.clone()
            },
        };
        store
            .put(Collection::Session, CURRENT_SESSION_KEY, &stale)
            .await
            .unwrap();

        let err = authority.current().await.unwrap_err();
        assert!(matches!(err, AppError::SessionPreempted));
        // Blocking teardown: the local record was destroyed
        assert!(authority.restore().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_signup_preserves_unknown_registry_fields() {
        let (authority, store, _dir) = authority().await;

        authority.signup(signup_request("f@gmail.com")).await.unwrap();

        // Another writer decorates the registry entry
        let mut account: Account = store
            .get(Collection::Accounts, "f@gmail.com")
            .await
            .unwrap()
            .unwrap();
        account.extra.insert(
            "wardPreference".to_string(),
            serde_json::Value::String("Darbe".to_string()),
        );
        store
            .put(Collection::Accounts, "f@gmail.com", &account)
            .await
            .unwrap();

        // Re-registering merges rather than replaces
        authority
            .signup(SignupRequest {
                name: Some("Renamed".to_string()),
                email: "f@gmail.com".to_string(),
                password: "rotated".to_string(),
            })
            .await
            .unwrap();

        let merged: Account = store
            .get(Collection::Accounts, "f@gmail.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(merged.name, "Renamed");
        assert_eq!(merged.password, "rotated");
        assert_eq!(
            merged.extra.get("wardPreference"),
            Some(&serde_json::Value::String("Darbe".to_string()))
        );
    }

    #[tokio::test]
    async fn test_seed_official_accounts_is_idempotent() {
        let (authority, store, _dir) = authority().await;

        seed_official_accounts(&store).await.unwrap();
        let session = authority.login("admin@pmc", "admin123").await.unwrap();
        assert_eq!(session.user.role, UserRole::Admin);
        assert!(session.user.role.is_management());

        // Re-seeding must not clobber the live token
        seed_official_accounts(&store).await.unwrap();
        assert_eq!(
            authority.check(&session).await.unwrap(),
            SessionStatus::Valid
        );
    }
}
