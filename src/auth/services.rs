use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest},
        repo_types::User,
    },
    error::AppError,
    ownership::ensure_owner,
    state::AppState,
    store::StoreError,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates, hashes and persists a new account. No token is issued; the
/// caller logs in separately.
pub async fn register(st: &AppState, req: RegisterRequest) -> Result<PublicUser, AppError> {
    let username = req.username.trim().to_string();
    let email = normalize_email(&req.email);

    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::malformed("username, email and password are required"));
    }
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::malformed("Invalid email"));
    }

    let hash = st.hasher.hash_blocking(req.password).await?;
    let user = User::new(username, email, hash);

    match st.users.insert_user(&user).await {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            warn!(email = %user.email, "email already registered");
            return Err(AppError::Conflict("Email already registered"));
        }
        Err(e) => return Err(e.into()),
    }

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user.into())
}

/// Credential check followed by token issuance. Unknown email and wrong
/// password produce the same client-visible error.
pub async fn login(st: &AppState, req: LoginRequest) -> Result<LoginResponse, AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::malformed("email and password are required"));
    }

    let Some(user) = st.users.find_user_by_email(&email).await? else {
        // same Argon2 cost as a wrong password
        st.hasher.verify_dummy_blocking(req.password).await?;
        warn!(%email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let ok = st
        .hasher
        .verify_blocking(user.password_hash.clone(), req.password)
        .await?;
    if !ok {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = st.keys.issue(user.id).map_err(AppError::internal)?;

    info!(user_id = %user.id, "user logged in");
    Ok(LoginResponse {
        token,
        user: user.into(),
    })
}

/// Loads an account the caller is allowed to see: 404 if absent, 403 if it
/// belongs to someone else.
pub async fn load_own_account(
    st: &AppState,
    account_id: Uuid,
    user_id: Uuid,
) -> Result<User, AppError> {
    let user = st
        .users
        .find_user_by_id(account_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;
    ensure_owner(user.id, user_id)?;
    Ok(user)
}

pub async fn delete_account(st: &AppState, account_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let user = load_own_account(st, account_id, user_id).await?;
    st.users.delete_user(user.id).await?;
    info!(user_id = %user.id, "user deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn register_req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice example.com"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn register_normalizes_and_never_stores_plaintext() {
        let st = AppState::fake();
        let user = register(&st, register_req("alice", "  Alice@Example.COM ", "pw1"))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");

        let stored = st.users.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw1");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn register_requires_all_fields() {
        let st = AppState::fake();
        for req in [
            register_req("", "a@example.com", "pw"),
            register_req("a", "", "pw"),
            register_req("a", "a@example.com", ""),
            register_req("a", "not-an-email", "pw"),
        ] {
            let err = register(&st, req).await.unwrap_err();
            assert!(matches!(err, AppError::MalformedInput(_)));
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_keeps_one_row() {
        let (st, store) = AppState::fake_with_store();
        register(&st, register_req("alice", "alice@example.com", "pw1"))
            .await
            .unwrap();
        let err = register(&st, register_req("alice2", "ALICE@example.com", "pw2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_registrations_yield_one_account() {
        let (st, store) = AppState::fake_with_store();
        let mut handles = Vec::new();
        for i in 0..4 {
            let st = st.clone();
            handles.push(tokio::spawn(async move {
                register(&st, register_req(&format!("u{i}"), "race@example.com", "pw")).await
            }));
        }
        let mut ok = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert!(matches!(e, AppError::Conflict(_))),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn login_issues_token_for_right_password_only() {
        let st = AppState::fake();
        let user = register(&st, register_req("alice", "alice@example.com", "pw1"))
            .await
            .unwrap();

        let err = login(&st, login_req("alice@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        let res = login(&st, login_req("alice@example.com", "pw1")).await.unwrap();
        assert_eq!(res.user.id, user.id);
        assert_eq!(st.keys.verify(&res.token), Ok(user.id));
    }

    #[tokio::test]
    async fn unknown_email_looks_like_wrong_password() {
        let st = AppState::fake();
        register(&st, register_req("alice", "alice@example.com", "pw1"))
            .await
            .unwrap();

        let unknown = login(&st, login_req("nobody@example.com", "pw1"))
            .await
            .unwrap_err();
        let wrong = login(&st, login_req("alice@example.com", "nope"))
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.status_code(), wrong.status_code());
    }

    #[tokio::test]
    async fn unknown_email_still_pays_for_a_verify() {
        let st = AppState::fake();
        let stored = st.hasher.hash_blocking("pw1".into()).await.unwrap();

        let mut baseline = Duration::MAX;
        for _ in 0..3 {
            let started = Instant::now();
            st.hasher
                .verify_blocking(stored.clone(), "nope".into())
                .await
                .unwrap();
            baseline = baseline.min(started.elapsed());
        }

        let started = Instant::now();
        let err = login(&st, login_req("nobody@example.com", "pw1"))
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, AppError::InvalidCredentials));
        assert!(
            elapsed >= baseline / 10,
            "unknown email took {elapsed:?}, one verify takes {baseline:?}"
        );
    }

    #[tokio::test]
    async fn account_access_is_owner_only() {
        let st = AppState::fake();
        let alice = register(&st, register_req("alice", "alice@example.com", "pw1"))
            .await
            .unwrap();
        let bob = register(&st, register_req("bob", "bob@example.com", "pw2"))
            .await
            .unwrap();

        assert!(load_own_account(&st, alice.id, alice.id).await.is_ok());
        assert!(matches!(
            load_own_account(&st, alice.id, bob.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            load_own_account(&st, Uuid::new_v4(), alice.id).await,
            Err(AppError::NotFound(_))
        ));

        delete_account(&st, alice.id, alice.id).await.unwrap();
        assert!(st.users.find_user_by_id(alice.id).await.unwrap().is_none());
    }
}
