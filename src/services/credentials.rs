use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::sqlite::SqlitePool;

use crate::{
    error::AppError,
    models::user::{CreateUser, User},
};

const USER_COLUMNS: &str = "id, username, email, password_hash, is_active, is_staff, created_at";

/// User records and password verification. Plaintext passwords never leave
/// this type.
#[derive(Clone)]
pub struct CredentialStore {
    db: SqlitePool,
}

impl CredentialStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Creates a user with a freshly salted argon2 hash. A username or email
    /// that already exists fails with [`AppError::DuplicateIdentity`] through
    /// the table's unique constraints.
    pub async fn register(&self, new_user: CreateUser) -> Result<User, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(new_user.password.as_bytes(), &salt)?
            .to_string();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Returns the user only when `email` exists and `password` matches.
    /// Unknown email and wrong password both yield `None`.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        let Some(user) = self.find_by("email", email).await? else {
            return Ok(None);
        };

        let parsed_hash = PasswordHash::new(&user.password_hash)?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Ok(None);
        }

        Ok(Some(user))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.find_by("username", username).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by(&self, column: &'static str, value: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {column} = ?"
        ))
        .bind(value)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn store() -> CredentialStore {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        CredentialStore::new(pool)
    }

    fn alice() -> CreateUser {
        CreateUser {
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "secret".into(),
        }
    }

    #[tokio::test]
    async fn register_then_verify() {
        let store = store().await;
        let user = store.register(alice()).await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert_ne!(user.password_hash, "secret");
        assert!(user.password_hash.starts_with("$argon2"));

        let verified = store.verify("a@x.com", "secret").await.unwrap().unwrap();
        assert_eq!(verified.id, user.id);
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let store = store().await;
        let first = store.register(alice()).await.unwrap();
        let second = store
            .register(CreateUser {
                username: "bob".into(),
                email: "b@x.com".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();
        assert_ne!(first.password_hash, second.password_hash);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let store = store().await;
        store.register(alice()).await.unwrap();

        assert!(store.verify("a@x.com", "wrong").await.unwrap().is_none());
        assert!(store.verify("nobody@x.com", "secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() {
        let store = store().await;
        store.register(alice()).await.unwrap();

        let same_email = CreateUser {
            username: "alice2".into(),
            ..alice()
        };
        assert!(matches!(
            store.register(same_email).await,
            Err(AppError::DuplicateIdentity)
        ));

        let same_username = CreateUser {
            email: "other@x.com".into(),
            ..alice()
        };
        assert!(matches!(
            store.register(same_username).await,
            Err(AppError::DuplicateIdentity)
        ));
    }

    #[tokio::test]
    async fn concurrent_duplicate_signup_has_one_winner() {
        let store = store().await;
        let (a, b) = tokio::join!(store.register(alice()), store.register(alice()));

        let results = [a, b];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::DuplicateIdentity)))
            .count();
        assert_eq!((ok, dup), (1, 1));
    }

    #[tokio::test]
    async fn lookups() {
        let store = store().await;
        let user = store.register(alice()).await.unwrap();

        let by_name = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");
        assert!(store.find_by_id(user.id + 1).await.unwrap().is_none());
    }
}
