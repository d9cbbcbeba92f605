//! User Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{User, UserCreate, UserProfileUpdate};
use crate::utils::time::now_millis;
use shared::client::SubscriptionInfo;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by login identifier (email or phone)
    pub async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $ident OR phone = $ident LIMIT 1")
            .bind(("ident", identifier.trim().to_lowercase()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.trim().to_lowercase()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by phone
    pub async fn find_by_phone(&self, phone: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE phone = $phone LIMIT 1")
            .bind(("phone", phone.trim().to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user account
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        // Check duplicate email / phone
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }
        if self.find_by_phone(&data.phone).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Phone '{}' is already registered",
                data.phone
            )));
        }

        let now = now_millis();
        let user = User {
            id: None,
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email.trim().to_lowercase(),
            phone: data.phone.trim().to_string(),
            avatar_url: None,
            password_hash: data.password_hash,
            is_verified: data.is_verified,
            verification_token: data.verification_token,
            subscription: SubscriptionInfo::default(),
            reservations: vec![],
            created_at: now,
            updated_at: now,
        };

        let created: Option<User> = self.base.db().create(TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Mark the account holding this verification token as verified
    pub async fn verify_by_token(&self, token: &str) -> RepoResult<Option<User>> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE user SET is_verified = true, verification_token = NONE, updated_at = $now \
                 WHERE verification_token = $vtoken RETURN AFTER",
            )
            .bind(("vtoken", token.to_string()))
            .bind(("now", now))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Update profile fields
    pub async fn update_profile(&self, id: &str, data: UserProfileUpdate) -> RepoResult<User> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;

        if let Some(phone) = &data.phone
            && let Some(existing) = self.find_by_phone(phone).await?
            && existing.id.as_ref() != Some(&thing)
        {
            return Err(RepoError::Duplicate(format!(
                "Phone '{}' is already registered",
                phone
            )));
        }

        let mut merge = serde_json::to_value(&data)
            .map_err(|e| RepoError::Database(e.to_string()))?;
        if let serde_json::Value::Object(map) = &mut merge {
            map.insert("updated_at".into(), serde_json::json!(now_millis()));
        }

        let updated: Option<User> = self.base.db().update(thing).merge(merge).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User not found: {}", id)))
    }

    /// Replace the subscription sub-record
    pub async fn set_subscription(
        &self,
        id: &str,
        subscription: SubscriptionInfo,
    ) -> RepoResult<User> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET subscription = $sub, updated_at = $now RETURN AFTER")
            .bind(("id", thing))
            .bind(("sub", subscription))
            .bind(("now", now_millis()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User not found: {}", id)))
    }

    /// Append a reservation back-reference to the user record
    pub async fn push_reservation(
        &self,
        user: &RecordId,
        reservation: &RecordId,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $user SET reservations += $res, updated_at = $now")
            .bind(("user", user.clone()))
            .bind(("res", reservation.clone()))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }
}
