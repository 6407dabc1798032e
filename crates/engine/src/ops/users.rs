use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{EngineError, Identity, ResultEngine, users, util::hash_password};

use super::{Engine, with_tx};

impl Engine {
    /// Checks credentials against the `users` table.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// [`EngineError::Unauthenticated`].
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Identity> {
        let username = username.trim();
        let user = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?;
        match user {
            Some(user) if user.password_hash == hash_password(username, password) => {
                tracing::info!(user = %user.username, "authenticated");
                Ok(Identity::new(user.username))
            }
            _ => {
                tracing::warn!(user = %username, "authentication failed");
                Err(EngineError::Unauthenticated)
            }
        }
    }

    /// Creates an account. Does not require a signed-in identity.
    pub async fn register_user(&self, username: &str, password: &str) -> ResultEngine<Identity> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::InvalidName(
                "username must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let exists = users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(username.to_string()));
            }

            users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password_hash: ActiveValue::Set(hash_password(username, password)),
            }
            .insert(&db_tx)
            .await?;
            Ok(Identity::new(username))
        })
    }
}
