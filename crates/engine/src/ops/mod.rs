use std::{fmt, sync::Arc};

use sea_orm::DatabaseConnection;

use crate::{EngineError, Identity, IdentityResolver, ResultEngine, SharedIdentity};

mod gateway;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Gateway to the backing store.
///
/// Every operation resolves the calling identity first and fails with
/// [`EngineError::Unauthenticated`] without touching the database when there is
/// none.
pub struct Engine {
    database: DatabaseConnection,
    identity: Arc<dyn IdentityResolver>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("identity", &self.identity.current_identity())
            .finish()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.identity.current_identity()
    }

    fn require_identity(&self, resource: &str, operation: &str) -> ResultEngine<Identity> {
        self.identity.current_identity().ok_or_else(|| {
            tracing::warn!(resource, operation, "rejected call without identity");
            EngineError::Unauthenticated
        })
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    identity: Option<Arc<dyn IdentityResolver>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the identity resolver. Without one, nobody is ever signed in.
    pub fn identity(mut self, resolver: impl IdentityResolver + 'static) -> EngineBuilder {
        self.identity = Some(Arc::new(resolver));
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            identity: self
                .identity
                .unwrap_or_else(|| Arc::new(SharedIdentity::new())),
        })
    }
}
