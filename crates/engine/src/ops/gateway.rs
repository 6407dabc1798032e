use sea_orm::TransactionTrait;

use crate::{Resource, ResultEngine};

use super::{Engine, with_tx};

impl Engine {
    /// Lists the active rows of `R` owned by the caller, oldest first.
    pub async fn fetch<R: Resource>(&self, scope: &R::Scope) -> ResultEngine<Vec<R::Record>> {
        let identity = self.require_identity(R::NAME, "fetch")?;
        tracing::debug!(resource = R::NAME, user = %identity.username, ?scope, "fetch");
        with_tx!(self, |db_tx| {
            R::select(&db_tx, &identity.username, scope).await
        })
    }

    /// Inserts a new row of `R` owned by the caller and returns it expanded.
    pub async fn create<R: Resource>(&self, fields: R::Fields) -> ResultEngine<R::Record> {
        let identity = self.require_identity(R::NAME, "create")?;
        tracing::debug!(resource = R::NAME, user = %identity.username, "create");
        with_tx!(self, |db_tx| {
            R::insert(&db_tx, &identity.username, fields).await
        })
    }

    /// Replaces the fields of row `id`. Returns `None` when the row does not
    /// exist, is inactive or belongs to someone else.
    pub async fn update<R: Resource>(
        &self,
        id: i64,
        fields: R::Fields,
    ) -> ResultEngine<Option<R::Record>> {
        let identity = self.require_identity(R::NAME, "update")?;
        tracing::debug!(resource = R::NAME, user = %identity.username, id, "update");
        with_tx!(self, |db_tx| {
            R::update(&db_tx, &identity.username, id, fields).await
        })
    }

    /// Soft deletes the requested rows and returns the ids actually affected.
    ///
    /// Rows are never removed: `active` is set to false, so they disappear from
    /// later reads. Ids that are unknown, already inactive or owned by someone
    /// else are skipped.
    pub async fn soft_delete<R: Resource>(&self, ids: &[i64]) -> ResultEngine<Vec<i64>> {
        let identity = self.require_identity(R::NAME, "soft_delete")?;
        tracing::debug!(resource = R::NAME, user = %identity.username, ?ids, "soft_delete");
        with_tx!(self, |db_tx| {
            R::deactivate(&db_tx, &identity.username, ids).await
        })
    }
}
