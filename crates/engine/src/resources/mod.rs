//! Resource descriptors.
//!
//! A [`Resource`] describes one entity type of the backing store: the record it
//! reads back, the fields it writes, the scope filters of a listing and how each
//! of those maps onto its table. [`crate::Engine`] runs the four gateway
//! operations generically over any descriptor, after resolving the caller.

use std::fmt::Debug;

use chrono::NaiveDate;
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, prelude::*, sea_query::Expr,
};
use serde::Serialize;

use crate::ResultEngine;

mod catalog;
mod expense;

pub use catalog::{Categories, CostCenters, PaymentMethods, Places};
pub use expense::Expenses;

/// A value object read from the store. Ids are unique within one resource.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    fn id(&self) -> i64;
}

/// Filter of a listing, also applied to records read back from writes.
pub trait ListScope<T>: Clone + Debug + Send + Sync + 'static {
    /// Whether `record` belongs to a listing made under this scope.
    fn contains(&self, record: &T) -> bool;
}

impl<T> ListScope<T> for () {
    fn contains(&self, _record: &T) -> bool {
        true
    }
}

/// Describes one entity type and its table.
///
/// The table operations receive the already resolved `user_id` and run inside
/// the transaction opened by the engine. Call them through [`crate::Engine`],
/// which performs the identity check first.
pub trait Resource: Send + Sync + 'static {
    /// Remote resource name, used for logs and mutation keys.
    const NAME: &'static str;

    type Record: Record;
    type Fields: Clone + Debug + Send + Sync + 'static;
    type Scope: ListScope<Self::Record>;

    /// Active rows owned by `user_id` within `scope`, oldest first, with
    /// references expanded.
    fn select(
        db: &DatabaseTransaction,
        user_id: &str,
        scope: &Self::Scope,
    ) -> impl Future<Output = ResultEngine<Vec<Self::Record>>> + Send;

    fn insert(
        db: &DatabaseTransaction,
        user_id: &str,
        fields: Self::Fields,
    ) -> impl Future<Output = ResultEngine<Self::Record>> + Send;

    /// Replaces the fields of an active row owned by `user_id`. Returns `None`
    /// when no such row exists.
    fn update(
        db: &DatabaseTransaction,
        user_id: &str,
        id: i64,
        fields: Self::Fields,
    ) -> impl Future<Output = ResultEngine<Option<Self::Record>>> + Send;

    /// Flips `active` to false for the requested ids that are active and owned
    /// by `user_id`. Returns the ids actually affected.
    fn deactivate(
        db: &DatabaseTransaction,
        user_id: &str,
        ids: &[i64],
    ) -> impl Future<Output = ResultEngine<Vec<i64>>> + Send;
}

/// Soft deletes the rows of `E` among `ids` that are active and owned by
/// `user_id`, returning their ids in ascending order.
pub(crate) async fn deactivate_owned<E: EntityTrait>(
    db: &DatabaseTransaction,
    user_id: &str,
    ids: &[i64],
    id: E::Column,
    owner: E::Column,
    active: E::Column,
) -> ResultEngine<Vec<i64>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let affected: Vec<i64> = E::find()
        .select_only()
        .column(id)
        .filter(id.is_in(ids.iter().copied()))
        .filter(owner.eq(user_id))
        .filter(active.eq(true))
        .order_by_asc(id)
        .into_tuple()
        .all(db)
        .await?;
    if affected.is_empty() {
        return Ok(affected);
    }

    E::update_many()
        .col_expr(active, Expr::value(false))
        .filter(id.is_in(affected.iter().copied()))
        .exec(db)
        .await?;
    Ok(affected)
}

/// A row of one of the four reference catalogs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

pub type Category = Catalog;
pub type PaymentMethod = Catalog;
pub type Place = Catalog;
pub type CostCenter = Catalog;

impl Record for Catalog {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogFields {
    pub name: String,
}

impl CatalogFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A catalog row as seen from an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub id: i64,
    pub name: String,
}

/// An expense with its catalog references expanded.
///
/// A reference is `None` when the referenced row is missing from the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Expense {
    pub id: i64,
    pub amount_minor: i64,
    pub date: NaiveDate,
    pub active: bool,
    pub category: Option<Reference>,
    pub payment_method: Option<Reference>,
    pub place: Option<Reference>,
    pub cost_center: Option<Reference>,
}

impl Record for Expense {
    fn id(&self) -> i64 {
        self.id
    }
}

impl ListScope<Expense> for NaiveDate {
    fn contains(&self, record: &Expense) -> bool {
        record.date == *self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpenseFields {
    /// Amount in minor units (cents). Must be > 0.
    pub amount_minor: i64,
    pub date: NaiveDate,
    pub category_id: i64,
    pub payment_method_id: i64,
    pub place_id: i64,
    pub cost_center_id: i64,
}
