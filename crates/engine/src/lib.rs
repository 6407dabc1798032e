//! Remote gateway of the expense tracker.
//!
//! The engine owns the relational schema (users, the four reference catalogs and
//! dated expenses) and exposes one generic set of operations over it:
//! [`Engine::fetch`], [`Engine::create`], [`Engine::update`] and
//! [`Engine::soft_delete`], each parametrized by a [`Resource`] descriptor and
//! each gated by an identity check.

pub use error::EngineError;
pub use identity::{Identity, IdentityResolver, SharedIdentity};
pub use ops::{Engine, EngineBuilder};
pub use resources::{
    Catalog, CatalogFields, Categories, Category, CostCenter, CostCenters, Expense,
    ExpenseFields, Expenses, ListScope, PaymentMethod, PaymentMethods, Place, Places, Record,
    Reference, Resource,
};

mod catalogs;
mod error;
mod expenses;
mod identity;
mod ops;
mod resources;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
