//! Dated expense records.
//!
//! An expense references one row of each catalog by id. Reads expand those
//! references into `{id, name}` pairs, see [`crate::resources::Expense`].

use sea_orm::entity::prelude::*;

use crate::catalogs::{categories, cost_centers, payment_methods, places};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub amount_minor: i64,
    pub date: Date,
    pub category_id: i64,
    pub payment_method_id: i64,
    pub place_id: i64,
    pub cost_center_id: i64,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::users::Entity",
        from = "Column::UserId",
        to = "crate::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "categories::Entity",
        from = "Column::CategoryId",
        to = "categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
    #[sea_orm(
        belongs_to = "payment_methods::Entity",
        from = "Column::PaymentMethodId",
        to = "payment_methods::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    PaymentMethod,
    #[sea_orm(
        belongs_to = "places::Entity",
        from = "Column::PlaceId",
        to = "places::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Place,
    #[sea_orm(
        belongs_to = "cost_centers::Entity",
        from = "Column::CostCenterId",
        to = "cost_centers::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    CostCenter,
}

impl Related<crate::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<payment_methods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentMethod.def()
    }
}

impl Related<places::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Place.def()
    }
}

impl Related<cost_centers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CostCenter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
