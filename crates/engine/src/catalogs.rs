//! Tables of the four reference catalogs.
//!
//! Categories, payment methods, places and cost centers share one shape: an
//! owner, a display name with its normalized key, the `active` flag used for
//! soft deletion and the creation time that orders reads.

/// Generates the sea-orm entity module of a catalog table.
macro_rules! catalog_table {
    ($module:ident, $table:tt) => {
        pub mod $module {
            use sea_orm::entity::prelude::*;

            #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
            #[sea_orm(table_name = $table)]
            pub struct Model {
                #[sea_orm(primary_key)]
                pub id: i64,
                pub user_id: String,
                pub name: String,
                pub name_norm: String,
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
            }

            impl Related<crate::users::Entity> for Entity {
                fn to() -> RelationDef {
                    Relation::User.def()
                }
            }

            impl ActiveModelBehavior for ActiveModel {}
        }
    };
}

catalog_table!(categories, "categories");
catalog_table!(payment_methods, "payment_methods");
catalog_table!(places, "places");
catalog_table!(cost_centers, "cost_centers");
