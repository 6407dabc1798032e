use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, ResultEngine,
    catalogs::{categories, cost_centers, payment_methods, places},
    util::{normalize_name_key, normalize_required_name},
};

use super::{Catalog, CatalogFields, Resource, deactivate_owned};

/// Generates the descriptor of a catalog resource together with the lookups
/// expenses need against that catalog.
macro_rules! impl_catalog_resource {
    ($marker:ident, $module:ident, $name:literal, $label:literal) => {
        #[doc = concat!("Descriptor of the `", $name, "` catalog.")]
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $marker;

        impl From<$module::Model> for Catalog {
            fn from(model: $module::Model) -> Self {
                Self {
                    id: model.id,
                    name: model.name,
                    active: model.active,
                }
            }
        }

        impl $marker {
            /// Fails unless `id` is an active row owned by `user_id`.
            pub(crate) async fn require_active(
                db: &DatabaseTransaction,
                user_id: &str,
                id: i64,
            ) -> ResultEngine<()> {
                let exists = $module::Entity::find_by_id(id)
                    .filter($module::Column::UserId.eq(user_id))
                    .filter($module::Column::Active.eq(true))
                    .one(db)
                    .await?
                    .is_some();
                if !exists {
                    return Err(EngineError::KeyNotFound(
                        concat!($label, " not exists").to_string(),
                    ));
                }
                Ok(())
            }

            /// Names of the given rows owned by `user_id`, inactive ones
            /// included.
            pub(crate) async fn names(
                db: &DatabaseTransaction,
                user_id: &str,
                ids: &[i64],
            ) -> ResultEngine<HashMap<i64, String>> {
                if ids.is_empty() {
                    return Ok(HashMap::new());
                }
                let models = $module::Entity::find()
                    .filter($module::Column::UserId.eq(user_id))
                    .filter($module::Column::Id.is_in(ids.iter().copied()))
                    .all(db)
                    .await?;
                Ok(models.into_iter().map(|m| (m.id, m.name)).collect())
            }

            async fn ensure_unique_name(
                db: &DatabaseTransaction,
                user_id: &str,
                display: &str,
                name_norm: &str,
                except: Option<i64>,
            ) -> ResultEngine<()> {
                let mut query = $module::Entity::find()
                    .filter($module::Column::UserId.eq(user_id))
                    .filter($module::Column::Active.eq(true))
                    .filter($module::Column::NameNorm.eq(name_norm));
                if let Some(id) = except {
                    query = query.filter($module::Column::Id.ne(id));
                }
                if query.one(db).await?.is_some() {
                    return Err(EngineError::ExistingKey(display.to_string()));
                }
                Ok(())
            }
        }

        impl Resource for $marker {
            const NAME: &'static str = $name;

            type Record = Catalog;
            type Fields = CatalogFields;
            type Scope = ();

            async fn select(
                db: &DatabaseTransaction,
                user_id: &str,
                _scope: &(),
            ) -> ResultEngine<Vec<Catalog>> {
                let models = $module::Entity::find()
                    .filter($module::Column::UserId.eq(user_id))
                    .filter($module::Column::Active.eq(true))
                    .order_by_asc($module::Column::CreatedAt)
                    .order_by_asc($module::Column::Id)
                    .all(db)
                    .await?;
                Ok(models.into_iter().map(Catalog::from).collect())
            }

            async fn insert(
                db: &DatabaseTransaction,
                user_id: &str,
                fields: CatalogFields,
            ) -> ResultEngine<Catalog> {
                let name = normalize_required_name(&fields.name, $label)?;
                let name_norm = normalize_name_key(&name, $label)?;
                Self::ensure_unique_name(db, user_id, &name, &name_norm, None).await?;

                let model = $module::ActiveModel {
                    id: ActiveValue::NotSet,
                    user_id: ActiveValue::Set(user_id.to_string()),
                    name: ActiveValue::Set(name),
                    name_norm: ActiveValue::Set(name_norm),
                    active: ActiveValue::Set(true),
                    created_at: ActiveValue::Set(Utc::now()),
                }
                .insert(db)
                .await?;
                Ok(model.into())
            }

            async fn update(
                db: &DatabaseTransaction,
                user_id: &str,
                id: i64,
                fields: CatalogFields,
            ) -> ResultEngine<Option<Catalog>> {
                let Some(model) = $module::Entity::find_by_id(id)
                    .filter($module::Column::UserId.eq(user_id))
                    .filter($module::Column::Active.eq(true))
                    .one(db)
                    .await?
                else {
                    return Ok(None);
                };
                let name = normalize_required_name(&fields.name, $label)?;
                let name_norm = normalize_name_key(&name, $label)?;
                Self::ensure_unique_name(db, user_id, &name, &name_norm, Some(id)).await?;

                let mut active: $module::ActiveModel = model.into();
                active.name = ActiveValue::Set(name);
                active.name_norm = ActiveValue::Set(name_norm);
                let model = active.update(db).await?;
                Ok(Some(model.into()))
            }

            async fn deactivate(
                db: &DatabaseTransaction,
                user_id: &str,
                ids: &[i64],
            ) -> ResultEngine<Vec<i64>> {
                deactivate_owned::<$module::Entity>(
                    db,
                    user_id,
                    ids,
                    $module::Column::Id,
                    $module::Column::UserId,
                    $module::Column::Active,
                )
                .await
            }
        }
    };
}

impl_catalog_resource!(Categories, categories, "categories", "category");
impl_catalog_resource!(
    PaymentMethods,
    payment_methods,
    "payment_methods",
    "payment method"
);
impl_catalog_resource!(Places, places, "places", "place");
impl_catalog_resource!(CostCenters, cost_centers, "cost_centers", "cost center");
