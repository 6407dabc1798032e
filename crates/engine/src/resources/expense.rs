use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};

use crate::{EngineError, ResultEngine, expenses};

use super::{
    Categories, CostCenters, Expense, ExpenseFields, PaymentMethods, Places, Reference, Resource,
    deactivate_owned,
};

/// Descriptor of the `expenses` resource. Listings are scoped to one date.
#[derive(Clone, Copy, Debug, Default)]
pub struct Expenses;

impl Expenses {
    fn validate(fields: &ExpenseFields) -> ResultEngine<()> {
        if fields.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_references(
        db: &DatabaseTransaction,
        user_id: &str,
        fields: &ExpenseFields,
    ) -> ResultEngine<()> {
        Categories::require_active(db, user_id, fields.category_id).await?;
        PaymentMethods::require_active(db, user_id, fields.payment_method_id).await?;
        Places::require_active(db, user_id, fields.place_id).await?;
        CostCenters::require_active(db, user_id, fields.cost_center_id).await?;
        Ok(())
    }

    /// Joins every model with the `{id, name}` of the rows it references.
    async fn expand(
        db: &DatabaseTransaction,
        user_id: &str,
        models: Vec<expenses::Model>,
    ) -> ResultEngine<Vec<Expense>> {
        let categories =
            Categories::names(db, user_id, &referenced(&models, |m| m.category_id)).await?;
        let payment_methods =
            PaymentMethods::names(db, user_id, &referenced(&models, |m| m.payment_method_id))
                .await?;
        let places = Places::names(db, user_id, &referenced(&models, |m| m.place_id)).await?;
        let cost_centers =
            CostCenters::names(db, user_id, &referenced(&models, |m| m.cost_center_id)).await?;

        Ok(models
            .into_iter()
            .map(|m| Expense {
                id: m.id,
                amount_minor: m.amount_minor,
                date: m.date,
                active: m.active,
                category: reference(&categories, m.category_id),
                payment_method: reference(&payment_methods, m.payment_method_id),
                place: reference(&places, m.place_id),
                cost_center: reference(&cost_centers, m.cost_center_id),
            })
            .collect())
    }

    async fn expand_one(
        db: &DatabaseTransaction,
        user_id: &str,
        model: expenses::Model,
    ) -> ResultEngine<Expense> {
        Self::expand(db, user_id, vec![model])
            .await?
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
    }
}

fn referenced(models: &[expenses::Model], id: impl Fn(&expenses::Model) -> i64) -> Vec<i64> {
    let mut ids: Vec<i64> = models.iter().map(id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn reference(names: &HashMap<i64, String>, id: i64) -> Option<Reference> {
    names.get(&id).map(|name| Reference {
        id,
        name: name.clone(),
    })
}

impl Resource for Expenses {
    const NAME: &'static str = "expenses";

    type Record = Expense;
    type Fields = ExpenseFields;
    type Scope = NaiveDate;

    async fn select(
        db: &DatabaseTransaction,
        user_id: &str,
        date: &NaiveDate,
    ) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(expenses::Column::Date.eq(*date))
            .filter(expenses::Column::Active.eq(true))
            .order_by_asc(expenses::Column::CreatedAt)
            .order_by_asc(expenses::Column::Id)
            .all(db)
            .await?;
        Self::expand(db, user_id, models).await
    }

    async fn insert(
        db: &DatabaseTransaction,
        user_id: &str,
        fields: ExpenseFields,
    ) -> ResultEngine<Expense> {
        Self::validate(&fields)?;
        Self::require_references(db, user_id, &fields).await?;

        let model = expenses::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id.to_string()),
            amount_minor: ActiveValue::Set(fields.amount_minor),
            date: ActiveValue::Set(fields.date),
            category_id: ActiveValue::Set(fields.category_id),
            payment_method_id: ActiveValue::Set(fields.payment_method_id),
            place_id: ActiveValue::Set(fields.place_id),
            cost_center_id: ActiveValue::Set(fields.cost_center_id),
            active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;
        Self::expand_one(db, user_id, model).await
    }

    async fn update(
        db: &DatabaseTransaction,
        user_id: &str,
        id: i64,
        fields: ExpenseFields,
    ) -> ResultEngine<Option<Expense>> {
        let Some(model) = expenses::Entity::find_by_id(id)
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(expenses::Column::Active.eq(true))
            .one(db)
            .await?
        else {
            return Ok(None);
        };
        Self::validate(&fields)?;
        Self::require_references(db, user_id, &fields).await?;

        let mut active: expenses::ActiveModel = model.into();
        active.amount_minor = ActiveValue::Set(fields.amount_minor);
        active.date = ActiveValue::Set(fields.date);
        active.category_id = ActiveValue::Set(fields.category_id);
        active.payment_method_id = ActiveValue::Set(fields.payment_method_id);
        active.place_id = ActiveValue::Set(fields.place_id);
        active.cost_center_id = ActiveValue::Set(fields.cost_center_id);
        let model = active.update(db).await?;
        Self::expand_one(db, user_id, model).await.map(Some)
    }

    async fn deactivate(
        db: &DatabaseTransaction,
        user_id: &str,
        ids: &[i64],
    ) -> ResultEngine<Vec<i64>> {
        deactivate_owned::<expenses::Entity>(
            db,
            user_id,
            ids,
            expenses::Column::Id,
            expenses::Column::UserId,
            expenses::Column::Active,
        )
        .await
    }
}
