use std::io::Write;

use chrono::NaiveDate;
use engine::{CatalogFields, ExpenseFields, Resource};
use gastos_sync::{Callbacks, Collection, Mutation, PressKind, Session};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    cli::{CatalogKind, Command, DeleteArgs, ExpenseArgs, ResourceKind},
    error::{AppError, Result},
};

/// Runs one command against an open session and prints its result.
pub async fn run(session: &Session, command: Command) -> Result<()> {
    match command {
        Command::User(_) => Err(AppError::Usage(
            "user commands do not need a session".to_string(),
        )),
        Command::List(args) => match args.resource {
            ResourceKind::Categories => list(session.categories(), ()).await,
            ResourceKind::PaymentMethods => list(session.payment_methods(), ()).await,
            ResourceKind::Places => list(session.places(), ()).await,
            ResourceKind::CostCenters => list(session.cost_centers(), ()).await,
            ResourceKind::Expenses => list(session.expenses(), require_date(args.date)?).await,
        },
        Command::AddCatalog(args) => {
            let fields = CatalogFields::new(args.name);
            match args.resource {
                CatalogKind::Categories => add(session.categories(), fields).await,
                CatalogKind::PaymentMethods => add(session.payment_methods(), fields).await,
                CatalogKind::Places => add(session.places(), fields).await,
                CatalogKind::CostCenters => add(session.cost_centers(), fields).await,
            }
        }
        Command::Rename(args) => {
            let fields = CatalogFields::new(args.name);
            match args.resource {
                CatalogKind::Categories => update(session.categories(), args.id, fields).await,
                CatalogKind::PaymentMethods => {
                    update(session.payment_methods(), args.id, fields).await
                }
                CatalogKind::Places => update(session.places(), args.id, fields).await,
                CatalogKind::CostCenters => update(session.cost_centers(), args.id, fields).await,
            }
        }
        Command::AddExpense(args) => add(session.expenses(), expense_fields(args)).await,
        Command::UpdateExpense(args) => {
            update(session.expenses(), args.id, expense_fields(args.expense)).await
        }
        Command::Delete(args) => delete_command(session, args).await,
    }
}

async fn delete_command(session: &Session, args: DeleteArgs) -> Result<()> {
    match args.resource {
        ResourceKind::Categories => delete(session.categories(), (), &args.ids).await,
        ResourceKind::PaymentMethods => delete(session.payment_methods(), (), &args.ids).await,
        ResourceKind::Places => delete(session.places(), (), &args.ids).await,
        ResourceKind::CostCenters => delete(session.cost_centers(), (), &args.ids).await,
        ResourceKind::Expenses => {
            let date = require_date(args.date)?;
            delete(session.expenses(), date, &args.ids).await
        }
    }
}

fn expense_fields(args: ExpenseArgs) -> ExpenseFields {
    ExpenseFields {
        amount_minor: args.amount_minor,
        date: args.date,
        category_id: args.category,
        payment_method_id: args.payment_method,
        place_id: args.place,
        cost_center_id: args.cost_center,
    }
}

fn require_date(date: Option<NaiveDate>) -> Result<NaiveDate> {
    date.ok_or_else(|| AppError::Usage("--date is required for expenses".to_string()))
}

async fn list<R>(collection: &Collection<R>, scope: R::Scope) -> Result<()>
where
    R: Resource,
    R::Record: Serialize,
{
    let records = settle(|callbacks| collection.list(scope, callbacks)).await?;
    print_json(&records)
}

async fn add<R>(collection: &Collection<R>, fields: R::Fields) -> Result<()>
where
    R: Resource,
    R::Record: Serialize,
{
    let record = settle(|callbacks| collection.add(fields, callbacks)).await?;
    print_json(&record)
}

async fn update<R>(collection: &Collection<R>, id: i64, fields: R::Fields) -> Result<()>
where
    R: Resource,
    R::Record: Serialize,
{
    match settle(|callbacks| collection.update(id, fields, callbacks)).await? {
        Some(record) => print_json(&record),
        None => Err(AppError::Usage(format!("{} {id} not found", R::NAME))),
    }
}

/// Loads the collection, marks `ids` the way a user would (long press on the
/// first row, plain presses on the others) and confirms the batch.
async fn delete<R: Resource>(
    collection: &Collection<R>,
    scope: R::Scope,
    ids: &[i64],
) -> Result<()> {
    settle(|callbacks| collection.list(scope, callbacks)).await?;

    for &id in ids {
        if collection.is_selected(id) {
            continue;
        }
        let press = if collection.is_select_mode() {
            PressKind::Normal
        } else {
            PressKind::Long
        };
        collection.on_row_press(id, press);
        if !collection.is_selected(id) {
            tracing::warn!(resource = R::NAME, id, "not in the list, skipped");
        }
    }

    let affected = settle_optional(|callbacks| collection.confirm_delete(callbacks))
        .await?
        .unwrap_or_default();
    print_json(&affected)
}

/// Issues a call and waits for whichever callback it ends in.
async fn settle<T, F>(issue: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(Callbacks<T>) -> Mutation,
{
    settle_optional(|callbacks| Some(issue(callbacks)))
        .await?
        .ok_or_else(|| AppError::Interrupted("call".to_string()))
}

/// Like [`settle`], for calls that may decline to start. Returns `None` when
/// nothing was issued.
async fn settle_optional<T, F>(issue: F) -> Result<Option<T>>
where
    T: Send + 'static,
    F: FnOnce(Callbacks<T>) -> Option<Mutation>,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let on_error = tx.clone();
    let callbacks = Callbacks::new()
        .on_success(move |value| {
            let _ = tx.send(Ok(value));
        })
        .on_error(move |failure| {
            let _ = on_error.send(Err(failure));
        });

    let Some(mutation) = issue(callbacks) else {
        return Ok(None);
    };
    let key = mutation.key();
    mutation.settled().await;
    match rx.recv().await {
        Some(result) => Ok(Some(result?)),
        None => Err(AppError::Interrupted(key.to_string())),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
