use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use engine::{CatalogFields, Categories, Engine, ExpenseFields, Identity, SharedIdentity};
use gastos_sync::{Callbacks, Failure, Phase, PressKind, RowAction, SelectionState, Session};
use migration::MigratorTrait;

async fn session_with_db() -> (Session, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let identity = SharedIdentity::new();
    let engine = Engine::builder()
        .database(db.clone())
        .identity(identity.clone())
        .build()
        .await
        .unwrap();
    engine.register_user("alice", "password").await.unwrap();
    let session = Session::sign_in(Arc::new(engine), identity, "alice", "password")
        .await
        .unwrap();
    (session, db)
}

async fn seed_categories(session: &Session, names: &[&str]) -> Vec<i64> {
    let mut ids = Vec::new();
    for name in names {
        let phase = session
            .categories()
            .add(CatalogFields::new(*name), Callbacks::new())
            .settled()
            .await;
        assert_eq!(phase, Phase::Success);
    }
    for category in session.categories().items() {
        ids.push(category.id);
    }
    ids
}

/// Counts callback invocations and keeps the failures handed over.
#[derive(Clone, Default)]
struct Recorder {
    successes: Arc<AtomicUsize>,
    failures: Arc<Mutex<Vec<Failure>>>,
}

impl Recorder {
    fn callbacks<T: Send + 'static>(&self) -> Callbacks<T> {
        let successes = Arc::clone(&self.successes);
        let failures = Arc::clone(&self.failures);
        Callbacks::new()
            .on_success(move |_| {
                successes.fetch_add(1, Ordering::SeqCst);
            })
            .on_error(move |failure| failures.lock().unwrap().push(failure))
    }

    fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    fn failures(&self) -> Vec<Failure> {
        self.failures.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn confirmed_delete_prunes_the_collection_and_resets_selection() {
    let (session, _db) = session_with_db().await;
    let ids = seed_categories(&session, &["Rent", "Food", "Travel"]).await;
    let categories = session.categories();

    assert_eq!(
        categories.on_row_press(ids[0], PressKind::Long),
        RowAction::EnterSelection(ids[0])
    );
    categories.on_row_press(ids[2], PressKind::Normal);
    assert_eq!(categories.delete_list(), vec![ids[0], ids[2]]);

    let deleted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&deleted);
    let mutation = categories
        .confirm_delete(
            Callbacks::new().on_success(move |affected| *sink.lock().unwrap() = affected),
        )
        .unwrap();
    assert_eq!(mutation.settled().await, Phase::Success);

    assert_eq!(*deleted.lock().unwrap(), vec![ids[0], ids[2]]);
    assert_eq!(categories.ids(), vec![ids[1]]);
    assert!(categories.delete_list().is_empty());
    assert!(!categories.is_select_mode());
    assert_eq!(categories.state(), SelectionState::Idle);

    // Soft deleted rows stay out of later listings.
    categories
        .list((), Callbacks::new())
        .settled()
        .await;
    assert_eq!(categories.ids(), vec![ids[1]]);
}

#[tokio::test]
async fn failed_delete_leaves_collection_and_selection_unchanged() {
    let (session, db) = session_with_db().await;
    let ids = seed_categories(&session, &["Rent", "Food", "Travel"]).await;
    let categories = session.categories();
    categories.on_row_press(ids[0], PressKind::Long);
    categories.on_row_press(ids[1], PressKind::Long);

    db.execute_unprepared("DROP TABLE categories").await.unwrap();

    let recorder = Recorder::default();
    let phase = categories
        .confirm_delete(recorder.callbacks())
        .unwrap()
        .settled()
        .await;

    assert!(matches!(phase, Phase::Error(Failure::Remote(_))));
    assert_eq!(recorder.successes(), 0);
    assert_eq!(recorder.failures().len(), 1);
    assert!(matches!(recorder.failures()[0], Failure::Remote(_)));
    assert_eq!(categories.ids(), ids);
    assert_eq!(categories.delete_list(), vec![ids[0], ids[1]]);
    assert!(categories.is_select_mode());
}

#[tokio::test]
async fn create_without_identity_fails_before_the_store() {
    // No database and no identity: any store access would fail differently.
    let engine = Engine::builder().build().await.unwrap();
    let session = Session::new(Arc::new(engine), SharedIdentity::new());
    let places = session.places();

    let recorder = Recorder::default();
    let phase = places
        .add(CatalogFields::new("Market"), recorder.callbacks())
        .settled()
        .await;

    assert_eq!(phase, Phase::Error(Failure::Unauthenticated));
    assert_eq!(recorder.failures(), vec![Failure::Unauthenticated]);
    assert_eq!(recorder.successes(), 0);
    assert!(places.items().is_empty());
    assert!(!places.is_loaded());
}

#[tokio::test]
async fn sign_out_turns_later_calls_unauthenticated() {
    let (session, _db) = session_with_db().await;
    let places = session.places().clone();

    assert_eq!(
        session.sign_out().map(|identity| identity.username),
        Some("alice".to_string())
    );

    let phase = places.list((), Callbacks::new()).settled().await;
    assert_eq!(phase, Phase::Error(Failure::Unauthenticated));
}

#[tokio::test]
async fn wrong_credentials_do_not_open_a_session() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let identity = SharedIdentity::new();
    let engine = Engine::builder()
        .database(db)
        .identity(identity.clone())
        .build()
        .await
        .unwrap();
    engine.register_user("alice", "password").await.unwrap();

    let result = Session::sign_in(Arc::new(engine), identity, "alice", "nope").await;
    assert!(matches!(result, Err(Failure::Unauthenticated)));
}

#[tokio::test]
async fn add_and_update_patch_the_collection_by_id() {
    let (session, _db) = session_with_db().await;
    let methods = session.payment_methods();

    let created = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&created);
    let phase = methods
        .add(
            CatalogFields::new("Card"),
            Callbacks::new().on_success(move |method| *sink.lock().unwrap() = Some(method)),
        )
        .settled()
        .await;
    assert_eq!(phase, Phase::Success);
    let card = created.lock().unwrap().clone().unwrap();
    assert_eq!(methods.items(), vec![card.clone()]);

    methods
        .add(CatalogFields::new("Cash"), Callbacks::new())
        .settled()
        .await;

    let phase = methods
        .update(card.id, CatalogFields::new("Credit card"), Callbacks::new())
        .settled()
        .await;
    assert_eq!(phase, Phase::Success);
    let names: Vec<String> = methods.items().into_iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["Credit card", "Cash"]);

    // A missing row succeeds with nothing to replace.
    let phase = methods
        .update(9_999, CatalogFields::new("Cheque"), Callbacks::new())
        .settled()
        .await;
    assert_eq!(phase, Phase::Success);
    assert_eq!(methods.items().len(), 2);
}

#[tokio::test]
async fn rejected_create_leaves_the_collection_unchanged() {
    let (session, _db) = session_with_db().await;
    seed_categories(&session, &["Food"]).await;

    let recorder = Recorder::default();
    let phase = session
        .categories()
        .add(CatalogFields::new(" food "), recorder.callbacks())
        .settled()
        .await;

    assert_eq!(
        phase,
        Phase::Error(Failure::Remote("\"food\" already present!".to_string()))
    );
    assert_eq!(recorder.failures().len(), 1);
    assert_eq!(session.categories().items().len(), 1);
}

async fn expense_fields(session: &Session, date: NaiveDate) -> ExpenseFields {
    let category = seed_categories(session, &["Food"]).await[0];
    session
        .payment_methods()
        .add(CatalogFields::new("Cash"), Callbacks::new())
        .settled()
        .await;
    session
        .places()
        .add(CatalogFields::new("Market"), Callbacks::new())
        .settled()
        .await;
    session
        .cost_centers()
        .add(CatalogFields::new("Home"), Callbacks::new())
        .settled()
        .await;
    ExpenseFields {
        amount_minor: 2_450,
        date,
        category_id: category,
        payment_method_id: session.payment_methods().ids()[0],
        place_id: session.places().ids()[0],
        cost_center_id: session.cost_centers().ids()[0],
    }
}

#[tokio::test]
async fn expenses_list_by_date() {
    let (session, _db) = session_with_db().await;
    let date = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
    let fields = expense_fields(&session, date).await;
    let expenses = session.expenses();

    assert_eq!(expenses.list(date, Callbacks::new()).settled().await, Phase::Success);
    assert!(expenses.items().is_empty());
    assert_eq!(expenses.scope(), Some(date));

    assert_eq!(
        expenses.add(fields.clone(), Callbacks::new()).settled().await,
        Phase::Success
    );
    let created = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&created);
    assert_eq!(
        expenses
            .add(
                ExpenseFields {
                    date: date.succ_opt().unwrap(),
                    ..fields
                },
                Callbacks::new().on_success(move |expense| *sink.lock().unwrap() = Some(expense)),
            )
            .settled()
            .await,
        Phase::Success
    );
    // The other day's expense was stored, but is not part of this listing.
    assert!(created.lock().unwrap().is_some());
    assert_eq!(expenses.items().len(), 1);

    assert_eq!(expenses.list(date, Callbacks::new()).settled().await, Phase::Success);
    let listed = expenses.items();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].amount_minor, 2_450);
    assert_eq!(
        listed[0].category.as_ref().map(|c| c.name.as_str()),
        Some("Food")
    );
    assert!(expenses.is_loaded());
}

#[tokio::test]
async fn expense_moved_to_another_date_leaves_the_listing() {
    let (session, _db) = session_with_db().await;
    let date = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
    let fields = expense_fields(&session, date).await;
    let expenses = session.expenses();

    for amount_minor in [100, 200] {
        expenses
            .add(
                ExpenseFields {
                    amount_minor,
                    ..fields.clone()
                },
                Callbacks::new(),
            )
            .settled()
            .await;
    }
    expenses.list(date, Callbacks::new()).settled().await;
    let ids = expenses.ids();
    assert_eq!(ids.len(), 2);
    expenses.on_row_press(ids[0], PressKind::Long);

    let phase = expenses
        .update(
            ids[0],
            ExpenseFields {
                date: date.pred_opt().unwrap(),
                ..fields.clone()
            },
            Callbacks::new(),
        )
        .settled()
        .await;
    assert_eq!(phase, Phase::Success);
    assert_eq!(expenses.ids(), vec![ids[1]]);
    assert_eq!(expenses.state(), SelectionState::Idle);

    let phase = expenses
        .update(
            ids[1],
            ExpenseFields {
                amount_minor: 999,
                ..fields
            },
            Callbacks::new(),
        )
        .settled()
        .await;
    assert_eq!(phase, Phase::Success);
    assert_eq!(expenses.items()[0].amount_minor, 999);

    let local = expenses.items();
    expenses.list(date, Callbacks::new()).settled().await;
    assert_eq!(expenses.items(), local);
}

#[tokio::test]
async fn caller_delete_batch_keeps_unrelated_selection() {
    let (session, _db) = session_with_db().await;
    let ids = seed_categories(&session, &["Rent", "Food", "Travel"]).await;
    let categories = session.categories();
    categories.on_row_press(ids[0], PressKind::Long);

    let phase = categories
        .delete_batch(vec![ids[2]], Callbacks::new())
        .settled()
        .await;
    assert_eq!(phase, Phase::Success);

    assert_eq!(categories.ids(), vec![ids[0], ids[1]]);
    assert_eq!(categories.delete_list(), vec![ids[0]]);
    assert!(categories.is_select_mode());

    // The local collection still matches a fresh listing.
    categories.list((), Callbacks::new()).settled().await;
    assert_eq!(categories.ids(), vec![ids[0], ids[1]]);

    // Deleting the last pending id leaves select mode.
    categories
        .delete_batch(vec![ids[0]], Callbacks::new())
        .settled()
        .await;
    assert_eq!(categories.ids(), vec![ids[1]]);
    assert_eq!(categories.state(), SelectionState::Idle);
}

#[tokio::test]
async fn ids_marked_during_a_delete_stay_pending() {
    let (session, _db) = session_with_db().await;
    let ids = seed_categories(&session, &["Rent", "Food", "Travel"]).await;
    let categories = session.categories();
    categories.on_row_press(ids[0], PressKind::Long);

    let mutation = categories.delete_batch(vec![ids[0]], Callbacks::new());
    categories.on_row_press(ids[1], PressKind::Normal);
    assert_eq!(mutation.settled().await, Phase::Success);

    assert_eq!(categories.ids(), vec![ids[1], ids[2]]);
    assert_eq!(categories.delete_list(), vec![ids[1]]);
    assert!(categories.is_select_mode());
}

#[tokio::test]
async fn listing_prunes_pending_ids_that_vanished() {
    let (session, db) = session_with_db().await;
    let ids = seed_categories(&session, &["Rent", "Food", "Travel"]).await;
    let categories = session.categories();
    categories.on_row_press(ids[0], PressKind::Long);
    categories.on_row_press(ids[1], PressKind::Long);

    // Another client of the same account removes a pending row.
    let elsewhere = Engine::builder()
        .database(db)
        .identity(SharedIdentity::signed_in(Identity::new("alice")))
        .build()
        .await
        .unwrap();
    elsewhere.soft_delete::<Categories>(&[ids[0]]).await.unwrap();

    categories.list((), Callbacks::new()).settled().await;
    assert_eq!(categories.ids(), vec![ids[1], ids[2]]);
    assert_eq!(categories.delete_list(), vec![ids[1]]);
    assert!(categories.is_select_mode());

    elsewhere.soft_delete::<Categories>(&[ids[1]]).await.unwrap();
    categories.list((), Callbacks::new()).settled().await;
    assert!(categories.delete_list().is_empty());
    assert_eq!(categories.state(), SelectionState::Idle);
}

#[tokio::test]
async fn confirm_delete_is_unavailable_while_idle() {
    let (session, _db) = session_with_db().await;
    let ids = seed_categories(&session, &["Rent"]).await;
    let categories = session.categories();

    assert!(categories.confirm_delete(Callbacks::new()).is_none());

    categories.on_row_press(ids[0], PressKind::Long);
    categories.cancel_selection();
    assert!(categories.confirm_delete(Callbacks::new()).is_none());
    assert_eq!(categories.ids(), ids);
    assert_eq!(session.coordinator().in_flight(), 0);
}
