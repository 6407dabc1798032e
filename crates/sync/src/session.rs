//! Per-session context: one collection handle per resource, all sharing the
//! same engine and coordinator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use engine::{
    Categories, CostCenters, Engine, Expenses, Identity, IdentityResolver, PaymentMethods, Places,
    Record, Resource, SharedIdentity,
};

use crate::{
    Failure,
    collection::EntityCollectionStore,
    coordinator::{Callbacks, Mutation, MutationCoordinator, MutationKey, Operation},
    policy::{PressKind, RowAction},
    selection::{SelectionEvent, SelectionState},
};

type SharedStore<T, S> = Arc<Mutex<EntityCollectionStore<T, S>>>;

fn lock<T, S>(store: &SharedStore<T, S>) -> MutexGuard<'_, EntityCollectionStore<T, S>> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Caller-facing surface of one resource.
///
/// Remote operations update the collection only after the store answered with
/// success, and before the caller's own success callback runs. On failure the
/// collection and the selection are left as they were.
pub struct Collection<R: Resource> {
    engine: Arc<Engine>,
    coordinator: MutationCoordinator,
    store: SharedStore<R::Record, R::Scope>,
}

impl<R: Resource> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            coordinator: self.coordinator.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: Resource> Collection<R> {
    pub fn new(engine: Arc<Engine>, coordinator: MutationCoordinator) -> Self {
        Self {
            engine,
            coordinator,
            store: Arc::new(Mutex::new(EntityCollectionStore::new())),
        }
    }

    fn key(operation: Operation) -> MutationKey {
        MutationKey::new(R::NAME, operation)
    }

    pub fn items(&self) -> Vec<R::Record> {
        lock(&self.store).items().to_vec()
    }

    pub fn is_loaded(&self) -> bool {
        lock(&self.store).is_loaded()
    }

    /// Scope of the last successful listing.
    pub fn scope(&self) -> Option<R::Scope> {
        lock(&self.store).scope().cloned()
    }

    pub fn state(&self) -> SelectionState {
        lock(&self.store).state()
    }

    pub fn is_select_mode(&self) -> bool {
        lock(&self.store).is_select_mode()
    }

    pub fn is_selected(&self, id: i64) -> bool {
        lock(&self.store).is_selected(id)
    }

    pub fn delete_list(&self) -> Vec<i64> {
        lock(&self.store).delete_list().to_vec()
    }

    pub fn on_row_press(&self, id: i64, press: PressKind) -> RowAction {
        lock(&self.store).on_row_press(id, press)
    }

    pub fn cancel_selection(&self) {
        lock(&self.store).dispatch(SelectionEvent::Cancel);
    }

    /// Fetches the collection within `scope` and replaces the local copy.
    pub fn list(&self, scope: R::Scope, callbacks: Callbacks<Vec<R::Record>>) -> Mutation {
        let engine = Arc::clone(&self.engine);
        let store = Arc::clone(&self.store);
        let call = async move {
            let records = engine.fetch::<R>(&scope).await?;
            lock(&store).replace_all(scope, records.clone());
            Ok::<_, Failure>(records)
        };
        self.coordinator.run(Self::key(Operation::List), call, callbacks)
    }

    /// Creates an entity and appends it to the collection, unless it falls
    /// outside the scope of the last listing.
    pub fn add(&self, fields: R::Fields, callbacks: Callbacks<R::Record>) -> Mutation {
        let engine = Arc::clone(&self.engine);
        let store = Arc::clone(&self.store);
        let call = async move {
            let record = engine.create::<R>(fields).await?;
            if !lock(&store).append(record.clone()) {
                tracing::debug!(
                    resource = R::NAME,
                    id = record.id(),
                    "created outside the listed scope"
                );
            }
            Ok::<_, Failure>(record)
        };
        self.coordinator.run(Self::key(Operation::Add), call, callbacks)
    }

    /// Replaces entity `id`, or drops it from the collection when it moved out
    /// of the listed scope. The success callback receives `None` when the
    /// store had no matching row, in which case the collection is untouched.
    pub fn update(
        &self,
        id: i64,
        fields: R::Fields,
        callbacks: Callbacks<Option<R::Record>>,
    ) -> Mutation {
        let engine = Arc::clone(&self.engine);
        let store = Arc::clone(&self.store);
        let call = async move {
            let record = engine.update::<R>(id, fields).await?;
            if let Some(record) = &record {
                lock(&store).replace(record.clone());
            }
            Ok::<_, Failure>(record)
        };
        self.coordinator
            .run(Self::key(Operation::Update), call, callbacks)
    }

    /// Soft deletes `ids`. On success the requested and affected entities
    /// leave the collection and the delete list. Other pending ids stay
    /// selected.
    pub fn delete_batch(&self, ids: Vec<i64>, callbacks: Callbacks<Vec<i64>>) -> Mutation {
        self.delete(ids, false, callbacks)
    }

    /// Deletes the current delete list. On success the selection is reset.
    /// Returns `None` while not selecting.
    pub fn confirm_delete(&self, callbacks: Callbacks<Vec<i64>>) -> Option<Mutation> {
        let ids = {
            let store = lock(&self.store);
            if !store.is_select_mode() {
                return None;
            }
            store.delete_list().to_vec()
        };
        Some(self.delete(ids, true, callbacks))
    }

    fn delete(&self, ids: Vec<i64>, reset: bool, callbacks: Callbacks<Vec<i64>>) -> Mutation {
        let engine = Arc::clone(&self.engine);
        let store = Arc::clone(&self.store);
        let call = async move {
            let affected = engine.soft_delete::<R>(&ids).await?;
            let mut collection = lock(&store);
            collection.remove_deleted(&ids, &affected);
            if reset {
                collection.reset_selection();
            }
            Ok::<_, Failure>(affected)
        };
        self.coordinator
            .run(Self::key(Operation::Delete), call, callbacks)
    }

    pub fn get(&self, id: i64) -> Option<R::Record> {
        lock(&self.store).get(id).cloned()
    }

    /// Ids of the collection in order.
    pub fn ids(&self) -> Vec<i64> {
        lock(&self.store).items().iter().map(Record::id).collect()
    }
}

/// Context object owning every collection of a signed-in user.
///
/// Created once per session. [`Session::sign_out`] clears the identity the
/// engine resolves, so every later call on a collection handle fails with
/// [`Failure::Unauthenticated`].
pub struct Session {
    identity: SharedIdentity,
    coordinator: MutationCoordinator,
    categories: Collection<Categories>,
    payment_methods: Collection<PaymentMethods>,
    places: Collection<Places>,
    cost_centers: Collection<CostCenters>,
    expenses: Collection<Expenses>,
}

impl Session {
    /// Wraps an engine whose identity resolver is `identity`.
    pub fn new(engine: Arc<Engine>, identity: SharedIdentity) -> Self {
        let coordinator = MutationCoordinator::new();
        Self {
            identity,
            categories: Collection::new(Arc::clone(&engine), coordinator.clone()),
            payment_methods: Collection::new(Arc::clone(&engine), coordinator.clone()),
            places: Collection::new(Arc::clone(&engine), coordinator.clone()),
            cost_centers: Collection::new(Arc::clone(&engine), coordinator.clone()),
            expenses: Collection::new(engine, coordinator.clone()),
            coordinator,
        }
    }

    /// Checks the credentials and signs `identity` in before opening the
    /// session.
    pub async fn sign_in(
        engine: Arc<Engine>,
        identity: SharedIdentity,
        username: &str,
        password: &str,
    ) -> Result<Self, Failure> {
        let signed_in = engine.authenticate(username, password).await?;
        tracing::info!(user = %signed_in.username, "session opened");
        identity.sign_in(signed_in);
        Ok(Self::new(engine, identity))
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.current_identity()
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        &self.coordinator
    }

    pub fn categories(&self) -> &Collection<Categories> {
        &self.categories
    }

    pub fn payment_methods(&self) -> &Collection<PaymentMethods> {
        &self.payment_methods
    }

    pub fn places(&self) -> &Collection<Places> {
        &self.places
    }

    pub fn cost_centers(&self) -> &Collection<CostCenters> {
        &self.cost_centers
    }

    pub fn expenses(&self) -> &Collection<Expenses> {
        &self.expenses
    }

    /// Tears the session down and signs the identity out.
    pub fn sign_out(self) -> Option<Identity> {
        let identity = self.identity.sign_out();
        if let Some(identity) = &identity {
            tracing::info!(user = %identity.username, "session closed");
        }
        identity
    }
}
