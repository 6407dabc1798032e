//! Client-side synchronization of entity lists with the engine.
//!
//! A [`Session`] owns one [`Collection`] per resource. Each collection keeps an
//! [`EntityCollectionStore`] consistent with the store through calls run by the
//! [`MutationCoordinator`], and drives multi-select batch deletion through the
//! [`Selection`] state machine and the row press policy in [`policy`].

pub use collection::EntityCollectionStore;
pub use coordinator::{Callbacks, Mutation, MutationCoordinator, MutationKey, Operation, Phase};
pub use failure::Failure;
pub use policy::{PressKind, RowAction};
pub use selection::{Selection, SelectionEvent, SelectionState};
pub use session::{Collection, Session};

mod collection;
mod coordinator;
mod failure;
pub mod policy;
mod selection;
mod session;
