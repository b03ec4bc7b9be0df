pub mod executor;
pub mod grouping;
pub mod guard;
pub mod reconcile;
pub mod snapshot;
