//! # Repositories
//!
//! Top level operations on datasets, these are the entry points used by the CLI
//!

pub mod drop;

pub use crate::repositories::drop::{run as drop, DropContext};
