//! # libdatadrop
//!
//! Drop the locally held content of files inside a hierarchy of versioned
//! datasets, while the dataset history and the pointer files that reference
//! the content stay in place.
//!
//! The public entry point is [`repositories::drop::run`], which turns a
//! [`opts::DropOpts`] request into a lazy stream of [`model::StatusRecord`]s.
//!
//! ```ignore
//! use futures::StreamExt;
//! use libdatadrop::opts::DropOpts;
//! use libdatadrop::repositories::drop::{self, DropContext};
//!
//! let opts = DropOpts::from_paths(&["images/"]);
//! let records = drop::run(opts, DropContext::local()).collect::<Vec<_>>().await;
//! ```

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod model;
pub mod opts;
pub mod repositories;
pub mod storage;
pub mod util;
