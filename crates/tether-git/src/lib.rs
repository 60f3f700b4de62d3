//! # tether-git
//!
//! Version-control backend for Tether. Defines the [`VcsBackend`] trait the
//! sync engine is written against, and [`Repository`], its git
//! implementation built on git2-rs plus the `git` executable.

mod command;
mod error;
mod repository;
mod status;
mod traits;

pub use command::CommandOutput;
pub use error::{Error, Result};
pub use repository::Repository;
pub use status::{StatusEntry, StatusTag};
pub use traits::VcsBackend;
