//! Core types and trait definitions for the kindred family-tree engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the kinship taxonomy, the relationship-kind table, the read-side tree
//! builders and the (pure) planning half of the membership mutator. Storage
//! backends implement [`store::FamilyStore`] on top of it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod extended;
pub mod fact;
pub mod kind;
pub mod mutator;
pub mod person;
pub mod projector;
pub mod store;
pub mod taxonomy;
pub mod tree;

pub use error::{Classify, Error, ErrorClass, Result};
