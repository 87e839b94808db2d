#![doc = "cms-index-sync-core: core pipeline library for cms-index-sync."]

//! This crate contains the whole sync pipeline: fetching live items from a content store,
//! filtering them, flattening them into search records and fully replacing a search index.
//! Concrete HTTP clients live in the `cms-index-sync` crate; this crate only depends on the
//! capability traits in [`contract`].
//!
//! # Usage
//! Build a [`config::SyncConfig`], pick implementations of [`contract::ContentSource`] and
//! [`contract::SearchIndex`], then call [`trigger::perform_sync`] (JSON-ready outcome) or
//! [`synchronise::synchronise`] (typed report).

pub mod config;
pub mod contract;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod index;
pub mod observer;
pub mod synchronise;
pub mod transform;
pub mod trigger;
