//! Core domain model for bandbook.
//!
//! This crate defines the band's records (songs, members, availability,
//! setlists, gigs), the availability aggregator that classifies calendar
//! days, the setlist assembler that hydrates song references against the
//! catalog, the access guards, and the SQLite-backed record store.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod access;
pub mod availability;
pub mod error;
pub mod model;
pub mod setlist;
pub mod store;

pub use error::{Error, Result};
