//! restate-core - Core library for Restate
//!
//! This crate contains the Appwrite backend client, the auth and listing
//! facades, the current-user provider, and the headless screen controllers
//! shared by every Restate front end.

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod listings;
pub mod models;
pub mod query;
pub mod screens;
pub mod state;
pub mod util;

pub use error::{Error, Result};
pub use models::{Account, Property, Session, User};
