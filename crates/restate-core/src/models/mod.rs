//! Data models for Restate

mod account;
mod document;
mod property;
mod user;

pub use account::{Account, Session, Token};
pub use document::{Document, DocumentList};
pub use property::Property;
pub use user::User;
