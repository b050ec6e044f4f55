//! Data models for the signup backend.

mod form;
mod member;

pub use form::*;
pub use member::*;
