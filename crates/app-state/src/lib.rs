//! Application state for the maternal companion app
//!
//! This crate holds the state shared across screens: the [`Navigator`] every
//! part of the app moves through, and the [`AuthContext`] that owns the
//! user's session.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod navigator;

pub use auth::{AuthContext, AuthError};
pub use navigator::Navigator;
