//! Screens and navigation for the maternal companion app
//!
//! This crate has no I/O of its own. It defines which screens exist, how the
//! user may move between them, and where the splash screen sends them.
//!
//! # Modules
//!
//! - [`navigation`] - Screen enumeration, transition table, history helpers, router
//! - [`splash`] - Launch screen resolution and the splash auto-advance timer
//!
//! # Example
//!
//! ```rust
//! use app_ui::{get_back_target, pop_history, Screen, ScreenRouter};
//!
//! let history = ["dashboard", "profile", "photos"];
//! assert_eq!(get_back_target(Some(&history[..]), "dashboard"), "photos");
//! assert_eq!(pop_history(Some(&history[..])), vec!["dashboard", "profile"]);
//!
//! let mut router = ScreenRouter::new();
//! router.navigate(Screen::Dashboard).unwrap();
//! router.navigate(Screen::Profile).unwrap();
//! assert_eq!(router.back(), Screen::Dashboard);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod navigation;
pub mod splash;

pub use navigation::{
    back_target, get_back_target, pop_history, HistoryEffect, NavigationError, Screen,
    ScreenRouter, Transition, DEFAULT_BACK_TARGET,
};

pub use splash::{
    resolve_launch_screen, SplashConfig, SplashTimer, DEFAULT_SPLASH_DELAY, SPLASH_DELAY_ENV,
};
