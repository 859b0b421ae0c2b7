//! Shared navigation state
//!
//! [`Navigator`] wraps a [`ScreenRouter`] so that the UI, the auth context and
//! the HTTP client's session-expiry hook all drive the same router. It also
//! owns the splash timer: entering the splash screen arms it, and any other
//! transition disarms it.

use app_ui::{
    resolve_launch_screen, NavigationError, Screen, ScreenRouter, SplashConfig, SplashTimer,
    Transition,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use storage::SessionStore;

struct NavigatorInner {
    router: Mutex<ScreenRouter>,
    splash: Mutex<Option<SplashTimer>>,
    store: Arc<dyn SessionStore>,
    config: SplashConfig,
}

/// Cloneable handle to the app's router
///
/// Clones share state. Dropping the last clone aborts a pending splash timer.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<NavigatorInner>,
}

impl Navigator {
    /// Create a navigator on the splash screen
    ///
    /// The splash timer is not armed until [`Navigator::start`] is called.
    pub fn new(store: Arc<dyn SessionStore>, config: SplashConfig) -> Self {
        Self {
            inner: Arc::new(NavigatorInner {
                router: Mutex::new(ScreenRouter::new()),
                splash: Mutex::new(None),
                store,
                config,
            }),
        }
    }

    /// Show the splash screen and arm the auto-advance timer
    ///
    /// Returns `false` when no tokio runtime is available; the splash screen
    /// is then left to [`Navigator::advance_from_splash`].
    pub fn start(&self) -> bool {
        self.inner.router.lock().reset(Screen::Splash);

        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!("no async runtime, splash timer not started");
            self.cancel_splash();
            return false;
        }

        let weak: Weak<NavigatorInner> = Arc::downgrade(&self.inner);
        let timer = SplashTimer::start(self.inner.config.delay, move || {
            if let Some(inner) = weak.upgrade() {
                Navigator { inner }.advance_from_splash();
            }
        });

        // Replacing a previous timer drops and aborts it
        *self.inner.splash.lock() = Some(timer);
        tracing::debug!(delay_ms = self.inner.config.delay.as_millis() as u64, "splash started");
        true
    }

    /// Leave the splash screen for the launch screen
    ///
    /// Does nothing unless the splash screen is still showing. Returns the
    /// screen moved to.
    pub fn advance_from_splash(&self) -> Option<Screen> {
        let mut router = self.inner.router.lock();
        if router.current() != Screen::Splash {
            tracing::debug!(current = %router.current(), "splash already left");
            return None;
        }

        let target = resolve_launch_screen(self.inner.store.as_ref());
        match router.navigate(target) {
            Ok(_) => Some(target),
            Err(err) => {
                tracing::warn!(error = %err, "splash could not advance");
                None
            }
        }
    }

    /// Screen the splash screen would advance to right now
    pub fn launch_screen(&self) -> Screen {
        resolve_launch_screen(self.inner.store.as_ref())
    }

    /// Get the current screen
    pub fn current(&self) -> Screen {
        self.inner.router.lock().current()
    }

    /// Get a copy of the back stack
    pub fn history(&self) -> Vec<Screen> {
        self.inner.router.lock().history().to_vec()
    }

    /// Check if there is somewhere to go back to
    pub fn can_go_back(&self) -> bool {
        self.inner.router.lock().can_go_back()
    }

    /// Get a copy of the router state
    pub fn snapshot(&self) -> ScreenRouter {
        self.inner.router.lock().clone()
    }

    /// Move forward to `target` along the transition table
    pub fn navigate(&self, target: Screen) -> Result<Transition, NavigationError> {
        let transition = self.inner.router.lock().navigate(target)?;
        self.cancel_splash();
        Ok(transition)
    }

    /// Move to `target`, resetting the history if no transition leads there
    pub fn navigate_or_reset(&self, target: Screen) -> Screen {
        let mut router = self.inner.router.lock();
        if router.navigate(target).is_err() {
            router.reset(target);
        }
        drop(router);
        self.cancel_splash();
        target
    }

    /// Go back one screen
    pub fn back(&self) -> Screen {
        let screen = self.inner.router.lock().back();
        self.cancel_splash();
        screen
    }

    /// Jump to `screen` and clear the history
    ///
    /// Resetting to the splash screen goes through [`Navigator::start`], so
    /// the auto-advance timer is armed again.
    pub fn reset(&self, screen: Screen) {
        if screen == Screen::Splash {
            self.start();
            return;
        }
        self.inner.router.lock().reset(screen);
        self.cancel_splash();
    }

    /// Check if the splash timer is armed
    pub fn splash_pending(&self) -> bool {
        self.inner
            .splash
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    fn cancel_splash(&self) {
        if let Some(timer) = self.inner.splash.lock().take() {
            timer.cancel();
        }
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("router", &*self.inner.router.lock())
            .field("splash_delay", &self.inner.config.delay)
            .finish()
    }
}
