//! Navigation for the companion app
//!
//! This module provides:
//! - The [`Screen`] enumeration with stable string ids
//! - The transition table deciding which screens are reachable from which
//! - History helpers ([`get_back_target`], [`pop_history`])
//! - [`ScreenRouter`], the current screen plus its back stack

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Screens
// =============================================================================

/// Every screen in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    // Entry flow
    /// Launch screen shown while the session is resolved
    #[default]
    Splash,
    /// First-run welcome
    Welcome,
    /// Login / registration
    Auth,
    /// General onboarding questionnaire
    Onboarding,
    /// Provider onboarding questionnaire
    ProviderOnboarding,

    // Mother
    /// Home hub
    Dashboard,
    /// User profile
    Profile,
    /// Profile editor
    EditProfile,
    /// Photo journal
    Photos,
    /// App settings
    Settings,
    /// Notification inbox
    Notifications,
    /// Conversations
    ChatList,
    /// Single conversation
    Chat,
    /// Community forum
    Community,
    /// Upcoming appointments
    Appointments,
    /// One appointment
    AppointmentDetails,
    /// Appointment booking
    BookAppointment,
    /// Medication reminders
    Medications,
    /// Symptom history
    Symptoms,
    /// Symptom entry
    SymptomLog,
    /// Kick counter
    KickCounter,
    /// Contraction timer
    ContractionTimer,
    /// Weight tracking
    WeightTracker,
    /// Blood pressure tracking
    BloodPressure,
    /// Nutrition log
    Nutrition,
    /// Water intake
    Hydration,
    /// Sleep log
    Sleep,
    /// Exercise log
    Exercise,
    /// Mood tracking
    MoodTracker,
    /// Baby growth by week
    BabyGrowth,
    /// Weekly pregnancy updates
    WeeklyUpdates,
    /// Article library
    Articles,
    /// One article
    ArticleDetail,
    /// Birth plan
    BirthPlan,
    /// Hospital bag checklist
    HospitalBag,
    /// Emergency contacts and warning signs
    Emergency,
    /// Vaccination schedule
    Vaccinations,
    /// Lab results
    LabResults,

    // Provider
    /// Provider hub
    ProviderDashboard,
    /// Patients under care
    PatientList,
    /// One patient
    PatientDetail,

    // Community health worker
    /// Community health worker hub
    ChwDashboard,
    /// Scheduled home visits
    HomeVisits,
    /// Referrals to facilities
    Referrals,
}

/// Back destination used when there is no history
pub const DEFAULT_BACK_TARGET: Screen = Screen::Dashboard;

use Screen::*;

const MOTHER_FEATURES: &[Screen] = &[
    Profile,
    Settings,
    Notifications,
    ChatList,
    Community,
    Appointments,
    Medications,
    Symptoms,
    KickCounter,
    ContractionTimer,
    WeightTracker,
    BloodPressure,
    Nutrition,
    Hydration,
    Sleep,
    Exercise,
    MoodTracker,
    BabyGrowth,
    WeeklyUpdates,
    Articles,
    BirthPlan,
    HospitalBag,
    Emergency,
    Vaccinations,
    LabResults,
];

const PROVIDER_FEATURES: &[Screen] = &[
    PatientList,
    Appointments,
    ChatList,
    Notifications,
    Profile,
    Settings,
];

const CHW_FEATURES: &[Screen] = &[
    HomeVisits,
    Referrals,
    PatientList,
    ChatList,
    Notifications,
    Emergency,
    Profile,
    Settings,
];

const HUBS: &[Screen] = &[Dashboard, ProviderDashboard, ChwDashboard];

impl Screen {
    /// All screens, in declaration order
    pub const ALL: [Screen; 44] = [
        Splash,
        Welcome,
        Auth,
        Onboarding,
        ProviderOnboarding,
        Dashboard,
        Profile,
        EditProfile,
        Photos,
        Settings,
        Notifications,
        ChatList,
        Chat,
        Community,
        Appointments,
        AppointmentDetails,
        BookAppointment,
        Medications,
        Symptoms,
        SymptomLog,
        KickCounter,
        ContractionTimer,
        WeightTracker,
        BloodPressure,
        Nutrition,
        Hydration,
        Sleep,
        Exercise,
        MoodTracker,
        BabyGrowth,
        WeeklyUpdates,
        Articles,
        ArticleDetail,
        BirthPlan,
        HospitalBag,
        Emergency,
        Vaccinations,
        LabResults,
        ProviderDashboard,
        PatientList,
        PatientDetail,
        ChwDashboard,
        HomeVisits,
        Referrals,
    ];

    /// Get the stable string id
    pub fn as_str(&self) -> &'static str {
        match self {
            Splash => "splash",
            Welcome => "welcome",
            Auth => "auth",
            Onboarding => "onboarding",
            ProviderOnboarding => "provider-onboarding",
            Dashboard => "dashboard",
            Profile => "profile",
            EditProfile => "edit-profile",
            Photos => "photos",
            Settings => "settings",
            Notifications => "notifications",
            ChatList => "chat-list",
            Chat => "chat",
            Community => "community",
            Appointments => "appointments",
            AppointmentDetails => "appointment-details",
            BookAppointment => "book-appointment",
            Medications => "medications",
            Symptoms => "symptoms",
            SymptomLog => "symptom-log",
            KickCounter => "kick-counter",
            ContractionTimer => "contraction-timer",
            WeightTracker => "weight-tracker",
            BloodPressure => "blood-pressure",
            Nutrition => "nutrition",
            Hydration => "hydration",
            Sleep => "sleep",
            Exercise => "exercise",
            MoodTracker => "mood-tracker",
            BabyGrowth => "baby-growth",
            WeeklyUpdates => "weekly-updates",
            Articles => "articles",
            ArticleDetail => "article-detail",
            BirthPlan => "birth-plan",
            HospitalBag => "hospital-bag",
            Emergency => "emergency",
            Vaccinations => "vaccinations",
            LabResults => "lab-results",
            ProviderDashboard => "provider-dashboard",
            PatientList => "patient-list",
            PatientDetail => "patient-detail",
            ChwDashboard => "chw-dashboard",
            HomeVisits => "home-visits",
            Referrals => "referrals",
        }
    }

    /// Check if this screen belongs to the entry flow
    pub fn is_entry_flow(&self) -> bool {
        matches!(
            self,
            Splash | Welcome | Auth | Onboarding | ProviderOnboarding
        )
    }

    /// Check if this screen is a role hub
    pub fn is_hub(&self) -> bool {
        HUBS.contains(self)
    }

    /// Check if the screen needs a logged-in user
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Splash | Welcome | Auth)
    }

    /// Screens reachable from this one, excluding the implicit return to a hub
    pub fn targets(&self) -> &'static [Screen] {
        match self {
            Splash => &[
                Welcome,
                Auth,
                Onboarding,
                ProviderOnboarding,
                Dashboard,
                ProviderDashboard,
                ChwDashboard,
            ],
            Welcome => &[Auth],
            Auth => &[
                Onboarding,
                ProviderOnboarding,
                Dashboard,
                ProviderDashboard,
                ChwDashboard,
            ],
            Onboarding => &[Dashboard],
            ProviderOnboarding => &[ProviderDashboard],

            Dashboard => MOTHER_FEATURES,
            ProviderDashboard => PROVIDER_FEATURES,
            ChwDashboard => CHW_FEATURES,

            Profile => &[EditProfile, Photos, Settings],
            Settings => &[EditProfile, Notifications],
            Notifications => &[Chat, AppointmentDetails, ArticleDetail],
            ChatList => &[Chat],
            Community => &[ArticleDetail],
            Appointments => &[AppointmentDetails, BookAppointment],
            AppointmentDetails => &[Chat, BookAppointment],
            Symptoms => &[SymptomLog],
            SymptomLog => &[Emergency],
            KickCounter | ContractionTimer | BloodPressure => &[Emergency],
            WeeklyUpdates => &[BabyGrowth, ArticleDetail],
            Articles => &[ArticleDetail],
            BirthPlan => &[HospitalBag],
            Emergency => &[Appointments, ChatList],
            PatientList => &[PatientDetail],
            PatientDetail => &[Chat, LabResults, AppointmentDetails, Referrals],
            HomeVisits | Referrals => &[PatientDetail],

            EditProfile | Photos | Chat | BookAppointment | Medications | WeightTracker
            | Nutrition | Hydration | Sleep | Exercise | MoodTracker | BabyGrowth
            | ArticleDetail | HospitalBag | Vaccinations | LabResults => &[],
        }
    }

    /// Look up the transition from this screen to `target`
    ///
    /// Returns `None` when `target` is not reachable from here. Logging out
    /// is a router reset, not a transition.
    pub fn transition(&self, target: Screen) -> Option<Transition> {
        let listed = self.targets().contains(&target);
        let to_hub = !self.is_entry_flow()
            && !self.is_hub()
            && target.is_hub()
            && self.belongs_to(target);
        if !listed && !to_hub {
            return None;
        }

        let history = match self {
            Welcome => HistoryEffect::Push,
            screen if screen.is_entry_flow() => HistoryEffect::Replace,
            _ => HistoryEffect::Push,
        };

        Some(Transition { target, history })
    }
}

impl Screen {
    /// Check if this screen can be reached from `hub` through its features
    fn belongs_to(&self, hub: Screen) -> bool {
        let mut seen = vec![hub];
        let mut queue = vec![hub];
        while let Some(screen) = queue.pop() {
            for &next in screen.targets() {
                if next == *self {
                    return true;
                }
                if !next.is_hub() && !seen.contains(&next) {
                    seen.push(next);
                    queue.push(next);
                }
            }
        }
        false
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.as_str() == s)
            .ok_or_else(|| NavigationError::UnknownScreen(s.to_string()))
    }
}

// =============================================================================
// Transitions
// =============================================================================

/// What a forward transition does to the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEffect {
    /// Remember the current screen so back returns to it
    Push,
    /// Leave the history alone; the current screen is not returned to
    Replace,
}

/// An allowed forward transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Destination screen
    pub target: Screen,
    /// Effect on the history
    pub history: HistoryEffect,
}

/// Navigation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// No transition from `from` to `to`
    #[error("no transition from {from} to {to}")]
    Unreachable {
        /// Current screen
        from: Screen,
        /// Requested screen
        to: Screen,
    },

    /// Unknown screen id
    #[error("unknown screen: {0}")]
    UnknownScreen(String),
}

// =============================================================================
// History helpers
// =============================================================================

/// Get the screen back should return to
///
/// Returns the last entry of `history`, or `fallback` when the history is
/// empty or absent.
pub fn get_back_target<T: Clone>(history: Option<&[T]>, fallback: T) -> T {
    history
        .and_then(|entries| entries.last())
        .cloned()
        .unwrap_or(fallback)
}

/// [`get_back_target`] with the dashboard as fallback
pub fn back_target(history: Option<&[Screen]>) -> Screen {
    get_back_target(history, DEFAULT_BACK_TARGET)
}

/// Copy of `history` without its last entry
///
/// Empty or absent history yields an empty vector. The input is never
/// modified.
pub fn pop_history<T: Clone>(history: Option<&[T]>) -> Vec<T> {
    match history {
        Some([rest @ .., _]) => rest.to_vec(),
        _ => Vec::new(),
    }
}

// =============================================================================
// Router
// =============================================================================

/// Current screen plus back stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRouter {
    current: Screen,
    history: Vec<Screen>,
}

impl Default for ScreenRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenRouter {
    /// Create a router on the splash screen with empty history
    pub fn new() -> Self {
        Self::with_state(Splash, Vec::new())
    }

    /// Create a router with an explicit state
    pub fn with_state(current: Screen, history: Vec<Screen>) -> Self {
        Self { current, history }
    }

    /// Get the current screen
    pub fn current(&self) -> Screen {
        self.current
    }

    /// Get the back stack, oldest first
    pub fn history(&self) -> &[Screen] {
        &self.history
    }

    /// Check if there is somewhere to go back to
    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Move forward to `target`
    ///
    /// The move must be in the transition table. For a push the current
    /// screen is appended to the history before switching.
    pub fn navigate(&mut self, target: Screen) -> Result<Transition, NavigationError> {
        let transition = self
            .current
            .transition(target)
            .ok_or(NavigationError::Unreachable {
                from: self.current,
                to: target,
            })?;

        if transition.history == HistoryEffect::Push {
            self.history.push(self.current);
        }
        tracing::debug!(
            from = %self.current,
            to = %target,
            effect = ?transition.history,
            "navigate"
        );
        self.current = target;

        Ok(transition)
    }

    /// Go back one screen
    ///
    /// With an empty history this lands on the dashboard. Returns the new
    /// current screen.
    pub fn back(&mut self) -> Screen {
        let target = back_target(Some(self.history.as_slice()));
        self.history = pop_history(Some(self.history.as_slice()));
        tracing::debug!(from = %self.current, to = %target, "back");
        self.current = target;
        target
    }

    /// Jump to `screen` and forget the history
    pub fn reset(&mut self, screen: Screen) {
        tracing::debug!(from = %self.current, to = %screen, "reset");
        self.current = screen;
        self.history.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
