//! Prediction page: pick a station and an hour, fetch the backend forecast.
//!
//! SYSTEM CONTEXT
//! ==============
//! The page watches the session for as long as it is open: it mirrors the
//! signed-in user into its view and sends the user to `/login` as soon as
//! the session empties. `leave()` drops that subscription, as does dropping
//! the last clone of the page.
//!
//! The forward offset sent to the backend is computed here from the local
//! wall clock: minutes from now until the selected hour today, wrapping to
//! tomorrow when that hour has already passed.

#[cfg(test)]
#[path = "prediction_test.rs"]
mod prediction_test;

use std::sync::{Arc, Mutex};

use time::{OffsetDateTime, Time};

use super::{PageCore, PageStatus, SubmitOutcome, ViewState, lock};
use crate::auth::AuthClient;
use crate::config::ClientConfig;
use crate::guard::Navigator;
use crate::model::{Prediction, Station, User};
use crate::prediction::PredictionClient;
use crate::route::Route;
use crate::session::{SessionStore, SubscriptionId};
use crate::validate::FieldErrors;

pub const NO_STATION_MESSAGE: &str = "Please select a station first.";
pub const INVALID_HOUR_MESSAGE: &str = "Please select a time slot.";
pub const FETCH_FAILURE_MESSAGE: &str = "Failed to fetch prediction. Please try again.";
pub const STATIONS_FAILURE_MESSAGE: &str = "Failed to load stations. Please refresh the page.";
pub const UNKNOWN_STATION: &str = "Unknown Station";
pub const DEFAULT_HOUR: &str = "08:00";

const MINUTES_PER_DAY: i128 = 24 * 60;

// =============================================================================
// TIME SLOTS
// =============================================================================

/// One selectable hour: `value` is `"HH:00"`, `label` the hour range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeSlot {
    pub label: String,
    pub value: String,
}

/// The 24 hourly slots of a day, midnight first.
#[must_use]
pub fn time_slots() -> Vec<TimeSlot> {
    (0..24)
        .map(|h| TimeSlot { label: format!("{h:02}:00 – {h:02}:59"), value: format!("{h:02}:00") })
        .collect()
}

/// Parse an `"HH:MM"` slot value.
#[must_use]
pub fn parse_hour(value: &str) -> Option<Time> {
    let (hour, minute) = value.split_once(':')?;
    Time::from_hms(hour.trim().parse().ok()?, minute.trim().parse().ok()?, 0).ok()
}

/// Whole minutes from `now` until `target`, rounded down, wrapping past
/// midnight so the result is always in `0..1440`.
#[must_use]
pub fn minutes_ahead(now: Time, target: Time) -> u32 {
    let millis = (target - now).whole_milliseconds();
    let mut minutes = millis.div_euclid(60_000);
    if minutes < 0 {
        minutes += MINUTES_PER_DAY;
    }
    u32::try_from(minutes).unwrap_or_default()
}

/// CSS class for a congestion level: lowercase, whitespace runs as `-`.
#[must_use]
pub fn congestion_class(level: &str) -> String {
    level.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase()
}

// =============================================================================
// VIEW
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct PredictionView {
    pub user: Option<User>,
    pub stations: Vec<Station>,
    pub station_id: Option<u64>,
    pub selected_hour: String,
    pub prediction: Option<Prediction>,
    pub status: PageStatus,
}

impl Default for PredictionView {
    fn default() -> Self {
        Self {
            user: None,
            stations: Vec::new(),
            station_id: None,
            selected_hour: DEFAULT_HOUR.to_owned(),
            prediction: None,
            status: PageStatus::default(),
        }
    }
}

impl PredictionView {
    #[must_use]
    pub fn loading(&self) -> bool {
        self.status.is_submitting()
    }

    #[must_use]
    pub fn station_name(&self, id: Option<u64>) -> &str {
        id.and_then(|id| self.stations.iter().find(|s| s.id == id))
            .map_or(UNKNOWN_STATION, |s| s.name.as_str())
    }

    /// Range label for a slot value; unknown values are echoed back.
    #[must_use]
    pub fn hour_label(value: &str) -> String {
        time_slots()
            .into_iter()
            .find(|slot| slot.value == value)
            .map_or_else(|| value.to_owned(), |slot| slot.label)
    }

    /// Class for the current prediction's congestion level, if it has one.
    #[must_use]
    pub fn congestion_class(&self) -> Option<String> {
        self.prediction
            .as_ref()
            .and_then(Prediction::congestion_level)
            .filter(|level| !level.is_empty())
            .map(congestion_class)
    }
}

// =============================================================================
// PAGE
// =============================================================================

#[derive(Clone)]
pub struct PredictionPage {
    auth: AuthClient,
    predictions: PredictionClient,
    core: PageCore,
    view: Arc<Mutex<PredictionView>>,
    watch: Arc<SessionWatch>,
}

/// Owns the page's session subscription; unsubscribes on drop.
struct SessionWatch {
    session: SessionStore,
    id: SubscriptionId,
}

impl SessionWatch {
    fn release(&self) {
        if self.session.unsubscribe(self.id) {
            tracing::debug!("prediction page stopped watching session");
        }
    }
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        self.release();
    }
}

impl PredictionPage {
    /// Open the page and start watching the session. Call `load_stations`
    /// next to populate the station picker.
    pub fn open(
        auth: AuthClient,
        predictions: PredictionClient,
        navigator: Arc<dyn Navigator>,
        config: &ClientConfig,
    ) -> Self {
        let core = PageCore::new(navigator, config.redirect_delay);
        let view = Arc::new(Mutex::new(PredictionView::default()));

        let observed = Arc::clone(&view);
        let on_session = core.clone();
        let subscription = auth.session().subscribe(move |user| {
            lock(&observed).user = user.cloned();
            if user.is_none() {
                tracing::info!("session ended, leaving prediction page");
                on_session.navigate(Route::login());
            }
        });

        let watch = Arc::new(SessionWatch { session: auth.session().clone(), id: subscription });
        Self { auth, predictions, core, view, watch }
    }

    #[must_use]
    pub fn view(&self) -> PredictionView {
        lock(&self.view).clone()
    }

    pub fn select_station(&self, station_id: u64) {
        lock(&self.view).station_id = Some(station_id);
    }

    /// Choose an `"HH:MM"` slot. Returns `false` and keeps the previous
    /// choice when `value` is not a valid time.
    pub fn select_hour(&self, value: &str) -> bool {
        if parse_hour(value).is_none() {
            return false;
        }
        lock(&self.view).selected_hour = value.to_owned();
        true
    }

    /// Fetch the station list and preselect the first one if nothing is
    /// selected yet.
    pub async fn load_stations(&self) -> SubmitOutcome {
        let ticket = {
            let mut view = lock(&self.view);
            if view.status.is_submitting() {
                return SubmitOutcome::Busy;
            }
            view.status.begin()
        };

        let result = self.predictions.stations().await;

        let mut view = lock(&self.view);
        if !view.status.is_current(ticket) {
            return SubmitOutcome::Stale;
        }
        match result {
            Ok(stations) => {
                if view.station_id.is_none() {
                    view.station_id = stations.first().map(|s| s.id);
                }
                tracing::debug!(count = stations.len(), "stations loaded");
                view.stations = stations;
                view.status.state = ViewState::Idle;
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load stations");
                view.status.fail(STATIONS_FAILURE_MESSAGE.to_owned());
                SubmitOutcome::Failed
            }
        }
    }

    /// Fetch the prediction for the selected station and hour, measured from
    /// the local wall clock.
    pub async fn fetch_prediction(&self) -> SubmitOutcome {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        self.fetch_prediction_at(now.time()).await
    }

    pub(crate) async fn fetch_prediction_at(&self, now: Time) -> SubmitOutcome {
        let (ticket, station_id, minutes) = {
            let mut view = lock(&self.view);
            if view.status.is_submitting() {
                return SubmitOutcome::Busy;
            }
            view.status.clear_messages();
            let Some(station_id) = view.station_id.filter(|id| *id > 0) else {
                view.status.reject(FieldErrors::new(), Some(NO_STATION_MESSAGE));
                return SubmitOutcome::Invalid;
            };
            let Some(target) = parse_hour(&view.selected_hour) else {
                view.status.reject(FieldErrors::new(), Some(INVALID_HOUR_MESSAGE));
                return SubmitOutcome::Invalid;
            };
            view.prediction = None;
            (view.status.begin(), station_id, minutes_ahead(now, target))
        };

        let result = self.predictions.get_prediction(station_id, minutes).await;

        let mut view = lock(&self.view);
        if !view.status.is_current(ticket) {
            return SubmitOutcome::Stale;
        }
        match result {
            Ok(prediction) => {
                view.prediction = Some(prediction);
                view.status.succeed(None);
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                tracing::error!(station_id, minutes_ahead = minutes, error = %err, "prediction fetch failed");
                view.status.fail(FETCH_FAILURE_MESSAGE.to_owned());
                SubmitOutcome::Failed
            }
        }
    }

    /// Sign out and go to the login page.
    pub fn logout(&self) {
        self.auth.logout();
        self.core.navigate(Route::login());
    }

    pub fn leave(&self) {
        self.watch.release();
        lock(&self.view).status.invalidate();
        self.core.cancel_redirect();
    }
}
