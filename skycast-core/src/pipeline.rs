use std::time::{Duration, Instant};

use chrono::Local;

use crate::api::OpenWeatherClient;
use crate::error::QueryError;
use crate::history::{HistoryStore, SearchHistory};
use crate::locate::LocationProvider;
use crate::model::{Location, WeatherView};
use crate::normalize::clean_city_query;
use crate::transform::build_view;

/// How long a transient notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient banner message. Expires [`NOTICE_TTL`] after posting; posting a
/// new notice replaces the old one and restarts the window.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    posted_at: Instant,
}

impl Notice {
    fn new(kind: NoticeKind, message: String) -> Self {
        Self {
            kind,
            message,
            posted_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.posted_at) >= NOTICE_TTL
    }
}

/// Pipeline run state as seen by the presentation layer.
///
/// Success and Failed describe the most recent completed run only; the next
/// invocation moves straight back through Loading. A failed run never clears
/// the previously published view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

/// The dashboard orchestrator.
///
/// Owns the single published weather slot, the search history and the notice
/// area, and drives the query pipeline end to end: normalize, geocode,
/// concurrent fetch, transform, publish. All mutation goes through `&mut
/// self`, so runs are serialized and whatever view is published last is
/// internally consistent: its `current` and `forecast` always come from the
/// same fetch cycle.
pub struct Dashboard<S: HistoryStore> {
    client: Option<OpenWeatherClient>,
    store: S,
    history: SearchHistory,
    phase: Phase,
    view: Option<WeatherView>,
    notice: Option<Notice>,
    last_resolved: Option<String>,
}

impl<S: HistoryStore> Dashboard<S> {
    /// Build a dashboard. `api_key` may be absent, in which case every run
    /// fails fast with `MissingCredential` before any request is issued.
    pub fn new(api_key: Option<String>, store: S) -> Result<Self, QueryError> {
        let client = api_key.map(OpenWeatherClient::new).transpose()?;
        Ok(Self::with_client(client, store))
    }

    /// Dashboard over a pre-built client. Tests use this with a client pointed
    /// at a local mock server.
    pub fn with_client(client: Option<OpenWeatherClient>, store: S) -> Self {
        let history = match store.load() {
            Ok(entries) => SearchHistory::from_entries(entries),
            Err(err) => {
                tracing::warn!("failed to load search history: {err:#}");
                SearchHistory::default()
            }
        };

        Self {
            client,
            store,
            history,
            phase: Phase::Idle,
            view: None,
            notice: None,
            last_resolved: None,
        }
    }

    /// Explicit user search. The raw string goes into the history as typed,
    /// then the full pipeline runs.
    pub async fn search(&mut self, raw_query: &str) -> Result<&WeatherView, QueryError> {
        if raw_query.trim().is_empty() {
            let err = QueryError::InvalidInput("Please enter a city name".to_string());
            self.post_notice(NoticeKind::Error, err.user_message());
            return Err(err);
        }

        self.history.add(raw_query);
        self.persist_history();

        self.run(raw_query, false).await
    }

    /// Re-run the pipeline against the last successfully resolved city.
    ///
    /// Replays the resolver's authoritative name rather than whatever the user
    /// last typed, so refresh survives geocoder spelling corrections. With
    /// nothing resolved yet this fails without any network call.
    pub async fn refresh(&mut self) -> Result<&WeatherView, QueryError> {
        let Some(city) = self.last_resolved.clone() else {
            let err = QueryError::InvalidInput(
                "No location to refresh. Please search for a city first.".to_string(),
            );
            self.post_notice(NoticeKind::Error, err.user_message());
            return Err(err);
        };

        self.run(&city, true).await
    }

    /// Startup geolocation path: device coordinates from `provider`, reverse
    /// geocoded to a city name, then a normal search from that name. Does not
    /// touch the search history.
    pub async fn locate(&mut self, provider: &dyn LocationProvider) -> Result<&WeatherView, QueryError> {
        self.notice = None;
        self.phase = Phase::Loading;

        match self.bootstrap_city(provider).await {
            Ok(name) => self.run(&name, false).await,
            Err(err) => {
                self.phase = Phase::Failed;
                self.post_notice(NoticeKind::Error, err.user_message());
                tracing::warn!(error = %err, "geolocation bootstrap failed");
                Err(err)
            }
        }
    }

    async fn bootstrap_city(&self, provider: &dyn LocationProvider) -> Result<String, QueryError> {
        let client = self.client.as_ref().ok_or(QueryError::MissingCredential)?;
        let coords = provider.current().await?;
        let place = client
            .reverse_geocode(coords.latitude, coords.longitude)
            .await?;
        Ok(place.resolved_name)
    }

    /// One full display cycle: clear the notice, load, then publish either the
    /// view (as one atomic unit) or the mapped error.
    async fn run(&mut self, query: &str, is_refresh: bool) -> Result<&WeatherView, QueryError> {
        self.notice = None;
        self.phase = Phase::Loading;

        match self.run_pipeline(query).await {
            Ok((location, view)) => {
                self.last_resolved = Some(location.resolved_name.clone());
                self.phase = Phase::Success;
                if is_refresh {
                    self.post_notice(
                        NoticeKind::Success,
                        "Weather data refreshed successfully!".to_string(),
                    );
                }
                tracing::info!(city = %location.resolved_name, "published weather view");
                Ok(self.view.insert(view))
            }
            Err(err) => {
                // The previously published view stays visible.
                self.phase = Phase::Failed;
                self.post_notice(NoticeKind::Error, err.user_message());
                tracing::warn!(error = %err, "pipeline run failed");
                Err(err)
            }
        }
    }

    async fn run_pipeline(&self, raw_query: &str) -> Result<(Location, WeatherView), QueryError> {
        let client = self.client.as_ref().ok_or(QueryError::MissingCredential)?;
        let cleaned = clean_city_query(raw_query)?;

        let location = client.geocode_city(&cleaned).await?;
        let (current, forecast) = client.fetch_weather(&location).await?;

        let view = build_view(&current, &forecast, Local::now());
        Ok((location, view))
    }

    fn post_notice(&mut self, kind: NoticeKind, message: String) {
        // Replacing the slot restarts the auto-dismiss window.
        self.notice = Some(Notice::new(kind, message));
    }

    /// Current notice, if any and not yet expired. Expiry is cosmetic only and
    /// never affects pipeline state.
    pub fn notice(&mut self) -> Option<&Notice> {
        if self.notice.as_ref().is_some_and(Notice::is_expired) {
            self.notice = None;
        }
        self.notice.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The last successfully published view, if any.
    pub fn view(&self) -> Option<&WeatherView> {
        self.view.as_ref()
    }

    /// The city name the next refresh would replay.
    pub fn last_resolved(&self) -> Option<&str> {
        self.last_resolved.as_deref()
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    /// Drop one remembered search and rewrite the store.
    pub fn remove_from_history(&mut self, city: &str) {
        self.history.remove(city);
        self.persist_history();
    }

    fn persist_history(&self) {
        if let Err(err) = self.store.save(self.history.entries()) {
            tracing::warn!("failed to persist search history: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct MemoryStore(Rc<RefCell<Vec<String>>>);

    impl HistoryStore for MemoryStore {
        fn load(&self) -> Result<Vec<String>> {
            Ok(self.0.borrow().clone())
        }

        fn save(&self, entries: &[String]) -> Result<()> {
            *self.0.borrow_mut() = entries.to_vec();
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_credential_fails_fast() {
        let mut dashboard = Dashboard::with_client(None, MemoryStore::default());

        let err = dashboard.search("Paris").await.unwrap_err();
        assert!(matches!(err, QueryError::MissingCredential));
        assert_eq!(dashboard.phase(), Phase::Failed);

        let notice = dashboard.notice().expect("error notice posted");
        assert_eq!(notice.kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn empty_search_is_rejected_without_touching_history() {
        let mut dashboard = Dashboard::with_client(None, MemoryStore::default());

        let err = dashboard.search("   ").await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidInput(_)));
        assert!(dashboard.history().is_empty());
    }

    #[tokio::test]
    async fn search_records_the_raw_string_and_persists_it() {
        let store = MemoryStore::default();
        let mut dashboard = Dashboard::with_client(None, store.clone());

        // The run itself fails (no credential), but the history update happens
        // on submission, exactly like the original dashboard.
        let _ = dashboard.search("  New   York, NY ").await;

        assert_eq!(dashboard.history(), ["  New   York, NY "]);
        assert_eq!(*store.0.borrow(), vec!["  New   York, NY ".to_string()]);
    }

    #[tokio::test]
    async fn refresh_with_nothing_resolved_fails_without_network() {
        let mut dashboard = Dashboard::with_client(None, MemoryStore::default());

        let err = dashboard.refresh().await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidInput(_)));
        assert!(
            dashboard
                .notice()
                .expect("notice posted")
                .message
                .contains("No location to refresh")
        );
    }

    #[tokio::test]
    async fn remove_from_history_rewrites_the_store() {
        let store = MemoryStore::default();
        store
            .save(&["Oslo".to_string(), "Paris".to_string()])
            .expect("seed");

        let mut dashboard = Dashboard::with_client(None, store.clone());
        dashboard.remove_from_history("Oslo");

        assert_eq!(dashboard.history(), ["Paris"]);
        assert_eq!(*store.0.borrow(), vec!["Paris".to_string()]);
    }

    #[test]
    fn notice_expires_after_the_ttl() {
        let notice = Notice::new(NoticeKind::Success, "done".to_string());

        assert!(!notice.is_expired_at(notice.posted_at));
        assert!(!notice.is_expired_at(notice.posted_at + NOTICE_TTL - Duration::from_millis(1)));
        assert!(notice.is_expired_at(notice.posted_at + NOTICE_TTL));
    }

    #[test]
    fn posting_a_new_notice_restarts_the_window() {
        let mut dashboard = Dashboard::with_client(None, MemoryStore::default());

        dashboard.post_notice(NoticeKind::Error, "first".to_string());
        let first_posted = dashboard.notice.as_ref().map(|n| n.posted_at);

        dashboard.post_notice(NoticeKind::Success, "second".to_string());
        let second = dashboard.notice.as_ref().expect("replaced");

        assert_eq!(second.message, "second");
        assert!(Some(second.posted_at) >= first_posted);
    }
}
