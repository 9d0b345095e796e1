//! Google Calendar integration.
//!
//! Reads existing events as busy periods and inserts planned tasks as new
//! events, through the Calendar v3 REST API with a bearer token.

use chrono::{DateTime, FixedOffset, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use super::keyring_store;
use super::traits::{AssignmentSink, BusySource, PersistedEvent};
use crate::error::IntegrationError;
use crate::scheduler::ScheduledAssignment;
use crate::storage::Config;
use crate::timeline::{BusyInterval, TimeInterval};

const SERVICE: &str = "google";
const TOKEN_KEY: &str = "google_access_token";
const TOKEN_ENV: &str = "SLOTWISE_GOOGLE_TOKEN";

/// Google Calendar REST client.
#[derive(Clone)]
pub struct GoogleCalendar {
    client: Client,
    api_base: String,
    token: String,
    /// Offset new events are written in
    offset: FixedOffset,
}

impl GoogleCalendar {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            token: token.into(),
            offset,
        }
    }

    /// Build a client from configuration and the stored access token.
    pub fn from_config(config: &Config) -> Result<Self, IntegrationError> {
        let offset = config
            .working_day()
            .map_err(|e| IntegrationError::Parse {
                source_name: "config".to_string(),
                message: e.to_string(),
            })?
            .offset;
        Ok(Self::new(&config.calendar.api_base, access_token()?, offset))
    }

    /// Persist an access token to the OS keyring.
    pub fn store_token(token: &str) -> Result<(), IntegrationError> {
        keyring_store::set(TOKEN_KEY, token).map_err(credentials_error)
    }

    /// Remove the stored access token.
    pub fn clear_token() -> Result<(), IntegrationError> {
        keyring_store::delete(TOKEN_KEY).map_err(credentials_error)
    }

    /// Whether a token is available from the environment or the keyring.
    pub fn has_token() -> bool {
        access_token().is_ok()
    }

    /// A busy source reading `calendar_id`.
    pub fn busy_source(&self, calendar_id: impl Into<String>) -> GoogleBusySource {
        GoogleBusySource {
            calendar: self.clone(),
            calendar_id: calendar_id.into(),
        }
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, IntegrationError> {
        let mut url = Url::parse(&self.api_base)?;
        url.path_segments_mut()
            .map_err(|_| IntegrationError::Parse {
                source_name: SERVICE.to_string(),
                message: format!("api base '{}' cannot carry a path", self.api_base),
            })?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }

    /// List timed, opaque events of `calendar_id` overlapping `window`.
    ///
    /// All-day, transparent ("show as available") and cancelled events are
    /// skipped. Follows `nextPageToken` until exhausted.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        window: &TimeInterval,
    ) -> Result<Vec<BusyInterval>, IntegrationError> {
        let mut busy = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.events_url(calendar_id)?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("timeMin", &window.start().to_rfc3339())
                    .append_pair("timeMax", &window.end().to_rfc3339())
                    .append_pair("singleEvents", "true")
                    .append_pair("orderBy", "startTime");
                if let Some(ref token) = page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let resp = self.send(self.client.get(url)).await?;

            let items = resp["items"].as_array().ok_or_else(|| IntegrationError::Parse {
                source_name: SERVICE.to_string(),
                message: "missing items in response".to_string(),
            })?;

            for item in items {
                if let Some(interval) = parse_busy_item(item)? {
                    busy.push(interval);
                }
            }

            match resp["nextPageToken"].as_str() {
                Some(next) => page_token = Some(next.to_string()),
                None => break,
            }
        }

        tracing::info!(calendar = calendar_id, events = busy.len(), "calendar events fetched");
        Ok(busy)
    }

    /// Insert an event and return its id and link.
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        assignment: &ScheduledAssignment,
    ) -> Result<PersistedEvent, IntegrationError> {
        let interval = assignment.interval();
        let mut body = json!({
            "summary": assignment.title(),
            "start": { "dateTime": self.local(interval.start()) },
            "end": { "dateTime": self.local(interval.end()) },
        });
        let notes = assignment.task().notes.trim();
        if !notes.is_empty() {
            body["description"] = Value::String(notes.to_string());
        }

        let url = self.events_url(calendar_id)?;
        let resp = self.send(self.client.post(url).json(&body)).await?;

        let event_id = resp["id"]
            .as_str()
            .ok_or_else(|| IntegrationError::Parse {
                source_name: SERVICE.to_string(),
                message: "missing event id in response".to_string(),
            })?
            .to_string();

        tracing::info!(
            calendar = calendar_id,
            event_id = %event_id,
            title = assignment.title(),
            "event created"
        );

        Ok(PersistedEvent {
            calendar_id: calendar_id.to_string(),
            event_id,
            html_link: resp["htmlLink"].as_str().map(String::from),
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, IntegrationError> {
        let resp = request.bearer_auth(&self.token).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        // proxies answer with HTML, so a non-JSON body is not an error by itself
        let body = serde_json::from_str::<Value>(&text).ok();

        if let Some(err) = body.as_ref().and_then(|b| b.get("error")) {
            let message = err["message"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| err.to_string());
            return Err(IntegrationError::Api {
                service: SERVICE.to_string(),
                message,
            });
        }
        if !status.is_success() {
            return Err(IntegrationError::Api {
                service: SERVICE.to_string(),
                message: format!("unexpected status {status}"),
            });
        }
        body.ok_or_else(|| IntegrationError::Parse {
            source_name: SERVICE.to_string(),
            message: "response body is not JSON".to_string(),
        })
    }

    fn local(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).to_rfc3339()
    }
}

impl AssignmentSink for GoogleCalendar {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn persist(
        &self,
        calendar_id: &str,
        assignment: &ScheduledAssignment,
    ) -> Result<PersistedEvent, IntegrationError> {
        self.insert_event(calendar_id, assignment).await
    }
}

/// Busy periods from one Google calendar.
#[derive(Clone)]
pub struct GoogleBusySource {
    calendar: GoogleCalendar,
    calendar_id: String,
}

impl BusySource for GoogleBusySource {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn fetch_busy(&self, window: &TimeInterval) -> Result<Vec<BusyInterval>, IntegrationError> {
        self.calendar.list_events(&self.calendar_id, window).await
    }
}

fn parse_busy_item(item: &Value) -> Result<Option<BusyInterval>, IntegrationError> {
    if item["status"].as_str() == Some("cancelled")
        || item["transparency"].as_str() == Some("transparent")
    {
        return Ok(None);
    }

    let (Some(start), Some(end)) = (
        item["start"]["dateTime"].as_str(),
        item["end"]["dateTime"].as_str(),
    ) else {
        // all-day events only carry `date`
        return Ok(None);
    };

    let parse = |raw: &str| {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| IntegrationError::Parse {
                source_name: SERVICE.to_string(),
                message: format!("invalid event time '{raw}': {e}"),
            })
    };

    let interval = TimeInterval::new(parse(start)?, parse(end)?).map_err(|e| {
        IntegrationError::Parse {
            source_name: SERVICE.to_string(),
            message: e.to_string(),
        }
    })?;

    let mut busy = BusyInterval::new(interval);
    busy.summary = item["summary"].as_str().map(String::from);
    Ok(Some(busy))
}

fn access_token() -> Result<String, IntegrationError> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            return Ok(token.trim().to_string());
        }
    }
    keyring_store::get(TOKEN_KEY)
        .map_err(credentials_error)?
        .ok_or_else(|| IntegrationError::Credentials {
            service: SERVICE.to_string(),
            message: format!("no token stored; run `slotwise auth set-token` or set {TOKEN_ENV}"),
        })
}

fn credentials_error(err: keyring::Error) -> IntegrationError {
    IntegrationError::Credentials {
        service: SERVICE.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::persist_with_fallback;
    use crate::task::Task;
    use chrono::{Duration, TimeZone};
    use mockito::Matcher;

    fn brisbane() -> FixedOffset {
        FixedOffset::east_opt(10 * 3600).unwrap()
    }

    fn window() -> TimeInterval {
        TimeInterval::new(
            Utc.with_ymd_and_hms(2025, 3, 9, 23, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 10, 7, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn assignment() -> ScheduledAssignment {
        let task = Task::new("Write research report")
            .unwrap()
            .with_notes("section 2")
            .with_estimated_duration(Duration::minutes(90));
        let interval = TimeInterval::starting_at(window().start(), Duration::minutes(90)).unwrap();
        ScheduledAssignment::new(task, interval)
    }

    #[tokio::test]
    async fn test_lists_timed_events_across_pages() {
        let mut server = mockito::Server::new_async().await;

        let first = server
            .mock("GET", "/calendars/primary/events")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("singleEvents".into(), "true".into()),
                Matcher::UrlEncoded("orderBy".into(), "startTime".into()),
            ]))
            .match_header("authorization", "Bearer tok")
            .with_body(
                json!({
                    "items": [
                        {"summary": "Standup",
                         "start": {"dateTime": "2025-03-10T10:00:00+10:00"},
                         "end": {"dateTime": "2025-03-10T10:30:00+10:00"}},
                        {"summary": "Holiday",
                         "start": {"date": "2025-03-10"},
                         "end": {"date": "2025-03-11"}},
                        {"summary": "Focus (free)", "transparency": "transparent",
                         "start": {"dateTime": "2025-03-10T11:00:00+10:00"},
                         "end": {"dateTime": "2025-03-10T12:00:00+10:00"}}
                    ],
                    "nextPageToken": "p2"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let second = server
            .mock("GET", "/calendars/primary/events")
            .match_query(Matcher::UrlEncoded("pageToken".into(), "p2".into()))
            .with_body(
                json!({
                    "items": [
                        {"start": {"dateTime": "2025-03-10T13:00:00+10:00"},
                         "end": {"dateTime": "2025-03-10T14:00:00+10:00"}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let calendar = GoogleCalendar::new(server.url(), "tok", brisbane());
        let busy = calendar.busy_source("primary").fetch_busy(&window()).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(busy.len(), 2);
        assert_eq!(busy[0].summary.as_deref(), Some("Standup"));
        assert_eq!(busy[0].interval.duration_minutes(), 30);
        assert!(busy[1].summary.is_none());
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/calendars/primary/events")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#)
            .create_async()
            .await;

        let calendar = GoogleCalendar::new(server.url(), "stale", brisbane());
        let err = calendar.list_events("primary", &window()).await.unwrap_err();
        match err {
            IntegrationError::Api { message, .. } => assert_eq!(message, "Invalid Credentials"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_reports_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/calendars/primary/events")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_header("content-type", "text/html")
            .with_body("<html><body>Bad Gateway</body></html>")
            .create_async()
            .await;

        let calendar = GoogleCalendar::new(server.url(), "token", brisbane());
        let err = calendar.list_events("primary", &window()).await.unwrap_err();
        match err {
            IntegrationError::Api { message, .. } => assert!(message.contains("502")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_inserts_event_in_local_offset() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/calendars/team/events")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "summary": "Write research report",
                "description": "section 2",
                "start": {"dateTime": "2025-03-10T09:00:00+10:00"},
                "end": {"dateTime": "2025-03-10T10:30:00+10:00"}
            })))
            .with_body(r#"{"id":"evt1","htmlLink":"https://calendar.example/evt1"}"#)
            .create_async()
            .await;

        let calendar = GoogleCalendar::new(server.url(), "tok", brisbane());
        let event = calendar.persist("team", &assignment()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(event.calendar_id, "team");
        assert_eq!(event.event_id, "evt1");
        assert_eq!(event.html_link.as_deref(), Some("https://calendar.example/evt1"));
    }

    #[tokio::test]
    async fn test_falls_back_to_second_calendar() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/calendars/team/events")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"Forbidden"}}"#)
            .create_async()
            .await;
        let fallback = server
            .mock("POST", "/calendars/primary/events")
            .match_query(Matcher::Any)
            .with_body(r#"{"id":"evt2"}"#)
            .create_async()
            .await;

        let calendar = GoogleCalendar::new(server.url(), "tok", brisbane());
        let event = persist_with_fallback(&calendar, "team", Some("primary"), &assignment())
            .await
            .unwrap();

        fallback.assert_async().await;
        assert_eq!(event.calendar_id, "primary");
        assert!(event.html_link.is_none());
    }

    #[test]
    fn test_api_base_with_path_is_extended() {
        let calendar = GoogleCalendar::new(
            "https://www.googleapis.com/calendar/v3",
            "tok",
            brisbane(),
        );
        assert_eq!(
            calendar.events_url("primary").unwrap().as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/primary/events"
        );
    }
}
