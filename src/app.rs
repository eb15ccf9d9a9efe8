//! Defines the read-only application state and the per-invocation
//! pipeline: interpret the event, filter for CSV keys, fetch the
//! object, convert it, store the result, and notify.

use crate::client::{load_aws_config, Notifier, ObjectStore, S3ObjectStore, SnsNotifier};
use crate::conf::Settings;
use crate::convert::convert;
use crate::trigger::TriggerEvent;
use anyhow::{anyhow, Context, Result};
use envy::from_env;
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

/// The subject line of every completion notification.
const NOTIFICATION_SUBJECT: &str = "CSV to JSON Conversion Completed";

/// The HTTP-style result returned to the invoking runtime. Not
/// persisted anywhere; one terminal status and a one-line message per
/// invocation.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: String,
}

impl Response {
    /// The whole pipeline ran through.
    pub fn success(csv_key: &str) -> Self {
        Self {
            status_code: 200,
            body: format!("Successfully processed {}", csv_key),
        }
    }

    /// The object isn't a CSV file; not an error.
    pub fn skipped() -> Self {
        Self {
            status_code: 200,
            body: String::from("Not a CSV file"),
        }
    }

    /// The event doesn't have the recognized shape.
    pub fn client_error() -> Self {
        Self {
            status_code: 400,
            body: String::from("Invalid event format"),
        }
    }

    /// Some step between fetch and notify faulted.
    pub fn server_error(csv_key: &str) -> Self {
        Self {
            status_code: 500,
            body: format!("Error processing {}", csv_key),
        }
    }
}

/// Derives the destination key from a source key: the trailing `.csv`
/// becomes `.json`. Returns `None` when the suffix doesn't match, so
/// a `.csv` appearing elsewhere in the key can never be touched.
pub fn json_key(csv_key: &str) -> Option<String> {
    csv_key
        .strip_suffix(".csv")
        .map(|stem| format!("{}.json", stem))
}

/// An App is an initialized application state: the settings plus the
/// storage and notification collaborators, injected at construction
/// so tests can substitute fakes.
pub struct App<S, N> {
    /// The original settings.
    pub settings: Settings,

    store: S,

    notifier: N,
}

impl<S: ObjectStore, N: Notifier> App<S, N> {
    /// Initialize an App instance given a settings struct and the two
    /// collaborators. Consumes all three.
    pub fn new(settings: Settings, store: S, notifier: N) -> Self {
        App {
            settings,
            store,
            notifier,
        }
    }

    /// Handle one invocation trigger. Unrecognized events and
    /// non-CSV keys return early; every other fault is caught here,
    /// logged with the offending key, and reported as a 500.
    #[instrument(skip(self, event))]
    pub async fn handle(&self, event: &Value) -> Response {
        let Some(csv_key) = TriggerEvent::object_key(event) else {
            warn!("Unexpected event format: {}", event);
            return Response::client_error();
        };

        let Some(json_key) = json_key(&csv_key) else {
            info!("Skipping non-CSV file: {}", csv_key);
            return Response::skipped();
        };

        match self.process(&csv_key, &json_key).await {
            Ok(()) => Response::success(&csv_key),
            Err(e) => {
                error!("Error processing file {}: {:?}", csv_key, e);
                Response::server_error(&csv_key)
            }
        }
    }

    /// Run the fetch, convert, store, notify sequence for one CSV
    /// object. Any error aborts the rest of the sequence; a partial
    /// write is not rolled back.
    async fn process(&self, csv_key: &str, json_key: &str) -> Result<()> {
        let content = self
            .store
            .fetch(&self.settings.csv_bucket, csv_key)
            .await?;
        let csv_text = String::from_utf8(content)
            .with_context(|| format!("Object {:?} is not valid UTF-8 text", csv_key))?;

        let json_text = convert(&csv_text)
            .with_context(|| format!("Failed to convert object {:?}", csv_key))?;

        self.store
            .store(
                &self.settings.json_bucket,
                json_key,
                json_text.into_bytes(),
                "application/json",
            )
            .await?;
        info!(
            "Converted {} to {} and uploaded to {}",
            csv_key, json_key, self.settings.json_bucket
        );

        let message = format!(
            "CSV file has been successfully converted and uploaded as {} in {}.",
            json_key, self.settings.json_bucket
        );
        self.notifier
            .publish(
                &self.settings.sns_topic_arn,
                NOTIFICATION_SUBJECT,
                &message,
            )
            .await?;
        Ok(())
    }
}

/// Global App instance.
static CURRENT: OnceCell<App<S3ObjectStore, SnsNotifier>> = OnceCell::new();

/// Initialize the global App instance with the AWS-backed
/// collaborators.
pub async fn init() -> Result<()> {
    let settings = from_env().context("Failed to load settings from the environment")?;
    let config = load_aws_config().await;
    let app = App::new(
        settings,
        S3ObjectStore::new(&config),
        SnsNotifier::new(&config),
    );
    CURRENT
        .set(app)
        .map_err(|_| anyhow!("app::CURRENT was already initialized"))
}

/// Get the current App instance, or panic if it hasn't been
/// initialized.
pub fn current() -> &'static App<S3ObjectStore, SnsNotifier> {
    CURRENT.get().expect("app is not initialized")
}
