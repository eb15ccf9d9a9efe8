//! Defines configuration as read from the environment.

use serde::Deserialize;

/// The bridge is configured to pull CSV files from one S3 bucket,
/// convert them, and push JSON documents to another, notifying an SNS
/// topic on each success. The configuration must be given as
/// environment variables; all three are required, so a missing one
/// makes initialization fail and the process exit.
#[derive(Deserialize)]
pub struct Settings {
    /// The bucket that receives CSV uploads and whose creation events
    /// trigger the function.
    pub csv_bucket: String,

    /// The bucket that receives the converted JSON documents.
    pub json_bucket: String,

    /// The ARN of the SNS topic notified after each successful
    /// conversion.
    pub sns_topic_arn: String,
}
