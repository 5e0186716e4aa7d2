use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use lambda_runtime::{tracing, Error, LambdaEvent};
use percent_encoding::percent_decode_str;

use crate::config::HandlerConfig;
use crate::convert::csv_to_parquet;
use crate::error::ArchiveError;
use crate::storage::{Existence, ObjectStore};

/// What one invocation did with its object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Key outside the incoming prefix or without the source extension.
    Ignored,
    /// Destination already existed; only the source was deleted.
    AlreadyProcessed { destination: String },
    Converted { destination: String, rows: usize },
}

fn first_record(event: &S3Event) -> Option<&S3EventRecord> {
    let record = event.records.first()?;
    if event.records.len() > 1 {
        tracing::warn!(
            "S3 event has {} records, only the first is processed",
            event.records.len()
        );
    }
    Some(record)
}

/// Decodes a form-encoded S3 notification key; `None` if it is not UTF-8.
fn decode_key(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(|key| key.into_owned())
}

pub(crate) fn is_eligible(config: &HandlerConfig, key: &str) -> bool {
    key.starts_with(&config.incoming_prefix) && key.ends_with(&config.source_extension)
}

/// Maps a source key to its archive key by plain substring replacement.
///
/// Every occurrence of the incoming prefix and of the source extension is
/// replaced, wherever it appears in the key.
pub(crate) fn destination_key(config: &HandlerConfig, key: &str) -> String {
    key.replace(&config.incoming_prefix, &config.archive_prefix)
        .replace(&config.source_extension, &config.target_extension)
}

/// Converts `key` to the archive format and removes the original.
///
/// Safe to call again for the same key: once the destination exists the
/// source is only deleted.
pub(crate) async fn archive_object(
    store: &dyn ObjectStore,
    config: &HandlerConfig,
    bucket: &str,
    key: &str,
) -> Result<Outcome, ArchiveError> {
    if !is_eligible(config, key) {
        return Ok(Outcome::Ignored);
    }

    let destination = destination_key(config, key);

    if store.exists(bucket, &destination).await == Existence::Found {
        store.delete(bucket, key).await?;
        return Ok(Outcome::AlreadyProcessed { destination });
    }

    let csv = store.get(bucket, key).await?;
    let converted = csv_to_parquet(&csv)?;
    store.put(bucket, &destination, converted.parquet).await?;
    store.delete(bucket, key).await?;

    Ok(Outcome::Converted {
        destination,
        rows: converted.rows,
    })
}

pub(crate) async fn function_handler(
    event: LambdaEvent<S3Event>,
    store: &dyn ObjectStore,
    config: &HandlerConfig,
) -> Result<(), Error> {
    let payload = event.payload;
    let Some(record) = first_record(&payload) else {
        tracing::warn!("No records found in S3 event");
        return Ok(());
    };
    let Some(raw_key) = record.s3.object.key.as_deref() else {
        tracing::warn!("S3 event record has no object key");
        return Ok(());
    };
    let Some(key) = decode_key(raw_key) else {
        tracing::debug!("Ignoring undecodable key {}", raw_key);
        return Ok(());
    };
    if !is_eligible(config, &key) {
        tracing::debug!("Ignoring {}", key);
        return Ok(());
    }
    let bucket = config
        .bucket
        .as_deref()
        .or(record.s3.bucket.name.as_deref())
        .ok_or(ArchiveError::MissingBucket)?;

    match archive_object(store, config, bucket, &key).await? {
        Outcome::Ignored => tracing::debug!("Ignoring {}/{}", bucket, key),
        Outcome::AlreadyProcessed { destination } => {
            tracing::info!("{}: already processed as {}", key, destination)
        }
        Outcome::Converted { destination, rows } => {
            tracing::info!("{} -> {} ({} rows)", key, destination, rows)
        }
    }
    Ok(())
}
