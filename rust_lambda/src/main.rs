use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{run, service_fn, tracing, Error};
mod config;
mod convert;
mod error;
mod event_handler;
mod storage;
use config::HandlerConfig;
use event_handler::function_handler;
use storage::S3Store;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::subscriber::fmt().json().init();
    let handler_config = HandlerConfig::from_env()?;
    tracing::info!(?handler_config, "loaded handler configuration");
    let shared_config = aws_config::load_defaults(BehaviorVersion::v2025_01_17()).await;
    let store = S3Store::new(S3Client::new(&shared_config));
    run(service_fn(|event| function_handler(event, &store, &handler_config))).await
}
