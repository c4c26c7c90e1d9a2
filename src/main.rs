mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use tickler_core::job_schedulers::{start_sync_job, SyncJobRunner};
use tickler_infra::{
    run_migration, setup_context, GoogleAuthProvider, GoogleCalendarFeedProvider, IPromptSink,
    WebhookPromptSink,
};

use telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("tickler".into(), "info".into());
    init_subscriber(subscriber);

    run_migration()
        .await
        .context("Failed to run database migrations")?;
    let context = setup_context().await;

    let auth = Arc::new(GoogleAuthProvider::from_env()?);
    let provider = Arc::new(GoogleCalendarFeedProvider::new(auth));
    let webhook_url = context
        .config
        .prompt_webhook_url
        .clone()
        .context("PROMPT_WEBHOOK_URL env var to be present")?;
    let sink: Arc<dyn IPromptSink> = Arc::new(WebhookPromptSink::new(webhook_url));

    let runner = Arc::new(SyncJobRunner::new(context, provider, sink));
    start_sync_job(runner).await?;

    Ok(())
}
