//! Conversion worker binary.
//!
//! Runs one point-to-polygon conversion job to completion:
//!
//! ```text
//! ptp-worker <volume-id> <user-id>
//! ```
//!
//! The volume's point annotations are converted to polygons and the given
//! user is attributed on the created labels and notified of the outcome.
//! Admission is guarded by the volume's job marker, so starting a second
//! worker for the same volume fails fast.

use anyhow::{bail, Context};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ptp_core::types::DbId;
use ptp_core::PtpConfig;
use ptp_db::repositories::{UserRepo, VolumeRepo};
use ptp_events::{EmailConfig, EmailNotifier, LogNotifier, Notifier};
use ptp_pipeline::{DiskFetcher, LogHook, PtpJob};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ptp_worker=debug,ptp_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(volume_arg), Some(user_arg)) = (args.next(), args.next()) else {
        bail!("usage: ptp-worker <volume-id> <user-id>");
    };
    let volume_id: DbId = volume_arg.parse().context("volume id must be an integer")?;
    let user_id: DbId = user_arg.parse().context("user id must be an integer")?;

    let config = PtpConfig::from_env();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to the database")?;
    ptp_db::health_check(&pool)
        .await
        .context("database health check failed")?;

    let Some(volume) = VolumeRepo::find_by_id(&pool, volume_id).await? else {
        bail!("volume {volume_id} does not exist");
    };
    let Some(user) = UserRepo::find_by_id(&pool, user_id).await? else {
        bail!("user {user_id} does not exist");
    };

    let job_id = uuid::Uuid::new_v4();
    if !VolumeRepo::try_set_ptp_job(&pool, volume.id, &job_id.to_string()).await? {
        bail!(
            "volume {} already has a conversion job in flight",
            volume.id
        );
    }

    let notifier: Box<dyn Notifier> = match EmailConfig::from_env() {
        Some(email_config) => Box::new(EmailNotifier::new(email_config)),
        None => {
            tracing::warn!("SMTP_HOST not set, job notifications go to the log only");
            Box::new(LogNotifier)
        }
    };

    // Volume images live in a per-volume directory under the storage root.
    let fetcher = DiskFetcher::new(config.storage_root.join(volume.id.to_string()));

    PtpJob::new(volume, user, job_id, config)
        .handle(&pool, &fetcher, notifier.as_ref(), &LogHook)
        .await?;
    Ok(())
}
