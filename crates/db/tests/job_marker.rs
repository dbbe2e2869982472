//! Job marker bookkeeping on the volume attribute bag.

use sqlx::PgPool;

use ptp_db::repositories::VolumeRepo;

async fn create_volume(pool: &PgPool, name: &str) -> i64 {
    let row: (i64,) = sqlx::query_as("INSERT INTO volumes (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn marker_acquired_when_absent(pool: PgPool) {
    let volume_id = create_volume(&pool, "vol").await;

    let acquired = VolumeRepo::try_set_ptp_job(&pool, volume_id, "job-1")
        .await
        .unwrap();
    assert!(acquired);

    let volume = VolumeRepo::find_by_id(&pool, volume_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(volume.ptp_job_id(), Some("job-1"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_acquisition_rejected(pool: PgPool) {
    let volume_id = create_volume(&pool, "vol").await;

    assert!(VolumeRepo::try_set_ptp_job(&pool, volume_id, "job-1")
        .await
        .unwrap());
    assert!(!VolumeRepo::try_set_ptp_job(&pool, volume_id, "job-2")
        .await
        .unwrap());

    // The first job still owns the marker.
    let volume = VolumeRepo::find_by_id(&pool, volume_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(volume.ptp_job_id(), Some("job-1"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acquisition_preserves_other_attrs(pool: PgPool) {
    let volume_id = create_volume(&pool, "vol").await;
    sqlx::query("UPDATE volumes SET attrs = '{\"doi\": \"10.1000/xyz\"}'::jsonb WHERE id = $1")
        .bind(volume_id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(VolumeRepo::try_set_ptp_job(&pool, volume_id, "job-1")
        .await
        .unwrap());
    assert_eq!(
        VolumeRepo::clear_ptp_job(&pool, "job-1").await.unwrap(),
        1
    );

    let volume = VolumeRepo::find_by_id(&pool, volume_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(volume.ptp_job_id(), None);
    assert_eq!(
        volume.attrs.unwrap().get("doi").and_then(|v| v.as_str()),
        Some("10.1000/xyz")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clear_is_idempotent(pool: PgPool) {
    let volume_id = create_volume(&pool, "vol").await;
    VolumeRepo::try_set_ptp_job(&pool, volume_id, "job-1")
        .await
        .unwrap();

    assert_eq!(VolumeRepo::clear_ptp_job(&pool, "job-1").await.unwrap(), 1);
    // Clearing again must not error and must leave the marker absent.
    assert_eq!(VolumeRepo::clear_ptp_job(&pool, "job-1").await.unwrap(), 0);

    let volume = VolumeRepo::find_by_id(&pool, volume_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(volume.ptp_job_id(), None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_job_cannot_clear_newer_marker(pool: PgPool) {
    let volume_id = create_volume(&pool, "vol").await;
    VolumeRepo::try_set_ptp_job(&pool, volume_id, "job-new")
        .await
        .unwrap();

    // A straggler finishing with an older job id must not touch the marker.
    assert_eq!(VolumeRepo::clear_ptp_job(&pool, "job-old").await.unwrap(), 0);

    let volume = VolumeRepo::find_by_id(&pool, volume_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(volume.ptp_job_id(), Some("job-new"));
}
