//! Abandoned operations roll back; updates revalidate the stored record.

use std::time::Duration;

use rstest::rstest;
use taskmgr::task::{
    domain::{NewTask, TaskDomainError, TaskField, TaskId, TaskPatch, TaskStatus},
    ports::TaskRepositoryError,
};
use uuid::Uuid;

use super::helpers::{PostgresCluster, postgres_cluster, prepared_repo};

/// How long each clock reading is held while the caller gives up.
const STALL: Duration = Duration::from_millis(500);
const GIVE_UP_AFTER: Duration = Duration::from_millis(50);

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "starts an embedded PostgreSQL cluster"]
async fn abandoned_update_leaves_row_unchanged(
    postgres_cluster: eyre::Result<PostgresCluster>,
) -> eyre::Result<()> {
    let context = prepared_repo(postgres_cluster).await?;
    let repository = context.session().await?;
    let created = repository.create(NewTask::new("name", "text")).await?;

    context.clock.stall_for(STALL);
    let abandoned = tokio::time::timeout(
        GIVE_UP_AFTER,
        repository.update(created.id(), TaskPatch::new().with_name("renamed")),
    )
    .await;
    context.clock.stall_for(Duration::ZERO);
    assert!(abandoned.is_err(), "update finished before the caller gave up");

    // The session's connection is released only once the abandoned
    // transaction has ended, so this read observes its outcome.
    assert_eq!(
        repository.get_by_id(created.id()).await?,
        Some(created.clone())
    );
    let other = context.session().await?;
    assert_eq!(other.get_by_id(created.id()).await?, Some(created));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "starts an embedded PostgreSQL cluster"]
async fn abandoned_create_inserts_nothing(
    postgres_cluster: eyre::Result<PostgresCluster>,
) -> eyre::Result<()> {
    let context = prepared_repo(postgres_cluster).await?;
    let repository = context.session().await?;
    let id = TaskId::new();

    context.clock.stall_for(STALL);
    let abandoned = tokio::time::timeout(
        GIVE_UP_AFTER,
        repository.create(NewTask::new("name", "text").with_id(id)),
    )
    .await;
    context.clock.stall_for(Duration::ZERO);
    assert!(abandoned.is_err(), "create finished before the caller gave up");

    assert_eq!(repository.get_by_id(id).await?, None);
    assert!(repository.get_all().await?.is_empty());

    let retried = repository.create(NewTask::new("name", "text").with_id(id)).await?;
    assert_eq!(retried.id(), id);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "starts an embedded PostgreSQL cluster"]
async fn patch_repeating_current_values_only_advances_updated_at(
    postgres_cluster: eyre::Result<PostgresCluster>,
) -> eyre::Result<()> {
    let context = prepared_repo(postgres_cluster).await?;
    let repository = context.session().await?;
    let created = repository
        .create(NewTask::new("name", "text").with_status(TaskStatus::Processing))
        .await?;

    let updated = repository
        .update(
            created.id(),
            TaskPatch::new()
                .with_name("name")
                .with_text("text")
                .with_status(TaskStatus::Processing),
        )
        .await?;

    assert_eq!(updated.id(), created.id());
    assert_eq!(updated.name(), created.name());
    assert_eq!(updated.text(), created.text());
    assert_eq!(updated.status(), created.status());
    assert_eq!(updated.created_at(), created.created_at());
    assert!(updated.updated_at() > created.updated_at());
    assert_eq!(repository.get_by_id(created.id()).await?, Some(updated));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "starts an embedded PostgreSQL cluster"]
async fn status_update_over_blank_stored_text_is_rejected(
    postgres_cluster: eyre::Result<PostgresCluster>,
) -> eyre::Result<()> {
    let context = prepared_repo(postgres_cluster).await?;
    let raw_id = Uuid::new_v4();
    context
        .database
        .execute(format!(
            "INSERT INTO tasks (id, name, text, status) \
             VALUES ('{raw_id}', 'stored', '', 'created')"
        ))
        .await?;
    let repository = context.session().await?;
    let id = TaskId::from_uuid(raw_id);

    let result = repository
        .update(id, TaskPatch::new().with_status(TaskStatus::Processing))
        .await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::Validation(TaskDomainError::BlankField(TaskField::Text)))
    ));
    let stored = repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| eyre::eyre!("stored row disappeared"))?;
    assert_eq!(stored.status(), TaskStatus::Created);
    assert_eq!(stored.text(), "");
    Ok(())
}
