//! Repository contract against a live database.

use rstest::rstest;
use taskmgr::task::{
    domain::{NewTask, TaskId, TaskPatch, TaskStatus},
    ports::TaskRepositoryError,
};

use super::helpers::{PostgresCluster, postgres_cluster, prepared_repo};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "starts an embedded PostgreSQL cluster"]
async fn create_then_get_returns_stored_task(
    postgres_cluster: eyre::Result<PostgresCluster>,
) -> eyre::Result<()> {
    let context = prepared_repo(postgres_cluster).await?;
    let repository = context.session().await?;

    let created = repository
        .create(NewTask::new("  write report ", "quarterly"))
        .await?;
    let fetched = repository.get_by_id(created.id()).await?;

    assert_eq!(created.name(), "write report");
    assert_eq!(created.status(), TaskStatus::Created);
    assert_eq!(created.created_at(), created.updated_at());
    assert_eq!(fetched.as_ref(), Some(&created));
    assert_eq!(repository.get_all().await?, vec![created]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "starts an embedded PostgreSQL cluster"]
async fn list_is_ordered_by_creation(
    postgres_cluster: eyre::Result<PostgresCluster>,
) -> eyre::Result<()> {
    let context = prepared_repo(postgres_cluster).await?;
    let repository = context.session().await?;

    let first = repository.create(NewTask::new("first", "text")).await?;
    let second = repository.create(NewTask::new("second", "text")).await?;
    let third = repository.create(NewTask::new("third", "text")).await?;

    assert_eq!(repository.get_all().await?, vec![first, second, third]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "starts an embedded PostgreSQL cluster"]
async fn update_writes_patch_and_advances_timestamp(
    postgres_cluster: eyre::Result<PostgresCluster>,
) -> eyre::Result<()> {
    let context = prepared_repo(postgres_cluster).await?;
    let repository = context.session().await?;
    let created = repository.create(NewTask::new("name", "text")).await?;

    let updated = repository
        .update(
            created.id(),
            TaskPatch::new().with_status(TaskStatus::Processing),
        )
        .await?;

    assert_eq!(updated.name(), "name");
    assert_eq!(updated.text(), "text");
    assert_eq!(updated.status(), TaskStatus::Processing);
    assert_eq!(updated.created_at(), created.created_at());
    assert!(updated.updated_at() > created.updated_at());
    assert_eq!(repository.get_by_id(created.id()).await?, Some(updated));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "starts an embedded PostgreSQL cluster"]
async fn update_reports_missing_before_empty_patch(
    postgres_cluster: eyre::Result<PostgresCluster>,
) -> eyre::Result<()> {
    let context = prepared_repo(postgres_cluster).await?;
    let repository = context.session().await?;

    let missing = repository.update(TaskId::new(), TaskPatch::new()).await;
    assert!(matches!(missing, Err(TaskRepositoryError::NotFound(_))));

    let created = repository.create(NewTask::new("name", "text")).await?;
    let empty = repository.update(created.id(), TaskPatch::new()).await;
    assert!(matches!(empty, Err(TaskRepositoryError::EmptyUpdate)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "starts an embedded PostgreSQL cluster"]
async fn duplicate_identifier_is_rejected(
    postgres_cluster: eyre::Result<PostgresCluster>,
) -> eyre::Result<()> {
    let context = prepared_repo(postgres_cluster).await?;
    let repository = context.session().await?;
    let id = TaskId::new();
    let original = repository
        .create(NewTask::new("first", "text").with_id(id))
        .await?;

    let duplicate = repository
        .create(NewTask::new("second", "text").with_id(id))
        .await;

    assert!(matches!(duplicate, Err(TaskRepositoryError::DuplicateTask(dup)) if dup == id));
    assert_eq!(repository.get_by_id(id).await?, Some(original));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "starts an embedded PostgreSQL cluster"]
async fn delete_removes_row(postgres_cluster: eyre::Result<PostgresCluster>) -> eyre::Result<()> {
    let context = prepared_repo(postgres_cluster).await?;
    let repository = context.session().await?;
    let created = repository.create(NewTask::new("name", "text")).await?;

    assert!(repository.delete(created.id()).await?);
    assert_eq!(repository.get_by_id(created.id()).await?, None);
    assert!(matches!(
        repository.delete(created.id()).await,
        Err(TaskRepositoryError::NotFound(_))
    ));
    Ok(())
}
