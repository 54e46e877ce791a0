//! Unit tests for the admin review lock.

use labelflow::models::project::Project;
use labelflow::persistence::db;
use labelflow::persistence::lock_repo::LockRepo;
use labelflow::persistence::project_repo::ProjectRepo;

async fn setup() -> (sqlx::SqlitePool, Project) {
    let pool = db::connect_memory().await.expect("db");
    let project = Project::new("lock-tests".to_owned(), 10, 0);
    let mut conn = pool.acquire().await.expect("conn");
    ProjectRepo::create(&mut conn, &project).await.expect("project");
    drop(conn);
    (pool, project)
}

#[tokio::test]
async fn acquire_succeeds_only_when_absent() {
    let (pool, project) = setup().await;
    let mut conn = pool.acquire().await.expect("conn");

    assert!(LockRepo::acquire_if_absent(&mut conn, &project.id, "admin_a")
        .await
        .expect("acquire"));
    assert!(!LockRepo::acquire_if_absent(&mut conn, &project.id, "admin_b")
        .await
        .expect("acquire"));

    let lock = LockRepo::get(&mut conn, &project.id)
        .await
        .expect("query")
        .expect("held");
    assert_eq!(lock.coder, "admin_a");
}

#[tokio::test]
async fn release_only_removes_the_owners_row() {
    let (pool, project) = setup().await;
    let mut conn = pool.acquire().await.expect("conn");

    LockRepo::acquire_if_absent(&mut conn, &project.id, "admin_a")
        .await
        .expect("acquire");

    assert!(!LockRepo::release_own(&mut conn, &project.id, "admin_b")
        .await
        .expect("release"));
    assert!(LockRepo::get(&mut conn, &project.id).await.expect("query").is_some());

    assert!(LockRepo::release_own(&mut conn, &project.id, "admin_a")
        .await
        .expect("release"));
    assert!(LockRepo::get(&mut conn, &project.id).await.expect("query").is_none());
}

#[tokio::test]
async fn lock_persists_until_released() {
    // No lease: the row stays until an explicit release, even though
    // the owning session may be long gone.
    let (pool, project) = setup().await;
    let mut conn = pool.acquire().await.expect("conn");

    LockRepo::acquire_if_absent(&mut conn, &project.id, "admin_a")
        .await
        .expect("acquire");
    let lock = LockRepo::get(&mut conn, &project.id)
        .await
        .expect("query")
        .expect("held");
    assert_eq!(lock.project_id, project.id);
}
