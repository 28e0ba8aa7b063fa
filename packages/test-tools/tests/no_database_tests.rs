mod support;

use sea_orm::EntityTrait;
use support::entities::users;
use test_tools::{is_no_database, with_no_database, NoDatabaseGuard};

#[tokio::test]
async fn a_body_without_database_access_completes_normally() {
    let value = with_no_database(|_conn| async move { 21 * 2 }).await;
    assert_eq!(value, 42);
}

#[tokio::test]
async fn database_access_under_the_guard_fails() {
    let outcome = with_no_database(|conn| async move {
        users::Entity::find().all(&conn).await
    })
    .await;

    assert!(outcome.is_err());
}

#[tokio::test]
async fn the_stand_in_is_denied_while_the_body_runs() {
    with_no_database(|conn| async move {
        assert!(is_no_database(&conn));
    })
    .await;
}

#[tokio::test]
async fn the_guard_is_removed_afterward_even_when_access_was_attempted() {
    let conn = with_no_database(|conn| async move {
        let _ = users::Entity::find().one(&conn).await;
        conn
    })
    .await;

    assert!(!is_no_database(&conn));
}

#[tokio::test]
async fn the_guard_is_removed_afterward_when_the_body_errors() {
    let (conn, outcome) = with_no_database(|conn| async move {
        let outcome = users::Entity::find().all(&conn).await;
        (conn, outcome)
    })
    .await;

    assert!(outcome.is_err());
    assert!(!is_no_database(&conn));
}

#[tokio::test]
async fn a_plain_guard_scopes_denial_to_its_lifetime() {
    let guard = NoDatabaseGuard::new();
    let conn = guard.conn().clone();

    let err = users::Entity::find().all(&conn).await.unwrap_err();
    assert!(is_no_database(&conn));
    drop(guard);

    assert!(!is_no_database(&conn));
    // The stand-in itself still fails; only the registration is scoped.
    assert!(users::Entity::find().all(&conn).await.is_err());
    let _ = err;
}
