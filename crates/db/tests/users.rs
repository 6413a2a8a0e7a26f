//! Integration tests for the user directory and the last-admin rule.

use assert_matches::assert_matches;
use bizdesk_core::error::CoreError;
use bizdesk_core::roles::{ROLE_ADMIN, ROLE_USER};
use bizdesk_db::models::user::{CreateUser, UpdateUser};
use bizdesk_db::repositories::UserRepo;
use bizdesk_db::RepoError;
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, name: &str, role: &str) -> i64 {
    let input = CreateUser {
        username: name.to_string(),
        email: format!("{name}@example.com"),
        password_hash: "not-a-real-hash".to_string(),
        role: role.to_string(),
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_sole_admin_is_refused(pool: PgPool) {
    let admin = seed_user(&pool, "root", ROLE_ADMIN).await;
    assert_matches!(
        UserRepo::delete(&pool, admin).await,
        Err(RepoError::Core(CoreError::InvariantViolation(_)))
    );
    assert!(UserRepo::find_by_id(&pool, admin).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_one_of_two_admins_succeeds(pool: PgPool) {
    let first = seed_user(&pool, "root", ROLE_ADMIN).await;
    let second = seed_user(&pool, "ops", ROLE_ADMIN).await;

    assert!(UserRepo::delete(&pool, first).await.unwrap());
    let admins: Vec<i64> = UserRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.role == ROLE_ADMIN)
        .map(|u| u.id)
        .collect();
    assert_eq!(admins, vec![second]);

    assert_matches!(
        UserRepo::delete(&pool, second).await,
        Err(RepoError::Core(CoreError::InvariantViolation(_)))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_regular_user_with_single_admin_succeeds(pool: PgPool) {
    seed_user(&pool, "root", ROLE_ADMIN).await;
    let user = seed_user(&pool, "alice", ROLE_USER).await;
    assert!(UserRepo::delete(&pool, user).await.unwrap());
    assert!(!UserRepo::delete(&pool, user).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_demoting_sole_admin_is_refused(pool: PgPool) {
    let admin = seed_user(&pool, "root", ROLE_ADMIN).await;
    let demote = UpdateUser {
        role: Some(ROLE_USER.to_string()),
        ..Default::default()
    };
    assert_matches!(
        UserRepo::update(&pool, admin, &demote).await,
        Err(RepoError::Core(CoreError::InvariantViolation(_)))
    );

    let promote_other = seed_user(&pool, "ops", ROLE_USER).await;
    let promote = UpdateUser {
        role: Some(ROLE_ADMIN.to_string()),
        ..Default::default()
    };
    UserRepo::update(&pool, promote_other, &promote)
        .await
        .unwrap()
        .unwrap();

    let demoted = UserRepo::update(&pool, admin, &demote)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(demoted.role, ROLE_USER);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_username_violates_unique_constraint(pool: PgPool) {
    seed_user(&pool, "alice", ROLE_USER).await;
    let dup = CreateUser {
        username: "alice".to_string(),
        email: "other@example.com".to_string(),
        password_hash: "x".to_string(),
        role: ROLE_USER.to_string(),
    };
    let err = UserRepo::create(&pool, &dup).await.unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_users_username"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_is_ordered_by_username(pool: PgPool) {
    seed_user(&pool, "zed", ROLE_USER).await;
    seed_user(&pool, "amy", ROLE_ADMIN).await;
    let users = UserRepo::list(&pool).await.unwrap();
    let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["amy", "zed"]);
}
