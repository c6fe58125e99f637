//! # 시간표 쿼리 모듈
//!
//! 시간표 CRUD와 소유권 확인을 담당합니다.
//!
//! ## 소유 관계
//! ```text
//! users ──(1:1)── plans ──(1:N)── schedules ──(1:N)── schedule_courses
//! ```
//! 시간표를 다룰 때는 항상 "요청한 사용자의 플랜에 속한 시간표인가"를 함께 확인합니다.
//! 시간표를 삭제하면 `ON DELETE CASCADE`로 배정(schedule_courses)도 함께 사라집니다.

use crate::error::AppError;
use crate::models::{DeleteScheduleResponse, Schedule};
use sqlx::{Sqlite, SqlitePool};

/// 사용자의 모든 시간표를 생성순으로 조회합니다.
pub async fn list_schedules(pool: &SqlitePool, user_id: &str) -> Result<Vec<Schedule>, AppError> {
    let schedules = sqlx::query_as::<_, Schedule>(
        r#"
        SELECT s.id, s.name, s.plan_id, s.created_at
        FROM schedules s
        JOIN plans p ON p.id = s.plan_id
        WHERE p.user_id = ?
        ORDER BY s.created_at, s.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(schedules)
}

/// 사용자 소유의 시간표를 조회합니다.
///
/// 시간표가 없거나 다른 사용자의 것이면 `None`입니다.
/// 두 경우를 구분하지 않으므로 라우트에서는 둘 다 404가 됩니다.
pub async fn find_owned_schedule(
    pool: &SqlitePool,
    user_id: &str,
    schedule_id: &str,
) -> Result<Option<Schedule>, AppError> {
    let schedule = sqlx::query_as::<_, Schedule>(
        r#"
        SELECT s.id, s.name, s.plan_id, s.created_at
        FROM schedules s
        JOIN plans p ON p.id = s.plan_id
        WHERE s.id = ? AND p.user_id = ?
        "#,
    )
    .bind(schedule_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(schedule)
}

/// 새 시간표 행을 넣고 ID를 돌려줍니다.
///
/// 이름 검증은 호출자가 끝낸 상태여야 합니다.
/// 회원가입 트랜잭션에서도 쓰기 때문에 Executor 제네릭을 받습니다.
pub async fn insert_schedule<'e, E>(executor: E, plan_id: &str, name: &str) -> Result<String, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query("INSERT INTO schedules (id, name, plan_id) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(plan_id)
        .execute(executor)
        .await?;

    Ok(id)
}

async fn get_schedule(pool: &SqlitePool, id: &str) -> Result<Option<Schedule>, AppError> {
    let schedule = sqlx::query_as::<_, Schedule>(
        "SELECT id, name, plan_id, created_at FROM schedules WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(schedule)
}

/// 시간표를 만들고 생성된 시간표를 반환합니다.
pub async fn create_schedule(pool: &SqlitePool, plan_id: &str, name: &str) -> Result<Schedule, AppError> {
    let id = insert_schedule(pool, plan_id, name).await?;

    get_schedule(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created schedule".to_string()))
}

/// 시간표 이름을 바꿉니다.
///
/// 소유권 확인은 호출자 책임입니다. 시간표가 없으면 `Ok(None)`
pub async fn rename_schedule(
    pool: &SqlitePool,
    schedule_id: &str,
    name: &str,
) -> Result<Option<Schedule>, AppError> {
    let result = sqlx::query("UPDATE schedules SET name = ? WHERE id = ?")
        .bind(name)
        .bind(schedule_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_schedule(pool, schedule_id).await
}

/// 시간표를 삭제합니다.
///
/// ## 규칙
/// - 사용자 소유가 아니면 `NotFound`
/// - 플랜의 유일한 시간표면 `Conflict`. 플랜에는 항상 시간표가 하나 이상 있어야 합니다
/// - 성공하면 남은 시간표 중 가장 먼저 만든 것의 ID를 함께 돌려줍니다
///
/// 개수 확인과 삭제 사이에 다른 삭제가 끼어들지 않도록 하나의 트랜잭션에서 처리합니다.
pub async fn delete_schedule(
    pool: &SqlitePool,
    user_id: &str,
    schedule_id: &str,
) -> Result<DeleteScheduleResponse, AppError> {
    // begin(): 트랜잭션 시작. commit() 전에 함수가 에러로 빠져나가면 drop 시점에 자동 롤백
    let mut tx = pool.begin().await?;

    let plan_id = sqlx::query_scalar::<_, String>(
        r#"
        SELECT s.plan_id
        FROM schedules s
        JOIN plans p ON p.id = s.plan_id
        WHERE s.id = ? AND p.user_id = ?
        "#,
    )
    .bind(schedule_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound)?;

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schedules WHERE plan_id = ?")
        .bind(&plan_id)
        // &mut *tx: Transaction을 역참조해 안쪽 커넥션을 Executor로 빌려줌
        .fetch_one(&mut *tx)
        .await?;
    if count <= 1 {
        return Err(AppError::Conflict(
            "Cannot delete the only schedule for a plan".to_string(),
        ));
    }

    sqlx::query("DELETE FROM schedules WHERE id = ?")
        .bind(schedule_id)
        .execute(&mut *tx)
        .await?;

    let next_schedule_id = sqlx::query_scalar::<_, String>(
        "SELECT id FROM schedules WHERE plan_id = ? ORDER BY created_at, id LIMIT 1",
    )
    .bind(&plan_id)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(schedule_id, user_id, "schedule deleted");
    Ok(DeleteScheduleResponse {
        deleted_id: schedule_id.to_string(),
        next_schedule_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::assignments;
    use crate::db::test_support::{add_course, register_user, setup_test_db};

    #[tokio::test]
    async fn lists_only_the_owners_schedules() {
        let pool = setup_test_db().await;
        let (alice, default) = register_user(&pool, "alice").await;
        let (bob, _) = register_user(&pool, "bob").await;

        create_schedule(&pool, &default.plan_id, "Plan B").await.unwrap();

        let names: Vec<String> = list_schedules(&pool, &alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Default", "Plan B"]);
        assert_eq!(list_schedules(&pool, &bob.id).await.unwrap().len(), 1);

        assert!(find_owned_schedule(&pool, &bob.id, &default.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rename_keeps_assignments() {
        let pool = setup_test_db().await;
        let (_, schedule) = register_user(&pool, "alice").await;
        let course = add_course(&pool, "CS135", "Functional Programs").await;
        assignments::assign(&pool, &schedule.id, &course.id, "Fall 2024").await.unwrap();

        let renamed = rename_schedule(&pool, &schedule.id, "Co-op track").await.unwrap().unwrap();
        assert_eq!(renamed.name, "Co-op track");
        assert_eq!(assignments::list_for_schedule(&pool, &schedule.id).await.unwrap().len(), 1);

        assert!(rename_schedule(&pool, "missing", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_cascades_only_its_own_assignments() {
        let pool = setup_test_db().await;
        let (alice, default) = register_user(&pool, "alice").await;
        let other = create_schedule(&pool, &default.plan_id, "Plan B").await.unwrap();
        let course = add_course(&pool, "CS135", "Functional Programs").await;

        assignments::assign(&pool, &default.id, &course.id, "Fall 2024").await.unwrap();
        assignments::assign(&pool, &other.id, &course.id, "Winter 2025").await.unwrap();

        let res = delete_schedule(&pool, &alice.id, &other.id).await.unwrap();
        assert_eq!(res.deleted_id, other.id);
        assert_eq!(res.next_schedule_id.as_deref(), Some(default.id.as_str()));

        let orphaned: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM schedule_courses WHERE schedule_id = ?")
                .bind(&other.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(orphaned, 0);

        let kept = assignments::list_for_schedule(&pool, &default.id).await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].term, "Fall 2024");
    }

    #[tokio::test]
    async fn sole_schedule_cannot_be_deleted() {
        let pool = setup_test_db().await;
        let (alice, default) = register_user(&pool, "alice").await;

        let err = delete_schedule(&pool, &alice.id, &default.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(list_schedules(&pool, &alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_someone_elses_schedule_is_not_found() {
        let pool = setup_test_db().await;
        let (_, default) = register_user(&pool, "alice").await;
        create_schedule(&pool, &default.plan_id, "Plan B").await.unwrap();
        let (mallory, _) = register_user(&pool, "mallory").await;

        let err = delete_schedule(&pool, &mallory.id, &default.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
