//! # 플랜 쿼리 모듈
//!
//! 사용자의 플랜(1:1)과 그 안의 선택 상태를 다룹니다.
//!
//! ## "선택된 과목"이 결정되는 방식
//! ```text
//! plan_templates        : 플랜에 들어간 템플릿
//!   └ course_items      : 그 템플릿 요건들의 슬롯
//!       └ selected_courses.selected = 1   : 사용자가 수강 예정으로 표시
//!           └ 과목 = fixed 슬롯의 course_id 또는 free 슬롯에 사용자가 채운 과목
//! ```
//! 같은 과목이 여러 요건에 걸쳐 있어도 선택 목록에는 한 번만 나옵니다.
//! 시간표에 배정할 수 있는 과목은 이 목록에 있는 과목뿐입니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 선택된 과목을 찾는 공통 FROM/WHERE 절. `?1` = user_id
const SELECTED_COURSES_FROM: &str = r#"
    FROM plans p
    JOIN plan_templates pt ON pt.plan_id = p.id
    JOIN template_items ti ON ti.template_id = pt.template_id
    JOIN course_items ci ON ci.requirement_id = ti.id
    JOIN selected_courses sc ON sc.plan_id = p.id AND sc.course_item_id = ci.id AND sc.selected = 1
    LEFT JOIN free_courses fc ON fc.course_item_id = ci.id AND fc.user_id = p.user_id
    JOIN courses c ON c.id = COALESCE(ci.course_id, fc.filled_course_id)
    WHERE p.user_id = ?1
"#;

pub async fn get_plan_for_user(pool: &SqlitePool, user_id: &str) -> Result<Option<Plan>, AppError> {
    let plan = sqlx::query_as::<_, Plan>("SELECT id, user_id FROM plans WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(plan)
}

/// 사용자의 플랜을 가져옵니다. 가입 시 만들어지므로 없으면 내부 오류입니다.
pub async fn require_plan(pool: &SqlitePool, user_id: &str) -> Result<Plan, AppError> {
    get_plan_for_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("User {} has no plan", user_id)))
}

/// 플랜에 들어간 템플릿 목록 (이름순)
pub async fn list_plan_templates(pool: &SqlitePool, plan_id: &str) -> Result<Vec<Template>, AppError> {
    let templates = sqlx::query_as::<_, Template>(
        r#"
        SELECT t.id, t.name, t.description, t.created_by, t.created_at
        FROM templates t
        JOIN plan_templates pt ON pt.template_id = t.id
        WHERE pt.plan_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    Ok(templates)
}

/// 템플릿을 플랜에 넣거나 뺍니다.
///
/// ## 반환값
/// 토글 후 플랜에 들어 있으면 `true`
///
/// 뺄 때는 그 템플릿 슬롯들의 선택 기록도 함께 지웁니다.
/// 나중에 다시 넣으면 아무것도 선택되지 않은 상태로 시작합니다.
pub async fn toggle_template(pool: &SqlitePool, plan_id: &str, template_id: &str) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM templates WHERE id = ?")
        .bind(template_id)
        .fetch_one(&mut *tx)
        .await?;
    if exists == 0 {
        return Err(AppError::NotFound);
    }

    let removed = sqlx::query("DELETE FROM plan_templates WHERE plan_id = ? AND template_id = ?")
        .bind(plan_id)
        .bind(template_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
        > 0;

    if removed {
        sqlx::query(
            r#"
            DELETE FROM selected_courses
            WHERE plan_id = ?
              AND course_item_id IN (
                  SELECT ci.id
                  FROM course_items ci
                  JOIN template_items ti ON ti.id = ci.requirement_id
                  WHERE ti.template_id = ?
              )
            "#,
        )
        .bind(plan_id)
        .bind(template_id)
        .execute(&mut *tx)
        .await?;
    } else {
        sqlx::query("INSERT INTO plan_templates (plan_id, template_id) VALUES (?, ?)")
            .bind(plan_id)
            .bind(template_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::debug!(plan_id, template_id, in_plan = !removed, "template toggled");
    Ok(!removed)
}

/// 플랜에 들어간 템플릿의 과목 슬롯을 찾습니다.
///
/// 슬롯이 없거나 플랜 밖 템플릿의 슬롯이면 `None`
pub async fn find_plan_course_item(
    pool: &SqlitePool,
    plan_id: &str,
    course_item_id: &str,
) -> Result<Option<CourseItem>, AppError> {
    let item = sqlx::query_as::<_, CourseItem>(
        r#"
        SELECT ci.id, ci.requirement_id, ci.kind, ci.course_id
        FROM course_items ci
        JOIN template_items ti ON ti.id = ci.requirement_id
        JOIN plan_templates pt ON pt.template_id = ti.template_id
        WHERE ci.id = ? AND pt.plan_id = ?
        "#,
    )
    .bind(course_item_id)
    .bind(plan_id)
    .fetch_optional(pool)
    .await?;

    Ok(item)
}

/// 과목 슬롯의 선택 여부를 저장합니다. (upsert)
pub async fn set_selection(
    pool: &SqlitePool,
    plan_id: &str,
    course_item_id: &str,
    selected: bool,
) -> Result<(), AppError> {
    find_plan_course_item(pool, plan_id, course_item_id)
        .await?
        .ok_or(AppError::NotFound)?;

    sqlx::query(
        r#"
        INSERT INTO selected_courses (plan_id, course_item_id, selected)
        VALUES (?, ?, ?)
        ON CONFLICT(plan_id, course_item_id) DO UPDATE SET selected = excluded.selected
        "#,
    )
    .bind(plan_id)
    .bind(course_item_id)
    .bind(selected)
    .execute(pool)
    .await?;

    Ok(())
}

/// free 슬롯에 과목을 채우거나(`Some`) 비웁니다(`None`).
///
/// 채운 과목은 사용자별로 저장되므로 같은 템플릿을 쓰는 다른 사용자에게 보이지 않습니다.
pub async fn fill_free_course(
    pool: &SqlitePool,
    user_id: &str,
    plan_id: &str,
    course_item_id: &str,
    course_id: Option<&str>,
) -> Result<(), AppError> {
    let item = find_plan_course_item(pool, plan_id, course_item_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !item.is_free() {
        return Err(AppError::BadRequest("Only free slots can be filled".to_string()));
    }

    match course_id {
        Some(course_id) => {
            if crate::db::courses::get_course(pool, course_id).await?.is_none() {
                return Err(AppError::BadRequest(format!("Unknown course: {}", course_id)));
            }
            sqlx::query(
                r#"
                INSERT INTO free_courses (course_item_id, user_id, filled_course_id)
                VALUES (?, ?, ?)
                ON CONFLICT(course_item_id, user_id) DO UPDATE SET filled_course_id = excluded.filled_course_id
                "#,
            )
            .bind(course_item_id)
            .bind(user_id)
            .bind(course_id)
            .execute(pool)
            .await?;
        }
        None => {
            sqlx::query("DELETE FROM free_courses WHERE course_item_id = ? AND user_id = ?")
                .bind(course_item_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}

/// 사용자가 선택한 과목 목록 (과목당 한 번, 코드순)
pub async fn list_selected_courses(pool: &SqlitePool, user_id: &str) -> Result<Vec<SelectedCourse>, AppError> {
    let sql = format!(
        "SELECT DISTINCT c.id AS course_id, c.code AS course_code, c.name AS course_name, \
         c.useful_rating, c.liked_rating, c.easy_rating, c.num_ratings {} ORDER BY c.code",
        SELECTED_COURSES_FROM
    );
    let courses = sqlx::query_as::<_, SelectedCourse>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(courses)
}

/// 과목이 사용자의 선택 목록에 있는지 확인합니다. 시간표 배정 전에 검사합니다.
pub async fn is_course_selected(pool: &SqlitePool, user_id: &str, course_id: &str) -> Result<bool, AppError> {
    let sql = format!("SELECT COUNT(*) {} AND c.id = ?2", SELECTED_COURSES_FROM);
    let count = sqlx::query_scalar::<_, i64>(&sql)
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// 과목을 선택 목록에서 완전히 뺍니다.
///
/// 1. 그 과목을 가리키는 모든 슬롯(fixed 또는 채운 free)의 선택 기록 삭제
/// 2. 사용자의 모든 시간표에서 그 과목의 배정 삭제
///
/// 선택되지 않은 과목이 시간표에 남지 않도록 한 트랜잭션에서 처리합니다.
pub async fn remove_course_selection(pool: &SqlitePool, user_id: &str, course_id: &str) -> Result<(), AppError> {
    let plan = require_plan(pool, user_id).await?;
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM selected_courses
        WHERE plan_id = ?1
          AND course_item_id IN (
              SELECT ci.id
              FROM course_items ci
              LEFT JOIN free_courses fc ON fc.course_item_id = ci.id AND fc.user_id = ?2
              WHERE COALESCE(ci.course_id, fc.filled_course_id) = ?3
          )
        "#,
    )
    .bind(&plan.id)
    .bind(user_id)
    .bind(course_id)
    .execute(&mut *tx)
    .await?;

    let unscheduled = sqlx::query(
        r#"
        DELETE FROM schedule_courses
        WHERE course_id = ?
          AND schedule_id IN (SELECT id FROM schedules WHERE plan_id = ?)
        "#,
    )
    .bind(course_id)
    .bind(&plan.id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    tracing::debug!(user_id, course_id, unscheduled, "course selection removed");
    Ok(())
}
