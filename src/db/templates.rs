//! # 템플릿 쿼리 모듈
//!
//! ## 테이블 구조
//! ```text
//! templates ──(1:N)── template_items ──(1:N)── course_items
//!                     (instruction/separator/requirement)   (fixed/free 슬롯)
//! ```
//! 템플릿 생성은 세 테이블에 걸친 여러 INSERT이므로 트랜잭션으로 묶습니다.
//! 과목 코드 하나라도 카탈로그에 없으면 전체가 롤백됩니다.

use crate::db::courses;
use crate::error::AppError;
use crate::models::*;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;

/// free 요건 하나가 만들 수 있는 최대 슬롯 수
const MAX_FREE_SLOTS: i64 = 20;

pub async fn list_templates(pool: &SqlitePool) -> Result<Vec<Template>, AppError> {
    let templates = sqlx::query_as::<_, Template>(
        "SELECT id, name, description, created_by, created_at FROM templates ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(templates)
}

pub async fn get_template(pool: &SqlitePool, id: &str) -> Result<Option<Template>, AppError> {
    let template = sqlx::query_as::<_, Template>(
        "SELECT id, name, description, created_by, created_at FROM templates WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(template)
}

async fn name_taken(pool: &SqlitePool, name: &str, except_id: Option<&str>) -> Result<bool, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM templates WHERE name = ? AND id IS NOT ?",
    )
    .bind(name)
    .bind(except_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

fn validate_template_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Template name is required".to_string()));
    }
    Ok(name.to_string())
}

/// 템플릿을 만듭니다.
///
/// ## 처리 흐름
/// 1. 이름 검증, 중복이면 `Conflict`
/// 2. 트랜잭션 시작
/// 3. 항목을 배열 순서대로 저장 (`order_index` = 배열 인덱스)
/// 4. requirement 항목은 과목 슬롯(`course_items`)까지 만듭니다
///    - fixed: 목록의 과목 코드마다 슬롯 하나. 카탈로그에 없는 코드면 `BadRequest`
///    - free: `course_count`개의 빈 슬롯
/// 5. 커밋
///
/// 도중에 `?`로 빠져나가면 `tx`가 drop되면서 자동 롤백됩니다.
pub async fn create_template(
    pool: &SqlitePool,
    user_id: &str,
    req: &CreateTemplateRequest,
) -> Result<Template, AppError> {
    let name = validate_template_name(&req.name)?;
    if name_taken(pool, &name, None).await? {
        return Err(AppError::Conflict(format!("Template '{}' already exists", name)));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO templates (id, name, description, created_by) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&name)
        .bind(&req.description)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for (index, item) in req.items.iter().enumerate() {
        insert_item(&mut tx, &id, index as i64, item).await?;
    }

    tx.commit().await?;

    tracing::info!(template_id = %id, items = req.items.len(), "template created");
    get_template(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created template".to_string()))
}

async fn insert_item(
    tx: &mut Transaction<'_, Sqlite>,
    template_id: &str,
    order_index: i64,
    item: &TemplateItemInput,
) -> Result<(), AppError> {
    let item_id = uuid::Uuid::now_v7().to_string();

    let (kind, description, course_type, course_count) = match item {
        TemplateItemInput::Instruction { description } => {
            if description.trim().is_empty() {
                return Err(AppError::BadRequest("Instruction text is required".to_string()));
            }
            (ItemKind::Instruction, Some(description.as_str()), None, None)
        }
        TemplateItemInput::Separator => (ItemKind::Separator, None, None, None),
        TemplateItemInput::Requirement { description, courses } => {
            let (course_type, count) = match courses {
                RequirementCourses::Fixed { courses, course_count } => {
                    if courses.is_empty() {
                        return Err(AppError::BadRequest(
                            "Fixed requirement needs at least one course".to_string(),
                        ));
                    }
                    if let Some(n) = course_count {
                        if *n < 1 || *n as usize > courses.len() {
                            return Err(AppError::BadRequest(format!(
                                "course_count must be between 1 and {}",
                                courses.len()
                            )));
                        }
                    }
                    (CourseType::Fixed, *course_count)
                }
                RequirementCourses::Free { course_count } => {
                    if !(1..=MAX_FREE_SLOTS).contains(course_count) {
                        return Err(AppError::BadRequest(format!(
                            "course_count must be between 1 and {}",
                            MAX_FREE_SLOTS
                        )));
                    }
                    (CourseType::Free, Some(*course_count))
                }
            };
            (ItemKind::Requirement, description.as_deref(), Some(course_type), count)
        }
    };

    sqlx::query(
        r#"
        INSERT INTO template_items (id, template_id, kind, description, order_index, course_type, course_count)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item_id)
    .bind(template_id)
    .bind(kind.as_str())
    .bind(description)
    .bind(order_index)
    .bind(course_type.map(CourseType::as_str))
    .bind(course_count)
    .execute(&mut **tx)
    .await?;

    match item {
        TemplateItemInput::Requirement {
            courses: RequirementCourses::Fixed { courses: codes, .. },
            ..
        } => {
            for code in codes.codes() {
                let course = courses::find_by_code(&mut **tx, code)
                    .await?
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown course code: {}", code)))?;
                insert_course_item(tx, &item_id, CourseType::Fixed, Some(course.id.as_str())).await?;
            }
        }
        TemplateItemInput::Requirement {
            courses: RequirementCourses::Free { course_count },
            ..
        } => {
            for _ in 0..*course_count {
                insert_course_item(tx, &item_id, CourseType::Free, None).await?;
            }
        }
        _ => {}
    }

    Ok(())
}

async fn insert_course_item(
    tx: &mut Transaction<'_, Sqlite>,
    requirement_id: &str,
    kind: CourseType,
    course_id: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO course_items (id, requirement_id, kind, course_id) VALUES (?, ?, ?, ?)")
        .bind(uuid::Uuid::now_v7().to_string())
        .bind(requirement_id)
        .bind(kind.as_str())
        .bind(course_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// 만든 사람 본인의 템플릿인지 확인하고 돌려줍니다.
///
/// 없거나 다른 사람 것이면 `NotFound`
async fn get_own_template(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Template, AppError> {
    get_template(pool, id)
        .await?
        .filter(|t| t.created_by.as_deref() == Some(user_id))
        .ok_or(AppError::NotFound)
}

/// 템플릿 이름/설명을 수정합니다. (PATCH: 보낸 필드만)
pub async fn update_template(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    req: &UpdateTemplateRequest,
) -> Result<Template, AppError> {
    let existing = get_own_template(pool, user_id, id).await?;

    let name = match &req.name {
        Some(name) => {
            let name = validate_template_name(name)?;
            if name_taken(pool, &name, Some(id)).await? {
                return Err(AppError::Conflict(format!("Template '{}' already exists", name)));
            }
            name
        }
        None => existing.name,
    };
    let description = req.description.clone().or(existing.description);

    sqlx::query("UPDATE templates SET name = ?, description = ? WHERE id = ?")
        .bind(&name)
        .bind(&description)
        .bind(id)
        .execute(pool)
        .await?;

    get_template(pool, id).await?.ok_or(AppError::NotFound)
}

/// 템플릿을 삭제합니다. 항목, 슬롯, 플랜 연결, 선택 기록은 CASCADE로 함께 지워집니다.
pub async fn delete_template(pool: &SqlitePool, user_id: &str, id: &str) -> Result<(), AppError> {
    get_own_template(pool, user_id, id).await?;

    sqlx::query("DELETE FROM templates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    tracing::info!(template_id = id, "template deleted");
    Ok(())
}

/// 슬롯 조회용 행: 과목 항목 + (fixed 과목 또는 사용자가 채운 과목) + 선택 여부
#[derive(sqlx::FromRow)]
struct SlotRow {
    course_item_id: String,
    requirement_id: String,
    kind: String,
    course_id: Option<String>,
    code: Option<String>,
    name: Option<String>,
    description: Option<String>,
    #[sqlx(flatten)]
    ratings: CourseRatings,
    #[sqlx(flatten)]
    requisites: CourseRequisites,
    selected: bool,
}

/// 템플릿 상세를 사용자 관점으로 조회합니다.
///
/// free 슬롯에는 그 사용자가 채운 과목이, `selected`에는 그 사용자의 선택 여부가 들어갑니다.
pub async fn get_template_detail(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<TemplateDetail>, AppError> {
    let Some(template) = get_template(pool, id).await? else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, TemplateItemRow>(
        r#"
        SELECT id, template_id, kind, description, order_index, course_type, course_count
        FROM template_items
        WHERE template_id = ?
        ORDER BY order_index
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let slots = sqlx::query_as::<_, SlotRow>(
        r#"
        SELECT ci.id AS course_item_id, ci.requirement_id, ci.kind,
               c.id AS course_id, c.code, c.name, c.description,
               c.useful_rating, c.liked_rating, c.easy_rating, c.num_ratings,
               c.prereqs, c.antireqs, c.coreqs,
               COALESCE(sc.selected, 0) AS selected
        FROM course_items ci
        JOIN template_items ti ON ti.id = ci.requirement_id
        LEFT JOIN free_courses fc ON fc.course_item_id = ci.id AND fc.user_id = ?1
        LEFT JOIN courses c ON c.id = COALESCE(ci.course_id, fc.filled_course_id)
        LEFT JOIN plans p ON p.user_id = ?1
        LEFT JOIN selected_courses sc ON sc.plan_id = p.id AND sc.course_item_id = ci.id
        WHERE ti.template_id = ?2
        ORDER BY ci.rowid
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_all(pool)
    .await?;

    let mut by_requirement: HashMap<String, Vec<SlotRow>> = HashMap::new();
    for slot in slots {
        // entry().or_default(): 키가 없으면 빈 Vec을 넣고, 있든 없든 그 Vec의 &mut를 돌려줌
        by_requirement.entry(slot.requirement_id.clone()).or_default().push(slot);
    }

    let items = items
        .into_iter()
        .map(|item| {
            let mut fixed_courses = Vec::new();
            let mut free_courses = Vec::new();
            for slot in by_requirement.remove(&item.id).unwrap_or_default() {
                // 튜플로 묶어 한 번에 매칭. LEFT JOIN이 비었으면(안 채운 free 슬롯) 셋 다 None
                let course = match (slot.course_id, slot.code, slot.name) {
                    (Some(id), Some(code), Some(name)) => Some(Course {
                        id,
                        code,
                        name,
                        description: slot.description,
                        ratings: slot.ratings,
                        requisites: slot.requisites,
                    }),
                    _ => None,
                };
                let entry = CourseSlot {
                    course_item_id: slot.course_item_id,
                    course,
                    selected: slot.selected,
                };
                if slot.kind == CourseType::Free.as_str() {
                    free_courses.push(entry);
                } else {
                    fixed_courses.push(entry);
                }
            }
            TemplateItemDetail {
                id: item.id,
                kind: item.kind,
                description: item.description,
                order_index: item.order_index,
                course_type: item.course_type,
                course_count: item.course_count,
                fixed_courses,
                free_courses,
            }
        })
        .collect();

    Ok(Some(TemplateDetail { template, items }))
}
