//! # 시간표 CSV 내보내기
//!
//! 시간표의 배정 목록을 `과목 코드, 과목 이름, 학기` 3열 CSV로 변환합니다.
//! DB를 건드리지 않는 순수 변환입니다.
//!
//! 행 순서는 학기 시간순, 같은 학기 안에서는 과목 코드순입니다.
//! 학기 라벨로 해석되지 않는 값은 맨 뒤로 보냅니다.

use crate::models::{ScheduledCourse, Term};

pub const CSV_HEADER: &str = "Course Code,Course Name,Term";

pub fn schedule_to_csv(rows: &[ScheduledCourse]) -> String {
    // 원본 슬라이스는 그대로 두고 참조만 모아서 정렬 (복사 없음)
    let mut sorted: Vec<&ScheduledCourse> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        let a_term = a.term.parse::<Term>().ok();
        let b_term = b.term.parse::<Term>().ok();
        // 튜플 비교는 앞 요소부터 차례로. None이 뒤로 가도록 is_none()을 먼저 비교
        (a_term.is_none(), a_term, &a.term, &a.course_code)
            .cmp(&(b_term.is_none(), b_term, &b.term, &b.course_code))
    });

    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for row in sorted {
        out.push_str(&csv_quote(&row.course_code));
        out.push(',');
        out.push_str(&csv_quote(&row.course_name));
        out.push(',');
        out.push_str(&csv_quote(&row.term));
        out.push('\n');
    }
    out
}

/// 쉼표, 큰따옴표, 줄바꿈이 들어간 필드만 따옴표로 감쌉니다.
fn csv_quote(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, name: &str, term: &str) -> ScheduledCourse {
        ScheduledCourse {
            course_id: code.to_lowercase(),
            course_code: code.to_string(),
            course_name: name.to_string(),
            term: term.to_string(),
        }
    }

    #[test]
    fn one_row_per_course_in_term_order() {
        let csv = schedule_to_csv(&[
            row("MATH135", "Algebra", "Fall 2024"),
            row("CS136", "Algorithm Design", "Winter 2025"),
            row("CS135", "Functional Programs", "Fall 2024"),
            row("STAT230", "Probability", "Spring 2024"),
        ]);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Course Code,Course Name,Term",
                "STAT230,Probability,Spring 2024",
                "CS135,Functional Programs,Fall 2024",
                "MATH135,Algebra,Fall 2024",
                "CS136,Algorithm Design,Winter 2025",
            ]
        );
    }

    #[test]
    fn quotes_fields_with_commas_and_quotes() {
        let csv = schedule_to_csv(&[row("CS135", "Programs, \"Functional\"", "Fall 2024")]);
        assert!(csv.contains("CS135,\"Programs, \"\"Functional\"\"\",Fall 2024"));
    }

    #[test]
    fn empty_schedule_has_only_header() {
        assert_eq!(schedule_to_csv(&[]), "Course Code,Course Name,Term\n");
    }
}
