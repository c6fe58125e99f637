//! # 시간표 보드 프로젝션과 낙관적(optimistic) 상태 머신
//!
//! 시간표 화면은 두 개의 목록으로 이루어집니다:
//! - **available**: 선택했지만 아직 어느 학기에도 놓이지 않은 과목 (`term == ""`)
//! - **scheduled**: 학기에 배정된 과목 (화면에서는 학기별로 나눠 보여줌)
//!
//! `BoardProjection`은 이 두 목록과 이동 규칙(reducer)을 담당합니다.
//! 서버는 `GET /schedules/{id}/board` 응답을 만들 때 이 프로젝션을 사용하고,
//! 클라이언트는 `OptimisticBoard`로 서버 응답 전에 화면을 먼저 갱신합니다.
//!
//! ## 상태 머신
//! ```text
//!            apply()                confirm() (대기 0건)
//!  Synced ──────────► Pending ─────────────────────────► Reconciled
//!    ▲                  │  ▲                                │
//!    │ resync()         │  └──────────── apply() ───────────┘
//!    │                  │ fail() (대기 0건)
//!    └──── Failed ◄─────┘
//! ```
//!
//! - 확정된 기준 상태(`confirmed`)와 아직 응답이 오지 않은 이동 목록(`pending`)을 따로 보관합니다.
//! - 화면 상태(`view`)는 항상 `confirmed` 위에 `pending`을 순서대로 다시 적용한 결과입니다.
//! - `fail()`은 실패한 이동만 빼고 나머지를 다시 적용합니다. 즉 실패한 이동은 롤백됩니다.
//! - 응답은 도착한 순서대로 `confirmed`에 반영됩니다. 서로 다른 이동이 같은 과목을
//!   건드린 경우 마지막에 반영된 쪽이 이깁니다(last-write-wins). 서버도 같은 규칙이므로
//!   별도의 버전 관리는 하지 않습니다.

use crate::models::{CourseInstance, ScheduledCourse, SelectedCourse};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 사용자의 드래그 앤 드롭 한 번에 해당하는 이동
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardMove {
    /// 시간표에서 빼서 available로 되돌림
    ToAvailable { course_id: String },
    /// 특정 학기로 이동 (available에서 오든, 다른 학기에서 오든)
    ToTerm { course_id: String, term: String },
}

impl BoardMove {
    pub fn course_id(&self) -> &str {
        match self {
            BoardMove::ToAvailable { course_id } | BoardMove::ToTerm { course_id, .. } => {
                course_id.as_str()
            }
        }
    }
}

/// available / scheduled 두 목록
///
/// 두 목록 모두 과목 코드 사전순 정렬을 유지합니다.
/// 정렬은 저장되는 값이 아니라 변경할 때마다 다시 계산되는 화면 규칙입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardProjection {
    available: Vec<CourseInstance>,
    scheduled: Vec<CourseInstance>,
}

impl BoardProjection {
    pub fn new(available: Vec<CourseInstance>, scheduled: Vec<CourseInstance>) -> Self {
        let mut projection = Self {
            available,
            scheduled,
        };
        projection.sort();
        projection
    }

    /// 서버 데이터로 프로젝션을 만듭니다.
    ///
    /// available = 선택한 과목 중 이 시간표에 배정되지 않은 과목 (과목당 한 번)
    /// scheduled = 이 시간표의 배정 목록
    pub fn from_server(selected: Vec<SelectedCourse>, assignments: Vec<ScheduledCourse>) -> Self {
        let available = {
            let assigned: HashSet<&str> =
                assignments.iter().map(|a| a.course_id.as_str()).collect();
            let mut seen: HashSet<String> = HashSet::new();

            selected
                .into_iter()
                .filter(|course| !assigned.contains(course.course_id.as_str()))
                .filter(|course| seen.insert(course.course_id.clone()))
                .map(|course| CourseInstance {
                    course_id: course.course_id,
                    course_code: course.course_code,
                    course_name: course.course_name,
                    term: String::new(),
                })
                .collect()
        };
        let scheduled = assignments.into_iter().map(CourseInstance::from).collect();

        Self::new(available, scheduled)
    }

    pub fn available(&self) -> &[CourseInstance] {
        &self.available
    }

    pub fn scheduled(&self) -> &[CourseInstance] {
        &self.scheduled
    }

    /// 특정 학기에 놓인 과목들 (과목 코드 순)
    pub fn scheduled_in<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a CourseInstance> {
        self.scheduled.iter().filter(move |c| c.term == term)
    }

    pub fn into_parts(self) -> (Vec<CourseInstance>, Vec<CourseInstance>) {
        (self.available, self.scheduled)
    }

    /// 이동 하나를 적용합니다.
    ///
    /// 대상 과목이 어느 목록에도 없으면 아무것도 바꾸지 않고 false를 돌려줍니다.
    pub fn apply(&mut self, mv: &BoardMove) -> bool {
        let changed = match mv {
            BoardMove::ToAvailable { course_id } => {
                match take(&mut self.scheduled, course_id) {
                    Some(mut course) => {
                        course.term.clear();
                        self.available.push(course);
                        true
                    }
                    // 이미 available에 있으면 목적지에 도달한 상태
                    None => self.available.iter().any(|c| &c.course_id == course_id),
                }
            }
            BoardMove::ToTerm { course_id, term } => {
                // or_else: 앞이 None일 때만 클로저를 실행 (available에 없을 때만 scheduled를 뒤짐)
                let found = take(&mut self.available, course_id)
                    .or_else(|| take(&mut self.scheduled, course_id));
                match found {
                    Some(mut course) => {
                        course.term = term.clone();
                        self.scheduled.push(course);
                        true
                    }
                    None => false,
                }
            }
        };
        self.sort();
        changed
    }

    fn sort(&mut self) {
        self.available.sort_by(|a, b| a.course_code.cmp(&b.course_code));
        self.scheduled.sort_by(|a, b| a.course_code.cmp(&b.course_code));
    }
}

/// 목록에서 과목을 찾아 꺼냅니다.
fn take(list: &mut Vec<CourseInstance>, course_id: &str) -> Option<CourseInstance> {
    // ?: Option에도 쓸 수 있음. 못 찾으면 바로 None 반환
    let index = list.iter().position(|c| c.course_id == course_id)?;
    Some(list.remove(index))
}

/// 서버와의 동기화 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// 서버 목록으로 막 초기화됨. 대기 중인 이동 없음
    Synced,
    /// 응답을 기다리는 이동이 하나 이상 있음
    Pending,
    /// 대기 중이던 이동이 모두 서버에서 확정됨
    Reconciled,
    /// 마지막으로 처리된 응답이 실패였고, 해당 이동은 롤백됨
    Failed,
}

/// 낙관적 이동 하나의 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OpId(u64);

/// 클라이언트 쪽 낙관적 보드
///
/// UI 이벤트 큐 하나에서만 호출된다고 가정하므로 잠금이 없습니다.
#[derive(Debug, Clone)]
pub struct OptimisticBoard {
    confirmed: BoardProjection,
    view: BoardProjection,
    pending: Vec<(OpId, BoardMove)>,
    next_op: u64,
    last_outcome: SyncState,
}

impl OptimisticBoard {
    pub fn new(confirmed: BoardProjection) -> Self {
        Self {
            view: confirmed.clone(),
            confirmed,
            pending: Vec::new(),
            next_op: 0,
            last_outcome: SyncState::Synced,
        }
    }

    /// 현재 화면에 보여줄 상태 (확정 상태 + 대기 중인 이동)
    pub fn view(&self) -> &BoardProjection {
        &self.view
    }

    /// 서버가 확인해 준 마지막 상태
    pub fn confirmed(&self) -> &BoardProjection {
        &self.confirmed
    }

    pub fn state(&self) -> SyncState {
        if self.pending.is_empty() {
            self.last_outcome
        } else {
            SyncState::Pending
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// 사용자 동작(drag-end)을 즉시 화면에 반영하고, 서버 응답과 짝지을 id를 돌려줍니다.
    pub fn apply(&mut self, mv: BoardMove) -> OpId {
        let id = OpId(self.next_op);
        self.next_op += 1;
        self.view.apply(&mv);
        self.pending.push((id, mv));
        id
    }

    /// 서버가 이동을 성공적으로 처리했습니다.
    ///
    /// 모르는 id(이미 처리됐거나 resync로 버려진 이동)면 false
    pub fn confirm(&mut self, id: OpId) -> bool {
        let Some(mv) = self.remove_pending(id) else {
            return false;
        };
        self.confirmed.apply(&mv);
        self.last_outcome = SyncState::Reconciled;
        self.rebuild_view();
        true
    }

    /// 서버가 이동을 거부했거나 요청이 실패했습니다.
    ///
    /// 실패한 이동을 버리고 화면을 다시 계산합니다. 버려진 이동을 돌려주므로
    /// 호출자는 이를 이용해 알림을 띄울 수 있습니다.
    pub fn fail(&mut self, id: OpId) -> Option<BoardMove> {
        let mv = self.remove_pending(id)?;
        self.last_outcome = SyncState::Failed;
        self.rebuild_view();
        Some(mv)
    }

    /// 서버의 최신 목록으로 전체를 교체합니다. 대기 중인 이동은 모두 버립니다.
    pub fn resync(&mut self, server: BoardProjection) {
        self.confirmed = server;
        self.pending.clear();
        self.last_outcome = SyncState::Synced;
        self.rebuild_view();
    }

    fn remove_pending(&mut self, id: OpId) -> Option<BoardMove> {
        let index = self.pending.iter().position(|(op, _)| *op == id)?;
        Some(self.pending.remove(index).1)
    }

    fn rebuild_view(&mut self) {
        let mut view = self.confirmed.clone();
        for (_, mv) in &self.pending {
            view.apply(mv);
        }
        self.view = view;
    }
}
