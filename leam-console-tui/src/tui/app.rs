//! 앱 상태 · 패널 포커스 · 인라인 편집
//!
//! 화면은 한 장(모듈 페이지)이고, `Panel`로 포커스를 옮기며 각 영역을 조작합니다.
//! 채널 이벤트로 바뀌는 상태(로그/모니터/버튼)는 `ModulePage` 컴포넌트가 소유하고,
//! 여기에는 입력 컨트롤과 UI 전용 상태만 둡니다.

use std::time::Instant;

use leam_console::dispatch::Dispatch;
use leam_console::fields::RowId;
use leam_console::page::ModulePage;
use leam_console::surface::{Notice, NoticeQueue};

// ═══════════════════════════════════════════════════════
// 패널
// ═══════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Run,
    Settings,
    Subreddits,
    Logs,
}

impl Panel {
    pub fn next(self) -> Self {
        match self {
            Self::Run => Self::Settings,
            Self::Settings => Self::Subreddits,
            Self::Subreddits => Self::Logs,
            Self::Logs => Self::Run,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Run => "Run",
            Self::Settings => "Settings",
            Self::Subreddits => "Subreddits",
            Self::Logs => "Logs",
        }
    }
}

/// Run 패널의 행 순서
pub const RUN_ROWS: [&str; 4] = ["Mode", "Runs per day", "Start time", "End time"];

// ═══════════════════════════════════════════════════════
// 입력 모드
// ═══════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum EditTarget {
    RunsPerDay,
    StartTime,
    EndTime,
    Setting(usize),
    /// "name=value" 형태로 새 설정 필드 추가
    NewSetting,
    Subreddit(RowId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputMode {
    /// 패널 내비게이션
    Normal,
    /// 인라인 입력 팝업
    InlineInput {
        prompt: String,
        value: String,
        /// 문자 단위 커서
        cursor: usize,
        target: EditTarget,
    },
}

// ═══════════════════════════════════════════════════════
// App
// ═══════════════════════════════════════════════════════

pub struct App {
    pub page: ModulePage,
    pub notices: NoticeQueue,
    pub channel_label: String,

    pub focus: Panel,
    pub run_selected: usize,
    pub settings_selected: usize,
    pub subreddit_selected: usize,
    pub log_scroll: usize,

    pub input_mode: InputMode,
    pub toast: Option<(Notice, Instant)>,
    pub status_message: Option<(String, Instant)>,

    pub quit: bool,
}

impl App {
    pub fn new(page: ModulePage, notices: NoticeQueue, channel_label: &str) -> Self {
        Self {
            page,
            notices,
            channel_label: channel_label.to_string(),
            focus: Panel::Run,
            run_selected: 0,
            settings_selected: 0,
            subreddit_selected: 0,
            log_scroll: 0,
            input_mode: InputMode::Normal,
            toast: None,
            status_message: None,
            quit: false,
        }
    }

    /// 하단 힌트바 우측에 잠깐 보이는 메시지
    pub fn flash(&mut self, msg: &str) {
        self.status_message = Some((msg.to_string(), Instant::now()));
    }

    /// 디스패처 알림을 토스트로 옮김 (가장 최근 것만 표시)
    pub fn poll_notices(&mut self) {
        if let Some(last) = self.notices.drain().pop() {
            self.toast = Some((last, Instant::now()));
        }
    }

    // ── 내비게이션 ──

    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    fn panel_len(&self) -> usize {
        match self.focus {
            Panel::Run => RUN_ROWS.len(),
            Panel::Settings => self.page.settings.fields().len(),
            Panel::Subreddits => self.page.subreddits.len(),
            Panel::Logs => self.page.logs.snapshot().len(),
        }
    }

    fn selected_mut(&mut self) -> &mut usize {
        match self.focus {
            Panel::Run => &mut self.run_selected,
            Panel::Settings => &mut self.settings_selected,
            Panel::Subreddits => &mut self.subreddit_selected,
            Panel::Logs => &mut self.log_scroll,
        }
    }

    pub fn move_up(&mut self) {
        let sel = self.selected_mut();
        *sel = sel.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let len = self.panel_len();
        let sel = self.selected_mut();
        if *sel + 1 < len {
            *sel += 1;
        }
    }

    /// 삭제 등으로 목록이 줄었을 때 선택 인덱스 보정
    fn clamp_selection(&mut self) {
        let len = self.page.subreddits.len();
        if self.subreddit_selected >= len {
            self.subreddit_selected = len.saturating_sub(1);
        }
        let len = self.page.settings.fields().len();
        if self.settings_selected >= len {
            self.settings_selected = len.saturating_sub(1);
        }
    }

    // ── Enter: 토글 또는 편집 시작 ──

    pub fn activate(&mut self) {
        match self.focus {
            Panel::Run => match self.run_selected {
                0 => {
                    let c = &mut self.page.run_controls;
                    c.indefinite = !c.indefinite;
                }
                1 => self.begin_edit(EditTarget::RunsPerDay),
                2 => self.begin_edit(EditTarget::StartTime),
                _ => self.begin_edit(EditTarget::EndTime),
            },
            Panel::Settings => {
                if self.settings_selected < self.page.settings.fields().len() {
                    self.begin_edit(EditTarget::Setting(self.settings_selected));
                } else {
                    self.begin_edit(EditTarget::NewSetting);
                }
            }
            Panel::Subreddits => {
                if let Some(row) = self.page.subreddits.rows().get(self.subreddit_selected) {
                    self.begin_edit(EditTarget::Subreddit(row.id));
                }
            }
            Panel::Logs => {}
        }
    }

    pub fn begin_edit(&mut self, target: EditTarget) {
        let (prompt, value) = match &target {
            EditTarget::RunsPerDay => ("Runs per day".to_string(), self.page.run_controls.runs_per_day.clone()),
            EditTarget::StartTime => ("Start time (HH:MM)".to_string(), self.page.run_controls.start_time.clone()),
            EditTarget::EndTime => ("End time (HH:MM)".to_string(), self.page.run_controls.end_time.clone()),
            EditTarget::Setting(idx) => match self.page.settings.fields().get(*idx) {
                Some((name, value)) => (name.clone(), value.clone()),
                None => return,
            },
            EditTarget::NewSetting => ("New field (name=value)".to_string(), String::new()),
            EditTarget::Subreddit(id) => {
                let value = self
                    .page
                    .subreddits
                    .rows()
                    .iter()
                    .find(|r| r.id == *id)
                    .map(|r| r.value.clone())
                    .unwrap_or_default();
                ("Subreddit".to_string(), value)
            }
        };
        let cursor = value.chars().count();
        self.input_mode = InputMode::InlineInput { prompt, value, cursor, target };
    }

    pub fn cancel_edit(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// 인라인 입력 확정: 대상 컨트롤에 값 반영
    pub fn commit_edit(&mut self) {
        let InputMode::InlineInput { value, target, .. } =
            std::mem::replace(&mut self.input_mode, InputMode::Normal)
        else {
            return;
        };

        match target {
            EditTarget::RunsPerDay => self.page.run_controls.runs_per_day = value,
            EditTarget::StartTime => self.page.run_controls.start_time = value,
            EditTarget::EndTime => self.page.run_controls.end_time = value,
            EditTarget::Setting(idx) => {
                if let Some((_, v)) = self.page.settings.fields_mut().get_mut(idx) {
                    *v = value;
                }
            }
            EditTarget::NewSetting => match value.split_once('=') {
                Some((name, v)) if !name.trim().is_empty() => {
                    self.page.settings.push(name.trim(), v);
                    self.settings_selected = self.page.settings.fields().len() - 1;
                }
                _ => self.flash("Expected name=value"),
            },
            EditTarget::Subreddit(id) => {
                self.page.subreddits.set_value(id, value);
            }
        }
    }

    // ── 커맨드 ──

    pub fn trigger_run(&mut self) {
        match self.page.run() {
            Dispatch::Sent => self.flash("Run requested"),
            Dispatch::Ignored => self.flash("Run already pending"),
        }
    }

    pub fn trigger_stop(&mut self) {
        self.page.stop();
        self.flash("Stop requested");
    }

    pub fn trigger_save(&mut self) {
        if self.page.save() == Dispatch::Ignored {
            self.flash("Save already pending");
        }
    }

    pub fn add_subreddit(&mut self) {
        let id = self.page.subreddits.add();
        self.focus = Panel::Subreddits;
        self.subreddit_selected = self.page.subreddits.len() - 1;
        self.begin_edit(EditTarget::Subreddit(id));
    }

    pub fn remove_subreddit(&mut self) {
        if let Some(row) = self.page.subreddits.rows().get(self.subreddit_selected) {
            let id = row.id;
            self.page.subreddits.remove(id);
            self.clamp_selection();
        }
    }

    // ── 인라인 입력 편집 ──

    pub fn input_insert(&mut self, c: char) {
        if let InputMode::InlineInput { value, cursor, .. } = &mut self.input_mode {
            let at = byte_index(value, *cursor);
            value.insert(at, c);
            *cursor += 1;
        }
    }

    pub fn input_backspace(&mut self) {
        if let InputMode::InlineInput { value, cursor, .. } = &mut self.input_mode {
            if *cursor > 0 {
                let at = byte_index(value, *cursor - 1);
                value.remove(at);
                *cursor -= 1;
            }
        }
    }

    pub fn input_left(&mut self) {
        if let InputMode::InlineInput { cursor, .. } = &mut self.input_mode {
            *cursor = cursor.saturating_sub(1);
        }
    }

    pub fn input_right(&mut self) {
        if let InputMode::InlineInput { value, cursor, .. } = &mut self.input_mode {
            if *cursor < value.chars().count() {
                *cursor += 1;
            }
        }
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(s.len())
}
