//! 테마 · 스타일 상수 (콘솔 전체 공통 색상)

use ratatui::style::{Color, Modifier, Style};

/// 모든 TUI 스타일을 중앙 관리하는 네임스페이스
pub struct Theme;

impl Theme {
    // ─── 상태 표시 ───
    pub fn running()  -> Style { Style::default().fg(Color::Green).add_modifier(Modifier::BOLD) }
    pub fn stopped()  -> Style { Style::default().fg(Color::DarkGray) }
    pub fn warning()  -> Style { Style::default().fg(Color::Yellow) }
    pub fn error()    -> Style { Style::default().fg(Color::Red) }
    pub fn success()  -> Style { Style::default().fg(Color::Green) }

    // ─── 테두리 ───
    pub fn border()        -> Style { Style::default().fg(Color::DarkGray) }
    pub fn border_active() -> Style { Style::default().fg(Color::Cyan) }

    // ─── 타이틀 · 라벨 ───
    pub fn title()        -> Style { Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD) }
    pub fn label_module() -> Style { Style::default().fg(Color::Cyan) }
    pub fn label_stat()   -> Style { Style::default().fg(Color::Blue) }

    // ─── 선택 · 버튼 ───
    pub fn selected()       -> Style { Style::default().bg(Color::DarkGray).fg(Color::White).add_modifier(Modifier::BOLD) }
    pub fn selected_arrow() -> Style { Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD) }
    pub fn shortcut()       -> Style { Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD) }
    pub fn disabled()       -> Style { Style::default().fg(Color::DarkGray) }

    // ─── 에디터 ───
    pub fn editor_key()     -> Style { Style::default().fg(Color::Cyan) }
    pub fn editor_value()   -> Style { Style::default().fg(Color::White) }
    pub fn editor_editing() -> Style { Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED) }

    // ─── 기타 ───
    pub fn dimmed()       -> Style { Style::default().fg(Color::DarkGray) }
    pub fn hint_bar()     -> Style { Style::default().fg(Color::DarkGray) }
    pub fn console_text() -> Style { Style::default().fg(Color::White) }
    pub fn placeholder()  -> Style { Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC) }
}
