//! 렌더링: 상태바, 시스템 모니터, 실행/설정/subreddit 패널, 로그, 힌트바, 오버레이

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use leam_console::surface::NoticeKind;

use super::app::{App, EditTarget, InputMode, Panel, RUN_ROWS};
use super::theme::Theme;

// ═══════════════════════════════════════════════════════
// 최상위 렌더 함수 (전체 레이아웃)
// ═══════════════════════════════════════════════════════

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // 상태바
            Constraint::Length(6),  // 시스템 모니터
            Constraint::Min(8),     // 패널
            Constraint::Length(2),  // 힌트바
        ])
        .split(area);

    render_status_bar(app, frame, chunks[0]);
    render_monitor(app, frame, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
        .split(chunks[2]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(RUN_ROWS.len() as u16 + 3),
            Constraint::Min(4),
            Constraint::Min(4),
        ])
        .split(body[0]);

    render_run_panel(app, frame, left[0]);
    render_settings_panel(app, frame, left[1]);
    render_subreddit_panel(app, frame, left[2]);
    render_logs(app, frame, body[1]);
    render_hint_bar(app, frame, chunks[3]);

    if let Some((notice, at)) = &app.toast {
        if at.elapsed().as_secs() < 5 {
            render_toast(&notice.message, notice.kind, frame, area);
        }
    }

    // 인라인 입력 오버레이 (모달)
    if let InputMode::InlineInput { ref prompt, ref value, cursor, .. } = app.input_mode {
        let popup_height = 5u16;
        let popup_width = 60.min(area.width.saturating_sub(4));
        let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
        let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
        let popup = Rect::new(popup_x, popup_y, popup_width, popup_height);
        frame.render_widget(Clear, popup);
        render_inline_input(prompt, value, cursor, frame, popup);
    }
}

fn panel_block(app: &App, panel: Panel) -> Block<'static> {
    let active = app.focus == panel;
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if active { Theme::border_active() } else { Theme::border() })
        .title(Span::styled(
            format!(" {} ", panel.title()),
            if active { Theme::title() } else { Theme::dimmed() },
        ))
}

fn selection_prefix(active: bool, is_sel: bool) -> Span<'static> {
    if active && is_sel {
        Span::styled("▸ ", Theme::selected_arrow())
    } else {
        Span::raw("  ")
    }
}

// ═══════════════════════════════════════════════════════
// 상태바
// ═══════════════════════════════════════════════════════

pub fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = match app.page.commands.module_status().as_deref() {
        Some("running") => Span::styled("● RUNNING", Theme::running()),
        Some("stopped") => Span::styled("○ STOPPED", Theme::stopped()),
        Some(other) => Span::styled(format!("? {}", other.to_uppercase()), Theme::warning()),
        None => Span::styled("○ UNKNOWN", Theme::stopped()),
    };

    let line = Line::from(vec![
        Span::styled("Module ", Theme::label_module()),
        Span::styled(app.page.module().to_string(), Theme::title()),
        Span::raw("  "),
        status,
        Span::raw("  "),
        Span::styled("Channel ", Theme::label_stat()),
        Span::styled(app.channel_label.clone(), Theme::dimmed()),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border());

    frame.render_widget(
        Paragraph::new(line).alignment(Alignment::Center).block(block),
        area,
    );
}

// ═══════════════════════════════════════════════════════
// 시스템 모니터
// ═══════════════════════════════════════════════════════

pub fn render_monitor(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border())
        .title(Span::styled(" System ", Theme::title()));

    let Some(view) = app.page.monitor.latest() else {
        frame.render_widget(
            Paragraph::new(Span::styled("Waiting for stats...", Theme::placeholder())).block(block),
            area,
        );
        return;
    };

    let stat = |label: &str, value: String| {
        vec![
            Span::styled(format!("{} ", label), Theme::label_stat()),
            Span::styled(value, Theme::editor_value()),
            Span::raw("   "),
        ]
    };

    let lines = vec![
        Line::from(
            [
                vec![Span::styled(view.timestamp.clone(), Theme::dimmed()), Span::raw("   ")],
                stat("CPU", view.cpu.clone()),
                stat("Uptime", view.uptime.clone()),
            ]
            .concat(),
        ),
        Line::from(
            [
                stat("RAM", format!("{}/{} ({})", view.ram_used, view.ram_total, view.ram_percent)),
                stat("Disk", format!("{}/{} ({})", view.disk_used, view.disk_total, view.disk_percent)),
            ]
            .concat(),
        ),
        Line::from(stat("Network", format!("↑{} ↓{}", view.net_up, view.net_down))),
        Line::from(stat("Temp", view.temp_summary())),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ═══════════════════════════════════════════════════════
// 실행 패널
// ═══════════════════════════════════════════════════════

pub fn render_run_panel(app: &App, frame: &mut Frame, area: Rect) {
    let active = app.focus == Panel::Run;
    let controls = &app.page.run_controls;
    let values = [
        if controls.indefinite { "◆ indefinite".to_string() } else { "◇ finite".to_string() },
        controls.runs_per_day.clone(),
        controls.start_time.clone(),
        controls.end_time.clone(),
    ];

    let mut lines: Vec<Line> = RUN_ROWS
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (label, value))| {
            let is_sel = i == app.run_selected;
            Line::from(vec![
                selection_prefix(active, is_sel),
                Span::styled(format!("{:<14}", label), Theme::editor_key()),
                if value.is_empty() {
                    Span::styled("(not set)", Theme::dimmed())
                } else if active && is_sel {
                    Span::styled(value, Theme::selected())
                } else {
                    Span::styled(value, Theme::editor_value())
                },
            ])
        })
        .collect();

    let run = app.page.commands.run_button();
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("[r] {}", run.label),
            if run.disabled { Theme::disabled() } else { Theme::shortcut() },
        ),
        Span::raw("   "),
        Span::styled("[x] Stop", Theme::shortcut()),
    ]));

    frame.render_widget(Paragraph::new(lines).block(panel_block(app, Panel::Run)), area);
}

// ═══════════════════════════════════════════════════════
// 설정 패널
// ═══════════════════════════════════════════════════════

pub fn render_settings_panel(app: &App, frame: &mut Frame, area: Rect) {
    let active = app.focus == Panel::Settings;
    let editing = match &app.input_mode {
        InputMode::InlineInput { target: EditTarget::Setting(idx), .. } => Some(*idx),
        _ => None,
    };

    let mut lines: Vec<Line> = app
        .page
        .settings
        .fields()
        .iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let is_sel = i == app.settings_selected;
            let style = if editing == Some(i) {
                Theme::editor_editing()
            } else {
                Theme::editor_value()
            };
            Line::from(vec![
                selection_prefix(active, is_sel),
                Span::styled(format!("{:<24}", name), Theme::editor_key()),
                Span::styled(value.clone(), style),
            ])
        })
        .collect();

    if lines.is_empty() {
        lines.push(Line::from(Span::styled("  No fields (n to add)", Theme::placeholder())));
    }

    let save = app.page.commands.save_button();
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("[S] {}", save.label),
            if save.disabled { Theme::disabled() } else { Theme::shortcut() },
        ),
    ]));

    frame.render_widget(Paragraph::new(lines).block(panel_block(app, Panel::Settings)), area);
}

// ═══════════════════════════════════════════════════════
// subreddit 패널
// ═══════════════════════════════════════════════════════

pub fn render_subreddit_panel(app: &App, frame: &mut Frame, area: Rect) {
    let active = app.focus == Panel::Subreddits;
    let mut lines: Vec<Line> = app
        .page
        .subreddits
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let is_sel = i == app.subreddit_selected;
            let value = if row.value.is_empty() {
                Span::styled("e.g., gaming", Theme::placeholder())
            } else {
                Span::styled(format!("r/{}", row.value), Theme::editor_value())
            };
            Line::from(vec![
                selection_prefix(active, is_sel),
                value,
                Span::styled("  [-]", Theme::dimmed()),
            ])
        })
        .collect();

    lines.push(Line::from(Span::styled("  [a] + add", Theme::shortcut())));
    frame.render_widget(Paragraph::new(lines).block(panel_block(app, Panel::Subreddits)), area);
}

// ═══════════════════════════════════════════════════════
// 로그 (최신이 위)
// ═══════════════════════════════════════════════════════

pub fn render_logs(app: &App, frame: &mut Frame, area: Rect) {
    let snapshot = app.page.logs.snapshot();
    let lines: Vec<Line> = match snapshot.placeholder() {
        Some(text) => vec![Line::from(Span::styled(text.to_string(), Theme::placeholder()))],
        None => snapshot
            .lines()
            .skip(app.log_scroll)
            .map(|l| Line::from(Span::styled(l.to_string(), Theme::console_text())))
            .collect(),
    };

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(panel_block(app, Panel::Logs)),
        area,
    );
}

// ═══════════════════════════════════════════════════════
// 힌트바 (최하단, 포커스별 단축키 안내)
// ═══════════════════════════════════════════════════════

pub fn render_hint_bar(app: &App, frame: &mut Frame, area: Rect) {
    let hints: Vec<(&str, &str)> = match &app.input_mode {
        InputMode::Normal => {
            let mut h = vec![("Tab", "패널"), ("↑↓/jk", "이동"), ("Enter", "편집")];
            match app.focus {
                Panel::Run => h.extend([("r", "실행"), ("x", "정지")]),
                Panel::Settings => h.extend([("n", "필드 추가"), ("S", "저장")]),
                Panel::Subreddits => h.extend([("a", "추가"), ("d", "삭제")]),
                Panel::Logs => {}
            }
            h.push(("q", "종료"));
            h
        }
        InputMode::InlineInput { .. } => {
            vec![("Enter", "확인"), ("Esc", "취소"), ("←→", "커서")]
        }
    };

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  │  ", Theme::dimmed()));
        }
        spans.push(Span::styled(key.to_string(), Theme::shortcut()));
        spans.push(Span::styled(format!(" {}", desc), Theme::hint_bar()));
    }

    // 일시적 상태 메시지가 있으면 우측에 표시
    if let Some((msg, at)) = &app.status_message {
        if at.elapsed().as_secs() < 5 {
            let padding = area.width.saturating_sub(
                spans.iter().map(|s| s.width() as u16).sum::<u16>() + msg.len() as u16 + 4,
            );
            if padding > 0 {
                spans.push(Span::raw(" ".repeat(padding as usize)));
            }
            spans.push(Span::styled(format!(" {} ", msg), Theme::success()));
        }
    }

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Theme::border());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// ═══════════════════════════════════════════════════════
// 오버레이
// ═══════════════════════════════════════════════════════

fn render_toast(message: &str, kind: NoticeKind, frame: &mut Frame, area: Rect) {
    let width = (message.chars().count() as u16 + 4).min(area.width.saturating_sub(2));
    let popup = Rect::new(area.x + area.width.saturating_sub(width + 1), area.y + 1, width, 3);
    let style = match kind {
        NoticeKind::Success => Theme::success(),
        NoticeKind::Error => Theme::error(),
        NoticeKind::Info => Theme::editor_value(),
    };

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(Span::styled(message.to_string(), style)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(style),
        ),
        popup,
    );
}

fn render_inline_input(prompt: &str, value: &str, cursor: usize, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border_active())
        .title(Span::styled(format!(" {} ", prompt), Theme::title()));

    let (before, after): (String, String) = {
        let chars: Vec<char> = value.chars().collect();
        let split = cursor.min(chars.len());
        (chars[..split].iter().collect(), chars[split..].iter().collect())
    };

    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(before, Theme::editor_editing()),
        Span::styled("▏", Theme::selected_arrow()),
        Span::styled(after, Theme::editor_editing()),
    ]);

    frame.render_widget(Paragraph::new(vec![Line::from(""), line]).block(block), area);
}
