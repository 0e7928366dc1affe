//! leam-console TUI: 모듈 페이지 하나를 터미널에 띄우는 인터랙티브 화면
//!
//! `main.rs`에서 `tui::run(app).await`로 호출됩니다.
//! 채널 이벤트는 `ModulePage` 컴포넌트가 백그라운드에서 반영하므로,
//! 여기서는 키 입력 처리와 주기적 렌더링만 합니다.

pub mod app;
pub mod render;
pub mod theme;

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use app::*;

// ═══════════════════════════════════════════════════════
// 엔트리포인트
// ═══════════════════════════════════════════════════════

pub async fn run(mut app: App) -> anyhow::Result<()> {
    // 패닉 시 터미널 복원
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // 터미널 초기화
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // ── 메인 이벤트 루프 ──────────────────────────────
    let tick = Duration::from_millis(50);
    let mut last_render: Option<Instant> = None;

    loop {
        app.poll_notices();

        // --- 렌더링 ---
        if last_render.map_or(true, |t| t.elapsed() >= Duration::from_millis(16)) {
            terminal.draw(|f| render::render(&app, f))?;
            last_render = Some(Instant::now());
        }

        if app.quit {
            break;
        }

        // --- 이벤트 폴링 ---
        // crossterm poll은 블로킹이므로 런타임 워커를 양보
        let ready = tokio::task::block_in_place(|| event::poll(tick))?;
        if ready {
            if let Event::Key(key) = event::read()? {
                // Release/Repeat 이벤트 무시: Press만 처리
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key(&mut app, key);
            }
        }
    }

    // ── 정리 ──────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    tracing::info!("TUI closed");
    Ok(())
}

// ═══════════════════════════════════════════════════════
// 키 이벤트 라우팅
// ═══════════════════════════════════════════════════════

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C → 강제 종료
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }

    match app.input_mode {
        // ────────────────
        // 노멀 모드 (패널)
        // ────────────────
        InputMode::Normal => match key.code {
            KeyCode::Tab => app.cycle_focus(),
            KeyCode::Up | KeyCode::Char('k') => app.move_up(),
            KeyCode::Down | KeyCode::Char('j') => app.move_down(),
            KeyCode::Enter => app.activate(),
            KeyCode::Char('r') => app.trigger_run(),
            KeyCode::Char('x') => app.trigger_stop(),
            KeyCode::Char('S') => app.trigger_save(),
            KeyCode::Char('a') => app.add_subreddit(),
            KeyCode::Char('d') if app.focus == Panel::Subreddits => app.remove_subreddit(),
            KeyCode::Char('n') => {
                app.focus = Panel::Settings;
                app.begin_edit(EditTarget::NewSetting);
            }
            KeyCode::PageUp => app.log_scroll = app.log_scroll.saturating_sub(10),
            KeyCode::PageDown => {
                let len = app.page.logs.snapshot().len();
                app.log_scroll = (app.log_scroll + 10).min(len.saturating_sub(1));
            }
            KeyCode::Char('q') => app.quit = true,
            _ => {}
        },

        // ──────────────────
        // 인라인 입력 (타이핑)
        // ──────────────────
        InputMode::InlineInput { .. } => match key.code {
            KeyCode::Enter => app.commit_edit(),
            KeyCode::Esc => app.cancel_edit(),
            KeyCode::Backspace => app.input_backspace(),
            KeyCode::Left => app.input_left(),
            KeyCode::Right => app.input_right(),
            KeyCode::Char(c) => app.input_insert(c),
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use leam_console::channel::{Channel, LocalChannel};
    use leam_console::config::ConsoleConfig;
    use leam_console::page::ModulePage;
    use leam_console::surface::NoticeQueue;
    use serde_json::json;

    fn setup() -> (LocalChannel, App) {
        let ch = LocalChannel::new();
        let notices = NoticeQueue::new();
        let channel: Arc<dyn Channel> = Arc::new(ch.clone());
        let page = ModulePage::mount(channel, "alpha", &ConsoleConfig::default(), Arc::new(notices.clone()));
        (ch, App::new(page, notices, "local"))
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_edit_runs_per_day_then_run() {
        let (ch, mut app) = setup();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.input_mode, InputMode::InlineInput { .. }));
        // 편집 중 'r'은 문자 입력
        type_str(&mut app, "3r");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.page.run_controls.runs_per_day, "3");

        press(&mut app, KeyCode::Char('r'));
        let sent = ch.sent_named("run_module");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["module"], "alpha");
        assert_eq!(sent[0]["options"]["runs_per_day"], "3");
        assert_eq!(sent[0]["options"]["mode"], "finite");
    }

    #[test]
    fn test_mode_toggle() {
        let (ch, mut app) = setup();
        press(&mut app, KeyCode::Enter);
        assert!(app.page.run_controls.indefinite);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(ch.sent_named("run_module")[0]["options"]["mode"], "indefinite");
    }

    #[test]
    fn test_double_save_sends_once() {
        let (ch, mut app) = setup();
        app.page.settings.push("story_count", "5");
        press(&mut app, KeyCode::Char('S'));
        press(&mut app, KeyCode::Char('S'));
        assert_eq!(ch.sent_named("save_settings").len(), 1);
        assert!(app.page.commands.save_button().disabled);

        ch.inject("settings_saved", json!({ "status": "success" }));
        app.poll_notices();
        let (notice, _) = app.toast.clone().unwrap();
        assert_eq!(notice.message, "Settings saved successfully!");
        assert!(!app.page.commands.save_button().disabled);
    }

    #[test]
    fn test_new_setting_and_subreddits() {
        let (ch, mut app) = setup();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "voice=en");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.page.settings.fields(), &[("voice".to_string(), "en".to_string())]);

        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "gaming");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.page.subreddits.len(), 2);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.page.subreddits.values(), vec!["gaming".to_string()]);

        press(&mut app, KeyCode::Char('S'));
        let saved = ch.sent_named("save_settings");
        assert_eq!(saved[0]["settings"]["voice"], "en");
        assert_eq!(saved[0]["settings"]["subreddit[]"], "gaming");
    }

    #[test]
    fn test_quit_keys() {
        let (_ch, mut app) = setup();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.quit);

        let (_ch, mut app) = setup();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.quit);
    }
}
