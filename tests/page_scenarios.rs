/// 페이지 단위 통합 테스트
/// 채널 하나를 LocalChannel로 주입하고, 인바운드 이벤트를 흘려서 화면 상태를 검증

use std::sync::Arc;

use chrono::FixedOffset;
use leam_console::channel::{Channel, LocalChannel};
use leam_console::config::ConsoleConfig;
use leam_console::dispatch::{Dispatch, SaveState};
use leam_console::page::ModulePage;
use leam_console::surface::{NoticeKind, NoticeQueue};
use leam_console::telemetry::TelemetryRenderer;
use serde_json::json;

fn mount(module: &str) -> (LocalChannel, NoticeQueue, ModulePage) {
    let ch = LocalChannel::new();
    let notices = NoticeQueue::new();
    let channel: Arc<dyn Channel> = Arc::new(ch.clone());
    let renderer = TelemetryRenderer::with_offset(FixedOffset::east_opt(0).unwrap());
    let page = ModulePage::mount_with_renderer(
        channel,
        module,
        &ConsoleConfig::default(),
        Arc::new(notices.clone()),
        renderer,
    );
    (ch, notices, page)
}

#[test]
fn test_alpha_beta_log_scenario() {
    let (ch, _notices, page) = mount("alpha");
    assert_eq!(ch.sent_named("subscribe_logs"), vec![json!({ "module": "alpha" })]);

    let before = page.render();
    ch.inject("module_log", json!({ "module": "beta", "line": "x" }));
    assert_eq!(page.render(), before, "foreign module must not touch the page");

    ch.inject("module_log", json!({ "module": "alpha", "line": "hello" }));
    let logs = page.render();
    let logs = logs.find_by_id("logs").unwrap();
    assert_eq!(logs.text_content(), "hello");
    assert!(logs.child_elements().all(|e| e.has_class("log-line")));

    println!("✓ alpha/beta scenario passed");
}

#[test]
fn test_log_capacity_from_config() {
    let ch = LocalChannel::new();
    let mut cfg = ConsoleConfig::default();
    cfg.logs.capacity = 4;
    let page = ModulePage::mount(Arc::new(ch.clone()), "alpha", &cfg, Arc::new(NoticeQueue::new()));

    for i in 0..10 {
        ch.inject("module_log", json!({ "module": "alpha", "line": format!("line {}", i) }));
    }
    let snap = page.logs.snapshot();
    assert_eq!(snap.len(), 4);
    assert_eq!(snap.lines().next(), Some("line 9"));
    assert_eq!(snap.accepted(), 10);
}

#[test]
fn test_cpu_memory_scenario() {
    let (ch, _notices, page) = mount("alpha");
    ch.inject(
        "stats",
        json!({ "cpu": 42, "memory": { "used": 100, "total": 200, "percent": 50 } }),
    );

    let view = page.monitor.latest().unwrap();
    assert_eq!(view.cpu, "42%");
    assert_eq!((view.ram_used.as_str(), view.ram_total.as_str()), ("100MB", "200MB"));
    assert_eq!(view.ram_percent, "50%");
    assert_eq!(view.net_up, "N/A");
    assert_eq!(view.disk_used, "N/A");
    assert_eq!(view.temp_summary(), "N/A");

    let line = view.summary_line();
    assert!(line.contains("CPU: 42%"));
    assert!(line.contains("RAM: 100MB/200MB (50%)"));
    assert!(line.contains("Network: ↑N/A ↓N/A"));
    assert!(line.ends_with("Temp: N/A"));

    let tree = page.render();
    let monitor = tree.find_by_id("system-monitor").unwrap();
    assert!(monitor.text_content().contains("Temp: N/A"));
}

#[test]
fn test_save_ack_scenario() {
    let (ch, notices, page) = mount("alpha");
    let mut page = page;
    page.settings.push("username", "bob");

    assert_eq!(page.save(), Dispatch::Sent);
    let sent = ch.sent_named("save_settings");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["module"], "alpha");
    assert_eq!(sent[0]["settings"], json!({ "username": "bob" }));
    assert!(sent[0].get("run_options").is_some());

    let button = page.commands.save_button();
    assert!(button.disabled);
    assert_eq!(button.label, "Saving...");
    assert_eq!(page.commands.save_state(), SaveState::Pending);

    ch.inject("settings_saved", json!({ "status": "success" }));
    let button = page.commands.save_button();
    assert!(!button.disabled);
    assert_eq!(button.label, "Save Settings");

    let shown = notices.drain();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].kind, NoticeKind::Success);
    assert_eq!(shown[0].message, "Settings saved successfully!");
}

#[test]
fn test_save_includes_subreddit_rows() {
    let (ch, _notices, mut page) = mount("alpha");
    page.settings.push("username", "bob");
    let first = page.subreddits.add();
    let second = page.subreddits.add();
    page.subreddits.set_value(first, "gaming");
    page.subreddits.set_value(second, "AskReddit");

    assert_eq!(page.save(), Dispatch::Sent);
    let sent = ch.sent_named("save_settings");
    assert_eq!(sent.len(), 1);
    // 반복 이름은 마지막 행 값이 남음
    assert_eq!(
        sent[0]["settings"],
        json!({ "username": "bob", "subreddit[]": "AskReddit" })
    );

    page.subreddits.remove(second);
    ch.inject("settings_saved", json!({ "status": "success" }));
    page.save();
    assert_eq!(ch.sent_named("save_settings")[1]["settings"]["subreddit[]"], "gaming");
}

#[test]
fn test_failed_save_restores_button() {
    let (ch, notices, page) = mount("alpha");
    page.save();
    ch.inject("settings_saved", json!({ "status": "error", "error": "disk full" }));

    assert!(!page.commands.save_button().disabled);
    let shown = notices.drain();
    assert_eq!(shown[0].kind, NoticeKind::Error);
    assert_eq!(shown[0].message, "Error saving settings: disk full");
}

#[test]
fn test_double_click_scenario() {
    let (ch, _notices, page) = mount("alpha");
    assert_eq!(page.save(), Dispatch::Sent);
    let after_first = page.render();

    assert_eq!(page.save(), Dispatch::Ignored);
    assert_eq!(ch.sent_named("save_settings").len(), 1);
    assert_eq!(page.render(), after_first);
}

#[test]
fn test_run_then_status_ack() {
    let (ch, _notices, page) = mount("alpha");
    assert_eq!(page.run(), Dispatch::Sent);
    assert_eq!(page.run(), Dispatch::Ignored);
    assert_eq!(ch.sent_named("run_module").len(), 1);
    assert_eq!(page.commands.run_button().label, "Starting...");

    ch.inject("module_status", json!({ "module": "beta", "status": "running" }));
    assert!(page.commands.run_button().disabled);

    ch.inject("module_status", json!({ "module": "alpha", "status": "running" }));
    assert!(!page.commands.run_button().disabled);
    assert_eq!(page.commands.module_status().as_deref(), Some("running"));

    page.stop();
    assert_eq!(ch.sent_named("stop_module"), vec![json!({ "module": "alpha" })]);
}

#[test]
fn test_add_twice_remove_first_on_page() {
    let (_ch, _notices, mut page) = mount("alpha");
    let first = page.subreddits.add();
    let second = page.subreddits.add();
    page.subreddits.remove(first);

    let tree = page.render();
    let rows: Vec<_> = tree.find_by_id("subreddits").unwrap().child_elements().collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].attrs.get("data-row").map(String::as_str), Some(second.to_string().as_str()));
}

#[test]
fn test_disconnected_channel_is_silent() {
    let (ch, _notices, page) = mount("alpha");
    ch.disconnect();
    assert_eq!(page.save(), Dispatch::Sent);
    assert_eq!(ch.sent_named("save_settings").len(), 0);
}
