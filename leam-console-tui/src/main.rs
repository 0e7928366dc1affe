//! leam-console-tui: 모듈 하나를 제어하는 터미널 패널
//!
//! ```text
//! leam-console-tui --module Reddit_Story_Generator --field story_count=5
//! leam-console-tui --local                                  # 백엔드 없이 로컬 샘플러만
//! ```

mod tui;

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use leam_console::channel::{Channel, LocalChannel, SocketChannel};
use leam_console::config::ConsoleConfig;
use leam_console::page::ModulePage;
use leam_console::sampler;
use leam_console::surface::NoticeQueue;

const LOCAL_MODULE: &str = "local";
const LOG_FILE: &str = "leam-console-tui.log";

#[derive(Debug, Default)]
struct Args {
    module: Option<String>,
    connect: Option<String>,
    local: bool,
    /// `--field name=value` (반복 가능, 순서 유지)
    fields: Vec<(String, String)>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--module" | "-m" => {
                parsed.module = Some(args.next().ok_or_else(|| anyhow::anyhow!("--module needs a value"))?);
            }
            "--connect" | "-c" => {
                parsed.connect = Some(args.next().ok_or_else(|| anyhow::anyhow!("--connect needs a value"))?);
            }
            "--field" | "-f" => {
                let raw = args.next().ok_or_else(|| anyhow::anyhow!("--field needs name=value"))?;
                let (name, value) = raw
                    .split_once('=')
                    .ok_or_else(|| anyhow::anyhow!("--field expects name=value, got '{}'", raw))?;
                parsed.fields.push((name.to_string(), value.to_string()));
            }
            "--local" => parsed.local = true,
            "--help" | "-h" => {
                println!("Usage: leam-console-tui [--module NAME] [--connect ADDR] [--local] [--field NAME=VALUE]...");
                std::process::exit(0);
            }
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }
    Ok(parsed)
}

/// 화면을 TUI가 쓰므로 tracing 출력은 파일로
fn init_logging() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    tracing::info!("Logging to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let args = parse_args(std::env::args().skip(1))?;
    let mut cfg = ConsoleConfig::load()?;
    if let Some(module) = args.module {
        cfg.module = Some(module);
    }
    if let Some(addr) = args.connect {
        cfg.channel.addr = addr;
    }

    let (channel, module, label): (Arc<dyn Channel>, String, String) = if args.local {
        let channel: Arc<dyn Channel> = Arc::new(LocalChannel::loopback());
        let module = cfg.module.clone().unwrap_or_else(|| LOCAL_MODULE.to_string());
        (channel, module, "local loopback".to_string())
    } else {
        let module = cfg.require_module()?.to_string();
        let channel: Arc<dyn Channel> = Arc::new(SocketChannel::connect(&cfg.channel.addr).await?);
        (channel, module, cfg.channel.addr.clone())
    };

    let notices = NoticeQueue::new();
    let mut page = ModulePage::mount(channel.clone(), &module, &cfg, Arc::new(notices.clone()));
    for (name, value) in args.fields {
        page.settings.push(name, value);
    }
    page.subreddits.add();

    let feed = args
        .local
        .then(|| sampler::spawn_feed(channel.clone(), Duration::from_secs(cfg.monitor.interval_secs)));

    let result = tui::run(tui::app::App::new(page, notices, &label)).await;

    if let Some(feed) = feed {
        feed.abort();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_fields() {
        let a = args(&["-m", "alpha", "--field", "voice=en", "-f", "note=a=b"]).unwrap();
        assert_eq!(a.module.as_deref(), Some("alpha"));
        assert_eq!(
            a.fields,
            vec![
                ("voice".to_string(), "en".to_string()),
                ("note".to_string(), "a=b".to_string()),
            ]
        );
        assert!(args(&["--field", "novalue"]).is_err());
        assert!(args(&["--local"]).unwrap().local);
    }
}
