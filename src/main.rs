//! leam-console: 헤드리스 로그 테일 + 시스템 모니터
//!
//! ## 사용법
//! ```text
//! leam-console --module Reddit_Story_Generator            # 백엔드 채널에 연결
//! leam-console --module X --connect 10.0.0.5:5000         # 주소 지정
//! leam-console --local                                    # 백엔드 없이 로컬 샘플러만
//! ```

use std::sync::Arc;
use std::time::Duration;

use leam_console::channel::{Channel, LocalChannel, SocketChannel};
use leam_console::config::ConsoleConfig;
use leam_console::page::ModulePage;
use leam_console::sampler;
use leam_console::surface::{NoticeKind, NoticeQueue};

const LOCAL_MODULE: &str = "local";

struct Args {
    module: Option<String>,
    connect: Option<String>,
    local: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args { module: None, connect: None, local: false };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--module" | "-m" => {
                parsed.module = Some(args.next().ok_or_else(|| anyhow::anyhow!("--module needs a value"))?);
            }
            "--connect" | "-c" => {
                parsed.connect = Some(args.next().ok_or_else(|| anyhow::anyhow!("--connect needs a value"))?);
            }
            "--local" => parsed.local = true,
            "--help" | "-h" => {
                println!("Usage: leam-console [--module NAME] [--connect ADDR] [--local]");
                std::process::exit(0);
            }
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 로그는 stderr: stdout은 로그 라인/모니터 출력 전용
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let mut cfg = ConsoleConfig::load()?;
    if let Some(module) = args.module {
        cfg.module = Some(module);
    }
    if let Some(addr) = args.connect {
        cfg.channel.addr = addr;
    }

    let notices = NoticeQueue::new();
    let interval = Duration::from_secs(cfg.monitor.interval_secs);

    let (channel, module): (Arc<dyn Channel>, String) = if args.local {
        let module = cfg.module.clone().unwrap_or_else(|| LOCAL_MODULE.to_string());
        let channel: Arc<dyn Channel> = Arc::new(LocalChannel::loopback());
        (channel, module)
    } else {
        let module = cfg.require_module()?.to_string();
        let channel: Arc<dyn Channel> = Arc::new(SocketChannel::connect(&cfg.channel.addr).await?);
        (channel, module)
    };

    let page = ModulePage::mount(channel.clone(), &module, &cfg, Arc::new(notices.clone()));
    let feed = args.local.then(|| sampler::spawn_feed(channel.clone(), interval));

    tracing::info!("Tailing '{}' (Ctrl+C to exit)", module);
    let mut printed_lines = 0u64;
    let mut printed_ticks = 0u64;
    let mut ticker = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = ticker.tick() => {
                let snapshot = page.logs.snapshot();
                let fresh = (snapshot.accepted() - printed_lines).min(snapshot.len() as u64) as usize;
                // 버퍼는 최신이 앞이므로 뒤집어서 오래된 줄부터 출력
                let mut lines: Vec<&str> = snapshot.lines().take(fresh).collect();
                lines.reverse();
                for line in lines {
                    println!("{}", line);
                }
                printed_lines = snapshot.accepted();

                if page.monitor.ticks() != printed_ticks {
                    printed_ticks = page.monitor.ticks();
                    if let Some(view) = page.monitor.latest() {
                        println!("{}", view.summary_line());
                    }
                }

                for notice in notices.drain() {
                    match notice.kind {
                        NoticeKind::Error => eprintln!("✗ {}", notice.message),
                        _ => eprintln!("✓ {}", notice.message),
                    }
                }
            }
        }
    }

    if let Some(feed) = feed {
        feed.abort();
    }
    Ok(())
}
