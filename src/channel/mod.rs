//! 채널 어댑터: 페이지와 백엔드 사이의 양방향 이벤트 채널
//!
//! ## 계약
//! - `emit(event, payload)`: 이름 있는 이벤트 송신. 전송 계층이 사라졌어도 실패하지 않음 (no-op)
//! - `on(event, handler)`: 이름 있는 이벤트 구독. 같은 이벤트의 핸들러는 등록 순서대로 실행
//!
//! 전달 보장(at-least-once 등)은 추가하지 않습니다. 받은 순서 그대로 핸들러에 넘깁니다.

pub mod socket;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub use socket::SocketChannel;

/// 와이어 이벤트 이름
pub mod events {
    // 수신
    pub const MODULE_LOG: &str = "module_log";
    pub const STATS: &str = "stats";
    pub const SETTINGS_SAVED: &str = "settings_saved";
    pub const MODULE_STATUS: &str = "module_status";
    // 송신
    pub const SUBSCRIBE_LOGS: &str = "subscribe_logs";
    pub const RUN_MODULE: &str = "run_module";
    pub const STOP_MODULE: &str = "stop_module";
    pub const SAVE_SETTINGS: &str = "save_settings";
}

pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// 클로저를 `Handler`로 감싸기
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Value) + Send + Sync + 'static,
{
    Arc::new(f)
}

pub trait Channel: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
    fn on(&self, event: &str, handler: Handler);
}

/// 한 줄에 하나씩 오가는 이벤트 프레임 `{"event": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(event: &str, data: Value) -> Self {
        Self { event: event.to_string(), data }
    }
}

/// 이벤트 이름 → 핸들러 목록
#[derive(Clone, Default)]
pub struct HandlerRouter {
    handlers: Arc<Mutex<HashMap<String, Vec<Handler>>>>,
}

impl HandlerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, event: &str, handler: Handler) {
        let mut map = self.handlers.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(event.to_string()).or_default().push(handler);
    }

    /// 등록된 핸들러를 순서대로 실행하고 실행된 개수를 반환.
    /// 핸들러 안에서 다시 `on`/`emit`을 호출할 수 있도록 락을 먼저 놓습니다.
    pub fn deliver(&self, event: &str, payload: &Value) -> usize {
        let handlers: Vec<Handler> = {
            let map = self.handlers.lock().unwrap_or_else(|e| e.into_inner());
            map.get(event).cloned().unwrap_or_default()
        };
        if handlers.is_empty() {
            tracing::trace!("No handler for event '{}'", event);
        }
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }
}

// ═══════════════════════════════════════════════════════
// 인프로세스 채널
// ═══════════════════════════════════════════════════════

/// 프로세스 내부 채널.
///
/// 송신 이벤트는 outbox에 기록되고, 수신 이벤트는 `inject`로 주입합니다.
/// `loopback()`으로 만들면 송신 이벤트가 같은 채널의 핸들러에도 전달되어
/// 백엔드 없이 로컬 샘플러의 `stats`를 모니터에 바로 보여줄 수 있습니다.
#[derive(Clone, Default)]
pub struct LocalChannel {
    router: HandlerRouter,
    outbox: Arc<Mutex<Vec<Envelope>>>,
    loopback: bool,
    disconnected: Arc<AtomicBool>,
}

impl LocalChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loopback() -> Self {
        Self { loopback: true, ..Self::default() }
    }

    /// 백엔드로부터 이벤트가 도착한 것처럼 핸들러 실행
    pub fn inject(&self, event: &str, payload: Value) -> usize {
        if self.disconnected.load(Ordering::SeqCst) {
            tracing::debug!("Channel disconnected, inbound '{}' dropped", event);
            return 0;
        }
        self.router.deliver(event, &payload)
    }

    /// 지금까지 송신된 이벤트 (송신 순서)
    pub fn sent(&self) -> Vec<Envelope> {
        self.outbox.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sent_named(&self, event: &str) -> Vec<Value> {
        self.sent()
            .into_iter()
            .filter(|e| e.event == event)
            .map(|e| e.data)
            .collect()
    }

    pub fn take_sent(&self) -> Vec<Envelope> {
        std::mem::take(&mut *self.outbox.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// 전송 계층 단절 흉내: 이후 emit/inject는 조용히 무시됩니다.
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}

impl Channel for LocalChannel {
    fn emit(&self, event: &str, payload: Value) {
        if self.disconnected.load(Ordering::SeqCst) {
            tracing::debug!("Channel disconnected, outbound '{}' dropped", event);
            return;
        }
        self.outbox
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Envelope::new(event, payload.clone()));
        if self.loopback {
            self.router.deliver(event, &payload);
        }
    }

    fn on(&self, event: &str, handler: Handler) {
        self.router.register(event, handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_handlers_run_in_registration_order() {
        let ch = LocalChannel::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = seen.clone();
            ch.on("ping", handler(move |p| {
                seen.lock().unwrap().push(format!("{}:{}", tag, p["n"]));
            }));
        }

        assert_eq!(ch.inject("ping", json!({ "n": 1 })), 2);
        assert_eq!(ch.inject("other", json!({})), 0);
        assert_eq!(*seen.lock().unwrap(), vec!["first:1", "second:1"]);
    }

    #[test]
    fn test_emit_records_outbox_without_loopback() {
        let ch = LocalChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        ch.on("stats", handler(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        }));

        ch.emit("stats", json!({ "cpu": 1 }));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(ch.sent_named("stats"), vec![json!({ "cpu": 1 })]);

        let lb = LocalChannel::loopback();
        let h = hits.clone();
        lb.on("stats", handler(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        }));
        lb.emit("stats", json!({}));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnected_channel_is_noop() {
        let ch = LocalChannel::new();
        ch.disconnect();
        ch.emit("run_module", json!({}));
        assert!(ch.sent().is_empty());
        assert_eq!(ch.inject("module_log", json!({})), 0);
    }

    #[test]
    fn test_handler_may_reenter_channel() {
        let ch = LocalChannel::new();
        let inner = ch.clone();
        ch.on("ping", handler(move |_| {
            inner.emit("pong", json!({}));
            inner.on("late", handler(|_| {}));
        }));
        ch.inject("ping", json!({}));
        assert_eq!(ch.sent_named("pong").len(), 1);
    }

    #[test]
    fn test_envelope_data_defaults_to_null() {
        let env: Envelope = serde_json::from_str(r#"{"event":"stats"}"#).unwrap();
        assert_eq!(env.event, "stats");
        assert!(env.data.is_null());
    }
}
