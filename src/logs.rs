//! 모듈 로그 테일: 바인딩된 모듈 하나의 최근 로그를 보관하는 버퍼
//!
//! 표시 정책: 용량 N의 링 버퍼, 최신 줄이 맨 위. 용량을 넘으면 가장 오래된 줄부터 밀려납니다.
//! 다른 모듈 앞으로 온 `module_log`는 버퍼에 닿기 전에 버립니다.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::channel::{events, handler, Channel};
use crate::surface::Element;

#[derive(Debug, Clone)]
pub struct LogBuffer {
    capacity: usize,
    /// 앞쪽이 최신
    lines: VecDeque<String>,
    /// 첫 줄이 도착하기 전까지 보여줄 문구. 첫 줄에서 한 번만 지워짐
    placeholder: Option<String>,
    /// 지금까지 받아들인 줄 수 (밀려난 줄 포함)
    accepted: u64,
}

impl LogBuffer {
    pub fn new(capacity: usize, placeholder: impl Into<String>) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity),
            placeholder: Some(placeholder.into()),
            accepted: 0,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.placeholder.take().is_some() {
            tracing::trace!("First log line received, placeholder cleared");
        }
        self.lines.push_front(line);
        self.accepted += 1;
        while self.lines.len() > self.capacity {
            self.lines.pop_back();
        }
    }

    /// 최신 → 오래된 순
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn render(&self) -> Element {
        let root = Element::new("pre").id("logs");
        match &self.placeholder {
            Some(text) => root.child(Element::new("div").class("log-placeholder").text(text.clone())),
            None => root.children(
                self.lines
                    .iter()
                    .map(|line| Element::new("div").class("log-line").text(line.clone())),
            ),
        }
    }
}

/// 채널에 붙은 로그 테일 위젯
#[derive(Clone)]
pub struct LogTail {
    module: String,
    buffer: Arc<Mutex<LogBuffer>>,
}

impl LogTail {
    /// `module_log` 구독 후 `subscribe_logs`를 한 번 송신합니다.
    pub fn attach(channel: &dyn Channel, module: &str, capacity: usize, placeholder: &str) -> Self {
        let tail = Self {
            module: module.to_string(),
            buffer: Arc::new(Mutex::new(LogBuffer::new(capacity, placeholder))),
        };

        let bound = tail.clone();
        channel.on(events::MODULE_LOG, handler(move |payload| {
            bound.accept(payload);
        }));
        channel.emit(events::SUBSCRIBE_LOGS, json!({ "module": module }));
        tracing::debug!("Subscribed to logs of module '{}'", module);

        tail
    }

    /// `module_log` 페이로드 하나를 처리. 버퍼에 들어갔으면 true.
    pub fn accept(&self, payload: &Value) -> bool {
        let (module, line) = match (
            payload.get("module").and_then(Value::as_str),
            payload.get("line").and_then(Value::as_str),
        ) {
            (Some(m), Some(l)) => (m, l),
            _ => {
                tracing::debug!("Malformed module_log payload discarded: {}", payload);
                return false;
            }
        };

        if module != self.module {
            tracing::trace!("module_log for '{}' ignored (bound to '{}')", module, self.module);
            return false;
        }

        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_string());
        true
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn snapshot(&self) -> LogBuffer {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn render(&self) -> Element {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::LocalChannel;

    fn tail(capacity: usize) -> (LocalChannel, LogTail) {
        let ch = LocalChannel::new();
        let tail = LogTail::attach(&ch, "alpha", capacity, "Waiting for logs...");
        (ch, tail)
    }

    #[test]
    fn test_attach_sends_single_subscribe() {
        let (ch, _tail) = tail(50);
        assert_eq!(ch.sent_named("subscribe_logs"), vec![json!({ "module": "alpha" })]);
        assert_eq!(ch.sent().len(), 1);
    }

    #[test]
    fn test_foreign_module_is_noop() {
        let (ch, tail) = tail(50);
        let before = tail.render();

        ch.inject("module_log", json!({ "module": "beta", "line": "x" }));
        assert_eq!(tail.render(), before);
        assert_eq!(tail.snapshot().placeholder(), Some("Waiting for logs..."));

        ch.inject("module_log", json!({ "module": "alpha", "line": "hello" }));
        let snap = tail.snapshot();
        assert_eq!(snap.lines().collect::<Vec<_>>(), vec!["hello"]);
        assert!(tail.render().text_content().contains("hello"));
        assert!(!tail.render().text_content().contains("Waiting"));
    }

    #[test]
    fn test_newest_first_and_bounded() {
        let (ch, tail) = tail(3);
        for i in 0..5 {
            ch.inject("module_log", json!({ "module": "alpha", "line": format!("l{}", i) }));
            assert!(tail.snapshot().len() <= 3);
        }
        assert_eq!(tail.snapshot().lines().collect::<Vec<_>>(), vec!["l4", "l3", "l2"]);
        assert_eq!(tail.snapshot().accepted(), 5);
    }

    #[test]
    fn test_empty_line_is_kept() {
        let (ch, tail) = tail(50);
        ch.inject("module_log", json!({ "module": "alpha", "line": "" }));
        let snap = tail.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(snap.placeholder().is_none());
        assert_eq!(tail.render().child_elements().count(), 1);
    }

    #[test]
    fn test_malformed_payload_discarded() {
        let (ch, tail) = tail(50);
        ch.inject("module_log", json!({ "module": "alpha" }));
        ch.inject("module_log", json!({ "line": "orphan" }));
        ch.inject("module_log", json!("alpha"));
        assert!(tail.snapshot().is_empty());
    }

    #[test]
    fn test_line_content_is_text_not_markup() {
        let (ch, tail) = tail(50);
        ch.inject("module_log", json!({ "module": "alpha", "line": "<b>bold</b>" }));
        let html = tail.render().to_html();
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }
}
