//! 디스플레이 표면: 구조화된 엘리먼트 트리
//!
//! 컴포넌트는 마크업 문자열을 이어 붙이지 않고 `Element`/`Node`를 조립합니다.
//! 수신한 문자열(로그 라인, 센서 이름 등)은 항상 `Node::Text`로만 들어가며,
//! `to_html()` 직렬화 시 이스케이프됩니다.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// 자식 엘리먼트만 (텍스트 노드 제외)
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// 깊이 우선 id 검색
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find_by_id(id))
    }

    /// 하위 트리의 모든 텍스트를 이어 붙인 값 (DOM textContent와 동일)
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        if let Some(id) = &self.id {
            let _ = write!(out, " id=\"{}\"", escape_attr(id));
        }
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_attr(&self.classes.join(" ")));
        }
        for (k, v) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", k, escape_attr(v));
        }
        out.push('>');
        if is_void(self.tag) {
            return;
        }
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(&escape_text(t)),
                Node::Element(e) => e.write_html(out),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "input" | "br" | "hr" | "img" | "meta")
}

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;").replace('\'', "&#39;")
}

// ═══════════════════════════════════════════════════════
// 알림 (토스트)
// ═══════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, message: message.into() }
    }
}

/// 비차단 알림 출력 지점. 브라우저의 alert() 대신 토스트 큐에 쌓입니다.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// 최근 알림을 보관하는 토스트 큐: TUI가 주기적으로 drain 합니다.
#[derive(Clone, Default)]
pub struct NoticeQueue {
    inner: Arc<Mutex<VecDeque<Notice>>>,
}

const NOTICE_QUEUE_LIMIT: usize = 16;

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        let mut q = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        q.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => tracing::warn!("{}", notice.message),
            _ => tracing::info!("{}", notice.message),
        }
        let mut q = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        q.push_back(notice);
        while q.len() > NOTICE_QUEUE_LIMIT {
            q.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untrusted_text_is_escaped() {
        let el = Element::new("div")
            .id("logs")
            .text("<script>alert('x')</script> & more");
        assert_eq!(
            el.to_html(),
            "<div id=\"logs\">&lt;script&gt;alert('x')&lt;/script&gt; &amp; more</div>"
        );
        // textContent은 원문 그대로
        assert_eq!(el.text_content(), "<script>alert('x')</script> & more");
    }

    #[test]
    fn test_attr_escaping_and_void_tags() {
        let el = Element::new("input")
            .attr("name", "subreddit[]")
            .attr("placeholder", "say \"hi\"");
        assert_eq!(
            el.to_html(),
            "<input name=\"subreddit[]\" placeholder=\"say &quot;hi&quot;\">"
        );
    }

    #[test]
    fn test_find_by_id_and_text_content() {
        let tree = Element::new("section")
            .child(Element::new("span").id("a").text("one"))
            .child(Element::new("div").child(Element::new("b").id("b").text("two")));

        assert_eq!(tree.find_by_id("b").unwrap().text_content(), "two");
        assert!(tree.find_by_id("missing").is_none());
        assert_eq!(tree.text_content(), "onetwo");
    }

    #[test]
    fn test_notice_queue_bounded() {
        let q = NoticeQueue::new();
        for i in 0..20 {
            q.notify(Notice::info(format!("n{}", i)));
        }
        let drained = q.drain();
        assert_eq!(drained.len(), NOTICE_QUEUE_LIMIT);
        assert_eq!(drained[0].message, "n4");
        assert!(q.is_empty());
    }
}
