//! 시스템 모니터: `stats` 스냅샷을 사람이 읽을 수 있는 표시로 변환
//!
//! 모든 필드는 선택 사항입니다. 값이 없거나 null/빈 문자열이면 "N/A",
//! 있으면 `값 + 단위`. 중첩 객체(memory/disk/network)가 통째로 없어도 자식 필드가
//! 전부 N/A로 표시될 뿐 실패하지 않습니다.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::channel::{events, handler, Channel};
use crate::surface::Element;

pub const NOT_AVAILABLE: &str = "N/A";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ═══════════════════════════════════════════════════════
// 스냅샷 모델
// ═══════════════════════════════════════════════════════

/// 단일 측정값. 숫자 또는 백엔드가 보낸 문자열 그대로
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric {
    Number(f64),
    Text(String),
}

impl Metric {
    /// null, 빈 문자열, 객체/배열은 값 없음으로 취급
    pub fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_f64().map(Metric::Number),
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(Metric::Text(s.clone())),
            Value::Bool(b) => Some(Metric::Text(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl From<f64> for Metric {
    fn from(v: f64) -> Self {
        Metric::Number(v)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // 정수값 float은 소수점 없이 (42.0 → "42")
            Metric::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Metric::Number(n) => write!(f, "{}", n),
            Metric::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// epoch 밀리초
    Millis(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Usage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Throughput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down: Option<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Throughput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// 센서 이름 → 값. 값이 null이면 그 센서만 N/A
    pub temps: Option<BTreeMap<String, Option<Metric>>>,
}

impl StatsSnapshot {
    /// 관대한 파싱: 타입이 맞지 않는 필드는 없는 것으로 간주하고, 객체가 아닌
    /// 페이로드는 빈 스냅샷이 됩니다.
    pub fn from_value(v: &Value) -> Self {
        let metric = |obj: Option<&Value>, key: &str| {
            obj.and_then(|o| o.get(key)).and_then(Metric::from_value)
        };
        let nested = |key: &str| v.get(key).filter(|n| n.is_object());

        let usage = |key: &str| {
            nested(key).map(|o| Usage {
                used: metric(Some(o), "used"),
                total: metric(Some(o), "total"),
                percent: metric(Some(o), "percent"),
            })
        };

        let timestamp = match v.get("timestamp") {
            Some(Value::Number(n)) => n.as_f64().filter(|ms| *ms != 0.0).map(Timestamp::Millis),
            Some(Value::String(s)) if !s.is_empty() => Some(Timestamp::Text(s.clone())),
            _ => None,
        };

        let temps = v.get("temps").and_then(Value::as_object).map(|map| {
            map.iter()
                .map(|(sensor, reading)| (sensor.clone(), Metric::from_value(reading)))
                .collect()
        });

        Self {
            timestamp,
            cpu: metric(Some(v), "cpu"),
            memory: usage("memory"),
            disk: usage("disk"),
            network: nested("network").map(|o| Throughput {
                up: metric(Some(o), "up"),
                down: metric(Some(o), "down"),
            }),
            uptime: metric(Some(v), "uptime"),
            temps,
        }
    }
}

/// 값이 있으면 `값+단위`, 없으면 N/A
pub fn fmt_metric(v: Option<&Metric>, unit: &str) -> String {
    match v {
        Some(m) => format!("{}{}", m, unit),
        None => NOT_AVAILABLE.to_string(),
    }
}

// ═══════════════════════════════════════════════════════
// 렌더링
// ═══════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempRow {
    pub sensor: String,
    pub value: String,
}

/// 렌더링된 스냅샷: 모든 필드가 이미 단위까지 포맷된 문자열
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorView {
    pub timestamp: String,
    pub cpu: String,
    pub ram_used: String,
    pub ram_total: String,
    pub ram_percent: String,
    pub disk_used: String,
    pub disk_total: String,
    pub disk_percent: String,
    pub net_up: String,
    pub net_down: String,
    pub uptime: String,
    /// 센서 이름순. 비어 있으면 "Temp: N/A" 한 줄로 표시
    pub temps: Vec<TempRow>,
}

impl MonitorView {
    pub fn temp_summary(&self) -> String {
        if self.temps.is_empty() {
            return NOT_AVAILABLE.to_string();
        }
        self.temps
            .iter()
            .map(|t| format!("{}: {}", t.sensor, t.value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 한 줄 요약
    pub fn summary_line(&self) -> String {
        format!(
            "{} = CPU: {} | RAM: {}/{} ({}) | Disk: {}/{} ({}) | Network: ↑{} ↓{} | Uptime: {} | Temp: {}",
            self.timestamp,
            self.cpu,
            self.ram_used,
            self.ram_total,
            self.ram_percent,
            self.disk_used,
            self.disk_total,
            self.disk_percent,
            self.net_up,
            self.net_down,
            self.uptime,
            self.temp_summary(),
        )
    }

    pub fn to_element(&self) -> Element {
        let row = |field: &str, text: String| {
            Element::new("div")
                .class("monitor-row")
                .attr("data-field", field)
                .text(text)
        };

        let temps = if self.temps.is_empty() {
            Element::new("div")
                .class("monitor-temps")
                .child(Element::new("div").class("monitor-temp").text("Temp: N/A"))
        } else {
            Element::new("div").class("monitor-temps").children(self.temps.iter().map(|t| {
                Element::new("div")
                    .class("monitor-temp")
                    .attr("data-sensor", t.sensor.clone())
                    .text(format!("{}: {}", t.sensor, t.value))
            }))
        };

        Element::new("div")
            .id("system-monitor")
            .child(Element::new("span").class("monitor-timestamp").text(self.timestamp.clone()))
            .child(row("cpu", format!("CPU: {}", self.cpu)))
            .child(row(
                "memory",
                format!("RAM: {}/{} ({})", self.ram_used, self.ram_total, self.ram_percent),
            ))
            .child(row(
                "disk",
                format!("Disk: {}/{} ({})", self.disk_used, self.disk_total, self.disk_percent),
            ))
            .child(row("network", format!("Network: ↑{} ↓{}", self.net_up, self.net_down)))
            .child(row("uptime", format!("Uptime: {}", self.uptime)))
            .child(temps)
    }
}

/// 스냅샷 → `MonitorView`. (스냅샷, 렌더 시각)에 대한 순수 함수
#[derive(Debug, Clone)]
pub struct TelemetryRenderer {
    offset: FixedOffset,
}

impl Default for TelemetryRenderer {
    fn default() -> Self {
        Self { offset: *chrono::Local::now().offset() }
    }
}

impl TelemetryRenderer {
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn render(&self, s: &StatsSnapshot, now: DateTime<Utc>) -> MonitorView {
        let mem = s.memory.as_ref();
        let disk = s.disk.as_ref();
        let net = s.network.as_ref();

        let temps = s
            .temps
            .iter()
            .flatten()
            .map(|(sensor, reading)| TempRow {
                sensor: sensor.clone(),
                value: fmt_metric(reading.as_ref(), "°C"),
            })
            .collect();

        MonitorView {
            timestamp: self.format_timestamp(s.timestamp.as_ref(), now),
            cpu: fmt_metric(s.cpu.as_ref(), "%"),
            ram_used: fmt_metric(mem.and_then(|m| m.used.as_ref()), "MB"),
            ram_total: fmt_metric(mem.and_then(|m| m.total.as_ref()), "MB"),
            ram_percent: fmt_metric(mem.and_then(|m| m.percent.as_ref()), "%"),
            disk_used: fmt_metric(disk.and_then(|d| d.used.as_ref()), "GB"),
            disk_total: fmt_metric(disk.and_then(|d| d.total.as_ref()), "GB"),
            disk_percent: fmt_metric(disk.and_then(|d| d.percent.as_ref()), "%"),
            net_up: fmt_metric(net.and_then(|n| n.up.as_ref()), "MB/s"),
            net_down: fmt_metric(net.and_then(|n| n.down.as_ref()), "MB/s"),
            uptime: fmt_metric(s.uptime.as_ref(), "s"),
            temps,
        }
    }

    fn format_timestamp(&self, ts: Option<&Timestamp>, now: DateTime<Utc>) -> String {
        let instant = match ts {
            None => Some(now),
            Some(Timestamp::Millis(ms)) => Utc.timestamp_millis_opt(*ms as i64).single(),
            Some(Timestamp::Text(s)) => self.parse_text_timestamp(s),
        };
        match instant {
            Some(dt) => dt.with_timezone(&self.offset).format(TIMESTAMP_FORMAT).to_string(),
            None => "Invalid Date".to_string(),
        }
    }

    /// RFC 3339 → 오프셋 없는 날짜+시각(로컬로 해석) → 날짜만(UTC 자정)
    fn parse_text_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return self
                    .offset
                    .from_local_datetime(&naive)
                    .single()
                    .map(|dt| dt.with_timezone(&Utc));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}

// ═══════════════════════════════════════════════════════
// 위젯
// ═══════════════════════════════════════════════════════

#[derive(Default)]
struct MonitorState {
    latest: Option<MonitorView>,
    ticks: u64,
}

/// `stats` 이벤트마다 최신 뷰를 갱신하는 시스템 모니터 위젯
#[derive(Clone)]
pub struct SystemMonitor {
    renderer: TelemetryRenderer,
    state: Arc<Mutex<MonitorState>>,
}

impl SystemMonitor {
    pub fn attach(channel: &dyn Channel, renderer: TelemetryRenderer) -> Self {
        let monitor = Self {
            renderer,
            state: Arc::new(Mutex::new(MonitorState::default())),
        };
        let bound = monitor.clone();
        channel.on(events::STATS, handler(move |payload| {
            bound.accept(payload, Utc::now());
        }));
        monitor
    }

    pub fn accept(&self, payload: &Value, now: DateTime<Utc>) -> MonitorView {
        let snapshot = StatsSnapshot::from_value(payload);
        let view = self.renderer.render(&snapshot, now);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.latest = Some(view.clone());
        state.ticks += 1;
        view
    }

    pub fn latest(&self) -> Option<MonitorView> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).latest.clone()
    }

    pub fn ticks(&self) -> u64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).ticks
    }

    pub fn render(&self) -> Element {
        match self.latest() {
            Some(view) => view.to_element(),
            None => Element::new("div").id("system-monitor").text("Waiting for stats..."),
        }
    }
}
