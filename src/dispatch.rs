//! 커맨드 디스패처: 실행/정지/설정 저장 원샷 이벤트
//!
//! 설정 저장 상태 머신: `Idle --(save)--> Pending --(settings_saved)--> Idle`.
//! Pending 동안 버튼은 비활성화되어 두 번째 저장이 나가지 않습니다.
//! 타임아웃은 없습니다. 응답이 오지 않으면 Pending으로 남습니다.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::channel::{events, handler, Channel};
use crate::surface::{Element, Notice, Notifier};

pub const SAVE_LABEL: &str = "Save Settings";
pub const SAVING_LABEL: &str = "Saving...";
pub const RUN_LABEL: &str = "Run";
pub const STARTING_LABEL: &str = "Starting...";

// ═══════════════════════════════════════════════════════
// 입력 모델
// ═══════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Finite,
    Indefinite,
}

/// `run_module` / `save_settings`에 실리는 실행 옵션 (입력 컨트롤의 원시 문자열)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    pub mode: RunMode,
    pub runs_per_day: String,
    pub start_time: String,
    pub end_time: String,
}

/// 실행 옵션 입력 컨트롤 상태 (토글 + 세 개의 입력칸)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunControls {
    /// 체크 시 indefinite
    pub indefinite: bool,
    pub runs_per_day: String,
    pub start_time: String,
    pub end_time: String,
}

impl RunControls {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            mode: if self.indefinite { RunMode::Indefinite } else { RunMode::Finite },
            runs_per_day: self.runs_per_day.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
        }
    }
}

/// 설정 폼: (name, value) 필드를 문서 순서대로 보관
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    fields: Vec<(String, String)>,
}

impl SettingsForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// 이름이 같은 첫 필드의 값을 바꿈. 없으면 false
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => {
                *v = value.into();
                true
            }
            None => false,
        }
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [(String, String)] {
        &mut self.fields
    }

    /// 평탄한 맵으로 직렬화. 이름이 반복되면 마지막 값이 남습니다.
    pub fn serialize(&self) -> BTreeMap<String, String> {
        self.fields.iter().cloned().collect()
    }
}

// ═══════════════════════════════════════════════════════
// 버튼 · 상태
// ═══════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub disabled: bool,
}

impl Button {
    fn new(label: &str) -> Self {
        Self { label: label.to_string(), disabled: false }
    }

    fn busy(&mut self, label: &str) {
        self.label = label.to_string();
        self.disabled = true;
    }

    fn reset(&mut self, label: &str) {
        self.label = label.to_string();
        self.disabled = false;
    }

    pub fn render(&self, id: &str) -> Element {
        let el = Element::new("button").id(id).attr("type", "button");
        let el = if self.disabled { el.attr("disabled", "disabled") } else { el };
        el.text(self.label.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    Pending,
}

/// 트리거 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sent,
    /// 이미 진행 중이라 무시됨
    Ignored,
}

struct DispatcherState {
    save: SaveState,
    save_button: Button,
    run_pending: bool,
    run_button: Button,
    /// 마지막 module_status ("running" / "stopped")
    module_status: Option<String>,
}

/// 설정 저장 응답 `settings_saved`
#[derive(Debug, Clone, Deserialize)]
struct SaveAck {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    module: Option<String>,
}

// ═══════════════════════════════════════════════════════
// 디스패처
// ═══════════════════════════════════════════════════════

#[derive(Clone)]
pub struct CommandDispatcher {
    module: String,
    channel: Arc<dyn Channel>,
    notifier: Arc<dyn Notifier>,
    state: Arc<Mutex<DispatcherState>>,
}

impl CommandDispatcher {
    pub fn attach(channel: Arc<dyn Channel>, module: &str, notifier: Arc<dyn Notifier>) -> Self {
        let dispatcher = Self {
            module: module.to_string(),
            channel: channel.clone(),
            notifier,
            state: Arc::new(Mutex::new(DispatcherState {
                save: SaveState::Idle,
                save_button: Button::new(SAVE_LABEL),
                run_pending: false,
                run_button: Button::new(RUN_LABEL),
                module_status: None,
            })),
        };

        let bound = dispatcher.clone();
        channel.on(events::SETTINGS_SAVED, handler(move |payload| {
            bound.on_settings_saved(payload);
        }));
        let bound = dispatcher.clone();
        channel.on(events::MODULE_STATUS, handler(move |payload| {
            bound.on_module_status(payload);
        }));

        dispatcher
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DispatcherState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// `run_module {module, options}` 송신. 응답(module_status) 전까지 실행 버튼 비활성화
    pub fn run(&self, controls: &RunControls) -> Dispatch {
        {
            let mut state = self.lock();
            if state.run_pending {
                tracing::debug!("Run for '{}' already pending, ignored", self.module);
                return Dispatch::Ignored;
            }
            state.run_pending = true;
            state.run_button.busy(STARTING_LABEL);
        }

        let options = controls.options();
        tracing::info!("Running module '{}' ({:?})", self.module, options.mode);
        self.channel.emit(
            events::RUN_MODULE,
            json!({ "module": self.module, "options": options }),
        );
        Dispatch::Sent
    }

    /// `stop_module {module}` 송신
    pub fn stop(&self) {
        tracing::info!("Stopping module '{}'", self.module);
        self.channel.emit(events::STOP_MODULE, json!({ "module": self.module }));
    }

    /// 설정 저장. 실행 옵션은 항상 `run_options`로 함께 실립니다.
    pub fn save(&self, form: &SettingsForm, controls: &RunControls) -> Dispatch {
        {
            let mut state = self.lock();
            if state.save == SaveState::Pending || state.save_button.disabled {
                tracing::debug!("Save for '{}' already pending, ignored", self.module);
                return Dispatch::Ignored;
            }
            state.save = SaveState::Pending;
            state.save_button.busy(SAVING_LABEL);
        }

        let settings = form.serialize();
        tracing::info!("Saving {} setting(s) for '{}'", settings.len(), self.module);
        self.channel.emit(
            events::SAVE_SETTINGS,
            json!({
                "module": self.module,
                "settings": settings,
                "run_options": controls.options(),
            }),
        );
        Dispatch::Sent
    }

    fn on_settings_saved(&self, payload: &Value) {
        let ack: SaveAck = match serde_json::from_value(payload.clone()) {
            Ok(ack) => ack,
            Err(e) => {
                tracing::warn!("Malformed settings_saved payload: {}", e);
                SaveAck { status: None, error: None, module: None }
            }
        };

        if ack.module.as_deref().is_some_and(|m| m != self.module) {
            tracing::trace!("settings_saved for other module ignored");
            return;
        }

        {
            let mut state = self.lock();
            if state.save == SaveState::Idle {
                tracing::debug!("settings_saved while idle ignored");
                return;
            }
            state.save = SaveState::Idle;
            state.save_button.reset(SAVE_LABEL);
        }

        if ack.status.as_deref() == Some("success") {
            self.notifier.notify(Notice::success("Settings saved successfully!"));
        } else {
            let reason = match ack.error {
                Some(Value::String(s)) if !s.is_empty() => s,
                Some(Value::Null) | None => "unknown error".to_string(),
                Some(other) => other.to_string(),
            };
            self.notifier.notify(Notice::error(format!("Error saving settings: {}", reason)));
        }
    }

    fn on_module_status(&self, payload: &Value) {
        let module = payload.get("module").and_then(Value::as_str);
        if module != Some(self.module.as_str()) {
            return;
        }
        let status = payload
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        tracing::info!("Module '{}' is {}", self.module, status);

        let mut state = self.lock();
        state.run_pending = false;
        state.run_button.reset(RUN_LABEL);
        state.module_status = Some(status);
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn save_state(&self) -> SaveState {
        self.lock().save
    }

    pub fn save_button(&self) -> Button {
        self.lock().save_button.clone()
    }

    pub fn run_button(&self) -> Button {
        self.lock().run_button.clone()
    }

    pub fn module_status(&self) -> Option<String> {
        self.lock().module_status.clone()
    }
}
