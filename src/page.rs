//! 모듈 페이지: 채널 하나를 모든 컴포넌트에 주입하는 조립 지점
//!
//! 모듈 이름은 전역이 아니라 생성자 인자로 전달됩니다.

use std::sync::Arc;

use crate::channel::Channel;
use crate::config::ConsoleConfig;
use crate::dispatch::{CommandDispatcher, Dispatch, RunControls, SettingsForm};
use crate::fields::FieldList;
use crate::logs::LogTail;
use crate::surface::{Element, Notifier};
use crate::telemetry::{SystemMonitor, TelemetryRenderer};

pub struct ModulePage {
    module: String,
    pub logs: LogTail,
    pub monitor: SystemMonitor,
    pub commands: CommandDispatcher,
    pub run_controls: RunControls,
    pub settings: SettingsForm,
    pub subreddits: FieldList,
}

impl ModulePage {
    pub fn mount(
        channel: Arc<dyn Channel>,
        module: &str,
        config: &ConsoleConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::mount_with_renderer(channel, module, config, notifier, TelemetryRenderer::default())
    }

    pub fn mount_with_renderer(
        channel: Arc<dyn Channel>,
        module: &str,
        config: &ConsoleConfig,
        notifier: Arc<dyn Notifier>,
        renderer: TelemetryRenderer,
    ) -> Self {
        tracing::info!("Mounting page for module '{}'", module);
        let logs = LogTail::attach(
            channel.as_ref(),
            module,
            config.logs.capacity,
            &config.logs.placeholder,
        );
        let monitor = SystemMonitor::attach(channel.as_ref(), renderer);
        let commands = CommandDispatcher::attach(channel, module, notifier);

        Self {
            module: module.to_string(),
            logs,
            monitor,
            commands,
            run_controls: RunControls::default(),
            settings: SettingsForm::new(),
            subreddits: FieldList::subreddits(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn run(&self) -> Dispatch {
        self.commands.run(&self.run_controls)
    }

    pub fn stop(&self) {
        self.commands.stop()
    }

    /// 설정 폼 + subreddit 행을 문서 순서대로 한 폼으로 묶어 저장.
    /// `subreddit[]`처럼 이름이 반복되면 마지막 행의 값이 남습니다.
    pub fn save(&self) -> Dispatch {
        self.commands.save(&self.submitted_form(), &self.run_controls)
    }

    /// 저장 시 제출되는 폼
    pub fn submitted_form(&self) -> SettingsForm {
        let mut form = self.settings.clone();
        for (name, value) in self.subreddits.pairs() {
            form.push(name, value);
        }
        form
    }

    /// 페이지 전체 엘리먼트 트리. 각 영역은 소유 컴포넌트가 그립니다.
    pub fn render(&self) -> Element {
        let status = self
            .commands
            .module_status()
            .unwrap_or_else(|| "unknown".to_string());

        let settings_form = Element::new("form").id("settings-form").children(
            self.settings.fields().iter().map(|(name, value)| {
                Element::new("label")
                    .text(name.clone())
                    .child(
                        Element::new("input")
                            .attr("type", "text")
                            .attr("name", name.clone())
                            .attr("value", value.clone()),
                    )
            }),
        );

        Element::new("main")
            .attr("data-module", self.module.clone())
            .child(self.monitor.render())
            .child(
                Element::new("section")
                    .id("run-controls")
                    .child(Element::new("span").id("module-status").text(status))
                    .child(self.commands.run_button().render("run-btn")),
            )
            .child(
                Element::new("section")
                    .id("settings")
                    .child(settings_form)
                    .child(self.commands.save_button().render("save-settings-btn")),
            )
            .child(self.subreddits.render())
            .child(self.logs.render())
    }
}
