//! 로컬 시스템 샘플러: 백엔드가 보내는 것과 같은 모양의 `stats` 스냅샷 생성
//!
//! 메모리는 MB, 디스크는 GB, 네트워크는 직전 샘플 이후 MB/s.
//! sysinfo 호출은 동기적이므로 async 컨텍스트에서는 spawn_blocking 또는 짧은 주기로만 호출합니다.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sysinfo::{Components, Disks, Networks, System};
use tokio::task::JoinHandle;

use crate::channel::{events, Channel};
use crate::telemetry::{Metric, StatsSnapshot, Throughput, Timestamp, Usage};

const MB: f64 = 1024.0 * 1024.0;
const GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub struct Sampler {
    sys: System,
    disks: Disks,
    networks: Networks,
    components: Components,
    started: Instant,
    last_sample: Instant,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler {
    pub fn new() -> Self {
        let mut sys = System::new();
        // CPU 사용률은 두 번의 refresh 차이로 계산되므로 기준점을 먼저 잡아둠
        sys.refresh_cpu();
        sys.refresh_memory();

        let now = Instant::now();
        Self {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
            started: now,
            last_sample: now,
        }
    }

    pub fn sample(&mut self) -> StatsSnapshot {
        let now = Instant::now();
        let interval = now.duration_since(self.last_sample).as_secs_f64().max(1e-3);
        self.last_sample = now;

        self.sys.refresh_cpu();
        self.sys.refresh_memory();
        self.disks.refresh();
        self.networks.refresh();
        self.components.refresh();

        let total_mem = self.sys.total_memory() as f64;
        let used_mem = self.sys.used_memory() as f64;

        StatsSnapshot {
            timestamp: Some(Timestamp::Text(chrono::Utc::now().to_rfc3339())),
            uptime: Some(Metric::Number(now.duration_since(self.started).as_secs() as f64)),
            cpu: Some(Metric::Number(round(self.sys.global_cpu_info().cpu_usage() as f64, 1))),
            memory: Some(Usage {
                used: Some(round(used_mem / MB, 1).into()),
                total: Some(round(total_mem / MB, 1).into()),
                percent: Some(round(percent(used_mem, total_mem), 1).into()),
            }),
            disk: self.disk_usage(),
            network: Some(self.throughput(interval)),
            temps: Some(self.temperatures()),
        }
    }

    /// 샘플 하나를 `stats` 이벤트로 송신
    pub fn publish(&mut self, channel: &dyn Channel) {
        let snapshot = self.sample();
        emit_snapshot(channel, &snapshot);
    }

    /// 루트(/) 마운트, 없으면 가장 큰 디스크
    fn disk_usage(&self) -> Option<Usage> {
        let disk = self
            .disks
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"))
            .or_else(|| self.disks.iter().max_by_key(|d| d.total_space()))?;

        let total = disk.total_space() as f64;
        let used = total - disk.available_space() as f64;
        Some(Usage {
            used: Some(round(used / GB, 1).into()),
            total: Some(round(total / GB, 1).into()),
            percent: Some(round(percent(used, total), 1).into()),
        })
    }

    fn throughput(&self, interval: f64) -> Throughput {
        let (sent, recv) = self
            .networks
            .iter()
            .fold((0u64, 0u64), |(s, r), (_, data)| {
                (s + data.transmitted(), r + data.received())
            });
        Throughput {
            up: Some(round(sent as f64 / interval / MB, 2).into()),
            down: Some(round(recv as f64 / interval / MB, 2).into()),
        }
    }

    /// 센서 라벨별 첫 번째 값
    fn temperatures(&self) -> BTreeMap<String, Option<Metric>> {
        let mut temps = BTreeMap::new();
        for component in self.components.iter() {
            let reading = component.temperature();
            if !reading.is_finite() {
                continue;
            }
            temps
                .entry(component.label().to_string())
                .or_insert_with(|| Some(Metric::Number(round(reading as f64, 1))));
        }
        temps
    }
}

fn emit_snapshot(channel: &dyn Channel, snapshot: &StatsSnapshot) {
    match serde_json::to_value(snapshot) {
        Ok(payload) => channel.emit(events::STATS, payload),
        Err(e) => tracing::warn!("Failed to encode stats snapshot: {}", e),
    }
}

// ── Async feed ─────────────────────────────────────────────
// sysinfo refresh는 동기 시스템 콜이므로 spawn_blocking에서 샘플링하고,
// 결과만 런타임 쪽에서 채널로 송신합니다.

/// `interval`마다 샘플 하나를 `stats`로 송신하는 백그라운드 태스크
pub fn spawn_feed(channel: Arc<dyn Channel>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sampler = match tokio::task::spawn_blocking(Sampler::new).await {
            Ok(sampler) => sampler,
            Err(e) => {
                tracing::error!("Sampler initialization failed: {}", e);
                return;
            }
        };
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let sampled = tokio::task::spawn_blocking(move || {
                let snapshot = sampler.sample();
                (sampler, snapshot)
            })
            .await;
            match sampled {
                Ok((s, snapshot)) => {
                    sampler = s;
                    emit_snapshot(channel.as_ref(), &snapshot);
                }
                Err(e) => {
                    tracing::error!("Sampler task failed, local feed stopped: {}", e);
                    break;
                }
            }
        }
    })
}

fn percent(used: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        used / total * 100.0
    }
}

fn round(v: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (v * factor).round() / factor
}
