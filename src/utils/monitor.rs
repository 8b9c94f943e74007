#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy)]
pub struct ProcessSnapshot {
    pub memory_mb: u64,
    pub cpu_usage: f32,
    pub uptime: Duration,
}

/// Memory and uptime of this process, logged once the artifacts are loaded
/// and again at shutdown.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    started: Instant,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = sysinfo::get_current_pid().ok();
        if enabled && pid.is_none() {
            tracing::warn!("Could not determine current PID, process stats disabled");
        }

        Self {
            system: Mutex::new(System::new()),
            pid,
            started: Instant::now(),
            enabled,
        }
    }

    pub fn snapshot(&self) -> Option<ProcessSnapshot> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        let mut system = self.system.lock().ok()?;
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let process = system.process(pid)?;

        Some(ProcessSnapshot {
            memory_mb: process.memory() / 1024 / 1024,
            cpu_usage: process.cpu_usage(),
            uptime: self.started.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(snapshot) = self.snapshot() {
            tracing::info!(
                phase,
                memory_mb = snapshot.memory_mb,
                cpu_percent = snapshot.cpu_usage,
                "📊 process stats"
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(snapshot) = self.snapshot() {
            tracing::info!(
                memory_mb = snapshot.memory_mb,
                uptime = ?snapshot.uptime,
                "📊 shutting down"
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
