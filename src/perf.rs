use std::time::Instant;

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 性能日志开关
///
/// - Debug 默认开启；Release 默认关闭
/// - `INVENTORY_REPLENISHMENT_PERF=1` 强制开启 / `=0` 强制关闭
pub fn perf_enabled() -> bool {
    match std::env::var("INVENTORY_REPLENISHMENT_PERF") {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    }
}

/// 性能统计 Guard：记录 elapsed_ms + 处理行数
///
/// 使用方式：
/// ```ignore
/// let mut perf = inventory_replenishment::perf::PerfGuard::new("replenishment_run");
/// // do work...
/// perf.set_rows(results.len());
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    rows: usize,
    enabled: bool,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
            rows: 0,
            enabled: perf_enabled(),
        }
    }

    pub fn set_rows(&mut self, rows: usize) {
        self.rows = rows;
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms = self.elapsed_ms(),
            rows = self.rows,
            "done"
        );
    }
}
