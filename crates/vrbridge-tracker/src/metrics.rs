//! 轮询线程性能指标（原子计数器）

use std::sync::atomic::{AtomicU64, Ordering};

/// 轮询指标
///
/// 全部为 Relaxed 原子计数，轮询线程写入、任意线程读取快照。
#[derive(Debug, Default)]
pub struct TrackerMetrics {
    /// 完成的轮询周期数
    pub poll_cycles: AtomicU64,
    /// 成功写入缓存的位姿数
    pub pose_updates: AtomicU64,
    /// 位姿读取失败数（瞬态，缓存保留旧值）
    pub pose_misses: AtomicU64,
    /// 写入快照树的几何记录数
    pub geometry_records: AtomicU64,
    /// 激活的接口数
    pub interfaces_activated: AtomicU64,
}

impl TrackerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前计数器快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            poll_cycles: self.poll_cycles.load(Ordering::Relaxed),
            pose_updates: self.pose_updates.load(Ordering::Relaxed),
            pose_misses: self.pose_misses.load(Ordering::Relaxed),
            geometry_records: self.geometry_records.load(Ordering::Relaxed),
            interfaces_activated: self.interfaces_activated.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照（普通值，可自由拷贝比较）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub poll_cycles: u64,
    pub pose_updates: u64,
    pub pose_misses: u64,
    pub geometry_records: u64,
    pub interfaces_activated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = TrackerMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());

        metrics.poll_cycles.fetch_add(3, Ordering::Relaxed);
        metrics.pose_updates.fetch_add(2, Ordering::Relaxed);
        metrics.pose_misses.fetch_add(1, Ordering::Relaxed);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.poll_cycles, 3);
        assert_eq!(snapshot.pose_updates, 2);
        assert_eq!(snapshot.pose_misses, 1);
        assert_eq!(snapshot.geometry_records, 0);
    }
}
