//! 轮询配置

use std::time::Duration;

/// 轮询线程配置
///
/// 控制轮询频率与启动握手的超时行为。
///
/// # Example
///
/// ```
/// use vrbridge_tracker::TrackerConfig;
///
/// // 使用默认配置（60Hz 轮询，5 秒启动超时）
/// let config = TrackerConfig::default();
///
/// // 自定义配置
/// let config = TrackerConfig {
///     poll_rate_hz: 120,
///     startup_timeout_ms: 2_000,
///     startup_check_interval_ms: 50,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// 轮询频率（Hz）；独立于渲染帧率
    pub poll_rate_hz: u32,
    /// 启动握手超时（毫秒），从进入等待状态起计
    pub startup_timeout_ms: u64,
    /// 启动握手的检查间隔（毫秒）
    pub startup_check_interval_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_rate_hz: 60,
            startup_timeout_ms: 5_000,
            startup_check_interval_ms: 100,
        }
    }
}

impl TrackerConfig {
    /// 单个轮询周期的时长（1000/60 ≈ 16.67ms @ 默认配置）
    pub fn poll_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.poll_rate_hz.max(1)))
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn startup_check_interval(&self) -> Duration {
        Duration::from_millis(self.startup_check_interval_ms)
    }
}
