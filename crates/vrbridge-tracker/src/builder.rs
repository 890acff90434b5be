//! Builder 模式实现
//!
//! 提供链式构造 [`Tracker`] 实例的便捷方式。

use vrbridge_service::TrackingRuntime;

use crate::config::TrackerConfig;
use crate::tracker::Tracker;

/// Tracker Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use vrbridge_tracker::{Tracker, TrackerConfig};
///
/// # // 需要一个具体的 TrackingRuntime 后端，仅供参考
/// # // let tracker = Tracker::builder("com.example.app")
/// # //     .auto_start(false)
/// # //     .config(TrackerConfig { poll_rate_hz: 120, ..TrackerConfig::default() })
/// # //     .spawn(runtime);
/// ```
pub struct TrackerBuilder {
    /// 传给跟踪服务的应用标识
    application_id: String,
    /// 是否尝试拉起服务进程（默认开启）
    auto_start: bool,
    /// 轮询配置
    config: Option<TrackerConfig>,
}

impl TrackerBuilder {
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            auto_start: true,
            config: None,
        }
    }

    /// 设置是否尝试服务 auto-start（可选，默认开启）
    pub fn auto_start(mut self, enabled: bool) -> Self {
        self.auto_start = enabled;
        self
    }

    /// 设置轮询配置（可选）
    pub fn config(mut self, config: TrackerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 启动轮询线程并返回 facade
    ///
    /// 从不同步失败；启动问题之后表现为全部查询返回未找到。
    pub fn spawn<R>(self, runtime: R) -> Tracker
    where
        R: TrackingRuntime + Send + 'static,
    {
        Tracker::spawn_with(
            runtime,
            self.application_id,
            self.auto_start,
            self.config.unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = TrackerBuilder::new("com.example.app");
        assert_eq!(builder.application_id, "com.example.app");
        assert!(builder.auto_start);
        assert!(builder.config.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = TrackerConfig {
            poll_rate_hz: 120,
            ..TrackerConfig::default()
        };
        let builder = TrackerBuilder::new("com.example.app")
            .auto_start(false)
            .config(config.clone());

        assert!(!builder.auto_start);
        assert_eq!(builder.config, Some(config));
    }
}
