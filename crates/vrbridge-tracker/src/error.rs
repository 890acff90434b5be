//! 跟踪核心错误类型定义

use thiserror::Error;

/// 跟踪核心错误类型
///
/// 查询接口（位姿、快照）从不返回错误，未命中以 `Option` 表达；
/// 这里的错误只出现在等待类辅助方法上。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerError {
    /// 轮询线程在进入稳态前停止（启动失败或被外部停止）
    #[error("Tracking service startup failed")]
    StartupFailed,

    /// 操作超时
    #[error("Operation timeout")]
    Timeout,
}
