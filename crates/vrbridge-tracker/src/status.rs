//! 轮询线程状态定义
//!
//! 状态机单向推进：Connecting → AwaitingDisplay → Running → Stopped，
//! 任一阶段失败进入 Failed（终态，不致命——之后所有查询返回未找到）。

use std::sync::atomic::{AtomicU8, Ordering};

/// 轮询线程所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum WorkerStatus {
    /// 正在建立服务连接（含可选的 auto-start 尝试）
    #[default]
    Connecting = 0,

    /// 连接已建立，等待显示配置完成启动握手
    AwaitingDisplay = 1,

    /// 稳态轮询中
    Running = 2,

    /// 启动失败，线程已停止（终态）
    Failed = 3,

    /// 被外部停止后正常退出
    Stopped = 4,
}

impl WorkerStatus {
    /// 从 u8 转换；无效值归入 Failed
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::AwaitingDisplay,
            2 => Self::Running,
            4 => Self::Stopped,
            _ => Self::Failed,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 是否处于稳态轮询
    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    /// 是否已终止（不会再产生新数据）
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Stopped)
    }
}

/// 线程间共享的原子状态
#[derive(Debug)]
pub struct AtomicWorkerStatus {
    inner: AtomicU8,
}

impl AtomicWorkerStatus {
    pub fn new(status: WorkerStatus) -> Self {
        Self {
            inner: AtomicU8::new(status.as_u8()),
        }
    }

    pub fn get(&self, ordering: Ordering) -> WorkerStatus {
        WorkerStatus::from_u8(self.inner.load(ordering))
    }

    pub fn set(&self, status: WorkerStatus, ordering: Ordering) {
        self.inner.store(status.as_u8(), ordering);
    }
}

impl Default for AtomicWorkerStatus {
    fn default() -> Self {
        Self::new(WorkerStatus::Connecting)
    }
}
