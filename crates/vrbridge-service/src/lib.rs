//! # VRBridge 跟踪服务抽象层
//!
//! 对外部 HMD 跟踪服务的统一抽象。轮询线程只通过这里的 trait 与服务交互，
//! 不关心具体后端（真实服务进程或测试用 mock）。

use thiserror::Error;

mod types;

pub use types::{PoseSample, SurfaceGeometry, Viewport};

#[cfg(feature = "mock")]
pub mod mock;

/// 跟踪服务统一错误类型
#[derive(Error, Debug)]
pub enum ServiceError {
    /// 无法建立客户端连接（服务未运行或拒绝连接）
    #[error("Failed to connect to tracking service")]
    ConnectFailed,

    /// 无法获取显示配置
    #[error("Display config unavailable")]
    DisplayUnavailable,

    /// 接口路径无法解析为跟踪接口
    #[error("Interface unavailable: {path}")]
    InterfaceUnavailable { path: String },

    /// 当前周期没有可用的位姿数据
    #[error("No pose state available")]
    NoPoseState,

    /// 后端内部错误
    #[error("Backend error: {0}")]
    Backend(String),
}

/// 跟踪服务运行时（入口点）
///
/// 由轮询线程独占持有，负责服务进程的 auto-start 与客户端连接的建立。
/// `attempt_auto_start` 是尽力而为的一次性尝试，失败不报告；
/// 若调用过它，停机时必须调用 `release_auto_started_server` 配对释放。
pub trait TrackingRuntime {
    type Context: ServiceContext;

    /// 尝试拉起跟踪服务进程（尽力而为，不保证成功）
    fn attempt_auto_start(&mut self) {}

    /// 释放 auto-start 拉起的服务实例（停机时调用）
    fn release_auto_started_server(&mut self) {}

    /// 以给定应用标识建立客户端上下文
    fn connect(&mut self, application_id: &str) -> Result<Self::Context, ServiceError>;
}

/// 跟踪服务客户端上下文
///
/// 每个轮询周期必须先调用一次 `update` 刷新服务内部状态，
/// 之后的接口/几何读取才会返回新数据。
pub trait ServiceContext {
    type Interface: InterfaceHandle;
    type Display: DisplayConfig;

    /// 泵送服务内部事件（每周期一次，读取前调用）
    fn update(&mut self);

    /// 按路径获取跟踪接口句柄
    fn interface(&mut self, path: &str) -> Result<Self::Interface, ServiceError>;

    /// 构造显示/几何查询对象
    fn display(&mut self) -> Result<Self::Display, ServiceError>;
}

/// 单个跟踪接口的连接句柄
///
/// 与一个接口路径一一对应，由轮询线程独占持有，绝不跨线程共享。
pub trait InterfaceHandle {
    /// 请求最新位姿；本周期无数据时返回 [`ServiceError::NoPoseState`]
    fn pose(&mut self) -> Result<PoseSample, ServiceError>;
}

/// 显示/几何查询对象
pub trait DisplayConfig {
    /// 显示配置是否有效（构造后立即可查）
    fn valid(&self) -> bool;

    /// 启动握手检查；在服务收敛前返回 false
    fn check_startup(&mut self) -> bool;

    /// 枚举当前全部 viewer/eye/surface 几何
    ///
    /// 返回扁平的逐 surface 记录，集合随会话推进只增不减。
    fn surfaces(&mut self) -> Vec<SurfaceGeometry>;
}
