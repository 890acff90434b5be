//! # VRBridge SDK
//!
//! HMD 跟踪客户端的统一入口：后台轮询线程持续查询外部跟踪服务，
//! 渲染线程按自己的节奏读取最新位姿与 viewer/eye/surface 几何。
//!
//! # 快速开始
//!
//! ```no_run
//! use vrbridge_sdk::Tracker;
//!
//! # // 需要一个具体的 TrackingRuntime 后端（或开启 mock feature），仅供参考
//! # // let tracker = Tracker::builder("com.example.app").spawn(runtime);
//! # // tracker.add_interface("/me/head");
//! # // if let Some(pose) = tracker.interface_pose("/me/head") {
//! # //     println!("head at {:?}", pose.translation);
//! # // }
//! ```

pub use vrbridge_service as service;
pub use vrbridge_tracker as tracker;

pub use vrbridge_service::{
    DisplayConfig, InterfaceHandle, PoseSample, ServiceContext, ServiceError, SurfaceGeometry,
    TrackingRuntime, Viewport,
};
pub use vrbridge_tracker::{
    MetricsSnapshot, Tracker, TrackerBuilder, TrackerConfig, TrackerError, WorkerStatus,
};

/// 初始化日志（`log` 桥接 + env-filter，默认 info 级别）
///
/// 可重复调用；已初始化时静默返回。
pub fn init_logging() {
    let _ = tracing_log::LogTracer::init();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
