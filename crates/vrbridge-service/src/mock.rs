//! Mock 跟踪服务后端（测试与演示用）
//!
//! 行为可脚本化：启动握手在第 N 次检查后就绪（或永不就绪）、
//! 位姿序列单调递增且各分量相互可校验（用于撕裂读检测）、
//! 第 K 次之后位姿读取全部失败（用于陈旧数据策略验证）。
//! 所有生命周期事件都有计数器，测试可据此断言资源配对释放。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use nalgebra::{Matrix4, Quaternion, UnitQuaternion, Vector3};
use parking_lot::Mutex;

use crate::{
    DisplayConfig, InterfaceHandle, PoseSample, ServiceContext, ServiceError, SurfaceGeometry,
    TrackingRuntime, Viewport,
};

/// 第 n 个 mock 位姿样本
///
/// 各分量都由 n 推导：translation = (n, 2n, 3n)，timestamp_us = n，
/// rotation 按 n 的奇偶在两个精确可表示的单位四元数之间交替。
/// 读者拿到样本后可以用 timestamp 反推 n 并校验全部分量一致，
/// 任何撕裂写入都会被发现。
pub fn sample_for(n: u64) -> PoseSample {
    let rotation = if n % 2 == 1 {
        UnitQuaternion::identity()
    } else {
        // 绕 z 轴半周（w=0, k=1），分量精确可比较
        UnitQuaternion::new_unchecked(Quaternion::new(0.0, 0.0, 0.0, 1.0))
    };
    PoseSample::new(
        Vector3::new(n as f64, (2 * n) as f64, (3 * n) as f64),
        rotation,
        n,
    )
}

/// 典型双目几何：1 个 viewer、2 个 eye、各 1 个 surface
pub fn stereo_geometry() -> Vec<SurfaceGeometry> {
    let projection = Matrix4::new_perspective(960.0 / 1080.0, 1.5, 0.1, 100.0);
    [(0u32, -0.032f32, 0i32), (1u32, 0.032f32, 960i32)]
        .into_iter()
        .map(|(eye, offset, viewport_x)| SurfaceGeometry {
            viewer: 0,
            eye,
            surface: 0,
            modelview: Matrix4::new_translation(&Vector3::new(offset, 0.0, 0.0)),
            projection,
            viewport: Viewport::new(viewport_x, 0, 960, 1080),
        })
        .collect()
}

/// 永不就绪的哨兵值
const NEVER_READY: u32 = u32::MAX;

struct MockShared {
    connect_fails: AtomicBool,
    display_valid: AtomicBool,
    /// 启动握手在多少次失败检查之后就绪（NEVER_READY 表示永不）
    ready_after_checks: AtomicU32,
    /// 第 K 次成功之后位姿读取全部失败（0 表示从不失败）
    pose_fail_after: AtomicU64,
    /// 冻结位姿序列：始终返回 `sample_for(1)`
    pose_static: AtomicBool,
    geometry: Mutex<Vec<SurfaceGeometry>>,

    auto_start_attempts: AtomicU32,
    releases: AtomicU32,
    connects: AtomicU32,
    update_calls: AtomicU64,
    interfaces_created: AtomicU32,
}

/// Mock 跟踪服务运行时
///
/// `Clone` 共享内部状态：测试先 clone 一份留作探针，
/// 再把原件交给轮询线程，之后通过探针读计数器、追加几何。
pub struct MockRuntime {
    shared: Arc<MockShared>,
}

impl Clone for MockRuntime {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRuntime {
    /// 创建默认 mock：立即就绪、显示有效、双目几何、位姿序列递增
    pub fn new() -> Self {
        Self {
            shared: Arc::new(MockShared {
                connect_fails: AtomicBool::new(false),
                display_valid: AtomicBool::new(true),
                ready_after_checks: AtomicU32::new(0),
                pose_fail_after: AtomicU64::new(0),
                pose_static: AtomicBool::new(false),
                geometry: Mutex::new(stereo_geometry()),
                auto_start_attempts: AtomicU32::new(0),
                releases: AtomicU32::new(0),
                connects: AtomicU32::new(0),
                update_calls: AtomicU64::new(0),
                interfaces_created: AtomicU32::new(0),
            }),
        }
    }

    /// 启动握手永不就绪（触发启动超时路径）
    pub fn never_ready(self) -> Self {
        self.shared.ready_after_checks.store(NEVER_READY, Ordering::Relaxed);
        self
    }

    /// 启动握手在 `checks` 次失败检查之后就绪
    pub fn ready_after(self, checks: u32) -> Self {
        self.shared.ready_after_checks.store(checks, Ordering::Relaxed);
        self
    }

    /// 显示配置无效（构造后 `valid()` 即返回 false）
    pub fn invalid_display(self) -> Self {
        self.shared.display_valid.store(false, Ordering::Relaxed);
        self
    }

    /// 连接建立失败
    pub fn connect_fails(self) -> Self {
        self.shared.connect_fails.store(true, Ordering::Relaxed);
        self
    }

    /// 冻结位姿序列：每次读取都返回 `sample_for(1)`
    pub fn static_pose(self) -> Self {
        self.shared.pose_static.store(true, Ordering::Relaxed);
        self
    }

    /// 每个接口在第 `k` 次成功读取之后开始持续失败
    pub fn pose_fail_after(self, k: u64) -> Self {
        self.shared.pose_fail_after.store(k, Ordering::Relaxed);
        self
    }

    /// 替换几何记录集合
    pub fn with_geometry(self, geometry: Vec<SurfaceGeometry>) -> Self {
        *self.shared.geometry.lock() = geometry;
        self
    }

    /// 追加几何记录（模拟会话中动态出现的 surface）
    pub fn push_geometry(&self, records: impl IntoIterator<Item = SurfaceGeometry>) {
        self.shared.geometry.lock().extend(records);
    }

    pub fn auto_start_attempts(&self) -> u32 {
        self.shared.auto_start_attempts.load(Ordering::Relaxed)
    }

    pub fn releases(&self) -> u32 {
        self.shared.releases.load(Ordering::Relaxed)
    }

    pub fn connects(&self) -> u32 {
        self.shared.connects.load(Ordering::Relaxed)
    }

    pub fn update_calls(&self) -> u64 {
        self.shared.update_calls.load(Ordering::Relaxed)
    }

    pub fn interfaces_created(&self) -> u32 {
        self.shared.interfaces_created.load(Ordering::Relaxed)
    }
}

impl TrackingRuntime for MockRuntime {
    type Context = MockContext;

    fn attempt_auto_start(&mut self) {
        self.shared.auto_start_attempts.fetch_add(1, Ordering::Relaxed);
    }

    fn release_auto_started_server(&mut self) {
        self.shared.releases.fetch_add(1, Ordering::Relaxed);
    }

    fn connect(&mut self, _application_id: &str) -> Result<MockContext, ServiceError> {
        self.shared.connects.fetch_add(1, Ordering::Relaxed);
        if self.shared.connect_fails.load(Ordering::Relaxed) {
            return Err(ServiceError::ConnectFailed);
        }
        Ok(MockContext {
            shared: Arc::clone(&self.shared),
        })
    }
}

/// Mock 客户端上下文
pub struct MockContext {
    shared: Arc<MockShared>,
}

impl ServiceContext for MockContext {
    type Interface = MockInterface;
    type Display = MockDisplay;

    fn update(&mut self) {
        self.shared.update_calls.fetch_add(1, Ordering::Relaxed);
    }

    fn interface(&mut self, _path: &str) -> Result<MockInterface, ServiceError> {
        self.shared.interfaces_created.fetch_add(1, Ordering::Relaxed);
        Ok(MockInterface {
            shared: Arc::clone(&self.shared),
            calls: 0,
        })
    }

    fn display(&mut self) -> Result<MockDisplay, ServiceError> {
        Ok(MockDisplay {
            shared: Arc::clone(&self.shared),
            checks: 0,
        })
    }
}

/// Mock 接口句柄（每个实例独立的位姿序列）
pub struct MockInterface {
    shared: Arc<MockShared>,
    calls: u64,
}

impl InterfaceHandle for MockInterface {
    fn pose(&mut self) -> Result<PoseSample, ServiceError> {
        if self.shared.pose_static.load(Ordering::Relaxed) {
            return Ok(sample_for(1));
        }
        self.calls += 1;
        let fail_after = self.shared.pose_fail_after.load(Ordering::Relaxed);
        if fail_after != 0 && self.calls > fail_after {
            return Err(ServiceError::NoPoseState);
        }
        Ok(sample_for(self.calls))
    }
}

/// Mock 显示配置
pub struct MockDisplay {
    shared: Arc<MockShared>,
    checks: u32,
}

impl DisplayConfig for MockDisplay {
    fn valid(&self) -> bool {
        self.shared.display_valid.load(Ordering::Relaxed)
    }

    fn check_startup(&mut self) -> bool {
        let ready_after = self.shared.ready_after_checks.load(Ordering::Relaxed);
        if ready_after == NEVER_READY {
            return false;
        }
        self.checks += 1;
        self.checks > ready_after
    }

    fn surfaces(&mut self) -> Vec<SurfaceGeometry> {
        self.shared.geometry.lock().clone()
    }
}
