//! 轮询线程主循环
//!
//! 负责跟踪服务的完整连接生命周期：可选 auto-start、带超时的启动握手、
//! 稳态下按固定频率拉取接口位姿与 viewer/eye/surface 几何并写入共享状态。
//!
//! 锁约束：任何服务调用都不持锁。每个周期先在锁外完成全部服务读取，
//! 再短暂加锁把结果整体拷入共享状态，保证消费线程的锁等待有界。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, error, info, trace, warn};
use vrbridge_service::{
    DisplayConfig, InterfaceHandle, PoseSample, ServiceContext, TrackingRuntime,
};

use crate::config::TrackerConfig;
use crate::state::TrackerContext;
use crate::status::WorkerStatus;

/// 轮询线程入口
///
/// # 参数
/// - `runtime`: 跟踪服务运行时（被移动进线程，独占持有）
/// - `application_id`: 传给服务的应用标识
/// - `auto_start`: 是否尝试拉起服务进程
/// - `ctx`: 共享状态上下文
/// - `is_running`: 停止标志（facade 置 false 后在一个周期内退出）
pub fn poll_loop<R>(
    mut runtime: R,
    application_id: String,
    auto_start: bool,
    config: TrackerConfig,
    ctx: Arc<TrackerContext>,
    is_running: Arc<AtomicBool>,
) where
    R: TrackingRuntime,
{
    if auto_start {
        info!("attempting tracking server auto start");
        runtime.attempt_auto_start();
    }

    run_session(&mut runtime, &application_id, &config, &ctx, &is_running);

    // 无论会话如何结束，auto-start 过的服务实例都要配对释放
    if auto_start {
        runtime.release_auto_started_server();
        info!("released auto-started tracking server");
    }

    info!("polling thread exit");
}

/// 一次完整的服务会话：连接 → 启动握手 → 稳态轮询
///
/// 返回前把最终状态写入 `ctx.status`；启动失败（Failed）不致命，
/// facade 之后的查询只会得到未找到。
fn run_session<R>(
    runtime: &mut R,
    application_id: &str,
    config: &TrackerConfig,
    ctx: &TrackerContext,
    is_running: &AtomicBool,
) where
    R: TrackingRuntime,
{
    ctx.status.set(WorkerStatus::Connecting, Ordering::Release);

    let mut service = match runtime.connect(application_id) {
        Ok(service) => service,
        Err(e) => {
            error!("failed to connect to tracking service: {}", e);
            ctx.status.set(WorkerStatus::Failed, Ordering::Release);
            return;
        },
    };

    let mut display = match service.display() {
        Ok(display) => display,
        Err(e) => {
            error!("could not get display config: {}", e);
            ctx.status.set(WorkerStatus::Failed, Ordering::Release);
            return;
        },
    };

    if !display.valid() {
        error!("display config is not valid (server probably not running or not behaving)");
        ctx.status.set(WorkerStatus::Failed, Ordering::Release);
        return;
    }

    // ============================================================
    // 启动握手：短间隔轮询就绪检查，期间持续泵送服务事件
    // ============================================================
    ctx.status.set(WorkerStatus::AwaitingDisplay, Ordering::Release);
    info!("waiting for display startup");

    let deadline = Instant::now() + config.startup_timeout();
    while !display.check_startup() {
        if !is_running.load(Ordering::Acquire) {
            trace!("stop requested during display startup");
            ctx.status.set(WorkerStatus::Stopped, Ordering::Release);
            return;
        }
        service.update();
        if Instant::now() >= deadline {
            warn!(
                "display startup check timed out after {:?}",
                config.startup_timeout()
            );
            ctx.status.set(WorkerStatus::Failed, Ordering::Release);
            return;
        }
        std::thread::sleep(config.startup_check_interval());
    }
    info!("display startup complete");

    // ============================================================
    // 稳态轮询
    // ============================================================
    ctx.status.set(WorkerStatus::Running, Ordering::Release);

    // 接口句柄只存活在本线程；跨线程传递的只有字符串路径
    let mut handles: HashMap<String, <R::Context as ServiceContext>::Interface> = HashMap::new();

    let period = config.poll_period();
    let sleeper = spin_sleep::SpinSleeper::default();

    loop {
        if !is_running.load(Ordering::Acquire) {
            break;
        }
        let cycle_start = Instant::now();

        // ============================================================
        // 1. 清空注册队列，为新路径建立接口句柄（重复注册为空操作）
        // ============================================================
        let drained: Vec<String> = {
            let mut shared = ctx.shared.lock();
            shared.pending.drain(..).collect()
        };
        for path in drained {
            if handles.contains_key(&path) {
                debug!("interface already active: {}", path);
                continue;
            }
            match service.interface(&path) {
                Ok(handle) => {
                    info!("interface added: {}", path);
                    handles.insert(path.clone(), handle);
                    ctx.metrics.interfaces_activated.fetch_add(1, Ordering::Relaxed);
                    ctx.shared.lock().poses.entry(path).or_insert(None);
                },
                Err(e) => {
                    warn!("failed to acquire interface {}: {}", path, e);
                },
            }
        }

        // ============================================================
        // 2. 泵送服务事件（后续读取返回新数据的前提）
        // ============================================================
        service.update();

        // ============================================================
        // 3. 几何：锁外枚举，锁内整体写入
        // ============================================================
        let geometry = display.surfaces();
        if !geometry.is_empty() {
            let mut shared = ctx.shared.lock();
            for record in &geometry {
                shared.apply_geometry(record);
            }
            drop(shared);
            ctx.metrics
                .geometry_records
                .fetch_add(geometry.len() as u64, Ordering::Relaxed);
        }

        // ============================================================
        // 4. 位姿：锁外逐句柄读取，锁内整体覆盖；读取失败保留旧值
        // ============================================================
        let mut updates: Vec<(String, PoseSample)> = Vec::with_capacity(handles.len());
        for (path, handle) in handles.iter_mut() {
            match handle.pose() {
                Ok(sample) => updates.push((path.clone(), sample)),
                Err(e) => {
                    trace!("no pose state for {}: {}", path, e);
                    ctx.metrics.pose_misses.fetch_add(1, Ordering::Relaxed);
                },
            }
        }
        if !updates.is_empty() {
            let count = updates.len() as u64;
            let mut shared = ctx.shared.lock();
            for (path, sample) in updates {
                shared.poses.insert(path, Some(sample));
            }
            drop(shared);
            ctx.metrics.pose_updates.fetch_add(count, Ordering::Relaxed);
        }

        ctx.metrics.poll_cycles.fetch_add(1, Ordering::Relaxed);

        // ============================================================
        // 5. 睡完周期剩余时间
        // ============================================================
        sleeper.sleep(period.saturating_sub(cycle_start.elapsed()));
    }

    ctx.status.set(WorkerStatus::Stopped, Ordering::Release);
}
