//! 客户端 Facade
//!
//! 对消费线程（通常是渲染线程）暴露的公共接口，封装轮询线程的
//! 启动、状态查询与停机细节。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{JoinHandle, spawn};
use std::time::{Duration, Instant};

use tracing::{error, warn};
use vrbridge_service::{PoseSample, TrackingRuntime};

use crate::builder::TrackerBuilder;
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::metrics::MetricsSnapshot;
use crate::state::{TrackerContext, ViewerTree};
use crate::status::WorkerStatus;
use crate::worker::poll_loop;

/// Extension trait for timeout-capable thread joins
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        // 看门狗线程执行真正的 join，主线程带超时等待其回报
        let (tx, rx) = crossbeam_channel::bounded(1);

        spawn(move || {
            let result = self.join();
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                // 超时：看门狗线程继续运行，进程退出时由 OS 回收
                Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "Thread join timeout",
                )))
            },
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "Thread panicked during join",
                )))
            },
        }
    }
}

/// HMD 跟踪客户端（对外 API）
///
/// 构造时启动轮询线程，Drop 时置停止标志并 join。
/// 所有查询都是时间点读取：返回最近一次完整写入的值，不与渲染帧同步。
///
/// # Example
///
/// ```no_run
/// # use vrbridge_tracker::Tracker;
/// # // 需要一个具体的 TrackingRuntime 后端，仅供参考
/// # // let tracker = Tracker::builder("com.example.app").spawn(runtime);
/// # // tracker.add_interface("/me/head");
/// # // if let Some(pose) = tracker.interface_pose("/me/head") {
/// # //     println!("head at {:?}", pose.translation);
/// # // }
/// ```
pub struct Tracker {
    /// 共享状态上下文
    ctx: Arc<TrackerContext>,
    /// 运行标志（Drop 时置 false 通知轮询线程退出）
    is_running: Arc<AtomicBool>,
    /// 轮询线程句柄（Drop 时 join）
    worker: Option<JoinHandle<()>>,
}

impl Tracker {
    /// 链式构造入口
    pub fn builder(application_id: impl Into<String>) -> TrackerBuilder {
        TrackerBuilder::new(application_id)
    }

    /// 以默认配置启动（auto-start 开启）
    ///
    /// 构造从不同步失败：连接/启动问题之后表现为全部查询返回未找到。
    pub fn spawn<R>(runtime: R, application_id: impl Into<String>) -> Self
    where
        R: TrackingRuntime + Send + 'static,
    {
        Self::spawn_with(runtime, application_id.into(), true, TrackerConfig::default())
    }

    pub(crate) fn spawn_with<R>(
        runtime: R,
        application_id: String,
        auto_start: bool,
        config: TrackerConfig,
    ) -> Self
    where
        R: TrackingRuntime + Send + 'static,
    {
        let ctx = Arc::new(TrackerContext::new());
        let is_running = Arc::new(AtomicBool::new(true));

        let ctx_worker = Arc::clone(&ctx);
        let is_running_worker = Arc::clone(&is_running);
        let worker = spawn(move || {
            poll_loop(
                runtime,
                application_id,
                auto_start,
                config,
                ctx_worker,
                is_running_worker,
            );
        });

        Self {
            ctx,
            is_running,
            worker: Some(worker),
        }
    }

    /// 注册一个接口路径，等待轮询线程激活
    ///
    /// 任意线程任意时刻可调用（包括启动握手完成之前）。注册到首个
    /// 数据可用之间最多相差一个轮询周期；重复注册同一路径为空操作。
    pub fn add_interface(&self, path: impl Into<String>) {
        self.ctx.shared.lock().pending.push_back(path.into());
    }

    /// 读取某接口最近一次成功获取的位姿
    ///
    /// 未注册、尚未激活或尚无数据时返回 `None`（并记录警告），从不报错。
    pub fn interface_pose(&self, path: &str) -> Option<PoseSample> {
        let shared = self.ctx.shared.lock();
        match shared.poses.get(path) {
            Some(Some(sample)) => Some(*sample),
            Some(None) => {
                warn!("no pose received yet for interface: {}", path);
                None
            },
            None => {
                warn!("interface is not found with path: {}", path);
                None
            },
        }
    }

    /// 当前 viewer/eye/surface 几何快照的深拷贝
    ///
    /// 返回后不再持有任何锁，调用方可任意使用。
    pub fn viewers(&self) -> ViewerTree {
        self.ctx.shared.lock().viewers.clone()
    }

    /// 轮询线程当前所处阶段
    pub fn status(&self) -> WorkerStatus {
        self.ctx.status.get(Ordering::Acquire)
    }

    /// 轮询线程是否存活
    pub fn is_healthy(&self) -> bool {
        self.worker.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// 指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// 阻塞等待轮询线程进入稳态
    ///
    /// # 返回值
    /// - `Ok(())`: 启动握手完成，已进入 Running
    /// - `Err(TrackerError::StartupFailed)`: 线程在进入稳态前停止
    /// - `Err(TrackerError::Timeout)`: 等待超时
    pub fn wait_for_display(&self, timeout: Duration) -> Result<(), TrackerError> {
        let start = Instant::now();
        loop {
            let status = self.status();
            if status.is_running() {
                return Ok(());
            }
            if status.is_terminal() {
                return Err(TrackerError::StartupFailed);
            }
            if start.elapsed() >= timeout {
                return Err(TrackerError::Timeout);
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        // Release 保证轮询线程看到标志前的全部写入
        self.is_running.store(false, Ordering::Release);

        let join_timeout = Duration::from_secs(2);
        if let Some(handle) = self.worker.take()
            && handle.join_timeout(join_timeout).is_err()
        {
            error!(
                "polling thread panicked or failed to shut down within {:?}",
                join_timeout
            );
        }
    }
}
