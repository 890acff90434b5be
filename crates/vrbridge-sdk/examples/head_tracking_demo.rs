//! 头部跟踪演示
//!
//! 用 mock 后端演示完整使用流程：启动轮询线程、注册接口路径、
//! 在"渲染线程"节奏（10Hz）下读取最新位姿与几何快照。
//!
//! 运行方式：
//! ```bash
//! cargo run --example head_tracking_demo --features mock
//! ```

use std::time::Duration;

use clap::Parser;
use vrbridge_sdk::service::mock::MockRuntime;
use vrbridge_sdk::{Tracker, TrackerConfig, init_logging};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "head_tracking_demo")]
#[command(about = "后台轮询演示 - mock 跟踪服务 + 渲染节奏的消费端")]
struct Args {
    /// 要跟踪的接口路径
    #[arg(long, default_value = "/me/head")]
    path: String,

    /// 运行时长（秒）
    #[arg(long, default_value = "3")]
    duration_sec: u64,

    /// 轮询频率（Hz）
    #[arg(long, default_value = "60")]
    poll_rate_hz: u32,
}

fn main() {
    init_logging();
    let args = Args::parse();

    let probe = MockRuntime::new();
    let tracker = Tracker::builder("com.vrbridge.demo")
        .config(TrackerConfig {
            poll_rate_hz: args.poll_rate_hz,
            ..TrackerConfig::default()
        })
        .spawn(probe.clone());

    tracker.add_interface(args.path.clone());
    tracker
        .wait_for_display(Duration::from_secs(5))
        .expect("display startup failed");
    tracing::info!("tracking started, reading at 10Hz");

    let frames = args.duration_sec * 10;
    for _ in 0..frames {
        match tracker.interface_pose(&args.path) {
            Some(pose) => {
                let viewers = tracker.viewers();
                let surfaces: usize = viewers
                    .values()
                    .flat_map(|viewer| viewer.eyes.values())
                    .map(|eye| eye.surfaces.len())
                    .sum();
                println!(
                    "pose t=({:.1}, {:.1}, {:.1}) ts={}us | {} viewer(s), {} surface(s)",
                    pose.translation.x,
                    pose.translation.y,
                    pose.translation.z,
                    pose.timestamp_us,
                    viewers.len(),
                    surfaces,
                );
            },
            None => println!("pose not available yet"),
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    let metrics = tracker.metrics();
    println!(
        "done: {} poll cycles, {} pose updates, {} misses",
        metrics.poll_cycles, metrics.pose_updates, metrics.pose_misses
    );
}
