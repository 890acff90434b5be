//! 稳态轮询行为测试
//!
//! 覆盖注册→激活→数据可用的主路径、重复注册的幂等性、
//! 位姿读取失败时的陈旧数据策略，以及几何快照树的单调生长。

use std::time::{Duration, Instant};

use nalgebra::{UnitQuaternion, Vector3};
use vrbridge_sdk::service::mock::{self, MockRuntime};
use vrbridge_sdk::{Tracker, TrackerConfig};

fn fast_config() -> TrackerConfig {
    TrackerConfig {
        poll_rate_hz: 200,
        startup_timeout_ms: 500,
        startup_check_interval_ms: 5,
    }
}

fn spawn_tracker(runtime: MockRuntime) -> Tracker {
    Tracker::builder("com.vrbridge.test")
        .auto_start(false)
        .config(fast_config())
        .spawn(runtime)
}

/// 轮询谓词直到成立或超时
fn wait_until(timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    false
}

#[test]
fn test_never_registered_path_not_found() {
    let tracker = spawn_tracker(MockRuntime::new());
    tracker.wait_for_display(Duration::from_secs(1)).unwrap();

    assert!(tracker.interface_pose("/never/registered").is_none());
}

#[test]
fn test_head_pose_scenario() {
    // 固定位姿：首个成功读取返回平移 (1,2,3)、单位旋转
    let tracker = spawn_tracker(MockRuntime::new().static_pose());
    tracker.add_interface("/me/head");

    assert!(wait_until(Duration::from_secs(1), || {
        tracker.interface_pose("/me/head").is_some()
    }));

    let pose = tracker.interface_pose("/me/head").unwrap();
    assert_eq!(pose.translation, Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(pose.rotation, UnitQuaternion::identity());
}

#[test]
fn test_repeated_add_interface_is_idempotent() {
    let probe = MockRuntime::new();
    let tracker = spawn_tracker(probe.clone());

    // 启动前重复注册
    tracker.add_interface("/me/head");
    tracker.add_interface("/me/head");
    tracker.wait_for_display(Duration::from_secs(1)).unwrap();

    assert!(wait_until(Duration::from_secs(1), || {
        tracker.interface_pose("/me/head").is_some()
    }));

    // 稳态后再次重复注册
    tracker.add_interface("/me/head");
    std::thread::sleep(Duration::from_millis(50));

    assert_eq!(probe.interfaces_created(), 1);
    assert_eq!(tracker.metrics().interfaces_activated, 1);
    assert!(tracker.interface_pose("/me/head").is_some());
}

#[test]
fn test_pose_failures_serve_stale_data() {
    // 第 3 次成功之后位姿读取全部失败：缓存应停留在第 3 个样本
    let tracker = spawn_tracker(MockRuntime::new().pose_fail_after(3));
    tracker.add_interface("/me/head");

    assert!(wait_until(Duration::from_secs(1), || {
        tracker
            .interface_pose("/me/head")
            .is_some_and(|pose| pose.timestamp_us == 3)
    }));

    std::thread::sleep(Duration::from_millis(50));

    let pose = tracker.interface_pose("/me/head").unwrap();
    assert_eq!(pose, mock::sample_for(3));
    assert!(tracker.metrics().pose_misses > 0);
}

#[test]
fn test_service_pumped_every_cycle() {
    let probe = MockRuntime::new();
    let tracker = spawn_tracker(probe.clone());
    tracker.wait_for_display(Duration::from_secs(1)).unwrap();

    std::thread::sleep(Duration::from_millis(50));

    let cycles = tracker.metrics().poll_cycles;
    assert!(cycles > 0);
    assert!(probe.update_calls() >= cycles);
}

#[test]
fn test_snapshot_tree_grows_monotonically() {
    let probe = MockRuntime::new();
    let tracker = spawn_tracker(probe.clone());
    tracker.wait_for_display(Duration::from_secs(1)).unwrap();

    // 默认双目几何：1 viewer × 2 eye × 1 surface
    assert!(wait_until(Duration::from_secs(1), || {
        tracker
            .viewers()
            .get(&0)
            .is_some_and(|viewer| viewer.eyes.len() == 2)
    }));

    // 会话中动态出现的新 surface
    let mut extra = mock::stereo_geometry().remove(0);
    extra.surface = 1;
    probe.push_geometry([extra]);

    assert!(wait_until(Duration::from_secs(1), || {
        tracker
            .viewers()
            .get(&0)
            .and_then(|viewer| viewer.eyes.get(&0))
            .is_some_and(|eye| eye.surfaces.len() == 2)
    }));

    // 旧节点仍在，形状只增不减
    let viewers = tracker.viewers();
    assert_eq!(viewers.len(), 1);
    assert_eq!(viewers[&0].eyes.len(), 2);
    assert_eq!(viewers[&0].eyes[&0].surfaces.len(), 2);
    assert_eq!(viewers[&0].eyes[&1].surfaces.len(), 1);
}

#[test]
fn test_geometry_updates_in_place() {
    let probe = MockRuntime::new();
    let tracker = spawn_tracker(probe.clone());
    tracker.wait_for_display(Duration::from_secs(1)).unwrap();

    assert!(wait_until(Duration::from_secs(1), || {
        tracker.viewers().contains_key(&0)
    }));

    // 同一 (viewer, eye, surface) 的新记录应就地覆盖，不新建节点
    let mut updated = mock::stereo_geometry().remove(0);
    updated.viewport = vrbridge_sdk::Viewport::new(0, 0, 1920, 2160);
    probe.push_geometry([updated]);

    assert!(wait_until(Duration::from_secs(1), || {
        tracker
            .viewers()
            .get(&0)
            .and_then(|viewer| viewer.eyes.get(&0))
            .and_then(|eye| eye.surfaces.get(&0))
            .is_some_and(|surface| surface.viewport.width == 1920)
    }));

    let viewers = tracker.viewers();
    assert_eq!(viewers[&0].eyes[&0].surfaces.len(), 1);
}
