//! 共享状态存储
//!
//! 单把互斥锁同时保护接口注册队列、位姿缓存与 viewer/eye/surface 快照树。
//! 轮询线程是唯一写者；消费线程只读（注册队列除外）。
//! 锁内只做内存拷贝，任何服务调用都发生在锁外。

use std::collections::{BTreeMap, HashMap, VecDeque};

use nalgebra::Matrix4;
use parking_lot::Mutex;
use vrbridge_service::{PoseSample, SurfaceGeometry, Viewport};

use crate::metrics::TrackerMetrics;
use crate::status::AtomicWorkerStatus;

/// 一个 eye 的单个可渲染视图区域
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Surface {
    pub projection: Matrix4<f32>,
    pub viewport: Viewport,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            projection: Matrix4::identity(),
            viewport: Viewport::default(),
        }
    }
}

/// 单眼视图：modelview 矩阵加 surface 集合
///
/// surface-id 在会话内对本 eye 稳定。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Eye {
    pub modelview: Matrix4<f32>,
    pub surfaces: BTreeMap<u32, Surface>,
}

impl Default for Eye {
    fn default() -> Self {
        Self {
            modelview: Matrix4::identity(),
            surfaces: BTreeMap::new(),
        }
    }
}

/// 一个 viewer 的 eye 集合
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewer {
    pub eyes: BTreeMap<u32, Eye>,
}

/// 完整几何快照：viewer-id → Viewer
///
/// 会话内形状只增不减，节点首见即建、就地更新。
pub type ViewerTree = BTreeMap<u32, Viewer>;

/// 互斥锁保护下的全部共享数据
#[derive(Debug, Default)]
pub struct SharedState {
    /// 待激活的接口路径队列（消费线程入队，轮询线程每周期清空）
    pub pending: VecDeque<String>,
    /// 位姿缓存：路径 → 最近一次成功读取的样本（激活后、首个样本前为 None）
    pub poses: HashMap<String, Option<PoseSample>>,
    /// 几何快照树
    pub viewers: ViewerTree,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把一条几何记录写入快照树
    ///
    /// viewer/eye/surface 节点首见时创建，之后就地覆盖；从不删除节点。
    pub fn apply_geometry(&mut self, record: &SurfaceGeometry) {
        let viewer = self.viewers.entry(record.viewer).or_default();
        let eye = viewer.eyes.entry(record.eye).or_default();
        eye.modelview = record.modelview;
        let surface = eye.surfaces.entry(record.surface).or_default();
        surface.projection = record.projection;
        surface.viewport = record.viewport;
    }
}

/// 轮询线程与消费线程共享的上下文
#[derive(Debug, Default)]
pub struct TrackerContext {
    pub shared: Mutex<SharedState>,
    pub status: AtomicWorkerStatus,
    pub metrics: TrackerMetrics,
}

impl TrackerContext {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(viewer: u32, eye: u32, surface: u32, proj_scale: f32) -> SurfaceGeometry {
        SurfaceGeometry {
            viewer,
            eye,
            surface,
            modelview: Matrix4::identity() * proj_scale,
            projection: Matrix4::identity() * proj_scale,
            viewport: Viewport::new(0, 0, 960, 1080),
        }
    }

    fn node_count(tree: &ViewerTree) -> usize {
        tree.values()
            .flat_map(|viewer| viewer.eyes.values())
            .map(|eye| 1 + eye.surfaces.len())
            .sum::<usize>()
            + tree.len()
    }

    #[test]
    fn test_apply_geometry_creates_on_first_sight() {
        let mut state = SharedState::new();
        state.apply_geometry(&record(0, 1, 0, 1.0));

        let eye = &state.viewers[&0].eyes[&1];
        assert_eq!(eye.surfaces.len(), 1);
        assert_eq!(eye.surfaces[&0].viewport.width, 960);
    }

    #[test]
    fn test_apply_geometry_updates_in_place() {
        let mut state = SharedState::new();
        state.apply_geometry(&record(0, 0, 0, 1.0));
        let before = node_count(&state.viewers);

        state.apply_geometry(&record(0, 0, 0, 2.0));

        assert_eq!(node_count(&state.viewers), before);
        assert_eq!(
            state.viewers[&0].eyes[&0].surfaces[&0].projection,
            Matrix4::identity() * 2.0
        );
    }

    #[test]
    fn test_tree_shape_only_grows() {
        let mut state = SharedState::new();
        let mut last_count = 0;

        for (viewer, eye, surface) in [(0, 0, 0), (0, 1, 0), (0, 0, 1), (1, 0, 0), (0, 0, 0)] {
            state.apply_geometry(&record(viewer, eye, surface, 1.0));
            let count = node_count(&state.viewers);
            assert!(count >= last_count);
            last_count = count;
        }

        // 重复写入不改变形状
        assert_eq!(state.viewers.len(), 2);
        assert_eq!(state.viewers[&0].eyes[&0].surfaces.len(), 2);
    }
}
