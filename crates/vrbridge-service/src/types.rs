//! 服务边界上的共享数据类型

use nalgebra::{Matrix4, UnitQuaternion, Vector3};

/// 一次成功读取到的接口位姿
///
/// 平移与旋转总是作为整体写入，读者不会观察到半更新的样本。
/// `timestamp_us` 为服务侧时间戳（微秒）。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseSample {
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub timestamp_us: u64,
}

impl PoseSample {
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>, timestamp_us: u64) -> Self {
        Self {
            translation,
            rotation,
            timestamp_us,
        }
    }
}

/// surface 在其所属 eye 渲染目标内的相对视口（整数像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// 一条逐 surface 的几何记录
///
/// 服务按 viewer/eye/surface 三级 id 枚举几何；同一 eye 的 modelview
/// 会在它的每条 surface 记录上重复出现，消费侧按 id 去重写入。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceGeometry {
    pub viewer: u32,
    pub eye: u32,
    pub surface: u32,
    /// eye 级 modelview 矩阵
    pub modelview: Matrix4<f32>,
    /// surface 级投影矩阵
    pub projection: Matrix4<f32>,
    /// surface 级相对视口
    pub viewport: Viewport,
}
