use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::TrackingError;

/// 同行合并参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// 纵向重叠 / 较矮框高度，需严格大于该值
    pub min_y_overlap: f32,
    /// 横向间距（像素），需严格小于该值
    pub max_x_gap: i32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            min_y_overlap: 0.5,
            max_x_gap: 30,
        }
    }
}

/// 同一帧内多个框命中同一轨迹时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPolicy {
    /// 兼容旧输出：只比较轨迹尾框，同帧可追加多个框
    #[default]
    FirstFit,
    /// 每帧每条轨迹最多接收一个框
    OnePerFrame,
}

/// 跨帧跟踪参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// 交集 / 较小框面积，需严格大于该值
    pub min_overlap: f32,
    pub policy: MatchPolicy,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            min_overlap: 0.5,
            policy: MatchPolicy::FirstFit,
        }
    }
}

/// 重复文本判定参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub shape_match_ratio: f32,
    /// 短文本长度上限（不含）
    pub short_text_len: usize,
    pub short_max_distance: usize,
    pub long_max_distance: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            shape_match_ratio: 0.8,
            short_text_len: 10,
            short_max_distance: 1,
            long_max_distance: 2,
        }
    }
}

/// 合并后默认删除的标点
pub const DEFAULT_STRIP_CHARS: &str = "()，。";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// 尺寸预过滤：仅保留 `h > min_box_height` 的框
    pub min_box_height: i32,
    pub merge: MergeConfig,
    pub track: TrackConfig,
    pub dedup: DedupConfig,
    /// 合并后从文本中删除的字符
    pub strip_chars: String,
    /// 额外的四角码表文件，叠加在内置码表上，同字以文件为准
    pub shape_table: Option<PathBuf>,
    /// 逐帧合并、逐轨迹去重是否使用 rayon 并行
    pub parallel: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_box_height: 30,
            merge: MergeConfig::default(),
            track: TrackConfig::default(),
            dedup: DedupConfig::default(),
            strip_chars: DEFAULT_STRIP_CHARS.to_string(),
            shape_table: None,
            parallel: true,
        }
    }
}

impl TrackingConfig {
    /// 每帧每条轨迹最多匹配一个框
    pub fn strict() -> Self {
        Self {
            track: TrackConfig {
                policy: MatchPolicy::OnePerFrame,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn from_json5_str(content: &str) -> Result<Self, TrackingError> {
        json5::from_str(content).map_err(|e| TrackingError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrackingError> {
        let content = fs::read_to_string(path)?;
        Self::from_json5_str(&content)
    }
}
