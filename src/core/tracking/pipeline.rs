use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use super::collapser::DuplicateCollapser;
use super::config::TrackingConfig;
use super::error::TrackingError;
use super::line_merger::LineMerger;
use super::sequence_tracker::{SequenceTracker, Tracker};
use super::shape_code::{FourCornerTable, ShapeFeaturizer};
use super::similarity::DuplicateJudge;
use super::size_filter::filter_by_height;
use super::text_box::OcrFrame;

/// 单次运行统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub frames: usize,
    pub input_boxes: usize,
    /// 尺寸过滤后剩余
    pub filtered_boxes: usize,
    /// 同行合并后剩余
    pub merged_boxes: usize,
    pub trackers: usize,
    /// 去重删除的框数
    pub collapsed_boxes: usize,
}

#[derive(Debug, Clone)]
pub struct TrackingOutput {
    pub trackers: Vec<Tracker>,
    pub stats: PipelineStats,
}

/// 尺寸过滤 → 同行合并 → 跨帧跟踪 → 重复去重
pub struct TextTrackingPipeline {
    min_box_height: i32,
    merger: LineMerger,
    tracker: SequenceTracker,
    collapser: DuplicateCollapser,
}

impl TextTrackingPipeline {
    pub fn new() -> Self {
        Self {
            min_box_height: TrackingConfig::default().min_box_height,
            merger: LineMerger::new(),
            tracker: SequenceTracker::new(),
            collapser: DuplicateCollapser::new(),
        }
    }

    /// 按配置构建，配置了码表路径时叠加到内置四角码表上
    pub fn with_config(config: &TrackingConfig) -> Result<Self, TrackingError> {
        let featurizer: Arc<dyn ShapeFeaturizer> = match &config.shape_table {
            Some(path) => Arc::new(FourCornerTable::builtin_with_file(path)?),
            None => FourCornerTable::builtin(),
        };
        Self::with_featurizer(config, featurizer)
    }

    pub fn with_featurizer(
        config: &TrackingConfig,
        featurizer: Arc<dyn ShapeFeaturizer>,
    ) -> Result<Self, TrackingError> {
        let judge = DuplicateJudge::with_featurizer(featurizer, config.dedup.clone());
        Ok(Self {
            min_box_height: config.min_box_height,
            merger: LineMerger::from_config(config)?,
            tracker: SequenceTracker::with_config(&config.track),
            collapser: DuplicateCollapser::with_judge(judge, config.parallel),
        })
    }

    pub fn run(&self, frames: Vec<OcrFrame>) -> TrackingOutput {
        let mut stats = PipelineStats {
            frames: frames.len(),
            input_boxes: count_boxes(&frames),
            ..Default::default()
        };
        info!(
            "🎬 Tracking text across {} frames ({} boxes)",
            stats.frames, stats.input_boxes
        );

        let filtered = filter_by_height(frames, self.min_box_height);
        stats.filtered_boxes = count_boxes(&filtered);

        let merged = self.merger.merge_frames(&filtered);
        stats.merged_boxes = count_boxes(&merged);

        let mut trackers = self.tracker.track(&merged);
        stats.trackers = trackers.len();

        stats.collapsed_boxes = self.collapser.collapse_trackers(&mut trackers);

        info!(
            "✅ {} trackers, {} boxes kept ({} duplicates collapsed)",
            stats.trackers,
            count_boxes_in(&trackers),
            stats.collapsed_boxes
        );

        TrackingOutput { trackers, stats }
    }
}

impl Default for TextTrackingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn count_boxes(frames: &[OcrFrame]) -> usize {
    frames.iter().map(Vec::len).sum()
}

fn count_boxes_in(trackers: &[Tracker]) -> usize {
    trackers.iter().map(Tracker::len).sum()
}
