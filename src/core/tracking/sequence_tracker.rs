use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use super::config::{MatchPolicy, TrackConfig};
use super::error::TrackingError;
use super::text_box::{OcrFrame, TextBox};

/// 一条文字轨迹：同一屏幕区域在时间上的检测框序列（只追加）
///
/// 由首个框创建，去重也不会删除首个框，因此始终非空。
#[derive(Debug, Clone)]
pub struct Tracker {
    boxes: Vec<TextBox>,
}

impl Tracker {
    pub fn new(first: TextBox) -> Self {
        Self { boxes: vec![first] }
    }

    /// 最近追加的框
    pub fn tail(&self) -> &TextBox {
        &self.boxes[self.boxes.len() - 1]
    }

    pub fn boxes(&self) -> &[TextBox] {
        &self.boxes
    }

    pub(crate) fn boxes_mut(&mut self) -> &mut Vec<TextBox> {
        &mut self.boxes
    }

    pub fn push(&mut self, b: TextBox) {
        self.boxes.push(b);
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.boxes.iter().map(|b| b.text.as_str())
    }

    /// 每个框一行文本
    pub fn write_to<W: Write>(&self, mut sink: W) -> Result<(), TrackingError> {
        for text in self.texts() {
            writeln!(sink, "{}", text)?;
        }
        sink.flush()?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TrackingError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }
}

impl fmt::Display for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracker(")?;
        for text in self.texts() {
            writeln!(f, "{}", text)?;
        }
        write!(f, ")")
    }
}

// 排序以框数量为主，数量相同时按文本序列比较，保证与 Eq 一致
impl PartialEq for Tracker {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Tracker {}

impl PartialOrd for Tracker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tracker {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.texts().cmp(other.texts()))
    }
}

/// 跨帧贪心跟踪：新框只和每条轨迹的尾框比较，命中第一条即追加
pub struct SequenceTracker {
    min_overlap: f32,
    policy: MatchPolicy,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::with_config(&TrackConfig::default())
    }

    pub fn with_config(config: &TrackConfig) -> Self {
        Self {
            min_overlap: config.min_overlap,
            policy: config.policy,
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn matches(&self, b: &TextBox, tail: &TextBox) -> bool {
        b.overlap_over_min_area(tail) > self.min_overlap
    }

    /// 处理一帧，返回更新后的轨迹列表
    pub fn step(&self, mut trackers: Vec<Tracker>, frame: &[TextBox]) -> Vec<Tracker> {
        // 本帧已接收过框的轨迹（仅 OnePerFrame 使用）
        let mut used = vec![false; trackers.len()];

        for b in frame {
            let hit = trackers.iter().enumerate().position(|(i, t)| {
                let available = self.policy == MatchPolicy::FirstFit || !used[i];
                available && self.matches(b, t.tail())
            });

            match hit {
                Some(i) => {
                    trackers[i].push(b.clone());
                    used[i] = true;
                }
                None => {
                    debug!("new tracker #{} starts with {:?}", trackers.len(), b.text);
                    trackers.push(Tracker::new(b.clone()));
                    used.push(true);
                }
            }
        }
        trackers
    }

    /// 按顺序折叠所有帧
    pub fn track(&self, frames: &[OcrFrame]) -> Vec<Tracker> {
        frames
            .iter()
            .fold(Vec::new(), |trackers, frame| self.step(trackers, frame))
    }
}

impl Default for SequenceTracker {
    fn default() -> Self {
        Self::new()
    }
}
