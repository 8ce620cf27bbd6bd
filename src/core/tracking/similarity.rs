//! 重复文本判定
//!
//! 依次执行：包含关系 → 四角码字形相似 → 编辑距离，
//! 第一个给出结论的判定生效。

use std::sync::Arc;

use log::debug;

use super::config::DedupConfig;
use super::shape_code::{FourCornerTable, ShapeFeaturizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Duplicate,
    Distinct,
    Inconclusive,
}

/// 一方是另一方的子串（OCR 漏识首尾字）
pub fn containment(a: &str, b: &str) -> Verdict {
    if a.contains(b) || b.contains(a) {
        Verdict::Duplicate
    } else {
        Verdict::Inconclusive
    }
}

/// 等长文本逐位比较四角码，相同位数超过 `ratio` 判为重复
///
/// 不等长、缺码或相似度不足都交给下一步。
pub fn shape_similarity(
    a: &str,
    b: &str,
    featurizer: &dyn ShapeFeaturizer,
    ratio: f32,
) -> Verdict {
    if a.chars().count() != b.chars().count() {
        return Verdict::Inconclusive;
    }

    let (fea_a, fea_b) = match (featurizer.fingerprint(a), featurizer.fingerprint(b)) {
        (Some(fa), Some(fb)) => (fa, fb),
        _ => {
            debug!("shape codes unavailable for {:?} / {:?}", a, b);
            return Verdict::Inconclusive;
        }
    };

    let same = fea_a.iter().zip(&fea_b).filter(|(x, y)| x == y).count();
    let needed = (ratio * fea_a.len() as f32).floor() as usize;
    if same > needed {
        Verdict::Duplicate
    } else {
        Verdict::Inconclusive
    }
}

/// 编辑距离阈值：短文本最多 `short_max`，其余最多 `long_max`
pub fn edit_distance_verdict(a: &str, b: &str, config: &DedupConfig) -> Verdict {
    let shorter = a.chars().count().min(b.chars().count());
    let limit = if shorter < config.short_text_len {
        config.short_max_distance
    } else {
        config.long_max_distance
    };

    if levenshtein(a, b) <= limit {
        Verdict::Duplicate
    } else {
        Verdict::Distinct
    }
}

/// 按字符计算的 Levenshtein 距离
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// 相邻两次识别结果是否为同一文本
pub struct DuplicateJudge {
    featurizer: Arc<dyn ShapeFeaturizer>,
    config: DedupConfig,
}

impl DuplicateJudge {
    pub fn new() -> Self {
        Self::with_featurizer(FourCornerTable::builtin(), DedupConfig::default())
    }

    pub fn with_featurizer(featurizer: Arc<dyn ShapeFeaturizer>, config: DedupConfig) -> Self {
        Self { featurizer, config }
    }

    pub fn verdict(&self, a: &str, b: &str) -> Verdict {
        let checks: [&dyn Fn() -> Verdict; 3] = [
            &|| containment(a, b),
            &|| shape_similarity(a, b, self.featurizer.as_ref(), self.config.shape_match_ratio),
            &|| edit_distance_verdict(a, b, &self.config),
        ];

        checks
            .iter()
            .map(|check| check())
            .find(|v| *v != Verdict::Inconclusive)
            .unwrap_or(Verdict::Distinct)
    }

    pub fn is_duplicate(&self, a: &str, b: &str) -> bool {
        self.verdict(a, b) == Verdict::Duplicate
    }
}

impl Default for DuplicateJudge {
    fn default() -> Self {
        Self::new()
    }
}
