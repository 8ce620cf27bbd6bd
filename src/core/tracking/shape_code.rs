//! 字形特征：用四角码近似汉字的笔形结构
//!
//! 码表为 UTF-8 文本，每行 `字<TAB>四角码<TAB>附角码`，`#` 开头为注释。
//! 内置常用字码表，可用配置的码表文件补充或覆盖。
//! 码表中没有的字符无法提取特征，此时字形比较不给出结论。

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use once_cell::sync::Lazy;

use super::error::TrackingError;

const BUILTIN_TABLE: &str = include_str!("../../../data/four_corner.tsv");

static BUILTIN: Lazy<Arc<FourCornerTable>> = Lazy::new(|| {
    let table = FourCornerTable::parse(BUILTIN_TABLE).unwrap_or_else(|e| {
        warn!("⚠️ Built-in shape table rejected: {}", e);
        FourCornerTable::empty()
    });
    Arc::new(table)
});

/// 单个字符的两个形状码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeCode {
    pub corners: u16,
    pub extra: u16,
}

pub trait ShapeFeaturizer: Send + Sync {
    fn char_code(&self, ch: char) -> Option<ShapeCode>;

    /// 整句特征：先排列所有字符的四角码，再排列所有附角码
    ///
    /// 任一字符缺码时返回 `None`。
    fn fingerprint(&self, text: &str) -> Option<Vec<u16>> {
        let codes: Vec<ShapeCode> = text
            .chars()
            .map(|ch| self.char_code(ch))
            .collect::<Option<_>>()?;

        let mut fea: Vec<u16> = codes.iter().map(|c| c.corners).collect();
        fea.extend(codes.iter().map(|c| c.extra));
        Some(fea)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FourCornerTable {
    codes: HashMap<char, ShapeCode>,
}

impl FourCornerTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 随库内置的常用字码表
    pub fn builtin() -> Arc<FourCornerTable> {
        Arc::clone(&BUILTIN)
    }

    /// 内置码表叠加外部码表文件，同一字符以文件为准
    pub fn builtin_with_file(path: impl AsRef<Path>) -> Result<Self, TrackingError> {
        let mut table = Self::builtin().as_ref().clone();
        table.extend(Self::from_file(path)?);
        Ok(table)
    }

    pub fn extend(&mut self, other: FourCornerTable) {
        self.codes.extend(other.codes);
    }

    pub fn parse(content: &str) -> Result<Self, TrackingError> {
        let mut codes = HashMap::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = idx + 1;
            let bad = |reason: &str| TrackingError::ShapeTable {
                line: line_no,
                reason: reason.to_string(),
            };

            let mut fields = line.split('\t').map(str::trim);
            let ch_field = fields.next().ok_or_else(|| bad("missing character"))?;
            let mut chars = ch_field.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => return Err(bad("first field must be a single character")),
            };

            let corners = parse_code(fields.next(), "corner code").map_err(|r| bad(&r))?;
            let extra = parse_code(fields.next(), "extra code").map_err(|r| bad(&r))?;
            codes.insert(ch, ShapeCode { corners, extra });
        }

        Ok(Self { codes })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrackingError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let table = Self::parse(&content)?;
        info!("🔧 Loaded {} shape codes from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl ShapeFeaturizer for FourCornerTable {
    fn char_code(&self, ch: char) -> Option<ShapeCode> {
        self.codes.get(&ch).copied()
    }
}

fn parse_code(field: Option<&str>, name: &str) -> Result<u16, String> {
    let field = field.ok_or_else(|| format!("missing {}", name))?;
    field
        .parse::<u16>()
        .map_err(|e| format!("invalid {} {:?}: {}", name, field, e))
}
