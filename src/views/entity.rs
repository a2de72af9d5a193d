//! 实体引用解析与计数表分派

use std::fmt;

/// 带有 view_count 计数器的实体表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewTarget {
    Grant,
    Bounty,
    Rfp,
    Submission,
    GrantApplication,
}

impl ViewTarget {
    /// 按 entity 的 type 段分派（区分大小写），未知类型返回 None
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "grant" => Some(ViewTarget::Grant),
            "bounty" => Some(ViewTarget::Bounty),
            "rfp" => Some(ViewTarget::Rfp),
            "submission" => Some(ViewTarget::Submission),
            "application" | "grant_application" => Some(ViewTarget::GrantApplication),
            _ => None,
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            ViewTarget::Grant => "grants",
            ViewTarget::Bounty => "bounties",
            ViewTarget::Rfp => "rfps",
            ViewTarget::Submission => "submissions",
            ViewTarget::GrantApplication => "grant_applications",
        }
    }
}

impl fmt::Display for ViewTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// `"{type}:{id}"` 形式的实体引用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef<'a> {
    pub kind: &'a str,
    pub id: &'a str,
}

impl<'a> EntityRef<'a> {
    /// 在第一个 `:` 处拆分，两段都必须非空
    pub fn parse(raw: &'a str) -> Option<Self> {
        let (kind, id) = raw.split_once(':')?;
        if kind.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self { kind, id })
    }

    pub fn target(&self) -> Option<ViewTarget> {
        ViewTarget::from_kind(self.kind)
    }
}
