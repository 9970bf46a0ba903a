//! 商品分类实体定义
//!
//! 分类通过 parent_id 自引用构成最多 5 级的层级结构，
//! level 与 path 为派生字段，由层级维护逻辑在写入时计算。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::CategoryStatus;

/// 商品分类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    /// 分类名称（同级唯一）
    pub name: String,
    /// 父分类 ID，为空表示根分类
    #[sqlx(default)]
    pub parent_id: Option<i64>,
    /// 排序权重，数值越小越靠前
    pub sort: i32,
    pub status: CategoryStatus,
    #[sqlx(default)]
    pub description: Option<String>,
    #[sqlx(default)]
    pub icon: Option<String>,
    /// 层级，根分类为 0
    pub level: i32,
    /// 祖先 ID 链，如 `/1/7`，根分类为空串
    pub path: String,
    #[sqlx(default)]
    pub created_by: Option<String>,
    #[sqlx(default)]
    pub updated_by: Option<String>,
    #[serde(rename = "createTime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updateTime")]
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_enabled(&self) -> bool {
        self.status == CategoryStatus::Enabled
    }
}

/// 列表项：附带父分类名称
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub category: Category,
    #[sqlx(default)]
    pub parent_name: Option<String>,
}

/// 分类详情：附带父分类名称与完整路径名称
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub parent_name: Option<String>,
    /// 从根到自身的名称链
    pub path_names: Vec<String>,
}

/// 分类树节点
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// 子树中的节点总数（含自身）
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::size).sum::<usize>()
    }
}

/// 下拉选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub value: i64,
    /// 按深度缩进的名称
    pub label: String,
    pub level: i32,
}

/// 新建分类时写入的数据（level/path 已计算）
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub parent_id: Option<i64>,
    pub sort: i32,
    pub status: CategoryStatus,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub level: i32,
    pub path: String,
    pub created_by: String,
}

/// 更新分类时写入的数据（level/path 已计算）
#[derive(Debug, Clone)]
pub struct CategoryChanges {
    pub name: String,
    pub parent_id: Option<i64>,
    pub sort: i32,
    pub status: CategoryStatus,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub level: i32,
    pub path: String,
    pub updated_by: String,
}

/// 子树迁移描述
///
/// 节点改挂父分类时，所有后代的 path 前缀由 `old_prefix` 替换为 `new_prefix`，
/// level 统一加上 `level_delta`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeMove {
    pub old_prefix: String,
    pub new_prefix: String,
    pub level_delta: i32,
}
