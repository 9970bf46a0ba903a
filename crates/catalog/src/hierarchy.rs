//! 分类层级维护
//!
//! 分类层级的全部规则都在这里以纯函数实现，服务层只负责取数与落库：
//!
//! - **挂载**：`level = parent.level + 1`，`path = parent.path + "/" + parent.id`
//!   （父分类 path 为空时为 `"/" + parent.id`），根分类 level 为 0、path 为空串
//! - **深度**：父分类 level ≥ 4 时拒绝（总深度不超过 5 级），从不截断
//! - **环路**：候选父分类的 path 中包含节点自身 ID 时拒绝
//! - **子树迁移**：改挂父分类后，后代的 path 前缀与 level 同步平移
//! - **树重建**：按 parent_id 分桶后一次递归展开，结果为森林
//! - **下拉选项**：深度优先遍历，名称前按深度补全角空格

use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::models::{Category, CategoryNode, CategoryOption, SubtreeMove};

/// 允许的最大层级（根为 0，共 5 级）
pub const MAX_LEVEL: i32 = 4;

/// 下拉选项的缩进字符（全角空格）
pub const OPTION_INDENT: &str = "\u{3000}";

/// 节点在层级中的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub parent_id: Option<i64>,
    pub level: i32,
    pub path: String,
}

impl Placement {
    pub fn root() -> Self {
        Self {
            parent_id: None,
            level: 0,
            path: String::new(),
        }
    }
}

/// 节点子孙共享的 path 前缀
///
/// 即该节点的子节点的 path：`parent.path + "/" + parent.id`。
pub fn child_path(parent_path: &str, parent_id: i64) -> String {
    if parent_path.is_empty() {
        format!("/{}", parent_id)
    } else {
        format!("{}/{}", parent_path, parent_id)
    }
}

/// 计算挂载到指定父分类下的位置
///
/// 父分类为 `None` 时挂为根分类。父分类已在第 4 级时拒绝。
pub fn place_under(parent: Option<&Category>) -> Result<Placement> {
    let Some(parent) = parent else {
        return Ok(Placement::root());
    };

    if parent.level >= MAX_LEVEL {
        return Err(CatalogError::DepthExceeded);
    }

    Ok(Placement {
        parent_id: Some(parent.id),
        level: parent.level + 1,
        path: child_path(&parent.path, parent.id),
    })
}

/// 解析 path 中的祖先 ID，按从根到近的顺序
///
/// 非数字片段会被忽略。
pub fn path_ids(path: &str) -> Vec<i64> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| segment.parse().ok())
        .collect()
}

/// path 中是否包含指定 ID（按整段匹配，`/12` 不包含 `1`）
pub fn path_contains(path: &str, id: i64) -> bool {
    path_ids(path).contains(&id)
}

/// 校验节点能否改挂到候选父分类下
///
/// - 不能以自身为父分类
/// - 候选父分类不能是自身的后代（候选父分类的 path 中出现了自身 ID）
pub fn check_reparent(node_id: i64, parent: &Category) -> Result<()> {
    if parent.id == node_id {
        return Err(CatalogError::SelfParent);
    }
    if path_contains(&parent.path, node_id) {
        return Err(CatalogError::CycleDetected {
            id: node_id,
            parent_id: parent.id,
        });
    }
    Ok(())
}

/// 计算改挂后子树需要做的平移
///
/// 位置未发生变化时返回 `None`。`deepest_descendant_level` 为当前子树中
/// 最深后代的 level（没有后代时为 `None`），平移后超过最大层级时拒绝。
pub fn plan_subtree_move(
    node: &Category,
    target: &Placement,
    deepest_descendant_level: Option<i32>,
) -> Result<Option<SubtreeMove>> {
    if node.path == target.path && node.level == target.level {
        return Ok(None);
    }

    let level_delta = target.level - node.level;
    if deepest_descendant_level.is_some_and(|deepest| deepest + level_delta > MAX_LEVEL) {
        return Err(CatalogError::DepthExceeded);
    }

    Ok(Some(SubtreeMove {
        old_prefix: child_path(&node.path, node.id),
        new_prefix: child_path(&target.path, node.id),
        level_delta,
    }))
}

impl SubtreeMove {
    /// 该 path 是否位于被移动的子树中
    pub fn covers(&self, path: &str) -> bool {
        path == self.old_prefix
            || path
                .strip_prefix(&self.old_prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// 计算后代节点平移后的 path 与 level
    ///
    /// 不在子树中的节点返回 `None`。
    pub fn rebase(&self, path: &str, level: i32) -> Option<(String, i32)> {
        if !self.covers(path) {
            return None;
        }
        let rest = &path[self.old_prefix.len()..];
        Some((format!("{}{}", self.new_prefix, rest), level + self.level_delta))
    }
}

/// 由扁平列表构建分类森林
///
/// 先按 parent_id 分桶（桶内保持输入顺序），再从根桶开始一次递归展开。
/// 父分类不在列表中的节点（如被状态过滤掉）不会出现在结果里。
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let mut buckets: HashMap<Option<i64>, Vec<Category>> = HashMap::new();
    for category in categories {
        buckets.entry(category.parent_id).or_default().push(category);
    }
    attach_children(None, &mut buckets)
}

fn attach_children(
    parent_id: Option<i64>,
    buckets: &mut HashMap<Option<i64>, Vec<Category>>,
) -> Vec<CategoryNode> {
    // 取出后即从桶中移除，脏数据中的环也不会导致无限递归
    let Some(children) = buckets.remove(&parent_id) else {
        return Vec::new();
    };

    children
        .into_iter()
        .map(|category| {
            let children = attach_children(Some(category.id), buckets);
            CategoryNode { category, children }
        })
        .collect()
}

/// 深度优先展开为下拉选项
///
/// `max_level` 指定时，超过该层级的节点及其子树不输出。
pub fn flatten_options(tree: &[CategoryNode], max_level: Option<i32>) -> Vec<CategoryOption> {
    let mut options = Vec::new();
    collect_options(tree, 0, max_level, &mut options);
    options
}

fn collect_options(
    nodes: &[CategoryNode],
    depth: usize,
    max_level: Option<i32>,
    out: &mut Vec<CategoryOption>,
) {
    for node in nodes {
        let category = &node.category;
        if max_level.is_some_and(|max| category.level > max) {
            continue;
        }
        out.push(CategoryOption {
            value: category.id,
            label: format!("{}{}", OPTION_INDENT.repeat(depth), category.name),
            level: category.level,
        });
        collect_options(&node.children, depth + 1, max_level, out);
    }
}

/// 计算从根到自身的名称链
///
/// `ancestors` 为 path 中各祖先（顺序不限），按 level 排序后拼接自身名称。
pub fn path_names(node: &Category, ancestors: &[Category]) -> Vec<String> {
    let mut sorted: Vec<&Category> = ancestors.iter().collect();
    sorted.sort_by_key(|c| c.level);

    sorted
        .into_iter()
        .map(|c| c.name.clone())
        .chain(std::iter::once(node.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryStatus;
    use chrono::Utc;

    fn category(id: i64, name: &str, parent: Option<&Category>) -> Category {
        let placement = place_under(parent).unwrap();
        Category {
            id,
            name: name.to_string(),
            parent_id: placement.parent_id,
            sort: 0,
            status: CategoryStatus::Enabled,
            description: None,
            icon: None,
            level: placement.level,
            path: placement.path,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// 构造一条 depth 层的链：1 -> 2 -> ... -> depth
    fn chain(depth: i64) -> Vec<Category> {
        let mut nodes: Vec<Category> = Vec::new();
        for id in 1..=depth {
            let node = category(id, &format!("L{}", id - 1), nodes.last());
            nodes.push(node);
        }
        nodes
    }

    #[test]
    fn test_root_placement() {
        let placement = place_under(None).unwrap();
        assert_eq!(placement, Placement::root());
    }

    #[test]
    fn test_child_placement() {
        let root = category(1, "Electronics", None);
        let child = place_under(Some(&root)).unwrap();
        assert_eq!(child.level, 1);
        assert_eq!(child.path, "/1");
        assert_eq!(child.parent_id, Some(1));

        let phones = category(7, "Phones", Some(&root));
        let grandchild = place_under(Some(&phones)).unwrap();
        assert_eq!(grandchild.level, 2);
        assert_eq!(grandchild.path, "/1/7");
    }

    #[test]
    fn test_depth_limit_rejects_sixth_level() {
        let nodes = chain(5);
        assert_eq!(nodes[4].level, MAX_LEVEL);
        assert_eq!(nodes[4].path, "/1/2/3/4");

        let err = place_under(Some(&nodes[4])).unwrap_err();
        assert!(matches!(err, CatalogError::DepthExceeded));

        // 第 4 级之下仍可挂载
        assert!(place_under(Some(&nodes[3])).is_ok());
    }

    #[test]
    fn test_path_contains_matches_whole_segments() {
        assert!(path_contains("/1/12/5", 12));
        assert!(path_contains("/1/12/5", 5));
        assert!(!path_contains("/1/12/5", 2));
        assert!(!path_contains("", 1));
        assert_eq!(path_ids("/3/10/22"), vec![3, 10, 22]);
    }

    #[test]
    fn test_reparent_to_self_rejected() {
        let root = category(1, "Electronics", None);
        assert!(matches!(
            check_reparent(1, &root),
            Err(CatalogError::SelfParent)
        ));
    }

    #[test]
    fn test_reparent_under_descendant_rejected() {
        let root = category(1, "Electronics", None);
        let phones = category(2, "Phones", Some(&root));
        let smart = category(3, "Smart", Some(&phones));

        assert!(matches!(
            check_reparent(1, &phones),
            Err(CatalogError::CycleDetected { id: 1, parent_id: 2 })
        ));
        assert!(matches!(
            check_reparent(1, &smart),
            Err(CatalogError::CycleDetected { .. })
        ));
        // 兄弟/上级节点之间的移动是合法的
        assert!(check_reparent(3, &root).is_ok());
    }

    #[test]
    fn test_plan_subtree_move() {
        let nodes = chain(3); // 1(L0) -> 2(L1) -> 3(L2)
        let other = category(9, "Other", None);
        let target = place_under(Some(&other)).unwrap();

        // 把 2 移到 9 下：level 不变，前缀 /1/2 -> /9/2
        let plan = plan_subtree_move(&nodes[1], &target, Some(2))
            .unwrap()
            .unwrap();
        assert_eq!(plan.old_prefix, "/1/2");
        assert_eq!(plan.new_prefix, "/9/2");
        assert_eq!(plan.level_delta, 0);

        assert_eq!(plan.rebase("/1/2", 2), Some(("/9/2".to_string(), 2)));
        assert_eq!(plan.rebase("/1/2/30", 3), Some(("/9/2/30".to_string(), 3)));
        // 前缀相同但不在子树中
        assert_eq!(plan.rebase("/1/21", 2), None);
    }

    #[test]
    fn test_plan_subtree_move_unchanged() {
        let nodes = chain(2);
        let same = place_under(Some(&nodes[0])).unwrap();
        assert!(plan_subtree_move(&nodes[1], &same, None).unwrap().is_none());
    }

    #[test]
    fn test_plan_subtree_move_depth_exceeded() {
        // Sub 在第 1 级且有 level=3 的后代，挂到第 3 级节点下后代会落到第 6 级
        let nodes = chain(4);
        let subtree_root = category(20, "Sub", Some(&nodes[0]));
        let target = place_under(Some(&nodes[3])).unwrap();
        assert_eq!(target.level, 4);

        let err = plan_subtree_move(&subtree_root, &target, Some(3)).unwrap_err();
        assert!(matches!(err, CatalogError::DepthExceeded));

        // 没有后代时可以移动
        assert!(plan_subtree_move(&subtree_root, &target, None).is_ok());
    }

    #[test]
    fn test_build_tree_single_pass() {
        let a = category(1, "A", None);
        let b = category(2, "B", Some(&a));
        let c = category(3, "C", Some(&b));
        let d = category(4, "D", None);

        // 输入顺序打乱，子节点先于父节点出现
        let tree = build_tree(vec![c.clone(), b.clone(), a.clone(), d.clone()]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.id, 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].category.id, 2);
        assert_eq!(tree[0].children[0].children[0].category.id, 3);
        assert_eq!(tree[1].category.id, 4);
        assert!(tree[1].children.is_empty());
        assert_eq!(tree[0].size(), 3);
    }

    #[test]
    fn test_build_tree_drops_orphans() {
        let a = category(1, "A", None);
        let b = category(2, "B", Some(&a));
        let c = category(3, "C", Some(&b));

        // B 被过滤掉，C 成为孤儿
        let tree = build_tree(vec![a, c]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_build_tree_keeps_sibling_order() {
        let root = category(1, "Root", None);
        let x = category(5, "X", Some(&root));
        let y = category(3, "Y", Some(&root));
        let tree = build_tree(vec![root, x, y]);
        let names: Vec<&str> = tree[0]
            .children
            .iter()
            .map(|n| n.category.name.as_str())
            .collect();
        assert_eq!(names, vec!["X", "Y"]);
    }

    #[test]
    fn test_flatten_options_indents_by_depth() {
        let a = category(1, "A", None);
        let b = category(2, "B", Some(&a));
        let c = category(3, "C", Some(&b));
        let tree = build_tree(vec![a, b, c]);

        let options = flatten_options(&tree, None);
        assert_eq!(
            options,
            vec![
                CategoryOption {
                    value: 1,
                    label: "A".to_string(),
                    level: 0
                },
                CategoryOption {
                    value: 2,
                    label: "\u{3000}B".to_string(),
                    level: 1
                },
                CategoryOption {
                    value: 3,
                    label: "\u{3000}\u{3000}C".to_string(),
                    level: 2
                },
            ]
        );
    }

    #[test]
    fn test_flatten_options_max_level() {
        let tree = build_tree(chain(4));
        let options = flatten_options(&tree, Some(1));
        let values: Vec<i64> = options.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_path_names_ordered_by_level() {
        let nodes = chain(3);
        let ancestors = vec![nodes[1].clone(), nodes[0].clone()];
        assert_eq!(path_names(&nodes[2], &ancestors), vec!["L0", "L1", "L2"]);
        assert_eq!(path_names(&nodes[0], &[]), vec!["L0"]);
    }
}
