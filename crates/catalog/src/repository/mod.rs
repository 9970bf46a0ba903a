//! 数据库仓储层
//!
//! 基于 sqlx 的 PostgreSQL 数据访问实现

mod category_repo;
mod product_repo;
mod traits;

pub use category_repo::CategoryRepository;
pub use product_repo::ProductRepository;
pub use traits::{CategoryRepositoryTrait, ProductRepositoryTrait};

#[cfg(test)]
pub use traits::{MockCategoryRepositoryTrait, MockProductRepositoryTrait};

/// 构造 ILIKE 包含匹配模式，转义用户输入中的通配符
pub(crate) fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("手机"), "%手机%");
        assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
    }
}
