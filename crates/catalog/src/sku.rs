//! SKU 编码生成
//!
//! 未指定 SKU 的商品自动生成编码：`P` + 日期（YYYYMMDD）+ 4 位随机数（1000-9999）。

use chrono::{DateTime, Utc};
use rand::Rng;

/// 自动生成 SKU 的前缀
pub const SKU_PREFIX: &str = "P";

/// 撞号后重新生成的最大次数
pub const MAX_SKU_ATTEMPTS: usize = 10;

/// 按指定日期和随机后缀拼出 SKU
pub fn format_sku(at: DateTime<Utc>, suffix: u16) -> String {
    format!("{}{}{}", SKU_PREFIX, at.format("%Y%m%d"), suffix)
}

/// 生成一个候选 SKU
pub fn random_sku<R: Rng + ?Sized>(at: DateTime<Utc>, rng: &mut R) -> String {
    format_sku(at, rng.random_range(1000..=9999))
}

/// 是否为自动生成格式的 SKU（`P` + 12 位数字）
pub fn is_generated(sku: &str) -> bool {
    sku.strip_prefix(SKU_PREFIX)
        .is_some_and(|rest| rest.len() == 12 && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// 规范化用户输入的 SKU：去除首尾空白，空串视为未提供
pub fn normalize(sku: Option<&str>) -> Option<String> {
    sku.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
