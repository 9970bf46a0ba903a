//! 价格与库存规则
//!
//! 金额以分为单位。

use crate::error::{CatalogError, Result};
use crate::models::{PriceAdjustType, ProductDraft};

/// 校验商品的价格与数量字段
///
/// - 售价必须大于 0
/// - 原价、成本、库存、销量、重量不能为负
/// - 原价不能低于售价
///
/// 成本高于售价只记录警告，不拒绝。
pub fn validate_draft(draft: &ProductDraft) -> Result<()> {
    if draft.price <= 0 {
        return Err(CatalogError::Validation("销售价格必须大于0".to_string()));
    }
    if draft.original_price.is_some_and(|p| p < 0) {
        return Err(CatalogError::Validation("原价不能为负数".to_string()));
    }
    if draft.cost.is_some_and(|c| c < 0) {
        return Err(CatalogError::Validation("成本价不能为负数".to_string()));
    }
    if draft.stock < 0 {
        return Err(CatalogError::Validation("库存不能为负数".to_string()));
    }
    if draft.sales < 0 {
        return Err(CatalogError::Validation("销量不能为负数".to_string()));
    }
    if draft.weight.is_some_and(|w| w < 0) {
        return Err(CatalogError::Validation("重量不能为负数".to_string()));
    }
    if draft
        .dimensions
        .is_some_and(|d| d.length < 0.0 || d.width < 0.0 || d.height < 0.0)
    {
        return Err(CatalogError::Validation("尺寸不能为负数".to_string()));
    }
    check_original_price(draft.price, draft.original_price)?;

    if draft.cost.is_some_and(|cost| cost > draft.price) {
        tracing::warn!(
            price = draft.price,
            cost = ?draft.cost,
            "Product cost is higher than price"
        );
    }
    Ok(())
}

/// 原价不能低于售价
pub fn check_original_price(price: i64, original_price: Option<i64>) -> Result<()> {
    match original_price {
        Some(original) if original < price => {
            Err(CatalogError::Validation("原价不能低于销售价格".to_string()))
        }
        _ => Ok(()),
    }
}

/// 利润率（百分比，保留两位小数），售价为 0 时无意义
pub fn profit_margin(price: i64, cost: i64) -> Option<f64> {
    if price <= 0 {
        return None;
    }
    let margin = (price - cost) as f64 / price as f64 * 100.0;
    Some((margin * 100.0).round() / 100.0)
}

/// 批量调价
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceAdjustment {
    pub adjust_type: PriceAdjustType,
    /// fixed：目标价格（分）；percentage：上调百分比
    pub value: f64,
}

impl PriceAdjustment {
    pub fn new(adjust_type: PriceAdjustType, value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(CatalogError::Validation("调整值不能为负数".to_string()));
        }
        Ok(Self { adjust_type, value })
    }

    /// 计算调整后的价格，新价格不大于 0 时返回 `None`（跳过该商品）
    pub fn apply(&self, price: i64) -> Option<i64> {
        let new_price = match self.adjust_type {
            PriceAdjustType::Fixed => self.value.round() as i64,
            PriceAdjustType::Percentage => (price as f64 * (1.0 + self.value / 100.0)).round() as i64,
        };
        (new_price > 0).then_some(new_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dimensions;

    fn draft(price: i64) -> ProductDraft {
        ProductDraft {
            name: "Phone".to_string(),
            category_id: 1,
            price,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_draft_accepts_valid() {
        let mut d = draft(1999);
        d.original_price = Some(2999);
        d.cost = Some(1200);
        d.stock = 10;
        assert!(validate_draft(&d).is_ok());
    }

    #[test]
    fn test_validate_draft_rejects_non_positive_price() {
        assert!(matches!(validate_draft(&draft(0)), Err(CatalogError::Validation(_))));
        assert!(matches!(validate_draft(&draft(-1)), Err(CatalogError::Validation(_))));
    }

    #[test]
    fn test_validate_draft_rejects_negative_numbers() {
        let mut d = draft(100);
        d.stock = -1;
        assert!(validate_draft(&d).is_err());

        let mut d = draft(100);
        d.sales = -5;
        assert!(validate_draft(&d).is_err());

        let mut d = draft(100);
        d.cost = Some(-1);
        assert!(validate_draft(&d).is_err());

        let mut d = draft(100);
        d.dimensions = Some(Dimensions {
            length: 1.0,
            width: -2.0,
            height: 1.0,
        });
        assert!(validate_draft(&d).is_err());
    }

    #[test]
    fn test_original_price_must_not_be_lower() {
        let mut d = draft(1000);
        d.original_price = Some(999);
        let err = validate_draft(&d).unwrap_err();
        assert_eq!(err.to_string(), "原价不能低于销售价格");

        // 相等是允许的
        d.original_price = Some(1000);
        assert!(validate_draft(&d).is_ok());
    }

    #[test]
    fn test_cost_above_price_is_allowed() {
        let mut d = draft(1000);
        d.cost = Some(1500);
        assert!(validate_draft(&d).is_ok());
    }

    #[test]
    fn test_profit_margin() {
        assert_eq!(profit_margin(1000, 600), Some(40.0));
        assert_eq!(profit_margin(300, 100), Some(66.67));
        assert_eq!(profit_margin(0, 100), None);
    }

    #[test]
    fn test_price_adjustment() {
        let fixed = PriceAdjustment::new(PriceAdjustType::Fixed, 5000.0).unwrap();
        assert_eq!(fixed.apply(1999), Some(5000));

        let pct = PriceAdjustment::new(PriceAdjustType::Percentage, 10.0).unwrap();
        assert_eq!(pct.apply(1000), Some(1100));
        assert_eq!(pct.apply(999), Some(1099));

        // 新价格为 0 时跳过
        let zero = PriceAdjustment::new(PriceAdjustType::Fixed, 0.0).unwrap();
        assert_eq!(zero.apply(1000), None);

        assert!(PriceAdjustment::new(PriceAdjustType::Percentage, -1.0).is_err());
    }
}
