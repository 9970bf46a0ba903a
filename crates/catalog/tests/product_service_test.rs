//! 商品服务流程测试
//!
//! 基于内存仓储驱动 ProductService，覆盖价格规则、SKU、库存、推荐标记和批量操作。

mod common;

use common::Catalog;
use mall_catalog::dto::{CategoryInput, ProductInput, ProductQuery};
use mall_catalog::sku;
use mall_catalog::{CatalogError, MAX_STOCK, PriceAdjustType, ProductStatus, RecommendPatch, StockOperation};

async fn setup() -> (Catalog, i64) {
    let catalog = Catalog::new();
    let category = catalog
        .categories
        .create(
            CategoryInput {
                name: "Phones".to_string(),
                ..Default::default()
            },
            "admin",
        )
        .await
        .unwrap();
    (catalog, category.id)
}

fn phone(category_id: i64, name: &str, price: i64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        category_id,
        price,
        stock: 10,
        ..Default::default()
    }
}

// ==================== 创建与校验 ====================

#[tokio::test]
async fn test_create_generates_sku_and_defaults() {
    let (catalog, category_id) = setup().await;

    let product = catalog
        .products
        .create(phone(category_id, "iPhone", 599_900), "admin")
        .await
        .unwrap();

    let generated = product.sku.as_deref().unwrap();
    assert!(sku::is_generated(generated));
    assert_eq!(product.status, ProductStatus::OnShelf);
    assert!(product.is_new);
    assert!(!product.is_hot);
    assert_eq!(product.specifications, serde_json::json!({}));
}

#[tokio::test]
async fn test_price_rules() {
    let (catalog, category_id) = setup().await;

    let cases = [
        (
            ProductInput {
                original_price: Some(100),
                ..phone(category_id, "A", 200)
            },
            "原价不能低于销售价格",
        ),
        (phone(category_id, "B", 0), "销售价格必须大于0"),
        (
            ProductInput {
                stock: -1,
                ..phone(category_id, "C", 100)
            },
            "库存不能为负数",
        ),
    ];

    for (input, expected) in cases {
        let err = catalog.products.create(input, "admin").await.unwrap_err();
        assert!(
            matches!(&err, CatalogError::Validation(msg) if msg == expected),
            "unexpected error: {err}"
        );
    }

    // 成本高于售价只告警
    catalog
        .products
        .create(
            ProductInput {
                cost: Some(300),
                ..phone(category_id, "D", 200)
            },
            "admin",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sku_must_be_unique() {
    let (catalog, category_id) = setup().await;
    let first = catalog
        .products
        .create(
            ProductInput {
                sku: Some("IP15".to_string()),
                ..phone(category_id, "iPhone 15", 599_900)
            },
            "admin",
        )
        .await
        .unwrap();

    let err = catalog
        .products
        .create(
            ProductInput {
                sku: Some(" IP15 ".to_string()),
                ..phone(category_id, "iPhone 15 Pro", 799_900)
            },
            "admin",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateSku(_)));

    // 更新时保留自身 SKU 不算冲突
    let updated = catalog
        .products
        .update(
            first.id,
            ProductInput {
                sku: Some("IP15".to_string()),
                ..phone(category_id, "iPhone 15 128G", 579_900)
            },
            "admin",
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "iPhone 15 128G");
    assert_eq!(updated.created_by.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_disabled_category_rejected() {
    let (catalog, category_id) = setup().await;
    catalog
        .categories
        .update_status(category_id, 0, "admin")
        .await
        .unwrap();

    let err = catalog
        .products
        .create(phone(category_id, "iPhone", 100), "admin")
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::CategoryUnavailable(_)));
}

// ==================== 单个更新 ====================

#[tokio::test]
async fn test_stock_operations() {
    let (catalog, category_id) = setup().await;
    let product = catalog
        .products
        .create(phone(category_id, "iPhone", 100), "admin")
        .await
        .unwrap();

    let p = catalog
        .products
        .update_stock(product.id, StockOperation::Add, 5)
        .await
        .unwrap();
    assert_eq!(p.stock, 15);

    let p = catalog
        .products
        .update_stock(product.id, StockOperation::Reduce, 100)
        .await
        .unwrap();
    assert_eq!(p.stock, 0);

    let p = catalog
        .products
        .update_stock(product.id, StockOperation::Set, 7)
        .await
        .unwrap();
    assert_eq!(p.stock, 7);

    assert!(matches!(
        catalog
            .products
            .update_stock(999, StockOperation::Set, 1)
            .await,
        Err(CatalogError::ProductNotFound(999))
    ));
}

#[tokio::test]
async fn test_stock_add_beyond_limit_rejected() {
    let (catalog, category_id) = setup().await;
    let product = catalog
        .products
        .create(phone(category_id, "iPhone", 100), "admin")
        .await
        .unwrap();

    let err = catalog
        .products
        .update_stock(product.id, StockOperation::Add, i32::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));

    let err = catalog
        .products
        .update_stock(product.id, StockOperation::Add, MAX_STOCK)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));

    let p = catalog
        .products
        .update_stock(product.id, StockOperation::Add, MAX_STOCK - 10)
        .await
        .unwrap();
    assert_eq!(p.stock, MAX_STOCK);
}

#[tokio::test]
async fn test_detail_includes_category_path() {
    let (catalog, category_id) = setup().await;
    let android = catalog
        .categories
        .create(
            CategoryInput {
                name: "Android".to_string(),
                parent_id: Some(category_id),
                ..Default::default()
            },
            "admin",
        )
        .await
        .unwrap();
    let product = catalog
        .products
        .create(
            ProductInput {
                cost: Some(50),
                images: vec!["a.png".to_string(), "b.png".to_string()],
                ..phone(android.id, "Pixel", 200)
            },
            "admin",
        )
        .await
        .unwrap();

    let view = catalog.products.detail(product.id).await.unwrap();
    assert_eq!(view.category_name.as_deref(), Some("Android"));
    assert_eq!(
        view.category_path,
        Some(vec!["Phones".to_string(), "Android".to_string()])
    );
    assert_eq!(view.profit_margin, 75.0);
    assert_eq!(view.primary_image.as_deref(), Some("a.png"));
}

// ==================== 批量操作 ====================

#[tokio::test]
async fn test_batch_price_skips_invalid_results() {
    let (catalog, category_id) = setup().await;
    let plain = catalog
        .products
        .create(phone(category_id, "Plain", 1_000), "admin")
        .await
        .unwrap();
    let capped = catalog
        .products
        .create(
            ProductInput {
                original_price: Some(1_050),
                ..phone(category_id, "Capped", 1_000)
            },
            "admin",
        )
        .await
        .unwrap();

    // 上调 10%：Capped 会超过原价而被跳过
    let result = catalog
        .products
        .batch_price(&[plain.id, capped.id, plain.id], PriceAdjustType::Percentage, 10.0)
        .await
        .unwrap();
    assert_eq!(result.total_count, 2);
    assert_eq!(result.modified_count, 1);
    assert_eq!(catalog.product(plain.id).price, 1_100);
    assert_eq!(catalog.product(capped.id).price, 1_000);

    let result = catalog
        .products
        .batch_price(&[plain.id], PriceAdjustType::Fixed, 0.0)
        .await
        .unwrap();
    assert_eq!(result.modified_count, 0);
}

#[tokio::test]
async fn test_batch_operations() {
    let (catalog, category_id) = setup().await;
    let other = catalog
        .categories
        .create(
            CategoryInput {
                name: "Tablets".to_string(),
                ..Default::default()
            },
            "admin",
        )
        .await
        .unwrap();
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let p = catalog
            .products
            .create(phone(category_id, name, 100), "admin")
            .await
            .unwrap();
        ids.push(p.id);
    }

    let result = catalog.products.batch_status(&ids, 0).await.unwrap();
    assert_eq!(result.modified_count, 3);
    assert_eq!(catalog.product(ids[0]).status, ProductStatus::OffShelf);

    let result = catalog
        .products
        .batch_category(&ids[..2], other.id)
        .await
        .unwrap();
    assert_eq!(result.category_name, "Tablets");
    assert_eq!(catalog.product(ids[1]).category_id, other.id);

    let result = catalog
        .products
        .batch_recommend(
            &ids,
            RecommendPatch {
                is_hot: Some(true),
                is_new: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(result.operations, vec!["热销", "取消新品"]);
    assert!(catalog.product(ids[2]).is_hot);

    let listed = catalog
        .products
        .list(&ProductQuery {
            category_id: Some(other.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.total, 2);

    let result = catalog.products.batch_delete(&ids).await.unwrap();
    assert_eq!(result.deleted_count, 3);
    assert!(matches!(
        catalog.products.batch_delete(&[]).await,
        Err(CatalogError::Validation(_))
    ));
}

#[tokio::test]
async fn test_rankings() {
    let (catalog, category_id) = setup().await;
    let mut ids = Vec::new();
    for (name, sales) in [("Low", 1), ("High", 50), ("Mid", 10)] {
        let p = catalog
            .products
            .create(
                ProductInput {
                    sales,
                    ..phone(category_id, name, 100)
                },
                "admin",
            )
            .await
            .unwrap();
        ids.push(p.id);
    }

    let top = catalog.products.top_selling(None, 2).await.unwrap();
    let names: Vec<&str> = top.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["High", "Mid"]);

    let related = catalog.products.related(ids[0], 10).await.unwrap();
    assert_eq!(related.len(), 2);
    assert!(related.iter().all(|p| p.id != ids[0]));
}

#[tokio::test]
async fn test_bulk_create_and_paginate() {
    use fake::Fake;
    use fake::faker::lorem::en::Words;
    use std::collections::HashSet;

    let (catalog, category_id) = setup().await;
    let mut skus = HashSet::new();
    for i in 0..25 {
        let words: Vec<String> = Words(2..4).fake();
        let name = format!("{} {}", words.join(" "), i);
        let product = catalog
            .products
            .create(phone(category_id, &name, (i + 1) * 1_000), "admin")
            .await
            .unwrap();
        skus.insert(product.sku.unwrap());
    }
    assert_eq!(skus.len(), 25);

    let page = catalog
        .products
        .list(&ProductQuery {
            page: 3,
            size: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.items.len(), 5);
}
