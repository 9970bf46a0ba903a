//! 商品 HTTP 处理器
//!
//! 读接口需要 `catalog:product:read`，写接口与批量操作需要 `catalog:product:write`

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use mall_catalog::dto::{
    BatchCategoryResult, BatchDeleteResult, BatchPriceResult, BatchRecommendResult,
    BatchUpdateResult,
};
use mall_catalog::{Product, ProductView, RecommendPatch};
use tracing::instrument;
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{
    ApiResponse, BatchCategoryRequest, BatchIdsRequest, BatchPriceRequest, BatchRecommendRequest,
    BatchStatusRequest, PageResponse, PaginationParams, ProductFilter, ProductRequest,
    RankingParams, StatusRequest, StockRequest,
};
use crate::error::Result;
use crate::state::AppState;

// ==================== 单个商品 ====================

/// 创建商品
///
/// POST /api/admin/products
#[instrument(skip(state, claims, req))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ApiResponse<Product>>> {
    req.validate()?;
    let product = state.products.create(req.into(), &claims.username).await?;
    Ok(Json(ApiResponse::success_with_message(product, "创建商品成功")))
}

/// 分页查询商品
///
/// GET /api/admin/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<ApiResponse<PageResponse<ProductView>>>> {
    let query = filter.into_query(&pagination)?;
    let page = state.products.list(&query).await?;
    Ok(Json(ApiResponse::success_with_message(
        PageResponse::from_page(page, query.page, query.size),
        "获取商品列表成功",
    )))
}

/// 商品详情
///
/// GET /api/admin/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProductView>>> {
    let view = state.products.detail(id).await?;
    Ok(Json(ApiResponse::success_with_message(view, "获取商品详情成功")))
}

/// 更新商品
///
/// PUT /api/admin/products/{id}
#[instrument(skip(state, claims, req))]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ApiResponse<Product>>> {
    req.validate()?;
    let product = state
        .products
        .update(id, req.into(), &claims.username)
        .await?;
    Ok(Json(ApiResponse::success_with_message(product, "更新商品成功")))
}

/// 上架/下架
///
/// PATCH /api/admin/products/{id}/status
pub async fn update_product_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = state.products.update_status(id, req.status).await?;
    Ok(Json(ApiResponse::success_with_message(
        product,
        "更新商品状态成功",
    )))
}

/// 调整库存
///
/// PATCH /api/admin/products/{id}/stock
pub async fn update_product_stock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<StockRequest>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = state
        .products
        .update_stock(id, req.operation, req.quantity)
        .await?;
    Ok(Json(ApiResponse::success_with_message(product, "更新库存成功")))
}

/// 设置推荐标记，未提供的标记保持不变
///
/// PATCH /api/admin/products/{id}/recommend
pub async fn update_product_recommend(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<RecommendPatch>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = state.products.update_recommend(id, patch).await?;
    Ok(Json(ApiResponse::success_with_message(
        product,
        "更新推荐状态成功",
    )))
}

/// 删除商品
///
/// DELETE /api/admin/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    state.products.delete(id).await?;
    Ok(Json(ApiResponse::success_empty("删除商品成功")))
}

// ==================== 排行与推荐 ====================

/// 热销商品
///
/// GET /api/admin/products/top-selling
pub async fn top_selling(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state
        .products
        .top_selling(params.category_id, params.limit)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        products,
        "获取热销商品成功",
    )))
}

/// 新品
///
/// GET /api/admin/products/new-products
pub async fn new_arrivals(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state
        .products
        .new_arrivals(params.category_id, params.limit)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        products,
        "获取新品推荐成功",
    )))
}

/// 相关商品
///
/// GET /api/admin/products/{id}/related
pub async fn related_products(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RankingParams>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.products.related(id, params.limit).await?;
    Ok(Json(ApiResponse::success_with_message(
        products,
        "获取相关商品成功",
    )))
}

// ==================== 批量操作 ====================

/// POST /api/admin/products/batch-status
pub async fn batch_status(
    State(state): State<AppState>,
    Json(req): Json<BatchStatusRequest>,
) -> Result<Json<ApiResponse<BatchUpdateResult>>> {
    let result = state.products.batch_status(&req.ids, req.status).await?;
    Ok(Json(ApiResponse::success_with_message(
        result,
        "批量更新商品状态成功",
    )))
}

/// POST /api/admin/products/batch-category
pub async fn batch_category(
    State(state): State<AppState>,
    Json(req): Json<BatchCategoryRequest>,
) -> Result<Json<ApiResponse<BatchCategoryResult>>> {
    let result = state
        .products
        .batch_category(&req.ids, req.category_id)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        result,
        "批量更新商品分类成功",
    )))
}

/// POST /api/admin/products/batch-price
pub async fn batch_price(
    State(state): State<AppState>,
    Json(req): Json<BatchPriceRequest>,
) -> Result<Json<ApiResponse<BatchPriceResult>>> {
    let result = state
        .products
        .batch_price(&req.ids, req.adjust_type, req.adjust_value)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        result,
        "批量调整商品价格成功",
    )))
}

/// POST /api/admin/products/batch-recommend
pub async fn batch_recommend(
    State(state): State<AppState>,
    Json(req): Json<BatchRecommendRequest>,
) -> Result<Json<ApiResponse<BatchRecommendResult>>> {
    let result = state.products.batch_recommend(&req.ids, req.flags).await?;
    Ok(Json(ApiResponse::success_with_message(
        result,
        "批量设置推荐成功",
    )))
}

/// POST /api/admin/products/batch-delete
pub async fn batch_delete(
    State(state): State<AppState>,
    Json(req): Json<BatchIdsRequest>,
) -> Result<Json<ApiResponse<BatchDeleteResult>>> {
    let result = state.products.batch_delete(&req.ids).await?;
    Ok(Json(ApiResponse::success_with_message(
        result,
        "批量删除商品成功",
    )))
}
