//! 商品分类 HTTP 处理器
//!
//! 查询类接口公开访问，写操作需要 `catalog:category:write` 权限。
//! 层级规则全部由 `CategoryService` 负责。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use mall_catalog::{
    Category, CategoryDetail, CategoryListItem, CategoryNode, CategoryOption, CategoryStatus,
};
use tracing::instrument;
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{
    ApiResponse, CategoryFilter, CategoryOptionsParams, CategoryRequest, CategoryTreeParams,
    PageResponse, PaginationParams, StatusRequest,
};
use crate::error::Result;
use crate::state::AppState;

/// 创建分类
///
/// POST /api/admin/categories
#[instrument(skip(state, claims, req))]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    req.validate()?;
    let category = state.categories.create(req.into(), &claims.username).await?;
    Ok(Json(ApiResponse::success_with_message(category, "创建分类成功")))
}

/// 分页查询分类
///
/// GET /api/admin/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<ApiResponse<PageResponse<CategoryListItem>>>> {
    let query = filter.into_query(&pagination)?;
    let page = state.categories.list(&query).await?;
    Ok(Json(ApiResponse::success_with_message(
        PageResponse::from_page(page, query.page, query.size),
        "获取分类列表成功",
    )))
}

/// 分类树
///
/// GET /api/admin/categories/tree
pub async fn category_tree(
    State(state): State<AppState>,
    Query(params): Query<CategoryTreeParams>,
) -> Result<Json<ApiResponse<Vec<CategoryNode>>>> {
    let status = params.status.map(CategoryStatus::try_from).transpose()?;
    let tree = state.categories.tree(status).await?;
    Ok(Json(ApiResponse::success_with_message(tree, "获取分类树成功")))
}

/// 分类下拉选项
///
/// GET /api/admin/categories/options
pub async fn category_options(
    State(state): State<AppState>,
    Query(params): Query<CategoryOptionsParams>,
) -> Result<Json<ApiResponse<Vec<CategoryOption>>>> {
    let status = CategoryStatus::try_from(params.status)?;
    let options = state.categories.options(status, params.max_level).await?;
    Ok(Json(ApiResponse::success_with_message(
        options,
        "获取分类选项成功",
    )))
}

/// 分类详情
///
/// GET /api/admin/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CategoryDetail>>> {
    let detail = state.categories.detail(id).await?;
    Ok(Json(ApiResponse::success_with_message(
        detail,
        "获取分类详情成功",
    )))
}

/// 更新分类
///
/// PUT /api/admin/categories/{id}
#[instrument(skip(state, claims, req))]
pub async fn update_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    req.validate()?;
    let category = state
        .categories
        .update(id, req.into(), &claims.username)
        .await?;
    Ok(Json(ApiResponse::success_with_message(category, "更新分类成功")))
}

/// 启用/禁用分类
///
/// PATCH /api/admin/categories/{id}/status
pub async fn update_category_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    let category = state
        .categories
        .update_status(id, req.status, &claims.username)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        category,
        "更新分类状态成功",
    )))
}

/// 删除分类
///
/// DELETE /api/admin/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    state.categories.delete(id).await?;
    Ok(Json(ApiResponse::success_empty("删除分类成功")))
}
