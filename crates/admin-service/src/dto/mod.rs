//! 请求与响应 DTO

pub mod request;
pub mod response;

pub use request::{
    BatchCategoryRequest, BatchIdsRequest, BatchPriceRequest, BatchRecommendRequest,
    BatchStatusRequest, CategoryFilter, CategoryOptionsParams, CategoryRequest,
    CategoryTreeParams, PaginationParams, ProductFilter, ProductRequest, RankingParams,
    StatusRequest, StockRequest,
};
pub use response::{ApiResponse, PageResponse};
