//! 响应 DTO 定义
//!
//! 所有接口共用 `{code, message, success, data}` 响应体

use mall_catalog::dto::Page;
use serde::Serialize;

/// 分页响应
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub list: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

impl<T> PageResponse<T> {
    pub fn new(list: Vec<T>, total: i64, page: i64, size: i64) -> Self {
        Self {
            list,
            total,
            page,
            size,
        }
    }

    /// 由领域层分页结果转换
    pub fn from_page(page: Page<T>, page_no: i64, size: i64) -> Self {
        Self::new(page.items, page.total, page_no, size)
    }
}

/// API 统一响应
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub success: bool,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::success_with_message(data, "操作成功")
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: 200,
            message: message.into(),
            success: true,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 无数据的成功响应，`data` 序列化为 null
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: 200,
            message: message.into(),
            success: true,
            data: None,
        }
    }
}
