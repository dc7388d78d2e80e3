use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::ItemsAndPagesNumber;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Envelope wrapping every JSON body the API returns
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub status: &'static str,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::success(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::success(StatusCode::CREATED, data, message)
    }

    pub fn paginated(data: T, pagination: Pagination, message: impl Into<String>) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::success(StatusCode::OK, data, message)
        }
    }

    fn success(code: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            code: code.as_u16(),
            message: message.into(),
            status: "success",
            data: Some(data),
            pagination: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_u16(),
            message: message.into(),
            status: "error",
            data: None,
            pagination: None,
        }
    }

    /// Success without a payload, e.g. deletions
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: message.into(),
            status: "success",
            data: None,
            pagination: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn new(current_page: u64, items_per_page: u64, total_items: u64, total_pages: u64) -> Self {
        Self {
            current_page,
            total_pages,
            total_items,
            items_per_page,
            has_next: current_page < total_pages,
            has_previous: current_page > 1,
        }
    }
}

/// `page` / `page_size` query parameters, 1-based
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Zero-based index for `Paginator::fetch_page`
    pub fn page_index(&self) -> u64 {
        self.page() - 1
    }

    pub fn pagination(&self, counts: ItemsAndPagesNumber) -> Pagination {
        Pagination::new(
            self.page(),
            self.page_size(),
            counts.number_of_items,
            counts.number_of_pages,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults_and_clamping() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);

        let params = PageParams {
            page: Some(0),
            page_size: Some(500),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_pagination_flags() {
        let first = Pagination::new(1, 10, 25, 3);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let last = Pagination::new(3, 10, 25, 3);
        assert!(!last.has_next);
        assert!(last.has_previous);
    }

    #[test]
    fn test_error_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::<()>::error(
            StatusCode::NOT_FOUND,
            "Vehicle not found",
        ))
        .unwrap();
        assert_eq!(body["code"], 404);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Vehicle not found");
        assert!(body["data"].is_null());
        assert!(body.get("pagination").is_none());
    }
}
