use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::api::response::api_result;
use crate::services::AnalyticsService;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// `day`, `month`, `browser`, `os` or `device`; absent for the overview
    pub by: Option<String>,
    /// `YYYY-MM-DD` for `day`, `YYYY-MM` for `month`
    pub value: Option<String>,
}

pub struct AnalyticsApi;

impl AnalyticsApi {
    /// `GET /v1/analytics/{code}?by=&value=`
    ///
    /// The code is looked up before the filter is parsed.
    pub async fn get_analytics(
        path: web::Path<String>,
        query: web::Query<AnalyticsQuery>,
        analytics: web::Data<Arc<AnalyticsService>>,
    ) -> HttpResponse {
        let code = path.into_inner();
        api_result(
            StatusCode::OK,
            analytics
                .aggregate_query(&code, query.by.as_deref(), query.value.as_deref())
                .await,
        )
    }
}
