use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};

use crate::api::response::api_result;
use crate::services::{AliasService, CreateAliasRequest};

pub struct ShortenService;

impl ShortenService {
    /// `POST /v1/shorten`
    pub async fn create_alias(
        body: web::Json<CreateAliasRequest>,
        aliases: web::Data<Arc<AliasService>>,
    ) -> HttpResponse {
        api_result(StatusCode::CREATED, aliases.create(body.into_inner()).await)
    }
}
