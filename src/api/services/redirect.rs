use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::trace;

use crate::analytics::{ClickEvent, ClickRecorder};
use crate::api::response::error_response;
use crate::services::AliasService;
use crate::utils::ip::extract_client_ip;

pub struct RedirectService;

impl RedirectService {
    /// `GET /v1/s/{code}`: 302 to the live target, or 404.
    ///
    /// The click is handed to the recorder before responding and is
    /// written in the background.
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        aliases: web::Data<Arc<AliasService>>,
        recorder: web::Data<Arc<ClickRecorder>>,
    ) -> HttpResponse {
        let code = path.into_inner();

        match aliases.resolve(&code).await {
            Ok(resolved) => {
                Self::record_click(&resolved.code, &req, &recorder);
                trace!("Redirecting '{}' -> {}", resolved.code, resolved.target);
                HttpResponse::Found()
                    .insert_header((header::LOCATION, resolved.target))
                    .finish()
            }
            Err(e) => error_response(&e),
        }
    }

    fn record_click(code: &str, req: &HttpRequest, recorder: &ClickRecorder) {
        let header_value = |name: header::HeaderName| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        };

        let event = ClickEvent::new(code)
            .with_ip(extract_client_ip(req))
            .with_user_agent(header_value(header::USER_AGENT))
            .with_referer(header_value(header::REFERER));

        recorder.record(event);
    }
}
