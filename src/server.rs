use crate::classifier::{AnalyzeError, ClassificationRequest, Classifier};
use crate::config::ClassifierConfig;
use crate::logging::{self, LoggingConfig};
use crate::middleware::{REQUEST_ID_HEADER, RequestIdMiddleware, get_request_id};
use crate::protocols::ResponseEnvelope;
use crate::provider::ProviderError;
use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};
use actix_web::{App, HttpMessage, HttpRequest, HttpResponse, HttpServer, Responder, get, post, web};
use bytes::BytesMut;
use futures_util::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Instrument, info, info_span, warn};

#[derive(Debug, Clone)]
pub struct AppState {
    pub classifier: Classifier,
    /// Largest `/analyze` body accepted, in bytes
    pub max_payload_size: usize,
}

impl AppState {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            classifier: Classifier::from_config(config)?,
            max_payload_size: config.max_payload_size,
        })
    }
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hello, World!")
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// `application/json` or any `application/*+json`
fn is_json_request(req: &HttpRequest) -> bool {
    let content_type = req.content_type().to_ascii_lowercase();
    content_type == "application/json"
        || (content_type.starts_with("application/") && content_type.ends_with("+json"))
}

/// Collect the request body, refusing anything over `limit` bytes
async fn read_body(
    req: &HttpRequest,
    mut payload: web::Payload,
    limit: usize,
) -> Result<BytesMut, AnalyzeError> {
    let declared_len = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared_len.is_some_and(|len| len > limit) {
        return Err(AnalyzeError::PayloadTooLarge { limit });
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            warn!(error = %e, "Failed to read request body");
            AnalyzeError::NotJson
        })?;
        if body.len() + chunk.len() > limit {
            return Err(AnalyzeError::PayloadTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

#[post("/analyze")]
pub async fn analyze(
    req: HttpRequest,
    payload: web::Payload,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AnalyzeError> {
    let request_id = get_request_id(&req);
    let span = info_span!("analyze", request_id = %request_id);

    async move {
        if !is_json_request(&req) {
            warn!(content_type = req.content_type(), "Rejected non-JSON analyze request");
            return Err(AnalyzeError::NotJson);
        }

        let body = read_body(&req, payload, data.max_payload_size)
            .await
            .inspect_err(|e| warn!(error = %e, "Rejected analyze request body"))?;

        let request = ClassificationRequest::from_body(&body).inspect_err(|e| {
            warn!(error = %e, body_len = body.len(), "Rejected analyze request");
        })?;

        let result = data.classifier.classify(&request.text).await?;
        info!("Classification succeeded");

        Ok(HttpResponse::Ok().json(ResponseEnvelope::success(result)))
    }
    .instrument(span)
    .await
}

/// Register all routes; shared by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(health).service(analyze);
}

/// Allow-list CORS when origins are configured, otherwise allow any origin
pub fn create_cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_any_header()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .expose_headers(vec![HeaderName::from_static(REQUEST_ID_HEADER)])
            .block_on_origin_mismatch(true)
    };

    cors.max_age(3600)
}

pub async fn startup(config: ClassifierConfig) -> std::io::Result<()> {
    static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

    let _log_guard = if !LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        Some(logging::init_logging(LoggingConfig {
            level: logging::parse_level(config.log_level.as_deref()),
            json_format: config.log_json,
            log_dir: config.log_dir.clone(),
            ..Default::default()
        }))
    } else {
        None
    };

    info!("Initializing classifier on {}:{}", config.host, config.port);
    info!("Classification mode: {}", config.mode);
    info!("Provider: {:?}", config.provider);
    match config.max_input_length {
        Some(limit) => info!("Input truncated to {} characters", limit),
        None => info!("Input truncation disabled"),
    }
    info!("Max payload size: {} bytes", config.max_payload_size);
    if config.cors_allowed_origins.is_empty() {
        info!("CORS: any origin allowed");
    } else {
        info!("CORS allowed origins: {:?}", config.cors_allowed_origins);
    }

    let app_state = AppState::new(&config).map_err(std::io::Error::other)?;
    let app_state = web::Data::new(app_state);

    let request_id_headers = config.effective_request_id_headers();
    let cors_allowed_origins = config.cors_allowed_origins.clone();

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(configure)
            .wrap(actix_web::middleware::Logger::new(
                "%a \"%r\" %s %b %{x-request-id}o %T",
            ))
            .wrap(RequestIdMiddleware::new(request_id_headers.clone()))
            .wrap(create_cors(&cors_allowed_origins))
    });

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    info!("Serving classifier on {}:{}", config.host, config.port);

    server.bind((config.host.as_str(), config.port))?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;

    #[actix_web::test]
    async fn test_is_json_request() {
        let req = actix_test::TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/json; charset=utf-8"))
            .to_http_request();
        assert!(is_json_request(&req));

        let req = actix_test::TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/vnd.api+json"))
            .to_http_request();
        assert!(is_json_request(&req));

        let req = actix_test::TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .to_http_request();
        assert!(!is_json_request(&req));

        let req = actix_test::TestRequest::post().to_http_request();
        assert!(!is_json_request(&req));
    }

    #[actix_web::test]
    async fn test_index_and_health() {
        let app = actix_test::init_service(App::new().service(index).service(health)).await;

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
        assert!(resp.status().is_success());
        assert_eq!(actix_test::read_body(resp).await, "Hello, World!");

        let resp =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());
        assert_eq!(actix_test::read_body(resp).await, "OK");
    }
}
