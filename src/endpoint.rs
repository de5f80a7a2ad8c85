/// HTTP endpoint for the flood watch service
///
/// Thin JSON transport over `FloodWatch`. Routing is a pure function of
/// (method, path, body) so it can be exercised without a socket.
///
/// Endpoints:
/// - GET  /api/stations      - Station listing with current readings and risk
/// - GET  /api/venues        - Configured venues
/// - POST /api/subscribe     - Register {venue_id, name?, email}
/// - GET  /api/subscriptions - All subscriptions (diagnostic, unrestricted)
/// - GET  /health            - Service health check

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Read;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::logging::{self, Component};
use crate::model::SubscriptionError;
use crate::service::FloodWatch;

/// Largest request body read for a subscribe call.
const MAX_BODY_BYTES: u64 = 64 * 1024;

const ENDPOINTS: [&str; 5] = [
    "/api/stations",
    "/api/venues",
    "/api/subscribe",
    "/api/subscriptions",
    "/health",
];

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    venue_id: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    fn ok<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(body) => ApiResponse { status: 200, body },
            Err(e) => ApiResponse::error(500, &format!("serialization failed: {}", e)),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        ApiResponse {
            status,
            body: json!({ "error": message }),
        }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Dispatches one request against the service.
pub fn route(service: &FloodWatch, method: &Method, url: &str, body: &str) -> ApiResponse {
    let path = url.split('?').next().unwrap_or_default();

    match (method, path) {
        (Method::Get, "/health") => handle_health(),
        (Method::Get, "/api/stations") => ApiResponse::ok(&service.list_stations()),
        (Method::Get, "/api/venues") => ApiResponse::ok(&service.list_venues()),
        (Method::Get, "/api/subscriptions") => ApiResponse::ok(&service.list_subscriptions()),
        (Method::Post, "/api/subscribe") => handle_subscribe(service, body),
        (_, p) if ENDPOINTS.contains(&p) => ApiResponse::error(405, "method not allowed"),
        _ => ApiResponse {
            status: 404,
            body: json!({
                "error": "Not found",
                "available_endpoints": ENDPOINTS,
            }),
        },
    }
}

fn handle_health() -> ApiResponse {
    ApiResponse {
        status: 200,
        body: json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    }
}

fn handle_subscribe(service: &FloodWatch, body: &str) -> ApiResponse {
    let request: SubscribeRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(_) => return ApiResponse::error(400, "venue_id and email required"),
    };

    let venue_id = request.venue_id.unwrap_or_default();
    let email = request.email.unwrap_or_default();

    match service.subscribe(&venue_id, request.name.as_deref(), &email) {
        Ok(venue) => {
            logging::info(Component::Http, Some(&venue), "new subscription");
            ApiResponse {
                status: 200,
                body: json!({ "status": "subscribed", "venue": venue }),
            }
        }
        Err(SubscriptionError::InvalidInput(_)) => ApiResponse::error(400, "venue_id and email required"),
        Err(SubscriptionError::UnknownVenue(_)) => ApiResponse::error(404, "unknown venue"),
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port. Blocks forever.
pub fn start_endpoint_server(port: u16, service: FloodWatch) -> Result<(), String> {
    let server = Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    logging::info(
        Component::Http,
        None,
        &format!("HTTP endpoint listening on http://0.0.0.0:{}", port),
    );

    serve(&server, &service);
    Ok(())
}

/// Answers requests from `server` until it is shut down.
pub fn serve(server: &Server, service: &FloodWatch) {
    for mut request in server.incoming_requests() {
        let mut body = String::new();
        if *request.method() == Method::Post {
            if let Err(e) = request.as_reader().take(MAX_BODY_BYTES).read_to_string(&mut body) {
                logging::warn(Component::Http, None, &format!("Failed to read request body: {}", e));
            }
        }

        let api = route(service, request.method(), request.url(), &body);

        if let Err(e) = request.respond(create_response(api)) {
            logging::warn(Component::Http, None, &format!("Failed to send response: {}", e));
        }
    }
}

/// Create HTTP response with JSON body
fn create_response(api: ApiResponse) -> Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(&api.body).unwrap_or_else(|_| "{}".to_string());
    let mut response = Response::from_data(body.into_bytes()).with_status_code(StatusCode::from(api.status));

    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
