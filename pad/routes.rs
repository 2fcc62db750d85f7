use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::state::SharedState;
use crate::handlers;

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn with_body(status: u16, content_type: &'static [u8], body: Vec<u8>) -> HttpResponse {
    let len = body.len();
    let mut headers = Vec::new();
    if let Ok(h) = Header::from_bytes(&b"Content-Type"[..], content_type) {
        headers.push(h);
    }
    Response::new(StatusCode(status), headers, Cursor::new(body), Some(len), None)
}

pub fn html_response(body: String) -> HttpResponse {
    with_body(200, b"text/html; charset=utf-8", body.into_bytes())
}

pub fn json_response(body: String) -> HttpResponse {
    with_body(200, b"application/json", body.into_bytes())
}

/// Event accepted but nothing to redraw.
pub fn no_content() -> HttpResponse {
    Response::new(StatusCode(204), Vec::new(), Cursor::new(Vec::new()), Some(0), None)
}

pub fn bad_request(msg: &str) -> HttpResponse {
    with_body(400, b"text/plain; charset=utf-8", msg.as_bytes().to_vec())
}

pub fn not_found() -> HttpResponse {
    with_body(404, b"text/plain", b"404 Not Found".to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches one request and sends the response.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();

    let response = match (method, path.as_str()) {
        (Method::Get,  "/")         => handlers::page::handle_get(&state),
        (Method::Post, "/event")    => handlers::event::handle_event(&mut request, &state),
        (Method::Get,  "/grid")     => handlers::grid::handle_grid(&state),
        (Method::Get,  "/features") => handlers::grid::handle_features(&state),
        (Method::Get,  "/models")   => handlers::model::handle_list(&state),
        (Method::Post, "/model")    => handlers::model::handle_switch(&mut request, &state),
        _ => not_found(),
    };

    tracing::debug!(%url, status = response.status_code().0, "request served");
    let _ = request.respond(response);
}
