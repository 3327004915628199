//! Turns a complete request into a response: handler lookup first, then the
//! static file cache. Every failure comes back as an HTML error page.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::files::FileError;
use crate::http::mime;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::server::context::ServerContext;

/// Runs [`respond`] on the blocking pool so handlers and disk reads never
/// stall the connection tasks. A panicking handler yields a 500.
pub async fn dispatch(context: &Arc<ServerContext>, request: Request) -> Response {
    let raw = request.raw.clone();
    let ctx = Arc::clone(context);

    match tokio::task::spawn_blocking(move || respond(&ctx, &request)).await {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "Request handler panicked");
            internal_error(context, &err.to_string(), &raw)
        }
    }
}

pub fn respond(context: &ServerContext, request: &Request) -> Response {
    if let Some(handler) = context.handlers.resolve(&request.path) {
        return match handler(request) {
            Ok(response) => response,
            Err(err) => {
                warn!(path = %request.path, error = %err, "Handler failed");
                internal_error(context, &format!("{err:#}"), &request.raw)
            }
        };
    }

    serve_static(context, request)
}

pub fn serve_static(context: &ServerContext, request: &Request) -> Response {
    match context.files.fetch(&request.path) {
        Ok(file) => {
            if let Some(since) = request.if_modified_since {
                if since >= file.last_modified {
                    return Response::not_modified(file.last_modified);
                }
            }

            if let Some(range) = request.range {
                if range.resolve(file.size).is_none() {
                    return Response::range_not_satisfiable(range, file.size, &request.raw);
                }
            }

            ResponseBuilder::new(StatusCode::Ok)
                .content_type(mime::content_type_for(&file.path))
                .last_modified(file.last_modified)
                .body(file.contents)
                .range(request.range)
                .build()
        }

        Err(FileError::NotFound) => {
            debug!(path = %request.path, "No handler or file");
            Response::error_page(
                StatusCode::NotFound,
                &format!("The requested path {} was not found on this server.", request.path),
                &request.raw,
            )
        }

        Err(FileError::Forbidden) => Response::error_page(
            StatusCode::Forbidden,
            &format!("Access to {} is not allowed.", request.path),
            &request.raw,
        ),

        Err(err @ FileError::Io(_)) => {
            warn!(path = %request.path, error = %err, "Static file read failed");
            internal_error(context, &err.to_string(), &request.raw)
        }
    }
}

/// 500 page. The error detail is only shown with `verbose_errors` on.
pub fn internal_error(context: &ServerContext, detail: &str, raw_request: &str) -> Response {
    let message = if context.config.server.verbose_errors {
        format!("The server hit an error while handling this request: {detail}")
    } else {
        "The server hit an error while handling this request.".to_string()
    };
    Response::error_page(StatusCode::InternalServerError, &message, raw_request)
}
