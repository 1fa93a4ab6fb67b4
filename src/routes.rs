use std::convert::Infallible;
use std::sync::Arc;

use log::{error, warn, Logger};
use serde::Serialize;
use warp::filters::body::BodyDeserializeError;
use warp::filters::cors::Builder as CorsBuilder;
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The maximum JSON body size to accept. This should be enforced by
/// the HTTP gateway, so on the Rust side it's set generously.
const MAX_CONTENT_LENGTH: u64 = 16 * 1024 * 1024;

/// The path segment all toilet routes live under.
const TOILETS_PATH: &str = "toilets";

/// Builds every public route, with rejection formatting and CORS.
pub fn make_routes(
    environment: Environment,
) -> impl Filter<Extract = (impl warp::Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();

    make_list_route(environment.clone())
        .or(make_create_route(environment.clone()))
        .or(make_comment_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
        .with(make_cors())
}

/// Any origin, with credentials. Warp echoes the request origin back,
/// so browsers accept the credentialed response.
///
/// Warp cannot allow every request header, so only the headers listed
/// below pass a preflight; any other requested header gets a 403.
pub fn make_cors() -> CorsBuilder {
    warp::cors()
        .allow_any_origin()
        .allow_credentials(true)
        .allow_methods(vec![
            "GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "HEAD",
        ])
        .allow_headers(vec![
            "accept",
            "authorization",
            "content-type",
            "origin",
            "x-requested-with",
        ])
}

#[derive(Debug, Serialize)]
struct Detail {
    detail: String,
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, Infallible> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    let (status, detail) = if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_owned())
    } else if let Some(e) = rej.find::<rejection::MalformedBody>() {
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    } else if let Some(e) = rej.find::<BodyDeserializeError>() {
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    } else if let Some(e) = rej.find::<reject::PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
    } else if let Some(e) = rej.find::<reject::LengthRequired>() {
        (StatusCode::LENGTH_REQUIRED, e.to_string())
    } else if let Some(e) = rej.find::<reject::UnsupportedMediaType>() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string())
    } else if let Some(e) = rej.find::<reject::MethodNotAllowed>() {
        (StatusCode::METHOD_NOT_ALLOWED, e.to_string())
    } else {
        error!(logger, "Unhandled rejection"; "rejection" => ?rej);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error".to_owned(),
        )
    };

    if status.is_client_error() {
        warn!(logger, "Rejected request"; "status" => %status, "detail" => %detail);
    }

    Ok(with_status(json(&Detail { detail }), status))
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        NonExistentId(..) => StatusCode::NOT_FOUND,
        StorePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{get as g, path as p, path::param as par, post};

    use serde::de::DeserializeOwned;
    use serde_json::{Map, Value};

    use super::rejection::MalformedBody;
    use super::{handlers, MAX_CONTENT_LENGTH, TOILETS_PATH};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p(TOILETS_PATH));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    /// Accepts only a JSON object, then converts it into `T`. Derived
    /// struct deserializers would otherwise take arrays positionally.
    fn json_body<T: DeserializeOwned + Send + 'static>(
    ) -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
        warp::body::content_length_limit(MAX_CONTENT_LENGTH)
            .and(warp::body::json::<Map<String, Value>>())
            .and_then(|object: Map<String, Value>| async move {
                serde_json::from_value::<T>(Value::Object(object))
                    .map_err(|e| warp::reject::custom(MalformedBody(e)))
            })
    }

    route!(make_list_route => list, rt; end(), g());
    route!(make_create_route => create, rt; end(), post(), json_body());
    route!(make_comment_route => comment, rt; par::<String>(), p("comment"), end(), post(), json_body());
}
