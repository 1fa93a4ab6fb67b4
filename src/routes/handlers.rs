use std::time::{Duration, Instant};

use log::debug;
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::toilet::{CommentSubmission, NewToilet};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn list(environment: Environment) -> RouteResult {
    timed! {
        let toilets = environment
            .db
            .list()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::list(), e))?;

        debug!(environment.logger, "Listing toilets..."; "count" => toilets.len());

        json(&toilets)
    }
}

pub async fn create(environment: Environment, submission: NewToilet) -> RouteResult {
    timed! {
        let name = submission.name.clone();
        let error_handler = move |e: BackendError| Rejection::new(Context::create(name), e);

        let toilet = environment
            .db
            .create(submission)
            .await
            .map_err(error_handler)?;

        debug!(environment.logger, "Created toilet"; "id" => toilet.id(), "name" => toilet.name());

        with_status(json(&toilet), StatusCode::OK)
    }
}

pub async fn comment(
    environment: Environment,
    id: String,
    submission: CommentSubmission,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::comment(id.clone()), e);

        debug!(environment.logger, "Adding comment..."; "id" => &id);

        let rated = environment
            .db
            .add_comment(&id, submission)
            .await
            .map_err(error_handler)?;

        debug!(environment.logger, "Added comment"; "id" => &id, "rated" => ?rated);

        json(&SuccessResponse::Comment { ok: true })
    }
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
