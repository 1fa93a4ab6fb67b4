use std::fmt;

use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            detail: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

/// A JSON object body that does not fit the route's payload type.
#[derive(Debug)]
pub struct MalformedBody(pub(crate) serde_json::Error);

impl fmt::Display for MalformedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request body deserialize error: {}", self.0)
    }
}

impl reject::Reject for MalformedBody {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) detail: String,
}

/// What the failed request was doing.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Comment { id: String },
    Create { name: String },
    List {},
}

impl Context {
    pub fn comment(id: String) -> Context {
        Context::Comment { id }
    }

    pub fn create(name: String) -> Context {
        Context::Create { name }
    }

    pub fn list() -> Context {
        Context::List {}
    }
}
