//! API request helpers
//!
//! Wrappers around the Axum extractors, rejections become JSON errors

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use super::Error;

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) => match err {
            JsonRejection::JsonDataError(err) => {
                Err(Error::bad_request("Data error").with_description(err))
            }
            JsonRejection::JsonSyntaxError(err) => {
                let description = std::error::Error::source(&err)
                    .map_or_else(|| err.to_string(), ToString::to_string);

                Err(Error::bad_request("JSON syntax error").with_description(description))
            }
            JsonRejection::MissingJsonContentType(_err) => Err(Error::bad_request(
                "Missing `application/json` content type",
            )),
            JsonRejection::BytesRejection(err) => Err(Error::bad_request(
                "Invalid characters in JSON",
            )
            .with_description(err)),
            err => Err(Error::bad_request("Unknown JSON error").with_description(err)),
        },
    }
}

/// Wrapper for the JSON extractor
pub struct Form<F>(pub F);

impl<S, F> FromRequest<S> for Form<F>
where
    S: Send + Sync,
    F: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = Json::<F>::from_request(req, state).await;

        parse_json(json).map(Form)
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(err) => Err(Error::bad_request(
                "Invalid path parameter",
            )
            .with_description(err)),
            PathRejection::MissingPathParams(err) => Err(Error::bad_request(
                "Missing path parameter",
            )
            .with_description(err)),
            err => Err(Error::bad_request("Unknown path error").with_description(err)),
        },
    }
}

/// Wrapper for the path extractor
pub struct PathParameters<P>(pub P);

impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = Path::<P>::from_request_parts(parts, state).await;

        parse_path(path).map(PathParameters)
    }
}

/// Wrapper for the query string extractor
pub struct QueryParameters<Q>(pub Q);

impl<S, Q> FromRequestParts<S> for QueryParameters<Q>
where
    S: Send + Sync,
    Q: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<Q>::from_request_parts(parts, state).await {
            Ok(Query(query)) => Ok(QueryParameters(query)),
            Err(QueryRejection::FailedToDeserializeQueryString(err)) => Err(Error::bad_request(
                "Invalid query parameter",
            )
            .with_description(err)),
            Err(err) => {
                Err(Error::bad_request("Unknown query error").with_description(err))
            }
        }
    }
}
