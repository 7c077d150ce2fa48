use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
};
use campus_common::{ErrorKind, FieldError, Payload};
use http::{Uri, request::Parts};
use serde::de::DeserializeOwned;

use crate::into_http::HttpError;

/// Query string parameters. Parse failures become `["query", ...]` field errors.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<T> QueryParams<T>
where
    T: DeserializeOwned,
{
    pub fn try_from_uri(value: &Uri) -> Result<Self, HttpError> {
        let query = value.query().unwrap_or_default();
        serde_urlencoded::from_str(query)
            .map(QueryParams)
            .map_err(|err| {
                HttpError::validation(vec![FieldError::new(
                    &["query"],
                    err.to_string(),
                    ErrorKind::TypeError,
                )])
            })
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::try_from_uri(&parts.uri)
    }
}

/// JSON body checked against its schema before the handler runs.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: Payload,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            HttpError::validation(vec![FieldError::new(
                &["body"],
                rejection.body_text(),
                ErrorKind::JsonInvalid,
            )])
        })?;

        T::from_body(&body)
            .map(ValidatedJson)
            .map_err(HttpError::validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Params {
        limit: Option<i64>,
    }

    #[test]
    fn parses_optional_numbers() {
        let uri: Uri = "/api/news?limit=3".parse().unwrap();
        let QueryParams(params) = QueryParams::<Params>::try_from_uri(&uri).unwrap();
        assert_eq!(params.limit, Some(3));

        let uri: Uri = "/api/news".parse().unwrap();
        let QueryParams(params) = QueryParams::<Params>::try_from_uri(&uri).unwrap();
        assert_eq!(params.limit, None);
    }

    #[test]
    fn non_numeric_limit_is_a_validation_error() {
        let uri: Uri = "/api/news?limit=ten".parse().unwrap();
        let err = QueryParams::<Params>::try_from_uri(&uri).unwrap_err();

        let HttpError::Validation(errors) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(errors[0].loc, vec!["query"]);
    }
}
