use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{FieldKind, Record, SeedRequest};

/// Request bodies that can be checked field by field before use.
pub trait Payload: Sized {
    /// # Errors
    /// Returns every field-level problem found in `body`.
    fn from_body(body: &[u8]) -> Result<Self, Vec<FieldError>>;
}

impl<R: Record + DeserializeOwned> Payload for R {
    fn from_body(body: &[u8]) -> Result<Self, Vec<FieldError>> {
        validate_body(body)
    }
}

impl Payload for SeedRequest {
    fn from_body(body: &[u8]) -> Result<Self, Vec<FieldError>> {
        let mut value = parse_object(body)?;

        if let Some(raw) = value.get_mut("include_samples") {
            match lax_bool(raw) {
                Some(flag) => *raw = Value::Bool(flag),
                None => {
                    return Err(vec![FieldError::body(
                        "include_samples",
                        "Input should be a valid boolean",
                        ErrorKind::TypeError,
                    )]);
                }
            }
        }

        serde_json::from_value(Value::Object(value)).map_err(|err| {
            vec![FieldError::new(&["body"], err.to_string(), ErrorKind::TypeError)]
        })
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Missing,
    TypeError,
    ValueError,
    JsonInvalid,
}

/// One rejected field. `loc` points at the offending value, e.g. `["body", "email"]`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            loc: loc.iter().map(|s| (*s).to_owned()).collect(),
            msg: msg.into(),
            kind,
        }
    }

    pub fn body(field: &str, msg: impl Into<String>, kind: ErrorKind) -> Self {
        Self::new(&["body", field], msg, kind)
    }
}

/// Parses a raw request body into `R`, collecting every field-level problem.
///
/// An empty body is treated as `{}`. Unknown keys are ignored.
///
/// # Errors
/// Returns the list of field errors when the body is malformed, a required
/// field is missing, a field has the wrong JSON type, or a declared
/// constraint (email format, integer range) fails.
pub fn validate_body<R>(body: &[u8]) -> Result<R, Vec<FieldError>>
where
    R: Record + DeserializeOwned,
{
    validate_value(Value::Object(parse_object(body)?))
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, Vec<FieldError>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    let value = serde_json::from_slice::<Value>(body).map_err(|err| {
        vec![FieldError::new(
            &["body"],
            format!("JSON decode error: {err}"),
            ErrorKind::JsonInvalid,
        )]
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(vec![not_an_object()]),
    }
}

fn not_an_object() -> FieldError {
    FieldError::new(
        &["body"],
        "Input should be a valid dictionary or object",
        ErrorKind::TypeError,
    )
}

/// # Errors
/// See [`validate_body`].
pub fn validate_value<R>(value: Value) -> Result<R, Vec<FieldError>>
where
    R: Record + DeserializeOwned,
{
    let Value::Object(mut map) = value else {
        return Err(vec![not_an_object()]);
    };

    let errors = check_fields::<R>(&mut map);
    if !errors.is_empty() {
        return Err(errors);
    }

    let record: R = serde_json::from_value(Value::Object(map)).map_err(|err| {
        vec![FieldError::new(&["body"], err.to_string(), ErrorKind::TypeError)]
    })?;

    record.validate().map_err(|errors| {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        fields
            .into_iter()
            .filter_map(|(field, errs)| {
                // One error per field, like the missing/type checks above.
                errs.first().map(|e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map_or_else(|| e.code.to_string(), ToString::to_string);
                    FieldError::body(&field, msg, ErrorKind::ValueError)
                })
            })
            .collect::<Vec<_>>()
    })?;

    Ok(record)
}

/// Checks presence and JSON kind of every declared field. Values that only
/// differ in representation (`4.0`, `"4"`, a datetime without offset) are
/// rewritten in place to their canonical form.
fn check_fields<R: Record>(map: &mut Map<String, Value>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for field in R::FIELDS {
        match map.get_mut(field.name) {
            None | Some(Value::Null) if field.required => {
                errors.push(FieldError::body(
                    field.name,
                    "Field required",
                    ErrorKind::Missing,
                ));
            }
            None | Some(Value::Null) => {}
            Some(value) => match coerce(field.kind, value) {
                Ok(Some(canonical)) => *value = canonical,
                Ok(None) => {}
                Err(msg) => errors.push(FieldError::body(field.name, msg, ErrorKind::TypeError)),
            },
        }
    }

    errors
}

/// `Ok(None)` keeps the value as is, `Ok(Some(v))` replaces it with `v`.
fn coerce(kind: FieldKind, value: &Value) -> Result<Option<Value>, &'static str> {
    match kind {
        FieldKind::Text if value.is_string() => Ok(None),
        FieldKind::Text => Err("Input should be a valid string"),
        FieldKind::Integer if value.is_i64() => Ok(None),
        FieldKind::Integer => lax_integer(value)
            .map(|n| Some(Value::from(n)))
            .ok_or("Input should be a valid integer"),
        FieldKind::DateTime => {
            let parsed = value.as_str().and_then(|s| {
                let s = s.trim();
                s.parse::<DateTime<Utc>>().ok().or_else(|| {
                    NAIVE_DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                        .map(|naive| naive.and_utc())
                })
            });
            match parsed {
                Some(datetime) => Ok(Some(Value::String(datetime.to_rfc3339()))),
                None => Err("Input should be a valid datetime"),
            }
        }
    }
}

/// Datetimes without an offset are read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[allow(clippy::cast_possible_truncation)]
fn lax_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            (f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lax_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Inquiry, News, Program};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn accepts_a_complete_inquiry() {
        let inquiry: Inquiry = validate_value(json!({
            "full_name": "Budi Santoso",
            "email": "budi@example.com",
            "phone": "+62 812 0000",
            "interest_program": "Computer Science (BSc)",
            "message": "When does enrollment open?",
            "unexpected": true,
        }))
        .unwrap();

        assert_eq!(inquiry.email, "budi@example.com");
        assert_eq!(inquiry.phone.as_deref(), Some("+62 812 0000"));
    }

    #[test]
    fn reports_every_missing_required_field() {
        let errors = validate_body::<Inquiry>(b"").unwrap_err();

        assert_eq!(
            errors,
            vec![
                FieldError::body("full_name", "Field required", ErrorKind::Missing),
                FieldError::body("email", "Field required", ErrorKind::Missing),
            ]
        );
    }

    #[test]
    fn null_required_field_counts_as_missing() {
        let errors =
            validate_value::<Inquiry>(json!({"full_name": null, "email": "a@b.co"})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].loc, vec!["body", "full_name"]);
        assert_eq!(errors[0].kind, ErrorKind::Missing);
    }

    #[test]
    fn malformed_email_is_a_value_error() {
        let errors =
            validate_value::<Inquiry>(json!({"full_name": "Ana", "email": "not-an-email"}))
                .unwrap_err();

        assert_eq!(
            errors,
            vec![FieldError::body(
                "email",
                "value is not a valid email address",
                ErrorKind::ValueError
            )]
        );
    }

    #[test]
    fn wrong_types_are_reported_per_field() {
        let errors = validate_value::<Program>(json!({
            "title": 42,
            "level": "Undergraduate",
            "duration_years": "four",
        }))
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                FieldError::body("title", "Input should be a valid string", ErrorKind::TypeError),
                FieldError::body(
                    "duration_years",
                    "Input should be a valid integer",
                    ErrorKind::TypeError
                ),
            ]
        );
    }

    #[test]
    fn duration_range_is_enforced() {
        let errors = validate_value::<Program>(json!({
            "title": "Nursing",
            "level": "Undergraduate",
            "duration_years": 12,
        }))
        .unwrap_err();

        assert_eq!(errors[0].loc, vec!["body", "duration_years"]);
        assert_eq!(errors[0].kind, ErrorKind::ValueError);
    }

    #[test]
    fn news_accepts_rfc3339_timestamps_only() {
        let news: News = validate_value(json!({
            "title": "Open day",
            "content": "Visit us",
            "published_at": "2025-03-01T09:00:00Z",
        }))
        .unwrap();
        assert!(news.published_at.is_some());

        let errors = validate_value::<News>(json!({
            "title": "Open day",
            "content": "Visit us",
            "published_at": "next tuesday",
        }))
        .unwrap_err();
        assert_eq!(errors[0].loc, vec!["body", "published_at"]);
    }

    #[test]
    fn rejects_non_object_and_broken_json() {
        let errors = validate_body::<Inquiry>(b"[1, 2]").unwrap_err();
        assert_eq!(errors[0].loc, vec!["body"]);
        assert_eq!(errors[0].kind, ErrorKind::TypeError);

        let errors = validate_body::<Inquiry>(b"{\"full_name\": ").unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::JsonInvalid);
    }

    #[test]
    fn field_error_serializes_with_type_key() {
        let error = FieldError::body("email", "Field required", ErrorKind::Missing);
        assert_eq!(
            serde_json::to_value(error).unwrap(),
            json!({"loc": ["body", "email"], "msg": "Field required", "type": "missing"})
        );
    }

    #[test]
    fn seed_request_body_is_optional_but_typed() {
        assert_eq!(SeedRequest::from_body(b"").unwrap(), SeedRequest::default());
        assert!(
            !SeedRequest::from_body(br#"{"include_samples": false}"#)
                .unwrap()
                .include_samples
        );

        let errors = SeedRequest::from_body(br#"{"include_samples": "maybe"}"#).unwrap_err();
        assert_eq!(errors[0].loc, vec!["body", "include_samples"]);
    }

    #[test]
    fn seed_flag_accepts_boolean_like_values() {
        for (body, expected) in [
            (r#"{"include_samples": "true"}"#, true),
            (r#"{"include_samples": "no"}"#, false),
            (r#"{"include_samples": 0}"#, false),
            (r#"{"include_samples": 1}"#, true),
        ] {
            assert_eq!(
                SeedRequest::from_body(body.as_bytes()).unwrap().include_samples,
                expected
            );
        }

        assert!(SeedRequest::from_body(br#"{"include_samples": 2}"#).is_err());
    }

    #[test]
    fn email_domain_without_period_is_rejected() {
        for email in ["a@b", "a@localhost"] {
            let errors =
                validate_value::<Inquiry>(json!({"full_name": "x", "email": email})).unwrap_err();
            assert_eq!(errors.len(), 1, "{email}");
            assert_eq!(errors[0].loc, vec!["body", "email"]);
            assert_eq!(errors[0].kind, ErrorKind::ValueError);
        }

        let errors =
            validate_value::<Inquiry>(json!({"full_name": "x", "email": "bad@"})).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn whole_numbers_are_accepted_for_integer_fields() {
        for duration in [json!(4.0), json!("4"), json!(4)] {
            let program: Program = validate_value(json!({
                "title": "Architecture",
                "level": "Undergraduate",
                "duration_years": duration,
            }))
            .unwrap();
            assert_eq!(program.duration_years, Some(4));
        }

        let errors = validate_value::<Program>(json!({
            "title": "Architecture",
            "level": "Undergraduate",
            "duration_years": 4.5,
        }))
        .unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::TypeError);
    }

    #[test]
    fn datetime_without_offset_is_read_as_utc() {
        let news: News = validate_value(json!({
            "title": "Open day",
            "content": "Visit us",
            "published_at": "2025-03-01T09:00:00",
        }))
        .unwrap();

        assert_eq!(
            news.published_at.map(|at| at.to_rfc3339()),
            Some("2025-03-01T09:00:00+00:00".to_owned())
        );
    }

    proptest! {
        #[test]
        fn emails_without_at_sign_never_validate(local in "[a-z0-9._-]{1,20}") {
            let result = validate_value::<Inquiry>(json!({
                "full_name": "Someone",
                "email": local,
            }));
            prop_assert!(result.is_err());
        }
    }
}
