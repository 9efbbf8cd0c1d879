//! Conversions between parameter/return values and HTTP bodies.
//!
//! Generated code only decides *where* these conversions happen. How a
//! domain type is encoded or decoded is up to the application, which
//! implements these traits for its own types.

use crate::error::{ServiceError, ServiceResult};
use crate::http::HttpResponse;

/// Turns a body parameter into request bytes
pub trait IntoRequestBody {
    fn into_request_body(self) -> ServiceResult<Vec<u8>>;
}

impl IntoRequestBody for Vec<u8> {
    fn into_request_body(self) -> ServiceResult<Vec<u8>> {
        Ok(self)
    }
}

impl IntoRequestBody for &[u8] {
    fn into_request_body(self) -> ServiceResult<Vec<u8>> {
        Ok(self.to_vec())
    }
}

impl IntoRequestBody for String {
    fn into_request_body(self) -> ServiceResult<Vec<u8>> {
        Ok(self.into_bytes())
    }
}

impl IntoRequestBody for &str {
    fn into_request_body(self) -> ServiceResult<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }
}

impl<T: IntoRequestBody> IntoRequestBody for Option<T> {
    fn into_request_body(self) -> ServiceResult<Vec<u8>> {
        match self {
            Some(body) => body.into_request_body(),
            None => Ok(Vec::new()),
        }
    }
}

/// Produces a method's declared return value from the pipeline response.
///
/// `wire_type` carries the declared wire representation, if any, so an
/// implementation can pick a decoding (for example base64url or RFC 1123
/// dates) without the generator choosing one.
pub trait FromResponse: Sized {
    fn from_response(response: HttpResponse, wire_type: Option<&str>) -> ServiceResult<Self>;
}

impl FromResponse for () {
    fn from_response(_: HttpResponse, _: Option<&str>) -> ServiceResult<Self> {
        Ok(())
    }
}

impl FromResponse for HttpResponse {
    fn from_response(response: HttpResponse, _: Option<&str>) -> ServiceResult<Self> {
        Ok(response)
    }
}

impl FromResponse for Vec<u8> {
    fn from_response(response: HttpResponse, _: Option<&str>) -> ServiceResult<Self> {
        Ok(response.into_body())
    }
}

impl FromResponse for String {
    fn from_response(response: HttpResponse, _: Option<&str>) -> ServiceResult<Self> {
        String::from_utf8(response.into_body())
            .map_err(|e| ServiceError::decode(format!("body is not valid UTF-8: {}", e)))
    }
}

impl FromResponse for Vec<String> {
    /// One entry per non-empty line of a UTF-8 body
    fn from_response(response: HttpResponse, wire_type: Option<&str>) -> ServiceResult<Self> {
        let text = String::from_response(response, wire_type)?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

impl<T: FromResponse> FromResponse for Option<T> {
    /// `None` when the response carries no body
    fn from_response(response: HttpResponse, wire_type: Option<&str>) -> ServiceResult<Self> {
        if response.body().is_empty() {
            return Ok(None);
        }
        T::from_response(response, wire_type).map(Some)
    }
}

impl FromResponse for u16 {
    /// The status code itself, for methods that only report the outcome
    fn from_response(response: HttpResponse, _: Option<&str>) -> ServiceResult<Self> {
        Ok(response.status_code())
    }
}

impl FromResponse for bool {
    /// `true` for any 2xx status, as used by HEAD-style existence checks
    fn from_response(response: HttpResponse, _: Option<&str>) -> ServiceResult<Self> {
        Ok((200..300).contains(&response.status_code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_body_roundtrip() {
        let bytes = String::from("hello").into_request_body().unwrap();
        let response = HttpResponse::new(200).with_body(bytes);
        assert_eq!(String::from_response(response, None).unwrap(), "hello");
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let response = HttpResponse::new(200).with_body(vec![0xff, 0xfe]);
        let err = String::from_response(response, None).unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[test]
    fn test_bool_reflects_success_status() {
        assert!(bool::from_response(HttpResponse::new(204), None).unwrap());
        assert!(!bool::from_response(HttpResponse::new(404), None).unwrap());
    }

    #[test]
    fn test_absent_optional_body_is_empty() {
        let body: Option<String> = None;
        assert!(body.into_request_body().unwrap().is_empty());
    }
}
