//! Caller identity extractors.
//!
//! Authentication happens upstream; the gateway forwards the caller's id in
//! a `User-Id` or `Manager-Id` header. A missing or malformed header yields
//! `401 Unauthorized`.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use tracing::debug;

use crate::domain::{Error, ManagerId, UserId};

/// Header carrying the calling user's id.
pub const USER_ID_HEADER: &str = "User-Id";
/// Header carrying the calling manager's id.
pub const MANAGER_ID_HEADER: &str = "Manager-Id";

fn header_id<T: std::str::FromStr>(req: &HttpRequest, header: &'static str) -> Result<T, Error> {
    let raw = req
        .headers()
        .get(header)
        .ok_or_else(|| Error::unauthorized(format!("missing {header} header")))?;
    raw.to_str()
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .ok_or_else(|| {
            debug!(header, "rejecting malformed caller id header");
            Error::unauthorized(format!("{header} header must be a positive integer"))
        })
}

/// The authenticated end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallingUser(pub UserId);

impl FromRequest for CallingUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(header_id(req, USER_ID_HEADER).map(Self))
    }
}

/// The authenticated brand manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallingManager(pub ManagerId);

impl FromRequest for CallingManager {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(header_id(req, MANAGER_ID_HEADER).map(Self))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[actix_web::test]
    async fn user_header_is_parsed() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "42"))
            .to_http_request();

        let CallingUser(id) = CallingUser::extract(&req).await.expect("valid header");
        assert_eq!(id.get(), 42);
    }

    #[rstest]
    #[case::missing(None)]
    #[case::zero(Some("0"))]
    #[case::negative(Some("-3"))]
    #[case::text(Some("abc"))]
    #[actix_web::test]
    async fn bad_manager_header_is_unauthorized(#[case] value: Option<&'static str>) {
        let mut req = TestRequest::default();
        if let Some(value) = value {
            req = req.insert_header((MANAGER_ID_HEADER, value));
        }

        let error = CallingManager::extract(&req.to_http_request())
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[actix_web::test]
    async fn user_header_does_not_identify_a_manager() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "42"))
            .to_http_request();

        assert!(CallingManager::extract(&req).await.is_err());
    }
}
