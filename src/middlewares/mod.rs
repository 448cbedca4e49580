use actix_web::{http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::{api::error, utils::Claims};

/// Secret used to validate bearer tokens, registered as app data.
pub struct AuthConfig {
    jwt_secret: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self { jwt_secret: jwt_secret.into() }
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn authenticate(req: &HttpRequest) -> Result<Claims, error::Error> {
    let config = req.app_data::<web::Data<AuthConfig>>().ok_or_else(|| {
        log::error!("AuthConfig is not registered");
        error::Error::InternalServer
    })?;

    let token =
        bearer_token(req).ok_or_else(|| error::Error::unauthorized("Missing bearer token"))?;

    Claims::decode(token, config.jwt_secret.as_bytes())
        .map_err(|_| error::Error::unauthorized("Token Invalid or Expired"))
}

/// Caller identity resolved from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
}

impl FromRequest for AuthUser {
    type Error = error::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(authenticate(req).map(|claims| AuthUser { id: claims.sub }))
    }
}
