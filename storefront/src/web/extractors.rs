// storefront/src/web/extractors.rs

use crate::errors::AppError;
use crate::models::{Actor, Role};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// The caller's identity, asserted by an upstream authentication layer through headers.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
  pub role: Role,
}

impl AuthenticatedUser {
  pub fn actor(&self) -> Actor {
    Actor {
      user_id: self.user_id,
      role: self.role,
    }
  }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
  req.headers().get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

fn extract(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let user_id = header(req, USER_ID_HEADER)
    .and_then(|raw| Uuid::parse_str(raw).ok())
    .ok_or_else(|| {
      warn!("Missing or invalid {} header.", USER_ID_HEADER);
      AppError::Auth(format!("Missing or invalid {} header", USER_ID_HEADER))
    })?;
  let role = match header(req, USER_ROLE_HEADER) {
    None | Some("") => Role::Customer,
    Some(raw) => raw.parse::<Role>().map_err(AppError::Auth)?,
  };
  Ok(AuthenticatedUser { user_id, role })
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(extract(req))
  }
}
