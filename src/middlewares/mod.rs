use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    Error, HttpMessage, HttpRequest,
};
use uuid::Uuid;

use crate::api::error;

/// Verified caller identity. The upstream gateway authenticates the request
/// and forwards the subject in `X-User-Id`; nothing in this service checks
/// credentials itself.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
}

pub async fn identity<B>(req: ServiceRequest, next: Next<B>) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let header = req.headers().get("X-User-Id").and_then(|h| h.to_str().ok());

    let user_id = match header.and_then(|v| Uuid::parse_str(v).ok()) {
        Some(id) => id,
        None => {
            return Err(error::Error::unauthorized("Missing or malformed caller identity").into());
        }
    };

    req.extensions_mut().insert(Identity { user_id });

    next.call(req).await
}

pub fn get_identity(req: &HttpRequest) -> Result<Identity, error::Error> {
    let extensions = req.extensions();

    let identity = extensions
        .get::<Identity>()
        .copied()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?;

    Ok(identity)
}
