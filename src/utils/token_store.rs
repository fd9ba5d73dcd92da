use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures_util::future::LocalBoxFuture;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;
use uuid::Uuid;

/// Session behind an issued mobile device token.
#[derive(Debug, Clone)]
pub struct MobileSession {
    pub user_id: String,
    pub username: String,
    pub employee_id: String,
}

/// In-process store of issued mobile device tokens. Single-process
/// deployment only; horizontal scaling needs a shared session table instead.
static MOBILE_TOKENS: Lazy<Cache<String, MobileSession>> = Lazy::new(|| {
    let ttl: u64 = std::env::var("MOBILE_TOKEN_TTL")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(43_200); // 12h

    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(ttl))
        .build()
});

/// Issues a fresh device token for the session and returns it.
pub async fn issue(session: MobileSession) -> String {
    let token = Uuid::new_v4().to_string();
    MOBILE_TOKENS.insert(token.clone(), session).await;
    token
}

pub async fn validate(token: &str) -> Option<MobileSession> {
    MOBILE_TOKENS.get(token).await
}

pub async fn revoke(token: &str) {
    MOBILE_TOKENS.invalidate(token).await;
}

/// Extractor for field-work endpoints: authenticates via the
/// `X-Device-Token` header against the in-process token store.
pub struct MobileUser {
    pub session: MobileSession,
}

impl FromRequest for MobileUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("X-Device-Token")
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let token = token.ok_or_else(|| ErrorUnauthorized("Missing device token"))?;

            match validate(&token).await {
                Some(session) => Ok(MobileUser { session }),
                None => Err(ErrorUnauthorized("Invalid or expired device token")),
            }
        })
    }
}
