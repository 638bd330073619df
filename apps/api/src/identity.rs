use axum::http::HeaderMap;
use uuid::Uuid;

/// Header installed by the fronting auth gateway for signed-in users.
///
/// Session verification itself happens upstream; this API only consumes the
/// resolved user id.
const USER_ID_HEADER: &str = "x-itinero-user-id";

/// Resolved caller identity used as the rate limit key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// Signed-in user, keyed by user id.
    Authenticated(Uuid),
    /// Anonymous caller, keyed by network address.
    Guest(String),
}

impl Caller {
    /// Resolves the caller: authenticated user id when the gateway header is
    /// present and valid, otherwise the forwarded client address.
    #[must_use]
    pub fn resolve(headers: &HeaderMap) -> Self {
        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok());

        match user_id {
            Some(user_id) => Self::Authenticated(user_id),
            None => Self::Guest(client_ip(headers)),
        }
    }

    /// Returns the rate limit identifier for this caller.
    #[must_use]
    pub fn identifier(&self) -> String {
        match self {
            Self::Authenticated(user_id) => user_id.to_string(),
            Self::Guest(address) => address.clone(),
        }
    }

    /// Whether the caller gets the authenticated rate limit tier.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Best-effort client address resolution; hosting providers disagree on the
/// forwarding header.
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_owned();
            }
        }
    }

    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        return real_ip.to_owned();
    }

    if let Some(cf_ip) = header_str(headers, "cf-connecting-ip") {
        return cf_ip.to_owned();
    }

    "unknown".to_owned()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
