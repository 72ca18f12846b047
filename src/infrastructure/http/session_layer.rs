//! Session cookie middleware
//!
//! Reads the `session` cookie, minting a fresh session id when the client
//! has none, and stashes the id in request extensions for handlers. New
//! ids are set on the response so the client keeps its workspace across
//! requests.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::domain::value_objects::SessionId;

pub const SESSION_COOKIE: &str = "session";

pub async fn session_middleware(mut req: Request, next: Next) -> Response {
    let existing = req
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_session_cookie);

    let (session_id, is_new) = match existing {
        Some(id) => (id, false),
        None => (SessionId::new(), true),
    };
    req.extensions_mut().insert(session_id);

    let mut response = next.run(req).await;

    if is_new {
        let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

fn parse_session_cookie(header: &str) -> Option<SessionId> {
    header
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_cookie() {
        let id = SessionId::new();
        let header = format!("theme=dark; {SESSION_COOKIE}={id}; other=1");
        assert_eq!(parse_session_cookie(&header), Some(id));
    }

    #[test]
    fn test_parse_ignores_invalid_ids() {
        assert_eq!(parse_session_cookie("session=deadbeef"), None);
        assert_eq!(parse_session_cookie("theme=dark"), None);
    }
}
