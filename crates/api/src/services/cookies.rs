//! Session cookie handling.
//!
//! The browser client sends requests with `credentials: include`, so the
//! session token lives in an httpOnly cookie rather than in script-visible
//! storage.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};

use crate::config::SessionConfig;

const COOKIE_PATH: &str = "/";

/// Builds and reads the session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    name: String,
    secure: bool,
    same_site: String,
    domain: String,
    max_age_secs: i64,
}

impl SessionCookies {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.cookie_secure,
            same_site: config.cookie_same_site.clone(),
            domain: config.cookie_domain.clone(),
            max_age_secs: config.expiry_secs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set-Cookie value carrying a freshly issued token.
    pub fn build_session_cookie(&self, token: &str) -> String {
        let cookie = format!(
            "{}={}; Path={}; Max-Age={}",
            self.name, token, COOKIE_PATH, self.max_age_secs
        );
        self.with_attributes(cookie)
    }

    /// Set-Cookie value that removes the session cookie.
    pub fn build_clear_cookie(&self) -> String {
        let cookie = format!(
            "{}=; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name, COOKIE_PATH
        );
        self.with_attributes(cookie)
    }

    pub fn add_session_cookie(&self, headers: &mut HeaderMap, token: &str) {
        if let Ok(value) = HeaderValue::from_str(&self.build_session_cookie(token)) {
            headers.append(SET_COOKIE, value);
        }
    }

    pub fn add_clear_cookie(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.build_clear_cookie()) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// Session token from the request's Cookie header.
    pub fn extract_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        extract_cookie(headers, &self.name).filter(|token| !token.is_empty())
    }

    fn with_attributes(&self, mut cookie: String) -> String {
        cookie.push_str("; HttpOnly");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site));
        if !self.domain.is_empty() {
            cookie.push_str(&format!("; Domain={}", self.domain));
        }
        cookie
    }
}

/// Extract a cookie value from request headers by name.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookie_header| cookie_header.split(';'))
        .map(str::trim)
        .find_map(|cookie| {
            let (cookie_name, cookie_value) = cookie.split_once('=')?;
            (cookie_name == name).then_some(cookie_value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookies(secure: bool, domain: &str) -> SessionCookies {
        SessionCookies {
            name: "rewear_session".to_string(),
            secure,
            same_site: "Lax".to_string(),
            domain: domain.to_string(),
            max_age_secs: 86400,
        }
    }

    #[test]
    fn test_build_session_cookie() {
        let cookie = cookies(true, "").build_session_cookie("abc.def.ghi");

        assert!(cookie.starts_with("rewear_session=abc.def.ghi; Path=/; Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Domain="));
    }

    #[test]
    fn test_insecure_cookie_with_domain() {
        let cookie = cookies(false, "rewear.kr").build_session_cookie("t");
        assert!(!cookie.contains("Secure"));
        assert!(cookie.ends_with("; Domain=rewear.kr"));
    }

    #[test]
    fn test_build_clear_cookie() {
        let cookie = cookies(true, "").build_clear_cookie();
        assert!(cookie.starts_with("rewear_session=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_add_session_cookie_appends_header() {
        let mut headers = HeaderMap::new();
        cookies(true, "").add_session_cookie(&mut headers, "token");
        cookies(true, "").add_clear_cookie(&mut headers);
        assert_eq!(headers.get_all(SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; rewear_session=tok123; lang=ko"),
        );
        assert_eq!(extract_cookie(&headers, "rewear_session"), Some("tok123"));
        assert_eq!(extract_cookie(&headers, "lang"), Some("ko"));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_token_ignores_cleared_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("rewear_session="));
        assert_eq!(cookies(true, "").extract_token(&headers), None);
    }

    #[test]
    fn test_extract_without_cookie_header() {
        assert_eq!(extract_cookie(&HeaderMap::new(), "rewear_session"), None);
    }
}
