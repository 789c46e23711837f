//! Absolute redirect targets on the request's own origin.

use axum::http::{header, uri::Authority, HeaderMap};
use url::Url;

pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Login, signup and home paths.
#[derive(Debug, Clone)]
pub struct EntryPoints {
    pub login: String,
    pub signup: String,
    pub home: String,
}

/// Origin the client used: `X-Forwarded-Proto` (default `http`) plus `Host`.
///
/// HTTP/2 clients send `:authority` instead of a Host header; that arrives as
/// the request URI's authority and is used when Host is absent. Falls back to
/// `fallback` when neither is present or usable.
pub fn request_origin(headers: &HeaderMap, authority: Option<&Authority>, fallback: &Url) -> Url {
    let scheme = headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|p| p.eq_ignore_ascii_case("https"))
        .map_or("http", |_| "https");

    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|host| !host.is_empty())
        .or_else(|| authority.map(Authority::as_str))
        .and_then(|host| Url::parse(&format!("{scheme}://{host}/")).ok())
        // Reject hosts that smuggle userinfo or a path into the authority.
        .filter(|url| url.username().is_empty() && url.password().is_none() && url.path() == "/")
        .unwrap_or_else(|| fallback.clone())
}

/// `origin` with its path replaced by `path` and no query.
pub fn location(origin: &Url, path: &str) -> Url {
    let mut url = origin.clone();
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Login location carrying `redirect=<return_to>`.
pub fn login_location(origin: &Url, login_path: &str, return_to: &str) -> Url {
    let mut url = location(origin, login_path);
    url.query_pairs_mut().append_pair("redirect", return_to);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn fallback() -> Url {
        Url::parse("http://localhost:3000").unwrap()
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_origin_from_host() {
        let origin = request_origin(&headers(&[("host", "dash.example.com:8080")]), None, &fallback());
        assert_eq!(origin.as_str(), "http://dash.example.com:8080/");
    }

    #[test]
    fn test_origin_honours_forwarded_proto() {
        let origin = request_origin(
            &headers(&[("host", "dash.example.com"), ("x-forwarded-proto", "https")]),
            None,
            &fallback(),
        );
        assert_eq!(origin.as_str(), "https://dash.example.com/");
    }

    #[test]
    fn test_origin_from_uri_authority_without_host() {
        let authority: Authority = "dash.example.com:8443".parse().unwrap();
        let origin = request_origin(
            &headers(&[("x-forwarded-proto", "https")]),
            Some(&authority),
            &fallback(),
        );
        assert_eq!(origin.as_str(), "https://dash.example.com:8443/");

        // Host still wins when both are present.
        let origin = request_origin(&headers(&[("host", "dash.local")]), Some(&authority), &fallback());
        assert_eq!(origin.as_str(), "http://dash.local/");
    }

    #[test]
    fn test_origin_falls_back() {
        assert_eq!(request_origin(&HeaderMap::new(), None, &fallback()), fallback());
        assert_eq!(
            request_origin(&headers(&[("host", "evil.com/steal")]), None, &fallback()),
            fallback()
        );
        assert_eq!(
            request_origin(&headers(&[("host", "user@evil.com")]), None, &fallback()),
            fallback()
        );
        let smuggled: Authority = "user@evil.com".parse().unwrap();
        assert_eq!(
            request_origin(&HeaderMap::new(), Some(&smuggled), &fallback()),
            fallback()
        );
    }

    #[test]
    fn test_login_location_encodes_return_path() {
        let origin = Url::parse("http://localhost:3000/").unwrap();
        let url = login_location(&origin, "/login", "/dashboard");
        assert_eq!(url.as_str(), "http://localhost:3000/login?redirect=%2Fdashboard");

        let url = login_location(&origin, "/login", "/products/12 a");
        assert_eq!(url.as_str(), "http://localhost:3000/login?redirect=%2Fproducts%2F12+a");
    }

    #[test]
    fn test_location_replaces_path() {
        let origin = Url::parse("http://localhost:3000/").unwrap();
        assert_eq!(location(&origin, "/").as_str(), "http://localhost:3000/");
    }
}
