//! HTTP requests and responses as plain data.
//!
//! # Design
//! The client builds `HttpRequest` values and classifies `HttpResponse`
//! values without touching the network. Only a `Transport` performs I/O,
//! which keeps URL formation, header merging and status handling
//! deterministic and testable against canned responses.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data. The body is kept as raw bytes
/// because download responses carry ZIP archives rather than JSON.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Join `base_url` and `path` with exactly one `/` between them.
pub fn form_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Caller headers first, then authentication headers on top. A caller header
/// whose name matches an authentication header (ignoring case) is replaced.
pub fn merge_headers(
    caller: Option<Vec<(String, String)>>,
    auth: Vec<(String, String)>,
) -> Vec<(String, String)> {
    let mut merged = caller.unwrap_or_default();
    for (name, value) in auth {
        merged.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        merged.push((name, value));
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn form_url_adds_separator_when_missing() {
        assert_eq!(
            form_url("https://bailo.example/api/v1", "model/summary"),
            "https://bailo.example/api/v1/model/summary"
        );
    }

    #[test]
    fn form_url_keeps_single_separator_when_present() {
        assert_eq!(
            form_url("https://bailo.example/api/v1", "/model/summary"),
            "https://bailo.example/api/v1/model/summary"
        );
    }

    #[test]
    fn form_url_never_doubles_separator() {
        for base in ["http://h/api", "http://h/api/"] {
            for path in ["x", "/x", "//x"] {
                let url = form_url(base, path);
                assert_eq!(url, "http://h/api/x", "{base} + {path}");
                assert!(!url["http://".len()..].contains("//"));
            }
        }
    }

    #[test]
    fn merge_without_caller_headers_is_auth_only() {
        let auth = pairs(&[("Authorization", "Bearer t")]);
        assert_eq!(merge_headers(None, auth.clone()), auth);
    }

    #[test]
    fn merge_keeps_caller_headers_first() {
        let merged = merge_headers(
            Some(pairs(&[("Accept", "application/json")])),
            pairs(&[("Authorization", "Bearer t")]),
        );
        assert_eq!(
            merged,
            pairs(&[("Accept", "application/json"), ("Authorization", "Bearer t")])
        );
    }

    #[test]
    fn merge_auth_wins_on_collision() {
        let merged = merge_headers(
            Some(pairs(&[("authorization", "Bearer forged"), ("X-Trace", "1")])),
            pairs(&[("Authorization", "Bearer real")]),
        );
        assert_eq!(
            merged,
            pairs(&[("X-Trace", "1"), ("Authorization", "Bearer real")])
        );
    }

    #[test]
    fn merge_with_no_auth_headers_passes_caller_through() {
        let caller = pairs(&[("Accept", "*/*")]);
        assert_eq!(merge_headers(Some(caller.clone()), Vec::new()), caller);
    }

    #[test]
    fn success_range_is_2xx_only() {
        let response = |status| HttpResponse {
            status,
            reason: String::new(),
            body: Vec::new(),
        };
        assert!(response(200).is_success());
        assert!(response(299).is_success());
        assert!(!response(199).is_success());
        assert!(!response(300).is_success());
        assert!(!response(401).is_success());
    }
}
