//! Thin JSON-over-HTTP(S) client shared by every upstream collaborator.

use crate::error::FetchError;
use crate::tls::get_shared_tls_config;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{
    ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, LOCATION, SET_COOKIE, USER_AGENT,
};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Redirect hops followed for one request before giving up.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    user_agent: HeaderValue,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let tls = get_shared_tls_config().map_err(|e| FetchError::Tls(e.to_string()))?;
        let connector = HttpsConnectorBuilder::new()
            .with_tls_config((*tls).clone())
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();
        let inner = Client::builder(TokioExecutor::new()).build(connector);
        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| FetchError::Network(format!("invalid user agent: {e}")))?;
        Ok(Self { inner, user_agent })
    }

    /// Sends one request, following 301/302/303/307/308 redirects up to [`MAX_REDIRECTS`].
    ///
    /// 303, and 301/302 answering a POST, continue as a bodiless GET. 307/308 replay the
    /// original method and body.
    #[tracing::instrument(name = "http_send", level = "debug", skip(self, body, headers))]
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
        headers: &[(HeaderName, String)],
    ) -> Result<RawResponse, FetchError> {
        let mut method = method;
        let mut body = body;
        let mut current = url.to_string();
        let mut redirects = 0;
        loop {
            let resp = self
                .send_once(method.clone(), &current, body.clone(), headers)
                .await?;
            if !is_followed_redirect(resp.status) {
                return Ok(resp);
            }
            if redirects >= MAX_REDIRECTS {
                return Err(FetchError::RedirectLimit(MAX_REDIRECTS));
            }
            let location = resp
                .headers
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| FetchError::Http {
                    status: resp.status,
                    context: format!("{current}: redirect without Location header"),
                })?;
            let next = resolve_location(&current, location)?;
            if switches_to_get(resp.status, &method) {
                method = Method::GET;
                body = None;
            }
            debug!(from = %current, to = %next, status = %resp.status, "following redirect");
            current = next;
            redirects += 1;
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
        headers: &[(HeaderName, String)],
    ) -> Result<RawResponse, FetchError> {
        let uri = parse_uri(url)?;
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_AGENT, self.user_agent.clone())
            .header(ACCEPT, "application/json");
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        for (name, value) in headers {
            builder = builder.header(name, value.as_str());
        }
        let req = builder
            .body(Full::new(body.unwrap_or_default()))
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let response = self
            .inner
            .request(req)
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?
            .to_bytes();
        debug!(%url, %status, bytes = body.len(), "response received");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let resp = self.send(Method::GET, url, None, &[]).await?;
        decode_json(url, resp)
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: String,
        headers: &[(HeaderName, String)],
    ) -> Result<T, FetchError> {
        let resp = self
            .send(Method::POST, url, Some(Bytes::from(body)), headers)
            .await?;
        decode_json(url, resp)
    }

    /// Returns the `name=value` part of every `Set-Cookie` header of a GET on `url`.
    pub async fn get_cookies(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let resp = self.send(Method::GET, url, None, &[]).await?;
        Ok(cookie_pairs(&resp.headers))
    }
}

fn parse_uri(url: &str) -> Result<Uri, FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    parsed
        .as_str()
        .parse::<Uri>()
        .map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn switches_to_get(status: StatusCode, method: &Method) -> bool {
    match status {
        StatusCode::SEE_OTHER => *method != Method::HEAD,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => *method == Method::POST,
        _ => false,
    }
}

/// Resolves a `Location` value, absolute or relative, against the URL that returned it.
fn resolve_location(current: &str, location: &str) -> Result<String, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: location.to_string(),
        reason,
    };
    let base = url::Url::parse(current).map_err(|e| invalid(e.to_string()))?;
    let next = base.join(location).map_err(|e| invalid(e.to_string()))?;
    Ok(next.into())
}

fn decode_json<T: DeserializeOwned>(url: &str, resp: RawResponse) -> Result<T, FetchError> {
    if !resp.status.is_success() {
        return Err(FetchError::Http {
            status: resp.status,
            context: url.to_string(),
        });
    }
    serde_json::from_slice(&resp.body).map_err(|e| FetchError::Json(format!("{url}: {e}")))
}

pub(crate) fn cookie_pairs(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|c| c.split(';').next())
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_pairs_strip_attributes() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("XSRF-TOKEN=abc%3D; Path=/; Secure"),
        );
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("session=xyz; HttpOnly"),
        );
        assert_eq!(
            cookie_pairs(&headers),
            vec!["XSRF-TOKEN=abc%3D".to_string(), "session=xyz".to_string()]
        );
    }

    #[test]
    fn rejects_relative_url() {
        assert!(matches!(
            parse_uri("/nodeinfo/2.1.json"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn relative_location_resolves_against_current_url() {
        assert_eq!(
            resolve_location("https://a.example/nodeinfo/2.1.json", "/real/nodeinfo.json").unwrap(),
            "https://a.example/real/nodeinfo.json"
        );
        assert_eq!(
            resolve_location("https://a.example/api/info", "https://b.example/api/info").unwrap(),
            "https://b.example/api/info"
        );
        assert_eq!(
            resolve_location("https://a.example/api/info", "instance").unwrap(),
            "https://a.example/api/instance"
        );
    }

    #[test]
    fn only_standard_redirects_are_followed() {
        assert!(is_followed_redirect(StatusCode::MOVED_PERMANENTLY));
        assert!(is_followed_redirect(StatusCode::PERMANENT_REDIRECT));
        assert!(!is_followed_redirect(StatusCode::NOT_MODIFIED));
        assert!(!is_followed_redirect(StatusCode::MULTIPLE_CHOICES));
        assert!(!is_followed_redirect(StatusCode::OK));
    }

    #[test]
    fn post_becomes_get_except_on_307_and_308() {
        assert!(switches_to_get(StatusCode::MOVED_PERMANENTLY, &Method::POST));
        assert!(switches_to_get(StatusCode::FOUND, &Method::POST));
        assert!(switches_to_get(StatusCode::SEE_OTHER, &Method::POST));
        assert!(!switches_to_get(StatusCode::TEMPORARY_REDIRECT, &Method::POST));
        assert!(!switches_to_get(StatusCode::PERMANENT_REDIRECT, &Method::POST));
        assert!(!switches_to_get(StatusCode::MOVED_PERMANENTLY, &Method::GET));
    }

    #[test]
    fn non_success_status_is_http_error() {
        let resp = RawResponse {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"{}"),
        };
        let err = decode_json::<serde_json::Value>("https://a.example/api/info", resp)
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Http {
                status: StatusCode::NOT_FOUND,
                ..
            }
        ));
    }
}
