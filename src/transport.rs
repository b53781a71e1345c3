//! The HTTP session requests are prepared with.

use reqwest::{header::HeaderMap, Method, Url};

/// Turns a request into the headers that would actually go on the wire.
///
/// Nothing is sent; implementations only apply their own normalization.
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn prepare(&self, method: Method, url: Url, headers: HeaderMap)
        -> Result<HeaderMap, Self::Error>;
}

impl Transport for reqwest::Client {
    type Error = reqwest::Error;

    fn prepare(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
    ) -> Result<HeaderMap, Self::Error> {
        let request = self.request(method, url).headers(headers).build()?;
        Ok(request.headers().clone())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, AUTHORIZATION};

    use super::*;

    #[test]
    fn reqwest_keeps_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Custom", HeaderValue::from_static("value"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer ok"));

        let url = Url::parse("https://example.com/me").unwrap();
        let prepared = reqwest::Client::new()
            .prepare(Method::GET, url, headers)
            .unwrap();

        assert_eq!(prepared.get("x-custom").unwrap(), "value");
        assert_eq!(prepared.get("Authorization").unwrap(), "Bearer ok");
    }
}
