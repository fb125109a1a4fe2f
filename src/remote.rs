//! Access to the booking REST collections.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::TransportError;

/// A JSON collection store reached by path, e.g. `/flights/3`.
///
/// Every method fails with a [`TransportError`] when the request cannot be
/// completed or the server answers with a non-2xx status.
pub trait RemoteCollection {
    fn get(&self, path: &str) -> Result<Value, TransportError>;

    fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError>;

    fn put(&self, path: &str, body: &Value) -> Result<Value, TransportError>;

    fn delete(&self, path: &str) -> Result<(), TransportError>;

    /// Children scoped to one parent: `GET {parent_path}/{id}{child_suffix}`
    fn get_child_of(
        &self,
        parent_path: &str,
        id: i64,
        child_suffix: &str,
    ) -> Result<Value, TransportError> {
        self.get(&format!("{}/{}{}", parent_path, id, child_suffix))
    }
}

impl<T: RemoteCollection + ?Sized> RemoteCollection for &T {
    fn get(&self, path: &str) -> Result<Value, TransportError> {
        (**self).get(path)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).post(path, body)
    }

    fn put(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).put(path, body)
    }

    fn delete(&self, path: &str) -> Result<(), TransportError> {
        (**self).delete(path)
    }

    fn get_child_of(
        &self,
        parent_path: &str,
        id: i64,
        child_suffix: &str,
    ) -> Result<Value, TransportError> {
        (**self).get_child_of(parent_path, id, child_suffix)
    }
}

/// Blocking HTTP client for the booking backend
pub struct HttpRemote {
    base_url: String,
    client: Client,
}

impl HttpRemote {
    /// Creates a client rooted at `base_url`, e.g. `http://localhost:8080/api`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and returns the body text of a 2xx response
    fn send(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<String, TransportError> {
        debug!("{} {}", method, path);
        let response = request.send().map_err(|e| {
            warn!("{} {} failed: {}", method, path, e);
            TransportError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            warn!("{} {} returned {}", method, path, status);
            Err(TransportError::from_status(status.as_u16(), &body))
        }
    }
}

/// Empty bodies (e.g. 204) decode as `null`
fn parse_body(body: &str) -> Result<Value, TransportError> {
    if body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        Ok(serde_json::from_str(body)?)
    }
}

impl RemoteCollection for HttpRemote {
    fn get(&self, path: &str) -> Result<Value, TransportError> {
        let body = self.send("GET", path, self.client.get(self.url(path)))?;
        parse_body(&body)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let body = self.send("POST", path, self.client.post(self.url(path)).json(body))?;
        parse_body(&body)
    }

    fn put(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let body = self.send("PUT", path, self.client.put(self.url(path)).json(body))?;
        parse_body(&body)
    }

    fn delete(&self, path: &str) -> Result<(), TransportError> {
        self.send("DELETE", path, self.client.delete(self.url(path)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let remote = HttpRemote::new("http://localhost:8080/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(remote.base_url(), "http://localhost:8080/api");
        assert_eq!(remote.url("/flights/2"), "http://localhost:8080/api/flights/2");
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_body("  ").unwrap(), Value::Null);
        assert!(matches!(parse_body("{oops"), Err(TransportError::Decode(_))));
    }
}
