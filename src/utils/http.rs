// src/utils/http.rs

//! HTTP client utilities.

use url::Url;

use crate::error::Result;
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
///
/// The timeout bounds every request made through it, connect included.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .build()?;
    Ok(client)
}

/// Join a relative API path onto a base URL.
///
/// The base is treated as a directory, so `https://host/prefix` and
/// `https://host/prefix/` give the same result.
pub fn endpoint(base: &str, path: &str) -> Result<Url> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    // A leading "./" stops a segment like "bot123:abc" from parsing as a scheme
    Ok(base.join(&format!("./{}", path.trim_start_matches('/')))?)
}

/// Read the body of a failed response for an error message.
///
/// Falls back to the status reason when the body cannot be read.
pub async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        _ => status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
    }
}
