//! Request paths built from caller-supplied ids.

use reqwest::Url;

use crate::client::error::ClientError;

/// Join `segments` into a `/`-prefixed path, percent-encoding each one.
///
/// `/`, `?`, `#` and `%` inside a segment are escaped, so an id can never
/// leave its position in the path. Empty, `.` and `..` segments are refused
/// since they would address a different resource.
pub fn encode_path(segments: &[&str]) -> Result<String, ClientError> {
    if let Some(bad) = segments
        .iter()
        .find(|s| s.is_empty() || **s == "." || **s == "..")
    {
        return Err(ClientError::InvalidPath(bad.to_string()));
    }

    let mut url = Url::parse("http://localhost/")
        .map_err(|e| ClientError::Configuration(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Configuration("URL cannot take a path".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}
