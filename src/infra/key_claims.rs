use base64::prelude::{BASE64_URL_SAFE_NO_PAD, Engine as _};
use reqwest::Url;
use serde::Deserialize;

const HOSTED_SUFFIX: &str = ".supabase.co";
const SERVICE_ROLE: &str = "service_role";

/// Claims carried by a legacy JWT-style project API key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyClaims {
    pub role: Option<String>,
    #[serde(rename = "ref")]
    pub project_ref: Option<String>,
}

/// Reads the payload segment of a JWT key. Opaque keys yield `None`.
pub fn inspect_key(api_key: &str) -> Option<KeyClaims> {
    let mut segments = api_key.trim().split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Project ref from a hosted project URL such as `https://abcd.supabase.co`.
pub fn project_ref_from_url(base_url: &str) -> Option<String> {
    let url = Url::parse(base_url).ok()?;
    url.host_str()?
        .strip_suffix(HOSTED_SUFFIX)
        .filter(|project| !project.is_empty() && !project.contains('.'))
        .map(str::to_string)
}

pub fn key_warnings(base_url: Option<&str>, api_key: &str) -> Vec<String> {
    let Some(claims) = inspect_key(api_key) else {
        return Vec::new();
    };

    let mut warnings = Vec::new();
    if claims.role.as_deref() == Some(SERVICE_ROLE) {
        warnings.push(
            "API key has the service_role role; a public (anon) key is expected".to_string(),
        );
    }
    if let (Some(key_ref), Some(url_ref)) = (
        claims.project_ref.as_deref(),
        base_url.and_then(project_ref_from_url),
    ) {
        if key_ref != url_ref {
            warnings.push(format!(
                "API key belongs to project '{key_ref}' but the backend URL points at '{url_ref}'"
            ));
        }
    }
    warnings
}
