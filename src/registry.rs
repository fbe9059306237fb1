//! Registry digest resolution
//!
//! Two-step Docker Hub protocol: fetch a pull-scoped bearer token, then walk the
//! tag's manifest list down to the platform manifest and read its config digest —
//! the identity `docker inspect` reports for the running container's image. No
//! image data is pulled and nothing is cached.
//!
//! Transport failures are fatal; missing or unexpected JSON fields degrade to
//! `None`, which the decider treats as "unknown, proceed".

use crate::error::{Result, UpdockError};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

const AUTH_URL: &str = "https://auth.docker.io/token";
const REGISTRY_URL: &str = "https://registry-1.docker.io";

const MANIFEST_LIST_ACCEPT: &str = "application/vnd.docker.distribution.manifest.list.v2+json, \
                                    application/vnd.oci.image.index.v1+json";
const MANIFEST_ACCEPT: &str = "application/vnd.docker.distribution.manifest.v2+json, \
                               application/vnd.oci.image.manifest.v1+json";

/// Auth endpoint response; a missing token degrades to "unknown digest" rather
/// than a parse error.
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

/// A parsed `repository:tag` image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    /// Parse an image reference the way the Docker CLI does for Hub images:
    /// missing tag defaults to `latest`, bare single-name repositories get the
    /// `library/` prefix.
    pub fn parse(image: &str) -> Self {
        let (repo, tag) = match image.rsplit_once(':') {
            // A colon inside a path segment would be a registry port, not a tag.
            Some((repo, tag)) if !tag.contains('/') => (repo, tag),
            _ => (image, "latest"),
        };

        let repository = if repo.contains('/') {
            repo.to_string()
        } else {
            format!("library/{repo}")
        };

        Self {
            repository,
            tag: tag.to_string(),
        }
    }
}

/// Blocking client for the registry's auth and manifest endpoints.
pub struct RegistryClient {
    http: Client,
}

impl RegistryClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("updock/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpdockError::RegistryRequestFailed {
                url: REGISTRY_URL.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { http })
    }

    /// Resolve the config digest of the published image for the target platform,
    /// or `None` when the registry response is missing the fields we need.
    pub fn resolve_config_digest(&self, image: &ImageRef) -> Result<Option<String>> {
        let token = match self.fetch_token(&image.repository)? {
            Some(token) => token,
            None => return Ok(None),
        };

        let list = self.fetch_manifest(image, &image.tag, &token, MANIFEST_LIST_ACCEPT)?;
        let Some(platform_digest) =
            select_platform_digest(&list, target_architecture(), "linux")
        else {
            return Ok(None);
        };

        let manifest = self.fetch_manifest(image, &platform_digest, &token, MANIFEST_ACCEPT)?;
        Ok(extract_config_digest(&manifest))
    }

    fn fetch_token(&self, repository: &str) -> Result<Option<String>> {
        let url = format!(
            "{AUTH_URL}?service=registry.docker.io&scope=repository:{repository}:pull"
        );
        let body: TokenResponse =
            serde_json::from_value(self.get_json(&url, None, None)?).unwrap_or_default();
        Ok(body.token.filter(|t| !t.is_empty()))
    }

    fn fetch_manifest(
        &self,
        image: &ImageRef,
        reference: &str,
        token: &str,
        accept: &str,
    ) -> Result<Value> {
        let url = format!(
            "{REGISTRY_URL}/v2/{}/manifests/{reference}",
            image.repository
        );
        self.get_json(&url, Some(token), Some(accept))
    }

    fn get_json(&self, url: &str, token: Option<&str>, accept: Option<&str>) -> Result<Value> {
        let mut request = self.http.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(accept) = accept {
            request = request.header(reqwest::header::ACCEPT, accept);
        }

        let response = request
            .send()
            .map_err(|e| UpdockError::RegistryRequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdockError::RegistryHttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json()
            .map_err(|e| UpdockError::RegistryRequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Map Rust's architecture names onto the registry's platform names.
fn target_architecture() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "arm" => "arm",
        other => other,
    }
}

/// Pick the manifest digest matching `arch`/`os` out of a manifest list.
fn select_platform_digest(list: &Value, arch: &str, os: &str) -> Option<String> {
    list.get("manifests")?
        .as_array()?
        .iter()
        .find(|entry| {
            let platform = &entry["platform"];
            platform["architecture"].as_str() == Some(arch) && platform["os"].as_str() == Some(os)
        })?
        .get("digest")?
        .as_str()
        .map(str::to_string)
}

/// Read the config (content) digest out of a single platform manifest.
fn extract_config_digest(manifest: &Value) -> Option<String> {
    manifest
        .get("config")?
        .get("digest")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_ref_full() {
        let r = ImageRef::parse("portainer/portainer-ce:latest");
        assert_eq!(r.repository, "portainer/portainer-ce");
        assert_eq!(r.tag, "latest");
    }

    #[test]
    fn test_image_ref_defaults_tag_to_latest() {
        let r = ImageRef::parse("portainer/portainer-ce");
        assert_eq!(r.tag, "latest");
    }

    #[test]
    fn test_image_ref_library_prefix() {
        let r = ImageRef::parse("nginx:1.25");
        assert_eq!(r.repository, "library/nginx");
        assert_eq!(r.tag, "1.25");
    }

    #[test]
    fn test_select_platform_digest() {
        let list = json!({
            "manifests": [
                { "digest": "sha256:armdigest",
                  "platform": { "architecture": "arm64", "os": "linux" } },
                { "digest": "sha256:amddigest",
                  "platform": { "architecture": "amd64", "os": "linux" } },
            ]
        });
        let digest = select_platform_digest(&list, "amd64", "linux");
        assert_eq!(digest.as_deref(), Some("sha256:amddigest"));
    }

    #[test]
    fn test_select_platform_digest_no_match() {
        let list = json!({
            "manifests": [
                { "digest": "sha256:win",
                  "platform": { "architecture": "amd64", "os": "windows" } },
            ]
        });
        assert_eq!(select_platform_digest(&list, "amd64", "linux"), None);
    }

    #[test]
    fn test_select_platform_digest_missing_fields() {
        assert_eq!(select_platform_digest(&json!({}), "amd64", "linux"), None);
        assert_eq!(
            select_platform_digest(&json!({"manifests": "nope"}), "amd64", "linux"),
            None
        );
    }

    #[test]
    fn test_extract_config_digest() {
        let manifest = json!({ "config": { "digest": "sha256:cfg" } });
        assert_eq!(extract_config_digest(&manifest).as_deref(), Some("sha256:cfg"));
    }

    #[test]
    fn test_extract_config_digest_missing() {
        assert_eq!(extract_config_digest(&json!({})), None);
        assert_eq!(extract_config_digest(&json!({"config": {}})), None);
    }
}
