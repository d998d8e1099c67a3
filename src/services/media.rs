use crate::{config::MediaConfig, errors::ServiceError};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tracing::instrument;
use utoipa::ToSchema;

type HmacSha256 = Hmac<Sha256>;

/// A presigned URL for one object-storage operation.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SignedUrl {
    pub url: String,
    /// Unix timestamp after which the signature is rejected.
    pub expires_at: i64,
}

/// Signed access to the object store holding product and collection
/// images. Signatures are HMAC-SHA256 over `method\npath\nexpiry`,
/// hex-encoded and carried as query parameters.
#[derive(Clone)]
pub struct MediaService {
    config: MediaConfig,
    client: reqwest::Client,
}

impl MediaService {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Presigned URL allowing one upload of `path`.
    #[instrument(skip(self))]
    pub fn upload_url(&self, path: &str) -> Result<SignedUrl, ServiceError> {
        self.signed_url("PUT", path)
    }

    /// Presigned URL allowing reads of `path`.
    #[instrument(skip(self))]
    pub fn download_url(&self, path: &str) -> Result<SignedUrl, ServiceError> {
        self.signed_url("GET", path)
    }

    fn signed_url(&self, method: &str, path: &str) -> Result<SignedUrl, ServiceError> {
        let path = normalize_path(path)?;
        let expires_at = Utc::now().timestamp() + self.config.url_ttl_secs as i64;
        let signature = self.sign(method, &path, expires_at)?;

        Ok(SignedUrl {
            url: format!(
                "{}{}?expires={}&signature={}",
                self.config.base_url.trim_end_matches('/'),
                path,
                expires_at,
                signature
            ),
            expires_at,
        })
    }

    fn sign(&self, method: &str, path: &str, expires_at: i64) -> Result<String, ServiceError> {
        let mut mac = HmacSha256::new_from_slice(self.config.signing_secret.as_bytes())
            .map_err(|e| ServiceError::InternalError(format!("Bad signing key: {}", e)))?;
        mac.update(format!("{}\n{}\n{}", method, path, expires_at).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Checks a signature produced by [`sign`](Self::sign); expired or
    /// tampered URLs fail.
    pub fn verify(
        &self,
        method: &str,
        path: &str,
        expires_at: i64,
        signature: &str,
    ) -> Result<(), ServiceError> {
        if Utc::now().timestamp() > expires_at {
            return Err(ServiceError::ValidationError(
                "Signed URL has expired".to_string(),
            ));
        }

        let mut mac = HmacSha256::new_from_slice(self.config.signing_secret.as_bytes())
            .map_err(|e| ServiceError::InternalError(format!("Bad signing key: {}", e)))?;
        mac.update(format!("{}\n{}\n{}", method, path, expires_at).as_bytes());

        let expected = hex::decode(signature)
            .map_err(|_| ServiceError::ValidationError("Malformed signature".to_string()))?;
        mac.verify_slice(&expected)
            .map_err(|_| ServiceError::ValidationError("Invalid signature".to_string()))
    }

    /// Uploads bytes through a previously issued presigned URL.
    #[instrument(skip(self, body))]
    pub async fn upload(
        &self,
        signed: &SignedUrl,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), ServiceError> {
        let response = self
            .client
            .put(&signed.url)
            .header(http::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("Upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "Upload rejected with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

fn normalize_path(path: &str) -> Result<String, ServiceError> {
    if path.is_empty() || path.contains("..") {
        return Err(ServiceError::InvalidInput(
            "Invalid object path".to_string(),
        ));
    }
    Ok(if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> MediaService {
        MediaService::new(MediaConfig {
            base_url: "https://media.example.com".to_string(),
            signing_secret: "0123456789abcdef0123456789abcdef".to_string(),
            url_ttl_secs: 900,
        })
    }

    #[test]
    fn signed_url_round_trips_verification() {
        let service = service();
        let signed = service.upload_url("products/abc.jpg").unwrap();

        let query = signed.url.split('?').nth(1).unwrap();
        let signature = query
            .split('&')
            .find_map(|p| p.strip_prefix("signature="))
            .unwrap();

        service
            .verify("PUT", "/products/abc.jpg", signed.expires_at, signature)
            .unwrap();
    }

    #[test]
    fn verification_rejects_wrong_method() {
        let service = service();
        let signed = service.upload_url("products/abc.jpg").unwrap();
        let signature = signed
            .url
            .split('&')
            .find_map(|p| p.strip_prefix("signature="))
            .unwrap();

        assert!(service
            .verify("GET", "/products/abc.jpg", signed.expires_at, signature)
            .is_err());
    }

    #[test]
    fn verification_rejects_expired_url() {
        let service = service();
        let expired = Utc::now().timestamp() - 10;
        let signature = service.sign("GET", "/products/abc.jpg", expired).unwrap();

        assert!(service
            .verify("GET", "/products/abc.jpg", expired, &signature)
            .is_err());
    }

    #[test]
    fn path_traversal_is_rejected() {
        assert!(service().upload_url("../etc/passwd").is_err());
    }
}
