use crate::signing::{sign_params, SIGNATURE_ALGORITHM};
use crate::traits::{
    LookupError, LookupResult, UploadContent, UploadError, UploadGateway, UploadedAsset,
};
use assetkit_core::{CloudinaryConfig, ConfigError, DeliveryType, ResourceType};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    version: u64,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct ExplicitResponse {
    secure_url: String,
}

/// HTTP gateway to a Cloudinary-compatible asset store
#[derive(Clone)]
pub struct CloudinaryGateway {
    client: Client,
    config: CloudinaryConfig,
}

impl Debug for CloudinaryGateway {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CloudinaryGateway")
            .field("config", &self.config)
            .finish()
    }
}

impl CloudinaryGateway {
    pub fn new(config: CloudinaryConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ConfigError::invalid("CLOUDINARY", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// `{api_base}/v1_1/{cloud}/{resource_type}/{action}`
    fn endpoint(&self, resource_type: ResourceType, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.api_base_url, self.config.cloud_name, resource_type, action
        )
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    /// Append `api_key`, `signature` and `signature_algorithm` to signed params.
    fn signed(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        let signature = sign_params(&params, &self.config.api_secret);
        params.push(("api_key", self.config.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", SIGNATURE_ALGORITHM.to_string()));
        params
    }
}

/// Pull the message out of an `{"error":{"message":"..."}}` body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|message| message.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "Unknown error".to_string()
            } else {
                trimmed.chars().take(500).collect()
            }
        })
}

#[async_trait]
impl UploadGateway for CloudinaryGateway {
    #[tracing::instrument(
        skip(self, content),
        fields(size_bytes = content.len(), resource_type = %resource_type)
    )]
    async fn upload(
        &self,
        content: UploadContent,
        folder: &str,
        resource_type: ResourceType,
    ) -> Result<UploadedAsset, UploadError> {
        let url = self.endpoint(resource_type, "upload");
        let start = std::time::Instant::now();

        let mut params = vec![("folder", folder.to_string()), ("timestamp", Self::timestamp())];
        if content.filename.is_some() {
            params.push(("unique_filename", "true".to_string()));
            params.push(("use_filename", "true".to_string()));
        }

        let mut form = Form::new();
        for (name, value) in self.signed(params) {
            form = form.text(name, value);
        }
        let filename = content.filename.unwrap_or_else(|| "upload".to_string());
        form = form.part("file", Part::bytes(content.bytes.to_vec()).file_name(filename));

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, folder = %folder, "Remote upload request failed");
                UploadError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            tracing::error!(
                status = status.as_u16(),
                error = %message,
                folder = %folder,
                "Remote upload rejected"
            );
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        if body.public_id.is_empty() {
            return Err(UploadError::InvalidResponse(
                "empty public_id in upload response".to_string(),
            ));
        }

        tracing::info!(
            folder = %folder,
            public_id = %body.public_id,
            version = body.version,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote upload successful"
        );

        Ok(UploadedAsset {
            version: body.version,
            public_id: body.public_id,
        })
    }

    #[tracing::instrument(skip(self), fields(resource_type = %resource_type))]
    async fn explicit_lookup(
        &self,
        path: &str,
        resource_type: ResourceType,
        delivery_type: DeliveryType,
    ) -> Result<LookupResult, LookupError> {
        let url = self.endpoint(resource_type, "explicit");
        let params = self.signed(vec![
            ("public_id", path.to_string()),
            ("timestamp", Self::timestamp()),
            ("type", delivery_type.to_string()),
        ]);

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(path = %path, "Remote asset not found");
            return Err(LookupError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body: ExplicitResponse = response
            .json()
            .await
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        Ok(LookupResult {
            secure_url: body.secure_url,
        })
    }

    fn delivery_url(&self, versioned_id: &str, resource_type: ResourceType) -> String {
        format!(
            "{}/{}/{}/upload/{}",
            self.config.delivery_base_url,
            self.config.cloud_name,
            resource_type,
            versioned_id.trim_start_matches('/')
        )
    }
}
