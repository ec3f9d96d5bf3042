//! Off-chain token metadata upload

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use crate::shared::errors::ClientError;
use crate::shared::types::CreateTokenMetadata;

/// Response of the upload endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataUploadResponse {
    #[serde(rename = "metadataUri")]
    pub metadata_uri: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Uploads token images and metadata, yielding the URI passed to `create`
pub struct TokenMetadataUploader {
    client: reqwest::Client,
    upload_url: String,
}

impl TokenMetadataUploader {
    pub fn new(upload_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url,
        }
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    pub async fn upload(
        &self,
        metadata: &CreateTokenMetadata,
    ) -> Result<MetadataUploadResponse, ClientError> {
        let file = Part::bytes(metadata.file.clone()).file_name(metadata.file_name.clone());
        let form = Form::new()
            .part("file", file)
            .text("name", metadata.name.clone())
            .text("symbol", metadata.symbol.clone())
            .text("description", metadata.description.clone())
            .text("twitter", metadata.twitter.clone().unwrap_or_default())
            .text("telegram", metadata.telegram.clone().unwrap_or_default())
            .text("website", metadata.website.clone().unwrap_or_default())
            .text("showName", "true");

        debug!("Uploading metadata for {} to {}", metadata.symbol, self.upload_url);
        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::MetadataUpload(format!(
                "upload endpoint returned {}: {}",
                status, body
            )));
        }

        let uploaded: MetadataUploadResponse = response
            .json()
            .await
            .map_err(|e| ClientError::MetadataUpload(format!("invalid response: {}", e)))?;
        info!("📝 Metadata uploaded: {}", uploaded.metadata_uri);
        Ok(uploaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> CreateTokenMetadata {
        CreateTokenMetadata {
            name: "Test Token".to_string(),
            symbol: "TST".to_string(),
            description: "A test token".to_string(),
            file_name: "logo.png".to_string(),
            file: vec![0x89, 0x50, 0x4e, 0x47],
            twitter: Some("https://x.com/test".to_string()),
            telegram: None,
            website: None,
        }
    }

    #[tokio::test]
    async fn test_upload_returns_metadata_uri() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/ipfs")
            .match_header(
                "content-type",
                mockito::Matcher::Regex("multipart/form-data.*".to_string()),
            )
            .match_body(mockito::Matcher::Regex("name=\"showName\"".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"metadataUri":"https://ipfs.io/ipfs/Qm123","metadata":{"name":"Test Token","symbol":"TST"}}"#)
            .create_async()
            .await;

        let uploader = TokenMetadataUploader::new(format!("{}/api/ipfs", server.url()));
        let response = uploader.upload(&metadata()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.metadata_uri, "https://ipfs.io/ipfs/Qm123");
        assert_eq!(response.metadata["symbol"], "TST");
    }

    #[tokio::test]
    async fn test_upload_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/ipfs")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let uploader = TokenMetadataUploader::new(format!("{}/api/ipfs", server.url()));
        let result = uploader.upload(&metadata()).await;

        assert!(matches!(result, Err(ClientError::MetadataUpload(msg)) if msg.contains("500")));
    }
}
