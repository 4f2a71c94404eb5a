//! Image hosting for plant photos and avatars.
//!
//! Pictures never go through the `PlantNet` API: the browser uploads them to
//! a third-party host and sends only the resulting URL.

use std::future::Future;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::ClientError;

/// Default imgbb upload endpoint.
pub const IMGBB_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// A service that stores an image and returns its public URL.
pub trait ImageHost {
    /// Upload `bytes` under `file_name`.
    fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> impl Future<Output = Result<Url, ClientError>> + Send;
}

/// imgbb uploader.
#[derive(Clone)]
pub struct ImgbbUploader {
    client: reqwest::Client,
    endpoint: Url,
    api_key: SecretString,
}

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    display_url: Url,
}

impl ImgbbUploader {
    /// Uploader against the public imgbb endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if the built-in endpoint fails to parse.
    pub fn new(api_key: SecretString) -> Result<Self, ClientError> {
        Ok(Self::with_endpoint(Url::parse(IMGBB_ENDPOINT)?, api_key))
    }

    /// Uploader against a custom endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: Url, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }
}

impl ImageHost for ImgbbUploader {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body)?;
        debug!(url = %parsed.data.display_url, "Image uploaded");
        Ok(parsed.data.display_url)
    }
}
