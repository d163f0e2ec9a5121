//! Upload of encoded captures to the CapYap host

use crossbeam_channel::{unbounded, Receiver, Sender};
use image::RgbaImage;
use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server rejected upload ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected server response: {0}")]
    InvalidResponse(String),
}

/// Compression hints passed to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    pub quality: i32,
    pub level: i32,
}

pub trait Uploader: Send + Sync {
    /// Upload an encoded capture, returning the share URL
    fn upload(
        &self,
        file_name: &str,
        data: &[u8],
        options: UploadOptions,
    ) -> Result<String, UploadError>;
}

/// MIME type for an encoded capture, from its extension
pub fn content_type(file_name: &str) -> &'static str {
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
    #[serde(default)]
    code: Option<u16>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Turn a status code and body into a share URL or an error
pub fn parse_upload_response(status: u16, body: &str) -> Result<String, UploadError> {
    if (200..300).contains(&status) {
        let response: UploadResponse = serde_json::from_str(body)
            .map_err(|_| UploadError::InvalidResponse(body.trim().to_string()))?;
        if response.url.is_empty() {
            return Err(UploadError::InvalidResponse("empty url".into()));
        }
        return Ok(response.url);
    }

    let error = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(error) => UploadError::Server {
            status: error.code.unwrap_or(status),
            message: match error.kind {
                Some(kind) => format!("{} ({kind})", error.message),
                None => error.message,
            },
        },
        Err(_) => UploadError::Server {
            status,
            message: body.trim().to_string(),
        },
    };

    Err(error)
}

/// Multipart POST to `{api_host}/api/upload`
pub struct HttpUploader {
    client: Client,
    api_host: String,
    upload_key: Option<String>,
}

impl HttpUploader {
    pub fn new(api_host: &str, upload_key: Option<String>) -> Result<Self, UploadError> {
        let client = Client::builder()
            .user_agent(concat!("capyap/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_host: api_host.trim_end_matches('/').to_string(),
            upload_key,
        })
    }

    pub fn endpoint(&self, options: UploadOptions) -> String {
        format!(
            "{}/api/upload?quality={}&level={}",
            self.api_host, options.quality, options.level
        )
    }
}

impl Uploader for HttpUploader {
    fn upload(
        &self,
        file_name: &str,
        data: &[u8],
        options: UploadOptions,
    ) -> Result<String, UploadError> {
        let part = multipart::Part::bytes(data.to_vec())
            .file_name(file_name.to_string())
            .mime_str(content_type(file_name))?;
        let form = multipart::Form::new().part("file", part);

        let mut request = self.client.post(self.endpoint(options)).multipart(form);
        if let Some(key) = &self.upload_key {
            request = request.bearer_auth(key);
        }

        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        tracing::debug!(status, "upload response received");

        parse_upload_response(status, &body)
    }
}

/// One capture waiting for upload
pub struct UploadRequest {
    pub ticket: Uuid,
    /// Where the capture was written; later captures reuse it
    pub path: PathBuf,
    /// Encoded file contents read back when the request was built
    pub data: Vec<u8>,
    pub options: UploadOptions,
    /// Cropped pixels, handed back for the clipboard fallback
    pub image: RgbaImage,
}

pub struct UploadReport {
    pub ticket: Uuid,
    pub image: RgbaImage,
    pub result: Result<String, UploadError>,
}

/// Runs each upload on its own short-lived thread and reports back over a
/// channel, waking the UI thread through `notify`
pub struct UploadDispatcher {
    uploader: Arc<dyn Uploader>,
    sender: Sender<UploadReport>,
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl UploadDispatcher {
    pub fn new(
        uploader: Arc<dyn Uploader>,
        notify: impl Fn() + Send + Sync + 'static,
    ) -> (Self, Receiver<UploadReport>) {
        let (sender, receiver) = unbounded();
        let dispatcher = Self {
            uploader,
            sender,
            notify: Arc::new(notify),
        };
        (dispatcher, receiver)
    }

    pub fn set_uploader(&mut self, uploader: Arc<dyn Uploader>) {
        self.uploader = uploader;
    }

    pub fn dispatch(&self, request: UploadRequest) -> std::io::Result<()> {
        let uploader = self.uploader.clone();
        let sender = self.sender.clone();
        let notify = self.notify.clone();

        thread::Builder::new()
            .name("upload".into())
            .spawn(move || {
                let file_name = request
                    .path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "screenshot".to_string());
                tracing::info!(%file_name, bytes = request.data.len(), "uploading screen capture");
                let result = uploader.upload(&file_name, &request.data, request.options);
                match &result {
                    Ok(url) => tracing::info!(%url, "screen capture uploaded"),
                    Err(e) => tracing::error!("failed to upload screen capture: {e}"),
                }

                let report = UploadReport {
                    ticket: request.ticket,
                    image: request.image,
                    result,
                };
                if sender.send(report).is_ok() {
                    notify();
                }
            })?;

        Ok(())
    }
}
