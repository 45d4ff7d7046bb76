//! Upload orchestration: stage → name → transfer → public URL.

use chrono::{DateTime, Local};
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::config::DestinationProfile;
use crate::error::DropError;
use crate::naming::content_name;
use crate::staging::stage;
use crate::transfer::{remote_address, remote_path, Transfer};
use crate::verify::{self, Fetcher, SELF_TEST_EXTENSION};

/// Bytes to upload plus the extension hints available for naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    bytes: Vec<u8>,
    original_extension: Option<String>,
    override_extension: Option<String>,
}

impl UploadRequest {
    pub fn new(bytes: Vec<u8>, original_extension: Option<String>) -> Self {
        Self {
            bytes,
            original_extension,
            override_extension: None,
        }
    }

    /// Read a file; its extension (if any) becomes the original extension.
    /// A non-UTF-8 extension is rejected rather than mangled into the URL.
    pub fn from_path(path: &Path) -> Result<Self, DropError> {
        let bytes = fs::read(path).map_err(DropError::Input)?;
        let original_extension = match path.extension() {
            Some(ext) => Some(
                ext.to_str()
                    .ok_or_else(|| DropError::InvalidExtension(ext.to_string_lossy().into_owned()))?
                    .to_string(),
            ),
            None => None,
        };
        Ok(Self::new(bytes, original_extension))
    }

    /// Read an unnamed stream (stdin); there is no original extension.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, DropError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(DropError::Input)?;
        Ok(Self::new(bytes, None))
    }

    /// Override the extension. An empty string means "no extension"; one
    /// leading `.` is ignored.
    pub fn with_extension_override(mut self, extension: Option<String>) -> Self {
        self.override_extension = extension;
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Extension used for the remote name, without the dot. `None` when the
    /// name should be the bare hash stem.
    pub fn extension(&self) -> Result<Option<&str>, DropError> {
        let ext = match &self.override_extension {
            Some(ext) => ext.strip_prefix('.').unwrap_or(ext.as_str()),
            None => match &self.original_extension {
                Some(ext) => ext.as_str(),
                None => return Ok(None),
            },
        };
        if ext.contains(['/', '\\']) {
            return Err(DropError::InvalidExtension(ext.to_string()));
        }
        Ok(Some(ext).filter(|e| !e.is_empty()))
    }
}

/// Profile plus the content-derived remote name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget<'a> {
    pub profile: &'a DestinationProfile,
    pub computed_name: String,
}

impl ResolvedTarget<'_> {
    pub fn remote_path(&self) -> String {
        remote_path(&self.profile.remote_dir, &self.computed_name)
    }

    pub fn url(&self) -> String {
        self.profile.public_url(&self.computed_name)
    }
}

/// What a successful upload produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub url: String,
    pub remote_name: String,
    /// `server:path` the file was copied to.
    pub remote_location: String,
}

/// Compute the target for `request` without touching anything.
pub fn target<'a>(
    request: &UploadRequest,
    profile: &'a DestinationProfile,
) -> Result<ResolvedTarget<'a>, DropError> {
    let computed_name = content_name(
        request.bytes(),
        profile.hash_algorithm,
        profile.hash_length,
        request.extension()?,
    )?;
    Ok(ResolvedTarget {
        profile,
        computed_name,
    })
}

/// Stage, name, and copy the request to `profile`. The staged file is removed
/// before this returns, whether or not the transfer succeeded.
pub fn upload(
    request: &UploadRequest,
    profile: &DestinationProfile,
    transfer: &dyn Transfer,
) -> Result<UploadOutcome, DropError> {
    let resolved = target(request, profile)?;
    let staged = stage(request.bytes(), profile.file_mode)?;
    let path = resolved.remote_path();

    transfer.transfer(staged.path(), &profile.remote_server, &path)?;

    Ok(UploadOutcome {
        url: resolved.url(),
        remote_location: remote_address(&profile.remote_server, &path),
        remote_name: resolved.computed_name,
    })
}

/// A self-test payload that has been copied but not yet fetched back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestUpload {
    pub outcome: UploadOutcome,
    payload: Vec<u8>,
}

impl SelfTestUpload {
    /// Fetch the public URL and require it to serve the uploaded payload.
    pub fn verify(&self, fetcher: &dyn Fetcher) -> Result<(), DropError> {
        verify::verify(fetcher, &self.outcome.url, &self.payload)?;
        tracing::info!("self-test passed: {}", self.outcome.url);
        Ok(())
    }
}

/// Upload a timestamped payload with the `test` extension.
pub fn upload_self_test(
    profile: &DestinationProfile,
    transfer: &dyn Transfer,
    now: DateTime<Local>,
) -> Result<SelfTestUpload, DropError> {
    let request = UploadRequest::new(verify::self_test_payload(now), None)
        .with_extension_override(Some(SELF_TEST_EXTENSION.to_string()));
    let outcome = upload(&request, profile, transfer)?;
    Ok(SelfTestUpload {
        outcome,
        payload: request.bytes,
    })
}

/// Upload a self-test payload and check that the public URL serves the same bytes.
pub fn self_test(
    profile: &DestinationProfile,
    transfer: &dyn Transfer,
    fetcher: &dyn Fetcher,
    now: DateTime<Local>,
) -> Result<UploadOutcome, DropError> {
    let uploaded = upload_self_test(profile, transfer, now)?;
    uploaded.verify(fetcher)?;
    Ok(uploaded.outcome)
}
