use axum::extract::Multipart;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::AppError, storage::StorageClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Storage key, unique per upload.
    pub file_name: String,
    pub original_file_name: String,
    pub file_size: usize,
}

/// Store every file part of `mp` under a fresh key. Non-file parts are
/// skipped; a body with no file at all, or one that cannot be parsed, is a
/// bad request. On error nothing from this request is left in storage.
pub async fn upload_files(
    mp: &mut Multipart,
    storage: &dyn StorageClient,
) -> Result<Vec<UploadedFile>, AppError> {
    let mut uploaded = Vec::new();

    if let Err(e) = store_parts(mp, storage, &mut uploaded).await {
        remove_uploaded(storage, &uploaded).await;
        return Err(e);
    }
    if uploaded.is_empty() {
        return Err(AppError::BadRequest("no file in upload".into()));
    }
    Ok(uploaded)
}

async fn store_parts(
    mp: &mut Multipart,
    storage: &dyn StorageClient,
    uploaded: &mut Vec<UploadedFile>,
) -> Result<(), AppError> {
    while let Some(field) = mp.next_field().await.map_err(|e| {
        warn!(error = %e, "malformed multipart body");
        AppError::BadRequest(format!("malformed multipart body: {}", e))
    })? {
        let Some(raw_name) = field.file_name().map(str::to_owned) else {
            debug!(field = ?field.name(), "skipping non-file part");
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();

        let data = field.bytes().await.map_err(|e| {
            warn!(error = %e, "reading upload failed");
            AppError::BadRequest(format!("could not read upload: {}", e))
        })?;

        let original_file_name = safe_file_name(&raw_name);
        let file_name = unique_key(&original_file_name);
        let file_size = data.len();

        storage.put_object(&file_name, data, &content_type).await?;
        debug!(name = %file_name, size = file_size, "file uploaded");
        uploaded.push(UploadedFile {
            file_name,
            original_file_name,
            file_size,
        });
    }
    Ok(())
}

/// Best-effort removal of files stored by [`upload_files`].
pub async fn remove_uploaded(storage: &dyn StorageClient, files: &[UploadedFile]) {
    for f in files {
        if let Err(e) = storage.delete_object(&f.file_name).await {
            warn!(error = %e, file = %f.file_name, "could not remove orphaned upload");
        }
    }
}

/// Base name of whatever the client sent, restricted to a safe alphabet.
pub fn safe_file_name(raw: &str) -> String {
    lazy_static! {
        static ref UNSAFE_RE: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
    }
    let base = raw.rsplit(|c| c == '/' || c == '\\').next().unwrap_or("");
    let cleaned = UNSAFE_RE.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return Uuid::new_v4().to_string();
    }
    cleaned.to_string()
}

fn unique_key(safe_name: &str) -> String {
    format!("{}-{}", Uuid::new_v4().simple(), safe_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_file_name_strips_paths_and_odd_characters() {
        assert_eq!(safe_file_name("img.png"), "img.png");
        assert_eq!(safe_file_name("./testdata/img.png"), "img.png");
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name("C:\\Users\\me\\photo 1.jpg"), "photo_1.jpg");
        assert_eq!(safe_file_name(".hidden"), "hidden");
    }

    #[test]
    fn safe_file_name_falls_back_to_uuid() {
        for raw in ["", "..", "dir/", "..."] {
            let name = safe_file_name(raw);
            assert!(Uuid::parse_str(&name).is_ok(), "{:?} -> {:?}", raw, name);
        }
    }

    #[test]
    fn unique_key_keeps_the_safe_name() {
        let a = unique_key("me.png");
        let b = unique_key("me.png");
        assert_ne!(a, b);
        assert!(a.ends_with("-me.png"));
        let (prefix, _) = a.split_once('-').unwrap();
        assert!(Uuid::parse_str(prefix).is_ok());
    }
}
