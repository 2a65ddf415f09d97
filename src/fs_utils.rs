use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use llmapi::utils::{current_timestamp_millis, known_mime_type};
use tokio::fs;
use tokio::fs::try_exists;
use tracing::{error, info, warn};

use crate::constants::UPLOAD_SWEEP_INTERVAL_SECS;
use crate::models::TempUpload;

/// Creates `path` and its parents. A concurrent request creating the same
/// directory is not an error.
pub async fn ensure_dir(path: &Path) -> Result<PathBuf, String> {
    match fs::create_dir_all(path).await {
        Ok(()) => Ok(path.to_path_buf()),
        Err(err) if err.kind() == ErrorKind::AlreadyExists && path.is_dir() => {
            Ok(path.to_path_buf())
        }
        Err(err) => Err(format!(
            "Unable to create directory '{}': {}",
            path.display(),
            err
        )),
    }
}

pub async fn ensure_unique_file_name(dir: &Path, original: &str) -> Result<String, String> {
    if !try_exists(dir.join(original))
        .await
        .map_err(|err| format!("Failed to verify file existence: {}", err))?
    {
        return Ok(original.to_string());
    }

    let original_path = Path::new(original);
    let stem = original_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("image");
    let extension = original_path.extension().and_then(|ext| ext.to_str());

    let mut counter = 1;
    loop {
        let candidate = match extension {
            Some(ext) => format!("{stem}-{counter}.{ext}"),
            None => format!("{stem}-{counter}"),
        };

        if !try_exists(dir.join(&candidate))
            .await
            .map_err(|err| format!("Failed to verify file existence: {}", err))?
        {
            return Ok(candidate);
        }

        counter += 1;
    }
}

/// Mime type of an uploaded file, judged by its extension.
pub fn upload_mime_type(path: &Path) -> Result<&'static str, String> {
    known_mime_type(path)
        .ok_or_else(|| format!("Unknown MIME type for file: {}", path.display()))
}

pub fn sanitize_file_name(file_name: &str) -> Option<String> {
    let trimmed = file_name.trim();
    if trimmed.is_empty()
        || trimmed.contains(['/', '\\'])
        || trimmed.contains("..")
        || trimmed.contains('\0')
    {
        return None;
    }

    Some(trimmed.to_string())
}

pub fn default_extension_for_mime(mime_type: &str) -> Option<String> {
    let mime = mime_type.trim().to_lowercase();
    let ext = match mime.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/bmp" => Some("bmp"),
        "image/tiff" => Some("tiff"),
        _ => None,
    };

    if let Some(value) = ext {
        return Some(value.to_string());
    }

    mime.split('/')
        .nth(1)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

/// `<prefix>-<millis>.<ext>` for a freshly generated image.
pub fn timestamped_file_name(prefix: &str, mime_type: &str) -> String {
    let extension = default_extension_for_mime(mime_type).unwrap_or_else(|| "png".to_string());
    format!("{prefix}-{}.{extension}", current_timestamp_millis())
}

/// Writes an uploaded file under `dir` as `<millis>-<original name>`.
pub async fn save_upload(dir: &Path, original_name: &str, bytes: &[u8]) -> Result<TempUpload, String> {
    let sanitized = sanitize_file_name(original_name)
        .ok_or_else(|| format!("Invalid file name supplied: {}", original_name))?;
    let dir = ensure_dir(dir).await?;

    let base_name = format!("{}-{}", current_timestamp_millis(), sanitized);
    let unique_name = ensure_unique_file_name(&dir, &base_name).await?;
    let target_path = dir.join(unique_name);

    fs::write(&target_path, bytes)
        .await
        .map_err(|err| format!("Unable to write file '{}': {}", target_path.display(), err))?;

    Ok(TempUpload::new(target_path))
}

/// Best-effort delete; failures are logged, never returned.
pub async fn remove_temp_file(upload: &TempUpload) {
    match fs::remove_file(&upload.path).await {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => warn!(path = %upload.path.display(), %err, "failed to delete temp file"),
    }
}

/// Deletes every regular file in `dir`, returning how many were removed.
pub async fn sweep_directory(dir: &Path) -> Result<usize, String> {
    sweep(dir, None).await
}

/// Deletes regular files in `dir` last modified at least `max_age` ago.
/// Uploads still in use by a running flow are younger than that.
pub async fn sweep_stale_files(dir: &Path, max_age: Duration) -> Result<usize, String> {
    sweep(dir, Some(max_age)).await
}

async fn sweep(dir: &Path, max_age: Option<Duration>) -> Result<usize, String> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
        Err(err) => {
            return Err(format!(
                "Unable to read directory '{}': {}",
                dir.display(),
                err
            ))
        }
    };

    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|err| format!("Failed to iterate directory '{}': {}", dir.display(), err))?
    {
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        if let Some(max_age) = max_age {
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .unwrap_or_default();
            if age < max_age {
                continue;
            }
        }

        match fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(err) => warn!(file = %entry.path().display(), %err, "failed to delete file"),
        }
    }

    info!(dir = %dir.display(), removed, "uploads folder cleaned");
    Ok(removed)
}

/// Empties `public_dir` now and then once per sweep interval. In `temp_dir`
/// only files older than the interval go, so uploads of running flows stay.
pub fn spawn_upload_sweeper(public_dir: PathBuf, temp_dir: PathBuf) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let interval = Duration::from_secs(UPLOAD_SWEEP_INTERVAL_SECS);
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(err) = sweep_directory(&public_dir).await {
                error!(dir = %public_dir.display(), %err, "error cleaning uploads folder");
            }
            if let Err(err) = sweep_stale_files(&temp_dir, interval).await {
                error!(dir = %temp_dir.display(), %err, "error cleaning uploads folder");
            }
        }
    })
}
