//! Turning files on disk into uploads.

use anyhow::Context;
use folio_common::models::Upload;
use std::path::Path;

/// Read a file, guessing its content type from the extension.
pub async fn read_upload(path: &Path) -> anyhow::Result<Upload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let content_type = mime_guess::from_path(path).first_or_octet_stream();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok(Upload::new(file_name, content_type.essence_str(), bytes))
}

pub async fn read_uploads(paths: &[impl AsRef<Path>]) -> anyhow::Result<Vec<Upload>> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        uploads.push(read_upload(path.as_ref()).await?);
    }
    Ok(uploads)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guesses_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("cover.png");
        let cv = dir.path().join("cv.pdf");
        let blob = dir.path().join("data.bin");
        tokio::fs::write(&png, [137, 80, 78, 71]).await.unwrap();
        tokio::fs::write(&cv, b"%PDF").await.unwrap();
        tokio::fs::write(&blob, [0]).await.unwrap();

        let uploads = read_uploads(&[&png, &cv, &blob]).await.unwrap();
        assert_eq!(uploads[0].content_type, "image/png");
        assert_eq!(uploads[0].file_name, "cover.png");
        assert_eq!(uploads[0].size(), 4);
        assert_eq!(uploads[1].content_type, "application/pdf");
        assert_eq!(uploads[2].content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = read_upload(Path::new("/definitely/not/here.png")).await.unwrap_err();
        assert!(err.to_string().contains("here.png"));
    }
}
