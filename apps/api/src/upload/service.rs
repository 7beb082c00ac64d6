use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// `avatars/{user}/{unix millis}.{ext}`, the extension taken from the image subtype.
pub fn avatar_key(user_id: Uuid, now: DateTime<Utc>, content_type: &str) -> String {
    let ext = content_type
        .split(';')
        .next()
        .and_then(|essence| essence.trim().split_once('/'))
        .map(|(_, subtype)| subtype.split('+').next().unwrap_or_default().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "jpg".to_string());
    format!("avatars/{user_id}/{}.{ext}", now.timestamp_millis())
}

pub fn public_url(base_url: &str, key: &str) -> String {
    format!("{}/{key}", base_url.trim_end_matches('/'))
}

pub fn is_image(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// Stores the image and returns the URL it is publicly served from.
pub async fn upload_avatar(
    s3: &S3Client,
    bucket: &str,
    public_base_url: &str,
    user_id: Uuid,
    content_type: &str,
    image: Bytes,
) -> Result<String, AppError> {
    let key = avatar_key(user_id, Utc::now(), content_type);

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(image))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("avatar upload failed: {e}")))?;

    info!("Uploaded avatar to s3://{bucket}/{key}");
    Ok(public_url(public_base_url, &key))
}
