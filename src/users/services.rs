use bytes::Bytes;
use rand::Rng;
use tracing::{error, info};

use crate::error::ProviderError;
use crate::state::AppState;
use crate::users::repo::UserPatch;

/// Object name of the placeholder avatar every new user starts with.
pub const BLANK_IMAGE: &str = "no-img.png";

/// Number of notifications returned with the caller's own profile.
pub const RECENT_NOTIFICATIONS: i64 = 10;

pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

pub fn is_allowed_image_type(content_type: &str) -> bool {
    matches!(content_type, "image/png" | "image/jpeg")
}

/// Random numeric object name keeping the uploaded file's extension.
pub fn image_object_name(file_name: &str) -> String {
    let ext = file_name.rsplit('.').next().unwrap_or(file_name);
    let id: u64 = rand::thread_rng().gen_range(0..1_000_000_000_000);
    format!("{id}.{ext}")
}

/// Stores the image and points the user's `imageUrl` at it. Returns the new URL.
pub async fn replace_profile_image(
    st: &AppState,
    handle: &str,
    upload: ImageUpload,
) -> Result<String, ProviderError> {
    let key = image_object_name(&upload.file_name);
    st.storage
        .put_object(&key, upload.body, &upload.content_type)
        .await
        .map_err(ProviderError::Storage)?;

    let image_url = st.config.storage.public_url(&key);
    let patch = UserPatch {
        image_url: Some(image_url.clone()),
        ..Default::default()
    };
    if let Err(e) = st.store.update_user(handle, &patch).await {
        if let Err(cleanup) = st.storage.delete_object(&key).await {
            error!(error = %cleanup, %key, "removing unreferenced image failed");
        }
        return Err(e);
    }

    info!(%handle, %key, "profile image replaced");
    Ok(image_url)
}
