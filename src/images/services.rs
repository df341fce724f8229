use uuid::Uuid;

pub const POST_IMAGES_DIR: &str = "post_images";
pub const PROFILE_IMAGES_DIR: &str = "profile_images";

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Storage key for a post image; the filename part is what gets persisted on
/// the post and served under /images.
pub fn post_image_key(content_type: &str) -> (String, String) {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    let name = format!("{}.{}", Uuid::new_v4(), ext);
    (format!("{}/{}", POST_IMAGES_DIR, name), name)
}

pub fn profile_image_key(user_id: Uuid, content_type: &str) -> (String, String) {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    let name = format!("{}-{}.{}", user_id, Uuid::new_v4(), ext);
    (format!("{}/{}", PROFILE_IMAGES_DIR, name), name)
}

pub fn absolute_post_image_url(server_url: &str, name: &str) -> String {
    format!("{}/images/{}", server_url.trim_end_matches('/'), name)
}

/// Profile images hosted by Google stay untouched; everything else is a
/// filename under /profile_images.
pub fn absolute_profile_image_url(server_url: &str, stored: &str) -> String {
    if stored.is_empty() || stored.contains("google") {
        return stored.to_string();
    }
    format!("{}/profile_images/{}", server_url.trim_end_matches('/'), stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
        assert_eq!(ext_from_mime("whatever/else"), None);
    }

    #[test]
    fn post_image_urls_are_absolute() {
        assert_eq!(
            absolute_post_image_url("http://localhost:8080", "a.jpg"),
            "http://localhost:8080/images/a.jpg"
        );
        // Trailing slash on the base must not double up.
        assert_eq!(
            absolute_post_image_url("http://localhost:8080/", "a.jpg"),
            "http://localhost:8080/images/a.jpg"
        );
    }

    #[test]
    fn google_profile_images_pass_through() {
        let google = "https://lh3.googleusercontent.com/a/photo.jpg";
        assert_eq!(
            absolute_profile_image_url("http://localhost:8080", google),
            google
        );
        assert_eq!(absolute_profile_image_url("http://localhost:8080", ""), "");
        assert_eq!(
            absolute_profile_image_url("http://localhost:8080", "me.png"),
            "http://localhost:8080/profile_images/me.png"
        );
    }

    #[test]
    fn image_keys_land_in_their_directories() {
        let (key, name) = post_image_key("image/png");
        assert!(key.starts_with("post_images/"));
        assert!(key.ends_with(&name));
        assert!(name.ends_with(".png"));

        let user = uuid::Uuid::new_v4();
        let (key, name) = profile_image_key(user, "image/jpeg");
        assert!(key.starts_with("profile_images/"));
        assert!(name.starts_with(&user.to_string()));
        assert!(name.ends_with(".jpg"));
    }
}
