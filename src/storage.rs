use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
}

/// Local-disk storage backing the static /images and /profile_images mounts.
#[derive(Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StorageClient for DiskStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write object {}", path.display()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let path = self.root.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("delete object {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_root() -> PathBuf {
        std::env::temp_dir().join(format!("goalpost-storage-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn put_then_delete_roundtrip() {
        let root = scratch_root();
        let storage = DiskStorage::new(&root);

        storage
            .put_object("post_images/a.jpg", Bytes::from_static(b"jpeg bytes"))
            .await
            .expect("put should succeed");

        let on_disk = tokio::fs::read(root.join("post_images/a.jpg"))
            .await
            .expect("file should exist");
        assert_eq!(on_disk, b"jpeg bytes");

        storage
            .delete_object("post_images/a.jpg")
            .await
            .expect("delete should succeed");
        assert!(!root.join("post_images/a.jpg").exists());

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn delete_missing_object_is_ok() {
        let storage = DiskStorage::new(scratch_root());
        storage
            .delete_object("post_images/never-existed.png")
            .await
            .expect("deleting a missing object should not error");
    }
}
