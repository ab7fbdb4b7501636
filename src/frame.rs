use crate::decode::encode_data_url;
use crate::model::IMAGE_MIME_TYPE;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// The most recently uploaded camera image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatestFrame {
    pub image: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

impl LatestFrame {
    pub fn data_url(&self) -> String {
        encode_data_url(IMAGE_MIME_TYPE, &self.image)
    }
}

/// Single-slot store for the last frame pushed by a camera device.
///
/// Uploads take the write lock and replace the whole frame, so readers see
/// either the previous frame or the new one, never a mix.
#[derive(Default)]
pub struct LatestFrameStore {
    slot: RwLock<Option<LatestFrame>>,
}

impl LatestFrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored frame and returns its size in bytes.
    pub async fn upload(&self, image: Vec<u8>) -> usize {
        let size = image.len();
        let frame = LatestFrame {
            image,
            captured_at: Utc::now(),
        };

        *self.slot.write().await = Some(frame);
        log::debug!("Stored new frame ({size} bytes)");
        size
    }

    /// Returns a copy of the stored frame, or `None` before the first upload.
    pub async fn fetch_latest(&self) -> Option<LatestFrame> {
        self.slot.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn empty_store_has_no_frame() {
        let store = LatestFrameStore::new();
        assert!(store.fetch_latest().await.is_none());
    }

    #[tokio::test]
    async fn upload_then_fetch_roundtrips() {
        let store = LatestFrameStore::new();
        let before = Utc::now();

        assert_eq!(store.upload(vec![1, 2, 3]).await, 3);

        let frame = store.fetch_latest().await.unwrap();
        assert_eq!(frame.image, vec![1, 2, 3]);
        assert!(frame.captured_at >= before);
        assert_eq!(frame.data_url(), "data:image/jpeg;base64,AQID");
    }

    #[tokio::test]
    async fn last_upload_wins() {
        let store = LatestFrameStore::new();
        store.upload(vec![1; 16]).await;
        store.upload(vec![2; 4]).await;

        assert_eq!(store.fetch_latest().await.unwrap().image, vec![2; 4]);
    }

    #[tokio::test]
    async fn concurrent_uploads_never_tear() {
        let store = Arc::new(LatestFrameStore::new());

        let writers: Vec<_> = (0..8u8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..32 {
                        store.upload(vec![i; 256 + i as usize]).await;
                    }
                })
            })
            .collect();

        for _ in 0..64 {
            if let Some(frame) = store.fetch_latest().await {
                let first = frame.image[0];
                assert_eq!(frame.image.len(), 256 + first as usize);
                assert!(frame.image.iter().all(|b| *b == first));
            }
            tokio::task::yield_now().await;
        }

        for writer in writers {
            writer.await.unwrap();
        }
        assert!(store.fetch_latest().await.is_some());
    }
}
