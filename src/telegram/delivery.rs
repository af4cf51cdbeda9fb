//! Delivery dispatcher: uploads one downloaded item as the matching
//! attachment type and releases its local file.

use crate::core::error::AppError;
use crate::download::media::{DeliveryResult, MediaItem, MediaKind};
use crate::telegram::transport::ChatTransport;

/// Positional caption, only for batches with more than one item.
pub fn caption_for(index: usize, total: usize) -> Option<String> {
    (total > 1).then(|| format!("{}/{}", index, total))
}

/// Upload `item` (1-based `index` of `total`) to the chat.
///
/// The local file is removed as soon as the upload succeeds. On failure it is
/// left for batch cleanup.
pub async fn deliver(transport: &dyn ChatTransport, item: &MediaItem, index: usize, total: usize) -> DeliveryResult {
    let caption = caption_for(index, total);
    let upload = match item.kind() {
        MediaKind::Photo => transport.send_photo(item.path(), caption.as_deref()).await,
        MediaKind::Video => transport.send_video(item.path(), caption.as_deref()).await,
    };

    match upload {
        Ok(()) => {
            if let Err(e) = tokio::fs::remove_file(item.path()).await {
                log::warn!("Delivered item {} but failed to remove {}: {}", index, item.path().display(), e);
            }
            log::info!("Delivered item {}/{} as {}", index, total, item.kind().as_str());
            DeliveryResult::Delivered
        }
        Err(e) => {
            let err = match e {
                AppError::Delivery(_) => e,
                AppError::Telegram(teloxide::RequestError::Api(api)) => AppError::Delivery(api.to_string()),
                AppError::Telegram(req) => AppError::Delivery(req.to_string()),
                other => AppError::Delivery(other.to_string()),
            };
            log::warn!("Delivery of item {}/{} failed: {}", index, total, err);
            DeliveryResult::Failed(err.user_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppResult;
    use crate::download::media::MediaReference;
    use crate::telegram::transport::StatusHandle;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    /// Records (kind, caption) per upload; rejects videos with `video_error`
    #[derive(Default)]
    struct Uploads {
        sent: Mutex<Vec<(&'static str, Option<String>)>>,
        video_error: Option<fn() -> AppError>,
    }

    #[async_trait]
    impl ChatTransport for Uploads {
        async fn send_status(&self, _text: &str) -> AppResult<StatusHandle> {
            Ok(StatusHandle(1))
        }

        async fn edit_status(&self, _handle: StatusHandle, _text: &str) -> AppResult<()> {
            Ok(())
        }

        async fn send_photo(&self, _path: &Path, caption: Option<&str>) -> AppResult<()> {
            self.sent.lock().unwrap().push(("photo", caption.map(str::to_string)));
            Ok(())
        }

        async fn send_video(&self, _path: &Path, caption: Option<&str>) -> AppResult<()> {
            if let Some(make_error) = self.video_error {
                return Err(make_error());
            }
            self.sent.lock().unwrap().push(("video", caption.map(str::to_string)));
            Ok(())
        }
    }

    fn item_in(dir: &Path, reference: MediaReference, name: &str) -> MediaItem {
        let local_path = dir.join(name);
        std::fs::write(&local_path, b"data").unwrap();
        MediaItem {
            reference,
            local_path,
            size_bytes: 4,
        }
    }

    #[tokio::test]
    async fn test_delivered_file_is_removed_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let item = item_in(
            dir.path(),
            MediaReference::photo("https://cdn.example.com/a.jpg").unwrap(),
            "media_1.jpg",
        );
        let transport = Uploads::default();

        let result = deliver(&transport, &item, 1, 1).await;

        assert_eq!(result, DeliveryResult::Delivered);
        assert!(!item.path().exists());
        assert_eq!(*transport.sent.lock().unwrap(), vec![("photo", None)]);
    }

    #[tokio::test]
    async fn test_video_uses_video_upload_with_caption() {
        let dir = tempfile::tempdir().unwrap();
        let item = item_in(
            dir.path(),
            MediaReference::video("https://cdn.example.com/a.mp4").unwrap(),
            "media_2.mp4",
        );
        let transport = Uploads::default();

        deliver(&transport, &item, 2, 3).await;

        assert_eq!(*transport.sent.lock().unwrap(), vec![("video", Some("2/3".to_string()))]);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_file_and_reports_reason() {
        let dir = tempfile::tempdir().unwrap();
        let item = item_in(
            dir.path(),
            MediaReference::video("https://cdn.example.com/a.mp4").unwrap(),
            "media_1.mp4",
        );
        let transport = Uploads {
            video_error: Some(|| AppError::Delivery("file too big".to_string())),
            ..Uploads::default()
        };

        let result = deliver(&transport, &item, 1, 2).await;

        assert!(matches!(result, DeliveryResult::Failed(ref reason) if reason.contains("file too big")));
        assert!(item.path().exists());
    }

    #[tokio::test]
    async fn test_telegram_rejection_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let item = item_in(
            dir.path(),
            MediaReference::video("https://cdn.example.com/a.mp4").unwrap(),
            "media_1.mp4",
        );
        let transport = Uploads {
            video_error: Some(|| AppError::Telegram(teloxide::RequestError::Api(teloxide::ApiError::BotBlocked))),
            ..Uploads::default()
        };

        let result = deliver(&transport, &item, 1, 1).await;

        let DeliveryResult::Failed(reason) = result else {
            panic!("expected a failed delivery");
        };
        assert!(reason.starts_with("⚠️ Failed to send media to Telegram: "), "{}", reason);
        assert!(reason.contains("bot was blocked by the user"), "{}", reason);
        assert!(!reason.contains("Telegram error:"), "{}", reason);
        assert!(!reason.contains("A Telegram's error"), "{}", reason);
    }

    #[test]
    fn test_caption_only_for_multi_item_batches() {
        assert_eq!(caption_for(1, 1), None);
        assert_eq!(caption_for(1, 3).as_deref(), Some("1/3"));
        assert_eq!(caption_for(3, 3).as_deref(), Some("3/3"));
    }
}
