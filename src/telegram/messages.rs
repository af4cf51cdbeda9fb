//! User-facing texts. Plain text only, no parse mode.

use crate::download::media::DeliveryResult;

pub const PROCESSING: &str = "⏳ Processing link...";

pub const UNEXPECTED_ERROR: &str = "⚠️ Something went wrong while processing this link. Please try again.";

pub const HELP_TEXT: &str = "👋 Send me a link to a public Instagram post, reel or IGTV video and I'll send the photos and videos back here.\n\n\
Supported links:\n\
• https://www.instagram.com/p/...\n\
• https://www.instagram.com/reel/...\n\
• https://www.instagram.com/tv/...\n\n\
Carousels are sent item by item, captioned 1/N, 2/N, ...";

pub fn found_items(total: usize) -> String {
    if total == 1 {
        "📥 Found 1 media item. Downloading...".to_string()
    } else {
        format!("📥 Found {} media items. Downloading...", total)
    }
}

/// Final status after at least one item was delivered.
pub fn batch_summary(total: usize, results: &[DeliveryResult]) -> String {
    let delivered = results.iter().filter(|r| r.is_delivered()).count();
    if delivered == total {
        return if total == 1 {
            "✅ Done!".to_string()
        } else {
            format!("✅ Done! Sent {} items.", total)
        };
    }

    let mut text = format!("⚠️ Sent {} of {} items.", delivered, total);
    for (i, result) in results.iter().enumerate() {
        if let DeliveryResult::Failed(reason) = result {
            text.push_str(&format!("\n• Item {}: {}", i + 1, reason));
        }
    }
    if results.len() < total {
        text.push_str(&format!("\nSkipped the remaining {} item(s).", total - results.len()));
    }
    text
}
