// src/correlation/splice.rs
// Inserting the synthetic image message into a conversation

use crate::llm::{ChatMessage, ContentPart};

/// Note placed in front of the image so the model knows why it is there
pub const DEFAULT_IMAGE_NOTE: &str = "The user has shared this image with you. \
Use it to answer their questions about what they are showing you.";

/// User-role message carrying `note` followed by the image
pub fn image_message(note: &str, image_url: &str) -> ChatMessage {
    ChatMessage::user_parts(vec![
        ContentPart::text(note),
        ContentPart::image_url(image_url),
    ])
}

/// Insert `image` after a leading system message, else at the head.
/// An empty list simply receives the image message.
pub fn splice_image_message(mut messages: Vec<ChatMessage>, image: ChatMessage) -> Vec<ChatMessage> {
    let position = match messages.first() {
        Some(first) if first.is_system() => 1,
        _ => 0,
    };
    messages.insert(position, image);
    messages
}
