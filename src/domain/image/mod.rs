pub mod dto;
pub mod emoji;
pub mod error;
pub mod service;

pub use dto::{ImageRequest, ImageResponse};
pub use emoji::{emoji_art, emoji_svg_data_url, EmojiArtProvider, EMOJI_PROVIDER};
pub use error::ImageServiceError;
pub use service::{placeholder_url, ImageService, ImageServiceApi, PLACEHOLDER_PROVIDER};
