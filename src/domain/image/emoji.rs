use crate::infrastructure::providers::{GeneratedImage, ImageProvider, Provider, ProviderError};
use async_trait::async_trait;

pub const EMOJI_PROVIDER: &str = "emoji";

const MAX_EMOJIS: usize = 10;
const CAPTION_CHARS: usize = 25;
const SEPARATOR: &str = "─────";

fn emoji_for(word: &str) -> Option<&'static str> {
    let emoji = match word {
        // Animals
        "bird" | "birds" => "🐦",
        "duck" => "🦆",
        "eagle" => "🦅",
        "owl" => "🦉",
        "parrot" => "🦜",
        "chicken" => "🐔",
        "rooster" => "🐓",
        "turkey" => "🦃",
        "cat" | "cats" | "kitten" => "🐱",
        "lion" => "🦁",
        "tiger" => "🐯",
        "dog" => "🐶",
        "fish" => "🐟",
        "whale" => "🐋",
        "shark" => "🦈",
        "turtle" => "🐢",
        "frog" => "🐸",
        "horse" => "🐴",
        "cow" => "🐮",
        "pig" => "🐷",
        "sheep" => "🐑",
        "elephant" => "🐘",
        "monkey" => "🐵",
        "gorilla" => "🦍",
        "chimp" => "🦧",
        "zebra" => "🦓",
        "giraffe" => "🦒",
        // Nature
        "tree" => "🌳",
        "flower" => "🌸",
        "rose" => "🌹",
        "sunflower" => "🌻",
        "tulip" => "🌷",
        "mountain" => "⛰️",
        "river" => "🌊",
        "lake" => "💧",
        "cloud" => "☁️",
        "rainbow" => "🌈",
        "sun" | "sunny" | "day" => "☀️",
        "moon" | "night" => "🌙",
        "star" => "⭐",
        "fire" => "🔥",
        "snow" | "snowflake" => "❄️",
        // Objects
        "house" | "home" => "🏠",
        "car" => "🚗",
        "boat" => "🚤",
        "plane" => "✈️",
        "train" => "🚂",
        "book" => "📚",
        "computer" => "💻",
        "phone" => "📱",
        "camera" => "📷",
        "food" => "🍎",
        "pizza" => "🍕",
        "cake" => "🎂",
        "coffee" => "☕",
        "wine" => "🍷",
        // People
        "person" => "👤",
        "people" => "👥",
        "man" => "👨",
        "woman" => "👩",
        "child" => "👶",
        "family" => "👪",
        "couple" => "💑",
        "friend" => "🤝",
        // Feelings
        "love" => "😍",
        "heart" => "❤️",
        "happy" | "smile" => "😊",
        "sad" => "😢",
        "angry" => "😠",
        "surprised" => "😲",
        "cool" => "😎",
        "sleep" | "sleeping" => "😴",
        "laugh" => "😂",
        "cry" => "😭",
        "joy" => "😄",
        "funny" => "🤣",
        "wink" => "😉",
        "thinking" => "🤔",
        "confused" => "😕",
        "worried" => "😟",
        "shocked" => "😱",
        "tired" => "😪",
        "mad" => "😤",
        "devil" => "😈",
        "angel" => "😇",
        "sick" => "🤒",
        "injured" => "🤕",
        "bandage" => "🩹",
        "pill" => "💊",
        // Activities
        "party" => "🎉",
        "music" => "🎵",
        "dance" | "dancing" => "💃",
        "sports" => "⚽",
        "art" | "drawing" => "🎨",
        "work" => "💼",
        "money" => "💰",
        "time" => "⏰",
        "running" => "🏃",
        "walking" => "🚶",
        "swimming" => "🏊",
        "playing" => "🎮",
        "reading" => "📖",
        "writing" => "✍️",
        "cooking" => "🍳",
        "eating" => "🍽️",
        "drinking" => "🥤",
        // Weather
        "rain" => "🌧️",
        "storm" => "⛈️",
        "wind" => "💨",
        "fog" => "🌫️",
        "snowman" => "⛄",
        "lightning" => "⚡",
        _ => return None,
    };
    Some(emoji)
}

/// Plain-text emoji art: emoji rows, a separator, then a short caption.
pub fn emoji_art(prompt: &str) -> String {
    let lower = prompt.to_lowercase();

    let mut emojis: Vec<&str> = Vec::new();
    for word in lower.split(|c: char| c.is_whitespace() || c == ',') {
        if let Some(emoji) = emoji_for(word) {
            if !emojis.contains(&emoji) {
                emojis.push(emoji);
            }
        }
    }
    if emojis.is_empty() {
        emojis.push("🎨");
    }
    emojis.truncate(MAX_EMOJIS);

    let mut rows = vec![emojis.join(" ")];
    if emojis.len() > 2 {
        let (first, second) = emojis.split_at(emojis.len().div_ceil(2));
        rows.push(first.join(" "));
        rows.push(second.join(" "));
    } else if emojis.len() == 2 {
        rows.push(emojis[0].to_string());
        rows.push(emojis[1].to_string());
    }

    rows.push(SEPARATOR.to_string());

    let mut caption: String = prompt.chars().take(CAPTION_CHARS).collect();
    if prompt.chars().count() > CAPTION_CHARS {
        caption.push_str("...");
    }
    rows.push(caption);

    rows.join("\n")
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 512×512 SVG of [`emoji_art`], as a `data:` URL
pub fn emoji_svg_data_url(prompt: &str) -> String {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='512' height='512' style='background:white'>\
<style>.emoji-art {{ font-family: monospace; font-size: 16px; white-space: pre-line; }}</style>\
<text x='10' y='30' class='emoji-art' fill='black'>{}</text></svg>",
        escape_xml(&emoji_art(prompt))
    );

    format!("data:image/svg+xml;utf8,{}", urlencoding::encode(&svg))
}

/// Local, deterministic last link of the image chain
#[derive(Debug, Clone, Copy, Default)]
pub struct EmojiArtProvider;

impl Provider for EmojiArtProvider {
    fn name(&self) -> &str {
        EMOJI_PROVIDER
    }

    fn priority(&self) -> u32 {
        200
    }
}

#[async_trait]
impl ImageProvider for EmojiArtProvider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        Ok(GeneratedImage {
            url: emoji_svg_data_url(prompt),
        })
    }
}
