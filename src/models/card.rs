use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_SENDER_NAME_CHARS: usize = 30;
pub const MAX_WISH_TEXT_CHARS: usize = 100;

pub const DEFAULT_WISHES: [&str; 5] = [
    "Vạn sự như ý\nTỷ sự như mơ",
    "Tiền vào như nước\nTiền ra nhỏ giọt",
    "Năm mới bình an\nGia đạo hạnh phúc",
    "Mã đáo thành công\nSự nghiệp thăng tiến",
    "Tấn tài tấn lộc\nTấn bình an",
];

/// Picks one of the built-in wishes at random.
pub fn random_wish() -> &'static str {
    DEFAULT_WISHES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(DEFAULT_WISHES[0])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleOption {
    #[default]
    Traditional,
    ModernVector,
    ThreeDCute,
    Watercolor,
    LuxuryGold,
    Cyberpunk,
}

impl StyleOption {
    pub const ALL: [StyleOption; 6] = [
        StyleOption::Traditional,
        StyleOption::ModernVector,
        StyleOption::ThreeDCute,
        StyleOption::Watercolor,
        StyleOption::LuxuryGold,
        StyleOption::Cyberpunk,
    ];

    /// Descriptive label interpolated into the generation prompt.
    pub fn label(&self) -> &'static str {
        match self {
            StyleOption::Traditional => "Tranh Đông Hồ (Traditional Folk)",
            StyleOption::ModernVector => "Modern Vector Flat Art",
            StyleOption::ThreeDCute => "3D Cute Animation Style",
            StyleOption::Watercolor => "Watercolor & Ink",
            StyleOption::LuxuryGold => "Luxury Gold & Red Realistic",
            StyleOption::Cyberpunk => "Cyberpunk Neon Tet",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            StyleOption::Traditional => "traditional",
            StyleOption::ModernVector => "modern-vector",
            StyleOption::ThreeDCute => "three-d-cute",
            StyleOption::Watercolor => "watercolor",
            StyleOption::LuxuryGold => "luxury-gold",
            StyleOption::Cyberpunk => "cyberpunk",
        }
    }
}

impl fmt::Display for StyleOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StyleOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        StyleOption::ALL
            .into_iter()
            .find(|style| style.id() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = StyleOption::ALL.iter().map(|s| s.id()).collect();
                format!("unknown style '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

/// What the user typed into the card form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub sender_name: String,
    pub wish_text: String,
    pub style: StyleOption,
}

impl Default for FormInput {
    fn default() -> Self {
        FormInput {
            sender_name: String::new(),
            wish_text: DEFAULT_WISHES[0].to_string(),
            style: StyleOption::default(),
        }
    }
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.set_sender_name(name);
        self
    }

    pub fn with_wish_text(mut self, wish: impl Into<String>) -> Self {
        self.set_wish_text(wish);
        self
    }

    pub fn with_style(mut self, style: StyleOption) -> Self {
        self.style = style;
        self
    }

    /// Stores the name, dropping anything past the field limit.
    pub fn set_sender_name(&mut self, name: impl Into<String>) {
        self.sender_name = clamp_chars(name.into(), MAX_SENDER_NAME_CHARS);
    }

    /// Stores the wish verbatim (line breaks included) up to the field limit.
    pub fn set_wish_text(&mut self, wish: impl Into<String>) {
        self.wish_text = clamp_chars(wish.into(), MAX_WISH_TEXT_CHARS);
    }

    pub fn validate(&self) -> Result<(), String> {
        let name_len = self.sender_name.chars().count();
        if name_len > MAX_SENDER_NAME_CHARS {
            return Err(format!(
                "sender name is {} characters, limit is {}",
                name_len, MAX_SENDER_NAME_CHARS
            ));
        }
        let wish_len = self.wish_text.chars().count();
        if wish_len > MAX_WISH_TEXT_CHARS {
            return Err(format!(
                "wish text is {} characters, limit is {}",
                wish_len, MAX_WISH_TEXT_CHARS
            ));
        }
        Ok(())
    }
}

fn clamp_chars(value: String, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((cut, _)) => value[..cut].to_string(),
        None => value,
    }
}
