use std::sync::OnceLock;

use crate::models::{PageType, StylePreset, WeddingDetails};

fn preset(id: &str, name: &str, description: &str, prompt_suffix: &str, preview_url: &str) -> StylePreset {
    StylePreset {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        prompt_suffix: prompt_suffix.to_string(),
        preview_url: preview_url.to_string(),
    }
}

/// The read-only style gallery, first entry is the initial selection.
pub fn style_presets() -> &'static [StylePreset] {
    static PRESETS: OnceLock<Vec<StylePreset>> = OnceLock::new();
    PRESETS.get_or_init(|| vec![
        preset(
            "elegant-gold",
            "Eternal Elegance",
            "Timeless luxury with gold foil accents on cream textured paper.",
            "Elegant luxury wedding invitation style, gold foil floral borders, ivory textured paper background, classic serif typography, cream and gold color palette, extremely high detail, soft studio lighting.",
            "https://picsum.photos/seed/elegant/600/800",
        ),
        preset(
            "bohemian-wildflower",
            "Wildflower Whisper",
            "Soft watercolor illustrations with an organic, earthy feel.",
            "Bohemian wedding invitation style, delicate watercolor wildflowers and eucalyptus, handwritten calligraphy script, organic paper texture, dusty rose and sage green palette, dreamy and romantic atmosphere.",
            "https://picsum.photos/seed/boho/600/800",
        ),
        preset(
            "modern-minimal",
            "Modern Grace",
            "Clean lines, bold typography, and sophisticated simplicity.",
            "Modern minimalist wedding invitation style, clean architectural lines, bold sans-serif typography, monochrome palette with subtle sage accents, premium heavy matte paper, contemporary and chic.",
            "https://picsum.photos/seed/minimal/600/800",
        ),
        preset(
            "vintage-noir",
            "Vintage Glamour",
            "Art Deco inspired patterns with a dramatic, high-end look.",
            "Art Deco wedding invitation style, Great Gatsby aesthetic, black and metallic gold geometric patterns, symmetrical ornate borders, vintage luxury 1920s feel, dramatic high contrast.",
            "https://picsum.photos/seed/vintage/600/800",
        ),
    ])
}

pub fn find_style(id: &str) -> Option<&'static StylePreset> {
    style_presets().iter().find(|s| s.id == id)
}

pub fn default_style() -> &'static StylePreset {
    &style_presets()[0]
}

pub fn default_details() -> WeddingDetails {
    WeddingDetails {
        partner1: "Alexander".into(),
        partner2: "Isabella".into(),
        date: "June 24, 2025".into(),
        time: "4:00 PM".into(),
        venue: "The Grand Conservatory".into(),
        city: "Charleston, SC".into(),
        rsvp_deadline: "May 10, 2025".into(),
        additional_notes: "Formal Attire Suggested".into(),
    }
}

pub fn default_pages() -> Vec<PageType> {
    vec![PageType::Cover, PageType::Details]
}
