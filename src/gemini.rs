use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::skip_serializing_none;
use thiserror::Error;
use reqwest::Client;
use tracing::{info, error, warn};

use crate::config::Config;
use crate::generation::{GenerationRequest, PageGenerator};
use crate::models::{PageType, StylePreset, WeddingDetails};
use crate::placeholder;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")] Http(#[from] reqwest::Error),
    #[error("upstream returned status={status} body={body}")] Status { status: u16, body: String },
    #[error("parse error: {0}")] Parse(String),
    #[error("no image payload returned")] EmptyPayload,
    #[error("no pages selected")] NoPages,
    #[error("placeholder rendering failed: {0}")] Placeholder(String),
}

const ASPECT_RATIO: &str = "3:4";
const CLOSING_INSTRUCTION: &str = "Ensure consistent lighting, colors, and paper texture across all design elements. High resolution, professional design.";

/// Image model variant, chosen purely from the quality flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageModel {
    Fast,
    HighFidelity,
}

impl ImageModel {
    pub fn for_quality(high_quality: bool) -> Self {
        if high_quality { ImageModel::HighFidelity } else { ImageModel::Fast }
    }

    pub fn id(self) -> &'static str {
        match self {
            ImageModel::Fast => "gemini-2.5-flash-image",
            ImageModel::HighFidelity => "gemini-3-pro-image-preview",
        }
    }

    pub fn image_config(self) -> ImageConfig {
        ImageConfig {
            aspect_ratio: ASPECT_RATIO,
            image_size: match self {
                ImageModel::Fast => None,
                ImageModel::HighFidelity => Some("1K"),
            },
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: &'static str,
    pub image_size: Option<&'static str>,
}

fn page_prompt(page_type: PageType, d: &WeddingDetails) -> String {
    match page_type {
        PageType::Cover => format!(
            "A wedding invitation cover for {} and {}. The layout should feature their names prominently in beautiful script.",
            d.partner1, d.partner2
        ),
        PageType::Details => format!(
            "The main text page of a wedding invitation. It should include the text \"Save the Date\" or \"The Wedding of\", the date {}, the time {}, and the venue {}. Space for text is framed by the style elements.",
            d.date, d.time, d.venue
        ),
        PageType::Location => format!(
            "An elegant location/map page for a wedding invitation. It shows a stylized, artistic illustration of {} in {}. No messy text, just aesthetic venue representation.",
            d.venue, d.city
        ),
        PageType::Rsvp => format!(
            "A matching RSVP card for the wedding of {} and {}. It includes a designated space for guests to write their names and a deadline of {}.",
            d.partner1, d.partner2, d.rsvp_deadline
        ),
    }
}

/// Full prompt for one page: page template, style suffix, consistency instruction.
pub fn build_page_prompt(page_type: PageType, details: &WeddingDetails, style: &StylePreset) -> String {
    format!("{} {}. {}", page_prompt(page_type, details), style.prompt_suffix, CLOSING_INSTRUCTION)
}

pub fn request_body(prompt: &str, model: ImageModel) -> serde_json::Value {
    json!({
        "contents": [{
            "parts": [{"text": prompt}]
        }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"],
            "imageConfig": model.image_config(),
        }
    })
}

/// Inline image bytes pulled out of a response, still base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Displayable reference. Always labelled PNG, whatever the upstream mime type says.
    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.data)
    }
}

/// Leading `max_chars` characters of `s`, cut on a char boundary.
pub fn clip(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

fn is_base64(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=')
}

// Shortens base64 "data" fields so responses stay readable in logs
fn truncate_base64_in_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key != "data" {
                    truncate_base64_in_json(val);
                } else if let serde_json::Value::String(s) = val {
                    if s.len() > 100 && is_base64(s) {
                        *s = format!("{}...[truncated {} chars]", clip(s, 50), s.len() - 50);
                    }
                }
            }
        }
        serde_json::Value::Array(arr) => arr.iter_mut().for_each(truncate_base64_in_json),
        _ => {}
    }
}

fn preview(data: &str) -> String {
    if data.chars().count() > 50 {
        format!("{}...[{} chars total]", clip(data, 50), data.len())
    } else {
        data.to_string()
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn demo_mode(&self) -> bool {
        self.api_key == crate::config::DEMO_KEY
    }

    async fn perform_api_call(&self, prompt: &str, model: ImageModel) -> Result<ImagePayload, GenerationError> {
        let url = format!("{}/models/{}:generateContent?key={}", self.base_url, model.id(), self.api_key);
        info!("🔗 Making request to: {}", url.replace(&self.api_key, "***"));

        let body = request_body(prompt, model);
        info!("📤 Request body: {}", serde_json::to_string_pretty(&body).unwrap_or_default());

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ API Error response: {}", body);
            return Err(GenerationError::Status { status: status.as_u16(), body });
        }

        let response_text = response.text().await?;
        if let Ok(mut value) = serde_json::from_str::<serde_json::Value>(&response_text) {
            truncate_base64_in_json(&mut value);
            info!("📥 Raw Gemini API response: {}", value);
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| GenerationError::Parse(e.to_string()))?;
        parsed.into_image_payload()
    }

    /// Generates one invitation page and returns it as a data URI.
    pub async fn generate_page(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let model = ImageModel::for_quality(request.high_quality);
        let prompt = build_page_prompt(request.page_type, &request.details, &request.style);
        info!("🎯 Generating '{}' with {} and prompt: {}", request.page_type.label(), model.id(), clip(&prompt, 100));

        if self.demo_mode() {
            info!("Using demo mode - no real images generated");
            let data = placeholder::render_page(request.page_type, model)?;
            return Ok(ImagePayload { mime_type: "image/png".into(), data }.to_data_uri());
        }

        match self.perform_api_call(&prompt, model).await {
            Ok(payload) => {
                info!("✅ Generated '{}' ({}): {}", request.page_type.label(), payload.mime_type, preview(&payload.data));
                Ok(payload.to_data_uri())
            }
            Err(e) => {
                error!("❌ Failed to generate '{}': {}", request.page_type.label(), e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl PageGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.generate_page(request).await
    }
}

// --- Response Parsing ---

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    #[allow(dead_code)]
    Text { text: String },
    #[allow(dead_code)]
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
    #[serde(rename = "mimeType", default)]
    mime_type: String,
}

impl GeminiResponse {
    /// First inline image across all candidates, or [`GenerationError::EmptyPayload`].
    pub fn into_image_payload(self) -> Result<ImagePayload, GenerationError> {
        let found = self
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| match p {
                Part::Inline { inline_data } if !inline_data.data.is_empty() => Some(inline_data),
                _ => None,
            });
        match found {
            Some(inline) => {
                info!("🎯 Found image data with mime type: {}", inline.mime_type);
                Ok(ImagePayload { mime_type: inline.mime_type, data: inline.data })
            }
            None => {
                warn!("⚠️ No inline image data found in response structure");
                Err(GenerationError::EmptyPayload)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use pretty_assertions::assert_eq;

    fn parse(value: serde_json::Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn model_choice_depends_only_on_quality() {
        assert_eq!(ImageModel::for_quality(false).id(), "gemini-2.5-flash-image");
        assert_eq!(ImageModel::for_quality(true).id(), "gemini-3-pro-image-preview");
        assert_eq!(ImageModel::Fast.image_config(), ImageConfig { aspect_ratio: "3:4", image_size: None });
        assert_eq!(ImageModel::HighFidelity.image_config().image_size, Some("1K"));
    }

    #[test]
    fn details_prompt_contains_date_time_and_venue() {
        let details = WeddingDetails {
            date: "June 1, 2026".into(),
            time: "5 PM".into(),
            venue: "Old Mill".into(),
            ..catalog::default_details()
        };
        let style = catalog::find_style("modern-minimal").unwrap();
        let prompt = build_page_prompt(PageType::Details, &details, style);

        assert!(prompt.contains("June 1, 2026"));
        assert!(prompt.contains("5 PM"));
        assert!(prompt.contains("Old Mill"));
        assert!(prompt.contains(&style.prompt_suffix));
        assert!(prompt.ends_with(CLOSING_INSTRUCTION));
        assert_eq!(prompt, build_page_prompt(PageType::Details, &details, style));
    }

    #[test]
    fn page_templates_use_their_own_fields() {
        let details = catalog::default_details();
        let style = catalog::default_style();

        let cover = build_page_prompt(PageType::Cover, &details, style);
        assert!(cover.contains("Alexander and Isabella"));

        let location = build_page_prompt(PageType::Location, &details, style);
        assert!(location.contains("The Grand Conservatory in Charleston, SC"));
        assert!(location.contains("No messy text"));

        let rsvp = build_page_prompt(PageType::Rsvp, &details, style);
        assert!(rsvp.contains("deadline of May 10, 2025"));
        assert!(rsvp.contains("write their names"));
    }

    #[test]
    fn request_body_only_sets_size_for_high_quality() {
        let fast = request_body("p", ImageModel::Fast);
        assert_eq!(fast["generationConfig"]["imageConfig"], json!({"aspectRatio": "3:4"}));
        assert_eq!(fast["contents"][0]["parts"][0]["text"], "p");

        let hq = request_body("p", ImageModel::HighFidelity);
        assert_eq!(hq["generationConfig"]["imageConfig"], json!({"aspectRatio": "3:4", "imageSize": "1K"}));
    }

    #[test]
    fn picks_first_inline_part_after_text() {
        let response = parse(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here is your invitation"},
                    {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                    {"inlineData": {"mimeType": "image/png", "data": "BBBB"}}
                ]}
            }]
        }));
        let payload = response.into_image_payload().unwrap();
        assert_eq!(payload.data, "AAAA");
        assert_eq!(payload.to_data_uri(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn data_uri_is_always_png() {
        let payload = ImagePayload { mime_type: "image/jpeg".into(), data: "/9j/".into() };
        assert_eq!(payload.to_data_uri(), "data:image/png;base64,/9j/");
    }

    #[test]
    fn text_only_response_is_empty_payload() {
        let response = parse(json!({"candidates": [{"content": {"parts": [{"text": "sorry"}]}}]}));
        assert!(matches!(response.into_image_payload(), Err(GenerationError::EmptyPayload)));

        let empty = parse(json!({}));
        assert!(matches!(empty.into_image_payload(), Err(GenerationError::EmptyPayload)));
    }

    #[test]
    fn clip_respects_char_boundaries() {
        let name = "é".repeat(35);
        assert_eq!(clip(&name, 10), "é".repeat(10));
        assert_eq!(clip("Alex", 100), "Alex");
        assert_eq!(clip("", 3), "");
        assert_eq!(preview(&"ü".repeat(60)), format!("{}...[120 chars total]", "ü".repeat(50)));
    }

    #[test]
    fn non_base64_data_is_left_alone() {
        let odd = "ß".repeat(120);
        let mut value = json!({"inlineData": {"data": odd.clone()}});
        truncate_base64_in_json(&mut value);
        assert_eq!(value["inlineData"]["data"], odd.as_str());
    }

    #[test]
    fn long_data_fields_are_truncated_for_logs() {
        let mut value = json!({"parts": [{"inlineData": {"data": "A".repeat(300), "mimeType": "image/png"}}]});
        truncate_base64_in_json(&mut value);
        let data = value["parts"][0]["inlineData"]["data"].as_str().unwrap();
        assert!(data.ends_with("[truncated 250 chars]"));
        assert_eq!(value["parts"][0]["inlineData"]["mimeType"], "image/png");
    }
}
