use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The invitation pages that can be generated individually.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    Cover,
    Details,
    Location,
    #[serde(rename = "RSVP", alias = "Rsvp")]
    Rsvp,
}

impl PageType {
    pub const ALL: [PageType; 4] = [PageType::Cover, PageType::Details, PageType::Location, PageType::Rsvp];

    /// Display label shown on the page-selection cards and in results.
    pub fn label(self) -> &'static str {
        match self {
            PageType::Cover => "Cover Page",
            PageType::Details => "Event Details",
            PageType::Location => "Map & Venue",
            PageType::Rsvp => "RSVP Card",
        }
    }

    /// File name offered when a generated page is downloaded.
    pub fn download_filename(self) -> String {
        format!("wedding_{}.png", self.label().to_lowercase().replace(' ', "_"))
    }

    /// Parses the path segment used by the HTTP surface (`cover`, `rsvp`, ...).
    pub fn from_slug(slug: &str) -> Option<Self> {
        PageType::ALL.into_iter().find(|p| p.slug().eq_ignore_ascii_case(slug))
    }

    pub fn slug(self) -> &'static str {
        match self {
            PageType::Cover => "cover",
            PageType::Details => "details",
            PageType::Location => "location",
            PageType::Rsvp => "rsvp",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeddingDetails {
    pub partner1: String,
    pub partner2: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub city: String,
    pub rsvp_deadline: String,
    pub additional_notes: String,
}

/// Field-by-field edit of [`WeddingDetails`]; absent fields are left alone.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DetailsPatch {
    #[serde(default)] pub partner1: Option<String>,
    #[serde(default)] pub partner2: Option<String>,
    #[serde(default)] pub date: Option<String>,
    #[serde(default)] pub time: Option<String>,
    #[serde(default)] pub venue: Option<String>,
    #[serde(default)] pub city: Option<String>,
    #[serde(default)] pub rsvp_deadline: Option<String>,
    #[serde(default)] pub additional_notes: Option<String>,
}

impl WeddingDetails {
    pub fn patched(&self, patch: DetailsPatch) -> WeddingDetails {
        let mut next = self.clone();
        let fields = [
            (&mut next.partner1, patch.partner1),
            (&mut next.partner2, patch.partner2),
            (&mut next.date, patch.date),
            (&mut next.time, patch.time),
            (&mut next.venue, patch.venue),
            (&mut next.city, patch.city),
            (&mut next.rsvp_deadline, patch.rsvp_deadline),
            (&mut next.additional_notes, patch.additional_notes),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
        next
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StylePreset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub prompt_suffix: String,
    pub preview_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedPage {
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub url: String,
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedInvitation {
    pub id: Uuid,
    pub pages: Vec<GeneratedPage>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SelectStyleRequest {
    pub style_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QualityRequest {
    pub high_quality: bool,
}
