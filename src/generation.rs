use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, error};
use uuid::Uuid;

use crate::gemini::GenerationError;
use crate::models::{GeneratedInvitation, GeneratedPage, PageType, StylePreset, WeddingDetails};

/// One page worth of work for an image backend. Built fresh for every call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub page_type: PageType,
    pub details: WeddingDetails,
    pub style: StylePreset,
    pub high_quality: bool,
}

/// Anything that can turn a [`GenerationRequest`] into a displayable image reference (a data URI).
#[async_trait]
pub trait PageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Wizard inputs frozen at the moment a run starts.
#[derive(Debug, Clone)]
pub struct GenerationSnapshot {
    pub details: WeddingDetails,
    pub style: StylePreset,
    pub pages: Vec<PageType>,
    pub high_quality: bool,
}

impl GenerationSnapshot {
    pub fn request_for(&self, page_type: PageType) -> GenerationRequest {
        GenerationRequest {
            page_type,
            details: self.details.clone(),
            style: self.style.clone(),
            high_quality: self.high_quality,
        }
    }
}

/// `round(100 * completed / total)`, clamped to 0..=100.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (completed.min(total) as f64 / total as f64) * 100.0;
    pct.round() as u8
}

/// Generates every selected page one after another, in selection order.
///
/// `on_progress` fires after each successful page, before the next call starts.
/// The first failure aborts the run and nothing generated so far is returned.
pub async fn run_generation<G, F>(
    generator: &G,
    snapshot: &GenerationSnapshot,
    mut on_progress: F,
) -> Result<GeneratedInvitation, GenerationError>
where
    G: PageGenerator + ?Sized,
    F: FnMut(u8),
{
    if snapshot.pages.is_empty() {
        return Err(GenerationError::NoPages);
    }

    let total = snapshot.pages.len();
    info!("🚀 Starting generation run: {} page(s) in style '{}' (high quality: {})", total, snapshot.style.id, snapshot.high_quality);

    let mut pages = Vec::with_capacity(total);
    for (i, page_type) in snapshot.pages.iter().copied().enumerate() {
        info!("🎯 Generating '{}' ({}/{})", page_type.label(), i + 1, total);
        let request = snapshot.request_for(page_type);
        let url = match generator.generate(&request).await {
            Ok(url) => url,
            Err(e) => {
                error!("❌ Generation of '{}' failed, aborting run: {}", page_type.label(), e);
                return Err(e);
            }
        };
        pages.push(GeneratedPage {
            page_type,
            url,
            prompt: format!("Generated for {}", page_type.label()),
        });
        on_progress(progress_percent(i + 1, total));
    }

    let invitation = GeneratedInvitation { id: Uuid::new_v4(), pages, timestamp: Utc::now() };
    info!("✅ Generation run {} finished with {} page(s)", invitation.id, invitation.pages.len());
    Ok(invitation)
}
