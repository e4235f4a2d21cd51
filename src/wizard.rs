//! The four-step invitation wizard.
//!
//! [`WizardState`] is a plain value. Every transition borrows the current
//! state and hands back a replacement, so the owner swaps it wholesale and an
//! illegal action leaves the previous value untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::catalog;
use crate::generation::GenerationSnapshot;
use crate::models::{DetailsPatch, GeneratedInvitation, PageType, StylePreset, WeddingDetails};

pub const FAILURE_NOTICE: &str = "Something went wrong during generation. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStep {
    Details,
    Style,
    Pages,
    Result,
}

impl WizardStep {
    /// 1-based position shown in the header breadcrumb.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Details => 1,
            WizardStep::Style => 2,
            WizardStep::Pages => 3,
            WizardStep::Result => 4,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Details => "details",
            WizardStep::Style => "style",
            WizardStep::Pages => "pages",
            WizardStep::Result => "result",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("cannot {action} from the {from} step")]
    InvalidTransition { action: &'static str, from: WizardStep },
    #[error("a generation run is already in progress")]
    Busy,
    #[error("select at least one page before generating")]
    NoPagesSelected,
    #[error("no generation run is in progress")]
    NotGenerating,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub current_step: WizardStep,
    pub details: WeddingDetails,
    pub selected_style: StylePreset,
    pub selected_pages: Vec<PageType>,
    pub is_generating: bool,
    pub progress_percent: u8,
    pub result: Option<GeneratedInvitation>,
    pub high_quality: bool,
    /// User-facing message left by the last failed run.
    pub notice: Option<String>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::Details,
            details: catalog::default_details(),
            selected_style: catalog::default_style().clone(),
            selected_pages: catalog::default_pages(),
            is_generating: false,
            progress_percent: 0,
            result: None,
            high_quality: false,
            notice: None,
        }
    }

    fn require(&self, step: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.is_generating {
            return Err(WizardError::Busy);
        }
        if self.current_step != step {
            return Err(WizardError::InvalidTransition { action, from: self.current_step });
        }
        Ok(())
    }

    fn at(&self, step: WizardStep) -> Self {
        Self { current_step: step, ..self.clone() }
    }

    /// Details -> Style -> Pages. No field validation.
    pub fn next(&self) -> Result<Self, WizardError> {
        if self.is_generating {
            return Err(WizardError::Busy);
        }
        match self.current_step {
            WizardStep::Details => Ok(self.at(WizardStep::Style)),
            WizardStep::Style => Ok(self.at(WizardStep::Pages)),
            from => Err(WizardError::InvalidTransition { action: "advance", from }),
        }
    }

    /// Pages -> Style -> Details, keeping everything entered so far.
    pub fn back(&self) -> Result<Self, WizardError> {
        if self.is_generating {
            return Err(WizardError::Busy);
        }
        match self.current_step {
            WizardStep::Style => Ok(self.at(WizardStep::Details)),
            WizardStep::Pages => Ok(self.at(WizardStep::Style)),
            from => Err(WizardError::InvalidTransition { action: "go back", from }),
        }
    }

    /// Result -> Details. Drops the result and page selection; details, style and quality stay.
    pub fn start_over(&self) -> Result<Self, WizardError> {
        self.require(WizardStep::Result, "start over")?;
        Ok(Self {
            current_step: WizardStep::Details,
            selected_pages: catalog::default_pages(),
            progress_percent: 0,
            result: None,
            notice: None,
            ..self.clone()
        })
    }

    pub fn with_details(&self, patch: DetailsPatch) -> Result<Self, WizardError> {
        self.require(WizardStep::Details, "edit details")?;
        Ok(Self { details: self.details.patched(patch), ..self.clone() })
    }

    pub fn with_style(&self, style: &StylePreset) -> Result<Self, WizardError> {
        self.require(WizardStep::Style, "choose a style")?;
        Ok(Self { selected_style: style.clone(), ..self.clone() })
    }

    /// Removes `page` if selected (order of the rest kept), otherwise appends it.
    pub fn toggle_page(&self, page: PageType) -> Result<Self, WizardError> {
        self.require(WizardStep::Pages, "change pages")?;
        let mut selected_pages = self.selected_pages.clone();
        if selected_pages.contains(&page) {
            selected_pages.retain(|p| *p != page);
        } else {
            selected_pages.push(page);
        }
        Ok(Self { selected_pages, ..self.clone() })
    }

    pub fn with_high_quality(&self, high_quality: bool) -> Result<Self, WizardError> {
        self.require(WizardStep::Pages, "change quality")?;
        Ok(Self { high_quality, ..self.clone() })
    }

    /// Enters the generating overlay and freezes the inputs for the run.
    pub fn begin_generation(&self) -> Result<(Self, GenerationSnapshot), WizardError> {
        self.require(WizardStep::Pages, "generate")?;
        if self.selected_pages.is_empty() {
            return Err(WizardError::NoPagesSelected);
        }
        let snapshot = GenerationSnapshot {
            details: self.details.clone(),
            style: self.selected_style.clone(),
            pages: self.selected_pages.clone(),
            high_quality: self.high_quality,
        };
        let next = Self {
            is_generating: true,
            progress_percent: 0,
            result: None,
            notice: None,
            ..self.clone()
        };
        Ok((next, snapshot))
    }

    pub fn record_progress(&self, percent: u8) -> Result<Self, WizardError> {
        if !self.is_generating {
            return Err(WizardError::NotGenerating);
        }
        Ok(Self { progress_percent: self.progress_percent.max(percent.min(100)), ..self.clone() })
    }

    pub fn complete_generation(&self, invitation: GeneratedInvitation) -> Result<Self, WizardError> {
        if !self.is_generating {
            return Err(WizardError::NotGenerating);
        }
        Ok(Self {
            current_step: WizardStep::Result,
            is_generating: false,
            progress_percent: 100,
            result: Some(invitation),
            ..self.clone()
        })
    }

    /// Back to the page selection with all input intact.
    pub fn fail_generation(&self) -> Result<Self, WizardError> {
        if !self.is_generating {
            return Err(WizardError::NotGenerating);
        }
        Ok(Self {
            current_step: WizardStep::Pages,
            is_generating: false,
            result: None,
            notice: Some(FAILURE_NOTICE.to_string()),
            ..self.clone()
        })
    }
}
