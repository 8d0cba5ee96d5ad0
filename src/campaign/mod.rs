//! Campaign creation draft: basics, panel allocation, redirects, review

pub mod draft;

pub use draft::{BasicsForm, CampaignDraft, PanelAllocation, RedirectsForm};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CampaignStep {
    Basics,
    Panels,
    Redirects,
    Review,
}

impl CampaignStep {
    pub const COUNT: u8 = 4;

    pub fn number(&self) -> u8 {
        match self {
            CampaignStep::Basics => 1,
            CampaignStep::Panels => 2,
            CampaignStep::Redirects => 3,
            CampaignStep::Review => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(CampaignStep::Basics),
            2 => Some(CampaignStep::Panels),
            3 => Some(CampaignStep::Redirects),
            4 => Some(CampaignStep::Review),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CampaignStep::Basics => "Basics",
            CampaignStep::Panels => "Panels",
            CampaignStep::Redirects => "Redirects",
            CampaignStep::Review => "Review",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CampaignStep::Basics => "Campaign Basics",
            CampaignStep::Panels => "Select Panels",
            CampaignStep::Redirects => "Redirect URLs",
            CampaignStep::Review => "Review & Launch",
        }
    }

    fn following(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    fn preceding(&self) -> Option<Self> {
        Self::from_number(self.number().checked_sub(1)?)
    }
}

impl fmt::Display for CampaignStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of {}: {}", self.number(), Self::COUNT, self.title())
    }
}
