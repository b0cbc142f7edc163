//! Page classification and next-action decision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::de;

/// What kind of page is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    List,
    Detail,
    Login,
    Error,
    Captcha,
    Unknown,
}

impl PageType {
    /// Pages that stop this attempt until someone intervenes.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Login | Self::Captcha | Self::Error)
    }
}

/// How the page paginates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationType {
    Numbered,
    NextPrev,
    LoadMore,
    InfiniteScroll,
}

/// The single next step the crawl loop should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Extract,
    Click,
    Scroll,
    Navigate,
    Fill,
    Wait,
    Done,
    Error,
}

impl ActionType {
    /// Actions that cannot run without an element to act on.
    pub fn requires_target(&self) -> bool {
        matches!(self, Self::Click | Self::Fill)
    }

    /// Actions that carry text to enter or a URL to open in `value`.
    pub fn takes_value(&self) -> bool {
        matches!(self, Self::Fill | Self::Navigate)
    }
}

/// Display as the wire name, taken from the serde attributes.
macro_rules! display_wire {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match serde_json::to_value(self) {
                    Ok(serde_json::Value::String(name)) => f.write_str(&name),
                    _ => write!(f, "{:?}", self),
                }
            }
        })*
    };
}

display_wire!(PageType, PaginationType, ActionType);

/// Pixel position on the screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// An element on the page the action refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementTarget {
    /// CSS-selector-like locator. Blank selectors read as absent.
    #[serde(
        default,
        deserialize_with = "de::optional_locator",
        skip_serializing_if = "Option::is_none"
    )]
    pub selector: Option<String>,

    #[serde(deserialize_with = "de::non_blank")]
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl ElementTarget {
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            selector: None,
            description: description.into(),
            coordinates: None,
        }
    }

    /// A selector or coordinates exist, so a browser can act on it.
    pub fn is_locatable(&self) -> bool {
        self.selector.is_some() || self.coordinates.is_some()
    }
}

/// The model's recommended next step with its justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAction {
    pub action: ActionType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ElementTarget>,

    /// Text to fill or URL to navigate to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    pub reason: String,

    /// What the crawl loop should observe if the action worked
    pub expected_outcome: String,
}

impl RecommendedAction {
    /// A `fill` without text, or a `navigate` with neither URL nor target.
    ///
    /// Typical on login walls: the model knows what to do but not the
    /// credentials or destination, so a person has to supply them.
    pub fn needs_input(&self) -> bool {
        if !self.action.takes_value() || self.value.is_some() {
            return false;
        }
        self.action == ActionType::Fill || self.target.is_none()
    }
}

/// Result of classifying one page.
///
/// `current_page_number`/`total_pages` are the model's reading of the
/// page's own pagination widget. They are kept apart from the crawl loop's
/// counters and may disagree with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    pub page_type: PageType,

    pub has_opportunities: bool,

    #[serde(
        default,
        deserialize_with = "de::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub opportunity_count: Option<u32>,

    pub has_pagination: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_type: Option<PaginationType>,

    #[serde(
        default,
        deserialize_with = "de::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_page_number: Option<u32>,

    #[serde(
        default,
        deserialize_with = "de::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_pages: Option<u32>,

    pub recommended_action: RecommendedAction,

    #[serde(deserialize_with = "de::unit_interval")]
    pub confidence: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PageAnalysis {
    /// The crawl loop should call extraction for this page.
    pub fn should_extract(&self) -> bool {
        self.has_opportunities && !self.page_type.is_blocking()
    }
}
