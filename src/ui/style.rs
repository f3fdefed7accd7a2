//! CSS rendering of the cube orientation
//!
//! Produces the inline `transform`/`transition` style the widget element
//! carries. The transition is only present right after a manual spin step.

use crate::config::TransitionConfig;
use crate::domain::orientation::Orientation;

/// Style snapshot for one render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeStyle {
    pub orientation: Orientation,
    /// Set while the manual transition flag is on
    pub transition: Option<TransitionConfig>,
}

impl CubeStyle {
    /// `rotateX(..deg) rotateY(..deg)`
    pub fn transform(&self) -> String {
        format!(
            "rotateX({}deg) rotateY({}deg)",
            self.orientation.x, self.orientation.y
        )
    }

    /// `transform <ms>ms cubic-bezier(..)` or `none`
    pub fn transition(&self) -> String {
        match &self.transition {
            Some(transition) => format!(
                "transform {}ms {}",
                transition.duration.as_millis(),
                transition.easing
            ),
            None => "none".to_string(),
        }
    }

    /// Both properties as an inline style attribute value
    pub fn inline_style(&self) -> String {
        format!("transform: {}; transition: {}", self.transform(), self.transition())
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }
}
