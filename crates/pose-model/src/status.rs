//! Posture classification status and its user-facing presentation.

use serde::{Deserialize, Serialize};

/// Current posture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostureStatus {
    Good,
    Bad,
    /// No person, or the required joints were not confidently detected.
    #[default]
    NotFound,
}

/// Indicator color shown for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Green,
    Red,
    Gray,
}

/// How a status is rendered by a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPresentation {
    pub status: PostureStatus,
    pub color: StatusColor,
    pub text: &'static str,
}

/// Presentation for every status, one row each.
pub const STATUS_PRESENTATION: [StatusPresentation; 3] = [
    StatusPresentation {
        status: PostureStatus::Good,
        color: StatusColor::Green,
        text: "Good Posture",
    },
    StatusPresentation {
        status: PostureStatus::Bad,
        color: StatusColor::Red,
        text: "Adjust Posture!",
    },
    StatusPresentation {
        status: PostureStatus::NotFound,
        color: StatusColor::Gray,
        text: "Body Not Found",
    },
];

impl PostureStatus {
    fn table_index(self) -> usize {
        match self {
            PostureStatus::Good => 0,
            PostureStatus::Bad => 1,
            PostureStatus::NotFound => 2,
        }
    }

    pub fn presentation(self) -> &'static StatusPresentation {
        &STATUS_PRESENTATION[self.table_index()]
    }

    pub fn color(self) -> StatusColor {
        self.presentation().color
    }

    pub fn text(self) -> &'static str {
        self.presentation().text
    }
}

impl std::fmt::Display for PostureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PostureStatus::Good => "good",
            PostureStatus::Bad => "bad",
            PostureStatus::NotFound => "notFound",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_found() {
        assert_eq!(PostureStatus::default(), PostureStatus::NotFound);
    }

    #[test]
    fn test_presentation_table_is_total_and_aligned() {
        for status in [PostureStatus::Good, PostureStatus::Bad, PostureStatus::NotFound] {
            assert_eq!(status.presentation().status, status);
        }
        assert_eq!(PostureStatus::Good.color(), StatusColor::Green);
        assert_eq!(PostureStatus::Bad.text(), "Adjust Posture!");
        assert_eq!(PostureStatus::NotFound.color(), StatusColor::Gray);
    }

    #[test]
    fn test_serde_matches_display() {
        let json = serde_json::to_string(&PostureStatus::NotFound).unwrap();
        assert_eq!(json, "\"notFound\"");
        assert_eq!(PostureStatus::NotFound.to_string(), "notFound");
    }
}
