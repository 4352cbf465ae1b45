//! Ordinal sentiment scale attached to brand mentions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// How an AI answer positions a brand.
///
/// The scale is ordinal, not nominal: [`Ord`] follows [`Sentiment::score`],
/// so `StrongEndorsement > PositiveEndorsement > ... > NotMentioned`.
/// Unknown labels in a payload deserialize to `NotMentioned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    StrongEndorsement,
    PositiveEndorsement,
    NeutralMention,
    Conditional,
    NegativeComparison,
    #[default]
    #[serde(other)]
    NotMentioned,
}

impl Sentiment {
    /// All labels, most positive first.
    pub const ALL: [Sentiment; 6] = [
        Sentiment::StrongEndorsement,
        Sentiment::PositiveEndorsement,
        Sentiment::NeutralMention,
        Sentiment::Conditional,
        Sentiment::NegativeComparison,
        Sentiment::NotMentioned,
    ];

    /// Ordinal score: 5 for a strong endorsement down to 0 for no mention.
    #[must_use]
    pub fn score(self) -> u8 {
        match self {
            Sentiment::StrongEndorsement => 5,
            Sentiment::PositiveEndorsement => 4,
            Sentiment::NeutralMention => 3,
            Sentiment::Conditional => 2,
            Sentiment::NegativeComparison => 1,
            Sentiment::NotMentioned => 0,
        }
    }

    /// Inverse of [`Sentiment::score`]. Out-of-range scores map to `NotMentioned`.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            5 => Sentiment::StrongEndorsement,
            4 => Sentiment::PositiveEndorsement,
            3 => Sentiment::NeutralMention,
            2 => Sentiment::Conditional,
            1 => Sentiment::NegativeComparison,
            _ => Sentiment::NotMentioned,
        }
    }

    /// Returns the more definite of two sentiments.
    ///
    /// `NotMentioned` is always dominated, so merging it with anything yields
    /// the other value.
    #[must_use]
    pub fn merge(self, other: Sentiment) -> Sentiment {
        self.max(other)
    }

    /// `true` for every label except `NotMentioned`.
    #[must_use]
    pub fn is_mentioned(self) -> bool {
        self != Sentiment::NotMentioned
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Sentiment::StrongEndorsement => "Strong endorsement",
            Sentiment::PositiveEndorsement => "Positive endorsement",
            Sentiment::NeutralMention => "Neutral mention",
            Sentiment::Conditional => "Conditional",
            Sentiment::NegativeComparison => "Negative comparison",
            Sentiment::NotMentioned => "Not mentioned",
        }
    }
}

impl PartialOrd for Sentiment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sentiment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score().cmp(&other.score())
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_score() {
        assert!(Sentiment::StrongEndorsement > Sentiment::PositiveEndorsement);
        assert!(Sentiment::Conditional > Sentiment::NegativeComparison);
        assert!(Sentiment::NegativeComparison > Sentiment::NotMentioned);
    }

    #[test]
    fn merge_picks_higher_priority() {
        assert_eq!(
            Sentiment::NeutralMention.merge(Sentiment::PositiveEndorsement),
            Sentiment::PositiveEndorsement
        );
        assert_eq!(
            Sentiment::NotMentioned.merge(Sentiment::NegativeComparison),
            Sentiment::NegativeComparison
        );
    }

    #[test]
    fn score_round_trips_for_every_label() {
        for s in Sentiment::ALL {
            assert_eq!(Sentiment::from_score(s.score()), s);
        }
    }

    #[test]
    fn deserializes_snake_case_labels() {
        let s: Sentiment = serde_json::from_str("\"positive_endorsement\"").unwrap();
        assert_eq!(s, Sentiment::PositiveEndorsement);
    }

    #[test]
    fn unknown_label_deserializes_to_not_mentioned() {
        let s: Sentiment = serde_json::from_str("\"enthusiastic\"").unwrap();
        assert_eq!(s, Sentiment::NotMentioned);
    }
}
