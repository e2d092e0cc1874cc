//! Engagement score aggregation
//!
//! Turns raw questionnaire answers into validated item scores and
//! per-domain composite ratings. Everything here is pure: no I/O, no
//! failure modes. Invalid answers are treated as unanswered.
//!
//! ## Domains
//!
//! | Domain                    | Items          |
//! |---------------------------|----------------|
//! | `basic_needs`             | q1, q2         |
//! | `individual_contribution` | q3, q4         |
//! | `team_belonging`          | q5 ..= q10     |
//! | `personal_growth`         | q11, q12       |

mod parse;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub use parse::parse_item_value;

/// Lowest valid answer on the questionnaire scale
pub const MIN_SCORE: i32 = 1;

/// Highest valid answer on the questionnaire scale
pub const MAX_SCORE: i32 = 6;

/// Questionnaire item keys, in order
pub const ITEM_KEYS: [&str; 12] = [
    "q1", "q2", "q3", "q4", "q5", "q6", "q7", "q8", "q9", "q10", "q11", "q12",
];

/// Validated item scores keyed by item (`q1`..`q12`), sparse
pub type ItemScores = BTreeMap<String, i32>;

/// Domain composite scores keyed by domain name, sparse
pub type DomainScores = BTreeMap<String, i32>;

/// A named cluster of questionnaire items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    BasicNeeds,
    IndividualContribution,
    TeamBelonging,
    PersonalGrowth,
}

impl Domain {
    /// All domains in reporting order
    pub const ALL: [Domain; 4] = [
        Domain::BasicNeeds,
        Domain::IndividualContribution,
        Domain::TeamBelonging,
        Domain::PersonalGrowth,
    ];

    /// Storage and wire name of the domain
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BasicNeeds => "basic_needs",
            Self::IndividualContribution => "individual_contribution",
            Self::TeamBelonging => "team_belonging",
            Self::PersonalGrowth => "personal_growth",
        }
    }

    /// Item keys belonging to this domain
    pub fn items(&self) -> &'static [&'static str] {
        match self {
            Self::BasicNeeds => &["q1", "q2"],
            Self::IndividualContribution => &["q3", "q4"],
            Self::TeamBelonging => &["q5", "q6", "q7", "q8", "q9", "q10"],
            Self::PersonalGrowth => &["q11", "q12"],
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`aggregate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub item_scores: ItemScores,
    pub domain_scores: DomainScores,
}

/// Keep the items whose answers parse to an integer on the 1-6 scale.
///
/// Keys outside `q1`..`q12` are ignored. Null counts as unanswered.
pub fn validate_items(raw: &Map<String, Value>) -> ItemScores {
    ITEM_KEYS
        .iter()
        .filter_map(|key| {
            let value = raw.get(*key)?;
            let n = parse_item_value(value)?;
            (i64::from(MIN_SCORE)..=i64::from(MAX_SCORE))
                .contains(&n)
                .then(|| ((*key).to_string(), n as i32))
        })
        .collect()
}

/// Average each domain over its answered items.
///
/// The mean is rounded half-up and clamped to the scale. A domain with no
/// answered items is left out entirely.
pub fn domain_scores(items: &ItemScores) -> DomainScores {
    let mut scores = DomainScores::new();

    for domain in Domain::ALL {
        let (sum, count) = domain
            .items()
            .iter()
            .filter_map(|key| items.get(*key))
            .fold((0i64, 0i64), |(sum, count), v| (sum + i64::from(*v), count + 1));

        if count == 0 {
            continue;
        }

        scores.insert(domain.as_str().to_string(), round_mean(sum, count));
    }

    scores
}

/// Validate raw answers and compute domain scores in one pass
pub fn aggregate(raw: &Map<String, Value>) -> Aggregation {
    let item_scores = validate_items(raw);
    let domain_scores = domain_scores(&item_scores);
    Aggregation {
        item_scores,
        domain_scores,
    }
}

/// Half-up rounding of `sum / count`, clamped to the score range.
///
/// `floor(sum/count + 1/2) == floor((2*sum + count) / (2*count))`, which keeps
/// the arithmetic exact for non-negative sums.
fn round_mean(sum: i64, count: i64) -> i32 {
    let rounded = (2 * sum + count).div_euclid(2 * count);
    rounded.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE)) as i32
}
