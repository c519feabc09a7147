//! Static media-literacy tips keyed by (label, confidence bucket).

use crate::models::{ConfidenceBucket, Label};

/// Appended to every recommendation list.
pub const LITERACY_TIP: &str =
    "Digital literacy tip: approach online information with healthy skepticism and verify before sharing.";

const FAKE_HIGH: &[&str] = &[
    "Verify with reputable sources like AP News, Reuters, or BBC before believing or sharing this.",
    "Check the publication date: old stories are often repurposed as breaking news.",
    "Look for official statements from the authorities or organizations mentioned.",
    "Reverse image search any accompanying photos.",
    "Use fact-checking sites like Snopes or FactCheck.org.",
];

const FAKE_MEDIUM: &[&str] = &[
    "Parts of this content resemble known misleading stories; verify key claims independently.",
    "Check whether established outlets report the same facts.",
    "Look for named sources and links to primary documents.",
    "Watch for emotionally charged or sensational wording.",
];

const FAKE_LOW: &[&str] = &[
    "The analysis is uncertain; treat this result as a prompt to investigate, not a conclusion.",
    "Search for the headline on a fact-checking site.",
    "Check the author and the outlet's track record.",
];

const REAL_HIGH: &[&str] = &[
    "Cross-reference with multiple reliable sources.",
    "Check author credentials and publication history.",
    "Be aware of potential biases in the reporting.",
    "Look for supporting evidence and citations.",
    "Consider the tone: credible news is typically neutral.",
];

const REAL_MEDIUM: &[&str] = &[
    "This content looks broadly credible, but confirm the key facts with a second outlet.",
    "Check author credentials and publication history.",
    "Look for supporting evidence and citations.",
];

const REAL_LOW: &[&str] = &[
    "The analysis is uncertain; do not treat this result as confirmation.",
    "Cross-reference with multiple reliable sources.",
    "Check the publication date and whether the story has been updated or corrected.",
];

fn table(label: Label, bucket: ConfidenceBucket) -> &'static [&'static str] {
    match (label, bucket) {
        (Label::Fake, ConfidenceBucket::High) => FAKE_HIGH,
        (Label::Fake, ConfidenceBucket::Medium) => FAKE_MEDIUM,
        (Label::Fake, ConfidenceBucket::Low) => FAKE_LOW,
        (Label::Real, ConfidenceBucket::High) => REAL_HIGH,
        (Label::Real, ConfidenceBucket::Medium) => REAL_MEDIUM,
        (Label::Real, ConfidenceBucket::Low) => REAL_LOW,
    }
}

pub fn recommendations(label: Label, bucket: ConfidenceBucket) -> Vec<String> {
    table(label, bucket)
        .iter()
        .copied()
        .chain(std::iter::once(LITERACY_TIP))
        .map(str::to_string)
        .collect()
}
