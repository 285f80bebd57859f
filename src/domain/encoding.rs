//! Categorical encodings used by the risk classifier.
//!
//! Every categorical indicator on the form is a closed enumeration, so a label
//! outside the menu cannot reach the pipeline. The numeric codes are the ones
//! the classifier was trained with and must never change at runtime.

use serde::{Deserialize, Serialize};

/// Binary indicator (doctor-diagnosed hypertension, dyslipidemia).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    /// Menu order as presented on the form.
    pub const ALL: [Self; 2] = [Self::Yes, Self::No];

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Yes => 1,
            Self::No => 0,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.label() == label.trim())
    }
}

/// Self-rated health on a five-level scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelfRatedHealth {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl SelfRatedHealth {
    pub const ALL: [Self; 5] = [
        Self::Excellent,
        Self::Good,
        Self::Fair,
        Self::Poor,
        Self::VeryPoor,
    ];

    /// Ordinal code, 1 (Excellent) through 5 (Very Poor).
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Excellent => 1,
            Self::Good => 2,
            Self::Fair => 3,
            Self::Poor => 4,
            Self::VeryPoor => 5,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.label() == label.trim())
    }
}

/// Number of basic activities of daily living the patient has difficulty with.
///
/// Six ADL domains are assessed (bathing, dressing, eating, toileting,
/// transferring, continence), so the count ranges over 0..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AdlDifficulties(u8);

impl AdlDifficulties {
    pub const MAX: u8 = 6;

    pub const ALL: [Self; 7] = [
        Self(0),
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
    ];

    /// Build from a count; `None` when the count exceeds the six ADL domains.
    #[must_use]
    pub fn new(count: u8) -> Option<Self> {
        (count <= Self::MAX).then_some(Self(count))
    }

    #[must_use]
    pub fn code(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "0 Difficulties",
            1 => "1 Difficulty",
            2 => "2 Difficulties",
            3 => "3 Difficulties",
            4 => "4 Difficulties",
            5 => "5 Difficulties",
            _ => "6 Difficulties",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.label() == label.trim())
    }
}

impl TryFrom<u8> for AdlDifficulties {
    type Error = String;

    fn try_from(count: u8) -> Result<Self, Self::Error> {
        Self::new(count).ok_or_else(|| {
            format!(
                "ADL difficulty count {count} out of range [0, {}]",
                Self::MAX
            )
        })
    }
}

impl From<AdlDifficulties> for u8 {
    fn from(value: AdlDifficulties) -> Self {
        value.0
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_label!(YesNo, SelfRatedHealth, AdlDifficulties);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_no_codes() {
        assert_eq!(YesNo::Yes.code(), 1);
        assert_eq!(YesNo::No.code(), 0);
    }

    #[test]
    fn test_self_rated_health_codes_are_ordinal() {
        let codes: Vec<u8> = SelfRatedHealth::ALL.iter().map(|v| v.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5]);
        assert_eq!(SelfRatedHealth::VeryPoor.label(), "Very Poor");
    }

    #[test]
    fn test_adl_labels_match_counts() {
        for (i, adl) in AdlDifficulties::ALL.iter().enumerate() {
            assert_eq!(usize::from(adl.code()), i);
            assert!(adl.label().starts_with(&i.to_string()));
        }
        assert_eq!(AdlDifficulties::ALL[1].label(), "1 Difficulty");
        assert_eq!(AdlDifficulties::ALL[0].label(), "0 Difficulties");
        assert!(AdlDifficulties::new(7).is_none());
    }

    #[test]
    fn test_labels_parse_back() {
        for v in YesNo::ALL {
            assert_eq!(YesNo::from_label(v.label()), Some(v));
        }
        for v in SelfRatedHealth::ALL {
            assert_eq!(SelfRatedHealth::from_label(v.label()), Some(v));
        }
        for v in AdlDifficulties::ALL {
            assert_eq!(AdlDifficulties::from_label(v.label()), Some(v));
        }
        assert_eq!(SelfRatedHealth::from_label("Terrible"), None);
        assert_eq!(YesNo::from_label("maybe"), None);
    }

    #[test]
    fn test_adl_serde_rejects_out_of_range() {
        let ok: AdlDifficulties = serde_json::from_str("3").expect("in range");
        assert_eq!(ok.code(), 3);
        assert!(serde_json::from_str::<AdlDifficulties>("9").is_err());
    }
}
