//! Feature encoding and ordering for the classifier.
//!
//! The model was trained on nine columns whose order is shipped alongside it
//! as a feature manifest (`feature_names.json`). [`FeatureManifest`] checks
//! that manifest once at startup; [`assemble`] then projects encoded inputs
//! into that order.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::patient::RawInput;
use crate::{CardiorenalError, Result};

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 9;

/// Column identifiers used by the model export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureId {
    #[serde(rename = "hibpe")]
    Hibpe,
    #[serde(rename = "dyslipe")]
    Dyslipe,
    #[serde(rename = "srh")]
    Srh,
    #[serde(rename = "adlab_cADL")]
    AdlabCadl,
    #[serde(rename = "tyg_bmi")]
    TygBmi,
    #[serde(rename = "mwaist")]
    Mwaist,
    #[serde(rename = "bl_wbc")]
    BlWbc,
    #[serde(rename = "bl_pltPlatelets")]
    BlPlatelets,
    #[serde(rename = "Cr_CysC_Ratio")]
    CrCysCRatio,
}

impl FeatureId {
    /// Form order.
    pub const ALL: [Self; FEATURE_COUNT] = [
        Self::Hibpe,
        Self::Dyslipe,
        Self::Srh,
        Self::AdlabCadl,
        Self::TygBmi,
        Self::Mwaist,
        Self::BlWbc,
        Self::BlPlatelets,
        Self::CrCysCRatio,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hibpe => "hibpe",
            Self::Dyslipe => "dyslipe",
            Self::Srh => "srh",
            Self::AdlabCadl => "adlab_cADL",
            Self::TygBmi => "tyg_bmi",
            Self::Mwaist => "mwaist",
            Self::BlWbc => "bl_wbc",
            Self::BlPlatelets => "bl_pltPlatelets",
            Self::CrCysCRatio => "Cr_CysC_Ratio",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for FeatureId {
    type Err = CardiorenalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| {
                CardiorenalError::ManifestMismatch(format!(
                    "manifest references unknown feature '{s}'"
                ))
            })
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated input with every categorical answer replaced by its code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedInput {
    values: [f64; FEATURE_COUNT],
}

impl EncodedInput {
    #[must_use]
    pub fn encode(input: &RawInput) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        values[FeatureId::Hibpe.index()] = f64::from(input.hypertension.code());
        values[FeatureId::Dyslipe.index()] = f64::from(input.dyslipidemia.code());
        values[FeatureId::Srh.index()] = f64::from(input.self_rated_health.code());
        values[FeatureId::AdlabCadl.index()] = f64::from(input.adl_difficulties.code());
        values[FeatureId::TygBmi.index()] = input.tyg_bmi;
        values[FeatureId::Mwaist.index()] = input.waist_circumference;
        values[FeatureId::BlWbc.index()] = input.white_cell_count;
        values[FeatureId::BlPlatelets.index()] = input.platelet_count;
        values[FeatureId::CrCysCRatio.index()] = input.creatinine_cystatin_ratio;
        Self { values }
    }

    #[must_use]
    pub fn get(&self, id: FeatureId) -> f64 {
        self.values[id.index()]
    }
}

/// Ordered feature identifiers the classifier was trained on.
///
/// Construction guarantees exactly the nine known identifiers, each once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureManifest {
    order: Vec<FeatureId>,
}

impl FeatureManifest {
    /// Parse and check a manifest from identifier strings.
    ///
    /// # Errors
    /// Returns `CardiorenalError::ManifestMismatch` if an identifier is
    /// unknown, repeated or missing, or the length is not nine.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.len() != FEATURE_COUNT {
            return Err(CardiorenalError::ManifestMismatch(format!(
                "manifest lists {} features, expected {FEATURE_COUNT}",
                names.len()
            )));
        }

        let mut seen = HashSet::with_capacity(FEATURE_COUNT);
        let mut order = Vec::with_capacity(FEATURE_COUNT);
        for name in names {
            let id: FeatureId = name.as_ref().parse()?;
            if !seen.insert(id) {
                return Err(CardiorenalError::ManifestMismatch(format!(
                    "manifest lists feature '{id}' more than once"
                )));
            }
            order.push(id);
        }

        // Nine distinct known ids out of nine means none is missing.
        Ok(Self { order })
    }

    /// Manifest in form order.
    #[must_use]
    pub fn form_order() -> Self {
        Self {
            order: FeatureId::ALL.to_vec(),
        }
    }

    #[must_use]
    pub fn order(&self) -> &[FeatureId] {
        &self.order
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.order.iter().map(|id| id.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Classifier input: encoded values in manifest order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Encode a validated input and order it by the manifest.
#[must_use]
pub fn assemble(input: &RawInput, manifest: &FeatureManifest) -> FeatureVector {
    let encoded = EncodedInput::encode(input);
    FeatureVector(manifest.order.iter().map(|&id| encoded.get(id)).collect())
}

/// Like [`assemble`], but takes the manifest as raw identifier strings.
///
/// # Errors
/// Returns `CardiorenalError::ManifestMismatch` when the names do not form a
/// valid manifest.
pub fn assemble_with_names<S: AsRef<str>>(input: &RawInput, names: &[S]) -> Result<FeatureVector> {
    let manifest = FeatureManifest::from_names(names)?;
    Ok(assemble(input, &manifest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::sample_input;

    #[test]
    fn test_encodes_sample_in_form_order() {
        let v = assemble(&sample_input(), &FeatureManifest::form_order());
        assert_eq!(
            v.as_slice(),
            &[0.0, 0.0, 1.0, 0.0, 8.5, 80.0, 6.0, 250.0, 1.1]
        );
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let input = sample_input();
        assert_eq!(EncodedInput::encode(&input), EncodedInput::encode(&input));
    }

    #[test]
    fn test_vector_follows_any_manifest_order() {
        let input = sample_input();
        let encoded = EncodedInput::encode(&input);

        // Rotations and a reversal cover every position for every feature.
        let mut orders: Vec<Vec<FeatureId>> = (0..FEATURE_COUNT)
            .map(|k| {
                let mut ids = FeatureId::ALL.to_vec();
                ids.rotate_left(k);
                ids
            })
            .collect();
        let mut reversed = FeatureId::ALL.to_vec();
        reversed.reverse();
        orders.push(reversed);

        for ids in orders {
            let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
            let manifest = FeatureManifest::from_names(&names).expect("valid manifest");
            let v = assemble(&input, &manifest);
            assert_eq!(v.len(), manifest.len());
            for (value, id) in v.as_slice().iter().zip(&ids) {
                assert_eq!(*value, encoded.get(*id));
            }
        }
    }

    #[test]
    fn test_unknown_feature_is_manifest_mismatch() {
        let mut names: Vec<&str> = FeatureId::ALL.iter().map(|id| id.as_str()).collect();
        names[3] = "bmi";
        let err = assemble_with_names(&sample_input(), &names).expect_err("must fail");
        assert!(matches!(err, CardiorenalError::ManifestMismatch(ref msg) if msg.contains("bmi")));
    }

    #[test]
    fn test_duplicate_or_short_manifest_is_rejected() {
        let mut names: Vec<&str> = FeatureId::ALL.iter().map(|id| id.as_str()).collect();
        names[8] = "hibpe";
        assert!(matches!(
            FeatureManifest::from_names(&names),
            Err(CardiorenalError::ManifestMismatch(_))
        ));

        let all = FeatureId::ALL.map(FeatureId::as_str);
        let short = &all[..8];
        assert!(matches!(
            FeatureManifest::from_names(short),
            Err(CardiorenalError::ManifestMismatch(_))
        ));
    }

    #[test]
    fn test_manifest_json_names() {
        let names: Vec<String> = serde_json::from_str(
            r#"["Cr_CysC_Ratio","bl_pltPlatelets","bl_wbc","mwaist","tyg_bmi","adlab_cADL","srh","dyslipe","hibpe"]"#,
        )
        .expect("json");
        let manifest = FeatureManifest::from_names(&names).expect("valid");
        assert_eq!(manifest.order()[0], FeatureId::CrCysCRatio);
        assert_eq!(manifest.names()[8], "hibpe");
    }
}
