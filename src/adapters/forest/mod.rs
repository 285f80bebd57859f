//! Random forest adapter: Implementation of `RiskClassifier` over a JSON export.
//!
//! The training pipeline exports each fitted tree in the flat array layout
//! scikit-learn uses internally (`children_left`, `children_right`,
//! `feature`, `threshold`, `value`). This module validates that export once
//! and evaluates it in-process.
//!
//! # Semantics
//!
//! - A node is a leaf when `children_left[i] == -1`.
//! - At a split node the sample goes left when `x[feature] <= threshold`.
//! - Each leaf's class counts are normalized to a distribution; the forest
//!   probability is the mean positive-class share over all trees.
//! - The hard label is 1 only when that mean is strictly above 0.5, so an
//!   exact tie resolves to class 0 like an argmax over `[p0, p1]`.

use serde::{Deserialize, Serialize};

use crate::adapters::ArtifactError;
use crate::domain::FeatureVector;
use crate::ports::{ClassifierError, RiskClassifier};

/// Leaf marker in `children_left` / `children_right`.
const TREE_LEAF: i64 = -1;

/// Export format identifier accepted by this adapter.
const FORMAT: &str = "random_forest";

/// Forest parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedForest {
    pub format: String,
    pub version: u32,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub classes: Vec<u8>,
    pub trees: Vec<ExportedTree>,
}

/// One fitted tree in flat array layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts (or weighted fractions) for classes `[0, 1]`.
    pub value: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        positive: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_export(
        idx: usize,
        tree: &ExportedTree,
        n_features: usize,
    ) -> Result<Self, ArtifactError> {
        let n = tree.children_left.len();
        if n == 0 {
            return Err(ArtifactError::Format(format!("tree {idx} has no nodes")));
        }
        if tree.children_right.len() != n
            || tree.feature.len() != n
            || tree.threshold.len() != n
            || tree.value.len() != n
        {
            return Err(ArtifactError::Format(format!(
                "tree {idx}: node array lengths differ"
            )));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let left = tree.children_left[i];
            let right = tree.children_right[i];

            if left == TREE_LEAF || right == TREE_LEAF {
                if left != right {
                    return Err(ArtifactError::Format(format!(
                        "tree {idx} node {i}: exactly one child is a leaf marker"
                    )));
                }
                let [neg, pos] = tree.value[i];
                let total = neg + pos;
                if !(neg.is_finite() && pos.is_finite()) || neg < 0.0 || pos < 0.0 || total <= 0.0
                {
                    return Err(ArtifactError::Format(format!(
                        "tree {idx} node {i}: invalid leaf class counts"
                    )));
                }
                nodes.push(Node::Leaf {
                    positive: pos / total,
                });
                continue;
            }

            // Children always come after their parent, which also rules out cycles.
            let child = |c: i64| -> Result<usize, ArtifactError> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .ok_or_else(|| {
                        ArtifactError::Format(format!(
                            "tree {idx} node {i}: child index {c} out of range"
                        ))
                    })
            };
            let feature = usize::try_from(tree.feature[i])
                .ok()
                .filter(|&f| f < n_features)
                .ok_or_else(|| {
                    ArtifactError::Format(format!(
                        "tree {idx} node {i}: feature index {} out of range",
                        tree.feature[i]
                    ))
                })?;
            let threshold = tree.threshold[i];
            if !threshold.is_finite() {
                return Err(ArtifactError::Format(format!(
                    "tree {idx} node {i}: non-finite threshold"
                )));
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    fn positive_share(&self, x: &[f64]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf { positive } => return positive,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Random forest classifier loaded from an [`ExportedForest`].
///
/// Immutable after construction; safe to share across threads.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    feature_names: Vec<String>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    /// Validate an export and build the classifier.
    ///
    /// # Errors
    /// Returns `ArtifactError::Format` if the export is structurally invalid.
    pub fn from_export(export: ExportedForest) -> Result<Self, ArtifactError> {
        if export.format != FORMAT {
            return Err(ArtifactError::Format(format!(
                "unsupported model format '{}', expected '{FORMAT}'",
                export.format
            )));
        }
        if export.version != 1 {
            return Err(ArtifactError::Format(format!(
                "unsupported model version {}",
                export.version
            )));
        }
        if export.classes != [0, 1] {
            return Err(ArtifactError::Format(format!(
                "expected binary classes [0, 1], got {:?}",
                export.classes
            )));
        }
        if export.n_features == 0 || export.feature_names.len() != export.n_features {
            return Err(ArtifactError::Format(format!(
                "feature_names has {} entries but n_features is {}",
                export.feature_names.len(),
                export.n_features
            )));
        }
        if export.trees.is_empty() {
            return Err(ArtifactError::Format("forest has no trees".into()));
        }

        let trees = export
            .trees
            .iter()
            .enumerate()
            .map(|(idx, t)| DecisionTree::from_export(idx, t, export.n_features))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "Loaded random forest (n_trees={}, n_features={})",
            trees.len(),
            export.n_features
        );

        Ok(Self {
            feature_names: export.feature_names,
            n_features: export.n_features,
            trees,
        })
    }

    /// Parse and validate a JSON export.
    ///
    /// # Errors
    /// Returns `ArtifactError::Format` on malformed JSON or structure.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let export: ExportedForest = serde_json::from_slice(bytes)
            .map_err(|e| ArtifactError::Format(format!("invalid model JSON: {e}")))?;
        Self::from_export(export)
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn check_input<'a>(&self, features: &'a FeatureVector) -> Result<&'a [f64], ClassifierError> {
        let x = features.as_slice();
        if x.len() != self.n_features {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.n_features,
                got: x.len(),
            });
        }
        if let Some(index) = x.iter().position(|v| !v.is_finite()) {
            return Err(ClassifierError::NonFiniteFeature { index });
        }
        Ok(x)
    }
}

impl RiskClassifier for RandomForestClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<u8, ClassifierError> {
        let p = self.predict_proba(features)?;
        Ok(u8::from(p > 0.5))
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        let x = self.check_input(features)?;
        let sum: f64 = self.trees.iter().map(|t| t.positive_share(x)).sum();
        let p = sum / self.trees.len() as f64;
        if !(0.0..=1.0).contains(&p) {
            return Err(ClassifierError::InvalidProbability(p));
        }
        Ok(p)
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::FeatureId;

    /// A stump splitting on `feature` at `threshold`, with the given leaf counts.
    pub(crate) fn stump(feature: i64, threshold: f64, left: [f64; 2], right: [f64; 2]) -> ExportedTree {
        ExportedTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![[left[0] + right[0], left[1] + right[1]], left, right],
        }
    }

    /// A small forest over the nine form features.
    ///
    /// Tree 1 splits on waist circumference (index 5) at 90 cm, tree 2 on
    /// hypertension (index 0).
    pub(crate) fn sample_export() -> ExportedForest {
        ExportedForest {
            format: FORMAT.into(),
            version: 1,
            n_features: 9,
            feature_names: FeatureId::ALL.iter().map(|id| id.as_str().to_string()).collect(),
            classes: vec![0, 1],
            trees: vec![
                stump(5, 90.0, [9.0, 1.0], [2.0, 8.0]),
                stump(0, 0.5, [17.0, 3.0], [4.0, 16.0]),
            ],
        }
    }

    fn vector(waist: f64, hypertension: f64) -> FeatureVector {
        FeatureVector::from(vec![hypertension, 0.0, 1.0, 0.0, 8.5, waist, 6.0, 250.0, 1.1])
    }

    #[test]
    fn test_forest_averages_tree_shares() {
        let forest = RandomForestClassifier::from_export(sample_export()).expect("valid forest");
        assert_eq!(forest.n_trees(), 2);

        // Both trees go left: (0.1 + 0.15) / 2
        let p = forest.predict_proba(&vector(80.0, 0.0)).expect("predict");
        assert!((p - 0.125).abs() < 1e-12);
        assert_eq!(forest.predict(&vector(80.0, 0.0)).expect("predict"), 0);

        // Both trees go right: (0.8 + 0.8) / 2
        let p = forest.predict_proba(&vector(101.0, 1.0)).expect("predict");
        assert!((p - 0.8).abs() < 1e-12);
        assert_eq!(forest.predict(&vector(101.0, 1.0)).expect("predict"), 1);
    }

    #[test]
    fn test_threshold_goes_left() {
        let forest = RandomForestClassifier::from_export(sample_export()).expect("valid forest");
        let at = forest.predict_proba(&vector(90.0, 0.0)).expect("predict");
        let below = forest.predict_proba(&vector(89.9, 0.0)).expect("predict");
        assert_eq!(at, below);
    }

    #[test]
    fn test_tie_resolves_to_negative_class() {
        let mut export = sample_export();
        export.trees = vec![stump(5, 90.0, [1.0, 1.0], [1.0, 1.0])];
        let forest = RandomForestClassifier::from_export(export).expect("valid forest");
        let v = vector(80.0, 0.0);
        assert_eq!(forest.predict_proba(&v).expect("predict"), 0.5);
        assert_eq!(forest.predict(&v).expect("predict"), 0);
    }

    #[test]
    fn test_rejects_wrong_dimension_and_nan() {
        let forest = RandomForestClassifier::from_export(sample_export()).expect("valid forest");
        let short = FeatureVector::from(vec![1.0; 8]);
        assert_eq!(
            forest.predict_proba(&short),
            Err(ClassifierError::DimensionMismatch { expected: 9, got: 8 })
        );

        let nan = vector(f64::NAN, 0.0);
        assert_eq!(
            forest.predict_proba(&nan),
            Err(ClassifierError::NonFiniteFeature { index: 5 })
        );
    }

    #[test]
    fn test_rejects_malformed_trees() {
        let mut backwards = sample_export();
        backwards.trees[0].children_left[0] = 0;
        assert!(RandomForestClassifier::from_export(backwards).is_err());

        let mut bad_feature = sample_export();
        bad_feature.trees[1].feature[0] = 9;
        assert!(RandomForestClassifier::from_export(bad_feature).is_err());

        let mut empty_leaf = sample_export();
        empty_leaf.trees[0].value[1] = [0.0, 0.0];
        assert!(RandomForestClassifier::from_export(empty_leaf).is_err());

        let mut multiclass = sample_export();
        multiclass.classes = vec![0, 1, 2];
        assert!(RandomForestClassifier::from_export(multiclass).is_err());

        let mut no_trees = sample_export();
        no_trees.trees.clear();
        assert!(RandomForestClassifier::from_export(no_trees).is_err());
    }

    #[test]
    fn test_json_roundtrip_through_loader() {
        let json = serde_json::to_vec(&sample_export()).expect("serialize");
        let forest = RandomForestClassifier::from_json_slice(&json).expect("load");
        assert_eq!(forest.feature_names().map(<[String]>::len), Some(9));
        assert!(RandomForestClassifier::from_json_slice(b"{not json").is_err());
    }
}
