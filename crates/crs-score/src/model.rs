//! Persisted scoring models.
//!
//! A model artifact is JSON: either a bundle object carrying the estimator
//! under `model`, or the bare estimator. Estimators are tagged by `kind`:
//!
//! ```json
//! { "model": { "kind": "logistic_regression",
//!              "feature_names": ["dti", "grade"],
//!              "coefficients": [0.02, 0.4],
//!              "intercept": -3.1 } }
//! ```
//!
//! Gradient boosting trees are flat node lists rooted at index 0. A split
//! sends `x <= threshold` left, and a missing value follows `default_left`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crs_model::FeatureSet;

use crate::error::{Result, ScoreError};
use crate::hash::{normalize_sha256, sha256_hex};
use crate::matrix::FeatureMatrix;

/// Probability of default for each row of a feature matrix.
pub trait ScoringModel: Send + Sync {
    /// Features the model expects, in input order.
    fn feature_names(&self) -> &[String];

    /// One probability in `[0, 1]` per matrix row.
    fn predict_probability(&self, features: &FeatureMatrix) -> Result<Vec<f64>>;
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default)]
        default_left: bool,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn validate(&self, tree: usize, width: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {tree} has no nodes"));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= width {
                        return Err(format!(
                            "tree {tree} node {idx} uses feature {feature} of {width}"
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("tree {tree} node {idx} has a NaN threshold"));
                    }
                    // children after parents keeps every path finite
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!(
                                "tree {tree} node {idx} points to invalid child {child}"
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("tree {tree} node {idx} has a non-finite leaf"));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = row[*feature];
                    let go_left = if x.is_nan() {
                        *default_left
                    } else {
                        x <= *threshold
                    };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }
}

/// A fitted binary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression {
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    },
    GradientBoosting {
        feature_names: Vec<String>,
        #[serde(default)]
        init_score: f64,
        trees: Vec<Tree>,
    },
}

impl Estimator {
    pub fn feature_names(&self) -> &[String] {
        match self {
            Estimator::LogisticRegression { feature_names, .. }
            | Estimator::GradientBoosting { feature_names, .. } => feature_names,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::LogisticRegression { .. } => "logistic_regression",
            Estimator::GradientBoosting { .. } => "gradient_boosting",
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| ScoreError::InvalidModel { message };
        let width = self.feature_names().len();
        if width == 0 {
            return Err(invalid("model has no features".to_string()));
        }
        FeatureSet::new(self.feature_names().iter().cloned())
            .map_err(|err| invalid(err.to_string()))?;
        match self {
            Estimator::LogisticRegression {
                coefficients,
                intercept,
                ..
            } => {
                if coefficients.len() != width {
                    return Err(invalid(format!(
                        "{} coefficients for {width} features",
                        coefficients.len()
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|w| !w.is_finite()) {
                    return Err(invalid("non-finite coefficient".to_string()));
                }
            }
            Estimator::GradientBoosting {
                init_score, trees, ..
            } => {
                if !init_score.is_finite() {
                    return Err(invalid("non-finite init_score".to_string()));
                }
                for (idx, tree) in trees.iter().enumerate() {
                    tree.validate(idx, width).map_err(invalid)?;
                }
            }
        }
        Ok(())
    }

    fn raw_score(&self, row: &[f64]) -> f64 {
        match self {
            Estimator::LogisticRegression {
                coefficients,
                intercept,
                ..
            } => intercept + coefficients.iter().zip(row).map(|(w, x)| w * x).sum::<f64>(),
            Estimator::GradientBoosting {
                init_score, trees, ..
            } => init_score + trees.iter().map(|tree| tree.evaluate(row)).sum::<f64>(),
        }
    }
}

/// A loaded model artifact and its digest.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    estimator: Estimator,
    sha256: String,
    source: Option<PathBuf>,
}

impl ModelBundle {
    /// Wraps an estimator built in memory.
    pub fn new(estimator: Estimator) -> Result<Self> {
        estimator.validate()?;
        let bytes = serde_json::to_vec(&estimator).map_err(|err| ScoreError::InvalidModel {
            message: err.to_string(),
        })?;
        Ok(Self {
            estimator,
            sha256: sha256_hex(&bytes),
            source: None,
        })
    }

    /// Parses artifact bytes, accepting a bundle object or a bare estimator.
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self> {
        let parse_error = |message: String| ScoreError::ArtifactParse {
            path: path.to_path_buf(),
            message,
        };
        let value: Value = serde_json::from_slice(bytes).map_err(|err| parse_error(err.to_string()))?;
        let estimator_value = match value {
            Value::Object(mut map) if map.contains_key("model") => {
                map.remove("model").unwrap_or(Value::Null)
            }
            other => other,
        };
        let estimator: Estimator =
            serde_json::from_value(estimator_value).map_err(|err| parse_error(err.to_string()))?;
        estimator.validate()?;
        Ok(Self {
            estimator,
            sha256: sha256_hex(bytes),
            source: Some(path.to_path_buf()),
        })
    }

    /// Reads an artifact, checking its digest when one is expected.
    pub fn load(path: &Path, expected_sha256: Option<&str>) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| ScoreError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
        let actual = sha256_hex(&bytes);
        if let Some(expected) = expected_sha256 {
            let expected = normalize_sha256(expected)?;
            if actual != expected {
                return Err(ScoreError::Sha256Mismatch {
                    path: path.to_path_buf(),
                    expected,
                    actual,
                });
            }
        }
        let bundle = Self::from_slice(&bytes, path)?;
        info!(
            path = %path.display(),
            kind = bundle.estimator.kind(),
            features = bundle.estimator.feature_names().len(),
            sha256 = %bundle.sha256,
            "loaded model artifact"
        );
        Ok(bundle)
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The model's features as a pipeline feature set.
    pub fn feature_set(&self) -> Result<FeatureSet> {
        FeatureSet::new(self.estimator.feature_names().iter().cloned()).map_err(|err| {
            ScoreError::InvalidModel {
                message: err.to_string(),
            }
        })
    }
}

impl ScoringModel for ModelBundle {
    fn feature_names(&self) -> &[String] {
        self.estimator.feature_names()
    }

    fn predict_probability(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        if features.names() != self.feature_names() {
            return Err(ScoreError::FeatureMismatch {
                expected: self.feature_names().to_vec(),
                actual: features.names().to_vec(),
            });
        }
        features
            .iter_rows()
            .enumerate()
            .map(|(row, values)| {
                let probability = sigmoid(self.estimator.raw_score(values));
                if probability.is_finite() {
                    Ok(probability)
                } else {
                    Err(ScoreError::InvalidProbability {
                        row,
                        value: probability,
                    })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    fn stump() -> Estimator {
        Estimator::GradientBoosting {
            feature_names: names(&["grade"]),
            init_score: 0.0,
            trees: vec![Tree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 0,
                        threshold: 3.0,
                        left: 1,
                        right: 2,
                        default_left: false,
                    },
                    TreeNode::Leaf { value: -2.0 },
                    TreeNode::Leaf { value: 2.0 },
                ],
            }],
        }
    }

    #[test]
    fn logistic_regression_probability() {
        let model = ModelBundle::new(Estimator::LogisticRegression {
            feature_names: names(&["a", "b"]),
            coefficients: vec![1.0, -1.0],
            intercept: 0.0,
        })
        .unwrap();
        let matrix =
            FeatureMatrix::from_rows(names(&["a", "b"]), vec![vec![2.0, 2.0], vec![0.0, 50.0]])
                .unwrap();
        let probs = model.predict_probability(&matrix).unwrap();
        assert_eq!(probs[0], 0.5);
        assert!(probs[1] < 1e-6);
    }

    #[test]
    fn tree_routes_on_threshold_and_missing() {
        let model = ModelBundle::new(stump()).unwrap();
        let matrix = FeatureMatrix::from_rows(
            names(&["grade"]),
            vec![vec![3.0], vec![4.0], vec![f64::NAN]],
        )
        .unwrap();
        let probs = model.predict_probability(&matrix).unwrap();
        assert_eq!(probs[0], sigmoid(-2.0));
        assert_eq!(probs[1], sigmoid(2.0));
        assert_eq!(probs[2], sigmoid(2.0));
    }

    #[test]
    fn rejects_cyclic_trees() {
        let estimator = Estimator::GradientBoosting {
            feature_names: names(&["a"]),
            init_score: 0.0,
            trees: vec![Tree {
                nodes: vec![TreeNode::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 0,
                    right: 0,
                    default_left: true,
                }],
            }],
        };
        let err = ModelBundle::new(estimator).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid model: tree 0 node 0 points to invalid child 0"
        );
    }

    #[test]
    fn feature_names_must_match() {
        let model = ModelBundle::new(stump()).unwrap();
        let matrix = FeatureMatrix::from_rows(names(&["dti"]), vec![vec![1.0]]).unwrap();
        assert!(matches!(
            model.predict_probability(&matrix),
            Err(ScoreError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn bundle_and_bare_artifacts_agree() {
        let bare = serde_json::to_string(&stump()).unwrap();
        let bundle = format!(r#"{{"model": {bare}, "threshold": 0.5}}"#);
        let path = Path::new("model.json");
        let from_bare = ModelBundle::from_slice(bare.as_bytes(), path).unwrap();
        let from_bundle = ModelBundle::from_slice(bundle.as_bytes(), path).unwrap();
        assert_eq!(from_bare.estimator(), from_bundle.estimator());
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = ModelBundle::from_slice(br#"{"kind": "svm"}"#, Path::new("m.json")).unwrap_err();
        assert!(matches!(err, ScoreError::ArtifactParse { .. }));
    }
}
