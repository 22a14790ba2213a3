//! Modelo de gradient boosting (formato JSON de XGBoost)
//!
//! Lee el `model_final.json` que produce `XGBRegressor.save_model` y evalúa
//! el ensemble de árboles sobre una fila ya preprocesada.
//!
//! ```text
//! margin = base_margin + Σ leaf(tree, x)
//! output = link⁻¹(margin)
//! ```
//!
//! Un nodo es hoja cuando `left_children[n] == -1`; su valor está en
//! `split_conditions[n]`. En los nodos internos se va a la izquierda si
//! `x[split_indices[n]] < split_conditions[n]`, y por `default_left` si el
//! valor falta (NaN).
//!
//! Como XGBoost, umbrales, comparaciones y suma de hojas van en `f32`; solo
//! la función de enlace se aplica en `f64`. Los splits categóricos
//! (`split_type != 0`) no están soportados y se rechazan al cargar.

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoosterError {
    #[error("invalid model document: {0}")]
    InvalidDocument(String),

    #[error("unsupported objective '{0}'")]
    UnsupportedObjective(String),

    #[error("tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: String },

    #[error("feature length mismatch: got {got}, model uses index {needed}")]
    FeatureMismatch { got: usize, needed: usize },
}

// ---------- Documento JSON ----------

#[derive(Deserialize)]
struct ModelDocument {
    learner: LearnerDocument,
}

#[derive(Deserialize)]
struct LearnerDocument {
    learner_model_param: LearnerModelParam,
    objective: ObjectiveDocument,
    gradient_booster: GradientBoosterDocument,
}

#[derive(Deserialize)]
struct LearnerModelParam {
    base_score: String,
}

#[derive(Deserialize)]
struct ObjectiveDocument {
    name: String,
}

#[derive(Deserialize)]
struct GradientBoosterDocument {
    model: GbTreeModelDocument,
}

#[derive(Deserialize)]
struct GbTreeModelDocument {
    trees: Vec<TreeDocument>,
}

#[derive(Deserialize)]
struct TreeDocument {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    default_left: Vec<u8>,
    #[serde(default)]
    split_type: Vec<u8>,
}

// ---------- Modelo en memoria ----------

/// Función de enlace inversa aplicada al margen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Identity,
    Exp,
    Logistic,
}

impl Link {
    pub fn from_objective(name: &str) -> Result<Self, BoosterError> {
        match name {
            "reg:squarederror" | "reg:linear" | "reg:squaredlogerror" | "reg:pseudohubererror"
            | "reg:absoluteerror" => Ok(Link::Identity),
            "reg:gamma" | "reg:tweedie" | "count:poisson" => Ok(Link::Exp),
            "reg:logistic" => Ok(Link::Logistic),
            other => Err(BoosterError::UnsupportedObjective(other.to_string())),
        }
    }

    /// Pasar `base_score` (espacio de salida) al espacio del margen
    fn base_margin(self, base_score: f64) -> f64 {
        match self {
            Link::Identity => base_score,
            Link::Exp => base_score.ln(),
            Link::Logistic => (base_score / (1.0 - base_score)).ln(),
        }
    }

    fn apply(self, margin: f64) -> f64 {
        match self {
            Link::Identity => margin,
            Link::Exp => margin.exp(),
            Link::Logistic => 1.0 / (1.0 + (-margin).exp()),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    left: i32,
    right: i32,
    feature: usize,
    threshold: f32,
    default_left: bool,
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_document(tree_idx: usize, doc: TreeDocument) -> Result<Self, BoosterError> {
        let n = doc.left_children.len();
        if [
            doc.right_children.len(),
            doc.split_indices.len(),
            doc.split_conditions.len(),
            doc.default_left.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(BoosterError::MalformedTree {
                tree: tree_idx,
                reason: "node arrays have different lengths".to_string(),
            });
        }
        if n == 0 {
            return Err(BoosterError::MalformedTree {
                tree: tree_idx,
                reason: "tree has no nodes".to_string(),
            });
        }

        if let Some(node) = doc.split_type.iter().position(|&kind| kind != 0) {
            return Err(BoosterError::MalformedTree {
                tree: tree_idx,
                reason: format!("node {} uses a categorical split, which is not supported", node),
            });
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (doc.left_children[i], doc.right_children[i]);
            if left != -1 {
                let in_range = |c: i32| c > i as i32 && (c as usize) < n;
                if !in_range(left) || !in_range(right) {
                    return Err(BoosterError::MalformedTree {
                        tree: tree_idx,
                        reason: format!("node {} has children out of range ({}, {})", i, left, right),
                    });
                }
            }
            nodes.push(Node {
                left,
                right,
                feature: doc.split_indices[i] as usize,
                threshold: doc.split_conditions[i],
                default_left: doc.default_left[i] != 0,
            });
        }
        Ok(Self { nodes })
    }

    fn leaf_value(&self, x: &[f64]) -> f32 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.left == -1 {
                return node.threshold;
            }
            let value = x[node.feature] as f32;
            let go_left = if value.is_nan() {
                node.default_left
            } else {
                value < node.threshold
            };
            let next = if go_left { node.left } else { node.right };
            idx = next as usize;
        }
    }

    fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter(|n| n.left != -1)
            .map(|n| n.feature)
            .max()
    }
}

/// Ensemble de árboles de regresión
#[derive(Debug, Clone)]
pub struct BoostedTrees {
    trees: Vec<Tree>,
    base_margin: f32,
    link: Link,
    max_feature: Option<usize>,
}

impl BoostedTrees {
    pub fn from_json(json: &str) -> Result<Self, BoosterError> {
        let doc: ModelDocument =
            serde_json::from_str(json).map_err(|e| BoosterError::InvalidDocument(e.to_string()))?;
        let learner = doc.learner;

        let link = Link::from_objective(&learner.objective.name)?;
        let base_score = parse_base_score(&learner.learner_model_param.base_score)?;

        let trees = learner
            .gradient_booster
            .model
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| Tree::from_document(i, t))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(trees, link.base_margin(base_score) as f32, link))
    }

    fn new(trees: Vec<Tree>, base_margin: f32, link: Link) -> Self {
        let max_feature = trees.iter().filter_map(Tree::max_feature).max();
        Self {
            trees,
            base_margin,
            link,
            max_feature,
        }
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn link(&self) -> Link {
        self.link
    }

    /// Predicción para una fila preprocesada
    pub fn predict(&self, x: &[f64]) -> Result<f64, BoosterError> {
        if let Some(needed) = self.max_feature {
            if needed >= x.len() {
                return Err(BoosterError::FeatureMismatch { got: x.len(), needed });
            }
        }
        let margin = self
            .trees
            .iter()
            .fold(self.base_margin, |acc, tree| acc + tree.leaf_value(x));
        Ok(self.link.apply(f64::from(margin)))
    }
}

/// `base_score` llega como "5E-1" o, desde XGBoost 2, como "[1.2E2]"
fn parse_base_score(raw: &str) -> Result<f64, BoosterError> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let first = trimmed.split(',').next().unwrap_or_default().trim();
    first
        .parse::<f64>()
        .map_err(|_| BoosterError::InvalidDocument(format!("invalid base_score '{}'", raw)))
}
