//! CART decision tree for multi-class grade labels
//!
//! Trees are grown greedily: at every node the split that most reduces the
//! Gini impurity is chosen among a random subset of features. The impurity
//! decrease credited to each feature is recorded for importance scoring.

use rand::seq::SliceRandom;
use rand::Rng;

/// Index of a node inside the tree arena
pub type NodeIndex = usize;

/// Tree growth limits
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTreeConfig {
    /// Features examined per split (clamped to 1..=n_features)
    pub max_features: usize,
    /// Maximum depth, unlimited when `None`
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may split
    pub min_samples_split: usize,
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self {
            max_features: usize::MAX,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        class_counts: Vec<usize>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
    },
}

/// Best split found for one node
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// n_left * gini(left) + n_right * gini(right)
    weighted_child_impurity: f64,
}

/// A fitted classification tree over class indices `0..n_classes`
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_classes: usize,
    /// Unnormalised impurity decrease per feature
    impurity_decrease: Vec<f64>,
}

/// Calculate Gini impurity for a class count vector
///
/// Gini = 1 - sum(p_k^2): the probability that two samples drawn with
/// replacement have different classes.
pub fn gini_impurity(class_counts: &[usize]) -> f64 {
    let total: usize = class_counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - class_counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn class_counts(labels: &[usize], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in samples {
        counts[labels[i]] += 1;
    }
    counts
}

impl DecisionTree {
    /// Grow a tree on the rows listed in `samples`.
    ///
    /// `samples` may repeat row indices (bootstrap resamples). `labels[i]`
    /// is the class index of row `i`.
    pub fn fit<R: Rng + ?Sized>(
        rows: &[Vec<f64>],
        labels: &[usize],
        samples: &[usize],
        n_classes: usize,
        config: &DecisionTreeConfig,
        rng: &mut R,
    ) -> Self {
        let n_features = rows.first().map(Vec::len).unwrap_or(0);
        let mut tree = Self {
            nodes: Vec::new(),
            n_classes,
            impurity_decrease: vec![0.0; n_features],
        };

        let mut samples = samples.to_vec();
        tree.grow(rows, labels, &mut samples, 0, config, rng);
        tree
    }

    fn grow<R: Rng + ?Sized>(
        &mut self,
        rows: &[Vec<f64>],
        labels: &[usize],
        samples: &mut [usize],
        depth: usize,
        config: &DecisionTreeConfig,
        rng: &mut R,
    ) -> NodeIndex {
        let counts = class_counts(labels, samples, self.n_classes);
        let impurity = gini_impurity(&counts);
        let node_id = self.nodes.len();

        let depth_ok = config.max_depth.map_or(true, |max| depth < max);
        let splittable = depth_ok && samples.len() >= config.min_samples_split && impurity > 0.0;

        let candidate = if splittable {
            self.find_best_split(rows, labels, samples, impurity, config, rng)
        } else {
            None
        };

        let Some(split) = candidate else {
            self.nodes.push(Node::Leaf {
                class_counts: counts,
            });
            return node_id;
        };

        let n = samples.len() as f64;
        self.impurity_decrease[split.feature] += n * impurity - split.weighted_child_impurity;

        // Reserve this slot, children are appended after it
        self.nodes.push(Node::Leaf {
            class_counts: counts,
        });

        samples.sort_by(|&a, &b| rows[a][split.feature].total_cmp(&rows[b][split.feature]));
        let n_left = samples
            .iter()
            .take_while(|&&i| rows[i][split.feature] <= split.threshold)
            .count();
        let (left_samples, right_samples) = samples.split_at_mut(n_left);

        let left = self.grow(rows, labels, left_samples, depth + 1, config, rng);
        let right = self.grow(rows, labels, right_samples, depth + 1, config, rng);

        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    /// Find the split point that maximizes Gini reduction.
    ///
    /// Features are visited in random order. The search stops after
    /// `max_features` features once a valid split exists; if none of those
    /// admits a split, the remaining features are tried.
    fn find_best_split<R: Rng + ?Sized>(
        &self,
        rows: &[Vec<f64>],
        labels: &[usize],
        samples: &[usize],
        parent_impurity: f64,
        config: &DecisionTreeConfig,
        rng: &mut R,
    ) -> Option<SplitCandidate> {
        let n_features = self.impurity_decrease.len();
        let max_features = config.max_features.clamp(1, n_features.max(1));

        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);

        let n = samples.len();
        let parent_weighted = n as f64 * parent_impurity;
        let mut best: Option<SplitCandidate> = None;

        let mut sorted = samples.to_vec();
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= max_features && best.is_some() {
                break;
            }

            sorted.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

            let mut left = vec![0usize; self.n_classes];
            let mut right = class_counts(labels, &sorted, self.n_classes);

            for pos in 0..n - 1 {
                let class = labels[sorted[pos]];
                left[class] += 1;
                right[class] -= 1;

                let value = rows[sorted[pos]][feature];
                let next = rows[sorted[pos + 1]][feature];

                // Skip if this value equals the next (avoid splitting within same value)
                if (next - value).abs() < 1e-10 {
                    continue;
                }

                let n_left = (pos + 1) as f64;
                let n_right = (n - pos - 1) as f64;
                let weighted = n_left * gini_impurity(&left) + n_right * gini_impurity(&right);

                if parent_weighted - weighted <= 1e-12 {
                    continue;
                }

                if best.map_or(true, |b| weighted < b.weighted_child_impurity) {
                    let mut threshold = (value + next) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        weighted_child_impurity: weighted,
                    });
                }
            }
        }

        best
    }

    /// Class counts at the leaf reached by `row`
    fn leaf_counts(&self, row: &[f64]) -> &[usize] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { class_counts } => return class_counts,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Majority class at the leaf reached by `row`, ties to the lowest index
    pub fn predict_row(&self, row: &[f64]) -> usize {
        let counts = self.leaf_counts(row);
        let mut best = 0;
        for (class, &count) in counts.iter().enumerate() {
            if count > counts[best] {
                best = class;
            }
        }
        best
    }

    /// Per-feature impurity decrease normalised to sum to 1.
    ///
    /// A tree that never split has no decrease and returns all zeros.
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.impurity_decrease.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.impurity_decrease.len()];
        }
        self.impurity_decrease.iter().map(|d| d / total).collect()
    }

    /// True when the tree has at least one split
    pub fn has_splits(&self) -> bool {
        self.nodes.len() > 1
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: NodeIndex) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gini_impurity() {
        // Pure nodes have zero impurity
        assert!((gini_impurity(&[0, 10]) - 0.0).abs() < 1e-12);
        assert!((gini_impurity(&[10, 0, 0]) - 0.0).abs() < 1e-12);

        // Two balanced classes give 0.5, four balanced give 0.75
        assert!((gini_impurity(&[5, 5]) - 0.5).abs() < 1e-12);
        assert!((gini_impurity(&[3, 3, 3, 3]) - 0.75).abs() < 1e-12);

        assert_eq!(gini_impurity(&[]), 0.0);
    }

    #[test]
    fn test_tree_separates_one_feature() {
        let rows = vec![vec![1.0], vec![2.0], vec![3.0], vec![10.0], vec![11.0], vec![12.0]];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let samples: Vec<usize> = (0..6).collect();
        let mut rng = StdRng::seed_from_u64(0);

        let tree = DecisionTree::fit(&rows, &labels, &samples, 2, &DecisionTreeConfig::default(), &mut rng);

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_row(&[0.0]), 0);
        assert_eq!(tree.predict_row(&[6.4]), 0);
        assert_eq!(tree.predict_row(&[6.6]), 1);
        assert_eq!(tree.feature_importances(), vec![1.0]);
    }

    #[test]
    fn test_tree_ignores_noise_feature() {
        // Feature 0 is constant, feature 1 separates the classes
        let rows = vec![vec![5.0, 1.0], vec![5.0, 2.0], vec![5.0, 8.0], vec![5.0, 9.0]];
        let labels = vec![0, 0, 1, 1];
        let samples: Vec<usize> = (0..4).collect();
        let config = DecisionTreeConfig {
            max_features: 1,
            ..DecisionTreeConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        let tree = DecisionTree::fit(&rows, &labels, &samples, 2, &config, &mut rng);

        assert_eq!(tree.feature_importances(), vec![0.0, 1.0]);
        assert_eq!(tree.predict_row(&[5.0, 8.5]), 1);
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let rows = vec![vec![1.0], vec![2.0]];
        let labels = vec![1, 1];
        let mut rng = StdRng::seed_from_u64(0);

        let tree = DecisionTree::fit(&rows, &labels, &[0, 1], 2, &DecisionTreeConfig::default(), &mut rng);

        assert!(!tree.has_splits());
        assert_eq!(tree.predict_row(&[100.0]), 1);
        assert_eq!(tree.feature_importances(), vec![0.0]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let rows: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let labels = vec![0, 1, 0, 1, 0, 1, 0, 1];
        let samples: Vec<usize> = (0..8).collect();
        let config = DecisionTreeConfig {
            max_depth: Some(2),
            ..DecisionTreeConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let tree = DecisionTree::fit(&rows, &labels, &samples, 2, &config, &mut rng);
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_bootstrap_duplicates_accepted() {
        let rows = vec![vec![1.0], vec![9.0]];
        let labels = vec![0, 1];
        let mut rng = StdRng::seed_from_u64(0);

        let tree = DecisionTree::fit(&rows, &labels, &[0, 0, 1, 1, 1], 2, &DecisionTreeConfig::default(), &mut rng);
        assert_eq!(tree.predict_row(&[1.0]), 0);
        assert_eq!(tree.predict_row(&[9.0]), 1);
    }
}
