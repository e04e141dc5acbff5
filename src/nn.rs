use crate::tensor::{Context, Tensor, matmul};
use ndarray::ArrayD;
use rand::Rng;

/// A bilinear similarity model with one learned per-feature scale per input
/// dimension: score(x, y) = (x @ W) . (y @ W) for W = diag(weights).
pub struct WeightModel<'a> {
    pub weights: Tensor<'a>,
}

impl<'a> WeightModel<'a> {
    /// Creates a model from explicit initial weights, one scale per feature,
    /// order preserved along the diagonal.
    pub fn new(ctx: &'a Context, init: &[f32]) -> Self {
        Self {
            weights: ctx.tensor(init, &[init.len()]),
        }
    }

    /// Creates a model with per-feature scales drawn uniformly from
    /// [1 - 0.5, 1 + 0.5), centered on the identity transform.
    pub fn random(ctx: &'a Context, dim: usize) -> Self {
        let mut rng = rand::rng();

        let weight_data: Vec<f32> = (0..dim).map(|_| 0.5 + rng.random::<f32>()).collect();

        Self {
            weights: ctx.tensor(&weight_data, &[dim]),
        }
    }

    /// The d×d weight matrix: learned scales on the diagonal, zeros elsewhere.
    pub fn weight_matrix(&self) -> Tensor<'a> {
        self.weights.diag()
    }

    /// Scales each feature column of a batch: y = x @ diag(weights).
    /// The batch must have one column per weight.
    pub fn transform(&self, x: Tensor<'a>) -> Tensor<'a> {
        matmul(x, self.weight_matrix())
    }

    /// Scores every guest row against every host row. Both batches are
    /// transformed with the same weight matrix, then multiplied:
    /// scores[i][j] = (guest_i @ W) . (host_j @ W), shape (n_guest, n_host).
    pub fn similarity(&self, guest: Tensor<'a>, host: Tensor<'a>) -> Tensor<'a> {
        let weight_matrix = self.weight_matrix();
        let host_t = matmul(host, weight_matrix);
        let guest_t = matmul(guest, weight_matrix);
        matmul(guest_t, host_t.transpose())
    }

    /// Returns all trainable parameters
    pub fn params(&self) -> Vec<Tensor<'a>> {
        vec![self.weights]
    }
}

/// Fraction of rows whose highest-scoring column matches the label's
/// highest column. Ties resolve to the first-occurring index.
pub fn accuracy(scores: Tensor, labels: Tensor) -> f32 {
    let scores = scores.data();
    let labels = labels.data();
    assert_eq!(
        scores.shape(),
        labels.shape(),
        "accuracy: scores and labels must have matching shapes"
    );
    let rows = scores.shape()[0];
    let cols = scores.shape()[1];

    let correct = (0..rows)
        .filter(|&i| argmax_row(&scores, i, cols) == argmax_row(&labels, i, cols))
        .count();
    correct as f32 / rows as f32
}

fn argmax_row(m: &ArrayD<f32>, row: usize, cols: usize) -> usize {
    let mut best = 0;
    for j in 1..cols {
        if m[[row, j]] > m[[row, best]] {
            best = j;
        }
    }
    best
}
