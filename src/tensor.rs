#![allow(dead_code)]
use std::{cell::RefCell, fmt};

use ndarray::{Array2, ArrayD};

#[derive(Debug)]
pub struct Context {
    tensors: RefCell<Vec<TensorData>>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            tensors: RefCell::new(Vec::new()),
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zero_grad(&self) {
        for t in self.tensors.borrow_mut().iter_mut() {
            t.grad = None;
        }
    }

    /// Prune all tensors after the given index, keeping only the first `keep` tensors.
    /// Use this to remove intermediate computation tensors while preserving parameters.
    /// Returns the number of pruned tensors.
    pub fn prune(&self, keep: usize) -> usize {
        let mut tensors = self.tensors.borrow_mut();
        let old_len = tensors.len();
        tensors.truncate(keep);
        old_len - keep
    }

    /// Returns the current number of tensors in the arena.
    pub fn len(&self) -> usize {
        self.tensors.borrow().len()
    }

    /// Returns true if the arena contains no tensors.
    pub fn is_empty(&self) -> bool {
        self.tensors.borrow().is_empty()
    }

    pub fn tensor(&self, data: &[f32], shape: &[usize]) -> Tensor<'_> {
        let data = ArrayD::from_shape_vec(shape, data.to_vec()).unwrap();

        let idx = TensorIdx(self.tensors.borrow().len());
        self.tensors.borrow_mut().push(TensorData {
            data,
            grad: None,
            op: Op::None,
        });
        Tensor { idx, ctx: self }
    }

    fn backward(&self, idx: TensorIdx) {
        let mut tensors = self.tensors.borrow_mut();

        let shape = tensors[idx.0].data.shape().to_vec();
        tensors[idx.0].grad = Some(ArrayD::ones(shape));

        for i in (0..=idx.0).rev() {
            let grad = tensors[i].grad.clone();
            if let Some(grad) = grad {
                match tensors[i].op {
                    Op::None => {}
                    Op::Diag(a) => {
                        // Off-diagonal entries are constants: only the diagonal
                        // of the matrix gradient reaches the source vector.
                        let grad_2d = grad.view().into_dimensionality::<ndarray::Ix2>().unwrap();
                        let a_delta = grad_2d.diag().to_owned().into_dyn();

                        if let Some(ref mut g) = tensors[a.0].grad {
                            *g += &a_delta;
                        } else {
                            tensors[a.0].grad = Some(a_delta);
                        }
                    }
                    Op::MatMul(a, b) => {
                        let grad_2d = grad.view().into_dimensionality::<ndarray::Ix2>().unwrap();
                        let a_2d = tensors[a.0]
                            .data
                            .view()
                            .into_dimensionality::<ndarray::Ix2>()
                            .unwrap();
                        let b_2d = tensors[b.0]
                            .data
                            .view()
                            .into_dimensionality::<ndarray::Ix2>()
                            .unwrap();

                        // grad_A = grad_C @ B^T
                        let a_delta = grad_2d.dot(&b_2d.t()).into_dyn();
                        // grad_B = A^T @ grad_C
                        let b_delta = a_2d.t().dot(&grad_2d).into_dyn();

                        if let Some(ref mut g) = tensors[a.0].grad {
                            *g += &a_delta;
                        } else {
                            tensors[a.0].grad = Some(a_delta);
                        }
                        if let Some(ref mut g) = tensors[b.0].grad {
                            *g += &b_delta;
                        } else {
                            tensors[b.0].grad = Some(b_delta);
                        }
                    }
                    Op::Transpose(a) => {
                        // Transpose backward: just transpose the gradient back
                        let grad_2d = grad.view().into_dimensionality::<ndarray::Ix2>().unwrap();
                        let a_delta = grad_2d.t().to_owned().into_dyn();

                        if let Some(ref mut g) = tensors[a.0].grad {
                            *g += &a_delta;
                        } else {
                            tensors[a.0].grad = Some(a_delta);
                        }
                    }
                    Op::Mean(a, n) => {
                        // grad is a scalar, distributed to all elements divided by n
                        let scalar = grad[[0]] / n as f32;
                        let a_shape = tensors[a.0].data.shape().to_vec();
                        let a_delta = ArrayD::from_elem(a_shape, scalar);

                        if let Some(ref mut g) = tensors[a.0].grad {
                            *g += &a_delta;
                        } else {
                            tensors[a.0].grad = Some(a_delta);
                        }
                    }
                    Op::SoftmaxXent(logits, labels) => {
                        // Per-row gradient: (softmax(logits) - labels) * grad_row.
                        // Labels are constant targets and receive no gradient.
                        let a_delta = {
                            let logits_data = &tensors[logits.0].data;
                            let labels_data = &tensors[labels.0].data;
                            let shape = logits_data.shape();
                            let rows = shape[0];
                            let cols = shape[1];
                            let mut delta = logits_data.clone();

                            for row in 0..rows {
                                let row_max = (0..cols)
                                    .map(|j| logits_data[[row, j]])
                                    .fold(f32::NEG_INFINITY, f32::max);
                                let mut row_sum = 0.0;
                                for j in 0..cols {
                                    delta[[row, j]] = (logits_data[[row, j]] - row_max).exp();
                                    row_sum += delta[[row, j]];
                                }
                                for j in 0..cols {
                                    let softmax = delta[[row, j]] / row_sum;
                                    delta[[row, j]] =
                                        (softmax - labels_data[[row, j]]) * grad[[row]];
                                }
                            }
                            delta
                        };

                        if let Some(ref mut g) = tensors[logits.0].grad {
                            *g += &a_delta;
                        } else {
                            tensors[logits.0].grad = Some(a_delta);
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TensorIdx(usize);

#[derive(Debug, Clone, Copy)]
pub struct Tensor<'a> {
    idx: TensorIdx,
    ctx: &'a Context,
}

#[derive(Debug)]
enum Op {
    None,
    Diag(TensorIdx),
    MatMul(TensorIdx, TensorIdx),
    Transpose(TensorIdx),
    Mean(TensorIdx, usize),            // stores input idx and number of elements
    SoftmaxXent(TensorIdx, TensorIdx), // logits and labels; yields row-wise losses
}

#[derive(Debug)]
struct TensorData {
    data: ArrayD<f32>,
    grad: Option<ArrayD<f32>>,
    op: Op,
}

impl<'a> Tensor<'a> {
    pub fn shape(&self) -> Vec<usize> {
        self.ctx.tensors.borrow()[self.idx.0].data.shape().to_vec()
    }

    pub fn backward(&self) {
        self.ctx.backward(self.idx);
    }

    /// Embed a 1-D tensor of length d into a d×d matrix along the main
    /// diagonal, preserving order. Off-diagonal entries are constant zeros:
    /// gradients flow back only through the diagonal, so each source entry
    /// remains an independently trainable parameter.
    pub fn diag(&self) -> Tensor<'a> {
        let result_data = {
            let tensors = self.ctx.tensors.borrow();
            let data = &tensors[self.idx.0].data;
            assert_eq!(
                data.ndim(),
                1,
                "diag expects a 1-D tensor, got shape {:?}",
                data.shape()
            );
            let view_1d = data.view().into_dimensionality::<ndarray::Ix1>().unwrap();
            Array2::from_diag(&view_1d).into_dyn()
        };

        let mut tensors = self.ctx.tensors.borrow_mut();
        let idx = TensorIdx(tensors.len());
        tensors.push(TensorData {
            data: result_data,
            grad: None,
            op: Op::Diag(self.idx),
        });

        Tensor { idx, ctx: self.ctx }
    }

    /// Transpose a 2D tensor (swap rows and columns)
    pub fn transpose(&self) -> Tensor<'a> {
        let result_data = {
            let tensors = self.ctx.tensors.borrow();
            let data = &tensors[self.idx.0].data;
            let view_2d = data.view().into_dimensionality::<ndarray::Ix2>().unwrap();
            view_2d.t().as_standard_layout().to_owned().into_dyn()
        };

        let mut tensors = self.ctx.tensors.borrow_mut();
        let idx = TensorIdx(tensors.len());
        tensors.push(TensorData {
            data: result_data,
            grad: None,
            op: Op::Transpose(self.idx),
        });

        Tensor { idx, ctx: self.ctx }
    }

    pub fn mean(&self) -> Tensor<'a> {
        let (result_data, n) = {
            let tensors = self.ctx.tensors.borrow();
            let data = &tensors[self.idx.0].data;
            let n = data.len();
            let mean = data.sum() / n as f32;
            (ArrayD::from_elem(vec![1], mean), n)
        };

        let mut tensors = self.ctx.tensors.borrow_mut();
        let idx = TensorIdx(tensors.len());
        tensors.push(TensorData {
            data: result_data,
            grad: None,
            op: Op::Mean(self.idx, n),
        });

        Tensor { idx, ctx: self.ctx }
    }

    /// Row-wise softmax cross-entropy against constant target distributions.
    /// Treats each row of `self` as unnormalized class logits and returns the
    /// per-row losses (shape [n]). Computed as logsumexp(row) minus the
    /// label-weighted logits, with the row max subtracted before
    /// exponentiating so large logits do not overflow.
    ///
    /// The logit and label layouts must agree exactly, one label column per
    /// score column; mismatched shapes panic here instead of producing a
    /// silently misaligned loss.
    pub fn softmax_cross_entropy(&self, labels: Tensor<'a>) -> Tensor<'a> {
        let result_data = {
            let tensors = self.ctx.tensors.borrow();
            let logits = &tensors[self.idx.0].data;
            let targets = &tensors[labels.idx.0].data;
            assert_eq!(
                logits.shape(),
                targets.shape(),
                "softmax_cross_entropy: logits and labels must have matching shapes"
            );
            let shape = logits.shape();
            let rows = shape[0];
            let cols = shape[1];
            let mut result = ArrayD::zeros(vec![rows]);

            for i in 0..rows {
                let row_max = (0..cols)
                    .map(|j| logits[[i, j]])
                    .fold(f32::NEG_INFINITY, f32::max);
                let mut exp_sum = 0.0;
                let mut target_dot = 0.0;
                for j in 0..cols {
                    exp_sum += (logits[[i, j]] - row_max).exp();
                    target_dot += targets[[i, j]] * logits[[i, j]];
                }
                // L_i = logsumexp(row_i) - sum_j labels[i,j] * logits[i,j]
                result[[i]] = row_max + exp_sum.ln() - target_dot;
            }
            result
        };

        let mut tensors = self.ctx.tensors.borrow_mut();
        let idx = TensorIdx(tensors.len());
        tensors.push(TensorData {
            data: result_data,
            grad: None,
            op: Op::SoftmaxXent(self.idx, labels.idx),
        });

        Tensor { idx, ctx: self.ctx }
    }

    pub fn data(&self) -> ArrayD<f32> {
        self.ctx.tensors.borrow()[self.idx.0].data.clone()
    }

    pub fn grad(&self) -> Option<ArrayD<f32>> {
        self.ctx.tensors.borrow()[self.idx.0].grad.clone()
    }

    pub fn set_data(&self, data: ArrayD<f32>) {
        self.ctx.tensors.borrow_mut()[self.idx.0].data = data;
    }
}

pub fn matmul<'a>(a: Tensor<'a>, b: Tensor<'a>) -> Tensor<'a> {
    let result_data = {
        let tensors = a.ctx.tensors.borrow();
        let a_2d = tensors[a.idx.0]
            .data
            .view()
            .into_dimensionality::<ndarray::Ix2>()
            .unwrap();
        let b_2d = tensors[b.idx.0]
            .data
            .view()
            .into_dimensionality::<ndarray::Ix2>()
            .unwrap();
        a_2d.dot(&b_2d).into_dyn()
    };

    let mut tensors = a.ctx.tensors.borrow_mut();
    let idx = TensorIdx(tensors.len());
    tensors.push(TensorData {
        data: result_data,
        grad: None,
        op: Op::MatMul(a.idx, b.idx),
    });

    Tensor { idx, ctx: a.ctx }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tensors = self.tensors.borrow();
        for (i, t) in tensors.iter().enumerate() {
            writeln!(f, "Tensor {}", i)?;
            writeln!(f, "  data:  {:?}", t.data)?;
            if let Some(ref g) = t.grad {
                writeln!(f, "  grad:  {:?}", g)?;
            }
            writeln!(f, "  op:    {:?}", t.op)?;
        }
        Ok(())
    }
}
