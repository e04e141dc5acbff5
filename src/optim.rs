use crate::tensor::Tensor;
use ndarray::ArrayD;

/// Adam: gradient descent with bias-corrected running averages of the
/// gradient and its square, kept per parameter.
pub struct Adam<'a> {
    params: Vec<Tensor<'a>>,
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    step_count: i32,
    m: Vec<ArrayD<f32>>,
    v: Vec<ArrayD<f32>>,
}

impl<'a> Adam<'a> {
    /// Creates an optimizer with the stock hyperparameters:
    /// lr 0.001, beta1 0.9, beta2 0.999, eps 1e-8.
    pub fn new(params: Vec<Tensor<'a>>) -> Self {
        Self::with_hyperparams(params, 0.001, 0.9, 0.999, 1e-8)
    }

    pub fn with_hyperparams(
        params: Vec<Tensor<'a>>,
        lr: f32,
        beta1: f32,
        beta2: f32,
        eps: f32,
    ) -> Self {
        let m = params.iter().map(|p| ArrayD::zeros(p.shape())).collect();
        let v = params.iter().map(|p| ArrayD::zeros(p.shape())).collect();
        Self {
            params,
            lr,
            beta1,
            beta2,
            eps,
            step_count: 0,
            m,
            v,
        }
    }

    /// Applies one update step in place to every parameter that has a
    /// gradient. Parameters without gradients are skipped.
    pub fn step(&mut self) {
        self.step_count += 1;
        let b1_correction = 1.0 - self.beta1.powi(self.step_count);
        let b2_correction = 1.0 - self.beta2.powi(self.step_count);

        for (i, p) in self.params.iter().enumerate() {
            let Some(grad) = p.grad() else {
                continue;
            };

            let m_next = &self.m[i] * self.beta1 + &grad * (1.0 - self.beta1);
            let v_next = &self.v[i] * self.beta2 + grad.mapv(|g| g * g) * (1.0 - self.beta2);
            self.m[i] = m_next;
            self.v[i] = v_next;

            let m_hat = &self.m[i] / b1_correction;
            let v_hat = &self.v[i] / b2_correction;
            let update = m_hat / v_hat.mapv(|x| x.sqrt() + self.eps) * self.lr;

            let new_data = p.data() - &update;
            p.set_data(new_data);
        }
    }
}
