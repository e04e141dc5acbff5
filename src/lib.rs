mod nn;
mod optim;
mod tensor;

pub use nn::{WeightModel, accuracy};
pub use optim::Adam;
pub use tensor::{Context, Tensor, matmul};
