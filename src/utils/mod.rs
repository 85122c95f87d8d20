//! Scalar activation functions and their derivatives.
//!
//! Every derivative here is expressed in terms of the *activated output*
//! `y = f(x)`, which is the value the backward pass has at hand.

/// Activation function: identity (for linear layers).
#[inline]
pub fn identity(x: f64) -> f64 {
    x
}

/// Derivative of identity activation.
#[inline]
pub fn d_identity(_y: f64) -> f64 {
    1.0
}

/// Activation function: logistic sigmoid.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of sigmoid: `y * (1 - y)`.
#[inline]
pub fn d_sigmoid(y: f64) -> f64 {
    y * (1.0 - y)
}

/// Activation function: tanh.
#[inline]
pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

/// Derivative of tanh: `1 - y²`.
#[inline]
pub fn d_tanh(y: f64) -> f64 {
    1.0 - y * y
}

/// Activation function: ReLU.
#[inline]
pub fn relu(x: f64) -> f64 {
    x.max(0.0)
}

/// Derivative of ReLU.
#[inline]
pub fn d_relu(y: f64) -> f64 {
    if y > 0.0 {
        1.0
    } else {
        0.0
    }
}

pub const LEAKY_RELU_SLOPE: f64 = 0.01;

/// Activation function: leaky ReLU.
#[inline]
pub fn leaky_relu(x: f64) -> f64 {
    if x > 0.0 {
        x
    } else {
        LEAKY_RELU_SLOPE * x
    }
}

/// Derivative of leaky ReLU. The sign of `y` matches the sign of `x`.
#[inline]
pub fn d_leaky_relu(y: f64) -> f64 {
    if y > 0.0 {
        1.0
    } else {
        LEAKY_RELU_SLOPE
    }
}

/// Activation function: softplus, `ln(1 + e^x)`.
#[inline]
pub fn softplus(x: f64) -> f64 {
    // ln_1p(exp(x)) overflows for large x where softplus(x) ~ x
    if x > 30.0 {
        x
    } else {
        x.exp().ln_1p()
    }
}

/// Derivative of softplus: `sigmoid(x) = 1 - e^(-y)`.
#[inline]
pub fn d_softplus(y: f64) -> f64 {
    -(-y).exp_m1()
}
