//! Structure-of-Arrays gradient buffer.
//!
//! Gradients and hessians live in separate contiguous arrays so the
//! histogram builder can gather them by row index without striding.

/// Gradient and hessian buffer, one pair per training sample.
///
/// # Example
///
/// ```
/// use boostfit::training::Gradients;
///
/// let mut buffer = Gradients::new(100);
/// buffer.set(0, -0.5, 1.0);
/// assert_eq!(buffer.get(0), (-0.5, 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct Gradients {
    /// Gradient values (dL/dpred).
    grads: Vec<f32>,
    /// Hessian values (d2L/dpred2).
    hess: Vec<f32>,
}

impl Gradients {
    /// Create a zeroed buffer.
    pub fn new(n_samples: usize) -> Self {
        Self {
            grads: vec![0.0; n_samples],
            hess: vec![0.0; n_samples],
        }
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.grads.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.grads.is_empty()
    }

    /// Reset all gradients and hessians to zero.
    pub fn reset(&mut self) {
        self.grads.fill(0.0);
        self.hess.fill(0.0);
    }

    #[inline]
    pub fn get(&self, sample: usize) -> (f32, f32) {
        (self.grads[sample], self.hess[sample])
    }

    #[inline]
    pub fn set(&mut self, sample: usize, grad: f32, hess: f32) {
        self.grads[sample] = grad;
        self.hess[sample] = hess;
    }

    #[inline]
    pub fn grads(&self) -> &[f32] {
        &self.grads
    }

    #[inline]
    pub fn hess(&self) -> &[f32] {
        &self.hess
    }

    /// Mutable gradient and hessian slices, for objectives to fill.
    #[inline]
    pub fn grads_hess_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.grads, &mut self.hess)
    }

    /// Sum of gradients and hessians over all samples, accumulated in `f64`.
    pub fn sum(&self) -> (f64, f64) {
        self.grads
            .iter()
            .zip(&self.hess)
            .fold((0.0, 0.0), |(g, h), (&gi, &hi)| (g + gi as f64, h + hi as f64))
    }
}
