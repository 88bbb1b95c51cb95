//! The neuron transfer function.

/// Hyperbolic tangent, output range `[-1.0, 1.0]`.
#[inline]
pub fn transfer(x: f64) -> f64 {
    x.tanh()
}

/// Evaluates the derivative `f'(x)`, where `x = f^{-1}(y)`.
///
/// Note that this function takes in the *output* of the transfer function,
/// rather than the input, so neurons never have to keep their weighted sum
/// around after feeding forward.
#[inline]
pub fn transfer_derivative(y: f64) -> f64 {
    1.0 - y * y
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derivative_matches_tanh_slope() {
        for &x in &[-2.0, -0.5, 0.0, 0.3, 1.7] {
            let h = 1e-6;
            let numeric = (transfer(x + h) - transfer(x - h)) / (2.0 * h);
            assert_relative_eq!(
                transfer_derivative(transfer(x)),
                numeric,
                epsilon = 1e-8
            );
        }
    }

    #[test]
    fn saturates() {
        assert_eq!(transfer(0.0), 0.0);
        assert!(transfer(50.0) <= 1.0);
        assert!(transfer(-50.0) >= -1.0);
        assert_eq!(transfer_derivative(1.0), 0.0);
    }
}
