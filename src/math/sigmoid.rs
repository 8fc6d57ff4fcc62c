//! Logistic sigmoid

use ndarray::{Array, ArrayBase, Data, Dimension};

/// Logistic function 1 / (1 + e^-z)
///
/// Evaluated on the branch where the exponent is non-positive, so neither
/// `exp` call can overflow for large |z|.
#[inline]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Elementwise [`sigmoid`]
pub fn sigmoid_array<S, D>(z: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    z.mapv(sigmoid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_sigmoid_basic_values() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert_abs_diff_eq!(sigmoid(2.0), 0.8807970779778823, epsilon = 1e-15);
        assert_abs_diff_eq!(sigmoid(-2.0), 0.11920292202211755, epsilon = 1e-15);
    }

    #[test]
    fn test_sigmoid_symmetry() {
        for z in [0.1, 1.0, 3.7, 12.0, 30.0] {
            assert_abs_diff_eq!(sigmoid(z) + sigmoid(-z), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sigmoid_large_magnitude() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!(sigmoid(f64::MAX).is_finite());
        assert!(sigmoid(f64::MIN).is_finite());
    }

    #[test]
    fn test_sigmoid_array() {
        let z = array![[0.0, 0.0], [0.0, 0.0]];
        let theta = sigmoid_array(&z);
        assert!(theta.iter().all(|&t| t == 0.5));
    }
}
