//! Bisection root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Bisection root finder.
///
/// Repeatedly halves a bracketing interval `[a, b]` where `f(a)` and
/// `f(b)` have opposite signs. Convergence is only linear, but the
/// method is unconditionally stable: given a valid bracket it cannot
/// diverge, which makes it the fallback of choice when Newton-Raphson
/// fails on an ill-behaved NPV curve (e.g. cash flows with multiple
/// sign changes).
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`)
///
/// # Example
///
/// ```
/// use captable_core::math::solvers::{BisectionSolver, SolverConfig};
///
/// // Solve x² - 2 = 0 (find √2) on [1, 2]
/// let solver = BisectionSolver::new(SolverConfig::default());
///
/// let root = solver.find_root(|x: f64| x * x - 2.0, 1.0, 2.0).unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct BisectionSolver<T: Float> {
    /// Solver configuration
    config: SolverConfig<T>,
}

impl<T: Float> BisectionSolver<T> {
    /// Create a new bisection solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Find a root of `f` within the bracketing interval `[a, b]`.
    ///
    /// The interval must bracket a root: `f(a)` and `f(b)` must have
    /// opposite signs. An endpoint that is already a root (within
    /// tolerance) is returned immediately.
    ///
    /// # Arguments
    ///
    /// * `f` - Function to find root of
    /// * `a` - Lower bracket endpoint
    /// * `b` - Upper bracket endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(x)` - Root where `|f(x)| < tolerance` or the half-interval
    ///   has shrunk below tolerance
    /// * `Err(SolverError::NoBracket)` - `f(a)` and `f(b)` have the same sign
    /// * `Err(SolverError::MaxIterationsExceeded)` - Failed to converge
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let (mut lo, mut hi) = if a <= b { (a, b) } else { (b, a) };

        let f_lo = f(lo);
        let f_hi = f(hi);

        // Endpoints may already satisfy the tolerance
        if f_lo.abs() < self.config.tolerance {
            return Ok(lo);
        }
        if f_hi.abs() < self.config.tolerance {
            return Ok(hi);
        }

        // Check that the interval brackets a root
        if f_lo * f_hi > T::zero() {
            return Err(SolverError::NoBracket {
                a: lo.to_f64().unwrap_or(f64::NAN),
                b: hi.to_f64().unwrap_or(f64::NAN),
            });
        }

        let two = T::from(2.0).unwrap();
        let mut f_lo = f_lo;

        for _iteration in 0..self.config.max_iterations {
            let mid = (lo + hi) / two;
            let f_mid = f(mid);

            if !f_mid.is_finite() {
                return Err(SolverError::NumericalInstability(
                    "Bisection evaluated to non-finite value".to_string(),
                ));
            }

            // Check for convergence
            if f_mid.abs() < self.config.tolerance || (hi - lo) / two < self.config.tolerance {
                return Ok(mid);
            }

            // Keep the half-interval whose endpoints change sign
            if f_lo * f_mid < T::zero() {
                hi = mid;
            } else {
                lo = mid;
                f_lo = f_mid;
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sqrt_2() {
        let solver = BisectionSolver::new(SolverConfig::default());

        let root = solver.find_root(|x: f64| x * x - 2.0, 1.0, 2.0).unwrap();
        assert!(
            (root - std::f64::consts::SQRT_2).abs() < 1e-9,
            "Expected √2, got {}",
            root
        );
    }

    #[test]
    fn test_reversed_bracket() {
        let solver = BisectionSolver::new(SolverConfig::default());

        // Endpoints given high-to-low still converge
        let root = solver.find_root(|x: f64| x * x - 2.0, 2.0, 1.0).unwrap();
        assert!((root - std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn test_no_bracket() {
        let solver = BisectionSolver::new(SolverConfig::default());

        // f > 0 on the whole interval
        let result = solver.find_root(|x: f64| x * x + 1.0, -1.0, 1.0);
        assert!(matches!(result.unwrap_err(), SolverError::NoBracket { .. }));
    }

    #[test]
    fn test_endpoint_is_root() {
        let solver = BisectionSolver::new(SolverConfig::default());

        let root = solver.find_root(|x: f64| x - 1.0, 1.0, 5.0).unwrap();
        assert!((root - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_npv_sign_change() {
        let solver = BisectionSolver::new(SolverConfig::default());

        // -1,000,000 today, +4,000,000 in 5 years: IRR = 4^(1/5) - 1
        let npv = |r: f64| -1_000_000.0 + 4_000_000.0 / (1.0 + r).powi(5);

        let irr = solver.find_root(npv, 0.0, 1.0).unwrap();
        let expected = 4.0_f64.powf(0.2) - 1.0;
        assert!(
            (irr - expected).abs() < 1e-8,
            "Expected {}, got {}",
            expected,
            irr
        );
    }

    #[test]
    fn test_max_iterations_exceeded() {
        let config = SolverConfig::new(1e-300, 5); // Impossible tolerance
        let solver = BisectionSolver::new(config);

        let result = solver.find_root(|x: f64| x * x - 2.0, 1.0, 2.0);
        match result.unwrap_err() {
            SolverError::MaxIterationsExceeded { iterations } => assert_eq!(iterations, 5),
            other => panic!("Expected MaxIterationsExceeded, got {:?}", other),
        }
    }
}
