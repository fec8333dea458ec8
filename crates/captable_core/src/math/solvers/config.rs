//! Solver configuration types.

use num_traits::Float;

/// Convergence settings shared by the Newton-Raphson and bisection
/// solvers.
///
/// The solvers stop when `|f(x)| < tolerance` (bisection also accepts
/// a bracket narrower than the tolerance) and fail with
/// `SolverError::MaxIterationsExceeded` past the iteration limit.
///
/// # Example
///
/// ```
/// use captable_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert!(config.tolerance < 1e-8);
///
/// // IRR solves on dollar-scale NPV curves use a looser preset
/// let irr: SolverConfig<f64> = SolverConfig::irr();
/// assert!(irr.tolerance > config.tolerance);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig<T: Float> {
    /// Convergence tolerance on the residual.
    pub tolerance: T,

    /// Maximum iterations before giving up.
    pub max_iterations: usize,
}

impl<T: Float> Default for SolverConfig<T> {
    /// Tolerance 1e-10, 100 iterations. Suited to unit-scale residuals
    /// such as rates and price ratios.
    fn default() -> Self {
        Self {
            tolerance: T::from(1e-10).unwrap(),
            max_iterations: 100,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Creates a configuration with explicit settings.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance <= 0` or `max_iterations == 0`.
    pub fn new(tolerance: T, max_iterations: usize) -> Self {
        assert!(tolerance > T::zero(), "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Preset for IRR root-finding on NPV curves.
    ///
    /// NPV residuals are dollar-scale: at a few million dollars an f64
    /// carries roughly 1e-9 of absolute precision, so the 1e-10
    /// default can never be met. 1e-6 dollars is far below a cent and
    /// always reachable.
    pub fn irr() -> Self {
        Self {
            tolerance: T::from(1e-6).unwrap(),
            max_iterations: 100,
        }
    }
}
