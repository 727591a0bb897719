//! Physical and numerical parameters of a heat-diffusion run.

use crate::error::ConfigError;

/// Explicit-scheme stability limit for the 2D five-point stencil.
pub const STABILITY_LIMIT: f64 = 0.5;

/// Physical constants of the diffusion problem.
///
/// Immutable for the duration of a run. The stencil uses the effective
/// diffusivity `diffusivity / (density * specific_heat)`; with the
/// default density and specific heat of 1 this is the configured
/// coefficient unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatParams {
    /// Time step. Default: 0.01.
    pub dt: f64,
    /// Spacing between rows. Default: 0.1.
    pub dx: f64,
    /// Spacing between columns. Default: 0.1.
    pub dy: f64,
    /// Thermal conductivity coefficient. Default: 0.1.
    pub diffusivity: f64,
    /// Medium density. Default: 1.0.
    pub density: f64,
    /// Specific heat capacity. Default: 1.0.
    pub specific_heat: f64,
}

impl Default for HeatParams {
    fn default() -> Self {
        Self {
            dt: 0.01,
            dx: 0.1,
            dy: 0.1,
            diffusivity: 0.1,
            density: 1.0,
            specific_heat: 1.0,
        }
    }
}

impl HeatParams {
    /// Unit steps and unit diffusivity. Handy for hand-computed fixtures.
    pub fn unit() -> Self {
        Self {
            dt: 1.0,
            dx: 1.0,
            dy: 1.0,
            diffusivity: 1.0,
            density: 1.0,
            specific_heat: 1.0,
        }
    }

    /// Check that every parameter is finite and in range.
    ///
    /// `dt`, `dx`, `dy`, `density` and `specific_heat` must be strictly
    /// positive; `diffusivity` may be zero (a frozen field).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("dt", self.dt),
            ("dx", self.dx),
            ("dy", self.dy),
            ("density", self.density),
            ("specific_heat", self.specific_heat),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        if !self.diffusivity.is_finite() || self.diffusivity < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "diffusivity",
                value: self.diffusivity,
            });
        }
        let alpha = self.effective_diffusivity();
        if !alpha.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "effective_diffusivity",
                value: alpha,
            });
        }
        Ok(())
    }

    /// `diffusivity / (density * specific_heat)`.
    pub fn effective_diffusivity(&self) -> f64 {
        self.diffusivity / (self.density * self.specific_heat)
    }

    /// `dt * alpha * (1/dx^2 + 1/dy^2)`.
    ///
    /// The explicit scheme is stable while this stays at or below
    /// [`STABILITY_LIMIT`].
    pub fn stability_number(&self) -> f64 {
        self.dt
            * self.effective_diffusivity()
            * (1.0 / (self.dx * self.dx) + 1.0 / (self.dy * self.dy))
    }

    /// Whether [`stability_number`](Self::stability_number) is within the limit.
    pub fn is_stable(&self) -> bool {
        self.stability_number() <= STABILITY_LIMIT
    }

    /// The four scalars consumed by the stencil kernel.
    pub fn stencil_coefficients(&self) -> StencilCoefficients {
        StencilCoefficients {
            dt: self.dt,
            dx: self.dx,
            dy: self.dy,
            diffusivity: self.effective_diffusivity(),
        }
    }
}

/// Scalars of the five-point update rule.
///
/// `diffusivity` here is already the effective value; density and
/// specific heat have been folded in by
/// [`HeatParams::stencil_coefficients`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StencilCoefficients {
    /// Time step.
    pub dt: f64,
    /// Row spacing.
    pub dx: f64,
    /// Column spacing.
    pub dy: f64,
    /// Effective diffusivity.
    pub diffusivity: f64,
}
