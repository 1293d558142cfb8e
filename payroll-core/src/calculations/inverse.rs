//! Net → gross by bounded bisection.
//!
//! The forward pipeline is continuous and non-decreasing in gross but
//! piecewise-linear, so it has no closed-form inverse. The solver brackets
//! the target net between `low` and `high`, widening `high` until its net
//! reaches the target, then halves the bracket until one of three stop
//! conditions holds:
//!
//! | Condition | [`StopReason`] |
//! |-----------|----------------|
//! | `\|net(mid) − target\| < tolerance_net` | [`StopReason::NetTolerance`] |
//! | `high − low < tolerance_gross` | [`StopReason::GrossTolerance`] |
//! | `max_iterations` reached | [`StopReason::IterationCap`] |
//!
//! Stopping is not the same as solving. Whatever the stop condition, the net
//! at the returned gross must lie within `max(tolerance_net, tolerance_gross)`
//! of the target. Net moves by at most one euro per euro of gross wherever
//! it is continuous, so a larger residual means the target sits inside a jump
//! of the net curve (a deduction or bonus cliff) and no gross produces it.
//!
//! [`SolverError::Unsolvable`] is returned when:
//!
//! * no gross up to [`MAX_GROSS`] reaches the target, or it is still out of
//!   reach after `max_expansions` doublings;
//! * the bracket collapses onto a jump in net;
//! * the iteration cap is hit while the best estimate is still off target.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::{
//!     BracketTable, ContractType, ContributionRates, DeductionSchedule, TaxYearConfig,
//!     gross_from_net, net_from_gross,
//! };
//!
//! let config = TaxYearConfig::new(
//!     2025,
//!     ContractType::Professional,
//!     BracketTable::irpef_2025(),
//!     DeductionSchedule::italian_employee_2025(),
//!     ContributionRates::default(),
//! )
//! .unwrap();
//!
//! let result = gross_from_net(dec!(25000), &config).unwrap();
//! let net = net_from_gross(result.gross_salary, &config).net_salary;
//!
//! assert!((net - dec!(25000)).abs() <= dec!(0.01));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::ConfigurationError;
use crate::calculations::forward::{ForwardCalculator, MAX_GROSS};
use crate::{CalculationResult, TaxYearConfig};

/// Decimal places kept on each bisection midpoint.
const MIDPOINT_SCALE: u32 = 10;

/// Errors raised by [`InverseSolver::solve`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SolverError {
    /// No gross the solver may try produces the target net.
    #[error("cannot find a gross salary for net {target_net}: {reason}")]
    Unsolvable {
        target_net: Decimal,
        reason: String,
    },
}

/// Parameters of the bisection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// The first `high` is `target × initial_multiple + initial_offset`.
    pub initial_multiple: Decimal,
    pub initial_offset: Decimal,
    /// How many times `high` may be doubled before giving up.
    pub max_expansions: u32,
    pub tolerance_gross: Decimal,
    pub tolerance_net: Decimal,
    pub max_iterations: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            initial_multiple: dec!(3),
            initial_offset: dec!(10000),
            max_expansions: 64,
            tolerance_gross: dec!(0.0001),
            tolerance_net: dec!(0.001),
            max_iterations: 100,
        }
    }
}

impl SolverSettings {
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSolverSetting`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |name, reason| Err(ConfigurationError::InvalidSolverSetting { name, reason });

        if self.initial_multiple < Decimal::ZERO {
            return invalid("initial_multiple", "must not be negative");
        }
        if self.initial_offset <= Decimal::ZERO {
            return invalid("initial_offset", "must be positive");
        }
        if self.tolerance_gross <= Decimal::ZERO {
            return invalid("tolerance_gross", "must be positive");
        }
        if self.tolerance_net <= Decimal::ZERO {
            return invalid("tolerance_net", "must be positive");
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations", "must be at least 1");
        }
        Ok(())
    }
}

/// Why the bisection stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The target was zero; gross zero is exact.
    ZeroTarget,
    NetTolerance,
    GrossTolerance,
    /// Neither tolerance was met before the cap, but the upper bound's net is
    /// already close enough to the target.
    IterationCap,
}

/// Outcome of a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Forward calculation at the converged gross, rounded to cents.
    pub result: CalculationResult,
    /// Converged gross before rounding.
    pub gross: Decimal,
    pub expansions: u32,
    pub iterations: u32,
    pub stop: StopReason,
}

/// Finds the gross salary producing a target net under one configuration.
#[derive(Debug, Clone)]
pub struct InverseSolver<'a> {
    forward: ForwardCalculator<'a>,
    settings: SolverSettings,
}

impl<'a> InverseSolver<'a> {
    /// Solver with [`SolverSettings::default`].
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self {
            forward: ForwardCalculator::new(config),
            settings: SolverSettings::default(),
        }
    }

    /// # Errors
    ///
    /// Returns the [`ConfigurationError`] raised by
    /// [`SolverSettings::validate`].
    pub fn with_settings(
        config: &'a TaxYearConfig,
        settings: SolverSettings,
    ) -> Result<Self, ConfigurationError> {
        settings.validate()?;
        Ok(Self {
            forward: ForwardCalculator::new(config),
            settings,
        })
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Solves for `target_net`.
    ///
    /// A negative target is treated as zero.
    ///
    /// # Arguments
    ///
    /// * `target_net` - Net salary to reach
    ///
    /// # Returns
    ///
    /// The [`Solution`] whose gross reproduces `target_net` within the
    /// configured tolerances, together with the work it took.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Unsolvable`] when no bracket containing the
    /// target can be found, when the target falls in a discontinuity of
    /// net over gross, or when the iteration cap leaves the estimate off
    /// target.
    pub fn solve(
        &self,
        target_net: Decimal,
    ) -> Result<Solution, SolverError> {
        let target = if target_net < Decimal::ZERO {
            warn!(target_net = %target_net, "Negative target net salary; treating as zero");
            Decimal::ZERO
        } else {
            target_net
        };

        if target.is_zero() {
            return Ok(self.solution(Decimal::ZERO, 0, 0, StopReason::ZeroTarget));
        }

        let (mut low, mut high, expansions) = self.bracket(target)?;
        let settings = &self.settings;

        for iteration in 1..=settings.max_iterations {
            let mid = ((low + high) / Decimal::TWO).round_dp(MIDPOINT_SCALE);
            let net = self.forward.net(mid);

            if (net - target).abs() < settings.tolerance_net {
                debug!(iteration, gross = %mid, net = %net, "Converged on net tolerance");
                return Ok(self.solution(mid, expansions, iteration, StopReason::NetTolerance));
            }

            if net < target {
                low = mid;
            } else {
                high = mid;
            }

            if high - low < settings.tolerance_gross {
                debug!(iteration, low = %low, high = %high, "Bracket narrower than gross tolerance");
                let net_low = self.forward.net(low);
                let net_high = self.forward.net(high);
                return self.accept(target, net_high, || {
                    format!(
                        "target falls in a discontinuity of net(gross): net jumps from \
                         {net_low} to {net_high} between gross {low} and {high}"
                    )
                })
                .map(|()| self.solution(high, expansions, iteration, StopReason::GrossTolerance));
            }
        }

        let net_high = self.forward.net(high);
        warn!(
            target_net = %target,
            max_iterations = settings.max_iterations,
            low = %low,
            high = %high,
            net_high = %net_high,
            "Iteration cap reached before either tolerance"
        );
        self.accept(target, net_high, || {
            format!(
                "iteration cap {} reached; closest gross {high} gives net {net_high}",
                settings.max_iterations
            )
        })
        .map(|()| self.solution(high, expansions, settings.max_iterations, StopReason::IterationCap))
    }

    /// Largest acceptable `|net − target|` once the bisection has stopped.
    fn residual_limit(&self) -> Decimal {
        self.settings.tolerance_net.max(self.settings.tolerance_gross)
    }

    fn accept(
        &self,
        target: Decimal,
        net: Decimal,
        reason: impl FnOnce() -> String,
    ) -> Result<(), SolverError> {
        if (net - target).abs() <= self.residual_limit() {
            return Ok(());
        }
        let reason = reason();
        warn!(target_net = %target, net = %net, "{reason}");
        Err(SolverError::Unsolvable {
            target_net: target,
            reason,
        })
    }

    /// Finds `(low, high)` with `net(low) < target <= net(high)`, returning
    /// the number of doublings used.
    fn bracket(
        &self,
        target: Decimal,
    ) -> Result<(Decimal, Decimal, u32), SolverError> {
        let unsolvable = |reason: String| SolverError::Unsolvable {
            target_net: target,
            reason,
        };

        // Net never exceeds gross.
        if target > MAX_GROSS {
            return Err(unsolvable(format!("target exceeds the maximum gross {MAX_GROSS}")));
        }

        let settings = &self.settings;
        // Oversized settings saturate at the ceiling instead of overflowing.
        let mut high = target
            .checked_mul(settings.initial_multiple)
            .and_then(|scaled| scaled.checked_add(settings.initial_offset))
            .map_or(MAX_GROSS, |initial| initial.min(MAX_GROSS));
        let mut expansions = 0;

        while self.forward.net(high) < target {
            if high >= MAX_GROSS {
                return Err(unsolvable(format!(
                    "net at the maximum gross {MAX_GROSS} is still below the target"
                )));
            }
            if expansions >= settings.max_expansions {
                return Err(unsolvable(format!(
                    "target not bracketed after {expansions} expansions (high = {high})"
                )));
            }
            high = (high * Decimal::TWO).min(MAX_GROSS);
            expansions += 1;
            debug!(expansions, high = %high, "Expanded upper bracket");
        }

        Ok((Decimal::ZERO, high, expansions))
    }

    fn solution(
        &self,
        gross: Decimal,
        expansions: u32,
        iterations: u32,
        stop: StopReason,
    ) -> Solution {
        Solution {
            result: self.forward.calculate(gross),
            gross,
            expansions,
            iterations,
            stop,
        }
    }
}
