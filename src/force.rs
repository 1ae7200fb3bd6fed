//! Weight- and overkill-driven impulse multipliers.
//!
//! Barely-lethal hits should read differently from massive overkill, so the
//! vertical response is tiered rather than linear:
//!
//! | overkill | vertical scale                  |
//! |----------|---------------------------------|
//! | 0–5      | tiny                            |
//! | 5–19     | tiny → small                    |
//! | 19–20    | small → 1.0                     |
//! | 20       | exactly 1.0                     |
//! | 20–50    | 1.0 → cap                       |
//!
//! Horizontal and angular scales grow linearly over the whole range. Weight
//! then scales each axis by `1 + (weight_scalar - 1) * axis_impact`.

use crate::config::ForceConfig;
use crate::float::Float;
use crate::vec::Vec2;

/// Coarse category scaling how strongly an entity responds to impulses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeightClass {
    Light,
    #[default]
    Medium,
    Heavy,
}

impl WeightClass {
    pub fn scalar<F: Float>(self, config: &ForceConfig<F>) -> F {
        match self {
            WeightClass::Light => config.light_scalar,
            WeightClass::Medium => config.medium_scalar,
            WeightClass::Heavy => config.heavy_scalar,
        }
    }
}

/// Per-axis impulse multipliers, computed once per ragdoll.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ForceMultipliers<F: Float> {
    pub horizontal: F,
    pub vertical: F,
    pub angular: F,
}

impl<F: Float> ForceMultipliers<F> {
    /// Multipliers of exactly one on every axis.
    pub fn identity() -> Self {
        ForceMultipliers {
            horizontal: F::one(),
            vertical: F::one(),
            angular: F::one(),
        }
    }

    /// Scale a linear force or velocity by the horizontal and vertical multipliers.
    pub fn scale_linear(&self, v: Vec2<F>) -> Vec2<F> {
        Vec2::new(v.x * self.horizontal, v.y * self.vertical)
    }
}

/// Compute the per-axis multipliers for an entity of `weight` killed with `overkill`.
pub fn compute_multipliers<F: Float>(
    weight: WeightClass,
    overkill: F,
    config: &ForceConfig<F>,
) -> ForceMultipliers<F> {
    let overkill = overkill.clamp(F::zero(), config.max_overkill);
    let t = overkill / config.max_overkill;

    let horizontal = config.horizontal_min.lerp(config.horizontal_max, t);
    let angular = config.angular_min.lerp(config.angular_max, t);
    let vertical = vertical_scale(overkill, config);

    let w = weight.scalar(config);
    let weighted = |scale: F, impact: F| scale * (F::one() + (w - F::one()) * impact);

    ForceMultipliers {
        horizontal: weighted(horizontal, config.horizontal_impact),
        vertical: weighted(vertical, config.vertical_impact),
        angular: weighted(angular, config.angular_impact),
    }
}

fn vertical_scale<F: Float>(overkill: F, config: &ForceConfig<F>) -> F {
    let f = F::from_f32;
    let baseline = f(20.0);
    if overkill <= f(5.0) {
        config.vertical_tiny
    } else if overkill < f(19.0) {
        let t = (overkill - f(5.0)) / f(14.0);
        config.vertical_tiny.lerp(config.vertical_small, t)
    } else if overkill < baseline {
        config.vertical_small.lerp(F::one(), overkill - f(19.0))
    } else if overkill == baseline {
        F::one()
    } else {
        let t = (overkill - baseline) / (config.max_overkill - baseline);
        F::one().lerp(config.vertical_cap, t.min(F::one()))
    }
}
