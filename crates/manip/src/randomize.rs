//! # Randomization Engine
//!
//! Runs once per reset: picks the anchor position (uniformly from the object
//! region, or the configured default), lays the scene out around it, resolves
//! the effective goal through simulator geometry and computes the episode's
//! shaping normalizer.

use crate::config::TaskConfig;
use crate::error::TaskError;
use crate::task::{Bindings, BoundLayout, NormalizerOrigin, TaskSpec};
use physics::{Simulator, Vec3};

/// Smallest normalizer handed to the reward engine.
pub const MIN_NORMALIZER: f64 = 1e-6;

/// Result of laying out one episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// The raw sampled (or default) position everything else derives from.
    pub anchor: Vec3,
    pub obj_init_pos: Vec3,
    /// Effective goal used for reward and success.
    pub state_goal: Vec3,
    /// Achieved feature position right after placement.
    pub feature_pos: Vec3,
    /// Shaping normalizer, never below [`MIN_NORMALIZER`].
    pub max_dist: f64,
}

/// Anchor for the next episode.
///
/// With randomization on this is a uniform draw from the object region.
/// Otherwise button layouts anchor at the default object position and socket
/// layouts at the default goal.
#[must_use]
pub fn sample_anchor(config: &TaskConfig, layout: &BoundLayout, rng: &mut fastrand::Rng, enabled: bool) -> Vec3 {
    if enabled {
        return config.obj.sample(rng);
    }
    match layout {
        BoundLayout::Button { .. } => config.default_obj_pos,
        BoundLayout::Socket { .. } => config.default_goal,
    }
}

/// Guard the normalizer against degenerate geometry.
#[must_use]
pub fn clamp_normalizer(raw: f64) -> f64 {
    if raw.is_finite() && raw >= MIN_NORMALIZER {
        raw
    } else {
        tracing::warn!(raw, clamped = MIN_NORMALIZER, "degenerate normalizer, object and goal coincide");
        MIN_NORMALIZER
    }
}

/// Lay out a fresh episode in `sim`.
///
/// # Errors
///
/// Propagates simulator errors from resetting the object joint. The joint is
/// reset before any body moves, so an error leaves the layout untouched.
pub fn sample<S: Simulator>(
    spec: &TaskSpec,
    bindings: &Bindings,
    sim: &mut S,
    rng: &mut fastrand::Rng,
    enabled: bool,
) -> Result<Placement, TaskError> {
    let anchor = sample_anchor(&spec.config, &bindings.layout, rng, enabled);

    let (obj_init_pos, state_goal) = match bindings.layout {
        BoundLayout::Button { housing, button, button_joint, goal_site, button_offset, prop } => {
            let button_pos = if enabled { anchor + button_offset } else { spec.config.default_goal };
            sim.reset_joint(button_joint, 0.0)?;
            sim.set_body_pos(housing, anchor);
            sim.set_body_pos(button, button_pos);
            if let Some((prop, offset)) = prop {
                sim.set_body_pos(prop, anchor + offset);
            }
            (anchor, sim.site_xpos(goal_site))
        }
        BoundLayout::Socket { socket, socket_site, object, object_joint, goal_offset } => {
            sim.reset_joint(object_joint, 0.0)?;
            sim.set_body_pos(socket, anchor);
            let hole = sim.site_local_pos(socket_site) + sim.body_pos(socket);
            sim.set_body_pos(object, hole);
            (sim.body_com(object), hole + goal_offset)
        }
    };

    let feature_pos = sim.site_xpos(bindings.feature);
    let origin = match spec.normalizer_origin {
        NormalizerOrigin::Feature => feature_pos,
        NormalizerOrigin::ObjectCom => obj_init_pos,
    };
    let max_dist = clamp_normalizer(spec.normalizer.distance(origin, state_goal));

    tracing::debug!(
        task = spec.name,
        enabled,
        ?anchor,
        ?state_goal,
        max_dist,
        "episode placed"
    );

    Ok(Placement { anchor, obj_init_pos, state_goal, feature_pos, max_dist })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizer_is_clamped_away_from_zero() {
        assert_eq!(clamp_normalizer(0.0), MIN_NORMALIZER);
        assert_eq!(clamp_normalizer(1e-9), MIN_NORMALIZER);
        assert_eq!(clamp_normalizer(f64::NAN), MIN_NORMALIZER);
        assert_eq!(clamp_normalizer(0.1), 0.1);
    }
}
