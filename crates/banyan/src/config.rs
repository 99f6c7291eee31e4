use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variant {
    /// Every non-root node moves every iteration.
    Monolithic,
    /// Depths are revealed one at a time and relaxed before the next one appears.
    #[default]
    Layered,
}

/// Immutable layout parameters.
///
/// The defaults are the [`LayoutConfig::layered`] preset; [`LayoutConfig::basic`] and
/// [`LayoutConfig::radial`] are the other two tunings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub variant: Variant,
    pub elastic_constant: f64,
    pub base_spring_length: f64,
    pub electrostatic_constant: f64,
    /// Scale repulsion by `1 + 2*deg(a) + 2*deg(b)` so hubs push each other further apart.
    pub use_weighted_repulsion: bool,
    pub use_center_repulsion: bool,
    pub center_repulsion_magnitude: f64,
    /// Drop child springs and skip the joint relaxation pass of the layered variant.
    pub freeze_drawn_nodes: bool,
    /// Layered variant: run the joint pass over every revealed node after each new depth.
    pub joint_relaxation: bool,
    /// Cap for the monolithic run and for each joint pass of the layered variant.
    pub max_iterations: usize,
    /// Cap for each frontier pass of the layered variant. `0` skips the frontier pass.
    pub frontier_max_iterations: usize,
    pub convergence_epsilon: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Widens the initial sampling range by this multiple of the canvas on every side.
    pub spawn_spread: f64,
    pub seed: u64,
    /// Fail on coincident nodes instead of nudging them apart.
    pub diagnostics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::layered()
    }
}

impl LayoutConfig {
    pub fn layered() -> Self {
        Self {
            variant: Variant::Layered,
            elastic_constant: 0.2,
            base_spring_length: 45.0,
            electrostatic_constant: 12000.0,
            use_weighted_repulsion: false,
            use_center_repulsion: false,
            center_repulsion_magnitude: 0.0,
            freeze_drawn_nodes: false,
            joint_relaxation: true,
            max_iterations: 2000,
            frontier_max_iterations: 500,
            convergence_epsilon: 0.5,
            canvas_width: 800.0,
            canvas_height: 600.0,
            spawn_spread: 0.0,
            seed: 1,
            diagnostics: false,
        }
    }

    pub fn basic() -> Self {
        Self {
            variant: Variant::Monolithic,
            elastic_constant: 0.25,
            base_spring_length: 10.0,
            electrostatic_constant: 6000.0,
            max_iterations: 20000,
            ..Self::layered()
        }
    }

    /// Depth-by-depth placement pushed outwards from the root, one frozen ring at a time.
    pub fn radial() -> Self {
        Self {
            variant: Variant::Layered,
            elastic_constant: 0.8,
            base_spring_length: 10.0,
            electrostatic_constant: 6000.0,
            use_weighted_repulsion: true,
            use_center_repulsion: true,
            center_repulsion_magnitude: 40.0,
            freeze_drawn_nodes: true,
            frontier_max_iterations: 2000,
            convergence_epsilon: 0.1,
            ..Self::layered()
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(Self::basic()),
            "layered" => Some(Self::layered()),
            "radial" => Some(Self::radial()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        positive("elasticConstant", self.elastic_constant)?;
        non_negative("baseSpringLength", self.base_spring_length)?;
        // Zero is allowed and turns repulsion off.
        non_negative("electrostaticConstant", self.electrostatic_constant)?;
        non_negative("centerRepulsionMagnitude", self.center_repulsion_magnitude)?;
        non_negative("convergenceEpsilon", self.convergence_epsilon)?;
        positive("canvasWidth", self.canvas_width)?;
        positive("canvasHeight", self.canvas_height)?;
        non_negative("spawnSpread", self.spawn_spread)?;
        // Initial positions are drawn from `[-spread * extent, (1 + spread) * extent)`.
        let span = 1.0 + 2.0 * self.spawn_spread;
        for (field, extent) in [
            ("canvasWidth", self.canvas_width),
            ("canvasHeight", self.canvas_height),
        ] {
            if !(span * extent).is_finite() {
                return Err(Error::InvalidConfig {
                    field,
                    reason: format!("sampling range of {span} x {extent} overflows"),
                });
            }
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig {
                field: "maxIterations",
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the layered variant runs its joint pass after each frontier pass.
    pub(crate) fn runs_joint_pass(&self) -> bool {
        self.joint_relaxation && !self.freeze_drawn_nodes
    }
}

fn positive(field: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            reason: format!("expected a finite value > 0, got {v}"),
        })
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            reason: format!("expected a finite value >= 0, got {v}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        for name in ["basic", "layered", "radial"] {
            LayoutConfig::preset(name).unwrap().validate().unwrap();
        }
        assert!(LayoutConfig::preset("spiral").is_none());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cfg = LayoutConfig {
            elastic_constant: 0.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(Error::InvalidConfig {
                field: "elasticConstant",
                ..
            })
        ));

        let cfg = LayoutConfig {
            max_iterations: 0,
            ..LayoutConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = LayoutConfig {
            canvas_width: f64::NAN,
            ..LayoutConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_sampling_range_that_overflows() {
        let cfg = LayoutConfig {
            canvas_width: 1e308,
            canvas_height: 1e308,
            spawn_spread: 1.0,
            ..LayoutConfig::basic()
        };
        assert!(matches!(
            cfg.validate(),
            Err(Error::InvalidConfig {
                field: "canvasWidth",
                ..
            })
        ));

        let cfg = LayoutConfig {
            canvas_height: f64::MAX,
            spawn_spread: 0.0,
            ..LayoutConfig::basic()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: LayoutConfig = serde_json::from_str(
            r#"{"variant": "monolithic", "baseSpringLength": 30, "useCenterRepulsion": true}"#,
        )
        .unwrap();
        assert_eq!(cfg.variant, Variant::Monolithic);
        assert_eq!(cfg.base_spring_length, 30.0);
        assert!(cfg.use_center_repulsion);
        assert_eq!(cfg.max_iterations, LayoutConfig::default().max_iterations);
    }

    #[test]
    fn freezing_disables_joint_pass() {
        let cfg = LayoutConfig {
            freeze_drawn_nodes: true,
            ..LayoutConfig::default()
        };
        assert!(!cfg.runs_joint_pass());
        assert!(LayoutConfig::default().runs_joint_pass());
    }
}
