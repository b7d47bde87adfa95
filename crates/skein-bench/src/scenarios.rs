//! Benchmark scenarios: procedural body, colliders, wind and config for
//! each test case.
//!
//! Four canonical scenarios for regression testing:
//! 1. **Hanging cloth** — sheet pinned along its top edge, drapes under gravity
//! 2. **Sphere drape** — free sheet falls onto a sphere
//! 3. **Hair drape** — horizontal strands swing down onto the ground
//! 4. **Wind cloth** — hanging sheet pushed by a uniform wind

use serde::{Deserialize, Serialize};

use skein_contact::ColliderDesc;
use skein_math::Vec3;
use skein_mesh::generators::{hair_strands, quad_grid};
use skein_mesh::Body;
use skein_solver::SimulationConfig;
use skein_types::SkeinResult;

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Cloth pinned at top edge, hanging under gravity.
    HangingCloth,
    /// Cloth draped over a sphere.
    SphereDrape,
    /// Hair strands falling from a horizontal rest pose.
    HairDrape,
    /// Hanging cloth in a steady wind.
    WindCloth,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::HangingCloth,
            ScenarioKind::SphereDrape,
            ScenarioKind::HairDrape,
            ScenarioKind::WindCloth,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::HangingCloth => "hanging_cloth",
            ScenarioKind::SphereDrape => "sphere_drape",
            ScenarioKind::HairDrape => "hair_drape",
            ScenarioKind::WindCloth => "wind_cloth",
        }
    }

    /// Parses a name as returned by [`ScenarioKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// A fully specified benchmark scenario.
pub struct Scenario {
    pub kind: ScenarioKind,
    /// Simulated body.
    pub body: Body,
    /// Analytic colliders.
    pub colliders: Vec<ColliderDesc>,
    /// Uniform wind, if any.
    pub wind: Option<Vec3>,
    pub config: SimulationConfig,
    /// Number of frames to simulate.
    pub frames: u32,
}

/// Per-vertex mass of the cloth sheets, about 150 g/m² at 13×13 vertices.
const CLOTH_VERTEX_MASS: f32 = 0.001;
const CLOTH_RES: usize = 12;

fn pin_top_row(body: &mut Body, cols: usize) {
    for i in 0..=cols {
        let v = body.vertices[i].clone();
        body.vertices[i] = v.pinned();
    }
}

impl Scenario {
    /// A 1m × 1m sheet at 12×12 resolution, pinned along the top edge,
    /// hanging under gravity for 2 seconds.
    pub fn hanging_cloth() -> SkeinResult<Self> {
        let mut body = quad_grid(CLOTH_RES, CLOTH_RES, 1.0, 1.0, CLOTH_VERTEX_MASS)?;
        pin_top_row(&mut body, CLOTH_RES);

        Ok(Self {
            kind: ScenarioKind::HangingCloth,
            body,
            colliders: Vec::new(),
            wind: None,
            config: SimulationConfig::default(),
            frames: 48,
        })
    }

    /// A 1.5m × 1.5m horizontal sheet falls onto a sphere of radius
    /// 0.3m centered at the origin.
    pub fn sphere_drape() -> SkeinResult<Self> {
        let mut body = quad_grid(CLOTH_RES, CLOTH_RES, 1.5, 1.5, CLOTH_VERTEX_MASS)?;
        // Rotate into the XZ plane, 0.5m up.
        for v in &mut body.vertices {
            v.position = Vec3::new(v.position.x, 0.5, v.position.y);
        }

        let mut config = SimulationConfig::default();
        config.collision.enabled = true;

        Ok(Self {
            kind: ScenarioKind::SphereDrape,
            body,
            colliders: vec![ColliderDesc::Sphere {
                center: [0.0, 0.0, 0.0],
                radius: 0.3,
                velocity: [0.0, 0.0, 0.0],
            }],
            wind: None,
            config,
            frames: 48,
        })
    }

    /// Eight 0.5m strands rooted along Z, sticking out along +X, fall
    /// under gravity onto a ground plane.
    pub fn hair_drape() -> SkeinResult<Self> {
        let mut body = hair_strands(8, 10, 0.5, 0.03, Vec3::X, 0.002)?;
        // Only the roots are held; the rest falls freely.
        for v in body.vertices.iter_mut().filter(|v| !v.pinned) {
            v.goal = None;
        }

        Ok(Self {
            kind: ScenarioKind::HairDrape,
            body,
            colliders: vec![ColliderDesc::Ground { height: -0.4 }],
            wind: None,
            config: SimulationConfig::hair(),
            frames: 48,
        })
    }

    /// The hanging sheet with a steady wind blowing through it.
    pub fn wind_cloth() -> SkeinResult<Self> {
        let mut scenario = Self::hanging_cloth()?;
        scenario.kind = ScenarioKind::WindCloth;
        scenario.wind = Some(Vec3::new(0.0, 0.0, 20.0));
        Ok(scenario)
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> SkeinResult<Self> {
        match kind {
            ScenarioKind::HangingCloth => Self::hanging_cloth(),
            ScenarioKind::SphereDrape => Self::sphere_drape(),
            ScenarioKind::HairDrape => Self::hair_drape(),
            ScenarioKind::WindCloth => Self::wind_cloth(),
        }
    }

    /// Builds a scenario from a scene description, overriding the
    /// scenario defaults with whatever the scene sets.
    pub fn from_scene(scene: &SceneFile) -> SkeinResult<Self> {
        let mut scenario = Self::from_kind(scene.scenario)?;
        if let Some(frames) = scene.frames {
            scenario.frames = frames;
        }
        if let Some(config) = &scene.config {
            scenario.config = config.clone();
        }
        if let Some(colliders) = &scene.colliders {
            scenario.colliders = colliders.clone();
        }
        if let Some(wind) = scene.wind {
            scenario.wind = Some(Vec3::from(wind));
        }
        scenario.config.validate()?;
        Ok(scenario)
    }
}

/// Scene description as loaded by the command line tool.
///
/// Only `scenario` is required; every other field falls back to the
/// scenario's defaults. A `[config]` table replaces the scenario's
/// config as a whole, with unset keys taking the plain
/// [`SimulationConfig`] defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub scenario: ScenarioKind,
    #[serde(default)]
    pub frames: Option<u32>,
    #[serde(default)]
    pub config: Option<SimulationConfig>,
    #[serde(default)]
    pub colliders: Option<Vec<ColliderDesc>>,
    #[serde(default)]
    pub wind: Option<[f32; 3]>,
}
