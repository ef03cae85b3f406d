//! Scene composition: which nodes exist, who drives them, how they are lit.

use crate::asset::{AssetState, ModelLoad};
use crate::camera::{Camera, OrbitSettings};
use crate::clock::ClockState;
use crate::constants::*;
use crate::driver::{AnimatedNodeDriver, AnimatedNodeSpec, NodeKind};
use crate::geometry;
use crate::graph::{Material, Node, Part, SceneGraph, Shading};
use crate::pointer::PointerSample;
use crate::theme::{Backdrop, BackdropSource, ThemeBackdrop, ThemeSignal};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneKind {
    /// Distorted sphere under studio lights, slow auto-rotate.
    Hero,
    /// Imported model on a ground plane, or the procedural shapes group.
    Showcase,
    /// Starfield and particle cloud behind page content; camera locked.
    Background,
}

impl SceneKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hero" => Some(SceneKind::Hero),
            "showcase" => Some(SceneKind::Showcase),
            "background" => Some(SceneKind::Background),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SceneKind::Hero => "hero",
            SceneKind::Showcase => "showcase",
            SceneKind::Background => "background",
        }
    }
}

/// Mount-time choice between the imported model and the procedural shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneMode {
    CustomModel,
    ProceduralFallback,
}

impl SceneMode {
    /// A model resource that has not already failed selects `CustomModel`.
    pub fn select(model: Option<&ModelLoad>) -> Self {
        match model {
            Some(load) if !load.state().is_failed() => SceneMode::CustomModel,
            _ => SceneMode::ProceduralFallback,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub kind: SceneKind,
    /// Path or URL of a glTF/GLB model for the showcase scene.
    pub model_path: Option<String>,
    /// Seed for star and particle placement.
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            kind: SceneKind::Hero,
            model_path: None,
            seed: 0x5eed,
        }
    }
}

impl SceneConfig {
    pub fn new(kind: SceneKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, path: impl Into<String>) -> Self {
        self.model_path = Some(path.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    /// Linear RGB.
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Directional key light plus up to two point lights.
///
/// Ambient and directional intensities come from the scene's [`Backdrop`].
#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    pub key_light_position: Vec3,
    pub points: SmallVec<[PointLight; 2]>,
}

impl LightRig {
    pub fn key_only() -> Self {
        Self {
            key_light_position: KEY_LIGHT_POSITION,
            points: SmallVec::new(),
        }
    }

    pub fn showcase() -> Self {
        let rim = srgb_hex(TERTIARY_HEX, 1.0);
        let fill = srgb_hex(ACCENT_HEX, 1.0);
        let mut points = SmallVec::new();
        points.push(PointLight {
            position: RIM_LIGHT_POSITION,
            color: [rim[0], rim[1], rim[2]],
            intensity: RIM_LIGHT_INTENSITY,
        });
        points.push(PointLight {
            position: FILL_LIGHT_POSITION,
            color: [fill[0], fill[1], fill[2]],
            intensity: FILL_LIGHT_INTENSITY,
        });
        Self {
            key_light_position: KEY_LIGHT_POSITION,
            points,
        }
    }
}

enum ModelSlot {
    /// No model in this scene.
    Empty,
    /// Waiting for the load to settle; nothing is drawn for the slot.
    Awaiting(ModelLoad),
    /// Composed once; never looked at again.
    Settled,
}

/// A composed scene: node graph, drivers in tick order, camera and lights.
pub struct Scene {
    kind: SceneKind,
    mode: Option<SceneMode>,
    graph: SceneGraph,
    drivers: Vec<AnimatedNodeDriver>,
    lights: LightRig,
    camera: Camera,
    orbit: OrbitSettings,
    backdrop: BackdropSource,
    model_slot: ModelSlot,
    released: bool,
}

/// Build the scene for `config`.
///
/// `model` only matters for [`SceneKind::Showcase`]; its presence decides
/// the [`SceneMode`] once, here, and the decision is never revisited.
pub fn compose(config: &SceneConfig, theme: &ThemeSignal, model: Option<ModelLoad>) -> Scene {
    let mut graph = SceneGraph::new();
    let mut drivers = Vec::new();
    let mut mode = None;
    let mut model_slot = ModelSlot::Empty;

    let (lights, orbit, backdrop) = match config.kind {
        SceneKind::Hero => {
            compose_sphere(&mut graph, &mut drivers);
            (
                LightRig::key_only(),
                OrbitSettings::auto_rotate_only(HERO_AUTO_ROTATE_SPEED),
                BackdropSource::Fixed(Backdrop::studio()),
            )
        }
        SceneKind::Showcase => {
            let selected = SceneMode::select(model.as_ref());
            match (selected, model) {
                (SceneMode::CustomModel, Some(load)) => {
                    compose_ground(&mut graph);
                    model_slot = ModelSlot::Awaiting(load);
                }
                _ => compose_shapes(&mut graph, &mut drivers),
            }
            mode = Some(selected);
            (
                LightRig::showcase(),
                OrbitSettings::auto_rotate_only(SHOWCASE_AUTO_ROTATE_SPEED),
                BackdropSource::Fixed(Backdrop::studio()),
            )
        }
        SceneKind::Background => {
            let mut rng = StdRng::seed_from_u64(config.seed);
            compose_starfield(&mut graph, &mut drivers, &mut rng);
            compose_particles(&mut graph, &mut drivers, &mut rng);
            (
                LightRig::key_only(),
                OrbitSettings::LOCKED,
                BackdropSource::Themed(ThemeBackdrop::observe(theme)),
            )
        }
    };

    log::info!(
        "[mount] composed {} scene ({} nodes, {} drivers{})",
        config.kind.as_str(),
        graph.nodes().len(),
        drivers.len(),
        match mode {
            Some(SceneMode::CustomModel) => ", custom model",
            Some(SceneMode::ProceduralFallback) => ", procedural",
            None => "",
        }
    );

    Scene {
        kind: config.kind,
        mode,
        graph,
        drivers,
        lights,
        camera: Camera::new(1.0),
        orbit,
        backdrop,
        model_slot,
        released: false,
    }
}

fn compose_sphere(graph: &mut SceneGraph, drivers: &mut Vec<AnimatedNodeDriver>) {
    let mesh = graph.add_mesh(geometry::uv_sphere(
        1.0,
        SPHERE_WIDTH_SEGMENTS,
        SPHERE_HEIGHT_SEGMENTS,
    ));
    let material = Material {
        color: srgb_hex(ACCENT_HEX, 1.0),
        shading: Shading::Distort {
            amount: SPHERE_DISTORT,
            speed: SPHERE_DISTORT_SPEED,
        },
    };
    let node = graph.insert(Node::new("sphere").with_part(Part::new(mesh, material)));
    drivers.push(AnimatedNodeDriver::new(node, AnimatedNodeSpec::new(NodeKind::DistortedSphere)));
}

fn compose_starfield(
    graph: &mut SceneGraph,
    drivers: &mut Vec<AnimatedNodeDriver>,
    rng: &mut StdRng,
) {
    let mesh = graph.add_mesh(geometry::starfield(STAR_COUNT, STAR_RADIUS, STAR_DEPTH, rng));
    let node = graph.insert(
        Node::new("starfield").with_part(Part::new(mesh, Material::points(STAR_COLOR, STAR_SIZE))),
    );
    drivers.push(AnimatedNodeDriver::new(node, AnimatedNodeSpec::new(NodeKind::Starfield)));
}

fn compose_particles(
    graph: &mut SceneGraph,
    drivers: &mut Vec<AnimatedNodeDriver>,
    rng: &mut StdRng,
) {
    let mesh = graph.add_mesh(geometry::particle_cloud(PARTICLE_COUNT, PARTICLE_EXTENT, rng));
    let material = Material::points(srgb_hex(ACCENT_HEX, PARTICLE_OPACITY), PARTICLE_SIZE);
    let node = graph.insert(Node::new("particles").with_part(Part::new(mesh, material)));
    drivers.push(AnimatedNodeDriver::new(node, AnimatedNodeSpec::new(NodeKind::ParticleCloud)));
}

fn compose_ground(graph: &mut SceneGraph) {
    let mesh = graph.add_mesh(geometry::ground_plane(GROUND_SIZE));
    graph.insert_static(
        Node::new("ground")
            .at(Vec3::new(0.0, GROUND_Y, 0.0))
            .with_part(Part::new(mesh, Material::lit(srgb_hex(GROUND_HEX, 1.0)))),
    );
}

fn compose_shapes(graph: &mut SceneGraph, drivers: &mut Vec<AnimatedNodeDriver>) {
    let cube = graph.add_mesh(geometry::cube(CUBE_SIZE));
    let torus = graph.add_mesh(geometry::torus(TORUS_RADIUS, TORUS_TUBE, 24, 48));
    let octahedron = graph.add_mesh(geometry::octahedron(OCTAHEDRON_RADIUS));
    let node = graph.insert(
        Node::new("shapes")
            .with_part(
                Part::new(cube, Material::lit(srgb_hex(ACCENT_HEX, 1.0)))
                    .with_offset(SHAPE_OFFSETS[0])
                    .with_rotation(Vec3::new(0.4, 0.6, 0.0)),
            )
            .with_part(
                Part::new(torus, Material::lit(srgb_hex(SECONDARY_HEX, 1.0)))
                    .with_offset(SHAPE_OFFSETS[1])
                    .with_rotation(Vec3::new(0.9, 0.0, 0.0)),
            )
            .with_part(
                Part::new(octahedron, Material::lit(srgb_hex(TERTIARY_HEX, 1.0)))
                    .with_offset(SHAPE_OFFSETS[2]),
            ),
    );
    drivers.push(AnimatedNodeDriver::new(node, AnimatedNodeSpec::new(NodeKind::ProceduralShapes)));
}

impl Scene {
    /// One tick: settle the model slot if its load finished, run every
    /// driver in insertion order, then advance the orbit.
    pub fn update(&mut self, pointer: PointerSample, clock: ClockState) {
        if self.released {
            return;
        }
        self.settle_model_slot();
        for driver in &mut self.drivers {
            driver.update(&mut self.graph, pointer, clock);
        }
        self.camera.auto_rotate(&self.orbit, clock.delta);
    }

    fn settle_model_slot(&mut self) {
        let state = match &self.model_slot {
            ModelSlot::Awaiting(load) => load.state(),
            _ => return,
        };
        match state {
            AssetState::Pending => return,
            AssetState::Ready(asset) => {
                let mesh = self.graph.add_mesh(asset.mesh.clone());
                let node = self.graph.insert(
                    Node::new("model")
                        .with_part(Part::new(mesh, Material::lit(srgb_hex(ACCENT_HEX, 1.0)))),
                );
                self.drivers.push(AnimatedNodeDriver::new(
                    node,
                    AnimatedNodeSpec::new(NodeKind::ImportedModel).at(MODEL_BASE_POSITION),
                ));
                log::info!("[asset] model ready, composed");
            }
            AssetState::Failed(e) => {
                log::warn!("[asset] model unavailable ({e}), using procedural shapes");
                compose_shapes(&mut self.graph, &mut self.drivers);
            }
        }
        self.model_slot = ModelSlot::Settled;
    }

    pub fn resize(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
    }

    /// Drop the theme subscription and any pending model load. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.backdrop.detach();
        self.model_slot = ModelSlot::Settled;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    /// `None` for scenes without a model slot.
    pub fn mode(&self) -> Option<SceneMode> {
        self.mode
    }

    pub fn is_model_pending(&self) -> bool {
        matches!(self.model_slot, ModelSlot::Awaiting(_))
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn drivers(&self) -> &[AnimatedNodeDriver] {
        &self.drivers
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitSettings {
        &self.orbit
    }

    pub fn backdrop(&self) -> Backdrop {
        self.backdrop.current()
    }
}
