// Host-side tests for scene composition and the mount-time mode choice.

use folio_core::constants::{HERO_AUTO_ROTATE_SPEED, MODEL_BASE_POSITION, STAR_COUNT};
use folio_core::geometry;
use folio_core::{
    compose, AssetLoadError, ClockState, ModelAsset, ModelLoad, NodeKind, OrbitSettings,
    PointerSample, SceneConfig, SceneKind, SceneMode, Shading, ThemeSignal,
};

fn tick(elapsed: f32) -> ClockState {
    ClockState {
        elapsed,
        delta: 1.0 / 60.0,
    }
}

fn showcase(model: Option<ModelLoad>) -> folio_core::Scene {
    compose(
        &SceneConfig::new(SceneKind::Showcase),
        &ThemeSignal::new(true),
        model,
    )
}

fn kinds(scene: &folio_core::Scene) -> Vec<NodeKind> {
    scene.drivers().iter().map(|d| d.spec().kind).collect()
}

#[test]
fn scene_kind_parses_config_strings() {
    assert_eq!(SceneKind::parse("hero"), Some(SceneKind::Hero));
    assert_eq!(SceneKind::parse(" Background "), Some(SceneKind::Background));
    assert_eq!(SceneKind::parse("SHOWCASE"), Some(SceneKind::Showcase));
    assert_eq!(SceneKind::parse("gallery"), None);
    for kind in [SceneKind::Hero, SceneKind::Showcase, SceneKind::Background] {
        assert_eq!(SceneKind::parse(kind.as_str()), Some(kind));
    }
}

#[test]
fn mode_selection_is_idempotent() {
    let load = ModelLoad::new("model.glb");
    assert_eq!(SceneMode::select(Some(&load)), SceneMode::CustomModel);
    assert_eq!(SceneMode::select(Some(&load)), SceneMode::CustomModel);
    assert_eq!(SceneMode::select(None), SceneMode::ProceduralFallback);
    assert_eq!(SceneMode::select(None), SceneMode::ProceduralFallback);

    let failed = ModelLoad::new("missing.glb");
    failed.resolve(Err(AssetLoadError::NoGeometry));
    assert_eq!(SceneMode::select(Some(&failed)), SceneMode::ProceduralFallback);
}

#[test]
fn no_model_composes_procedural_shapes() {
    let scene = showcase(None);
    assert_eq!(scene.mode(), Some(SceneMode::ProceduralFallback));
    assert_eq!(kinds(&scene), vec![NodeKind::ProceduralShapes]);
    assert_eq!(scene.graph().find("shapes").map(|n| n.parts.len()), Some(3));
    assert!(scene.graph().find("ground").is_none());
}

#[test]
fn pending_model_renders_nothing_for_the_slot() {
    let load = ModelLoad::new("model.glb");
    let mut scene = showcase(Some(load));
    assert_eq!(scene.mode(), Some(SceneMode::CustomModel));
    for i in 0..30 {
        scene.update(PointerSample::ZERO, tick(i as f32 / 60.0));
    }
    assert!(scene.is_model_pending());
    assert!(scene.drivers().is_empty());
    assert!(scene.graph().find("model").is_none());
    assert!(scene.graph().find("ground").is_some()); // ground is part of the mode
}

#[test]
fn ready_model_is_composed_with_its_driver() {
    let load = ModelLoad::new("model.glb");
    let mut scene = showcase(Some(load.clone()));
    scene.update(PointerSample::ZERO, tick(0.0));
    load.resolve(Ok(ModelAsset {
        mesh: geometry::cube(1.0),
    }));
    scene.update(PointerSample::ZERO, tick(0.1));

    assert!(!scene.is_model_pending());
    assert_eq!(kinds(&scene), vec![NodeKind::ImportedModel]);
    let model = scene.graph().find("model").expect("model node");
    // seeded on its first tick; pointer at rest keeps x and y on base
    assert_eq!(model.transform.position, MODEL_BASE_POSITION);
    assert_eq!(scene.mode(), Some(SceneMode::CustomModel));
}

#[test]
fn failed_model_falls_back_without_reselecting_mode() {
    let load = ModelLoad::new("broken.glb");
    let mut scene = showcase(Some(load.clone()));
    load.resolve(Err(AssetLoadError::Parse("bad magic".into())));
    scene.update(PointerSample::ZERO, tick(0.0));

    assert_eq!(scene.mode(), Some(SceneMode::CustomModel)); // decided at mount
    assert_eq!(kinds(&scene), vec![NodeKind::ProceduralShapes]);
    assert!(scene.graph().find("model").is_none());
}

#[test]
fn slot_settles_once() {
    let load = ModelLoad::new("model.glb");
    let mut scene = showcase(Some(load.clone()));
    load.resolve(Err(AssetLoadError::NoGeometry));
    // a late success is ignored by the load itself
    load.resolve(Ok(ModelAsset {
        mesh: geometry::cube(1.0),
    }));
    assert!(load.state().is_failed());
    for i in 0..5 {
        scene.update(PointerSample::ZERO, tick(i as f32));
    }
    assert_eq!(kinds(&scene), vec![NodeKind::ProceduralShapes]);
}

#[test]
fn hero_is_a_distorted_sphere_with_auto_rotate_only() {
    let scene = compose(
        &SceneConfig::new(SceneKind::Hero),
        &ThemeSignal::new(true),
        None,
    );
    assert_eq!(scene.mode(), None);
    assert_eq!(kinds(&scene), vec![NodeKind::DistortedSphere]);
    let sphere = scene.graph().find("sphere").expect("sphere");
    assert!(matches!(
        sphere.parts[0].material.shading,
        Shading::Distort { .. }
    ));
    let orbit = scene.orbit();
    assert_eq!(*orbit, OrbitSettings::auto_rotate_only(HERO_AUTO_ROTATE_SPEED));
    assert!(!orbit.enable_rotate && !orbit.enable_zoom && !orbit.enable_pan);
    assert!(orbit.auto_rotate);
    assert!((scene.backdrop().ambient - 0.5).abs() < 1e-6);
}

#[test]
fn background_locks_camera_and_orders_drivers() {
    let mut scene = compose(
        &SceneConfig::new(SceneKind::Background),
        &ThemeSignal::new(true),
        Some(ModelLoad::new("ignored.glb")),
    );
    assert_eq!(*scene.orbit(), OrbitSettings::LOCKED);
    assert_eq!(
        kinds(&scene),
        vec![NodeKind::Starfield, NodeKind::ParticleCloud]
    );
    let stars = scene.graph().find("starfield").expect("stars");
    let mesh = scene.graph().mesh(stars.parts[0].mesh).expect("star mesh");
    assert_eq!(mesh.vertex_count(), STAR_COUNT);

    let eye = scene.camera().eye;
    scene.update(PointerSample::ZERO, tick(5.0));
    assert_eq!(scene.camera().eye, eye);
}

#[test]
fn same_seed_same_starfield() {
    let theme = ThemeSignal::new(true);
    let config = SceneConfig::new(SceneKind::Background);
    let a = compose(&config, &theme, None);
    let b = compose(&config, &theme, None);
    assert_eq!(a.graph().meshes()[0].positions, b.graph().meshes()[0].positions);
}

#[test]
fn update_after_release_is_a_no_op() {
    let mut scene = showcase(None);
    scene.update(PointerSample { x: 1.0, y: 1.0 }, tick(0.5));
    let before = scene.graph().find("shapes").map(|n| n.transform);
    scene.release();
    scene.release();
    scene.update(PointerSample { x: -1.0, y: -1.0 }, tick(1.0));
    assert_eq!(scene.graph().find("shapes").map(|n| n.transform), before);
}
