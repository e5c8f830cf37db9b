//! Orrery demo: a sun, two planets, and a moon on nested orbit pivots,
//! plus a drifting comet and a star-field skybox pinned to the camera.
//!
//! The scene is assembled in code, written to a JSON document, loaded
//! back, and then run headless for a fixed number of frames. Running the
//! document rather than the in-memory scene keeps the save path honest.

use diorama::prelude::*;
use rand::Rng;
use std::cell::RefCell;
use std::error::Error;
use std::f32::consts::{FRAC_PI_3, TAU};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const CONFIG_PATH: &str = "orrery_app/orrery.toml";
const DEFAULT_SCENE_PATH: &str = "orrery_app/scenes/orrery.json";
const DEFAULT_FRAME_CAP: u64 = 240;

const CAMERA_POSITION: [f32; 3] = [0.0, 6.0, 22.0];
const SUN_RADIUS: f32 = 3.0;
const INNER_ORBIT_RADIUS: f32 = 8.0;
const OUTER_ORBIT_RADIUS: f32 = 14.0;
const MOON_ORBIT_RADIUS: f32 = 2.2;

fn main() {
    diorama::foundation::logging::init_with_level(log::LevelFilter::Info);

    if let Err(error) = run() {
        report(error.as_ref());
        std::process::exit(1);
    }
}

/// Log the error and every cause below it.
fn report(error: &dyn Error) {
    log::error!("{error}");
    let mut cause = error.source();
    while let Some(current) = cause {
        log::error!("  caused by: {current}");
        cause = current.source();
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = load_config()?;
    let scene = build_orrery(&config)?;
    log::info!(
        "assembled orrery: {} transforms, {} components",
        scene.transform_count(),
        scene.component_count()
    );

    let scene_path = config
        .scene
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENE_PATH));
    if let Some(parent) = scene_path.parent() {
        fs::create_dir_all(parent)?;
    }
    scene.save(&scene_path)?;

    let scene = Scene::load(&scene_path, &config.assets.root)?;

    let mut engine = Engine::new(config, HeadlessWindow::new(), NullDevice::new(), scene)?;
    engine.run()?;

    let stats = engine.device().stats();
    log::info!(
        "device totals: {} draw calls, {} triangles, {} uniform writes",
        stats.draw_calls,
        stats.triangles_drawn,
        stats.uniform_writes
    );

    engine.shutdown()?;
    Ok(())
}

/// Read the engine config, falling back to defaults when the file is
/// absent. The demo always runs with a frame cap so a headless run
/// terminates.
fn load_config() -> Result<EngineConfig, ConfigError> {
    let path = Path::new(CONFIG_PATH);
    let mut config = if path.exists() {
        EngineConfig::load_from_file(path)?
    } else {
        log::warn!("no config at {}, using defaults", path.display());
        EngineConfig::default()
    };
    config.scene.frame_cap.get_or_insert(DEFAULT_FRAME_CAP);
    if config.scene.path.is_none() {
        config.scene.path = Some(PathBuf::from(DEFAULT_SCENE_PATH));
    }
    Ok(config)
}

fn build_orrery(config: &EngineConfig) -> Result<Scene, Box<dyn Error>> {
    let importer = ObjImporter::new(&config.assets.root);
    let sphere = Rc::new(importer.import(Path::new("meshes/planet.obj"))?);
    let comet_mesh = Rc::new(importer.import(Path::new("meshes/comet.obj"))?);
    let skybox_mesh = Rc::new(importer.import(Path::new("meshes/skybox.obj"))?);

    let sun_shader = unlit_shader("textures/sun.png");
    let sky_shader = unlit_shader("textures/stars.png");
    // One lit shader shared by every rocky body; the sun sits at the origin.
    let surface_shader = Rc::new(RefCell::new(Shader::new(ShaderDesc::TextureAndLighting {
        vertex: PathBuf::from("shaders/lit.vert"),
        fragment: PathBuf::from("shaders/lit.frag"),
        texture: PathBuf::from("textures/rock.png"),
        light_position: Vec3::zeros(),
    })));
    let comet_shader = Rc::new(RefCell::new(Shader::new(ShaderDesc::FragmentNormal {
        vertex: PathBuf::from("shaders/normals.vert"),
        fragment: PathBuf::from("shaders/normals.frag"),
    })));

    let scene = Scene::new();
    let mut root = scene.root().clone();
    let mut rng = rand::thread_rng();

    let (mut camera_node, mut camera_object) = attach_entity(&mut root, "camera")?;
    camera_node.set_local_position(Vec3::from(CAMERA_POSITION))?;
    let camera = Component::camera(
        &camera_object,
        Projection::Perspective {
            fov: FRAC_PI_3,
            aspect_ratio: config.window.aspect_ratio(),
        },
        0.1,
        500.0,
    )?;
    camera_object.add_component(&camera)?;
    let controller = Component::camera_controller(&camera_object, 8.0, 90.0)?;
    camera_object.add_component(&controller)?;

    let (_, mut sun_object) = attach_body(
        &mut root,
        "sun",
        Vec3::zeros(),
        SUN_RADIUS,
        &sphere,
        &sun_shader,
        &camera,
    )?;
    let spin = Component::test_rotation(&sun_object, Vec3::y(), 4.0)?;
    sun_object.add_component(&spin)?;

    let (mut inner_pivot, _) = attach_orbit(&mut root, "inner orbit", 20.0, rng.gen_range(0.0..TAU))?;
    let (mut terra, mut terra_object) = attach_body(
        &mut inner_pivot,
        "terra",
        Vec3::new(INNER_ORBIT_RADIUS, 0.0, 0.0),
        1.0,
        &sphere,
        &surface_shader,
        &camera,
    )?;
    let spin = Component::test_rotation(&terra_object, Vec3::y(), 45.0)?;
    terra_object.add_component(&spin)?;

    let (mut moon_pivot, _) = attach_orbit(&mut terra, "moon orbit", 70.0, rng.gen_range(0.0..TAU))?;
    attach_body(
        &mut moon_pivot,
        "luna",
        Vec3::new(MOON_ORBIT_RADIUS, 0.0, 0.0),
        0.35,
        &sphere,
        &surface_shader,
        &camera,
    )?;

    let (mut outer_pivot, _) = attach_orbit(&mut root, "outer orbit", 9.0, rng.gen_range(0.0..TAU))?;
    let (mut rust_planet, mut rust_object) = attach_body(
        &mut outer_pivot,
        "rust",
        Vec3::new(OUTER_ORBIT_RADIUS, 0.0, 0.0),
        1.6,
        &sphere,
        &surface_shader,
        &camera,
    )?;
    let tilt = Quat::from_axis_angle(&Vec3::z_axis(), rng.gen_range(-0.3..0.3));
    rust_planet.set_local_rotation(tilt)?;
    let spin = Component::test_rotation(&rust_object, Vec3::y(), 30.0)?;
    rust_object.add_component(&spin)?;

    let (mut comet_node, mut comet_object) = attach_entity(&mut root, "comet")?;
    comet_node.set_local_position(Vec3::new(-20.0, 3.0, -6.0))?;
    comet_node.set_local_scale(Vec3::new(0.5, 0.5, 0.5))?;
    let renderer =
        Component::mesh_renderer(&comet_object, comet_mesh, comet_shader, &camera, true)?;
    comet_object.add_component(&renderer)?;
    let drift = Component::test_movement(&comet_object, Vec3::new(3.5, 0.0, 0.8))?;
    comet_object.add_component(&drift)?;

    // The skybox surrounds the camera, so frustum culling never applies.
    let (mut skybox_node, mut skybox_object) = attach_entity(&mut root, "skybox")?;
    skybox_node.set_local_scale(Vec3::new(120.0, 120.0, 120.0))?;
    let renderer =
        Component::mesh_renderer(&skybox_object, skybox_mesh, sky_shader, &camera, false)?;
    skybox_object.add_component(&renderer)?;
    let follow = Component::skybox_follow_camera(&skybox_object, &camera_node)?;
    skybox_object.add_component(&follow)?;

    Ok(scene)
}

fn unlit_shader(texture: &str) -> Rc<RefCell<Shader>> {
    Rc::new(RefCell::new(Shader::new(ShaderDesc::Texture {
        vertex: PathBuf::from("shaders/unlit.vert"),
        fragment: PathBuf::from("shaders/unlit.frag"),
        texture: PathBuf::from(texture),
    })))
}

/// Create a named entity under `parent` and hand back both halves.
fn attach_entity(parent: &mut Transform, name: &str) -> SceneResult<(Transform, GameObject)> {
    let mut transform = Transform::new();
    let game_object = GameObject::new(name);
    transform.attach_game_object(&game_object)?;
    parent.add_child(&transform)?;
    Ok((transform, game_object))
}

/// An invisible pivot that slowly yaws, carrying its children around the
/// parent. Bodies parented to it orbit at whatever offset they keep.
fn attach_orbit(
    parent: &mut Transform,
    name: &str,
    degrees_per_second: f32,
    phase: f32,
) -> SceneResult<(Transform, GameObject)> {
    let (mut pivot, mut pivot_object) = attach_entity(parent, name)?;
    pivot.set_local_rotation(Quat::from_axis_angle(&Vec3::y_axis(), phase))?;
    let spin = Component::test_rotation(&pivot_object, Vec3::y(), degrees_per_second)?;
    pivot_object.add_component(&spin)?;
    Ok((pivot, pivot_object))
}

fn attach_body(
    parent: &mut Transform,
    name: &str,
    position: Vec3,
    scale: f32,
    mesh: &Rc<Mesh>,
    shader: &Rc<RefCell<Shader>>,
    camera: &Component,
) -> SceneResult<(Transform, GameObject)> {
    let (mut transform, mut game_object) = attach_entity(parent, name)?;
    transform.set_local_position(position)?;
    transform.set_local_scale(Vec3::new(scale, scale, scale))?;
    let renderer =
        Component::mesh_renderer(&game_object, Rc::clone(mesh), Rc::clone(shader), camera, true)?;
    game_object.add_component(&renderer)?;
    Ok((transform, game_object))
}
