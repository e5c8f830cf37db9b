//! End-to-end scene document tests
//!
//! Builds a small scene through the public API, saves it, and checks the
//! document and the reloaded tree against the original: structure, local
//! values, world positions, cross-reference binding, and drawing through
//! the null device.

use diorama::prelude::*;
use serde_json::Value;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const EPSILON: f32 = 1e-4;

const QUAD_OBJ: &str = "\
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

fn scratch_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "diorama-roundtrip-{}-{name}",
        std::process::id()
    ));
    for sub in ["meshes", "shaders", "textures"] {
        fs::create_dir_all(dir.join(sub)).unwrap();
    }
    fs::write(dir.join("meshes/quad.obj"), QUAD_OBJ).unwrap();
    fs::write(dir.join("shaders/lit.vert"), "void main() {}").unwrap();
    fs::write(dir.join("shaders/lit.frag"), "void main() {}").unwrap();
    image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 180, 90, 255]))
        .save(dir.join("textures/stone.png"))
        .unwrap();
    dir
}

fn lit_shader() -> Rc<RefCell<Shader>> {
    Rc::new(RefCell::new(Shader::new(ShaderDesc::TextureAndLighting {
        vertex: PathBuf::from("shaders/lit.vert"),
        fragment: PathBuf::from("shaders/lit.frag"),
        texture: PathBuf::from("textures/stone.png"),
        light_position: Vec3::new(0.0, 10.0, 0.0),
    })))
}

fn attach_entity(scene: &Scene, name: &str) -> (Transform, GameObject) {
    let mut transform = Transform::new();
    let game_object = GameObject::new(name);
    transform.attach_game_object(&game_object).unwrap();
    scene.root().clone().add_child(&transform).unwrap();
    (transform, game_object)
}

/// Camera at [0, 1, 8] looking down -z, a sun at [1, 0, 0] with a planet
/// child at [0, 1, 0] above it, a skybox pinned to the camera, and one
/// bare marker entity with no components.
fn build_scene(asset_root: &Path) -> Scene {
    let importer = ObjImporter::new(asset_root);
    let quad = Rc::new(importer.import(Path::new("meshes/quad.obj")).unwrap());
    let shader = lit_shader();

    let scene = Scene::new();

    let (mut camera_node, mut camera_object) = attach_entity(&scene, "camera");
    camera_node
        .set_local_position(Vec3::new(0.0, 1.0, 8.0))
        .unwrap();
    let camera = Component::camera(
        &camera_object,
        Projection::Perspective {
            fov: std::f32::consts::FRAC_PI_2,
            aspect_ratio: 16.0 / 9.0,
        },
        0.1,
        200.0,
    )
    .unwrap();
    camera_object.add_component(&camera).unwrap();
    let controller = Component::camera_controller(&camera_object, 6.0, 120.0).unwrap();
    camera_object.add_component(&controller).unwrap();

    let (mut sun_node, mut sun_object) = attach_entity(&scene, "sun");
    sun_node.set_local_position(Vec3::new(1.0, 0.0, 0.0)).unwrap();
    let sun_renderer =
        Component::mesh_renderer(&sun_object, Rc::clone(&quad), Rc::clone(&shader), &camera, true)
            .unwrap();
    sun_object.add_component(&sun_renderer).unwrap();
    let spin = Component::test_rotation(&sun_object, Vec3::y(), 30.0).unwrap();
    sun_object.add_component(&spin).unwrap();

    let mut planet_node = Transform::new();
    let mut planet_object = GameObject::new("planet");
    planet_node.attach_game_object(&planet_object).unwrap();
    sun_node.add_child(&planet_node).unwrap();
    planet_node
        .set_local_position(Vec3::new(0.0, 1.0, 0.0))
        .unwrap();
    let planet_renderer =
        Component::mesh_renderer(&planet_object, Rc::clone(&quad), Rc::clone(&shader), &camera, true)
            .unwrap();
    planet_object.add_component(&planet_renderer).unwrap();
    let drift = Component::test_movement(&planet_object, Vec3::new(0.1, 0.0, 0.0)).unwrap();
    planet_object.add_component(&drift).unwrap();

    let (_skybox_node, mut skybox_object) = attach_entity(&scene, "skybox");
    let follow = Component::skybox_follow_camera(&skybox_object, &camera_node).unwrap();
    skybox_object.add_component(&follow).unwrap();
    let skybox_renderer =
        Component::mesh_renderer(&skybox_object, quad, shader, &camera, true).unwrap();
    skybox_object.add_component(&skybox_renderer).unwrap();

    let (_marker_node, _marker_object) = attach_entity(&scene, "marker");

    scene
}

#[test]
fn test_full_scene_survives_a_round_trip() {
    let root = scratch_root("full");
    let scene = build_scene(&root);
    let document = root.join("scene.json");
    scene.save(&document).unwrap();

    let loaded = Scene::load(&document, &root).unwrap();
    assert_eq!(loaded.transform_count(), scene.transform_count());
    assert_eq!(loaded.component_count(), scene.component_count());

    // Uids and local values survive.
    let sun = scene.root().children()[1].clone();
    let loaded_sun = loaded.find_transform(sun.uid()).unwrap();
    assert!((loaded_sun.local_position() - sun.local_position()).norm() < EPSILON);
    assert!((loaded_sun.local_scale() - sun.local_scale()).norm() < EPSILON);

    // The planet sits at sun local + its own local offset in world space.
    let planet = loaded_sun.children()[0].clone();
    let world = planet.world_position();
    assert!((world - Vec3::new(1.0, 1.0, 0.0)).norm() < EPSILON);

    // The reloaded scene draws: every renderer is in front of the camera.
    let mut reloaded = loaded;
    let mut device = NullDevice::new();
    reloaded.initialize(&mut device, &root).unwrap();
    reloaded
        .update(&InputState::new(), &mut device, 0.016)
        .unwrap();
    assert_eq!(device.stats().draw_calls, 3);
}

#[test]
fn test_component_order_and_tags_survive() {
    let root = scratch_root("order");
    let scene = build_scene(&root);
    let document = root.join("scene.json");
    scene.save(&document).unwrap();

    let loaded = Scene::load(&document, &root).unwrap();
    let camera_object = loaded.root().children()[0].game_object().unwrap();
    let tags: Vec<&str> = camera_object
        .components()
        .iter()
        .map(Component::tag)
        .collect();
    assert_eq!(tags, ["camera", "camera controller"]);

    let skybox_object = loaded.root().children()[2].game_object().unwrap();
    let tags: Vec<&str> = skybox_object
        .components()
        .iter()
        .map(Component::tag)
        .collect();
    assert_eq!(tags, ["skybox follow camera", "mesh renderer"]);
}

#[test]
fn test_bare_object_omits_components_and_loads_empty() {
    let root = scratch_root("bare");
    let scene = build_scene(&root);
    let document = root.join("scene.json");
    scene.save(&document).unwrap();

    let value: Value = serde_json::from_str(&fs::read_to_string(&document).unwrap()).unwrap();
    let marker = &value["children"][3]["game_object"];
    assert_eq!(marker["name"], "marker");
    assert!(marker.get("components").is_none());

    let loaded = Scene::load(&document, &root).unwrap();
    let marker_object = loaded.root().children()[3].game_object().unwrap();
    assert_eq!(marker_object.component_count(), 0);
}

#[test]
fn test_dangling_camera_reference_fails_naming_the_uid() {
    let root = scratch_root("dangling");
    let scene = build_scene(&root);
    let document = root.join("scene.json");
    scene.save(&document).unwrap();

    let mut value: Value = serde_json::from_str(&fs::read_to_string(&document).unwrap()).unwrap();
    value["children"][1]["game_object"]["components"][0]["mesh renderer"]["camera"] =
        Value::from(999_999);
    fs::write(&document, serde_json::to_string_pretty(&value).unwrap()).unwrap();

    let err = Scene::load(&document, &root).unwrap_err();
    assert!(matches!(
        err,
        SceneError::UnresolvedCamera { uid: 999_999 }
    ));
}

#[test]
fn test_loaded_uids_never_collide_with_fresh_ones() {
    let root = scratch_root("uids");
    let scene = build_scene(&root);
    let document = root.join("scene.json");
    scene.save(&document).unwrap();
    let loaded = Scene::load(&document, &root).unwrap();

    let mut loaded_uids = Vec::new();
    collect_uids(loaded.root(), &mut loaded_uids);
    let fresh = Transform::new();
    assert!(!loaded_uids.contains(&fresh.uid()));
}

fn collect_uids(transform: &Transform, out: &mut Vec<Uid>) {
    out.push(transform.uid());
    for child in transform.children() {
        collect_uids(&child, out);
    }
}
