//! Scene document encode and decode
//!
//! Saving walks the tree and emits [`TransformRecord`]s; loading rebuilds
//! the tree from records, observing every persisted uid so fresh ids never
//! collide, then runs the late-binding pass so recorded cross-references
//! point at live entities again. Meshes are imported once per distinct
//! path and shared between the renderers that use them.

use crate::assets::{MeshImporter, ObjImporter};
use crate::foundation::math::{Quaternion, Unit};
use crate::foundation::time::Stopwatch;
use crate::io::records::{
    CameraControllerRecord, CameraRecord, ComponentRecord, GameObjectRecord, MeshRendererRecord,
    SkyboxFollowCameraRecord, TestMovementRecord, TestRotationRecord, TransformRecord,
};
use crate::render::{Mesh, Shader};
use crate::scene::component::{Component, ComponentKind, WeakComponent};
use crate::scene::components::{
    Camera, CameraController, MeshRenderer, SkyboxFollowCamera, TestMovement, TestRotation,
};
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::game_object::GameObject;
use crate::scene::scene_graph::Scene;
use crate::scene::transform::{Transform, WeakTransform};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Write `scene` as a pretty-printed document at `path`
pub fn save_scene(scene: &Scene, path: &Path) -> SceneResult<()> {
    let watch = Stopwatch::start_new();
    let record = transform_to_record(scene.root())?;
    let text = serde_json::to_string_pretty(&record)?;
    fs::write(path, text).map_err(|source| SceneError::WriteScene {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "saved scene to {} in {:.1}ms",
        path.display(),
        watch.elapsed_millis()
    );
    Ok(())
}

/// Read the document at `path` and rebuild a live scene from it
///
/// Mesh and shader paths inside the document resolve against
/// `asset_root`. The returned scene is fully late-bound.
pub fn load_scene(path: &Path, asset_root: &Path) -> SceneResult<Scene> {
    let watch = Stopwatch::start_new();
    let text = fs::read_to_string(path).map_err(|source| SceneError::ReadScene {
        path: path.to_path_buf(),
        source,
    })?;
    let record: TransformRecord =
        serde_json::from_str(&text).map_err(|source| SceneError::ParseScene {
            path: path.to_path_buf(),
            source,
        })?;

    let importer = ObjImporter::new(asset_root);
    let mut meshes = HashMap::new();
    let root = transform_from_record(&record, &importer, &mut meshes)?;
    let scene = Scene::from_root(root);
    scene.late_bind()?;

    log::info!(
        "loaded scene from {} ({} transforms, {} components) in {:.1}ms",
        path.display(),
        scene.transform_count(),
        scene.component_count(),
        watch.elapsed_millis()
    );
    Ok(scene)
}

fn transform_to_record(transform: &Transform) -> SceneResult<TransformRecord> {
    let rotation = transform.local_rotation().coords;
    let children = transform
        .children()
        .iter()
        .map(transform_to_record)
        .collect::<SceneResult<Vec<_>>>()?;
    let game_object = transform
        .game_object()
        .map(|game_object| game_object_to_record(&game_object))
        .transpose()?;
    Ok(TransformRecord {
        uid: transform.uid(),
        local_position: transform.local_position(),
        local_rotation: [rotation.w, rotation.x, rotation.y, rotation.z],
        local_scale: transform.local_scale(),
        children,
        game_object,
    })
}

fn game_object_to_record(game_object: &GameObject) -> SceneResult<GameObjectRecord> {
    let components = game_object
        .components()
        .iter()
        .map(component_to_record)
        .collect::<SceneResult<Vec<_>>>()?;
    Ok(GameObjectRecord {
        uid: game_object.uid(),
        name: game_object.name(),
        components,
    })
}

fn component_to_record(component: &Component) -> SceneResult<ComponentRecord> {
    let uid = component.uid();
    component.with_kind(|kind| match kind {
        ComponentKind::Camera(camera) => Ok(ComponentRecord::Camera(CameraRecord {
            uid,
            projection: camera.projection,
            znear: camera.znear,
            zfar: camera.zfar,
        })),
        ComponentKind::CameraController(controller) => {
            Ok(ComponentRecord::CameraController(CameraControllerRecord {
                uid,
                move_speed: controller.move_speed,
                look_speed: controller.look_speed,
            }))
        }
        ComponentKind::MeshRenderer(renderer) => {
            let mesh = renderer
                .mesh
                .source()
                .ok_or(SceneError::MeshWithoutSource)?
                .to_path_buf();
            Ok(ComponentRecord::MeshRenderer(MeshRendererRecord {
                uid,
                mesh,
                shader: renderer.shader.borrow().desc().clone(),
                camera: renderer.camera_uid,
                culling: renderer.culling_enabled,
            }))
        }
        ComponentKind::SkyboxFollowCamera(follow) => {
            Ok(ComponentRecord::SkyboxFollowCamera(SkyboxFollowCameraRecord {
                uid,
                target: follow.target_uid,
            }))
        }
        ComponentKind::TestMovement(mover) => Ok(ComponentRecord::TestMovement(TestMovementRecord {
            uid,
            velocity: mover.velocity,
        })),
        ComponentKind::TestRotation(spinner) => {
            Ok(ComponentRecord::TestRotation(TestRotationRecord {
                uid,
                axis: spinner.axis,
                degrees_per_second: spinner.degrees_per_second,
            }))
        }
    })
}

fn transform_from_record(
    record: &TransformRecord,
    importer: &dyn MeshImporter,
    meshes: &mut HashMap<PathBuf, Rc<Mesh>>,
) -> SceneResult<Transform> {
    let [w, x, y, z] = record.local_rotation;
    let quaternion = Quaternion::new(w, x, y, z);
    if !quaternion.norm().is_finite() {
        return Err(SceneError::DegenerateRotation { uid: record.uid });
    }
    let rotation = Unit::try_new(quaternion, 1e-6)
        .ok_or(SceneError::DegenerateRotation { uid: record.uid })?;
    let mut transform =
        Transform::restore(record.uid, record.local_position, rotation, record.local_scale);

    if let Some(go_record) = &record.game_object {
        let mut game_object = GameObject::restore(go_record.uid, &go_record.name);
        transform.attach_game_object(&game_object)?;
        for component_record in &go_record.components {
            let component = component_from_record(component_record, &game_object, importer, meshes)?;
            game_object.add_component(&component)?;
        }
    }

    for child_record in &record.children {
        let child = transform_from_record(child_record, importer, meshes)?;
        transform.add_child(&child)?;
    }
    Ok(transform)
}

fn component_from_record(
    record: &ComponentRecord,
    owner: &GameObject,
    importer: &dyn MeshImporter,
    meshes: &mut HashMap<PathBuf, Rc<Mesh>>,
) -> SceneResult<Component> {
    match record {
        ComponentRecord::Camera(r) => Component::restore(
            r.uid,
            owner,
            ComponentKind::Camera(Camera::new(r.projection, r.znear, r.zfar)),
        ),
        ComponentRecord::CameraController(r) => Component::restore(
            r.uid,
            owner,
            ComponentKind::CameraController(CameraController::new(r.move_speed, r.look_speed)),
        ),
        ComponentRecord::MeshRenderer(r) => {
            let mesh = match meshes.get(&r.mesh) {
                Some(mesh) => Rc::clone(mesh),
                None => {
                    let mesh = Rc::new(importer.import(&r.mesh)?);
                    meshes.insert(r.mesh.clone(), Rc::clone(&mesh));
                    mesh
                }
            };
            let shader = Rc::new(RefCell::new(Shader::new(r.shader.clone())));
            let state =
                MeshRenderer::new(mesh, shader, WeakComponent::new(), r.camera, r.culling);
            Component::restore(r.uid, owner, ComponentKind::MeshRenderer(state))
        }
        ComponentRecord::SkyboxFollowCamera(r) => Component::restore(
            r.uid,
            owner,
            ComponentKind::SkyboxFollowCamera(SkyboxFollowCamera::new(
                WeakTransform::new(),
                r.target,
            )),
        ),
        ComponentRecord::TestMovement(r) => Component::restore(
            r.uid,
            owner,
            ComponentKind::TestMovement(TestMovement::new(r.velocity)),
        ),
        ComponentRecord::TestRotation(r) => Component::restore(
            r.uid,
            owner,
            ComponentKind::TestRotation(TestRotation::new(r.axis, r.degrees_per_second)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::components::Projection;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn scratch_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("diorama-codec-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("basic.vert"), "void main() {}").unwrap();
        fs::write(dir.join("basic.frag"), "void main() {}").unwrap();
        fs::write(
            dir.join("tri.obj"),
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();
        dir
    }

    fn attach_entity(scene: &Scene, name: &str) -> (Transform, GameObject) {
        let mut transform = Transform::new();
        let game_object = GameObject::new(name);
        transform.attach_game_object(&game_object).unwrap();
        scene.root().clone().add_child(&transform).unwrap();
        (transform, game_object)
    }

    #[test]
    fn test_rotation_is_stored_scalar_first() {
        let scene = Scene::new();
        let (mut transform, _go) = attach_entity(&scene, "turned");
        let quarter = Unit::new_normalize(Quaternion::new(
            std::f32::consts::FRAC_PI_4.cos(),
            0.0,
            std::f32::consts::FRAC_PI_4.sin(),
            0.0,
        ));
        transform.set_local_rotation(quarter).unwrap();

        let record = transform_to_record(scene.root()).unwrap();
        let child = &record.children[0];
        assert_relative_eq!(
            child.local_rotation[0],
            std::f32::consts::FRAC_PI_4.cos(),
            epsilon = EPSILON
        );
        assert_relative_eq!(
            child.local_rotation[2],
            std::f32::consts::FRAC_PI_4.sin(),
            epsilon = EPSILON
        );
        assert_relative_eq!(child.local_rotation[1], 0.0, epsilon = EPSILON);
        assert_relative_eq!(child.local_rotation[3], 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_document_omits_empty_collections() {
        let scene = Scene::new();
        let _entity = attach_entity(&scene, "bare");

        let record = transform_to_record(scene.root()).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        let child = &value["children"][0];
        assert!(child.get("children").is_none());
        assert!(child["game_object"].get("components").is_none());
    }

    #[test]
    fn test_pathless_mesh_refuses_to_serialize() {
        let scene = Scene::new();
        let (_ct, mut camera_owner) = attach_entity(&scene, "camera");
        let camera = Component::camera(
            &camera_owner,
            Projection::Perspective {
                fov: 1.0,
                aspect_ratio: 1.0,
            },
            0.1,
            100.0,
        )
        .unwrap();
        camera_owner.add_component(&camera).unwrap();

        let (_t, mut owner) = attach_entity(&scene, "prop");
        let shader = Rc::new(RefCell::new(Shader::new(
            crate::render::ShaderDesc::FragmentNormal {
                vertex: PathBuf::from("basic.vert"),
                fragment: PathBuf::from("basic.frag"),
            },
        )));
        let renderer = Component::mesh_renderer(
            &owner,
            Rc::new(Mesh::cube()),
            shader,
            &camera,
            true,
        )
        .unwrap();
        owner.add_component(&renderer).unwrap();

        let err = transform_to_record(scene.root()).unwrap_err();
        assert!(matches!(err, SceneError::MeshWithoutSource));
    }

    #[test]
    fn test_loaded_rotation_is_renormalized() {
        let root = scratch_root("norm");
        let record = TransformRecord {
            uid: 800,
            local_position: Vec3::zeros(),
            // Deliberately off unit length; loading must normalize.
            local_rotation: [2.0, 0.0, 0.0, 0.0],
            local_scale: Vec3::new(1.0, 1.0, 1.0),
            children: Vec::new(),
            game_object: None,
        };
        let importer = ObjImporter::new(&root);
        let transform =
            transform_from_record(&record, &importer, &mut HashMap::new()).unwrap();
        let q = transform.local_rotation().coords;
        assert_relative_eq!(q.w, 1.0, epsilon = EPSILON);
        assert_relative_eq!(q.norm(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_degenerate_rotation_fails_the_load() {
        let root = scratch_root("degenerate");
        let importer = ObjImporter::new(&root);
        let record = |uid, local_rotation| TransformRecord {
            uid,
            local_position: Vec3::zeros(),
            local_rotation,
            local_scale: Vec3::new(1.0, 1.0, 1.0),
            children: Vec::new(),
            game_object: None,
        };

        let err = transform_from_record(
            &record(801, [0.0, 0.0, 0.0, 0.0]),
            &importer,
            &mut HashMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::DegenerateRotation { uid: 801 }));

        let err = transform_from_record(
            &record(802, [f32::NAN, 0.0, 0.0, 0.0]),
            &importer,
            &mut HashMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::DegenerateRotation { uid: 802 }));

        let err = transform_from_record(
            &record(803, [f32::INFINITY, 0.0, 0.0, 0.0]),
            &importer,
            &mut HashMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::DegenerateRotation { uid: 803 }));
    }

    #[test]
    fn test_missing_camera_reference_fails_the_load() {
        let root = scratch_root("badref");
        let document = r#"{
            "uid": 900,
            "local_position": [0.0, 0.0, 0.0],
            "local_rotation": [1.0, 0.0, 0.0, 0.0],
            "local_scale": [1.0, 1.0, 1.0],
            "children": [
                {
                    "uid": 901,
                    "local_position": [0.0, 0.0, 0.0],
                    "local_rotation": [1.0, 0.0, 0.0, 0.0],
                    "local_scale": [1.0, 1.0, 1.0],
                    "game_object": {
                        "uid": 910,
                        "name": "prop",
                        "components": [
                            { "mesh renderer": {
                                "uid": 920,
                                "mesh": "tri.obj",
                                "shader": { "fragment normal shader": {
                                    "vertex": "basic.vert",
                                    "fragment": "basic.frag"
                                } },
                                "camera": 555
                            } }
                        ]
                    }
                }
            ]
        }"#;
        let path = root.join("badref.json");
        fs::write(&path, document).unwrap();

        let err = load_scene(&path, &root).unwrap_err();
        assert!(matches!(err, SceneError::UnresolvedCamera { uid: 555 }));
    }

    #[test]
    fn test_unknown_component_tag_fails_the_load() {
        let root = scratch_root("badtag");
        let document = r#"{
            "uid": 930,
            "local_position": [0.0, 0.0, 0.0],
            "local_rotation": [1.0, 0.0, 0.0, 0.0],
            "local_scale": [1.0, 1.0, 1.0],
            "game_object": {
                "uid": 931,
                "name": "mystery",
                "components": [ { "warp drive": { "uid": 932 } } ]
            }
        }"#;
        let path = root.join("badtag.json");
        fs::write(&path, document).unwrap();

        let err = load_scene(&path, &root).unwrap_err();
        assert!(matches!(err, SceneError::ParseScene { .. }));
    }
}
