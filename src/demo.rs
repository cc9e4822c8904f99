//! Headless demo: builds a scene, runs the vertex passes and picks from the
//! resulting ID buffer every frame.

use std::f32::consts::{FRAC_PI_4, TAU};

use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec3};
use meshpull_assets::{
    bake_bone_set, build_instanced_batch, Animation, AnimationPlayer, AnimatedScene,
    AnimatedSceneBuilder, Channel, GeometryRegistry, InstanceRequest, InstancedBatch, Keyframe,
    Skeleton, SkinnedMesh, SkinnedModel, StaticMesh, StaticScene, StaticSceneBuilder,
};
use meshpull_core::{Color, FrameClock, Transform};
use meshpull_picking::{dedup_ids, IdBuffer, PickingSystem};
use meshpull_render::{
    dispatch_vertices_into, shade_fragment, AnimatedMeshletPass, Camera, CameraUniform,
    DispatchSize, FragmentInput, Mesh, MeshletPass, Sampler, TextureArray, VertexOutput, Viewport,
};
use tracing::{debug, info};

use crate::settings::DemoSettings;

const TEXTURE_SIZE: u32 = 8;
const CAPSULE_BONES: usize = 3;
const CAPSULE_HEIGHT: f32 = 2.0;

/// Per-frame numbers worth logging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub live_vertices: usize,
    pub culled_vertices: usize,
    /// Vertices whose texture is not resident yet
    pub magenta_vertices: usize,
    pub covered_pixels: usize,
    pub picked: Option<Vec<u32>>,
}

/// Which draw family a picked id belongs to.
///
/// Ids are 1-based: static transforms first, then animated instances, then
/// instanced spheres. Zero stays background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickedObject {
    Static(u32),
    Animated(u32),
    Instanced(u32),
}

struct AnimatedActor {
    player: AnimationPlayer,
    transform: Mat4,
}

pub struct Demo {
    settings: DemoSettings,
    registry: GeometryRegistry,
    static_scene: StaticScene,
    animated_scene: AnimatedScene,
    batch: InstancedBatch,
    actors: Vec<AnimatedActor>,
    camera: CameraUniform,
    viewport: Viewport,
    clock: FrameClock,
    textures: TextureArray,
    sampler: Sampler,
    picking: PickingSystem,
    ids: IdBuffer,
    static_out: Vec<VertexOutput>,
    animated_out: Vec<VertexOutput>,
    instanced_out: Vec<VertexOutput>,
}

fn checker(a: [u8; 4], b: [u8; 4]) -> Vec<u8> {
    (0..TEXTURE_SIZE * TEXTURE_SIZE)
        .flat_map(|i| {
            let (x, y) = (i % TEXTURE_SIZE, i / TEXTURE_SIZE);
            if (x + y) % 2 == 0 {
                a
            } else {
                b
            }
        })
        .collect()
}

/// Two bones above the root bend back and forth around Z.
fn sway_animation() -> Animation {
    let sway = |bone: usize, phase: f64| {
        let mut channel = Channel::new(format!("spine{bone}"));
        let offset = if bone == 0 { 0.0 } else { CAPSULE_HEIGHT / CAPSULE_BONES as f32 };
        channel.position_keys = vec![Keyframe::new(0.0, Vec3::Y * offset)];
        channel.rotation_keys = (0..=4)
            .map(|k| {
                let t = k as f64 * 6.0;
                let angle = (FRAC_PI_4 * 0.5) * ((k as f64 * 0.5 + phase) * std::f64::consts::PI).sin() as f32;
                Keyframe::new(t, Quat::from_rotation_z(angle))
            })
            .collect();
        channel
    };
    Animation {
        name: "sway".into(),
        duration_in_ticks: 24.0,
        ticks_per_second: 24.0,
        channels: vec![sway(1, 0.0), sway(2, 0.5)],
    }
}

impl Demo {
    pub fn new(settings: DemoSettings) -> Result<Self> {
        let scene = &settings.scene;
        let viewport = Viewport::new(scene.width.max(1), scene.height.max(1));

        let mut textures = TextureArray::new(TEXTURE_SIZE, TEXTURE_SIZE)?;
        let mut registry = GeometryRegistry::new();
        let tiles = registry.add_texture("tiles");
        let grass = registry.add_texture("grass");
        // Never uploaded, so everything using it shades magenta.
        let marble = registry.add_texture("marble");
        let layer = textures.push_layer(&checker([230, 230, 230, 255], [40, 40, 40, 255]))?;
        registry.set_texture_layer(tiles, layer)?;
        let layer = textures.push_solid([60, 160, 70, 255]);
        registry.set_texture_layer(grass, layer)?;

        let plane = registry.add_mesh(StaticMesh::from_mesh("plane", Mesh::plane(3.0, 6)))?;
        let sphere = registry.add_mesh(StaticMesh::from_mesh("sphere", Mesh::sphere(1.0, 16, 12)))?;
        let capsule_mesh = Mesh::capsule(CAPSULE_HEIGHT, 0.4, 12, 8);
        let capsule = registry.add_mesh(StaticMesh::from_mesh("capsule", capsule_mesh.clone()))?;

        let segment = CAPSULE_HEIGHT / CAPSULE_BONES as f32;
        let skeleton = Skeleton::chain("spine", CAPSULE_BONES, segment)?;
        // Shift so the capsule stands on the root joint.
        let standing = Mesh {
            vertices: capsule_mesh
                .vertices
                .iter()
                .map(|v| {
                    let mut v = *v;
                    v.position[1] += CAPSULE_HEIGHT * 0.5;
                    v
                })
                .collect(),
            indices: capsule_mesh.indices.clone(),
        };
        let skinned = SkinnedMesh::rigid("skinned_capsule", &standing, |v| {
            ((v.position().y / segment) as u32).min(CAPSULE_BONES as u32 - 1)
        });
        let skinned = registry.add_skinned_model(SkinnedModel::new(skinned, skeleton)?)?;
        let sway = registry.add_animation(sway_animation());

        let mut builder = StaticSceneBuilder::new(&registry, settings.meshlets)?;
        for row in 0..scene.static_rows {
            let ids = builder.add_row(&[(plane, Some(tiles)), (sphere, Some(grass)), (capsule, Some(marble))])?;
            debug!("Static row {} -> transforms {:?}", row, ids);
        }
        // Rows overlap until pushed back along -Z.
        let mut static_scene = builder.finish();
        for (i, transform) in static_scene.transforms.iter_mut().enumerate() {
            let row = (i / 3) as f32;
            *transform = Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0 * row)) * *transform;
        }

        let mut builder = AnimatedSceneBuilder::new(&registry, settings.meshlets)?;
        let mut actors = Vec::new();
        for i in 0..scene.animated_instances {
            let transform = Transform::from_position(Vec3::new(2.0 * i as f32, 0.0, 3.0)).matrix();
            builder.add_instance(skinned, transform, Some(grass))?;
            let mut player = AnimationPlayer::new(sway);
            player.current_time = i as f32 * 0.2;
            actors.push(AnimatedActor { player, transform });
        }
        let animated_scene = builder.finish();

        let requests: Vec<InstanceRequest> = (0..scene.instanced_spheres)
            .map(|i| {
                let angle = TAU * i as f32 / scene.instanced_spheres as f32;
                let placement = Transform {
                    position: Vec3::new(4.0 + 6.0 * angle.cos(), 3.0, -2.0 + 2.0 * angle.sin()),
                    rotation: Quat::from_rotation_y(angle),
                    scale: Vec3::splat(0.3),
                };
                InstanceRequest {
                    mesh: sphere,
                    model: placement.matrix(),
                    texture: Some(tiles),
                }
            })
            .collect();
        let batch = build_instanced_batch(&registry, &requests);

        let camera = Camera::look_at(Vec3::new(4.0, 6.0, 14.0), Vec3::new(4.0, 0.0, 0.0), scene.fov, viewport.aspect());
        let clock = FrameClock::new(scene.time.clone());
        let ids = IdBuffer::new(viewport.width, viewport.height);

        info!(
            "Demo scene ready: {} static draws, {} animated draws, {} instanced vertices",
            static_scene.draws.len(),
            animated_scene.draws.len(),
            batch.total_vertices()
        );

        Ok(Self {
            settings,
            registry,
            static_scene,
            animated_scene,
            batch,
            actors,
            camera: camera.uniform(),
            viewport,
            clock,
            textures,
            sampler: Sampler::linear_repeat(),
            picking: PickingSystem::new(),
            ids,
            static_out: Vec::new(),
            animated_out: Vec::new(),
            instanced_out: Vec::new(),
        })
    }

    /// Map a picked id back to the object that wrote it.
    pub fn classify(&self, id: u32) -> Option<PickedObject> {
        let statics = self.static_scene.transforms.len() as u32;
        let animated = self.animated_scene.transforms.len() as u32;
        let instanced = self.batch.instances.len() as u32;
        match id.checked_sub(1)? {
            i if i < statics => Some(PickedObject::Static(i)),
            i if i < statics + animated => Some(PickedObject::Animated(i - statics)),
            i if i < statics + animated + instanced => Some(PickedObject::Instanced(i - statics - animated)),
            _ => None,
        }
    }

    fn animate(&mut self) -> Result<()> {
        for (actor, instance) in self.actors.iter_mut().zip(&self.animated_scene.instances) {
            let animation = self
                .registry
                .get_animation(actor.player.animation)
                .context("animation missing from registry")?;
            let model = self
                .registry
                .get_skinned_model(instance.model)
                .context("skinned model missing from registry")?;

            actor.player.advance(self.clock.delta_time, animation);
            let bones = bake_bone_set(
                &model.skeleton,
                Some(animation),
                actor.player.time_in_ticks(animation),
                actor.transform,
            );
            self.animated_scene.bones.write_set(instance.bone_set_id, &bones)?;
        }
        Ok(())
    }

    fn dispatch(&mut self) {
        let static_pass = MeshletPass {
            camera: &self.camera,
            geometry: &self.static_scene.geometry,
            draws: &self.static_scene.draws,
            transforms: &self.static_scene.transforms,
        };
        let size = DispatchSize::for_meshlets(
            self.static_scene.draws.len() as u32,
            self.static_scene.max_meshlet_triangles(),
        );
        dispatch_vertices_into(&static_pass, size, &mut self.static_out);

        let animated_pass = AnimatedMeshletPass {
            camera: &self.camera,
            bones: &self.animated_scene.bones,
            geometry: &self.animated_scene.geometry,
            draws: &self.animated_scene.draws,
        };
        let size = DispatchSize::for_meshlets(
            self.animated_scene.draws.len() as u32,
            self.animated_scene.max_meshlet_triangles(),
        );
        dispatch_vertices_into(&animated_pass, size, &mut self.animated_out);

        let size = DispatchSize::flat(self.batch.total_vertices());
        dispatch_vertices_into(&self.batch.pass(&self.camera), size, &mut self.instanced_out);
    }

    /// Stand-in for rasterisation: every visible vertex tags its pixel.
    fn write_ids(&mut self, stats: &mut FrameStats) {
        self.ids.clear();
        let statics = self.static_scene.transforms.len() as u32;
        let animated = self.animated_scene.transforms.len() as u32;
        let families = [
            (&self.static_out, 1),
            (&self.animated_out, 1 + statics),
            (&self.instanced_out, 1 + statics + animated),
        ];

        for (outputs, first_id) in families {
            for out in outputs.iter() {
                if out.is_culled() {
                    stats.culled_vertices += 1;
                    continue;
                }
                stats.live_vertices += 1;

                let color = shade_fragment(
                    FragmentInput {
                        uv: out.uv,
                        texture_id: out.texture_id,
                    },
                    &self.textures,
                    &self.sampler,
                );
                if color == Color::MAGENTA {
                    stats.magenta_vertices += 1;
                }

                if let Some([x, y]) = self.viewport.clip_to_pixel(out.clip_position) {
                    self.ids.store(x, y, first_id + out.transform_id);
                }
            }
        }
        stats.covered_pixels = self.ids.as_slice().iter().filter(|&&id| id != 0).count();
    }

    /// Advance one frame. Odd frames pick a point, even frames a box.
    pub fn run_frame(&mut self, delta: f32) -> Result<FrameStats> {
        self.clock.update(delta);
        self.animate()?;
        self.dispatch();

        let mut stats = FrameStats::default();
        self.write_ids(&mut stats);

        let picking = &self.settings.picking;
        if self.clock.frame_count % 2 == 1 {
            self.picking.request_point(picking.point[0], picking.point[1]);
        } else {
            self.picking.request_region(picking.region);
        }
        self.picking.process(&self.ids);
        stats.picked = self.picking.last_result().map(|ids| {
            if picking.dedup_region {
                dedup_ids(&ids)
            } else {
                ids
            }
        });

        if let Some(picked) = &stats.picked {
            let objects: Vec<_> = picked.iter().filter_map(|&id| self.classify(id)).collect();
            debug!("Picked objects: {:?}", objects);
        }
        Ok(stats)
    }

    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshpull_picking::PickRegion;

    fn small_settings() -> DemoSettings {
        let mut settings = DemoSettings::default();
        settings.scene.width = 160;
        settings.scene.height = 90;
        settings.scene.static_rows = 1;
        settings.scene.animated_instances = 2;
        settings.scene.instanced_spheres = 4;
        settings.picking.region = PickRegion::new(0, 0, 160, 90);
        settings.picking.point = [80, 45];
        settings
    }

    #[test]
    fn test_frames_produce_ids_and_picks() {
        let mut demo = Demo::new(small_settings()).unwrap();
        let first = demo.run_frame(1.0 / 30.0).unwrap();
        let second = demo.run_frame(1.0 / 30.0).unwrap();
        assert_eq!(demo.frame_count(), 2);

        assert!(first.live_vertices > 0);
        assert!(first.culled_vertices > 0);
        assert!(first.covered_pixels > 0);
        // The capsule row uses a texture that never became resident.
        assert!(first.magenta_vertices > 0);

        // Full-screen box on the second frame sees every covered id once.
        let picked = second.picked.unwrap();
        assert!(!picked.is_empty());
        assert!(picked.iter().all(|&id| demo.classify(id).is_some()));
    }

    #[test]
    fn test_classify_ranges() {
        let demo = Demo::new(small_settings()).unwrap();
        assert_eq!(demo.classify(0), None);
        assert_eq!(demo.classify(1), Some(PickedObject::Static(0)));
        assert_eq!(demo.classify(4), Some(PickedObject::Animated(0)));
        assert_eq!(demo.classify(6), Some(PickedObject::Instanced(0)));
        assert_eq!(demo.classify(10), None);
    }
}
