//! Keyframe sampling, playback state and bone set baking

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::handle::AssetHandle;
use crate::skeleton::Skeleton;

/// Tick rate assumed for clips that do not declare one
const DEFAULT_TICKS_PER_SECOND: f64 = 25.0;

pub trait Interpolate: Copy {
    fn interpolate(self, other: Self, t: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

impl Interpolate for Quat {
    fn interpolate(self, other: Self, t: f32) -> Self {
        self.slerp(other, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Time in ticks
    pub time: f64,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

/// Sample keys sorted by time.
///
/// Times before the first key or after the last clamp to that key. A span
/// of zero length resolves to its earlier key. `None` when there are no keys.
pub fn sample_keys<T: Interpolate>(keys: &[Keyframe<T>], time: f64) -> Option<T> {
    let first = keys.first()?;
    let Some(next) = keys.iter().position(|k| k.time >= time) else {
        return keys.last().map(|k| k.value);
    };
    if next == 0 {
        return Some(first.value);
    }

    let prev = &keys[next - 1];
    let next = &keys[next];
    let span = next.time - prev.time;
    let t = if span > 0.0 {
        ((time - prev.time) / span) as f32
    } else {
        0.0
    };
    Some(prev.value.interpolate(next.value, t))
}

/// Keys for one bone, matched by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Channel {
    pub bone_name: String,
    pub position_keys: Vec<Keyframe<Vec3>>,
    pub rotation_keys: Vec<Keyframe<Quat>>,
    pub scale_keys: Vec<Keyframe<Vec3>>,
}

impl Channel {
    pub fn new(bone_name: impl Into<String>) -> Self {
        Self {
            bone_name: bone_name.into(),
            ..Default::default()
        }
    }

    /// Local transform at `time` ticks. Missing tracks fall back to
    /// identity components.
    pub fn local_pose(&self, time: f64) -> Mat4 {
        let position = sample_keys(&self.position_keys, time).unwrap_or(Vec3::ZERO);
        let rotation = sample_keys(&self.rotation_keys, time).unwrap_or(Quat::IDENTITY);
        let scale = sample_keys(&self.scale_keys, time).unwrap_or(Vec3::ONE);
        Mat4::from_scale_rotation_translation(scale, rotation, position)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    pub duration_in_ticks: f64,
    pub ticks_per_second: f64,
    pub channels: Vec<Channel>,
}

impl Animation {
    pub fn ticks_per_second(&self) -> f64 {
        if self.ticks_per_second > 0.0 {
            self.ticks_per_second
        } else {
            DEFAULT_TICKS_PER_SECOND
        }
    }

    pub fn duration_seconds(&self) -> f32 {
        (self.duration_in_ticks / self.ticks_per_second()) as f32
    }

    pub fn channel(&self, bone_name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.bone_name == bone_name)
    }

    /// Local pose of every bone at `time` ticks; bones without a channel
    /// keep their rest pose.
    pub fn local_poses(&self, skeleton: &Skeleton, time: f64) -> Vec<Mat4> {
        skeleton
            .bones()
            .iter()
            .map(|bone| {
                self.channel(&bone.name)
                    .map(|c| c.local_pose(time))
                    .unwrap_or(bone.local_bind)
            })
            .collect()
    }
}

/// Playback state of one animated instance
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    pub animation: AssetHandle<Animation>,
    /// Seconds into the clip
    pub current_time: f32,
    pub speed: f32,
    pub looping: bool,
    pub playing: bool,
}

impl AnimationPlayer {
    pub fn new(animation: AssetHandle<Animation>) -> Self {
        Self {
            animation,
            current_time: 0.0,
            speed: 1.0,
            looping: true,
            playing: true,
        }
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Advance by `delta` seconds. Looping clips wrap; others clamp at the
    /// end and stop playing.
    pub fn advance(&mut self, delta: f32, animation: &Animation) {
        if !self.playing {
            return;
        }
        let duration = animation.duration_seconds();
        if duration <= 0.0 {
            self.current_time = 0.0;
            return;
        }

        self.current_time += delta * self.speed;
        if self.looping {
            self.current_time = self.current_time.rem_euclid(duration);
        } else if self.current_time >= duration {
            self.current_time = duration;
            self.playing = false;
        } else if self.current_time < 0.0 {
            self.current_time = 0.0;
            self.playing = false;
        }
    }

    pub fn time_in_ticks(&self, animation: &Animation) -> f64 {
        self.current_time as f64 * animation.ticks_per_second()
    }
}

/// Final skinning matrices for one instance: `model * global * inverse_bind`
/// per bone. Without an animation the rest pose is used, which yields `model`
/// for every bone.
pub fn bake_bone_set(
    skeleton: &Skeleton,
    animation: Option<&Animation>,
    time_in_ticks: f64,
    model: Mat4,
) -> Vec<Mat4> {
    let locals = match animation {
        Some(animation) => animation.local_poses(skeleton, time_in_ticks),
        None => skeleton.bones().iter().map(|b| b.local_bind).collect(),
    };
    skeleton
        .global_poses(&locals)
        .iter()
        .zip(skeleton.bones())
        .map(|(global, bone)| model * *global * bone.inverse_bind)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn bend(bone: &str) -> Animation {
        let mut channel = Channel::new(bone);
        channel.position_keys = vec![Keyframe::new(0.0, Vec3::Y)];
        channel.rotation_keys = vec![
            Keyframe::new(0.0, Quat::IDENTITY),
            Keyframe::new(10.0, Quat::from_rotation_z(FRAC_PI_2)),
        ];
        Animation {
            name: "bend".into(),
            duration_in_ticks: 10.0,
            ticks_per_second: 10.0,
            channels: vec![channel],
        }
    }

    #[test]
    fn test_sampling_clamps_and_interpolates() {
        let keys = vec![
            Keyframe::new(1.0, Vec3::ZERO),
            Keyframe::new(3.0, Vec3::new(2.0, 0.0, 0.0)),
        ];
        assert_eq!(sample_keys(&keys, 0.0), Some(Vec3::ZERO));
        assert_eq!(sample_keys(&keys, 2.0), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(sample_keys(&keys, 9.0), Some(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(sample_keys::<Vec3>(&[], 1.0), None);

        let repeated = vec![
            Keyframe::new(1.0, Vec3::X),
            Keyframe::new(1.0, Vec3::Y),
            Keyframe::new(2.0, Vec3::Z),
        ];
        assert_eq!(sample_keys(&repeated, 1.0), Some(Vec3::X));
    }

    #[test]
    fn test_rotation_uses_slerp() {
        let keys = vec![
            Keyframe::new(0.0, Quat::IDENTITY),
            Keyframe::new(2.0, Quat::from_rotation_y(FRAC_PI_2)),
        ];
        let half = sample_keys(&keys, 1.0).unwrap();
        assert!(half.abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2 / 2.0), 1e-5));
        assert!((half.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_player_loops_or_stops() {
        let animation = bend("spine1");
        let handle = AssetHandle::new(1);

        let mut looping = AnimationPlayer::new(handle);
        looping.advance(1.25, &animation);
        assert!((looping.current_time - 0.25).abs() < 1e-5);
        assert!(looping.playing);
        assert!((looping.time_in_ticks(&animation) - 2.5).abs() < 1e-4);

        let mut once = AnimationPlayer::new(handle).with_looping(false);
        once.advance(1.25, &animation);
        assert_eq!(once.current_time, 1.0);
        assert!(!once.playing);
        once.advance(1.0, &animation);
        assert_eq!(once.current_time, 1.0);
    }

    #[test]
    fn test_bake_rest_pose_is_model_matrix() {
        let skeleton = Skeleton::chain("spine", 3, 0.5).unwrap();
        let model = Mat4::from_translation(Vec3::new(4.0, 0.0, 0.0));
        for bone in bake_bone_set(&skeleton, None, 0.0, model) {
            assert!(bone.abs_diff_eq(model, 1e-5));
        }
    }

    #[test]
    fn test_bake_bends_children() {
        let skeleton = Skeleton::chain("spine", 2, 1.0).unwrap();
        let animation = bend("spine1");
        let bones = bake_bone_set(&skeleton, Some(&animation), 10.0, Mat4::IDENTITY);

        // Root untouched.
        assert!(bones[0].abs_diff_eq(Mat4::IDENTITY, 1e-5));
        // A point one unit above the joint swings to -X around it.
        let tip = bones[1].transform_point3(Vec3::new(0.0, 2.0, 0.0));
        assert!(tip.abs_diff_eq(Vec3::new(-1.0, 1.0, 0.0), 1e-5), "{tip:?}");
    }
}
