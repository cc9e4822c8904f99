//! Texture array binding (group 3) and the fragment fallback
//!
//! Fragments select a layer by their flat `texture_id`. Textures that are not
//! resident yet carry [`TEXTURE_NOT_LOADED`]; those fragments are shaded
//! magenta instead of sampling an undefined layer.

use glam::{Vec2, Vec4};
use meshpull_core::Color;

use crate::error::RenderError;

/// Texture id of a texture that has not finished loading
pub const TEXTURE_NOT_LOADED: u32 = 9999;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressMode {
    #[default]
    Repeat,
    ClampToEdge,
}

/// Sampler state (group 3, binding 1)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sampler {
    pub filter: FilterMode,
    pub address: AddressMode,
}

impl Sampler {
    pub fn linear_repeat() -> Self {
        Self {
            filter: FilterMode::Linear,
            address: AddressMode::Repeat,
        }
    }
}

/// Array of equally sized RGBA8 layers (group 3, binding 0)
#[derive(Debug, Clone)]
pub struct TextureArray {
    width: u32,
    height: u32,
    texels: Vec<[u8; 4]>,
    layer_count: u32,
}

impl TextureArray {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTexture { width, height });
        }
        Ok(Self {
            width,
            height,
            texels: Vec::new(),
            layer_count: 0,
        })
    }

    /// Append a layer of tightly packed RGBA8 bytes and return its index.
    pub fn push_layer(&mut self, rgba: &[u8]) -> Result<u32, RenderError> {
        let expected = (self.width * self.height * 4) as usize;
        if rgba.len() != expected {
            return Err(RenderError::TextureLayerSize {
                layer: self.layer_count as usize,
                expected,
                actual: rgba.len(),
            });
        }
        self.texels
            .extend(rgba.chunks_exact(4).map(|c| [c[0], c[1], c[2], c[3]]));
        self.layer_count += 1;
        Ok(self.layer_count - 1)
    }

    /// Append a layer filled with one color
    pub fn push_solid(&mut self, rgba: [u8; 4]) -> u32 {
        let texels = (self.width * self.height) as usize;
        self.texels.extend(std::iter::repeat(rgba).take(texels));
        self.layer_count += 1;
        self.layer_count - 1
    }

    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn texel(&self, layer: u32, x: i64, y: i64, address: AddressMode) -> Vec4 {
        let (w, h) = (self.width as i64, self.height as i64);
        let (x, y) = match address {
            AddressMode::Repeat => (x.rem_euclid(w), y.rem_euclid(h)),
            AddressMode::ClampToEdge => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
        };
        let index = layer as usize * (w * h) as usize + (y * w + x) as usize;
        Color::from_rgba8(self.texels[index]).to_vec4()
    }

    /// Sample `layer` at `uv`. Layer indices past the end are clamped to the
    /// last layer, matching how GPU array fetches behave.
    pub fn sample(&self, layer: u32, uv: Vec2, sampler: &Sampler) -> Color {
        if self.layer_count == 0 {
            return Color::MAGENTA;
        }
        let layer = layer.min(self.layer_count - 1);
        let texel_space = uv * Vec2::new(self.width as f32, self.height as f32);

        let rgba = match sampler.filter {
            FilterMode::Nearest => {
                let p = texel_space.floor();
                self.texel(layer, p.x as i64, p.y as i64, sampler.address)
            }
            FilterMode::Linear => {
                let p = texel_space - Vec2::splat(0.5);
                let base = p.floor();
                let f = p - base;
                let (x0, y0) = (base.x as i64, base.y as i64);
                let top = self
                    .texel(layer, x0, y0, sampler.address)
                    .lerp(self.texel(layer, x0 + 1, y0, sampler.address), f.x);
                let bottom = self
                    .texel(layer, x0, y0 + 1, sampler.address)
                    .lerp(self.texel(layer, x0 + 1, y0 + 1, sampler.address), f.x);
                top.lerp(bottom, f.y)
            }
        };
        Color::from_vec4(rgba)
    }
}

/// Interpolated fragment inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentInput {
    pub uv: Vec2,
    pub texture_id: u32,
}

/// Fragment stage: sentinel ids short-circuit to magenta, everything else
/// samples its layer.
pub fn shade_fragment(input: FragmentInput, textures: &TextureArray, sampler: &Sampler) -> Color {
    if input.texture_id >= TEXTURE_NOT_LOADED {
        return Color::MAGENTA;
    }
    textures.sample(input.texture_id, input.uv, sampler)
}
