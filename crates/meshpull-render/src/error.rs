/// Errors raised while the host prepares render buffers.
///
/// Device-side stages never fail; see the fallbacks in `resolve`,
/// `skinning` and `texture`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("bone set of {count} bones exceeds the limit of {max}")]
    BoneSetTooLarge { count: usize, max: usize },

    #[error("texture layer {layer} is {actual} bytes, expected {expected}")]
    TextureLayerSize {
        layer: usize,
        expected: usize,
        actual: usize,
    },

    #[error("texture array dimensions must be non-zero (got {width}x{height})")]
    EmptyTexture { width: u32, height: u32 },
}
