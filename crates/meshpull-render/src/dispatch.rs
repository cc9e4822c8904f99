//! SIMT-style dispatch on the CPU.
//!
//! A draw of `instances x vertices_per_instance` invocations becomes one
//! indexed parallel iterator. Each invocation only reads shared buffers
//! through `&self` of the stage and writes its own output slot, so no
//! synchronisation is needed beyond what rayon provides.

use rayon::prelude::*;
use tracing::debug;

use crate::resolve::VertexOutput;

/// Built-in inputs of one vertex invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    /// Selects the draw record (one per meshlet instance)
    pub instance_index: u32,
    /// Position within the instance, including padding slots
    pub vertex_index: u32,
}

/// Shape of a vertex dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSize {
    pub instances: u32,
    pub vertices_per_instance: u32,
}

impl DispatchSize {
    pub fn new(instances: u32, vertices_per_instance: u32) -> Self {
        Self {
            instances,
            vertices_per_instance,
        }
    }

    /// Meshlet draws are issued in fixed-size groups of `max_triangles * 3`
    /// slots; meshlets with fewer triangles cull the tail.
    pub fn for_meshlets(instances: u32, max_triangles_per_meshlet: u32) -> Self {
        Self::new(instances, max_triangles_per_meshlet * 3)
    }

    /// A single instance covering a flattened vertex range
    pub fn flat(vertex_count: u32) -> Self {
        Self::new(1, vertex_count)
    }

    pub fn total(&self) -> usize {
        self.instances as usize * self.vertices_per_instance as usize
    }

    /// Built-ins for the invocation at flat `index`
    #[inline]
    pub fn invocation(&self, index: usize) -> Invocation {
        let per_instance = self.vertices_per_instance.max(1) as usize;
        Invocation {
            instance_index: (index / per_instance) as u32,
            vertex_index: (index % per_instance) as u32,
        }
    }
}

/// A vertex program: pure function of its invocation and bound buffers
pub trait VertexStage: Sync {
    fn invoke(&self, invocation: Invocation) -> VertexOutput;
}

/// Run every invocation of `size` and collect outputs in invocation order.
pub fn dispatch_vertices<S: VertexStage + ?Sized>(stage: &S, size: DispatchSize) -> Vec<VertexOutput> {
    let total = size.total();
    debug!(
        instances = size.instances,
        vertices_per_instance = size.vertices_per_instance,
        total,
        "Dispatching vertex stage"
    );
    (0..total)
        .into_par_iter()
        .map(|index| stage.invoke(size.invocation(index)))
        .collect()
}

/// Like [`dispatch_vertices`] but writes into a caller-owned buffer that is
/// reused across frames. The buffer is resized to the dispatch size.
pub fn dispatch_vertices_into<S: VertexStage + ?Sized>(
    stage: &S,
    size: DispatchSize,
    output: &mut Vec<VertexOutput>,
) {
    output.resize(size.total(), VertexOutput::culled());
    output
        .par_iter_mut()
        .enumerate()
        .for_each(|(index, slot)| *slot = stage.invoke(size.invocation(index)));
}
