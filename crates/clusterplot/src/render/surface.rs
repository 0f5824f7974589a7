//! Effect interface onto a host-owned rendering surface.

use crate::scene::primitives::{Primitive, PrimitiveKey, PrimitiveKind, PrimitiveView};
use std::collections::HashMap;

/// Live rendering handles owned by the host.
///
/// The reconciler only ever talks to the surface through these three
/// effects; it never holds the handles itself.
pub trait RenderSurface {
    fn create(&mut self, kind: PrimitiveKind, primitive: PrimitiveView<'_>);
    fn update(&mut self, kind: PrimitiveKind, key: &PrimitiveKey, primitive: PrimitiveView<'_>);
    fn remove(&mut self, kind: PrimitiveKind, key: &PrimitiveKey);
}

/// One effect applied to a [`RetainedSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Create(PrimitiveKind, PrimitiveKey),
    Update(PrimitiveKind, PrimitiveKey),
    Remove(PrimitiveKind, PrimitiveKey),
}

/// In-memory surface that mirrors whatever was reconciled onto it.
#[derive(Debug, Default)]
pub struct RetainedSurface {
    live: HashMap<(PrimitiveKind, PrimitiveKey), Primitive>,
    log: Vec<SurfaceOp>,
}

impl RetainedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: PrimitiveKind, key: &PrimitiveKey) -> Option<&Primitive> {
        self.live.get(&(kind, key.clone()))
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn count(&self, kind: PrimitiveKind) -> usize {
        self.live.keys().filter(|(k, _)| *k == kind).count()
    }

    /// Effects received so far, oldest first.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.log
    }

    /// Drain the effect log, keeping the live set.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.log)
    }
}

impl RenderSurface for RetainedSurface {
    fn create(&mut self, kind: PrimitiveKind, primitive: PrimitiveView<'_>) {
        let key = primitive.key().clone();
        if self
            .live
            .insert((kind, key.clone()), primitive.to_owned())
            .is_some()
        {
            log::warn!(target: "clusterplot", "surface recreated live primitive {key}");
        }
        self.log.push(SurfaceOp::Create(kind, key));
    }

    fn update(&mut self, kind: PrimitiveKind, key: &PrimitiveKey, primitive: PrimitiveView<'_>) {
        match self.live.get_mut(&(kind, key.clone())) {
            Some(slot) => *slot = primitive.to_owned(),
            None => {
                log::warn!(target: "clusterplot", "surface update for unknown primitive {key}");
                self.live.insert((kind, key.clone()), primitive.to_owned());
            }
        }
        self.log.push(SurfaceOp::Update(kind, key.clone()));
    }

    fn remove(&mut self, kind: PrimitiveKind, key: &PrimitiveKey) {
        if self.live.remove(&(kind, key.clone())).is_none() {
            log::warn!(target: "clusterplot", "surface remove for unknown primitive {key}");
        }
        self.log.push(SurfaceOp::Remove(kind, key.clone()));
    }
}
