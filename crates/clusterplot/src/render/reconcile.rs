//! Diff two scenes and push the minimal set of effects to a surface.

use crate::error::Result;
use crate::render::surface::RenderSurface;
use crate::scene::primitives::{DataContainer, PrimitiveKey, PrimitiveKind, PrimitiveView};
use std::collections::{HashMap, HashSet};

/// Effect counts for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
}

impl ReconcileStats {
    pub fn effects(&self) -> usize {
        self.created + self.updated + self.removed
    }

    fn absorb(&mut self, other: ReconcileStats) {
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.removed += other.removed;
    }
}

/// Bring `surface` from `previous` to `next`.
///
/// Families are processed in [`PrimitiveKind::ALL`] order. Within a family,
/// removals go first (in `previous` order), then updates and creations in
/// `next` order. Unchanged primitives produce no effect.
pub fn reconcile<S: RenderSurface + ?Sized>(
    previous: &DataContainer,
    next: &DataContainer,
    surface: &mut S,
) -> Result<ReconcileStats> {
    next.check_unique()?;

    let mut stats = ReconcileStats::default();
    for kind in PrimitiveKind::ALL {
        stats.absorb(reconcile_kind(
            kind,
            &previous.views(kind),
            &next.views(kind),
            surface,
        ));
    }
    log::debug!(
        target: "clusterplot",
        "reconcile created={} updated={} unchanged={} removed={}",
        stats.created,
        stats.updated,
        stats.unchanged,
        stats.removed
    );
    Ok(stats)
}

fn reconcile_kind<S: RenderSurface + ?Sized>(
    kind: PrimitiveKind,
    previous: &[PrimitiveView<'_>],
    next: &[PrimitiveView<'_>],
    surface: &mut S,
) -> ReconcileStats {
    let mut stats = ReconcileStats::default();

    let mut old: HashMap<&PrimitiveKey, PrimitiveView<'_>> = HashMap::with_capacity(previous.len());
    for view in previous {
        // a repeated key in `previous` is only ever removed once
        old.insert(view.key(), *view);
    }
    let incoming: HashSet<&PrimitiveKey> = next.iter().map(|v| v.key()).collect();

    let mut removed: HashSet<&PrimitiveKey> = HashSet::new();
    for view in previous {
        let key = view.key();
        if !incoming.contains(key) && removed.insert(key) {
            surface.remove(kind, key);
            stats.removed += 1;
        }
    }

    for view in next {
        match old.get(view.key()) {
            Some(before) if before == view => stats.unchanged += 1,
            Some(_) => {
                surface.update(kind, view.key(), *view);
                stats.updated += 1;
            }
            None => {
                surface.create(kind, *view);
                stats.created += 1;
            }
        }
    }
    stats
}
