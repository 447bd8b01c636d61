//! Mesh symmetry

use super::{Rule, RuleContext, RuleId, RuleSkipped};
use crate::finding::{ElementRef, Finding};
use crate::symmetry::VertexMirror;

/// Every vertex must have a counterpart across the symmetry plane
pub struct MeshSymmetryRule;

impl Rule for MeshSymmetryRule {
    fn id(&self) -> RuleId {
        RuleId::MeshSymmetry
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleSkipped> {
        let mesh = ctx.snapshot.mesh();
        let limit = ctx.config.symmetry_vertex_limit;
        if mesh.vertex_count() > limit {
            return Err(RuleSkipped(format!(
                "mesh has {} vertices, above the symmetry limit of {limit}",
                mesh.vertex_count()
            )));
        }

        let mirror = VertexMirror::build(
            mesh.positions(),
            ctx.config.symmetry_plane,
            ctx.config.position_tolerance,
        );

        Ok(mirror
            .unmatched()
            .into_iter()
            .map(|vertex| {
                Finding::warning(self.id(), format!("asymmetric vertex: {vertex}"))
                    .with_element(ElementRef::vertex(vertex))
            })
            .collect())
    }
}
