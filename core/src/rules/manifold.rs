//! Non-manifold topology

use hashbrown::HashSet;

use super::{Rule, RuleContext, RuleId, RuleSkipped};
use crate::finding::{ElementRef, Finding};

/// Flags edges with more than two faces, vertices whose faces split into
/// separate fans, faces that repeat a vertex, and (optionally) open edges.
pub struct ManifoldRule;

impl Rule for ManifoldRule {
    fn id(&self) -> RuleId {
        RuleId::Manifold
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleSkipped> {
        let geometry = ctx.snapshot.geometry();
        let mut findings = Vec::new();

        let non_manifold_edges = geometry.non_manifold_edges();
        let mut on_bad_edge = HashSet::new();
        for edge in &non_manifold_edges {
            on_bad_edge.insert(edge.0);
            on_bad_edge.insert(edge.1);

            let faces = geometry.faces_for_edge(*edge);
            findings.push(
                Finding::error(
                    self.id(),
                    format!(
                        "non-manifold edge: {}-{} ({} faces)",
                        edge.0,
                        edge.1,
                        faces.len()
                    ),
                )
                .with_element(ElementRef::edge(*edge))
                .with_elements(faces.iter().map(|&f| ElementRef::face(f))),
            );
        }

        // Vertices on a bad edge are already covered by the edge finding.
        for &vertex in geometry.non_manifold_vertices() {
            if on_bad_edge.contains(&vertex) {
                continue;
            }
            findings.push(
                Finding::error(self.id(), format!("non-manifold vertex: {vertex}"))
                    .with_element(ElementRef::vertex(vertex))
                    .with_elements(
                        geometry
                            .faces_for_vertex(vertex)
                            .iter()
                            .map(|&f| ElementRef::face(f)),
                    ),
            );
        }

        for &face in geometry.degenerate_faces() {
            findings.push(
                Finding::warning(self.id(), format!("degenerate face: {face}"))
                    .with_element(ElementRef::face(face)),
            );
        }

        if ctx.config.report_boundary_edges {
            for edge in geometry.boundary_edges() {
                findings.push(
                    Finding::info(self.id(), format!("boundary edge: {}-{}", edge.0, edge.1))
                        .with_element(ElementRef::edge(edge)),
                );
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RigConfig;
    use crate::finding::Severity;
    use crate::snapshot::{Mesh, RigSnapshot, Skeleton};
    use glam::Vec3;

    fn run(mesh: Mesh, config: &RigConfig) -> Vec<Finding> {
        let snapshot = RigSnapshot::new(mesh, Skeleton::default(), None).unwrap();
        let ctx = RuleContext {
            snapshot: &snapshot,
            config,
        };
        ManifoldRule.check(&ctx).unwrap()
    }

    #[test]
    fn test_fin_edge_reported_once() {
        let mesh = Mesh::from_triangles(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z, Vec3::NEG_Y],
            &[[0, 1, 2], [1, 0, 3], [0, 1, 4]],
        );
        let findings = run(mesh, &RigConfig::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].message, "non-manifold edge: 0-1 (3 faces)");
        assert_eq!(findings[0].elements.len(), 4);
    }

    #[test]
    fn test_bowtie_vertex_reported() {
        let mesh = Mesh::from_triangles(
            vec![
                Vec3::ZERO,
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
                Vec3::new(-1.0, -1.0, 0.0),
            ],
            &[[0, 1, 2], [0, 3, 4]],
        );
        let findings = run(mesh, &RigConfig::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "non-manifold vertex: 0");
    }

    #[test]
    fn test_boundary_edges_only_when_enabled() {
        let triangle = || Mesh::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 2]]);
        assert!(run(triangle(), &RigConfig::default()).is_empty());

        let config = RigConfig {
            report_boundary_edges: true,
            ..RigConfig::default()
        };
        let findings = run(triangle(), &config);
        assert_eq!(findings.len(), 3);
        assert!(findings.iter().all(|f| f.severity == Severity::Info));
    }
}
