//! Mesh adjacency index
//!
//! Built in one pass over the faces. Answers edge/face counts, boundary and
//! non-manifold queries for the topology rules and for navigation data in
//! findings.

use hashbrown::HashMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::error::MalformedMeshError;
use crate::snapshot::Mesh;

/// Undirected edge with `0 <= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Edge(pub u32, pub u32);

impl Edge {
    /// Normalize direction so the smaller index comes first
    #[inline]
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn contains(&self, vertex: u32) -> bool {
        self.0 == vertex || self.1 == vertex
    }
}

/// Vertex/edge/face adjacency for a [`Mesh`]
#[derive(Debug, Clone, Default)]
pub struct GeometryIndex {
    edge_faces: HashMap<Edge, SmallVec<[u32; 2]>>,
    vertex_faces: Vec<SmallVec<[u32; 6]>>,
    degenerate_faces: Vec<u32>,
    non_manifold_vertices: Vec<u32>,
}

impl GeometryIndex {
    /// Index a mesh, rejecting faces that reference missing vertices
    pub fn build(mesh: &Mesh) -> Result<Self, MalformedMeshError> {
        let vertex_count = mesh.vertex_count();

        if let Some(vertex) = mesh.positions().iter().position(|p| !p.is_finite()) {
            return Err(MalformedMeshError::NonFinitePosition {
                vertex: vertex as u32,
            });
        }

        let mut edge_faces: HashMap<Edge, SmallVec<[u32; 2]>> = HashMap::new();
        let mut vertex_faces: Vec<SmallVec<[u32; 6]>> = vec![SmallVec::new(); vertex_count];
        let mut degenerate_faces = Vec::new();

        for (face_index, face) in mesh.faces().iter().enumerate() {
            if face.len() < 3 {
                return Err(MalformedMeshError::TooFewVertices {
                    face: face_index,
                    count: face.len(),
                });
            }
            if let Some(&index) = face.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MalformedMeshError::IndexOutOfRange {
                    face: face_index,
                    index,
                    vertex_count,
                });
            }

            let face_id = face_index as u32;
            let mut degenerate = false;

            for (corner, &a) in face.iter().enumerate() {
                if face[..corner].contains(&a) {
                    degenerate = true;
                } else {
                    vertex_faces[a as usize].push(face_id);
                }

                let b = face[(corner + 1) % face.len()];
                if a == b {
                    continue;
                }
                let faces = edge_faces.entry(Edge::new(a, b)).or_default();
                if faces.last() != Some(&face_id) {
                    faces.push(face_id);
                }
            }

            if degenerate {
                degenerate_faces.push(face_id);
            }
        }

        let mut index = Self {
            edge_faces,
            vertex_faces,
            degenerate_faces,
            non_manifold_vertices: Vec::new(),
        };
        index.non_manifold_vertices = (0..vertex_count as u32)
            .filter(|&v| index.compute_non_manifold_vertex(mesh, v))
            .collect();

        tracing::debug!(
            vertices = vertex_count,
            edges = index.edge_faces.len(),
            faces = mesh.face_count(),
            "geometry index built"
        );

        Ok(index)
    }

    /// Number of faces bordering an edge (0 if the edge does not exist)
    pub fn edge_face_count(&self, edge: Edge) -> usize {
        self.edge_faces.get(&edge).map_or(0, |f| f.len())
    }

    pub fn faces_for_edge(&self, edge: Edge) -> &[u32] {
        self.edge_faces.get(&edge).map_or(&[][..], |f| f.as_slice())
    }

    pub fn faces_for_vertex(&self, vertex: u32) -> &[u32] {
        self.vertex_faces
            .get(vertex as usize)
            .map_or(&[][..], |f| f.as_slice())
    }

    /// More than two faces share this edge
    pub fn is_non_manifold_edge(&self, edge: Edge) -> bool {
        self.edge_face_count(edge) > 2
    }

    /// The faces around this vertex do not form a single fan
    pub fn is_non_manifold_vertex(&self, vertex: u32) -> bool {
        self.non_manifold_vertices.binary_search(&vertex).is_ok()
    }

    /// Edges with exactly one adjacent face, sorted
    pub fn boundary_edges(&self) -> Vec<Edge> {
        self.edges_where(|count| count == 1)
    }

    /// Edges with more than two adjacent faces, sorted
    pub fn non_manifold_edges(&self) -> Vec<Edge> {
        self.edges_where(|count| count > 2)
    }

    /// Vertices whose incident faces split into several fans, sorted
    pub fn non_manifold_vertices(&self) -> &[u32] {
        &self.non_manifold_vertices
    }

    /// Faces that repeat a vertex index
    pub fn degenerate_faces(&self) -> &[u32] {
        &self.degenerate_faces
    }

    pub fn edge_count(&self) -> usize {
        self.edge_faces.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_faces.len()
    }

    /// Every edge borders exactly two faces
    pub fn is_closed_manifold(&self) -> bool {
        self.edge_faces.values().all(|f| f.len() == 2)
    }

    fn edges_where(&self, predicate: impl Fn(usize) -> bool) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .edge_faces
            .iter()
            .filter(|(_, faces)| predicate(faces.len()))
            .map(|(&edge, _)| edge)
            .collect();
        edges.sort_unstable();
        edges
    }

    fn compute_non_manifold_vertex(&self, mesh: &Mesh, vertex: u32) -> bool {
        let faces = self.faces_for_vertex(vertex);
        if faces.len() < 2 {
            return false;
        }

        // Union faces that share an edge through this vertex.
        let mut parent: SmallVec<[usize; 8]> = (0..faces.len()).collect();
        for (local, &face_id) in faces.iter().enumerate() {
            let face = &mesh.faces()[face_id as usize];
            let n = face.len();
            for corner in 0..n {
                if face[corner] != vertex {
                    continue;
                }
                for neighbour in [face[(corner + n - 1) % n], face[(corner + 1) % n]] {
                    if neighbour == vertex {
                        continue;
                    }
                    let edge = Edge::new(vertex, neighbour);
                    let shared = self.faces_for_edge(edge);
                    if shared.len() > 2 {
                        return true;
                    }
                    for other in shared {
                        if let Some(other_local) = faces.iter().position(|f| f == other) {
                            union(&mut parent, local, other_local);
                        }
                    }
                }
            }
        }

        let root = find(&mut parent, 0);
        (1..faces.len()).any(|i| find(&mut parent, i) != root)
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra] = rb;
    }
}
