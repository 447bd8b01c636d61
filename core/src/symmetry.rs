//! Left/right matching for joints and vertices
//!
//! Joints pair by label. Vertices pair by position: each vertex is mirrored
//! across the configured plane and looked up in a spatial hash whose cells
//! are one tolerance wide, so a query only inspects the 27 surrounding cells.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::snapshot::{JointId, Side, Skeleton};

/// Mirror plane through the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymmetryPlane {
    /// Negates X
    #[default]
    Yz,
    /// Negates Y
    Xz,
    /// Negates Z
    Xy,
}

impl SymmetryPlane {
    /// Reflect a point across the plane (an involution)
    #[inline]
    pub fn mirror(self, p: Vec3) -> Vec3 {
        match self {
            SymmetryPlane::Yz => Vec3::new(-p.x, p.y, p.z),
            SymmetryPlane::Xz => Vec3::new(p.x, -p.y, p.z),
            SymmetryPlane::Xy => Vec3::new(p.x, p.y, -p.z),
        }
    }

    /// Unsigned distance from the plane
    #[inline]
    pub fn distance(self, p: Vec3) -> f32 {
        match self {
            SymmetryPlane::Yz => p.x.abs(),
            SymmetryPlane::Xz => p.y.abs(),
            SymmetryPlane::Xy => p.z.abs(),
        }
    }
}

impl fmt::Display for SymmetryPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymmetryPlane::Yz => "yz",
            SymmetryPlane::Xz => "xz",
            SymmetryPlane::Xy => "xy",
        })
    }
}

impl FromStr for SymmetryPlane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yz" | "x" => Ok(SymmetryPlane::Yz),
            "xz" | "y" => Ok(SymmetryPlane::Xz),
            "xy" | "z" => Ok(SymmetryPlane::Xy),
            other => Err(format!("unknown symmetry plane '{other}' (use yz, xz or xy)")),
        }
    }
}

/// Several joints claiming the same side and kind
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateLabel {
    pub side: Side,
    pub kind: String,
    pub joints: Vec<JointId>,
}

/// Result of pairing labeled joints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointPairing {
    /// (left, right) pairs sharing a kind
    pub pairs: Vec<(JointId, JointId)>,
    /// Left or right joints with no counterpart
    pub unmatched: Vec<JointId>,
    /// Ambiguous labels; no pairing is attempted for their kind
    pub duplicates: Vec<DuplicateLabel>,
}

/// Pair each Left joint with the unique Right joint of the same kind
pub fn pair_joints(skeleton: &Skeleton) -> JointPairing {
    let mut groups: HashMap<(Side, &str), Vec<JointId>> = HashMap::new();
    for (id, joint) in skeleton.iter() {
        let Some(kind) = joint.label.kind.as_deref() else {
            continue;
        };
        if joint.label.side == Side::None || kind.is_empty() {
            continue;
        }
        groups.entry((joint.label.side, kind)).or_default().push(id);
    }

    let mut pairing = JointPairing::default();

    for (&(side, kind), joints) in &groups {
        if joints.len() > 1 {
            pairing.duplicates.push(DuplicateLabel {
                side,
                kind: kind.to_string(),
                joints: joints.clone(),
            });
        }
    }

    for (&(side, kind), joints) in &groups {
        if !matches!(side, Side::Left | Side::Right) {
            continue;
        }
        let counterpart = groups.get(&(side.opposite(), kind));
        let ambiguous = joints.len() > 1 || counterpart.is_some_and(|c| c.len() > 1);
        if ambiguous {
            continue;
        }
        match counterpart {
            Some(other) if side == Side::Left => pairing.pairs.push((joints[0], other[0])),
            Some(_) => {}
            None => pairing.unmatched.push(joints[0]),
        }
    }

    pairing.pairs.sort_unstable();
    pairing.unmatched.sort_unstable();
    pairing.duplicates.sort_by_key(|d| d.joints[0]);
    pairing
}

/// Spatial lookup of mirrored vertex positions
pub struct VertexMirror<'a> {
    positions: &'a [Vec3],
    plane: SymmetryPlane,
    tolerance: f32,
    cell_size: f32,
    grid: HashMap<[i64; 3], SmallVec<[u32; 4]>>,
}

impl<'a> VertexMirror<'a> {
    const MIN_CELL_SIZE: f32 = 1e-6;

    pub fn build(positions: &'a [Vec3], plane: SymmetryPlane, tolerance: f32) -> Self {
        let cell_size = tolerance.max(Self::MIN_CELL_SIZE);
        let mut grid: HashMap<[i64; 3], SmallVec<[u32; 4]>> = HashMap::new();
        for (index, &p) in positions.iter().enumerate() {
            grid.entry(cell_of(p, cell_size))
                .or_default()
                .push(index as u32);
        }
        Self {
            positions,
            plane,
            tolerance,
            cell_size,
            grid,
        }
    }

    /// Nearest vertex within tolerance of the mirrored position
    pub fn find_mirror(&self, vertex: u32) -> Option<u32> {
        let target = self.plane.mirror(self.positions[vertex as usize]);
        let [cx, cy, cz] = cell_of(target, self.cell_size);

        let mut best: Option<(u32, f32)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let key = [
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    ];
                    let Some(candidates) = self.grid.get(&key) else {
                        continue;
                    };
                    for &candidate in candidates {
                        let distance = self.positions[candidate as usize].distance(target);
                        if distance <= self.tolerance
                            && best.is_none_or(|(_, d)| distance < d)
                        {
                            best = Some((candidate, distance));
                        }
                    }
                }
            }
        }
        best.map(|(index, _)| index)
    }

    /// Vertices without a mirrored counterpart, in index order
    pub fn unmatched(&self) -> Vec<u32> {
        (0..self.positions.len() as u32)
            .filter(|&v| self.find_mirror(v).is_none())
            .collect()
    }
}

#[inline]
fn cell_of(p: Vec3, cell_size: f32) -> [i64; 3] {
    let c = (p / cell_size).floor();
    [c.x as i64, c.y as i64, c.z as i64]
}
