//! Per-vertex skin weights

use smallvec::SmallVec;

use super::skeleton::JointId;

/// Weights at or below this value do not count as an influence
pub const WEIGHT_EPSILON: f32 = 1e-6;

/// One joint's contribution to a vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Influence {
    pub joint: JointId,
    pub weight: f32,
}

impl Influence {
    pub fn new(joint: JointId, weight: f32) -> Self {
        Self { joint, weight }
    }
}

/// Influences of a single vertex
pub type VertexWeights = SmallVec<[Influence; 4]>;

/// Mapping from vertex index to weighted joints
#[derive(Debug, Clone, Default)]
pub struct SkinBinding {
    weights: Vec<VertexWeights>,
}

impl SkinBinding {
    pub fn new(weights: Vec<VertexWeights>) -> Self {
        Self { weights }
    }

    pub fn vertex_count(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self, vertex: u32) -> &[Influence] {
        &self.weights[vertex as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Influence])> + '_ {
        self.weights
            .iter()
            .enumerate()
            .map(|(v, w)| (v as u32, w.as_slice()))
    }

    /// Number of joints with a non-negligible weight on this vertex
    pub fn influence_count(&self, vertex: u32) -> usize {
        self.weights(vertex)
            .iter()
            .filter(|i| i.weight > WEIGHT_EPSILON)
            .count()
    }

    pub fn weight_sum(&self, vertex: u32) -> f32 {
        self.weights(vertex).iter().map(|i| i.weight).sum()
    }

    /// Per-joint flag: does any vertex carry weight for it
    pub fn influencing_joints(&self, joint_count: usize) -> Vec<bool> {
        let mut used = vec![false; joint_count];
        for influence in self.weights.iter().flatten() {
            if influence.weight > WEIGHT_EPSILON {
                if let Some(slot) = used.get_mut(influence.joint.0) {
                    *slot = true;
                }
            }
        }
        used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_influence_count_ignores_zero_weights() {
        let skin = SkinBinding::new(vec![smallvec![
            Influence::new(JointId(0), 0.5),
            Influence::new(JointId(1), 0.5),
            Influence::new(JointId(2), 0.0),
        ]]);
        assert_eq!(skin.influence_count(0), 2);
        assert!((skin.weight_sum(0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_influencing_joints() {
        let skin = SkinBinding::new(vec![
            smallvec![Influence::new(JointId(1), 1.0)],
            smallvec![Influence::new(JointId(2), 0.0)],
        ]);
        assert_eq!(skin.influencing_joints(3), vec![false, true, false]);
    }
}
