//! Export clustering.
//!
//! Dragging leaves nodes a fraction of a unit apart where the author meant
//! them to line up. Before coordinates are written, values along each axis
//! that lie within the cluster tolerance of each other are forced to their
//! common mean, rounded to a clean quantum.

use indexmap::IndexMap;
use log::trace;

use tikzedit_core::{
    geometry::{Point, round_to},
    identifier::Id,
};

use crate::model::Model;

/// Clustering parameters for one export, in document centimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Clustering {
    tolerance: f32,
    quantum: f32,
    /// Grid every value is rounded to before clustering, in snap mode
    pre_round: Option<f32>,
}

impl Clustering {
    pub(crate) fn for_model(model: &Model) -> Self {
        let export = model.config().export();
        if model.snap_to_grid() {
            let grid = model.config().document_grid();
            Self {
                tolerance: export.cluster_tolerance(),
                quantum: grid,
                pre_round: Some(grid),
            }
        } else {
            Self {
                tolerance: export.cluster_tolerance(),
                quantum: export.cluster_quantum(),
                pre_round: None,
            }
        }
    }

    /// Document positions of every node after clustering, Y axis first.
    pub(crate) fn positions(&self, model: &Model) -> IndexMap<Id, Point> {
        let units = model.config().units();
        let raw: Vec<(Id, Point)> = model
            .nodes()
            .values()
            .map(|node| {
                let doc = units.to_document(node.position());
                let doc = match self.pre_round {
                    Some(grid) => doc.round_to(grid),
                    None => doc,
                };
                (node.name(), doc)
            })
            .collect();

        let ys: Vec<f32> = raw.iter().map(|(_, p)| p.y()).collect();
        let xs: Vec<f32> = raw.iter().map(|(_, p)| p.x()).collect();
        let ys = self.cluster_axis(&ys);
        let xs = self.cluster_axis(&xs);

        raw.iter()
            .zip(xs.into_iter().zip(ys))
            .map(|((name, _), (x, y))| (*name, Point::new(x, y)))
            .collect()
    }

    /// Clusters one axis and returns the adjusted values in input order.
    ///
    /// Each value joins the first key within tolerance, or starts a new key
    /// at its rounded value. Sorted keys within tolerance of an earlier kept
    /// key are then merged into it. Members of clusters with more than one
    /// value take the cluster mean rounded to the quantum; single values are
    /// kept as they are.
    pub(crate) fn cluster_axis(&self, values: &[f32]) -> Vec<f32> {
        let mut keys: Vec<f32> = Vec::new();
        let assigned: Vec<usize> = values
            .iter()
            .map(|&value| {
                keys.iter()
                    .position(|&key| (value - key).abs() < self.tolerance)
                    .unwrap_or_else(|| {
                        keys.push(round_to(value, self.quantum));
                        keys.len() - 1
                    })
            })
            .collect();

        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));

        let mut merged: Vec<f32> = Vec::new();
        let mut merged_index = vec![0; keys.len()];
        for key_index in order {
            let key = keys[key_index];
            merged_index[key_index] = merged
                .iter()
                .position(|&existing| (key - existing).abs() < self.tolerance)
                .unwrap_or_else(|| {
                    merged.push(key);
                    merged.len() - 1
                });
        }

        let mut sums = vec![(0.0f32, 0usize); merged.len()];
        for (value, key_index) in values.iter().zip(&assigned) {
            let cluster = &mut sums[merged_index[*key_index]];
            cluster.0 += value;
            cluster.1 += 1;
        }
        trace!(values = values.len(), clusters = merged.len(); "Clustered axis");

        values
            .iter()
            .zip(&assigned)
            .map(|(&value, key_index)| match sums[merged_index[*key_index]] {
                (sum, count) if count > 1 => round_to(sum / count as f32, self.quantum),
                _ => value,
            })
            .collect()
    }
}
