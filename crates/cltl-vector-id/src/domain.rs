//! # Identity Clustering
//!
//! Incremental nearest-centroid agglomeration: an embedding joins the
//! closest cluster if it lies within the distance threshold, otherwise it
//! starts a new one. Identities are cluster ids rendered as strings.

use crate::error::VectorIdError;

/// Maps embeddings to identities.
pub trait VectorIdentity: Send + Sync {
    /// Identity for `embedding`, registering it with the model.
    fn identify(&mut self, embedding: &[f32]) -> Result<String, VectorIdError>;

    /// Number of distinct identities seen so far.
    fn identity_count(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Cluster {
    id: u64,
    centroid: Vec<f64>,
    members: u64,
}

impl Cluster {
    fn absorb(&mut self, embedding: &[f32]) {
        self.members += 1;
        let n = self.members as f64;
        for (c, &x) in self.centroid.iter_mut().zip(embedding) {
            *c += (f64::from(x) - *c) / n;
        }
    }
}

/// Euclidean distance between a centroid and an embedding.
fn distance(centroid: &[f64], embedding: &[f32]) -> f64 {
    centroid
        .iter()
        .zip(embedding)
        .map(|(&c, &x)| {
            let d = c - f64::from(x);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[derive(Debug, Clone)]
pub struct ClusterIdentity {
    distance_threshold: f64,
    next_id: u64,
    dimensions: Option<usize>,
    clusters: Vec<Cluster>,
}

impl ClusterIdentity {
    /// Agglomerative clustering with ids starting at `first_id`.
    #[must_use]
    pub fn agglomerative(first_id: u64, distance_threshold: f64) -> Self {
        Self {
            distance_threshold,
            next_id: first_id,
            dimensions: None,
            clusters: Vec::new(),
        }
    }

    #[must_use]
    pub fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }
}

impl VectorIdentity for ClusterIdentity {
    fn identify(&mut self, embedding: &[f32]) -> Result<String, VectorIdError> {
        if embedding.is_empty() {
            return Err(VectorIdError::EmptyEmbedding);
        }
        match self.dimensions {
            Some(expected) if expected != embedding.len() => {
                return Err(VectorIdError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
            Some(_) => {}
            None => self.dimensions = Some(embedding.len()),
        }

        let nearest = self
            .clusters
            .iter_mut()
            .map(|cluster| {
                let d = distance(&cluster.centroid, embedding);
                (cluster, d)
            })
            .filter(|(_, d)| *d <= self.distance_threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((cluster, _)) = nearest {
            cluster.absorb(embedding);
            return Ok(cluster.id.to_string());
        }

        let id = self.next_id;
        self.next_id += 1;
        self.clusters.push(Cluster {
            id,
            centroid: embedding.iter().map(|&x| f64::from(x)).collect(),
            members: 1,
        });
        Ok(id.to_string())
    }

    fn identity_count(&self) -> usize {
        self.clusters.len()
    }
}
