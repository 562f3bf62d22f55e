use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Random stream owned by exactly one replica.
pub type ReplicaRng = ChaCha8Rng;

/// Identifies a replica's random stream: the ensemble root seed plus the
/// replica's own ChaCha stream number.
///
/// Streams with the same root and different numbers never overlap, so
/// replicas seeded this way cannot share a stream state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplicaSeed {
    pub root: u64,
    pub stream: u64,
}

impl ReplicaSeed {
    pub fn new(root: u64, stream: u64) -> Self {
        Self { root, stream }
    }

    pub fn rng(&self) -> ReplicaRng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.root);
        rng.set_stream(self.stream);
        rng
    }
}
