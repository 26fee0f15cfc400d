//! Where die faces come from.
//!
//! Rolling is the one asynchronous step of an evaluation: the pool asks a
//! [`DiceSource`] for one face per die and waits for the answer. Hosts plug in
//! their own RNG or a networked roller; tests use a scripted source.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Produces one face per requested die.
#[async_trait]
pub trait DiceSource: Send + Sync {
    /// Roll one die per entry of `sides`, returning faces in the same order.
    async fn roll_faces(&self, sides: &[u32]) -> Vec<u32>;
}

#[async_trait]
impl<T: DiceSource + ?Sized> DiceSource for Arc<T> {
    async fn roll_faces(&self, sides: &[u32]) -> Vec<u32> {
        (**self).roll_faces(sides).await
    }
}

/// Uniform rolls from a `StdRng`.
pub struct RngDiceSource {
    rng: Mutex<StdRng>,
}

impl RngDiceSource {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible rolls from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RngDiceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiceSource for RngDiceSource {
    async fn roll_faces(&self, sides: &[u32]) -> Vec<u32> {
        let mut rng = self.rng.lock().await;
        sides
            .iter()
            .map(|&s| rng.gen_range(1..=s.max(1)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rng_source_range() {
        let source = RngDiceSource::seeded(7);
        for _ in 0..100 {
            let faces = source.roll_faces(&[12, 10, 8, 6, 4]).await;
            assert_eq!(faces.len(), 5);
            for (face, sides) in faces.iter().zip([12, 10, 8, 6, 4]) {
                assert!(*face >= 1 && *face <= sides);
            }
        }
    }

    #[tokio::test]
    async fn test_seeded_sources_agree() {
        let a = RngDiceSource::seeded(42);
        let b = RngDiceSource::seeded(42);
        let sides = [12, 12, 8, 4];
        assert_eq!(a.roll_faces(&sides).await, b.roll_faces(&sides).await);
    }

    #[tokio::test]
    async fn test_arc_source() {
        let source: Arc<dyn DiceSource> = Arc::new(RngDiceSource::seeded(1));
        assert_eq!(source.roll_faces(&[]).await, Vec::<u32>::new());
        assert_eq!(source.roll_faces(&[4, 4]).await.len(), 2);
    }
}
