//! Testing utilities for dice evaluation.
//!
//! This module provides tools for deterministic tests:
//! - `FixedDiceSource` for scripted faces without an RNG
//! - `pool_of` for building pools from notation in test code

use crate::dice::DicePool;
use crate::source::DiceSource;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// A dice source that returns scripted faces.
///
/// Faces are handed out in order, one per requested die. Once the script runs
/// out every further die shows 1. Each request's side counts are recorded so
/// tests can check what was rolled.
#[derive(Default)]
pub struct FixedDiceSource {
    faces: Mutex<VecDeque<u32>>,
    requests: Mutex<Vec<Vec<u32>>>,
}

impl FixedDiceSource {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: Mutex::new(faces.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Append more faces to the script.
    pub async fn queue(&self, faces: impl IntoIterator<Item = u32>) {
        self.faces.lock().await.extend(faces);
    }

    /// Faces not handed out yet.
    pub async fn remaining(&self) -> usize {
        self.faces.lock().await.len()
    }

    /// Side counts of every request so far, in order.
    pub async fn requests(&self) -> Vec<Vec<u32>> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl DiceSource for FixedDiceSource {
    async fn roll_faces(&self, sides: &[u32]) -> Vec<u32> {
        self.requests.lock().await.push(sides.to_vec());
        let mut faces = self.faces.lock().await;
        sides
            .iter()
            .map(|_| faces.pop_front().unwrap_or(1))
            .collect()
    }
}

/// Parse notation for test fixtures, panicking on anything malformed.
pub fn pool_of(notation: &str) -> DicePool {
    match notation.parse() {
        Ok(pool) => pool,
        Err(e) => panic!("bad test notation {notation:?}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_source_script() {
        let source = FixedDiceSource::new([3, 4]);
        assert_eq!(source.roll_faces(&[6]).await, vec![3]);
        source.queue([9]).await;
        assert_eq!(source.remaining().await, 2);
        assert_eq!(source.roll_faces(&[6, 10]).await, vec![4, 9]);
        assert_eq!(source.roll_faces(&[8]).await, vec![1]);
        assert_eq!(source.requests().await, vec![vec![6], vec![6, 10], vec![8]]);
    }

    #[test]
    fn test_pool_of() {
        assert_eq!(pool_of("2d10, d4"), DicePool::new([0, 2, 0, 0, 1]));
    }
}
