//! Seeded randomness for board generation.
//!
//! Every draw made while building a board comes from a [`BingoRng`] seeded
//! through a [`SeedKey`], so a board can be rebuilt exactly from its inputs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Structured inputs a generator seed is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedKey {
    Board {
        player_id: Uuid,
        game_id: Uuid,
    },
    /// Includes the remaining budget so every reroll of a slot draws differently
    Reroll {
        player_id: Uuid,
        game_id: Uuid,
        category_id: Uuid,
        square_index: usize,
        rerolls_left: i32,
    },
}

impl SeedKey {
    fn tag(&self) -> &'static str {
        match self {
            SeedKey::Board { .. } => "board",
            SeedKey::Reroll { .. } => "reroll",
        }
    }

    /// Tagged, length-prefixed encoding; no two keys share an encoding
    fn encode(&self) -> Vec<u8> {
        fn push_field(buf: &mut Vec<u8>, field: &[u8]) {
            buf.extend_from_slice(&(field.len() as u32).to_be_bytes());
            buf.extend_from_slice(field);
        }

        let mut buf = Vec::with_capacity(128);
        push_field(&mut buf, self.tag().as_bytes());
        match self {
            SeedKey::Board { player_id, game_id } => {
                push_field(&mut buf, player_id.as_bytes());
                push_field(&mut buf, game_id.as_bytes());
            }
            SeedKey::Reroll {
                player_id,
                game_id,
                category_id,
                square_index,
                rerolls_left,
            } => {
                push_field(&mut buf, player_id.as_bytes());
                push_field(&mut buf, game_id.as_bytes());
                push_field(&mut buf, category_id.as_bytes());
                push_field(&mut buf, &(*square_index as u64).to_be_bytes());
                push_field(&mut buf, &rerolls_left.to_be_bytes());
            }
        }
        buf
    }

    pub fn digest(&self) -> [u8; 32] {
        sha256(&self.encode())
    }
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}

pub struct BingoRng {
    rng: ChaCha8Rng,
    fingerprint: String,
}

impl BingoRng {
    fn from_digest(digest: [u8; 32]) -> Self {
        Self {
            fingerprint: hex::encode(&digest[..8]),
            rng: ChaCha8Rng::from_seed(digest),
        }
    }

    /// Seeds from an arbitrary string, hashed the same way as structured keys
    #[cfg(test)]
    pub(crate) fn from_seed_str(seed: &str) -> Self {
        Self::from_digest(sha256(seed.as_bytes()))
    }

    pub fn from_key(key: &SeedKey) -> Self {
        Self::from_digest(key.digest())
    }

    /// Short hex id of the seed, for logs
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Uniform integer in `min..=max`; swapped bounds are accepted
    pub fn int_between(&mut self, min: i32, max: i32) -> i32 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(low..=high)
    }

    /// Uniform float in `[0, 1)`
    pub fn random(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..items.len());
        items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_key() -> SeedKey {
        SeedKey::Board {
            player_id: Uuid::from_u128(1),
            game_id: Uuid::from_u128(2),
        }
    }

    #[test]
    fn same_key_gives_same_sequence() {
        let mut a = BingoRng::from_key(&board_key());
        let mut b = BingoRng::from_key(&board_key());
        for _ in 0..50 {
            assert_eq!(a.int_between(0, 1000), b.int_between(0, 1000));
            assert_eq!(a.random(), b.random());
        }
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn every_reroll_of_a_slot_gets_its_own_seed() {
        let reroll = |rerolls_left| SeedKey::Reroll {
            player_id: Uuid::from_u128(1),
            game_id: Uuid::from_u128(2),
            category_id: Uuid::from_u128(3),
            square_index: 4,
            rerolls_left,
        };
        assert_ne!(reroll(3).digest(), reroll(2).digest());
        assert_ne!(reroll(3).digest(), board_key().digest());
    }

    #[test]
    fn int_between_is_inclusive_and_accepts_swapped_bounds() {
        let mut rng = BingoRng::from_seed_str("inclusive");
        let mut seen = [false; 4];
        for _ in 0..500 {
            let value = rng.int_between(5, 2);
            assert!((2..=5).contains(&value));
            seen[(value - 2) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(rng.int_between(7, 7), 7);
    }

    #[test]
    fn random_stays_in_unit_interval() {
        let mut rng = BingoRng::from_seed_str("unit");
        for _ in 0..1000 {
            let value = rng.random();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn pick_from_empty_slice_is_none() {
        let mut rng = BingoRng::from_seed_str("empty");
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
        assert_eq!(rng.pick(&[42]), Some(&42));
    }
}
