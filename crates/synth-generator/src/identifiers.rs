//! Batch-scoped unique identifier generation.
//!
//! Bounded classes (visit numbers, MRNs, filler order bases) are issued
//! from a counter walked through a random affine permutation of the class's
//! value space, so a batch sized at exactly the class capacity drains the
//! space completely: every value is issued once and only the draw past
//! capacity fails. The unbounded UUID class keeps a plain random draw with
//! a collision re-draw. The registry grows monotonically for the duration
//! of a batch and is never shared across batches.

use crate::error::GenerateError;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Collision re-draw cap for the unbounded UUID class. Hitting it means
/// the random source is broken; surfacing an error beats spinning forever.
const MAX_DRAW_ATTEMPTS: u32 = 4096;

/// Identifier classes with uniqueness guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdClass {
    /// MSH-10 message control ID (UUID v4).
    MessageControlId,
    /// PV1-19 visit number (nine digits, zero-padded).
    VisitNumber,
    /// PID-3 medical record number (`MRN` + seven digits).
    MedicalRecordNumber,
    /// OBR-3 filler order base (ten digits, zero-padded); per-group filler
    /// IDs are derived from it with a two-digit suffix.
    FillerOrderBase,
}

impl IdClass {
    /// All classes, in the order the capacity precheck scans them.
    pub const ALL: &'static [IdClass] = &[
        IdClass::MessageControlId,
        IdClass::VisitNumber,
        IdClass::MedicalRecordNumber,
        IdClass::FillerOrderBase,
    ];

    /// Size of the value space, or `None` when it is effectively unbounded.
    pub fn capacity(&self) -> Option<u64> {
        match self {
            IdClass::MessageControlId => None,
            IdClass::VisitNumber => Some(1_000_000_000),
            IdClass::MedicalRecordNumber => Some(10_000_000),
            IdClass::FillerOrderBase => Some(10_000_000_000),
        }
    }

    /// Render a raw value in the class's canonical format.
    fn format(&self, value: u64) -> String {
        match self {
            IdClass::MessageControlId => value.to_string(),
            IdClass::VisitNumber => format!("{value:09}"),
            IdClass::MedicalRecordNumber => format!("MRN{value:07}"),
            IdClass::FillerOrderBase => format!("{value:010}"),
        }
    }
}

impl fmt::Display for IdClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdClass::MessageControlId => "message control ID",
            IdClass::VisitNumber => "visit number",
            IdClass::MedicalRecordNumber => "medical record number",
            IdClass::FillerOrderBase => "filler order base",
        };
        f.write_str(name)
    }
}

/// A random bijection over `0..capacity`, walked by a counter.
///
/// `index -> (index * mult + offset) mod capacity` permutes the space
/// whenever `mult` is coprime with the capacity; class capacities are
/// powers of ten, so any multiplier not divisible by 2 or 5 qualifies.
/// Values look random but the space is guaranteed to drain completely
/// before exhaustion.
#[derive(Debug)]
struct BoundedSequence {
    next: u64,
    mult: u64,
    offset: u64,
    capacity: u64,
}

impl BoundedSequence {
    fn new<R: Rng + ?Sized>(rng: &mut R, capacity: u64) -> Self {
        let mut mult = rng.random_range(1..capacity);
        while mult % 2 == 0 || mult % 5 == 0 {
            mult = rng.random_range(1..capacity);
        }
        Self {
            next: 0,
            mult,
            offset: rng.random_range(0..capacity),
            capacity,
        }
    }

    fn next_value(&mut self) -> Option<u64> {
        if self.next >= self.capacity {
            return None;
        }
        let index = self.next as u128;
        self.next += 1;
        // Capacities reach 10^10, so the product needs 128 bits.
        let value = (index * self.mult as u128 + self.offset as u128) % self.capacity as u128;
        Some(value as u64)
    }

    fn issued(&self) -> u64 {
        self.next
    }
}

/// Batch-scoped registry of issued identifiers.
#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    sequences: HashMap<IdClass, BoundedSequence>,
    issued_uuids: HashSet<String>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new identifier, unique among everything this registry has
    /// returned for the class.
    pub fn next<R: Rng + ?Sized>(
        &mut self,
        class: IdClass,
        rng: &mut R,
    ) -> Result<String, GenerateError> {
        let Some(capacity) = class.capacity() else {
            return self.next_uuid(rng);
        };
        let sequence = self
            .sequences
            .entry(class)
            .or_insert_with(|| BoundedSequence::new(rng, capacity));
        match sequence.next_value() {
            Some(value) => Ok(class.format(value)),
            None => Err(GenerateError::IdentifierSpaceExhausted {
                class,
                capacity,
                requested: capacity + 1,
            }),
        }
    }

    fn next_uuid<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<String, GenerateError> {
        for _ in 0..MAX_DRAW_ATTEMPTS {
            let mut bytes = [0u8; 16];
            rng.fill(&mut bytes);
            let candidate = uuid::Builder::from_random_bytes(bytes)
                .into_uuid()
                .to_string();
            if self.issued_uuids.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        Err(GenerateError::IdentifierSpaceExhausted {
            class: IdClass::MessageControlId,
            capacity: u64::MAX,
            requested: self.issued_uuids.len() as u64 + 1,
        })
    }

    /// Number of identifiers issued so far for a class.
    pub fn issued_count(&self, class: IdClass) -> usize {
        match class.capacity() {
            None => self.issued_uuids.len(),
            Some(_) => self
                .sequences
                .get(&class)
                .map(|s| s.issued() as usize)
                .unwrap_or(0),
        }
    }

    /// Upfront capacity precondition: every bounded class must be able to
    /// cover `requested` documents. Checked before any generation work.
    pub fn check_capacity(requested: u64) -> Result<(), GenerateError> {
        for class in IdClass::ALL {
            if let Some(capacity) = class.capacity() {
                if requested > capacity {
                    return Err(GenerateError::IdentifierSpaceExhausted {
                        class: *class,
                        capacity,
                        requested,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unique_across_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut registry = IdentifierRegistry::new();
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let id = registry.next(IdClass::VisitNumber, &mut rng).unwrap();
            assert!(seen.insert(id));
        }
        assert_eq!(registry.issued_count(IdClass::VisitNumber), 500);
    }

    #[test]
    fn test_formats() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut registry = IdentifierRegistry::new();

        let visit = registry.next(IdClass::VisitNumber, &mut rng).unwrap();
        assert_eq!(visit.len(), 9);
        assert!(visit.chars().all(|c| c.is_ascii_digit()));

        let mrn = registry.next(IdClass::MedicalRecordNumber, &mut rng).unwrap();
        assert!(mrn.starts_with("MRN"));
        assert_eq!(mrn.len(), 10);

        let filler = registry.next(IdClass::FillerOrderBase, &mut rng).unwrap();
        assert_eq!(filler.len(), 10);

        let msg = registry.next(IdClass::MessageControlId, &mut rng).unwrap();
        assert_eq!(msg.len(), 36);
    }

    #[test]
    fn test_seeded_draws_are_deterministic() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        let mut ra = IdentifierRegistry::new();
        let mut rb = IdentifierRegistry::new();
        for _ in 0..10 {
            assert_eq!(
                ra.next(IdClass::MessageControlId, &mut a).unwrap(),
                rb.next(IdClass::MessageControlId, &mut b).unwrap()
            );
            assert_eq!(
                ra.next(IdClass::VisitNumber, &mut a).unwrap(),
                rb.next(IdClass::VisitNumber, &mut b).unwrap()
            );
        }
    }

    #[test]
    fn test_bounded_sequence_drains_full_space() {
        // A capacity-sized run must issue every value exactly once; only
        // the draw past capacity comes up empty.
        let mut rng = StdRng::seed_from_u64(7);
        let mut sequence = BoundedSequence::new(&mut rng, 10_000);
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let value = sequence.next_value().unwrap();
            assert!(value < 10_000);
            assert!(seen.insert(value));
        }
        assert_eq!(seen.len(), 10_000);
        assert!(sequence.next_value().is_none());
        assert_eq!(sequence.issued(), 10_000);
    }

    #[test]
    fn test_multiplier_is_coprime_with_capacity() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let sequence = BoundedSequence::new(&mut rng, 10_000_000);
            assert_ne!(sequence.mult % 2, 0);
            assert_ne!(sequence.mult % 5, 0);
        }
    }

    #[test]
    fn test_largest_capacity_has_no_overflow() {
        // Worst case: last index of the 10^10 space with the largest
        // possible multiplier and offset.
        let mut sequence = BoundedSequence {
            next: 9_999_999_999,
            mult: 9_999_999_999,
            offset: 9_999_999_999,
            capacity: 10_000_000_000,
        };
        let value = sequence.next_value().unwrap();
        assert!(value < 10_000_000_000);
        assert!(sequence.next_value().is_none());
    }

    #[test]
    fn test_capacity_precheck() {
        assert!(IdentifierRegistry::check_capacity(10_000_000).is_ok());
        let err = IdentifierRegistry::check_capacity(10_000_001).unwrap_err();
        match err {
            GenerateError::IdentifierSpaceExhausted {
                class,
                capacity,
                requested,
            } => {
                assert_eq!(class, IdClass::MedicalRecordNumber);
                assert_eq!(capacity, 10_000_000);
                assert_eq!(requested, 10_000_001);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
