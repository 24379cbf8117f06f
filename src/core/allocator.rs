//! Spot allocator: owns the free/occupied partition of spots.
//!
//! Free spots are kept per type in ordered sets keyed by [`SpotId`], so
//! `reserve` always hands out the lowest floor, then the lowest number. The
//! allocator itself is not synchronised; the facility serialises access to it
//! together with the session ledger.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{Occupancy, ParkingError, ParkingSpot, SpotId, SpotType};

/// Free/occupied bookkeeping for every spot of the facility.
#[derive(Debug, Clone, Default)]
pub struct SpotAllocator {
    spots: BTreeMap<SpotId, ParkingSpot>,
    free: BTreeMap<SpotType, BTreeSet<SpotId>>,
}

impl SpotAllocator {
    /// Build an allocator over `spots`, all free.
    ///
    /// Stored occupancy flags are ignored: occupancy is derived from open
    /// sessions and re-applied with [`SpotAllocator::occupy`].
    pub fn new(spots: impl IntoIterator<Item = ParkingSpot>) -> Self {
        let mut allocator = Self::default();
        for spot in spots {
            let spot = ParkingSpot::free(spot.id, spot.spot_type);
            allocator
                .free
                .entry(spot.spot_type)
                .or_default()
                .insert(spot.id);
            allocator.spots.insert(spot.id, spot);
        }
        allocator
    }

    /// Reserve the first free spot of `spot_type`.
    pub fn reserve(&mut self, spot_type: SpotType) -> Result<SpotId, ParkingError> {
        let id = self
            .free
            .get_mut(&spot_type)
            .and_then(BTreeSet::pop_first)
            .ok_or(ParkingError::NoSpotAvailable { spot_type })?;
        if let Some(spot) = self.spots.get_mut(&id) {
            spot.occupancy = Occupancy::Occupied;
        }
        tracing::debug!(spot = %id, %spot_type, "reserved spot");
        Ok(id)
    }

    /// Return an occupied spot to the free pool.
    pub fn release(&mut self, id: SpotId) -> Result<(), ParkingError> {
        let spot = self
            .spots
            .get_mut(&id)
            .ok_or(ParkingError::UnknownSpot(id))?;
        if !spot.is_occupied() {
            return Err(ParkingError::SpotNotOccupied(id));
        }
        spot.occupancy = Occupancy::Free;
        self.free.entry(spot.spot_type).or_default().insert(id);
        tracing::debug!(spot = %id, "released spot");
        Ok(())
    }

    /// Mark a specific free spot occupied. Used when restoring open sessions
    /// and when undoing a release.
    pub fn occupy(&mut self, id: SpotId) -> Result<(), ParkingError> {
        let spot = self
            .spots
            .get_mut(&id)
            .ok_or(ParkingError::UnknownSpot(id))?;
        if spot.is_occupied() {
            return Err(ParkingError::SpotAlreadyOccupied(id));
        }
        spot.occupancy = Occupancy::Occupied;
        if let Some(free) = self.free.get_mut(&spot.spot_type) {
            free.remove(&id);
        }
        Ok(())
    }

    /// Look up a spot.
    pub fn spot(&self, id: SpotId) -> Option<&ParkingSpot> {
        self.spots.get(&id)
    }

    /// All spots in allocation order.
    pub fn spots(&self) -> impl Iterator<Item = &ParkingSpot> {
        self.spots.values()
    }

    /// Number of spots.
    pub fn total(&self) -> usize {
        self.spots.len()
    }

    /// Number of free spots of `spot_type`.
    pub fn free_count(&self, spot_type: SpotType) -> usize {
        self.free.get(&spot_type).map_or(0, BTreeSet::len)
    }

    /// Number of occupied spots.
    pub fn occupied_count(&self) -> usize {
        let free: usize = self.free.values().map(BTreeSet::len).sum();
        self.spots.len() - free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Vec<ParkingSpot> {
        vec![
            ParkingSpot::free(SpotId::new(2, 1), SpotType::Regular),
            ParkingSpot::free(SpotId::new(1, 2), SpotType::Regular),
            ParkingSpot::free(SpotId::new(1, 1), SpotType::Vip),
            ParkingSpot::free(SpotId::new(1, 3), SpotType::Regular),
        ]
    }

    #[test]
    fn test_reserve_lowest_floor_then_number() {
        let mut allocator = SpotAllocator::new(layout());
        assert_eq!(allocator.reserve(SpotType::Regular).unwrap(), SpotId::new(1, 2));
        assert_eq!(allocator.reserve(SpotType::Regular).unwrap(), SpotId::new(1, 3));
        assert_eq!(allocator.reserve(SpotType::Regular).unwrap(), SpotId::new(2, 1));
        assert!(matches!(
            allocator.reserve(SpotType::Regular),
            Err(ParkingError::NoSpotAvailable { spot_type: SpotType::Regular })
        ));
    }

    #[test]
    fn test_release_then_reserve_returns_same_spot() {
        let mut allocator = SpotAllocator::new(layout());
        let first = allocator.reserve(SpotType::Regular).unwrap();
        let _second = allocator.reserve(SpotType::Regular).unwrap();
        allocator.release(first).unwrap();
        assert_eq!(allocator.reserve(SpotType::Regular).unwrap(), first);
    }

    #[test]
    fn test_release_errors() {
        let mut allocator = SpotAllocator::new(layout());
        assert!(matches!(
            allocator.release(SpotId::new(1, 2)),
            Err(ParkingError::SpotNotOccupied(_))
        ));
        assert!(matches!(
            allocator.release(SpotId::new(9, 9)),
            Err(ParkingError::UnknownSpot(_))
        ));
    }

    #[test]
    fn test_occupy_specific_spot() {
        let mut allocator = SpotAllocator::new(layout());
        allocator.occupy(SpotId::new(1, 2)).unwrap();
        assert_eq!(allocator.reserve(SpotType::Regular).unwrap(), SpotId::new(1, 3));
        assert!(matches!(
            allocator.occupy(SpotId::new(1, 2)),
            Err(ParkingError::SpotAlreadyOccupied(_))
        ));
        assert_eq!(allocator.occupied_count(), 2);
        assert_eq!(allocator.free_count(SpotType::Regular), 1);
    }

    #[test]
    fn test_stored_occupancy_is_ignored() {
        let mut spots = layout();
        spots[0].occupancy = Occupancy::Occupied;
        let allocator = SpotAllocator::new(spots);
        assert_eq!(allocator.occupied_count(), 0);
        assert_eq!(allocator.total(), 4);
    }
}
