//! Exercise selection for a single session.

use std::collections::HashSet;

use crate::models::{CatalogExercise, Profile};
use crate::types::{SessionType, canonical_equipment};

pub const CARDIO_PICKS: usize = 3;
pub const STRENGTH_PICKS: usize = 4;
pub const HIIT_CARDIO_PICKS: usize = 2;
pub const HIIT_STRENGTH_PICKS: usize = 3;
pub const MIXED_PICKS: usize = 5;
pub const MIN_EXERCISES: usize = 3;

/// Narrow a catalog listing to exercises the profile can perform.
///
/// An exercise qualifies when it needs no equipment, or when every piece it
/// needs is in the profile's equipment. Catalog order is preserved.
pub fn candidate_pool(catalog: Vec<CatalogExercise>, profile: &Profile) -> Vec<CatalogExercise> {
    let available: HashSet<String> = profile.equipment.iter().map(canonical_equipment).collect();

    catalog
        .into_iter()
        .filter(|e| {
            e.equipment
                .iter()
                .all(|tag| available.contains(&canonical_equipment(tag)))
        })
        .collect()
}

/// Pick the exercises for a session of `session_type` from `pool`.
///
/// Selection takes prefixes of the pool, so the result is only as stable as
/// the pool's ordering. When fewer than three are chosen the rest of the
/// pool backfills, in order, until three are reached or it runs out.
pub fn select<'a>(pool: &'a [CatalogExercise], session_type: SessionType) -> Vec<&'a CatalogExercise> {
    let cardio = || pool.iter().filter(|e| e.is_cardio());
    let non_cardio = || pool.iter().filter(|e| !e.is_cardio());

    let mut selected: Vec<&CatalogExercise> = match session_type {
        SessionType::Cardio => cardio().take(CARDIO_PICKS).collect(),
        SessionType::Strength => non_cardio().take(STRENGTH_PICKS).collect(),
        SessionType::Hiit => cardio()
            .take(HIIT_CARDIO_PICKS)
            .chain(non_cardio().take(HIIT_STRENGTH_PICKS))
            .collect(),
        SessionType::Mixed => pool.iter().take(MIXED_PICKS).collect(),
    };

    if selected.len() < MIN_EXERCISES {
        let taken: HashSet<&str> = selected.iter().map(|e| e.id.as_str()).collect();
        let missing = MIN_EXERCISES - selected.len();
        let extra: Vec<&CatalogExercise> = pool
            .iter()
            .filter(|e| !taken.contains(e.id.as_str()))
            .take(missing)
            .collect();
        selected.extend(extra);
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(id: &str, body_part: &str, equipment: &[&str]) -> CatalogExercise {
        CatalogExercise {
            id: id.into(),
            name: id.into(),
            body_part: Some(body_part.into()),
            equipment: equipment.iter().map(|s| s.to_string()).collect(),
            target: None,
            difficulty: None,
            owner_id: None,
            is_public: true,
        }
    }

    fn ids(selected: &[&CatalogExercise]) -> Vec<String> {
        selected.iter().map(|e| e.id.clone()).collect()
    }

    fn profile_with(equipment: &[&str]) -> Profile {
        let mut p = Profile::new("alice");
        p.equipment = equipment.iter().map(|s| s.to_string()).collect();
        p
    }

    fn mixed_pool() -> Vec<CatalogExercise> {
        vec![
            ex("c1", "cardio", &[]),
            ex("s1", "chest", &[]),
            ex("c2", "cardio", &[]),
            ex("s2", "back", &[]),
            ex("c3", "cardio", &[]),
            ex("s3", "upper legs", &[]),
            ex("c4", "cardio", &[]),
            ex("s4", "waist", &[]),
            ex("s5", "shoulders", &[]),
        ]
    }

    #[test]
    fn test_pool_without_equipment_keeps_only_bodyweight() {
        let catalog = vec![
            ex("a", "chest", &[]),
            ex("b", "chest", &["dumbbell"]),
            ex("c", "cardio", &[]),
        ];
        let pool = candidate_pool(catalog, &profile_with(&[]));
        assert_eq!(pool.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_pool_requires_all_equipment_available() {
        let catalog = vec![
            ex("a", "chest", &["dumbbell"]),
            ex("b", "chest", &["dumbbell", "bench"]),
            ex("c", "back", &["Barbell"]),
            ex("d", "waist", &[]),
        ];
        let pool = candidate_pool(catalog, &profile_with(&["Dumbbell", "barbell"]));
        assert_eq!(
            pool.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "c", "d"]
        );
    }

    #[test]
    fn test_cardio_takes_three_cardio() {
        let pool = mixed_pool();
        assert_eq!(ids(&select(&pool, SessionType::Cardio)), vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_strength_takes_four_non_cardio() {
        let pool = mixed_pool();
        assert_eq!(
            ids(&select(&pool, SessionType::Strength)),
            vec!["s1", "s2", "s3", "s4"]
        );
    }

    #[test]
    fn test_hiit_is_cardio_first_then_strength() {
        let pool = mixed_pool();
        assert_eq!(
            ids(&select(&pool, SessionType::Hiit)),
            vec!["c1", "c2", "s1", "s2", "s3"]
        );
    }

    #[test]
    fn test_mixed_takes_pool_prefix() {
        let pool = mixed_pool();
        assert_eq!(
            ids(&select(&pool, SessionType::Mixed)),
            vec!["c1", "s1", "c2", "s2", "c3"]
        );
    }

    #[test]
    fn test_backfill_up_to_three() {
        let pool = vec![
            ex("c1", "cardio", &[]),
            ex("s1", "chest", &[]),
            ex("s2", "back", &[]),
            ex("s3", "waist", &[]),
        ];
        assert_eq!(ids(&select(&pool, SessionType::Cardio)), vec!["c1", "s1", "s2"]);
    }

    #[test]
    fn test_backfill_stops_when_pool_exhausted() {
        let pool = vec![ex("s1", "chest", &[]), ex("s2", "back", &[])];
        assert_eq!(ids(&select(&pool, SessionType::Cardio)), vec!["s1", "s2"]);
    }

    #[test]
    fn test_empty_pool_yields_empty_selection() {
        assert!(select(&[], SessionType::Hiit).is_empty());
    }
}
