//! Shared fixtures for the async storage and service tests.

use crate::db;
use crate::models::{NewExercise, Profile};
use crate::storage::SqliteStore;
use crate::types::ActivityLevel;

/// Fresh in-memory store with the schema applied.
pub async fn setup_test_store() -> SqliteStore {
    let pool = db::open_in_memory()
        .await
        .expect("Failed to create in-memory database");
    SqliteStore::new(pool)
}

/// Store an 80 kg profile for `owner` with the given equipment.
pub async fn seed_profile(
    store: &SqliteStore,
    owner: &str,
    level: ActivityLevel,
    equipment: &[&str],
) -> Profile {
    let mut profile = Profile::new(owner);
    profile.activity_level = Some(level);
    profile.weight_kg = 80.0;
    profile.target_weight_kg = 75.0;
    profile.height_cm = Some(180.0);
    profile.equipment = equipment.iter().map(|e| e.to_lowercase()).collect();

    store
        .upsert_profile(&profile)
        .await
        .expect("Failed to seed profile");
    profile
}

/// A small public catalog: three bodyweight cardio moves, three bodyweight
/// strength moves and two that need equipment.
pub async fn seed_catalog(store: &SqliteStore) {
    let entries: [(&str, &str, &[&str]); 8] = [
        ("Burpee", "cardio", &[]),
        ("Jumping Jacks", "cardio", &[]),
        ("Mountain Climber", "cardio", &[]),
        ("Push-up", "chest", &[]),
        ("Plank", "waist", &[]),
        ("Bodyweight Squat", "upper legs", &[]),
        ("Dumbbell Row", "back", &["dumbbell"]),
        ("Barbell Deadlift", "back", &["barbell"]),
    ];

    for (name, body_part, equipment) in entries {
        store
            .add_exercise(&NewExercise {
                name: name.into(),
                body_part: body_part.into(),
                equipment: equipment.iter().map(|e| e.to_string()).collect(),
                target: None,
                difficulty: Some("beginner".into()),
                owner_id: None,
                is_public: true,
            })
            .await
            .expect("Failed to seed exercise");
    }
}
