//! SQLite-backed implementation of every collaborator the plan service
//! needs, plus the profile and catalog management used by the CLI.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use crate::error::{FitError, Result};
use crate::models::{
    CatalogExercise, ExerciseLog, ExerciseSearch, NewExercise, Plan, Profile, SessionLog, Week,
};
use crate::service::{ExerciseCatalog, PlanStore, ProfileSource, SessionLogStore};
use crate::types::{ActivityLevel, Gender, Goal, PlanStatus, SessionType};
use crate::utils::{format_date, parse_date, parse_timestamp};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        let activity = profile
            .activity_level
            .map(|l| l.as_str())
            .unwrap_or("unspecified");

        sqlx::query(
            r#"
            INSERT INTO profiles
                (owner_id, activity_level, goal, equipment_json, weight_kg,
                 target_weight_kg, height_cm, gender, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(owner_id) DO UPDATE SET
                activity_level   = excluded.activity_level,
                goal             = excluded.goal,
                equipment_json   = excluded.equipment_json,
                weight_kg        = excluded.weight_kg,
                target_weight_kg = excluded.target_weight_kg,
                height_cm        = excluded.height_cm,
                gender           = excluded.gender,
                updated_at       = excluded.updated_at
            "#,
        )
        .bind(&profile.owner_id)
        .bind(activity)
        .bind(profile.goal.as_str())
        .bind(serde_json::to_string(&profile.equipment)?)
        .bind(profile.weight_kg)
        .bind(profile.target_weight_kg)
        .bind(profile.height_cm)
        .bind(profile.gender.map(|g| g.code()))
        .bind(profile.created_at.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a catalog exercise; `Ok(None)` when one with the same name
    /// already exists for that owner (or publicly).
    pub async fn add_exercise(&self, new: &NewExercise) -> Result<Option<CatalogExercise>> {
        let exercise = CatalogExercise {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            body_part: Some(new.body_part.clone()),
            equipment: new.equipment.clone(),
            target: new.target.clone(),
            difficulty: new.difficulty.clone(),
            owner_id: new.owner_id.clone(),
            is_public: new.is_public,
        };

        let res = sqlx::query(
            r#"
            INSERT OR IGNORE INTO exercises
                (id, name, body_part, equipment_json, target, difficulty,
                 owner_id, is_public, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&exercise.id)
        .bind(&exercise.name)
        .bind(exercise.body_part.as_deref())
        .bind(serde_json::to_string(&exercise.equipment)?)
        .bind(exercise.target.as_deref())
        .bind(exercise.difficulty.as_deref())
        .bind(exercise.owner_id.as_deref())
        .bind(exercise.is_public)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok((res.rows_affected() == 1).then_some(exercise))
    }

    /// Delete an exercise the owner created. Public catalog entries are
    /// removable only when `owner_id` is `None`.
    pub async fn delete_exercise(&self, id: &str, owner_id: Option<&str>) -> Result<bool> {
        let res = sqlx::query("DELETE FROM exercises WHERE id = ?1 AND owner_id IS ?2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

fn json_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn row_to_profile(row: &SqliteRow) -> Profile {
    let owner_id: String = row.get("owner_id");
    let activity_raw: String = row.get("activity_level");
    let activity_level = match activity_raw.parse::<ActivityLevel>() {
        Ok(level) => Some(level),
        Err(_) => {
            tracing::warn!(owner = %owner_id, value = %activity_raw, "unrecognised activity level, using defaults");
            None
        }
    };
    let goal: String = row.get("goal");
    let equipment: String = row.get("equipment_json");
    let gender: Option<String> = row.get("gender");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Profile {
        owner_id,
        activity_level,
        goal: goal.parse().unwrap_or(Goal::Maintain),
        equipment: json_list(&equipment),
        weight_kg: row.get("weight_kg"),
        target_weight_kg: row.get("target_weight_kg"),
        height_cm: row.get("height_cm"),
        gender: gender.as_deref().and_then(Gender::from_code),
        created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
        updated_at: parse_timestamp(&updated_at).unwrap_or_else(Utc::now),
    }
}

fn row_to_exercise(row: &SqliteRow) -> CatalogExercise {
    let equipment: String = row.get("equipment_json");
    CatalogExercise {
        id: row.get("id"),
        name: row.get("name"),
        body_part: row.get("body_part"),
        equipment: json_list(&equipment),
        target: row.get("target"),
        difficulty: row.get("difficulty"),
        owner_id: row.get("owner_id"),
        is_public: row.get("is_public"),
    }
}

fn row_to_plan(row: &SqliteRow) -> Result<Plan> {
    let weeks_json: String = row.get("weeks_json");
    let weeks: Vec<Week> = serde_json::from_str(&weeks_json)?;
    let goal: String = row.get("goal");
    let focus: String = row.get("focus");
    let status: String = row.get("status");
    let start_date: String = row.get("start_date");
    let end_date: String = row.get("end_date");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    let duration_weeks: i64 = row.get("duration_weeks");

    Ok(Plan {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        goal: goal.parse().unwrap_or_default(),
        focus: focus.parse()?,
        duration_weeks: u32::try_from(duration_weeks).unwrap_or(0),
        start_date: parse_date(&start_date)?,
        end_date: parse_date(&end_date)?,
        weeks,
        status: status.parse()?,
        created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
        updated_at: parse_timestamp(&updated_at).unwrap_or_else(Utc::now),
    })
}

fn row_to_log(row: &SqliteRow) -> Result<SessionLog> {
    let exercises_json: String = row.get("exercises_json");
    let exercises: Vec<ExerciseLog> = serde_json::from_str(&exercises_json)?;
    let date: String = row.get("date");
    let session_type: String = row.get("session_type");
    let duration: i64 = row.get("duration_minutes");
    let calories: i64 = row.get("calories_burned");
    let created_at: String = row.get("created_at");

    Ok(SessionLog {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        plan_id: row.get("plan_id"),
        session_id: row.get("session_id"),
        date: parse_date(&date)?,
        session_type: session_type.parse().unwrap_or(SessionType::Mixed),
        duration_minutes: u32::try_from(duration).unwrap_or(0),
        calories_burned: u32::try_from(calories).unwrap_or(0),
        notes: row.get("notes"),
        exercises,
        created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
    })
}

#[async_trait]
impl ProfileSource for SqliteStore {
    async fn get_profile(&self, owner_id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_profile))
    }
}

#[async_trait]
impl ExerciseCatalog for SqliteStore {
    async fn search_exercises(&self, filter: &ExerciseSearch) -> Result<Vec<CatalogExercise>> {
        let rows = sqlx::query(
            r#"
            SELECT *
            FROM   exercises e
            WHERE  (e.is_public = 1 OR (?1 IS NOT NULL AND e.owner_id = ?1))
              AND  (?2 IS NULL OR e.name LIKE '%' || ?2 || '%')
              AND  (?3 IS NULL OR lower(e.body_part) = lower(?3))
              AND  (?4 IS NULL OR EXISTS (
                        SELECT 1 FROM json_each(e.equipment_json) j
                        WHERE lower(j.value) = lower(?4)))
            ORDER  BY e.name, e.id
            "#,
        )
        .bind(filter.visible_to.as_deref())
        .bind(filter.name.as_deref())
        .bind(filter.body_part.as_deref())
        .bind(filter.equipment.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_exercise).collect())
    }

    async fn get_exercise(&self, id: &str) -> Result<Option<CatalogExercise>> {
        let row = sqlx::query("SELECT * FROM exercises WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_exercise))
    }
}

#[async_trait]
impl PlanStore for SqliteStore {
    async fn create_plan(&self, plan: Plan) -> Result<Plan> {
        sqlx::query(
            r#"
            INSERT INTO plans
                (id, owner_id, name, description, goal, focus, duration_weeks,
                 start_date, end_date, status, weeks_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&plan.id)
        .bind(&plan.owner_id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.goal.as_str())
        .bind(plan.focus.as_str())
        .bind(i64::from(plan.duration_weeks))
        .bind(format_date(plan.start_date))
        .bind(format_date(plan.end_date))
        .bind(plan.status.as_str())
        .bind(serde_json::to_string(&plan.weeks)?)
        .bind(plan.created_at.to_rfc3339())
        .bind(plan.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn update_plan(&self, plan: &Plan) -> Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE plans
            SET    name = ?2,
                   description = ?3,
                   status = ?4,
                   weeks_json = ?5,
                   updated_at = ?6
            WHERE  id = ?1
            "#,
        )
        .bind(&plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.status.as_str())
        .bind(serde_json::to_string(&plan.weeks)?)
        .bind(plan.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(FitError::not_found("plan", plan.id.clone()));
        }
        Ok(())
    }

    async fn get_plan(&self, plan_id: &str) -> Result<Option<Plan>> {
        let row = sqlx::query("SELECT * FROM plans WHERE id = ?")
            .bind(plan_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_plan).transpose()
    }

    async fn get_active_plan(&self, owner_id: &str) -> Result<Option<Plan>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM plans
            WHERE  owner_id = ? AND status = ?
            ORDER  BY created_at DESC
            LIMIT  1
            "#,
        )
        .bind(owner_id)
        .bind(PlanStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_plan).transpose()
    }

    async fn list_plans(&self, owner_id: &str) -> Result<Vec<Plan>> {
        let rows = sqlx::query("SELECT * FROM plans WHERE owner_id = ? ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_plan).collect()
    }

    async fn delete_plan(&self, plan_id: &str) -> Result<bool> {
        let res = sqlx::query("DELETE FROM plans WHERE id = ?")
            .bind(plan_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl SessionLogStore for SqliteStore {
    async fn create_log(&self, log: SessionLog) -> Result<SessionLog> {
        sqlx::query(
            r#"
            INSERT INTO session_logs
                (id, owner_id, plan_id, session_id, date, session_type,
                 duration_minutes, calories_burned, notes, exercises_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&log.id)
        .bind(&log.owner_id)
        .bind(log.plan_id.as_deref())
        .bind(log.session_id.as_deref())
        .bind(format_date(log.date))
        .bind(log.session_type.as_str())
        .bind(i64::from(log.duration_minutes))
        .bind(i64::from(log.calories_burned))
        .bind(log.notes.as_deref())
        .bind(serde_json::to_string(&log.exercises)?)
        .bind(log.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(log)
    }

    async fn get_log(&self, log_id: &str) -> Result<Option<SessionLog>> {
        let row = sqlx::query("SELECT * FROM session_logs WHERE id = ?")
            .bind(log_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_log).transpose()
    }

    async fn list_logs(
        &self,
        owner_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<SessionLog>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM session_logs
            WHERE  owner_id = ?1
              AND  (?2 IS NULL OR date >= ?2)
              AND  (?3 IS NULL OR date <= ?3)
            ORDER  BY date DESC, created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(from.map(format_date))
        .bind(to.map(format_date))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_log).collect()
    }

    async fn list_logs_for_plan(&self, plan_id: &str) -> Result<Vec<SessionLog>> {
        let rows = sqlx::query("SELECT * FROM session_logs WHERE plan_id = ? ORDER BY date DESC")
            .bind(plan_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_log).collect()
    }

    async fn delete_log(&self, log_id: &str) -> Result<bool> {
        let res = sqlx::query("DELETE FROM session_logs WHERE id = ?")
            .bind(log_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlanRequest, SetLog};
    use crate::service::PlanService;
    use crate::test_utils::{seed_catalog, seed_profile, setup_test_store};
    use crate::types::{Focus, SessionStatus};

    #[tokio::test]
    async fn test_profile_roundtrip() {
        let store = setup_test_store().await;
        let profile = seed_profile(&store, "alice", ActivityLevel::High, &["Dumbbell"]).await;

        let loaded = store.get_profile("alice").await.unwrap().unwrap();
        assert_eq!(loaded.activity_level, Some(ActivityLevel::High));
        assert_eq!(loaded.equipment, profile.equipment);
        assert_eq!(loaded.weight_kg, 80.0);
        assert!(store.get_profile("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_activity_level_loads_as_default() {
        let store = setup_test_store().await;
        seed_profile(&store, "alice", ActivityLevel::High, &[]).await;
        sqlx::query("UPDATE profiles SET activity_level = 'athlete' WHERE owner_id = 'alice'")
            .execute(store.pool())
            .await
            .unwrap();

        let loaded = store.get_profile("alice").await.unwrap().unwrap();
        assert_eq!(loaded.activity_level, None);
    }

    #[tokio::test]
    async fn test_search_orders_by_name_and_filters_visibility() {
        let store = setup_test_store().await;
        seed_catalog(&store).await;
        store
            .add_exercise(&NewExercise {
                name: "Aardvark Crawl".into(),
                body_part: "waist".into(),
                equipment: vec![],
                target: None,
                difficulty: None,
                owner_id: Some("bob".into()),
                is_public: false,
            })
            .await
            .unwrap()
            .unwrap();

        let alice = store
            .search_exercises(&ExerciseSearch::visible_to("alice"))
            .await
            .unwrap();
        let names: Vec<&str> = alice.iter().map(|e| e.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(!names.contains(&"Aardvark Crawl"));

        let bob = store
            .search_exercises(&ExerciseSearch::visible_to("bob"))
            .await
            .unwrap();
        assert_eq!(bob[0].name, "Aardvark Crawl");
    }

    #[tokio::test]
    async fn test_search_by_body_part_and_equipment() {
        let store = setup_test_store().await;
        seed_catalog(&store).await;

        let cardio = store
            .search_exercises(&ExerciseSearch {
                body_part: Some("Cardio".into()),
                ..ExerciseSearch::default()
            })
            .await
            .unwrap();
        assert!(!cardio.is_empty());
        assert!(cardio.iter().all(|e| e.is_cardio()));

        let dumbbell = store
            .search_exercises(&ExerciseSearch {
                equipment: Some("dumbbell".into()),
                ..ExerciseSearch::default()
            })
            .await
            .unwrap();
        assert!(!dumbbell.is_empty());
        assert!(dumbbell.iter().all(|e| e.equipment.iter().any(|t| t == "dumbbell")));
    }

    #[tokio::test]
    async fn test_duplicate_exercise_is_ignored() {
        let store = setup_test_store().await;
        let new = NewExercise {
            name: "Plank".into(),
            body_part: "waist".into(),
            equipment: vec![],
            target: None,
            difficulty: None,
            owner_id: None,
            is_public: true,
        };
        assert!(store.add_exercise(&new).await.unwrap().is_some());
        assert!(store.add_exercise(&new).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_exercise_checks_owner() {
        let store = setup_test_store().await;
        let mine = store
            .add_exercise(&NewExercise {
                name: "Band Pull-apart".into(),
                body_part: "shoulders".into(),
                equipment: vec!["band".into()],
                target: None,
                difficulty: None,
                owner_id: Some("alice".into()),
                is_public: false,
            })
            .await
            .unwrap()
            .unwrap();

        assert!(!store.delete_exercise(&mine.id, Some("bob")).await.unwrap());
        assert!(!store.delete_exercise(&mine.id, None).await.unwrap());
        assert!(store.delete_exercise(&mine.id, Some("alice")).await.unwrap());
        assert!(store.get_exercise(&mine.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_plan_persistence_through_service() {
        let store = setup_test_store().await;
        seed_catalog(&store).await;
        seed_profile(&store, "alice", ActivityLevel::Moderate, &["dumbbell"]).await;

        let service = PlanService::new(store.clone());
        let request = PlanRequest {
            focus: Focus::General,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..PlanRequest::new("Winter base")
        };
        let plan = service.activate_new_plan("alice", &request).await.unwrap();

        let active = store.get_active_plan("alice").await.unwrap().unwrap();
        assert_eq!(active.id, plan.id);
        assert_eq!(active.weeks, plan.weeks);
        assert_eq!(active.end_date, NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());

        let session_id = plan.weeks[0].sessions[0].id.clone();
        service
            .set_session_status("alice", &plan.id, &session_id, SessionStatus::Completed)
            .await
            .unwrap();
        let reloaded = store.get_plan(&plan.id).await.unwrap().unwrap();
        assert_eq!(reloaded.completed_sessions(), 1);

        assert!(store.delete_plan(&plan.id).await.unwrap());
        assert!(store.get_plan(&plan.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_plan_is_not_found() {
        let store = setup_test_store().await;
        seed_catalog(&store).await;
        seed_profile(&store, "alice", ActivityLevel::Light, &[]).await;
        let service = PlanService::new(store.clone());
        let plan = service
            .generate_plan("alice", &PlanRequest::new("Never stored"))
            .await
            .unwrap();

        let err = store.update_plan(&plan).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_log_window_and_plan_filters() {
        let store = setup_test_store().await;
        seed_profile(&store, "alice", ActivityLevel::Light, &[]).await;
        let service = PlanService::new(store.clone());

        for (day, plan_id) in [(1, Some("p1")), (5, None), (20, Some("p1"))] {
            service
                .log_session(
                    "alice",
                    crate::models::NewSessionLog {
                        plan_id: plan_id.map(String::from),
                        date: NaiveDate::from_ymd_opt(2024, 1, day),
                        session_type: SessionType::Cardio,
                        duration_minutes: 30,
                        exercises: vec![crate::models::NewExerciseLog {
                            exercise_id: "missing".into(),
                            sets: vec![SetLog {
                                set_number: 1,
                                reps: None,
                                weight_kg: None,
                                duration_seconds: Some(600),
                                completed: true,
                            }],
                            completed: true,
                        }],
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let window = store
            .list_logs(
                "alice",
                NaiveDate::from_ymd_opt(2024, 1, 1),
                NaiveDate::from_ymd_opt(2024, 1, 10),
            )
            .await
            .unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].calories_burned, 24);
        assert_eq!(window[0].exercises[0].sets[0].duration_seconds, Some(600));

        let for_plan = store.list_logs_for_plan("p1").await.unwrap();
        assert_eq!(for_plan.len(), 2);

        let all = store.list_logs("alice", None, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(store.delete_log(&all[0].id).await.unwrap());
        assert_eq!(store.list_logs("alice", None, None).await.unwrap().len(), 2);
    }
}
