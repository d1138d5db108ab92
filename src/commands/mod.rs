pub mod calendar;
pub mod config;
pub mod exercise;
pub mod log;
pub mod plan;
pub mod profile;
pub mod status;

use fittrack::{OutputFmt, PlanService, SqliteStore, models::Plan};

/// Everything a handler needs: the service, who is acting and how to print.
pub struct Ctx {
    pub service: PlanService<SqliteStore>,
    pub user: String,
    pub fmt: OutputFmt,
}

impl Ctx {
    pub fn store(&self) -> &SqliteStore {
        self.service.backend()
    }

    /// The named plan, or the user's active plan when none is given.
    pub async fn plan_or_active(&self, plan: Option<&str>) -> fittrack::Result<Plan> {
        match plan {
            Some(id) => self.service.owned_plan(&self.user, id).await,
            None => self.service.active_plan(&self.user).await,
        }
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Strip ANSI escapes when measuring column widths.
pub fn plain_len(s: &str) -> usize {
    let mut count = 0;
    let mut in_escape = false;
    for c in s.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => count += 1,
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::Colorize;

    #[test]
    fn test_plain_len_ignores_color() {
        colored::control::set_override(true);
        let painted = format!("{} x", "abc".green().bold());
        assert_eq!(plain_len(&painted), 5);
        assert_eq!(plain_len("plain"), 5);
    }
}
