use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Reverse;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub priority: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_published
            && self.scheduled_at.map_or(true, |at| at <= now)
            && self.expires_at.map_or(true, |at| at >= now)
    }

    /// `high` sorts first, then `normal`, then everything else. Matching is
    /// exact, so `HIGH` lands in the last tier.
    pub fn priority_rank(&self) -> u8 {
        match self.priority.as_str() {
            "high" => 0,
            "normal" => 1,
            _ => 2,
        }
    }
}

/// Public feed: visible announcements by priority tier, newest first within
/// a tier.
pub fn visible_feed(items: Vec<Announcement>, now: DateTime<Utc>) -> Vec<Announcement> {
    let mut visible: Vec<Announcement> = items
        .into_iter()
        .filter(|a| a.is_visible_at(now))
        .collect();
    visible.sort_by_key(|a| (a.priority_rank(), Reverse(a.created_at)));
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn announcement(priority: &str) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            title: "Drive update".into(),
            content: "Details".into(),
            priority: priority.into(),
            scheduled_at: None,
            expires_at: None,
            is_published: true,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn published_without_window_is_visible() {
        assert!(announcement("normal").is_visible_at(Utc::now()));
    }

    #[test]
    fn expired_is_hidden() {
        let now = Utc::now();
        let mut a = announcement("normal");
        a.expires_at = Some(now - Duration::hours(1));
        assert!(!a.is_visible_at(now));
    }

    #[test]
    fn future_schedule_is_hidden() {
        let now = Utc::now();
        let mut a = announcement("normal");
        a.scheduled_at = Some(now + Duration::hours(1));
        assert!(!a.is_visible_at(now));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = Utc::now();
        let mut a = announcement("normal");
        a.scheduled_at = Some(now);
        a.expires_at = Some(now);
        assert!(a.is_visible_at(now));
    }

    #[test]
    fn unpublished_is_hidden() {
        let mut a = announcement("high");
        a.is_published = false;
        assert!(!a.is_visible_at(Utc::now()));
    }

    #[test]
    fn feed_orders_by_tier_then_recency() {
        let now = Utc::now();
        let mut old_high = announcement("high");
        old_high.created_at = now - Duration::days(3);
        let mut new_high = announcement("high");
        new_high.created_at = now - Duration::days(1);
        let mut low = announcement("low");
        low.created_at = now;
        let mut normal = announcement("normal");
        normal.created_at = now - Duration::days(2);
        let mut hidden = announcement("high");
        hidden.expires_at = Some(now - Duration::minutes(1));

        let feed = visible_feed(
            vec![low.clone(), old_high.clone(), hidden, normal.clone(), new_high.clone()],
            now,
        );
        let ids: Vec<Uuid> = feed.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![new_high.id, old_high.id, normal.id, low.id]);
    }

    #[test]
    fn priority_tiers_match_exactly() {
        assert_eq!(announcement("high").priority_rank(), 0);
        assert_eq!(announcement("normal").priority_rank(), 1);
        assert_eq!(announcement("HIGH").priority_rank(), 2);
        assert_eq!(announcement("Normal").priority_rank(), 2);
        assert_eq!(announcement("").priority_rank(), 2);
    }
}
