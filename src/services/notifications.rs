//! Due-date alert feed for pending tax obligations: scan, dedup, rank,
//! persist to the local slot.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::date_utils::days_until;
use crate::db::queries::obligations;
use crate::error::{AppError, AppResult};
use crate::models::{NotificationCategory, NotificationItem, Priority, TaxObligation};
use crate::state::AppState;

/// Alerts are raised within this many days of the due date.
const ALERT_WINDOW_DAYS: i64 = 10;
/// At or under this many days the alert is high priority.
const HIGH_PRIORITY_DAYS: i64 = 3;

const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Scan pending obligations and append an alert for each one inside the
/// window that is not already in the feed. Returns how many were added.
pub fn refresh_tax_alerts(state: &AppState) -> AppResult<usize> {
    let owner = state.require_owner()?;
    let now = Local::now().naive_local();
    let today = now.date();

    let pending = {
        let conn = state.db.get()?;
        obligations::list_pending_due_on_or_after(
            &conn,
            &owner,
            &today.format("%Y-%m-%d").to_string(),
        )?
    };

    let mut items = state.notifications.load();
    if items.is_empty() {
        items = seed_defaults(now);
        debug!(count = items.len(), "Seeded initial notifications");
    }

    let mut added = 0;
    for obligation in &pending {
        let Ok(due) = NaiveDate::parse_from_str(&obligation.due_date, "%Y-%m-%d") else {
            warn!(
                obligation_id = obligation.id,
                due_date = %obligation.due_date,
                "Skipping obligation with unparseable due date"
            );
            continue;
        };

        let days = days_until(due, today);
        if days > ALERT_WINDOW_DAYS {
            continue;
        }

        let key = alert_key(obligation);
        if already_alerted(&items, obligation, &key) {
            continue;
        }

        items.push(NotificationItem {
            id: Uuid::new_v4().to_string(),
            message: alert_message(obligation, days),
            created_at: now.format(CREATED_AT_FORMAT).to_string(),
            read: false,
            category: NotificationCategory::TaxAlert,
            priority: if days <= HIGH_PRIORITY_DAYS {
                Priority::High
            } else {
                Priority::Medium
            },
            source_key: Some(key),
        });
        added += 1;
    }

    if added > 0 {
        info!(count = added, "Raised tax due-date alerts");
    }
    sort_for_display(&mut items);
    state.notifications.store(&items);
    Ok(added)
}

/// The feed in display order.
pub fn list_notifications(state: &AppState) -> Vec<NotificationItem> {
    let mut items = state.notifications.load();
    sort_for_display(&mut items);
    items
}

pub fn unread_count(state: &AppState) -> usize {
    state.notifications.load().iter().filter(|i| !i.read).count()
}

pub fn mark_read(state: &AppState, id: &str) -> AppResult<()> {
    let mut items = state.notifications.load();
    let item = items
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or_else(|| AppError::NotFound(format!("notification {}", id)))?;
    item.read = true;
    state.notifications.store(&items);
    Ok(())
}

pub fn mark_all_read(state: &AppState) {
    let mut items = state.notifications.load();
    for item in &mut items {
        item.read = true;
    }
    state.notifications.store(&items);
}

/// Display order: priority first, newest first within a priority.
pub fn sort_for_display(items: &mut [NotificationItem]) {
    items.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

fn alert_key(obligation: &TaxObligation) -> String {
    format!("das-due:{}:{}", obligation.competence, obligation.due_date)
}

/// An alert already exists if its key matches, or, for items stored
/// before keys existed, if the message mentions both the competence
/// period and the formatted due date.
fn already_alerted(items: &[NotificationItem], obligation: &TaxObligation, key: &str) -> bool {
    let competence = obligation.competence_display();
    let due = obligation.due_date_display();
    items.iter().any(|item| {
        item.source_key.as_deref() == Some(key)
            || (item.message.contains(&competence) && item.message.contains(&due))
    })
}

fn alert_message(obligation: &TaxObligation, days: i64) -> String {
    let competence = obligation.competence_display();
    let due = obligation.due_date_display();
    match days {
        0 => format!("DAS for {} is due today ({})", competence, due),
        1 => format!("DAS for {} is due in 1 day ({})", competence, due),
        _ => format!("DAS for {} is due in {} days ({})", competence, days, due),
    }
}

/// First-run feed: one welcome plus a couple of tips, backdated so real
/// alerts sort above them.
fn seed_defaults(now: NaiveDateTime) -> Vec<NotificationItem> {
    let seed = |minutes: i64, message: &str, category: NotificationCategory, key: &str| {
        NotificationItem {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            created_at: (now - Duration::minutes(minutes))
                .format(CREATED_AT_FORMAT)
                .to_string(),
            read: false,
            category,
            priority: Priority::Low,
            source_key: Some(key.into()),
        }
    };

    vec![
        seed(
            3,
            "Welcome to Tally! Your income, expenses, and DAS in one place.",
            NotificationCategory::Welcome,
            "seed:welcome",
        ),
        seed(
            2,
            "Record a sale and its ledger entry is kept in step automatically.",
            NotificationCategory::Info,
            "seed:info-sales",
        ),
        seed(
            1,
            "Mark a DAS payment as paid to add it to your expenses.",
            NotificationCategory::Info,
            "seed:info-das",
        ),
    ]
}
