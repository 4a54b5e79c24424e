//! Derived user statistics: journaling streak, monthly counts, and the
//! 7-day mood trend. Everything here is a pure computation over records the
//! handlers have already fetched.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::models::user::UserStats;

/// Aggregate profile stats from a user's journal timestamps and mood count.
///
/// `entry_times` is the full set of journal `created_at` values; order does
/// not matter, the streak walk sorts internally.
pub fn compute_user_stats(
    entry_times: &[DateTime<Utc>],
    account_created_at: DateTime<Utc>,
    total_moods: i64,
    now: DateTime<Utc>,
) -> UserStats {
    let today = now.date_naive();

    UserStats {
        journal_streak: journal_streak(entry_times, today),
        entries_this_month: entries_this_month(entry_times, today),
        // Placeholder until self-care activity completion is tracked.
        self_care_minutes: 0,
        total_entries: entry_times.len() as i64,
        // Clamped: a creation timestamp ahead of server time must not go
        // negative.
        days_active: (now - account_created_at).num_days().max(0),
        total_moods,
    }
}

/// Count of consecutive calendar days with at least one journal entry,
/// ending today or yesterday. A missed day breaks the streak entirely.
pub fn journal_streak(entry_times: &[DateTime<Utc>], today: NaiveDate) -> i64 {
    // Unique entry days, newest first. Multiple entries on one day count once.
    let mut days: Vec<NaiveDate> = entry_times.iter().map(|t| t.date_naive()).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let Some(&last_day) = days.first() else {
        return 0;
    };

    // Last entry before yesterday: the streak is already broken.
    if (today - last_day).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    let mut current = last_day;
    for &day in &days[1..] {
        if (current - day).num_days() == 1 {
            streak += 1;
            current = day;
        } else {
            break;
        }
    }
    streak
}

/// Entries created on or after 00:00 on the 1st of the current month.
fn entries_this_month(entry_times: &[DateTime<Utc>], today: NaiveDate) -> i64 {
    let month_start = today.with_day(1).expect("day 1 exists in every month");
    entry_times
        .iter()
        .filter(|t| t.date_naive() >= month_start)
        .count() as i64
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MoodTrend {
    Improving,
    Declining,
    Neutral,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodStats {
    pub average_mood: f64,
    pub total_entries: i64,
    pub trend: MoodTrend,
}

/// Average mood and coarse trend over a window of (timestamp, mood) pairs —
/// in practice the last 7 days. An empty window is a valid degenerate result,
/// not an error.
pub fn mood_stats(entries: &[(DateTime<Utc>, i32)]) -> MoodStats {
    if entries.is_empty() {
        return MoodStats {
            average_mood: 0.0,
            total_entries: 0,
            trend: MoodTrend::Neutral,
        };
    }

    // The trend split requires newest-first order; sort locally instead of
    // trusting the caller's ordering.
    let mut ordered = entries.to_vec();
    ordered.sort_by(|a, b| b.0.cmp(&a.0));

    let moods: Vec<f64> = ordered.iter().map(|&(_, m)| m as f64).collect();
    let average = moods.iter().sum::<f64>() / moods.len() as f64;

    let mid = moods.len() / 2;
    let (recent, older) = moods.split_at(mid);
    let recent_avg = half_average(recent);
    let older_avg = half_average(older);

    // The dashboard has always read the older half leading by more than 0.5
    // as "improving" and trailing by more than 0.5 as "declining"; clients
    // depend on that direction, so it stays.
    let trend = if older_avg > recent_avg + 0.5 {
        MoodTrend::Improving
    } else if older_avg < recent_avg - 0.5 {
        MoodTrend::Declining
    } else {
        MoodTrend::Neutral
    };

    MoodStats {
        average_mood: round_to_tenth(average),
        total_entries: moods.len() as i64,
        trend,
    }
}

fn half_average(half: &[f64]) -> f64 {
    if half.is_empty() {
        // An empty half contributes zero rather than dividing by zero.
        0.0
    } else {
        half.iter().sum::<f64>() / half.len() as f64
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn day(y: i32, mo: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap()
    }

    // ── journal_streak ───────────────────────────────────────────────────

    #[test]
    fn test_streak_empty_is_zero() {
        assert_eq!(journal_streak(&[], day(2026, 3, 10)), 0);
    }

    #[test]
    fn test_streak_three_consecutive_days_ending_today() {
        let entries = [ts(2026, 3, 10, 9), ts(2026, 3, 9, 22), ts(2026, 3, 8, 7)];
        assert_eq!(journal_streak(&entries, day(2026, 3, 10)), 3);
    }

    #[test]
    fn test_streak_last_entry_three_days_ago_is_zero() {
        // Contiguous days further back do not revive a broken streak.
        let entries = [ts(2026, 3, 7, 9), ts(2026, 3, 6, 9), ts(2026, 3, 5, 9)];
        assert_eq!(journal_streak(&entries, day(2026, 3, 10)), 0);
    }

    #[test]
    fn test_streak_duplicate_days_count_once() {
        let entries = [
            ts(2026, 3, 10, 8),
            ts(2026, 3, 10, 12),
            ts(2026, 3, 10, 21),
            ts(2026, 3, 9, 10),
        ];
        assert_eq!(journal_streak(&entries, day(2026, 3, 10)), 2);
    }

    #[test]
    fn test_streak_yesterday_only_still_active() {
        let entries = [ts(2026, 3, 9, 18)];
        assert_eq!(journal_streak(&entries, day(2026, 3, 10)), 1);
    }

    #[test]
    fn test_streak_two_days_ago_only_is_zero() {
        let entries = [ts(2026, 3, 8, 18)];
        assert_eq!(journal_streak(&entries, day(2026, 3, 10)), 0);
    }

    #[test]
    fn test_streak_stops_at_first_gap() {
        let entries = [ts(2026, 3, 10, 9), ts(2026, 3, 9, 9), ts(2026, 3, 7, 9)];
        assert_eq!(journal_streak(&entries, day(2026, 3, 10)), 2);
    }

    #[test]
    fn test_streak_accepts_unsorted_input() {
        let entries = [ts(2026, 3, 8, 7), ts(2026, 3, 10, 9), ts(2026, 3, 9, 22)];
        assert_eq!(journal_streak(&entries, day(2026, 3, 10)), 3);
    }

    // ── compute_user_stats ───────────────────────────────────────────────

    #[test]
    fn test_stats_empty_journal() {
        let now = ts(2026, 3, 10, 12);
        let created = ts(2026, 2, 1, 0);
        let stats = compute_user_stats(&[], created, 4, now);
        assert_eq!(stats.journal_streak, 0);
        assert_eq!(stats.entries_this_month, 0);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.days_active, 37);
        assert_eq!(stats.total_moods, 4);
        assert_eq!(stats.self_care_minutes, 0);
    }

    #[test]
    fn test_entries_this_month_excludes_previous_month() {
        let now = ts(2026, 3, 10, 12);
        // 23:59 on the last day of February does not count for March.
        let late_feb = Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 0).unwrap();
        let first_mar = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let stats = compute_user_stats(&[first_mar, late_feb], ts(2026, 1, 1, 0), 0, now);
        assert_eq!(stats.entries_this_month, 1);
        assert_eq!(stats.total_entries, 2);
    }

    #[test]
    fn test_days_active_clamped_against_clock_skew() {
        let now = ts(2026, 3, 10, 12);
        let created_in_future = ts(2026, 3, 11, 0);
        let stats = compute_user_stats(&[], created_in_future, 0, now);
        assert_eq!(stats.days_active, 0);
    }

    // ── mood_stats ───────────────────────────────────────────────────────

    fn window(moods: &[i32]) -> Vec<(DateTime<Utc>, i32)> {
        // Newest first, one hour apart.
        moods
            .iter()
            .enumerate()
            .map(|(i, &m)| (ts(2026, 3, 10, 0) - chrono::Duration::hours(i as i64), m))
            .collect()
    }

    #[test]
    fn test_mood_stats_empty_window() {
        let stats = mood_stats(&[]);
        assert_eq!(
            stats,
            MoodStats {
                average_mood: 0.0,
                total_entries: 0,
                trend: MoodTrend::Neutral,
            }
        );
    }

    #[test]
    fn test_mood_stats_flat_week_is_neutral() {
        let stats = mood_stats(&window(&[5, 5, 5, 5]));
        assert_eq!(stats.average_mood, 5.0);
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.trend, MoodTrend::Neutral);
    }

    #[test]
    fn test_mood_stats_older_half_higher_reads_improving() {
        // Newest first: recent half [2,2], older half [4,4].
        let stats = mood_stats(&window(&[2, 2, 4, 4]));
        assert_eq!(stats.trend, MoodTrend::Improving);
        assert_eq!(stats.average_mood, 3.0);
    }

    #[test]
    fn test_mood_stats_older_half_lower_reads_declining() {
        let stats = mood_stats(&window(&[4, 4, 2, 2]));
        assert_eq!(stats.trend, MoodTrend::Declining);
    }

    #[test]
    fn test_mood_stats_half_point_difference_is_neutral() {
        // Exactly 0.5 apart is within the neutral band on both sides.
        let stats = mood_stats(&window(&[3, 3, 4, 3]));
        assert_eq!(stats.trend, MoodTrend::Neutral);
    }

    #[test]
    fn test_mood_stats_single_entry_has_empty_recent_half() {
        // One entry splits into an empty recent half (average 0) and the
        // entry itself, which lands above the 0.5 band.
        let stats = mood_stats(&window(&[4]));
        assert_eq!(stats.average_mood, 4.0);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.trend, MoodTrend::Improving);
    }

    #[test]
    fn test_mood_stats_average_rounds_to_one_decimal() {
        let stats = mood_stats(&window(&[4, 4, 5]));
        assert_eq!(stats.average_mood, 4.3);
    }

    #[test]
    fn test_mood_stats_sorts_input_before_splitting() {
        let descending = window(&[2, 2, 4, 4]);
        let mut ascending = descending.clone();
        ascending.reverse();
        assert_eq!(mood_stats(&ascending), mood_stats(&descending));
    }

    #[test]
    fn test_mood_trend_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MoodTrend::Improving).unwrap(),
            "\"improving\""
        );
    }
}
