use crate::word::Word;
use serde::{Deserialize, Serialize};

/// How a learning plan paces itself through a word list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "camelCase")]
pub enum PlanType {
    /// A preset pacing where `value` is a total number of days.
    Preset,
    /// User-chosen total number of days.
    CustomDays,
    /// User-chosen number of new words per day.
    CustomWords,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStrategy {
    None,
    Ebbinghaus,
    Sm2,
    Leitner,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanDetails {
    #[serde(rename = "type")]
    pub plan_type: PlanType,
    pub value: u32,
    pub review_strategy: ReviewStrategy,
}

/// Externally reported progress numbers, consumed once per trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanProgress {
    pub mastered_count: u32,
    pub learned_count: u32,
    pub due_new_count: u32,
    pub due_review_count: u32,
    pub learned_today_count: u32,
    pub current_chapter: u32,
    pub total_chapters: u32,
}

/// Snapshot of an active plan for one word list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPlan {
    pub plan_id: u64,
    pub list_code: String,
    pub total_words: u32,
    pub plan: PlanDetails,
    pub progress: PlanProgress,
}

/// What kind of round the host asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerAction {
    /// Resume today's quota, minus what was already learned today.
    Activate,
    /// Restart today from scratch; review work is dropped.
    Reset,
    /// Run with an explicit plan configuration instead of the stored one.
    Plan(PlanDetails),
}

/// Host-issued session trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionTrigger {
    Learning {
        list_code: String,
        action: TriggerAction,
    },
    /// Standalone mistake review; bypasses due-count computation.
    MistakeReview { words: Vec<Word> },
}

/// New/review word counts for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueCounts {
    pub due_new: u32,
    pub due_review: u32,
}

impl DueCounts {
    pub fn is_zero(&self) -> bool {
        self.due_new == 0 && self.due_review == 0
    }
}

/// Compute how many new and review words the round should request.
///
/// `Activate` trusts the externally reported due totals and subtracts
/// what was already learned today. `Reset` and explicit plans derive a
/// quota from the plan configuration; `Reset` additionally drops review
/// work. A review strategy of `None` forces due-review to zero in every
/// branch.
pub fn due_counts(action: &TriggerAction, plan: &LearningPlan) -> DueCounts {
    let remaining_new = plan.total_words.saturating_sub(plan.progress.learned_count);

    let (due_new, due_review) = match action {
        TriggerAction::Activate => (
            plan.progress
                .due_new_count
                .saturating_sub(plan.progress.learned_today_count),
            plan.progress.due_review_count,
        ),
        TriggerAction::Reset | TriggerAction::Plan(_) => {
            let details = match action {
                TriggerAction::Plan(details) => *details,
                _ => plan.plan,
            };
            let due_new = quota_for(&details, plan.total_words, remaining_new);
            let due_review = match action {
                TriggerAction::Reset => 0,
                _ => plan.progress.due_review_count,
            };
            (due_new, due_review)
        }
    };

    let effective_strategy = match action {
        TriggerAction::Plan(details) => details.review_strategy,
        _ => plan.plan.review_strategy,
    };
    let due_review = if effective_strategy == ReviewStrategy::None {
        0
    } else {
        due_review
    };

    DueCounts {
        due_new,
        due_review,
    }
}

fn quota_for(details: &PlanDetails, total_words: u32, remaining_new: u32) -> u32 {
    match details.plan_type {
        PlanType::CustomWords if details.value > 0 => details.value.min(remaining_new),
        PlanType::Preset | PlanType::CustomDays if details.value > 0 => {
            let daily_quota = total_words.div_ceil(details.value);
            daily_quota.min(remaining_new)
        }
        // Degenerate plan value; fall back to a sane daily batch.
        _ => 20.min(remaining_new),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(plan_type: PlanType, value: u32, strategy: ReviewStrategy) -> LearningPlan {
        LearningPlan {
            plan_id: 1,
            list_code: "cet4_core".into(),
            total_words: 100,
            plan: PlanDetails {
                plan_type,
                value,
                review_strategy: strategy,
            },
            progress: PlanProgress {
                due_new_count: 15,
                due_review_count: 6,
                learned_today_count: 5,
                ..PlanProgress::default()
            },
        }
    }

    #[test]
    fn custom_words_plan_caps_at_plan_value() {
        let p = plan(PlanType::CustomWords, 10, ReviewStrategy::Ebbinghaus);
        let due = due_counts(&TriggerAction::Reset, &p);
        assert_eq!(due.due_new, 10);
        assert_eq!(due.due_review, 0);
    }

    #[test]
    fn custom_words_plan_caps_at_remaining_new() {
        let mut p = plan(PlanType::CustomWords, 50, ReviewStrategy::Ebbinghaus);
        p.progress.learned_count = 97;
        let due = due_counts(&TriggerAction::Reset, &p);
        assert_eq!(due.due_new, 3);
    }

    #[test]
    fn day_based_plan_uses_ceiling_quota() {
        // 100 words over 30 days -> ceil(100/30) = 4 per day
        let p = plan(PlanType::CustomDays, 30, ReviewStrategy::Sm2);
        let due = due_counts(&TriggerAction::Plan(p.plan), &p);
        assert_eq!(due.due_new, 4);
        assert_eq!(due.due_review, 6);
    }

    #[test]
    fn preset_plan_behaves_like_day_based() {
        let p = plan(PlanType::Preset, 20, ReviewStrategy::Leitner);
        let due = due_counts(&TriggerAction::Reset, &p);
        assert_eq!(due.due_new, 5);
    }

    #[test]
    fn zero_plan_value_falls_back_to_default_batch() {
        let p = plan(PlanType::CustomDays, 0, ReviewStrategy::Ebbinghaus);
        let due = due_counts(&TriggerAction::Reset, &p);
        assert_eq!(due.due_new, 20);
    }

    #[test]
    fn activate_subtracts_words_learned_today() {
        let p = plan(PlanType::CustomWords, 10, ReviewStrategy::Ebbinghaus);
        let due = due_counts(&TriggerAction::Activate, &p);
        assert_eq!(due.due_new, 10); // 15 due - 5 learned today
        assert_eq!(due.due_review, 6);
    }

    #[test]
    fn activate_never_goes_negative() {
        let mut p = plan(PlanType::CustomWords, 10, ReviewStrategy::Ebbinghaus);
        p.progress.learned_today_count = 40;
        let due = due_counts(&TriggerAction::Activate, &p);
        assert_eq!(due.due_new, 0);
    }

    #[test]
    fn review_strategy_none_forces_review_to_zero() {
        let p = plan(PlanType::CustomWords, 10, ReviewStrategy::None);
        let due = due_counts(&TriggerAction::Activate, &p);
        assert_eq!(due.due_review, 0);

        let explicit = PlanDetails {
            plan_type: PlanType::CustomWords,
            value: 10,
            review_strategy: ReviewStrategy::None,
        };
        let due = due_counts(&TriggerAction::Plan(explicit), &p);
        assert_eq!(due.due_review, 0);
    }

    #[test]
    fn reset_drops_review_work() {
        let p = plan(PlanType::CustomWords, 10, ReviewStrategy::Ebbinghaus);
        let due = due_counts(&TriggerAction::Reset, &p);
        assert_eq!(due.due_review, 0);
    }

    #[test]
    fn plan_details_round_trips_through_json() {
        let details = PlanDetails {
            plan_type: PlanType::CustomDays,
            value: 45,
            review_strategy: ReviewStrategy::Sm2,
        };
        let json = serde_json::to_string(&details).unwrap();
        assert!(json.contains("customDays"));
        assert!(json.contains("SM2"));
        let back: PlanDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(details, back);
    }
}
