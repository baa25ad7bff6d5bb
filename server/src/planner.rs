// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::{Intensity, LearningPreference, Milestone};

/// One generated day of a plan, before it is persisted as a `Task`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry {
    pub day: u32,
    pub description: String,
    pub milestone: Milestone,
}

/// Phrase every generated description starts with.
pub fn style_prefix(pref: LearningPreference) -> &'static str {
    match pref {
        LearningPreference::Reading => "Read about",
        LearningPreference::Practice => "Practice",
        LearningPreference::Mixed => "Study and practice",
        LearningPreference::Unspecified => "Study",
    }
}

/// How many "base shares" of days each topic receives.
pub fn repeat_multiplier(intensity: Intensity) -> f64 {
    match intensity {
        Intensity::Light => 2.0,
        Intensity::Moderate => 1.0,
        Intensity::Intensive | Intensity::Unspecified => 0.7,
    }
}

/// Days allocated to each topic: `floor(total_days / 6 * multiplier)`, at least 1.
pub fn days_per_topic(total_days: u32, intensity: Intensity) -> u32 {
    let share = f64::from(total_days) / Milestone::ALL.len() as f64;
    let allocated = (share * repeat_multiplier(intensity)).floor() as u32;
    allocated.max(1)
}

/// Builds the day-by-day plan for a goal.
///
/// Each topic gets `days_per_topic` consecutive entries. If that falls short
/// of `total_days`, the plan is padded with generic `Practice` days. It is
/// never truncated, so short spans produce more than `total_days` entries.
///
/// `total_days` must be positive; callers reject empty spans beforehand.
pub fn generate_plan(
    goal_name: &str,
    total_days: u32,
    intensity: Intensity,
    pref: LearningPreference,
) -> Vec<PlanEntry> {
    let prefix = style_prefix(pref);
    let per_topic = days_per_topic(total_days, intensity);

    let mut plan = Vec::with_capacity(total_days.max(per_topic * 6) as usize);
    let mut day = 1;

    for milestone in Milestone::ALL {
        for _ in 0..per_topic {
            plan.push(PlanEntry {
                day,
                description: format!("{prefix} {milestone} of {goal_name}"),
                milestone,
            });
            day += 1;
        }
    }

    while plan.len() < total_days as usize {
        plan.push(PlanEntry {
            day,
            description: format!("{prefix} {goal_name}"),
            milestone: Milestone::Practice,
        });
        day += 1;
    }

    plan
}
