// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::{
    Dashboard, Encouragement, Goal, Milestone, MilestoneState, MilestoneStatus, PaceAdvisory,
    Task, WeekGroup,
};

/// Tasks shown per week on the dashboard. Grouping is by position only.
pub const DAYS_PER_WEEK: usize = 7;

const LOW_BAND: f64 = 0.3;
const HIGH_BAND: f64 = 0.7;

pub fn tasks_done(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.done).count()
}

/// Share of tasks marked done, in `[0, 1]`. Zero for an empty plan.
pub fn completion_ratio(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    tasks_done(tasks) as f64 / tasks.len() as f64
}

/// Progress expected by `current_day` if one task were done per day.
/// Zero for an empty plan; may exceed 1 once the pointer passes the plan.
pub fn expected_ratio(current_day: i64, total_tasks: usize) -> f64 {
    if total_tasks == 0 {
        return 0.0;
    }
    current_day as f64 / total_tasks as f64
}

/// Splits tasks, in stored order, into consecutive chunks of seven.
pub fn weekly_groups(tasks: &[Task]) -> Vec<WeekGroup> {
    tasks
        .chunks(DAYS_PER_WEEK)
        .enumerate()
        .map(|(i, chunk)| WeekGroup {
            week: i + 1,
            tasks: chunk.iter().map(|t| t.description.clone()).collect(),
        })
        .collect()
}

/// Tasks whose `day` is exactly `current_day`.
pub fn todays_tasks(tasks: &[Task], current_day: i64) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.day == current_day)
        .cloned()
        .collect()
}

/// Completion of one milestone across the given tasks. A milestone with no
/// tasks at all counts as complete.
pub fn milestone_state(tasks: &[Task], milestone: Milestone) -> MilestoneState {
    if tasks
        .iter()
        .filter(|t| t.milestone == milestone)
        .all(|t| t.done)
    {
        MilestoneState::Complete
    } else {
        MilestoneState::Pending
    }
}

/// Status of every milestone present in the plan, in order of first appearance.
pub fn milestone_statuses(tasks: &[Task]) -> Vec<MilestoneStatus> {
    let mut seen: Vec<Milestone> = Vec::new();
    for task in tasks {
        if !seen.contains(&task.milestone) {
            seen.push(task.milestone);
        }
    }

    seen.into_iter()
        .map(|milestone| MilestoneStatus {
            milestone,
            state: milestone_state(tasks, milestone),
        })
        .collect()
}

pub fn pace_advisory(completion: f64, expected: f64) -> PaceAdvisory {
    if completion < expected {
        PaceAdvisory::Behind
    } else {
        PaceAdvisory::OnTrack
    }
}

pub fn encouragement(completion: f64) -> Encouragement {
    if completion < LOW_BAND {
        Encouragement::SmallSteps
    } else if completion < HIGH_BAND {
        Encouragement::Consistency
    } else {
        Encouragement::NearMastery
    }
}

/// Computes the full dashboard for a goal from its task list.
pub fn build_dashboard(goal: Goal, tasks: Vec<Task>) -> Dashboard {
    let current_day = goal.current_day;
    let completion = completion_ratio(&tasks);
    let expected = expected_ratio(current_day, tasks.len());
    let today = todays_tasks(&tasks, current_day);
    let pace = pace_advisory(completion, expected);
    let encouragement = encouragement(completion);

    Dashboard {
        total_tasks: tasks.len(),
        tasks_done: tasks_done(&tasks),
        completion_ratio: completion,
        completion_percent: (completion * 100.0).floor() as u32,
        expected_ratio: expected,
        current_day,
        weeks: weekly_groups(&tasks),
        today_complete: today.is_empty(),
        today,
        milestones: milestone_statuses(&tasks),
        pace,
        pace_message: pace.message().to_string(),
        encouragement,
        encouragement_message: encouragement.message().to_string(),
        goal,
    }
}
