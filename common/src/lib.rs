// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Number of hours per day used when the creation payload omits it.
pub const DEFAULT_HOURS_PER_DAY: i64 = 2;

/// Inclusive range of accepted `hours_per_day` values.
pub const HOURS_PER_DAY_RANGE: std::ops::RangeInclusive<i64> = 1..=8;

/// Longest accepted span, in days, between the start and end of a goal.
pub const MAX_PLAN_DAYS: u32 = 3650;

/// Kind of learning goal. Stored as text and never enforced by the schema.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
pub enum GoalType {
    #[default]
    Certification,
    Exam,
    #[serde(rename = "Skill Mastery")]
    #[sqlx(rename = "Skill Mastery")]
    SkillMastery,
    #[serde(other)]
    Other,
}

/// Controls how densely the plan packs each topic.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
pub enum Intensity {
    #[default]
    Light,
    Moderate,
    Intensive,
    /// Any value outside the known set. Planned like `Intensive`.
    #[serde(other)]
    Unspecified,
}

/// Controls task phrasing only; it has no effect on scheduling.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
pub enum LearningPreference {
    #[default]
    Reading,
    Practice,
    Mixed,
    /// Any value outside the known set. Phrased with a generic "Study".
    #[serde(other)]
    Unspecified,
}

/// One of the six fixed topics a plan walks through, in plan order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
pub enum Milestone {
    Fundamentals,
    #[serde(rename = "Core Concepts")]
    #[sqlx(rename = "Core Concepts")]
    CoreConcepts,
    Practice,
    #[serde(rename = "Advanced Topics")]
    #[sqlx(rename = "Advanced Topics")]
    AdvancedTopics,
    Projects,
    Revision,
}

impl Milestone {
    /// All topics in the order the generator emits them.
    pub const ALL: [Milestone; 6] = [
        Milestone::Fundamentals,
        Milestone::CoreConcepts,
        Milestone::Practice,
        Milestone::AdvancedTopics,
        Milestone::Projects,
        Milestone::Revision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Milestone::Fundamentals => "Fundamentals",
            Milestone::CoreConcepts => "Core Concepts",
            Milestone::Practice => "Practice",
            Milestone::AdvancedTopics => "Advanced Topics",
            Milestone::Projects => "Projects",
            Milestone::Revision => "Revision",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored weekday list cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid weekday {0:?} in preferred days")]
pub struct StudyDaysParseError(pub String);

/// The set of weekdays the user prefers to study on.
///
/// Order of first appearance is kept and duplicates are dropped. In the
/// database the set is a comma-delimited string such as `Mon,Wed,Fri`;
/// over the API it is a JSON array of the same abbreviations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct StudyDays(Vec<Weekday>);

impl StudyDays {
    pub fn new(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut unique = Vec::new();
        for day in days {
            if !unique.contains(&day) {
                unique.push(day);
            }
        }
        Self(unique)
    }

    pub fn days(&self) -> &[Weekday] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Weekday>> for StudyDays {
    fn from(days: Vec<Weekday>) -> Self {
        Self::new(days)
    }
}

impl From<StudyDays> for Vec<Weekday> {
    fn from(days: StudyDays) -> Self {
        days.0
    }
}

impl fmt::Display for StudyDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, day) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{day}")?;
        }
        Ok(())
    }
}

impl FromStr for StudyDays {
    type Err = StudyDaysParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<Weekday>()
                    .map_err(|_| StudyDaysParseError(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl TryFrom<String> for StudyDays {
    type Error = StudyDaysParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[allow(clippy::doc_overindented_list_items)]
/// A learning goal as stored in the `goals` table.
///
/// Derivation attributes (derive):
/// - `Serialize`, `Deserialize`: API representation.
/// - `sqlx::FromRow`: built straight from a `SELECT * FROM goals` row;
///    `preferred_days` goes through `StudyDays: TryFrom<String>`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Goal {
    pub id: i64,

    pub name: String,

    pub goal_type: GoalType,

    // Dates only, no timezone: the plan is counted in whole days.
    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub hours_per_day: i64,

    #[sqlx(try_from = "String")]
    pub preferred_days: StudyDays,

    pub intensity: Intensity,

    pub learning_pref: LearningPreference,

    /// Manually advanced pointer to "today" in the plan. Starts at 1 and
    /// has no upper bound.
    pub current_day: i64,
}

/// A single day's study activity, as stored in the `tasks` table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Task {
    pub id: i64,

    pub goal_id: i64,

    /// 1-based position in the plan.
    pub day: i64,

    /// Fixed at creation, e.g. `Day 3: Read about Fundamentals of Rust`.
    pub description: String,

    pub milestone: Milestone,

    pub done: bool,
}

/// Payload for `POST /api/goals`.
///
/// Everything except `end_date` has a default, matching the initial state
/// of the creation form.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateGoalPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub goal_type: GoalType,
    pub end_date: NaiveDate,
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: i64,
    #[serde(default)]
    pub preferred_days: StudyDays,
    #[serde(default)]
    pub intensity: Intensity,
    #[serde(default)]
    pub learning_pref: LearningPreference,
}

fn default_hours_per_day() -> i64 {
    DEFAULT_HOURS_PER_DAY
}

/// A freshly created goal together with its generated plan.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GoalWithPlan {
    pub goal: Goal,
    pub tasks: Vec<Task>,
}

/// Payload for `PATCH /api/tasks/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct UpdateTaskPayload {
    pub done: bool,
}

/// Seven consecutive tasks of a plan, by stored position.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeekGroup {
    /// 1-based week number.
    pub week: usize,
    pub tasks: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneState {
    Complete,
    Pending,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneStatus {
    pub milestone: Milestone,
    pub state: MilestoneState,
}

/// Whether completion keeps up with the one-task-per-day expectation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaceAdvisory {
    Behind,
    OnTrack,
}

impl PaceAdvisory {
    pub fn message(&self) -> &'static str {
        match self {
            PaceAdvisory::Behind => "You're behind. Increase study time.",
            PaceAdvisory::OnTrack => "You're on track!",
        }
    }
}

/// Encouragement band picked from the completion ratio.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Encouragement {
    /// Completion below 0.3.
    SmallSteps,
    /// Completion from 0.3 up to (not including) 0.7.
    Consistency,
    /// Completion of 0.7 and above.
    NearMastery,
}

impl Encouragement {
    pub fn message(&self) -> &'static str {
        match self {
            Encouragement::SmallSteps => "Small steps daily lead to success",
            Encouragement::Consistency => "Consistency is your superpower",
            Encouragement::NearMastery => "You're close to mastery",
        }
    }
}

/// Everything the dashboard shows for one goal. Recomputed on every read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub goal: Goal,
    pub total_tasks: usize,
    pub tasks_done: usize,
    pub completion_ratio: f64,
    /// `completion_ratio` as a whole percentage, truncated.
    pub completion_percent: u32,
    pub expected_ratio: f64,
    pub current_day: i64,
    pub weeks: Vec<WeekGroup>,
    pub today: Vec<Task>,
    /// True when no task is scheduled for `current_day`.
    pub today_complete: bool,
    pub milestones: Vec<MilestoneStatus>,
    pub pace: PaceAdvisory,
    pub pace_message: String,
    pub encouragement: Encouragement,
    pub encouragement_message: String,
}

/// Message shown when the dashboard is opened before any goal exists.
pub const EMPTY_DASHBOARD_MESSAGE: &str = "Create a goal first";

/// Response of `GET /api/dashboard`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardResponse {
    Empty { message: String },
    Ready(Box<Dashboard>),
}
