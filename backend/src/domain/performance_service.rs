//! Task performance analytics.
//!
//! Scores staff task execution against the expected baselines carried on
//! each task definition. Five normalized ratios combine into an overall
//! score via fixed weights, the score classifies into a tier, and a
//! ranked subset of tasks can be recommended for the remainder of a
//! shift. Only approved and completed shifts feed the aggregation.

use anyhow::Result;
use log::{debug, info};
use std::collections::{HashMap, HashSet};

use crate::domain::commands::performance::{
    PerformancePeriodQuery, PerformancePeriodResult, RecommendTasksQuery, ScoredTaskPerformance,
};
use crate::domain::commands::shifts::CountedShiftsQuery;
use crate::domain::shift_service::ShiftService;
use crate::domain::time;
use crate::storage::traits::{Connection, TaskStorage};
use shared::{
    ExtendedTask, PeerRanking, PerformanceTier, TaskPerformance, TaskRecommendation,
};

/// Fixed combination weights; part of the algorithm's contract, not
/// configuration. They sum to 1.0.
const EFFICIENCY_WEIGHT: f64 = 0.25;
const PROACTIVITY_WEIGHT: f64 = 0.25;
const CONSISTENCY_WEIGHT: f64 = 0.20;
const FREQUENCY_WEIGHT: f64 = 0.15;
const COMPLETION_WEIGHT: f64 = 0.15;

/// Upper caps on the individual ratios.
const EFFICIENCY_CAP: f64 = 2.0;
const PROACTIVITY_CAP: f64 = 3.0;

/// How many tasks a recommendation returns at most.
const MAX_RECOMMENDATIONS: usize = 5;

/// Baseline-vs-actual speed. Above 1.0 means faster than baseline,
/// capped at 2.0; 0 when nothing was actually measured.
pub fn efficiency_rate(base_time_minutes: f64, actual_time_minutes: f64) -> f64 {
    if actual_time_minutes == 0.0 {
        return 0.0;
    }
    (base_time_minutes / actual_time_minutes).min(EFFICIENCY_CAP)
}

/// Observed repetitions against the expected count per shift, capped at
/// 3.0. A task with no expected count scores 2.0 for any activity at all.
pub fn proactivity_rate(actual_count: f64, base_count_per_shift: f64) -> f64 {
    if base_count_per_shift == 0.0 {
        return if actual_count > 0.0 { 2.0 } else { 0.0 };
    }
    (actual_count / base_count_per_shift).min(PROACTIVITY_CAP)
}

/// How stable the observed execution durations are. Lower variance
/// relative to the mean scores closer to 1.0. Fewer than two samples, or
/// zero spread, score a neutral 1.0.
pub fn consistency_rate(durations: &[f64]) -> f64 {
    if durations.len() < 2 {
        return 1.0;
    }
    let n = durations.len() as f64;
    let mean = durations.iter().sum::<f64>() / n;
    let variance = durations.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return 1.0;
    }
    (1.0 / (std_dev / mean + 0.1)).min(1.0)
}

/// Share of worked shifts in which the task was executed at least once.
pub fn frequency_rate(shifts_with_execution: usize, total_shifts_worked: usize) -> f64 {
    if total_shifts_worked == 0 {
        return 0.0;
    }
    shifts_with_execution as f64 / total_shifts_worked as f64
}

/// Completed against planned, capped at 1.0. With nothing planned, any
/// completion scores full marks.
pub fn completion_rate(completed_tasks: f64, planned_tasks: f64) -> f64 {
    if planned_tasks == 0.0 {
        return if completed_tasks > 0.0 { 1.0 } else { 0.0 };
    }
    (completed_tasks / planned_tasks).min(1.0)
}

/// Weighted combination of the five ratios.
pub fn overall_score(performance: &TaskPerformance) -> f64 {
    EFFICIENCY_WEIGHT * performance.efficiency_rate
        + PROACTIVITY_WEIGHT * performance.proactivity_rate
        + CONSISTENCY_WEIGHT * performance.consistency_rate
        + FREQUENCY_WEIGHT * performance.frequency_rate
        + COMPLETION_WEIGHT * performance.completion_rate
}

/// Non-overlapping tier thresholds, evaluated high to low.
pub fn classify_tier(score: f64) -> PerformanceTier {
    if score >= 1.2 {
        PerformanceTier::Excellent
    } else if score >= 1.0 {
        PerformanceTier::Good
    } else if score >= 0.8 {
        PerformanceTier::Average
    } else {
        PerformanceTier::NeedsImprovement
    }
}

/// Rank a user's metric value within a peer roster.
///
/// Peers are sorted descending; the rank is the 1-based position of the
/// first peer value at or below the user's, so ties favor the user. A
/// user below every peer ranks n+1 (percentile 0); an empty roster ranks
/// first at the 100th percentile.
pub fn rank_among_peers(user_value: f64, peer_values: &[f64]) -> PeerRanking {
    let n = peer_values.len();
    if n == 0 {
        return PeerRanking {
            rank: 1,
            percentile: 100.0,
        };
    }

    let mut sorted = peer_values.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let rank = sorted
        .iter()
        .position(|peer| *peer <= user_value)
        .map(|idx| idx + 1)
        .unwrap_or(n + 1);
    let percentile = (n as f64 - rank as f64 + 1.0) / n as f64 * 100.0;

    PeerRanking { rank, percentile }
}

/// Recommend up to five tasks for the remainder of a shift.
///
/// Time-specific tasks whose restricted window does not contain the
/// current time are dropped. Remaining tasks score their priority weight
/// plus performance history (2x efficiency, 1.5x proactivity, when known)
/// plus a fit bonus when the task's expected duration leaves headroom in
/// the remaining shift time.
pub fn recommend_tasks(
    tasks: &[ExtendedTask],
    history: &HashMap<String, TaskPerformance>,
    current_time: &str,
    shift_minutes_remaining: i64,
) -> Result<Vec<TaskRecommendation>> {
    let mut scored = Vec::new();

    for task in tasks {
        if let Some(window) = &task.restricted_window {
            if !time::contains(window, current_time)? {
                debug!(
                    "Task {} restricted to {}-{}, skipped at {}",
                    task.id, window.start, window.end, current_time
                );
                continue;
            }
        }

        let mut score = task.priority.weight();
        if let Some(performance) = history.get(&task.id) {
            score += 2.0 * performance.efficiency_rate;
            score += 1.5 * performance.proactivity_rate;
        }
        if task.base_time_minutes <= 0.8 * shift_minutes_remaining as f64 {
            score += 1.0;
        }

        scored.push(TaskRecommendation {
            task: task.clone(),
            score,
        });
    }

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_RECOMMENDATIONS);
    Ok(scored)
}

/// Service aggregating raw executions into per-task performance.
#[derive(Clone)]
pub struct PerformanceService<C: Connection> {
    shift_service: ShiftService<C>,
    task_repository: C::TaskRepository,
}

impl<C: Connection> PerformanceService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            shift_service: ShiftService::new(connection),
            task_repository: connection.create_task_repository(),
        }
    }

    /// Evaluate one staff member's per-task performance over a period.
    ///
    /// Counted shifts (approved/completed, in range) define the working
    /// denominator; executions outside those shifts are ignored. Period
    /// counters feed the ratio functions as follows: actual time is the
    /// mean execution duration, actual count is the mean executions per
    /// worked shift, and planned tasks are the per-shift baseline times
    /// the number of worked shifts. Every stored task that was planned or
    /// executed in the period is reported, so a planned task the user
    /// never executed still surfaces with zero rates.
    pub fn evaluate_period(
        &self,
        query: PerformancePeriodQuery,
    ) -> Result<PerformancePeriodResult> {
        info!(
            "Evaluating task performance for {} between {} and {}",
            query.user_id, query.start_date, query.end_date
        );

        let shifts = self.shift_service.list_counted_shifts(CountedShiftsQuery {
            user_id: query.user_id.clone(),
            start_date: query.start_date.clone(),
            end_date: query.end_date.clone(),
        })?;
        let total_shifts = shifts.len();
        let counted_shift_ids: HashSet<&str> = shifts.iter().map(|s| s.id.as_str()).collect();

        let executions = self.task_repository.list_executions_for_user(&query.user_id)?;

        // Group execution durations and shift coverage per task, keeping
        // only executions that happened inside a counted shift.
        let mut durations_by_task: HashMap<String, Vec<f64>> = HashMap::new();
        let mut shifts_by_task: HashMap<String, HashSet<String>> = HashMap::new();
        for execution in &executions {
            if !counted_shift_ids.contains(execution.shift_id.as_str()) {
                continue;
            }
            let minutes = time::duration_minutes(&execution.start_time, &execution.end_time)?;
            durations_by_task
                .entry(execution.task_id.clone())
                .or_default()
                .push(minutes as f64);
            shifts_by_task
                .entry(execution.task_id.clone())
                .or_default()
                .insert(execution.shift_id.clone());
        }

        // Task definitions drive the output so that a planned task the
        // staff member never touched still shows up with zero rates.
        let defined_tasks = self.task_repository.list_tasks()?;
        let known_tasks: HashSet<&str> = defined_tasks.iter().map(|t| t.id.as_str()).collect();
        for task_id in durations_by_task.keys() {
            if !known_tasks.contains(task_id.as_str()) {
                debug!("Executions reference unknown task {}, skipped", task_id);
            }
        }

        let mut tasks = Vec::new();
        for task in &defined_tasks {
            let durations = durations_by_task
                .get(&task.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let execution_count = durations.len() as f64;
            let planned = task.base_count_per_shift * total_shifts as f64;
            // Neither planned nor executed in the period: nothing to score.
            if execution_count == 0.0 && planned == 0.0 {
                continue;
            }

            let mean_duration = if durations.is_empty() {
                0.0
            } else {
                durations.iter().sum::<f64>() / execution_count
            };
            let mean_count_per_shift = if total_shifts == 0 {
                0.0
            } else {
                execution_count / total_shifts as f64
            };
            let shifts_with_execution = shifts_by_task
                .get(&task.id)
                .map(|s| s.len())
                .unwrap_or(0);

            let performance = TaskPerformance {
                user_id: query.user_id.clone(),
                task_id: task.id.clone(),
                period_start: query.start_date.clone(),
                period_end: query.end_date.clone(),
                efficiency_rate: efficiency_rate(task.base_time_minutes, mean_duration),
                proactivity_rate: proactivity_rate(mean_count_per_shift, task.base_count_per_shift),
                consistency_rate: consistency_rate(durations),
                frequency_rate: frequency_rate(shifts_with_execution, total_shifts),
                completion_rate: completion_rate(execution_count, planned),
            };
            let score = overall_score(&performance);

            tasks.push(ScoredTaskPerformance {
                performance,
                overall_score: score,
                tier: classify_tier(score),
            });
        }

        // Stable output order for callers and tests
        tasks.sort_by(|a, b| a.performance.task_id.cmp(&b.performance.task_id));

        info!(
            "Evaluated {} tasks over {} counted shifts for {}",
            tasks.len(),
            total_shifts,
            query.user_id
        );
        Ok(PerformancePeriodResult { tasks })
    }

    /// Ranked task recommendations for the remainder of a shift, using
    /// the user's performance over the lookback period as history.
    pub fn recommend(&self, query: RecommendTasksQuery) -> Result<Vec<TaskRecommendation>> {
        let evaluated = self.evaluate_period(PerformancePeriodQuery {
            user_id: query.user_id.clone(),
            start_date: query.start_date,
            end_date: query.end_date,
        })?;
        let history: HashMap<String, TaskPerformance> = evaluated
            .tasks
            .into_iter()
            .map(|t| (t.performance.task_id.clone(), t.performance))
            .collect();

        let tasks = self.task_repository.list_tasks()?;
        recommend_tasks(
            &tasks,
            &history,
            &query.current_time,
            query.shift_minutes_remaining,
        )
    }
}
