//! Daily dosage schedule assembly and next-dose selection.
//!
//! The caller fetches, per medication group, the active cycle that covers the
//! target date together with its details and each detail's record for that
//! day. This module buckets the enabled slots of each detail's dosage pattern,
//! marks what has been recorded, and computes completion rates. A missing
//! record means the dose has not been taken.

use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dosage::{self, SLOT_MORNING, SLOT_WINDOWS};
use crate::types::{DbId, ItemSeq, Timestamp};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Drug fields shown alongside each scheduled dose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationSummary {
    pub item_seq: ItemSeq,
    pub item_name: String,
    pub entp_name: String,
    pub item_image: Option<String>,
    pub class_name: Option<String>,
    pub dosage_form: Option<String>,
    pub is_prescription: bool,
}

/// The record logged for a detail on the target day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub record_type: String,
    pub record_date: Timestamp,
}

/// One medication detail of a cycle with its governing dosage pattern.
#[derive(Debug, Clone)]
pub struct ScheduledDetail {
    pub medication_detail_id: DbId,
    pub medication: MedicationSummary,
    /// Effective pattern (actual, falling back to standard).
    pub dosage_pattern: Value,
    pub day_record: Option<DayRecord>,
}

/// A medication group paired with the cycle selected for the target date.
#[derive(Debug, Clone)]
pub struct GroupCycle {
    pub group_id: DbId,
    pub group_code: String,
    pub group_name: String,
    pub cycle_id: DbId,
    pub cycle_number: i32,
    pub details: Vec<ScheduledDetail>,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleItem {
    pub medication_detail_id: DbId,
    pub medication: MedicationSummary,
    pub dosage_time: String,
    pub quantity_per_dose: f64,
    pub unit: String,
    pub special_instructions: String,
    pub is_taken_today: bool,
    pub taken_at: Option<Timestamp>,
    pub record_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SlotCompletion {
    pub total: u32,
    pub taken: u32,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSchedule {
    pub group_id: DbId,
    pub group_code: String,
    pub group_name: String,
    pub cycle_id: DbId,
    pub cycle_number: i32,
    pub dosage_times: Vec<String>,
    pub medications_by_time: IndexMap<String, Vec<ScheduleItem>>,
    pub completion_status: IndexMap<String, SlotCompletion>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OverallStats {
    pub total_medications: u32,
    pub total_taken: u32,
    pub total_missed: u32,
    pub overall_completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySchedule {
    pub user_id: DbId,
    pub today_date: NaiveDate,
    pub medication_groups: Vec<GroupSchedule>,
    pub overall_stats: OverallStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextDosage {
    pub next_dosage_time: String,
    pub target_date: NaiveDate,
    pub medications: Vec<ScheduleItem>,
    pub total_count: usize,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// `taken / total`, or 0 when nothing is scheduled.
pub fn completion_rate(taken: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(taken) / f64::from(total)
    }
}

/// Build the schedule of a single group.
///
/// Returns `None` when the cycle has no details or no detail has an enabled
/// slot, so empty groups never reach the response.
pub fn build_group_schedule(group: &GroupCycle) -> Option<GroupSchedule> {
    if group.details.is_empty() {
        return None;
    }

    let mut buckets: IndexMap<String, Vec<ScheduleItem>> = IndexMap::new();

    for detail in &group.details {
        for dose in dosage::enabled_slots(&detail.dosage_pattern) {
            let item = ScheduleItem {
                medication_detail_id: detail.medication_detail_id,
                medication: detail.medication.clone(),
                dosage_time: dose.slot.clone(),
                quantity_per_dose: dose.quantity,
                unit: dose.unit,
                special_instructions: dose.instructions,
                is_taken_today: detail.day_record.is_some(),
                taken_at: detail.day_record.as_ref().map(|r| r.record_date),
                record_type: detail.day_record.as_ref().map(|r| r.record_type.clone()),
            };
            buckets.entry(dose.slot).or_default().push(item);
        }
    }

    if buckets.is_empty() {
        return None;
    }

    let mut dosage_times: Vec<String> = buckets.keys().cloned().collect();
    dosage::sort_slots(&mut dosage_times);

    let mut medications_by_time = IndexMap::with_capacity(dosage_times.len());
    let mut completion_status = IndexMap::with_capacity(dosage_times.len());
    for slot in &dosage_times {
        let items = buckets.swap_remove(slot).unwrap_or_default();
        let total = items.len() as u32;
        let taken = items.iter().filter(|i| i.is_taken_today).count() as u32;
        completion_status.insert(
            slot.clone(),
            SlotCompletion {
                total,
                taken,
                completion_rate: completion_rate(taken, total),
            },
        );
        medications_by_time.insert(slot.clone(), items);
    }

    Some(GroupSchedule {
        group_id: group.group_id,
        group_code: group.group_code.clone(),
        group_name: group.group_name.clone(),
        cycle_id: group.cycle_id,
        cycle_number: group.cycle_number,
        dosage_times,
        medications_by_time,
        completion_status,
    })
}

/// Sum per-slot completion across groups.
pub fn overall_stats(groups: &[GroupSchedule]) -> OverallStats {
    let (total, taken) = groups
        .iter()
        .flat_map(|g| g.completion_status.values())
        .fold((0u32, 0u32), |(total, taken), s| (total + s.total, taken + s.taken));

    OverallStats {
        total_medications: total,
        total_taken: taken,
        total_missed: total - taken,
        overall_completion_rate: completion_rate(taken, total),
    }
}

/// Build the full schedule for a user and date.
pub fn build_daily_schedule(user_id: DbId, date: NaiveDate, groups: &[GroupCycle]) -> DailySchedule {
    let medication_groups: Vec<GroupSchedule> =
        groups.iter().filter_map(build_group_schedule).collect();
    let overall_stats = overall_stats(&medication_groups);

    DailySchedule {
        user_id,
        today_date: date,
        medication_groups,
        overall_stats,
    }
}

/// Pick the next dosage slot after `current_hour`.
///
/// Returns the first timed slot whose window starts strictly after the
/// current hour together with the day offset (0 today, 1 tomorrow). Past the
/// last window the next dose is tomorrow's morning.
pub fn next_slot(current_hour: u32) -> (&'static str, i64) {
    SLOT_WINDOWS
        .iter()
        .find(|w| w.start_hour > current_hour)
        .map(|w| (w.slot, 0))
        .unwrap_or((SLOT_MORNING, 1))
}

/// Resolve the target date for [`next_slot`].
pub fn next_slot_on(today: NaiveDate, current_hour: u32) -> (&'static str, NaiveDate) {
    let (slot, offset) = next_slot(current_hour);
    (slot, today + Duration::days(offset))
}

/// Collect every group's items for `slot` from a schedule.
pub fn next_dosage(schedule: &DailySchedule, slot: &str) -> NextDosage {
    let medications: Vec<ScheduleItem> = schedule
        .medication_groups
        .iter()
        .filter_map(|g| g.medications_by_time.get(slot))
        .flat_map(|items| items.iter().cloned())
        .collect();

    NextDosage {
        next_dosage_time: slot.to_string(),
        target_date: schedule.today_date,
        total_count: medications.len(),
        medications,
    }
}
