//! Prescription renewal: one transaction that retires the old prescription
//! and builds everything the new one needs.

use bokyak_core::alerts::{ALERT_DOSAGE, DEFAULT_DOSAGE_MESSAGE};
use bokyak_core::renewal::{default_alerts, default_group_name};
use bokyak_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::medication_cycle::CreateMedicationCycle;
use crate::models::medication_detail::CreateMedicationDetail;
use crate::models::medication_group::CreateMedicationGroup;
use crate::models::prescription::CreatePrescription;
use crate::models::prescription_medication::CreatePrescriptionMedication;
use crate::models::renewal::{RenewPrescription, RenewalOutcome};
use crate::repositories::{
    MedicalInfoRepo, MedicationAlertRepo, MedicationCycleRepo, MedicationDetailRepo,
    MedicationGroupRepo, PrescriptionMedicationRepo, PrescriptionRepo,
};

/// Executes prescription renewals.
pub struct RenewalRepo;

impl RenewalRepo {
    /// Renew a prescription atomically.
    ///
    /// The caller must have validated `input.medications`, computed
    /// `cycle_end` from their durations and verified that the hospital,
    /// illness and old prescription belong to `user_id`.
    /// Either every step commits or none does:
    ///
    /// 1. insert the new prescription linked to the old one
    /// 2. deactivate the old prescription and close its groups' active cycles on `today`
    /// 3. get or create the primary medical info and point it at the new prescription
    /// 4. create the group
    /// 5. create the prescription lines in the group
    /// 6. create the next cycle ending on `cycle_end`
    /// 7. create one detail per line
    /// 8. create default DOSAGE alerts per enabled slot
    pub async fn renew(
        pool: &PgPool,
        user_id: DbId,
        input: &RenewPrescription,
        cycle_end: Option<Date>,
        today: Date,
    ) -> Result<RenewalOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let prescription = PrescriptionRepo::insert_with(
            &mut tx,
            user_id,
            &CreatePrescription {
                prescription_date: input.prescription_date,
                previous_prescription_id: input.old_prescription_id,
                is_active: Some(true),
            },
        )
        .await?;

        if let Some(old_id) = input.old_prescription_id {
            PrescriptionRepo::deactivate_with(&mut tx, old_id, user_id).await?;
            let closed =
                MedicationCycleRepo::close_for_prescription_with(&mut tx, old_id, today).await?;
            tracing::debug!(old_prescription_id = old_id, closed, "Closed superseded cycles");
        }

        let medical_info = MedicalInfoRepo::attach_prescription_with(
            &mut tx,
            user_id,
            input.hospital_id,
            input.illness_id,
            prescription.id,
        )
        .await?;

        let group_name = input
            .group_name
            .clone()
            .unwrap_or_else(|| default_group_name(input.prescription_date));
        let group = MedicationGroupRepo::insert_with(
            &mut tx,
            &CreateMedicationGroup {
                medical_info_id: medical_info.id,
                prescription_id: Some(prescription.id),
                group_name,
                reminder_enabled: Some(true),
            },
        )
        .await?;

        let mut lines = Vec::with_capacity(input.medications.len());
        for med in &input.medications {
            let line = PrescriptionMedicationRepo::insert_with(
                &mut tx,
                &CreatePrescriptionMedication {
                    prescription_id: prescription.id,
                    group_id: Some(group.id),
                    medication_id: med.medication_id,
                    standard_dosage_pattern: med.dosage_pattern.clone(),
                    duration_days: med.duration_days,
                    total_quantity: med.total_quantity,
                },
            )
            .await?;
            lines.push(line);
        }

        let cycle = MedicationCycleRepo::insert_with(
            &mut tx,
            &CreateMedicationCycle {
                group_id: group.id,
                cycle_number: None,
                cycle_start: input.prescription_date,
                cycle_end,
                is_active: Some(true),
            },
        )
        .await?;

        let mut detail_ids = Vec::with_capacity(lines.len());
        let mut alert_count = 0;
        for line in &lines {
            let detail = MedicationDetailRepo::insert_with(
                &mut tx,
                &CreateMedicationDetail {
                    cycle_id: cycle.id,
                    prescription_medication_id: line.id,
                    actual_dosage_pattern: Some(line.standard_dosage_pattern.clone()),
                    remaining_quantity: Some(line.total_quantity),
                    patient_adjustments: None,
                },
            )
            .await?;

            for planned in default_alerts(&line.standard_dosage_pattern) {
                MedicationAlertRepo::insert_with(
                    &mut tx,
                    detail.id,
                    ALERT_DOSAGE,
                    planned.alert_time,
                    DEFAULT_DOSAGE_MESSAGE,
                )
                .await?;
                alert_count += 1;
            }
            detail_ids.push(detail.id);
        }

        tx.commit().await?;

        Ok(RenewalOutcome {
            prescription_id: prescription.id,
            prescription_code: prescription.prescription_code,
            group_id: group.id,
            group_code: group.group_code,
            cycle_id: cycle.id,
            medical_info_id: medical_info.id,
            detail_ids,
            alert_count,
        })
    }
}
