use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use care_link_data::repository::{AppointmentRepositoryTrait, MedicationRepositoryTrait, ReminderRepositoryTrait};

use crate::auth::authorize::Authorizer;
use crate::auth::Principal;
use crate::entities::conversions::convert_to_domain_medication;
use crate::entities::{AppointmentStatus, Medication, PatientDashboard, Role};
use crate::services::appointment::to_appointments;
use crate::services::reminder::to_reminders;
use crate::services::ServiceError;

const UPCOMING_APPOINTMENTS: usize = 5;

#[async_trait]
pub trait DashboardServiceTrait: Send + Sync {
    async fn patient_dashboard(&self, principal: &Principal) -> Result<PatientDashboard, ServiceError>;
}

pub struct DashboardService {
    medications: Arc<dyn MedicationRepositoryTrait>,
    reminders: Arc<dyn ReminderRepositoryTrait>,
    appointments: Arc<dyn AppointmentRepositoryTrait>,
    authorizer: Authorizer,
}

impl DashboardService {
    pub fn new(
        medications: Arc<dyn MedicationRepositoryTrait>,
        reminders: Arc<dyn ReminderRepositoryTrait>,
        appointments: Arc<dyn AppointmentRepositoryTrait>,
        authorizer: Authorizer,
    ) -> Self {
        Self {
            medications,
            reminders,
            appointments,
            authorizer,
        }
    }
}

#[async_trait]
impl DashboardServiceTrait for DashboardService {
    async fn patient_dashboard(&self, principal: &Principal) -> Result<PatientDashboard, ServiceError> {
        self.authorizer.require_role(principal, Role::Patient, "patient dashboard")?;

        let medications: Vec<Medication> = self
            .medications
            .list_for_user(principal.user_id)
            .await?
            .into_iter()
            .map(convert_to_domain_medication)
            .collect();
        let reminders = to_reminders(self.reminders.list_active_for_user(principal.user_id).await?)?;
        let upcoming_appointments = to_appointments(
            self.appointments
                .list_upcoming_for_patient(
                    principal.user_id,
                    AppointmentStatus::Approved.as_str(),
                    Utc::now(),
                    UPCOMING_APPOINTMENTS,
                )
                .await?,
        )?;
        let low_stock_medications = medications
            .iter()
            .filter(|m| m.stock_level.needs_refill())
            .cloned()
            .collect();

        Ok(PatientDashboard {
            medications,
            reminders,
            upcoming_appointments,
            low_stock_medications,
        })
    }
}
