use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use care_link_data::models::appointment::{AppointmentRow, NewAppointment};
use care_link_data::repository::{AppointmentRepositoryTrait, UserRepositoryTrait};

use crate::auth::authorize::{Action, Authorizer, Decision, DenyReason, Resource, ResourceKind};
use crate::auth::Principal;
use crate::entities::conversions::convert_to_domain_appointment;
use crate::entities::{
    Appointment, AppointmentStatus, CreateAppointmentRequest, Role, UpdateAppointmentStatusRequest,
};
use crate::services::{validate_request, ServiceError};

/// Trait for appointment service operations
#[async_trait]
pub trait AppointmentServiceTrait: Send + Sync {
    /// Patients see appointments they booked, doctors the ones booked with them.
    /// The participant filter in the query is the access check.
    async fn list(&self, principal: &Principal) -> Result<Vec<Appointment>, ServiceError>;

    /// Book a pending appointment with a doctor
    async fn create(
        &self,
        principal: &Principal,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, ServiceError>;

    /// Approve, reject, complete or cancel. Only the doctor on the appointment may.
    async fn update_status(
        &self,
        principal: &Principal,
        id: i64,
        request: UpdateAppointmentStatusRequest,
    ) -> Result<Appointment, ServiceError>;

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError>;
}

pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    authorizer: Authorizer,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        authorizer: Authorizer,
    ) -> Self {
        Self { appointments, users, authorizer }
    }

    async fn load(&self, principal: &Principal, action: Action, id: i64) -> Result<AppointmentRow, ServiceError> {
        let row = self.appointments.find_by_id(id).await?;
        let resource = row.as_ref().map(describe).transpose()?;
        match self
            .authorizer
            .authorize_existing(principal, action, ResourceKind::Appointment, resource.as_ref())
            .await?
        {
            Decision::Allow => row.ok_or_else(|| DenyReason::NotFound(ResourceKind::Appointment).into()),
            Decision::Deny(reason) => Err(reason.into()),
        }
    }
}

/// Fails on a stored status the domain does not know
fn describe(row: &AppointmentRow) -> Result<Resource, ServiceError> {
    let status = row.status.parse::<AppointmentStatus>().map_err(|e| {
        error!("Appointment {} has an unreadable status: {}", row.id, e);
        ServiceError::Internal(e)
    })?;
    Ok(Resource::Appointment {
        patient_id: row.patient_id,
        doctor_id: row.doctor_id,
        status,
    })
}

pub(crate) fn to_appointments(rows: Vec<AppointmentRow>) -> Result<Vec<Appointment>, ServiceError> {
    rows.into_iter()
        .map(convert_to_domain_appointment)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ServiceError::Internal)
}

#[async_trait]
impl AppointmentServiceTrait for AppointmentService {
    async fn list(&self, principal: &Principal) -> Result<Vec<Appointment>, ServiceError> {
        let rows = match principal.role {
            Role::Patient => self.appointments.list_for_patient(principal.user_id).await?,
            Role::Doctor => self.appointments.list_for_doctor(principal.user_id).await?,
        };
        to_appointments(rows)
    }

    async fn create(
        &self,
        principal: &Principal,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, ServiceError> {
        validate_request(&request)?;

        // The patient side always comes from the caller
        let resource = Resource::Appointment {
            patient_id: principal.user_id,
            doctor_id: request.doctor_id,
            status: AppointmentStatus::Pending,
        };
        self.authorizer.enforce(principal, Action::Create, &resource).await?;

        let doctor = self.users.find_by_id(request.doctor_id).await?;
        if !matches!(doctor, Some(ref user) if user.role == Role::Doctor.as_str()) {
            return Err(ServiceError::NotFound(format!("Doctor {} not found", request.doctor_id)));
        }

        let row = self
            .appointments
            .create(NewAppointment {
                patient_id: principal.user_id,
                doctor_id: request.doctor_id,
                date: request.date,
                reason: request.reason.filter(|r| !r.trim().is_empty()),
                status: AppointmentStatus::Pending.as_str().to_string(),
            })
            .await?;

        info!(
            "Appointment {} booked by patient {} with doctor {}",
            row.id, row.patient_id, row.doctor_id
        );
        convert_to_domain_appointment(row).map_err(ServiceError::Internal)
    }

    async fn update_status(
        &self,
        principal: &Principal,
        id: i64,
        request: UpdateAppointmentStatusRequest,
    ) -> Result<Appointment, ServiceError> {
        let current = self.load(principal, Action::Update, id).await?;

        let row = self
            .appointments
            .update_status(current.id, request.status.as_str())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Appointment {} not found", id)))?;

        info!(
            "Appointment {} moved from {} to {} by doctor {}",
            id, current.status, request.status, principal.user_id
        );
        convert_to_domain_appointment(row).map_err(ServiceError::Internal)
    }

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError> {
        self.load(principal, Action::Delete, id).await?;

        if !self.appointments.delete(id).await? {
            return Err(ServiceError::NotFound(format!("Appointment {} not found", id)));
        }
        info!("Appointment {} deleted by user {}", id, principal.user_id);
        Ok(())
    }
}
