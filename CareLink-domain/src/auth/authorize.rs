//! Access decisions for every resource in the system.
//!
//! Services describe the record they are about to touch as a [`Resource`]
//! (its kind plus ownership fields) and ask the [`Authorizer`] whether the
//! [`Principal`] may perform an [`Action`] on it. Most rules are pure
//! comparisons of ids and roles. The doctor to patient grant is derived:
//! it holds while at least one appointment links the two, and is looked up
//! on every decision.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use care_link_data::repository::{AppointmentRepository, AppointmentRepositoryTrait, RepositoryError};

use crate::auth::logging::log_access_denied;
use crate::auth::Principal;
use crate::entities::{AppointmentStatus, Role};
use crate::services::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Appointment,
    Prescription,
    Medication,
    Reminder,
    SymptomDiary,
    Message,
    HealthRecord,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Appointment => "Appointment",
            ResourceKind::Prescription => "Prescription",
            ResourceKind::Medication => "Medication",
            ResourceKind::Reminder => "Reminder",
            ResourceKind::SymptomDiary => "Symptom diary entry",
            ResourceKind::Message => "Message",
            ResourceKind::HealthRecord => "Health record",
        };
        f.write_str(name)
    }
}

/// A record described by the fields that decide who may touch it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Appointment {
        patient_id: i64,
        doctor_id: i64,
        status: AppointmentStatus,
    },
    Prescription {
        patient_id: i64,
        doctor_id: i64,
    },
    Medication {
        user_id: i64,
    },
    Reminder {
        user_id: i64,
    },
    SymptomDiary {
        user_id: i64,
    },
    Message {
        sender_id: i64,
        receiver_id: i64,
    },
    HealthRecord {
        patient_id: i64,
    },
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Appointment { .. } => ResourceKind::Appointment,
            Resource::Prescription { .. } => ResourceKind::Prescription,
            Resource::Medication { .. } => ResourceKind::Medication,
            Resource::Reminder { .. } => ResourceKind::Reminder,
            Resource::SymptomDiary { .. } => ResourceKind::SymptomDiary,
            Resource::Message { .. } => ResourceKind::Message,
            Resource::HealthRecord { .. } => ResourceKind::HealthRecord,
        }
    }

    fn audit_details(&self) -> String {
        match self {
            Resource::Appointment { patient_id, doctor_id, status } => {
                format!("patient_id={} doctor_id={} status={}", patient_id, doctor_id, status)
            }
            Resource::Prescription { patient_id, doctor_id } => {
                format!("patient_id={} doctor_id={}", patient_id, doctor_id)
            }
            Resource::Medication { user_id }
            | Resource::Reminder { user_id }
            | Resource::SymptomDiary { user_id } => format!("user_id={}", user_id),
            Resource::Message { sender_id, receiver_id } => {
                format!("sender_id={} receiver_id={}", sender_id, receiver_id)
            }
            Resource::HealthRecord { patient_id } => format!("patient_id={}", patient_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The action is reserved for another role
    WrongRole { required: Role },
    /// The principal is not the owner or a participant
    NotOwner,
    /// A doctor without any appointment with the patient
    NotLinked,
    NotFound(ResourceKind),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::WrongRole { required } => write!(f, "wrong_role required={}", required),
            DenyReason::NotOwner => write!(f, "not_owner"),
            DenyReason::NotLinked => write!(f, "not_linked"),
            DenyReason::NotFound(kind) => write!(f, "not_found kind={}", kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Answers whether a doctor and a patient share at least one appointment
#[async_trait]
pub trait CareRelationshipLookup: Send + Sync {
    async fn has_care_relationship(&self, doctor_id: i64, patient_id: i64) -> Result<bool, RepositoryError>;
}

#[async_trait]
impl CareRelationshipLookup for AppointmentRepository {
    async fn has_care_relationship(&self, doctor_id: i64, patient_id: i64) -> Result<bool, RepositoryError> {
        self.has_appointment_between(doctor_id, patient_id).await
    }
}

/// Result of the static rules. Some reads need the relationship lookup to finish.
#[derive(Debug, PartialEq, Eq)]
enum Rule {
    Decided(Decision),
    RequiresCareRelationship { doctor_id: i64, patient_id: i64 },
}

fn allow() -> Rule {
    Rule::Decided(Decision::Allow)
}

fn deny(reason: DenyReason) -> Rule {
    Rule::Decided(Decision::Deny(reason))
}

fn owner_only(principal: &Principal, owner_id: i64) -> Rule {
    if principal.user_id == owner_id {
        allow()
    } else {
        deny(DenyReason::NotOwner)
    }
}

fn role_and_owner(principal: &Principal, required: Role, owner_id: i64) -> Rule {
    if principal.role != required {
        deny(DenyReason::WrongRole { required })
    } else {
        owner_only(principal, owner_id)
    }
}

fn either_participant(principal: &Principal, first: i64, second: i64) -> Rule {
    if principal.user_id == first || principal.user_id == second {
        allow()
    } else {
        deny(DenyReason::NotOwner)
    }
}

/// Owner reads directly; any other doctor needs an appointment with the patient
fn owner_or_linked_doctor(principal: &Principal, patient_id: i64) -> Rule {
    if principal.user_id == patient_id {
        allow()
    } else if principal.role == Role::Doctor {
        Rule::RequiresCareRelationship {
            doctor_id: principal.user_id,
            patient_id,
        }
    } else {
        deny(DenyReason::NotOwner)
    }
}

fn evaluate(principal: &Principal, action: Action, resource: &Resource) -> Rule {
    match (*resource, action) {
        (Resource::Appointment { patient_id, .. }, Action::Create) => {
            role_and_owner(principal, Role::Patient, patient_id)
        }
        (Resource::Appointment { doctor_id, .. }, Action::Update) => {
            role_and_owner(principal, Role::Doctor, doctor_id)
        }
        (Resource::Appointment { patient_id, doctor_id, .. }, Action::Read | Action::Delete) => {
            either_participant(principal, patient_id, doctor_id)
        }

        (Resource::Prescription { patient_id, doctor_id }, Action::Read) => {
            either_participant(principal, patient_id, doctor_id)
        }
        (Resource::Prescription { doctor_id, .. }, Action::Create | Action::Update | Action::Delete) => {
            role_and_owner(principal, Role::Doctor, doctor_id)
        }

        (Resource::Medication { user_id } | Resource::Reminder { user_id }, Action::Create) => {
            role_and_owner(principal, Role::Patient, user_id)
        }
        (Resource::Medication { user_id } | Resource::Reminder { user_id }, _) => {
            owner_only(principal, user_id)
        }

        (Resource::SymptomDiary { user_id }, Action::Create) => {
            role_and_owner(principal, Role::Patient, user_id)
        }
        (Resource::SymptomDiary { user_id }, Action::Read) => owner_or_linked_doctor(principal, user_id),
        (Resource::SymptomDiary { user_id }, Action::Update | Action::Delete) => {
            owner_only(principal, user_id)
        }

        (Resource::HealthRecord { patient_id }, Action::Create) => {
            role_and_owner(principal, Role::Patient, patient_id)
        }
        (Resource::HealthRecord { patient_id }, Action::Read) => owner_or_linked_doctor(principal, patient_id),
        (Resource::HealthRecord { patient_id }, Action::Update | Action::Delete) => {
            owner_only(principal, patient_id)
        }

        (Resource::Message { sender_id, receiver_id }, Action::Read) => {
            either_participant(principal, sender_id, receiver_id)
        }
        (Resource::Message { sender_id, .. }, Action::Create | Action::Delete) => {
            owner_only(principal, sender_id)
        }
        (Resource::Message { receiver_id, .. }, Action::Update) => owner_only(principal, receiver_id),
    }
}

/// The single place access decisions are made
#[derive(Clone)]
pub struct Authorizer {
    relationships: Arc<dyn CareRelationshipLookup>,
}

impl Authorizer {
    pub fn new(relationships: Arc<dyn CareRelationshipLookup>) -> Self {
        Self { relationships }
    }

    /// Decide whether `principal` may perform `action` on `resource`.
    /// A failing relationship lookup is an error, never a silent denial.
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> Result<Decision, ServiceError> {
        let decision = match evaluate(principal, action, resource) {
            Rule::Decided(decision) => decision,
            Rule::RequiresCareRelationship { doctor_id, patient_id } => {
                if self.relationships.has_care_relationship(doctor_id, patient_id).await? {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::NotLinked)
                }
            }
        };

        match decision {
            Decision::Allow => debug!(
                "Allowed {} {} for user {} ({})",
                action,
                resource.kind(),
                principal.user_id,
                principal.role
            ),
            Decision::Deny(reason) => record_denial(principal, action, resource.kind(), reason, Some(resource)),
        }
        Ok(decision)
    }

    /// Like [`Authorizer::authorize`], with a missing record denied as not found
    pub async fn authorize_existing(
        &self,
        principal: &Principal,
        action: Action,
        kind: ResourceKind,
        resource: Option<&Resource>,
    ) -> Result<Decision, ServiceError> {
        match resource {
            Some(resource) => self.authorize(principal, action, resource).await,
            None => {
                let reason = DenyReason::NotFound(kind);
                record_denial(principal, action, kind, reason, None);
                Ok(Decision::Deny(reason))
            }
        }
    }

    /// Authorize and turn a denial into the matching service error
    pub async fn enforce(&self, principal: &Principal, action: Action, resource: &Resource) -> Result<(), ServiceError> {
        match self.authorize(principal, action, resource).await? {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason.into()),
        }
    }

    /// Enforce access to a record that was just loaded, handing the record back on success
    pub async fn enforce_existing<T, F>(
        &self,
        principal: &Principal,
        action: Action,
        kind: ResourceKind,
        record: Option<T>,
        describe: F,
    ) -> Result<T, ServiceError>
    where
        T: Send,
        F: FnOnce(&T) -> Resource + Send,
    {
        let resource = record.as_ref().map(describe);
        match self.authorize_existing(principal, action, kind, resource.as_ref()).await? {
            Decision::Allow => record.ok_or_else(|| DenyReason::NotFound(kind).into()),
            Decision::Deny(reason) => Err(reason.into()),
        }
    }

    /// Role gate for operations that are not about a single record, such as listings
    pub fn require_role(&self, principal: &Principal, required: Role, what: &str) -> Result<(), ServiceError> {
        if principal.role == required {
            return Ok(());
        }
        let reason = DenyReason::WrongRole { required };
        log_access_denied(principal.user_id, what, &format!("reason={}", reason));
        Err(reason.into())
    }
}

fn record_denial(
    principal: &Principal,
    action: Action,
    kind: ResourceKind,
    reason: DenyReason,
    resource: Option<&Resource>,
) {
    let mut details = format!("action={} role={} reason={}", action, principal.role, reason);
    if let Some(resource) = resource {
        details.push(' ');
        details.push_str(&resource.audit_details());
    }
    log_access_denied(principal.user_id, &kind.to_string(), &details);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PATIENT: i64 = 1;
    const DOCTOR: i64 = 2;
    const OTHER_DOCTOR: i64 = 3;
    const OTHER_PATIENT: i64 = 4;

    /// Relationships as a fixed set of (doctor, patient) pairs
    struct FixedRelationships {
        pairs: HashSet<(i64, i64)>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CareRelationshipLookup for FixedRelationships {
        async fn has_care_relationship(&self, doctor_id: i64, patient_id: i64) -> Result<bool, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pairs.contains(&(doctor_id, patient_id)))
        }
    }

    struct BrokenLookup;

    #[async_trait]
    impl CareRelationshipLookup for BrokenLookup {
        async fn has_care_relationship(&self, _: i64, _: i64) -> Result<bool, RepositoryError> {
            Err(RepositoryError::Validation("lookup failed".to_string()))
        }
    }

    fn authorizer_with(pairs: &[(i64, i64)]) -> (Authorizer, Arc<FixedRelationships>) {
        let lookup = Arc::new(FixedRelationships {
            pairs: pairs.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        });
        (Authorizer::new(lookup.clone()), lookup)
    }

    fn patient(id: i64) -> Principal {
        Principal { user_id: id, role: Role::Patient }
    }

    fn doctor(id: i64) -> Principal {
        Principal { user_id: id, role: Role::Doctor }
    }

    fn appointment() -> Resource {
        Resource::Appointment {
            patient_id: PATIENT,
            doctor_id: DOCTOR,
            status: AppointmentStatus::Pending,
        }
    }

    async fn decide(authorizer: &Authorizer, principal: Principal, action: Action, resource: Resource) -> Decision {
        authorizer.authorize(&principal, action, &resource).await.unwrap()
    }

    #[tokio::test]
    async fn test_dual_owner_resources_deny_third_parties() {
        let (authorizer, _) = authorizer_with(&[]);
        let prescription = Resource::Prescription { patient_id: PATIENT, doctor_id: DOCTOR };

        for resource in [appointment(), prescription] {
            assert_eq!(decide(&authorizer, patient(PATIENT), Action::Read, resource).await, Decision::Allow);
            assert_eq!(decide(&authorizer, doctor(DOCTOR), Action::Read, resource).await, Decision::Allow);
            assert_eq!(
                decide(&authorizer, doctor(OTHER_DOCTOR), Action::Read, resource).await,
                Decision::Deny(DenyReason::NotOwner)
            );
            assert_eq!(
                decide(&authorizer, patient(OTHER_PATIENT), Action::Read, resource).await,
                Decision::Deny(DenyReason::NotOwner)
            );
        }
    }

    #[tokio::test]
    async fn test_doctor_cannot_create_appointment() {
        let (authorizer, _) = authorizer_with(&[]);
        let resource = Resource::Appointment {
            patient_id: DOCTOR,
            doctor_id: OTHER_DOCTOR,
            status: AppointmentStatus::Pending,
        };
        assert_eq!(
            decide(&authorizer, doctor(DOCTOR), Action::Create, resource).await,
            Decision::Deny(DenyReason::WrongRole { required: Role::Patient })
        );
        assert_eq!(decide(&authorizer, patient(PATIENT), Action::Create, appointment()).await, Decision::Allow);
    }

    #[tokio::test]
    async fn test_patient_cannot_book_for_someone_else() {
        let (authorizer, _) = authorizer_with(&[]);
        assert_eq!(
            decide(&authorizer, patient(OTHER_PATIENT), Action::Create, appointment()).await,
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[tokio::test]
    async fn test_only_named_doctor_updates_appointment_status() {
        let (authorizer, _) = authorizer_with(&[]);
        assert_eq!(decide(&authorizer, doctor(DOCTOR), Action::Update, appointment()).await, Decision::Allow);
        assert_eq!(
            decide(&authorizer, doctor(OTHER_DOCTOR), Action::Update, appointment()).await,
            Decision::Deny(DenyReason::NotOwner)
        );
        assert_eq!(
            decide(&authorizer, patient(PATIENT), Action::Update, appointment()).await,
            Decision::Deny(DenyReason::WrongRole { required: Role::Doctor })
        );
    }

    #[tokio::test]
    async fn test_either_participant_may_delete_appointment() {
        let (authorizer, _) = authorizer_with(&[]);
        assert_eq!(decide(&authorizer, patient(PATIENT), Action::Delete, appointment()).await, Decision::Allow);
        assert_eq!(decide(&authorizer, doctor(DOCTOR), Action::Delete, appointment()).await, Decision::Allow);
        assert_eq!(
            decide(&authorizer, doctor(OTHER_DOCTOR), Action::Delete, appointment()).await,
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[tokio::test]
    async fn test_prescriptions_are_written_by_doctors_only() {
        let (authorizer, _) = authorizer_with(&[]);
        let own = Resource::Prescription { patient_id: PATIENT, doctor_id: DOCTOR };
        assert_eq!(decide(&authorizer, doctor(DOCTOR), Action::Create, own).await, Decision::Allow);
        assert_eq!(
            decide(&authorizer, doctor(OTHER_DOCTOR), Action::Create, own).await,
            Decision::Deny(DenyReason::NotOwner)
        );
        let by_patient = Resource::Prescription { patient_id: PATIENT, doctor_id: PATIENT };
        assert_eq!(
            decide(&authorizer, patient(PATIENT), Action::Create, by_patient).await,
            Decision::Deny(DenyReason::WrongRole { required: Role::Doctor })
        );
    }

    #[tokio::test]
    async fn test_single_owner_resources() {
        let (authorizer, _) = authorizer_with(&[(DOCTOR, PATIENT)]);
        let owned = [
            Resource::Medication { user_id: PATIENT },
            Resource::Reminder { user_id: PATIENT },
        ];

        for resource in owned {
            for action in [Action::Read, Action::Update, Action::Delete] {
                assert_eq!(decide(&authorizer, patient(PATIENT), action, resource).await, Decision::Allow);
                assert_eq!(
                    decide(&authorizer, patient(OTHER_PATIENT), action, resource).await,
                    Decision::Deny(DenyReason::NotOwner)
                );
                // A care relationship grants nothing here
                assert_eq!(
                    decide(&authorizer, doctor(DOCTOR), action, resource).await,
                    Decision::Deny(DenyReason::NotOwner)
                );
            }
            assert_eq!(decide(&authorizer, patient(PATIENT), Action::Create, resource).await, Decision::Allow);
        }
    }

    #[tokio::test]
    async fn test_single_owner_create_requires_patient_role() {
        let (authorizer, _) = authorizer_with(&[]);
        for resource in [
            Resource::Medication { user_id: DOCTOR },
            Resource::Reminder { user_id: DOCTOR },
            Resource::SymptomDiary { user_id: DOCTOR },
            Resource::HealthRecord { patient_id: DOCTOR },
        ] {
            assert_eq!(
                decide(&authorizer, doctor(DOCTOR), Action::Create, resource).await,
                Decision::Deny(DenyReason::WrongRole { required: Role::Patient })
            );
        }
    }

    #[tokio::test]
    async fn test_linked_doctor_reads_health_records_and_diary() {
        let (authorizer, lookup) = authorizer_with(&[(DOCTOR, PATIENT)]);

        for resource in [
            Resource::HealthRecord { patient_id: PATIENT },
            Resource::SymptomDiary { user_id: PATIENT },
        ] {
            assert_eq!(decide(&authorizer, doctor(DOCTOR), Action::Read, resource).await, Decision::Allow);
            assert_eq!(
                decide(&authorizer, doctor(OTHER_DOCTOR), Action::Read, resource).await,
                Decision::Deny(DenyReason::NotLinked)
            );
            assert_eq!(
                decide(&authorizer, patient(OTHER_PATIENT), Action::Read, resource).await,
                Decision::Deny(DenyReason::NotOwner)
            );
            // Reading never extends to changes
            assert_eq!(
                decide(&authorizer, doctor(DOCTOR), Action::Delete, resource).await,
                Decision::Deny(DenyReason::NotOwner)
            );
        }

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_owner_read_skips_lookup() {
        let (authorizer, lookup) = authorizer_with(&[]);
        let record = Resource::HealthRecord { patient_id: PATIENT };
        assert_eq!(decide(&authorizer, patient(PATIENT), Action::Read, record).await, Decision::Allow);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_an_error() {
        let authorizer = Authorizer::new(Arc::new(BrokenLookup));
        let result = authorizer
            .authorize(&doctor(DOCTOR), Action::Read, &Resource::HealthRecord { patient_id: PATIENT })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_message_rules() {
        let (authorizer, _) = authorizer_with(&[]);
        let message = Resource::Message { sender_id: PATIENT, receiver_id: DOCTOR };

        assert_eq!(decide(&authorizer, patient(PATIENT), Action::Read, message).await, Decision::Allow);
        assert_eq!(decide(&authorizer, doctor(DOCTOR), Action::Read, message).await, Decision::Allow);
        assert_eq!(
            decide(&authorizer, doctor(OTHER_DOCTOR), Action::Read, message).await,
            Decision::Deny(DenyReason::NotOwner)
        );

        // Only the receiver marks it read, only the sender sends or deletes
        assert_eq!(decide(&authorizer, doctor(DOCTOR), Action::Update, message).await, Decision::Allow);
        assert_eq!(
            decide(&authorizer, patient(PATIENT), Action::Update, message).await,
            Decision::Deny(DenyReason::NotOwner)
        );
        assert_eq!(decide(&authorizer, patient(PATIENT), Action::Create, message).await, Decision::Allow);
        assert_eq!(
            decide(&authorizer, doctor(DOCTOR), Action::Create, message).await,
            Decision::Deny(DenyReason::NotOwner)
        );
        assert_eq!(decide(&authorizer, patient(PATIENT), Action::Delete, message).await, Decision::Allow);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let (authorizer, _) = authorizer_with(&[]);
        let decision = authorizer
            .authorize_existing(&patient(PATIENT), Action::Read, ResourceKind::Medication, None)
            .await
            .unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::NotFound(ResourceKind::Medication)));

        let err = authorizer
            .enforce_existing(&patient(PATIENT), Action::Read, ResourceKind::Medication, None::<i64>, |_| {
                Resource::Medication { user_id: PATIENT }
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_enforce_existing_returns_record() {
        let (authorizer, _) = authorizer_with(&[]);
        let record = authorizer
            .enforce_existing(&patient(PATIENT), Action::Update, ResourceKind::Reminder, Some(99_i64), |_| {
                Resource::Reminder { user_id: PATIENT }
            })
            .await
            .unwrap();
        assert_eq!(record, 99);

        let err = authorizer
            .enforce_existing(&patient(OTHER_PATIENT), Action::Update, ResourceKind::Reminder, Some(99_i64), |_| {
                Resource::Reminder { user_id: PATIENT }
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn test_require_role() {
        let (authorizer, _) = authorizer_with(&[]);
        assert!(authorizer.require_role(&doctor(DOCTOR), Role::Doctor, "patient list").is_ok());
        assert!(matches!(
            authorizer.require_role(&patient(PATIENT), Role::Doctor, "patient list"),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn test_resource_kind_names() {
        let message = Resource::Message { sender_id: PATIENT, receiver_id: DOCTOR };
        assert_eq!(message.kind(), ResourceKind::Message);
        assert_eq!(ResourceKind::SymptomDiary.to_string(), "Symptom diary entry");
        assert_eq!(
            DenyReason::NotFound(ResourceKind::HealthRecord).to_string(),
            "not_found kind=Health record"
        );
    }
}
