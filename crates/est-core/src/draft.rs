//! In-memory construction of a new estimate (the `Building` state).
//!
//! A draft collects the estimate header, role bindings, and tasks entirely in
//! memory; nothing is visible externally until `est-db` commits it in one
//! transaction. Bindings and tasks live in stable slots: removing one vacates
//! its slot and never renumbers the rest, so task → binding references stay
//! valid across edits. At commit time slot indices are resolved to generated
//! row ids in slot order.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::enums::{Currency, DurationUnit, EstimateType};
use crate::errors::CoreError;
use crate::input::InputDocument;

/// Stable reference to a binding slot within one draft.
///
/// Only meaningful for the draft that issued it; never exposed as a
/// standalone resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingRef(usize);

impl BindingRef {
    /// Slot index, used by the commit routine to order the ref → rowid map.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Stable reference to a task slot within one draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskRef(usize);

/// A sold role → internal role mapping awaiting commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleBinding {
    pub sold_role_id: i64,
    pub internal_role_id: i64,
}

/// A task awaiting commit. `bindings` holds deduplicated refs in the order
/// they were assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftTask {
    pub description: String,
    pub days: Decimal,
    pub bindings: Vec<BindingRef>,
}

/// Header fields of a new estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateHeader {
    pub project_name: String,
    pub client_name: String,
    pub estimate_type: EstimateType,
    pub start_date: NaiveDate,
    pub duration: i64,
    pub duration_unit: DurationUnit,
    pub currency: Currency,
}

/// The in-memory building state for one estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateDraft {
    header: EstimateHeader,
    bindings: Vec<Option<RoleBinding>>,
    tasks: Vec<Option<DraftTask>>,
}

impl EstimateDraft {
    /// Start a draft from a validated header.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if a name field is blank or the
    /// duration is not positive.
    pub fn new(header: EstimateHeader) -> Result<Self, CoreError> {
        if header.project_name.trim().is_empty() {
            return Err(CoreError::Validation("project name is required".into()));
        }
        if header.client_name.trim().is_empty() {
            return Err(CoreError::Validation("client name is required".into()));
        }
        if header.duration <= 0 {
            return Err(CoreError::Validation(format!(
                "duration must be positive, got {}",
                header.duration
            )));
        }
        Ok(Self {
            header,
            bindings: Vec::new(),
            tasks: Vec::new(),
        })
    }

    /// Build a draft from a client-submitted document.
    ///
    /// Duration unit defaults to weeks and currency to GBP when omitted,
    /// matching the wizard's defaults.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for header problems, blank task
    /// descriptions, or negative day counts, and `CoreError::UnknownReference`
    /// for a `roleIndices` entry outside the `projectRoles` array.
    pub fn from_input(doc: InputDocument) -> Result<Self, CoreError> {
        let mut draft = Self::new(EstimateHeader {
            project_name: doc.project_name,
            client_name: doc.client_name,
            estimate_type: doc.estimate_type,
            start_date: doc.start_date,
            duration: doc.duration,
            duration_unit: doc.duration_unit.unwrap_or(DurationUnit::Weeks),
            currency: doc.currency.unwrap_or(Currency::Gbp),
        })?;

        // Slot order matches the document's projectRoles order, so a role
        // index is exactly a binding slot here.
        let mut refs = Vec::with_capacity(doc.project_roles.len());
        for role in &doc.project_roles {
            refs.push(draft.bind(role.sold_role_id, role.internal_role_id));
        }

        for task in &doc.tasks {
            let mut bound = Vec::with_capacity(task.role_indices.len());
            for &index in &task.role_indices {
                let binding = *refs.get(index).ok_or(CoreError::UnknownReference {
                    kind: "role",
                    index,
                })?;
                bound.push(binding);
            }
            draft.add_task(&task.description, task.days, &bound)?;
        }

        Ok(draft)
    }

    #[must_use]
    pub const fn header(&self) -> &EstimateHeader {
        &self.header
    }

    /// Map a sold role onto an internal costing role. `internal_role_id`
    /// omitted means no cost remap (internal = sold).
    pub fn bind(&mut self, sold_role_id: i64, internal_role_id: Option<i64>) -> BindingRef {
        self.bindings.push(Some(RoleBinding {
            sold_role_id,
            internal_role_id: internal_role_id.unwrap_or(sold_role_id),
        }));
        BindingRef(self.bindings.len() - 1)
    }

    /// Replace the internal role of an in-flight binding.
    ///
    /// Does not create a new binding — task assignments referencing the slot
    /// remain valid.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownReference` if the slot is vacant.
    pub fn update_mapping(
        &mut self,
        binding: BindingRef,
        internal_role_id: i64,
    ) -> Result<(), CoreError> {
        match self.bindings.get_mut(binding.0) {
            Some(Some(b)) => {
                b.internal_role_id = internal_role_id;
                Ok(())
            }
            _ => Err(CoreError::UnknownReference {
                kind: "binding",
                index: binding.0,
            }),
        }
    }

    /// Remove a binding and strip it from every task's assignment set.
    ///
    /// The slot is vacated, not compacted — refs to remaining bindings stay
    /// stable.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownReference` if the slot is already vacant.
    pub fn remove_binding(&mut self, binding: BindingRef) -> Result<(), CoreError> {
        match self.bindings.get_mut(binding.0) {
            Some(slot @ Some(_)) => {
                *slot = None;
            }
            _ => {
                return Err(CoreError::UnknownReference {
                    kind: "binding",
                    index: binding.0,
                });
            }
        }
        for task in self.tasks.iter_mut().flatten() {
            task.bindings.retain(|b| *b != binding);
        }
        Ok(())
    }

    /// Add a task consuming `days` of effort against each referenced binding.
    ///
    /// An empty `bindings` set is tolerated (the task will contribute zero
    /// cost and revenue) but flagged. Duplicate refs collapse to one
    /// assignment.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank description or negative
    /// days, and `CoreError::UnknownReference` for a ref to a vacant slot.
    pub fn add_task(
        &mut self,
        description: &str,
        days: Decimal,
        bindings: &[BindingRef],
    ) -> Result<TaskRef, CoreError> {
        if description.trim().is_empty() {
            return Err(CoreError::Validation("task description is required".into()));
        }
        if days < Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "task days must be >= 0, got {days}"
            )));
        }

        let mut deduped: Vec<BindingRef> = Vec::with_capacity(bindings.len());
        for &binding in bindings {
            if self.binding(binding).is_none() {
                return Err(CoreError::UnknownReference {
                    kind: "binding",
                    index: binding.0,
                });
            }
            if !deduped.contains(&binding) {
                deduped.push(binding);
            }
        }

        if deduped.is_empty() {
            tracing::warn!(description, "task has no role bindings; it will cost nothing");
        }

        self.tasks.push(Some(DraftTask {
            description: description.trim().to_string(),
            days,
            bindings: deduped,
        }));
        Ok(TaskRef(self.tasks.len() - 1))
    }

    /// Remove a task. Remaining task refs stay stable.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownReference` if the slot is already vacant.
    pub fn remove_task(&mut self, task: TaskRef) -> Result<(), CoreError> {
        match self.tasks.get_mut(task.0) {
            Some(slot @ Some(_)) => {
                *slot = None;
                Ok(())
            }
            _ => Err(CoreError::UnknownReference {
                kind: "task",
                index: task.0,
            }),
        }
    }

    /// Look up a live binding by ref.
    #[must_use]
    pub fn binding(&self, binding: BindingRef) -> Option<&RoleBinding> {
        self.bindings.get(binding.0).and_then(Option::as_ref)
    }

    /// Live bindings with their refs, in slot order.
    pub fn bindings(&self) -> impl Iterator<Item = (BindingRef, &RoleBinding)> {
        self.bindings
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|b| (BindingRef(i), b)))
    }

    /// Live tasks with their refs, in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = (TaskRef, &DraftTask)> {
        self.tasks
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|t| (TaskRef(i), t)))
    }

    /// Distinct role ids referenced by live bindings (sold and internal).
    #[must_use]
    pub fn referenced_role_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        for (_, binding) in self.bindings() {
            for id in [binding.sold_role_id, binding.internal_role_id] {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }
}
