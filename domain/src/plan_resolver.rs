//! Decides which task board plan a task group's tasks go into.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use log::*;
use meeting_ai::traits::task_board::Provider as TaskBoard;
use meeting_ai::{AssociationType, PlanAssociation};

/// Returns the plan id for `association`, creating a plan when it asks for a new one.
///
/// Every call resolves independently: two groups asking for the same new
/// title get two plans.
pub async fn resolve(
    task_board: &dyn TaskBoard,
    association: &PlanAssociation,
) -> Result<String, Error> {
    match association.association_type() {
        AssociationType::Existing => {
            let reference = association.plan_reference().ok_or_else(|| {
                warn!(
                    "Existing plan association '{}' has no plan reference",
                    association.plan_title()
                );
                Error::invalid_association(format!(
                    "plan '{}' is marked existing but has no plan reference",
                    association.plan_title()
                ))
            })?;

            debug!(
                "Using existing plan {} for '{}'",
                reference.plan_id(),
                association.plan_title()
            );
            Ok(reference.plan_id().to_string())
        }
        AssociationType::New => {
            let plan_id = task_board.create_plan(association.plan_title()).await?;

            if plan_id.trim().is_empty() {
                error!(
                    "Task board returned no id for new plan '{}'",
                    association.plan_title()
                );
                return Err(Error {
                    source: None,
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Provider(format!(
                        "no id returned for new plan '{}'",
                        association.plan_title()
                    ))),
                });
            }

            info!("Created plan {plan_id} for '{}'", association.plan_title());
            Ok(plan_id)
        }
    }
}
