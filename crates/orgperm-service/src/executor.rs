//! Shared plan execution against a caller-owned transaction.

use sqlx::PgConnection;

use orgperm_core::result::AppResult;
use orgperm_database::repositories::{AssignmentRepository, AssignmentWrite};
use orgperm_engine::AssignmentMutation;

/// Run every mutation of a plan on one transaction. Any failure aborts
/// the whole batch; the caller rolls back by dropping the transaction.
pub(crate) async fn execute_mutations(
    repo: &AssignmentRepository,
    conn: &mut PgConnection,
    mutations: &[AssignmentMutation],
) -> AppResult<()> {
    for mutation in mutations {
        match mutation {
            AssignmentMutation::Update {
                assignment_id,
                granted,
                priority,
                inherit_from_parent,
                override_children,
                conditions,
                expected_updated_at,
                ..
            } => {
                repo.update_guarded_tx(
                    conn,
                    *assignment_id,
                    *granted,
                    *priority,
                    *inherit_from_parent,
                    *override_children,
                    conditions.as_ref(),
                    *expected_updated_at,
                )
                .await?;
            }
            AssignmentMutation::Delete {
                assignment_id,
                expected_updated_at,
                ..
            } => {
                repo.delete_guarded_tx(conn, *assignment_id, *expected_updated_at)
                    .await?;
            }
            AssignmentMutation::Upsert {
                department_id,
                permission_id,
                granted,
                priority,
                inherit_from_parent,
                override_children,
            } => {
                repo.upsert_tx(
                    conn,
                    &AssignmentWrite {
                        department_id: *department_id,
                        permission_id: *permission_id,
                        granted: *granted,
                        priority: *priority,
                        inherit_from_parent: *inherit_from_parent,
                        override_children: *override_children,
                        conditions: None,
                    },
                )
                .await?;
            }
        }
    }
    Ok(())
}
