use tracing::info;

use super::{Reconciler, wrap};
use crate::client::RedashApi;
use crate::error::Result;
use crate::report::ChangeReport;
use crate::types::{ResourceKind, User, UserAttrs, UserSpec};

impl<A: RedashApi> Reconciler<A> {
    /// Ensures a user with `spec.email` exists and carries `spec.name`.
    /// Group memberships are managed from the group side.
    pub fn user_present(&self, spec: &UserSpec) -> Result<ChangeReport> {
        wrap(self.converge_user(spec), ResourceKind::User, &spec.email)
    }

    pub fn user_absent(&self, email: &str) -> Result<ChangeReport> {
        wrap(self.remove_user(email), ResourceKind::User, email)
    }

    fn converge_user(&self, spec: &UserSpec) -> Result<ChangeReport> {
        let attrs = UserAttrs {
            name: spec.name.clone(),
            email: spec.email.clone(),
        };

        match self.api.user_by_email(&spec.email)? {
            None => {
                let created = self.api.create_user(&attrs)?;
                info!(email = %spec.email, id = created.id, "user created");
                Ok(ChangeReport::changed(
                    &spec.email,
                    "User created",
                    None::<&User>,
                    Some(&created),
                ))
            }
            Some(existing) if existing.name == spec.name => {
                Ok(ChangeReport::unchanged(&spec.email, "User is already present"))
            }
            Some(existing) => {
                let updated = self.api.replace_user(existing.id, &attrs)?;
                info!(email = %spec.email, id = existing.id, "user updated");
                Ok(ChangeReport::changed(
                    &spec.email,
                    "User updated",
                    Some(&existing),
                    Some(&updated),
                ))
            }
        }
    }

    fn remove_user(&self, email: &str) -> Result<ChangeReport> {
        let Some(existing) = self.api.user_by_email(email)? else {
            return Ok(ChangeReport::unchanged(email, "User is already absent"));
        };

        self.api.delete_user(existing.id)?;
        info!(email, id = existing.id, "user removed");
        Ok(ChangeReport::changed(
            email,
            "User removed",
            Some(&existing),
            None::<&User>,
        ))
    }
}
