use socialnet_store::Repo;

use crate::model::{
    Action, AuthenticatedIdentity, ReactionAction, ReactionCounts, Reactable, Resource,
};
use crate::service::{SocialError, SocialService};

impl SocialService {
    /// Apply the reaction for `actor` to the latest version of `id`.
    pub(crate) fn react<T: Reactable>(
        &self,
        repo: &Repo<T>,
        resource: Resource,
        actor: &AuthenticatedIdentity,
        id: &str,
        action: Option<&str>,
    ) -> Result<(ReactionAction, ReactionCounts), SocialError> {
        self.policy
            .check(actor.role, resource, Action::React)
            .map_err(SocialError::Unauthorized)?;

        let action = ReactionAction::parse(action)?;
        let mode = self.config.reaction_mode;
        let (_, counts) = repo.update_with(id, |record| {
            record
                .reactions_mut()
                .apply(&actor.id, action, mode)
                .map_err(SocialError::from)
        })?;

        tracing::debug!(%resource, id, user_id = %actor.id, ?action, "reaction applied");
        Ok((action, counts))
    }
}
