use socialnet_kv::WriteBatch;
use socialnet_store::retry_on_change;

use crate::model::{AuthenticatedIdentity, FriendAction, FriendRequest, User};
use crate::service::{SocialError, SocialService};

/// Apply a friendship change to both sides. Leaves both users untouched
/// on error.
pub fn apply_friendship(
    action: FriendAction,
    actor: &mut User,
    friend: &mut User,
) -> Result<(), SocialError> {
    match action {
        FriendAction::Add => {
            if actor.friends.contains(&friend.id) {
                return Err(SocialError::Rejected("already friends".into()));
            }
            actor.friends.insert(friend.id.clone());
            friend.friends.insert(actor.id.clone());
        }
        FriendAction::Delete => {
            if !actor.friends.contains(&friend.id) {
                return Err(SocialError::Rejected("not a friend".into()));
            }
            actor.friends.remove(&friend.id);
            friend.friends.remove(&actor.id);
        }
    }
    Ok(())
}

impl SocialService {
    /// Add or remove a friendship between the caller and `friendId`.
    ///
    /// Both user records are read and written as one unit: the commit only
    /// lands if neither changed since it was read, otherwise it is redone.
    pub fn change_friendship(
        &self,
        actor: &AuthenticatedIdentity,
        req: FriendRequest,
    ) -> Result<(FriendAction, User), SocialError> {
        let action = FriendAction::parse(req.action.as_deref())
            .ok_or_else(|| SocialError::Rejected("no valid action".into()))?;
        let friend_id = match req.friend_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => return Err(SocialError::Validation("friendId is required".into())),
        };
        if friend_id == actor.id {
            return Err(SocialError::Validation("cannot befriend yourself".into()));
        }

        let me = retry_on_change(|| -> Result<Option<User>, SocialError> {
            let me_snap = self.users.snapshot(&actor.id)?;
            let friend_snap = self.users.snapshot(&friend_id)?;
            let mut me = me_snap.record.clone();
            let mut friend = friend_snap.record.clone();
            apply_friendship(action, &mut me, &mut friend)?;

            let mut batch = WriteBatch::new();
            let me = self.users.stage_over(&mut batch, &me_snap, me)?;
            self.users.stage_over(&mut batch, &friend_snap, friend)?;
            Ok(self.users.try_commit(batch)?.then_some(me))
        })?;

        tracing::info!(user_id = %actor.id, friend_id = %friend_id, ?action, "friendship changed");
        Ok((action, me))
    }
}
