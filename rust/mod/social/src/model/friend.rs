use serde::Deserialize;

/// Friendship change requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendAction {
    Add,
    Delete,
}

impl FriendAction {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw {
            Some("add") => Some(FriendAction::Add),
            Some("delete") => Some(FriendAction::Delete),
            _ => None,
        }
    }
}

/// Body of `POST /users/addfriend`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FriendRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "friendId")]
    pub friend_id: Option<String>,
}
