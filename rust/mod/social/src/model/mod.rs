mod user;
mod post;
mod comment;
mod reaction;
mod friend;
mod policy;
mod identity;

pub use user::*;
pub use post::*;
pub use comment::*;
pub use reaction::*;
pub use friend::*;
pub use policy::*;
pub use identity::*;
