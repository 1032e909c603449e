mod identity;
mod identity_id;
mod match_detail;

pub use identity::{ExpansionPlan, IdentityHandler, plan_expansion};
pub use identity_id::IdentityIdHandler;
pub use match_detail::MatchHandler;
