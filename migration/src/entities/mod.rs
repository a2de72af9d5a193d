pub mod bounty;
pub mod grant;
pub mod grant_application;
pub mod rfp;
pub mod submission;
pub mod view;

pub use bounty::Entity as BountyEntity;
pub use grant::Entity as GrantEntity;
pub use grant_application::Entity as GrantApplicationEntity;
pub use rfp::Entity as RfpEntity;
pub use submission::Entity as SubmissionEntity;
pub use view::Entity as ViewEntity;
