pub mod context;
pub mod policy;
pub mod roles;

pub use context::{SecurityContext, SecurityCtxExtractor};
pub use policy::TenantScope;
pub use roles::Role;
