use crate::SecurityContext;

/// Which tenants' records a caller may read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantScope {
    AllTenants,
    Tenant(String),
}

impl TenantScope {
    pub fn for_context(ctx: &SecurityContext) -> Self {
        if ctx.role.is_elevated() {
            TenantScope::AllTenants
        } else {
            TenantScope::Tenant(ctx.tenant.clone())
        }
    }

    /// Tenant filter to apply, `None` when unrestricted.
    pub fn tenant(&self) -> Option<&str> {
        match self {
            TenantScope::AllTenants => None,
            TenantScope::Tenant(tenant) => Some(tenant),
        }
    }

    pub fn permits(&self, tenant: &str) -> bool {
        match self {
            TenantScope::AllTenants => true,
            TenantScope::Tenant(own) => own == tenant,
        }
    }
}
