/// Permission value that lifts tenant scoping for the bearer.
pub const ROLE_SUPER_USER: &str = "SuperUser";
