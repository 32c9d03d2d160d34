//! Well-known permission names.
//!
//! Permissions are free-form strings; these are the ones the auth commands
//! themselves consult. Plugins are free to invent their own.

/// Superset permission: holders pass every check.
pub const ADMIN: &str = "admin";

/// Required by `addperm`.
pub const ADD_PERM: &str = "addperm";

/// Required by `delperm`.
pub const DEL_PERM: &str = "delperm";

/// Required by `checkperms`.
pub const CHECK_PERMS: &str = "checkperms";

/// Required by `whois`.
pub const WHOIS: &str = "whois";

/// Whether managing `perm` (granting or revoking it) needs [`ADMIN`].
pub fn is_escalation(perm: &str) -> bool {
    perm == ADMIN
}
