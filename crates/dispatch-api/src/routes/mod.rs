//! # API Route Modules
//!
//! Route modules for the dispatch API surface:
//!
//! - [`auth`] — the public login endpoint: credential check and session
//!   token issuance.
//! - [`admin_packages`] — package management for admins: CRUD, filtered
//!   listings, address search, assignment, and status changes.
//! - [`admin_transporters`] — user and transporter management for admins:
//!   listings with filters, creation, updates, soft delete, reactivation.
//! - [`transporter_packages`] — the transporter's own view: assigned
//!   packages, address search, and ownership-checked status updates.
//!
//! Authorization is role-scoped per module: `/api/admin/*` requires the
//! ADMIN role, `/api/transporter/*` the TRANSPORTER role, enforced in the
//! handlers via [`CallerIdentity::require_role`].
//!
//! [`CallerIdentity::require_role`]: crate::auth::CallerIdentity::require_role

pub mod admin_packages;
pub mod admin_transporters;
pub mod auth;
pub mod transporter_packages;
