mod admin;
mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod session;
mod session_endpoint;

pub use admin::{
    Admin, AdminId, AdminRole, NewAdmin, create_admin, create_admin_table, get_admin_by_email,
};
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use session::{DEFAULT_SESSION_DURATION, create_session_table};
pub use session_endpoint::{get_me, get_session_status};

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;
