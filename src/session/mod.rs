//! Session handling: the encrypted session cookie, the token it carries,
//! the middleware that turns it into a [Session] value object, and the
//! log-in/log-out flows.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_session_cookie, set_session_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{session_guard, session_guard_hx};
pub use token::{Session, Token};

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;

#[cfg(test)]
pub use middleware::SessionGuardState;
