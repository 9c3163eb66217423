/// Router Module Index
///
/// Routes are grouped by the trust tier that decides who may call them. There is no
/// session: every gated request carries its credentials in the JSON body, and the
/// handlers hand them to the request gate, which re-verifies them on each call.

/// Routes anyone may call: reads, registration and login.
pub mod public;

/// Routes that act on a resource the verified caller owns, or create one.
pub mod authenticated;

/// Routes restricted to accounts holding the administrator role.
pub mod admin;
