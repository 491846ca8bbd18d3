// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition (login, signup), the health probe and read/write access
// to gyms. Every input is validated here since there is no trusted caller.

pub mod accounts; // POST /accounts
pub mod auth; // GET /login
pub mod gyms; // /gyms and /gyms/:id
pub mod health; // GET /healthcheck
pub mod ratings; // GET /gyms/:id/ratings

pub use accounts::accounts_post;
pub use auth::login;
pub use gyms::{gym_delete, gym_get, gym_put, gyms_get, gyms_post};
pub use health::healthcheck_get;
pub use ratings::gym_ratings_get;
