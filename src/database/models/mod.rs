pub mod account;
pub mod gym;
pub mod rating;

pub use account::{Account, CreateAccountRequest, NewAccount};
pub use gym::{CreateGymRequest, Gym, UpdateGymRequest};
pub use rating::{CreateRatingRequest, Rating, MAX_RATING, MIN_RATING};

/// Column width of `gyms.name` and `accounts.username`, in characters
pub const MAX_NAME_LENGTH: usize = 100;

/// True when `value` fits a `VARCHAR(MAX_NAME_LENGTH)` column.
pub fn fits_name_column(value: &str) -> bool {
    value.chars().count() <= MAX_NAME_LENGTH
}
