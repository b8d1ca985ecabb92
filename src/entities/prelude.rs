pub use super::cases::Entity as Cases;
pub use super::crimes::Entity as Crimes;
pub use super::criminals::Entity as Criminals;
pub use super::evidence::Entity as Evidence;
pub use super::sessions::Entity as Sessions;
pub use super::statutes::Entity as Statutes;
pub use super::users::Entity as Users;
