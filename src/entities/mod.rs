pub mod prelude;

pub mod cases;
pub mod crimes;
pub mod criminals;
pub mod evidence;
pub mod sessions;
pub mod statutes;
pub mod users;
