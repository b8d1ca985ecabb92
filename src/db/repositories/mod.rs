pub mod case;
pub mod crime;
pub mod criminal;
pub mod evidence;
pub mod session;
pub mod statute;
pub mod user;
