pub mod appointment;
pub mod enums;
pub mod patient;
pub mod symptom;

pub use appointment::*;
pub use patient::*;
pub use symptom::*;
