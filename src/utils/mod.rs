pub mod fare;
pub mod jwt;
pub mod password;
pub mod reference;
