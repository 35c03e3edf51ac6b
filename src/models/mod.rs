pub mod observation;
pub mod project;
pub mod risk;
pub mod site;
pub mod user;
