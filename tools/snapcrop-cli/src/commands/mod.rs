pub mod capture;
pub mod check;
pub mod clean;
pub mod edit;
pub mod prefs;
