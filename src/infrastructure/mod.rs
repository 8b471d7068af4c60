pub mod vendors;
