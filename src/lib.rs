pub mod controller;
pub mod model;
pub mod remote;
pub mod repository;
pub mod ui;
