pub mod config;

pub mod db;

pub mod store;

pub mod rest;

pub mod openapi;

pub mod error_convert;

pub mod telemetry;

pub mod health;

pub mod auth;

pub mod mailgun;

// Stazy domain modules
pub mod repo;

pub mod admin;

pub mod booking;
