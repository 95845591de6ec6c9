pub mod clear_sky;
pub mod mqtt_service;
pub mod scheduler;
pub mod solar_algorithm;
pub mod solar_position;
pub mod summary;
pub mod transposition;
pub mod whatsapp_service;
