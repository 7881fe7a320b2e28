pub mod bms_status;
pub mod connection_status;
