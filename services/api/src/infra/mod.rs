pub mod daraja;
pub mod db;
