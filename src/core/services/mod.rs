pub mod key_service;
