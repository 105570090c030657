pub mod key_stores;
