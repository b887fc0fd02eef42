pub mod db;
pub mod debts;
pub mod export;
pub mod settings;
pub mod shop;
pub mod watcher;
