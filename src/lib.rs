pub mod cache;
pub mod config;
pub mod dom;
pub mod error;
pub mod export;
pub mod fetch;
pub mod infobox;
pub mod items;
pub mod listing;
pub mod model;
pub mod modifications;
pub mod normalize;
pub mod pipeline;
pub mod store;
pub mod table;
